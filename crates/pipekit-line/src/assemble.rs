//! Walking a run of connected elements outward from a seed pipe.

use std::collections::HashSet;

use pipekit_connect::ConnectorGraph;
use pipekit_model::{classify, ConnectorId, ElementId, PipingModel, View};

use crate::{PipeLineError, PipingFilter};

/// An ordered run of elements: left terminal, ..., seed pipe, ..., right
/// terminal. Built once per operation and never modified.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PipeLine {
    elements: Vec<ElementId>,
    seed: ElementId,
}

impl PipeLine {
    /// Elements in order.
    pub fn elements(&self) -> &[ElementId] {
        &self.elements
    }

    /// The pipe the line was built from.
    pub fn seed(&self) -> ElementId {
        self.seed
    }

    /// Position of the seed pipe in the line.
    pub fn seed_index(&self) -> usize {
        self.elements
            .iter()
            .position(|e| *e == self.seed)
            .unwrap_or_default()
    }

    /// Number of elements (at least one, the seed).
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// A line always holds its seed, so it is never empty.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// First element.
    pub fn first(&self) -> ElementId {
        self.elements[0]
    }

    /// Last element.
    pub fn last(&self) -> ElementId {
        self.elements[self.elements.len() - 1]
    }

    /// Whether `element` is part of the line.
    pub fn contains(&self, element: ElementId) -> bool {
        self.elements.contains(&element)
    }

    /// Whether the element at `index` is a run edge.
    pub fn is_edge(&self, index: usize) -> bool {
        index == 0 || index + 1 == self.elements.len()
    }

    /// Iterate the elements in order.
    pub fn iter(&self) -> impl Iterator<Item = ElementId> + '_ {
        self.elements.iter().copied()
    }
}

/// Build the pipe line around `pipe` with the default run filter.
pub fn build_default_pipe_line<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    pipe: ElementId,
    view: Option<&View>,
) -> Result<PipeLine, PipeLineError> {
    build_pipe_line(graph, pipe, &PipingFilter::default_run(), view)
}

/// Build the pipe line around `pipe`.
///
/// Each direction is walked from the seed's ports: to the adjacent port,
/// across the join to the next element, and on while the next element is
/// valid and accepted by `filter` (and visible in `view`, when given).
/// Pass-through fittings are not skipped here; they are ordinary members
/// subject to the filter. A walk that comes back to an element already in
/// the line stops there.
pub fn build_pipe_line<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    pipe: ElementId,
    filter: &PipingFilter,
    view: Option<&View>,
) -> Result<PipeLine, PipeLineError> {
    let seed = graph
        .model()
        .element(pipe)
        .ok_or(PipeLineError::ElementNotFound(pipe))?;
    if !classify::is_pipe(seed) {
        return Err(PipeLineError::NotAPipe(pipe));
    }

    let connectors = graph.connectors(pipe);
    let mut visited = HashSet::from([pipe]);
    let (mut left, right) = match connectors.as_slice() {
        [first, second, ..] => {
            // Entering at the second port exits through the first, so this
            // walk heads toward the first port's side.
            let left = walk(graph, *second, filter, view, &mut visited)?;
            let right = walk(graph, *first, filter, view, &mut visited)?;
            (left, right)
        }
        _ => (Vec::new(), Vec::new()),
    };

    left.reverse();
    let mut elements = left;
    elements.push(pipe);
    elements.extend(right);
    log::debug!("pipe line from {}: {:?}", pipe, elements);
    Ok(PipeLine {
        elements,
        seed: pipe,
    })
}

/// Walk outward from the element owning `entry`, collecting elements in
/// travel order.
fn walk<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    entry: ConnectorId,
    filter: &PipingFilter,
    view: Option<&View>,
    visited: &mut HashSet<ElementId>,
) -> Result<Vec<ElementId>, PipeLineError> {
    let mut found = Vec::new();
    let mut current = entry;
    loop {
        let Some(exit) = graph.adjacent_connector(current) else {
            return Ok(found);
        };
        let Some(next) = graph.try_get_connected(exit) else {
            return Ok(found);
        };
        if !can_continue(graph.model(), next, filter, view) {
            return Ok(found);
        }
        if !visited.insert(next.owner) {
            log::debug!("pipe line closes on itself at {}", next.owner);
            return Ok(found);
        }
        if found.len() == graph.limit() {
            return Err(PipeLineError::IterationLimit(graph.limit()));
        }
        found.push(next.owner);
        current = next;
    }
}

fn can_continue<M: PipingModel + ?Sized>(
    model: &M,
    next: ConnectorId,
    filter: &PipingFilter,
    view: Option<&View>,
) -> bool {
    if !next.owner.is_valid() {
        return false;
    }
    model
        .element(next.owner)
        .is_some_and(|e| filter.allows(e, view))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_math::Point3;
    use pipekit_model::{
        Category, Document, Element, PartType, PassThroughRule, RecordingNotifier, ViewId,
    };

    fn c(owner: i64, index: u32) -> ConnectorId {
        ConnectorId::new(ElementId(owner), index)
    }

    fn pt(x: f64) -> Point3 {
        Point3::new(x, 0.0, 0.0)
    }

    fn two_port(id: i64, category: Category, part_type: PartType, x0: f64, x1: f64) -> Element {
        Element::new(ElementId(id), category)
            .with_part_type(part_type)
            .with_location(pt((x0 + x1) / 2.0))
            .with_connector(pt(x0))
            .with_connector(pt(x1))
    }

    fn tee(id: i64, x: f64) -> Element {
        Element::fitting(ElementId(id), PartType::Tee, "tee")
            .with_location(pt(x))
            .with_connector(pt(x - 0.5))
            .with_connector(pt(x + 0.5))
            .with_connector(Point3::new(x, 0.5, 0.0))
    }

    /// tee 10 | pipe 1 | flange 2 | pipe 3 | valve 4 | pipe 5 | tee 11
    fn run() -> Document {
        let mut doc = Document::new();
        doc.add_element(tee(10, -0.5));
        doc.add_element(Element::pipe(ElementId(1), pt(0.0), pt(10.0)));
        doc.add_element(two_port(2, Category::PipeFitting, PartType::Flange, 10.0, 10.5));
        doc.add_element(Element::pipe(ElementId(3), pt(10.5), pt(20.0)));
        doc.add_element(two_port(4, Category::PipeAccessory, PartType::Undefined, 20.0, 21.0));
        doc.add_element(Element::pipe(ElementId(5), pt(21.0), pt(30.0)));
        doc.add_element(tee(11, 30.5));
        doc.connect(c(10, 1), c(1, 0)).unwrap();
        doc.connect(c(1, 1), c(2, 0)).unwrap();
        doc.connect(c(2, 1), c(3, 0)).unwrap();
        doc.connect(c(3, 1), c(4, 0)).unwrap();
        doc.connect(c(4, 1), c(5, 0)).unwrap();
        doc.connect(c(5, 1), c(11, 0)).unwrap();
        doc
    }

    fn ids(raw: &[i64]) -> Vec<ElementId> {
        raw.iter().map(|i| ElementId(*i)).collect()
    }

    #[test]
    fn test_run_between_junctions() {
        let doc = run();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = build_default_pipe_line(&graph, ElementId(3), None).unwrap();
        assert_eq!(line.elements(), ids(&[1, 2, 3, 4, 5]).as_slice());
        assert_eq!(line.seed_index(), 2);
        assert!(line.is_edge(0) && line.is_edge(4) && !line.is_edge(2));
    }

    #[test]
    fn test_same_members_from_either_end_pipe() {
        let doc = run();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let from_first = build_default_pipe_line(&graph, ElementId(1), None).unwrap();
        let from_last = build_default_pipe_line(&graph, ElementId(5), None).unwrap();
        let mut a = from_first.elements().to_vec();
        let mut b = from_last.elements().to_vec();
        a.sort();
        b.sort();
        assert_eq!(a, b);
        assert_eq!(from_first.first(), ElementId(1));
        assert_eq!(from_last.last(), ElementId(5));
    }

    #[test]
    fn test_filter_with_bends_walks_into_junction() {
        let doc = run();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line =
            build_pipe_line(&graph, ElementId(3), &PipingFilter::all(), None).unwrap();
        // tee 10 is entered on a run port whose parallel partner is open
        assert_eq!(line.first(), ElementId(10));
        assert_eq!(line.last(), ElementId(11));
    }

    #[test]
    fn test_off_axis_element_stops_linear_walk() {
        let mut doc = run();
        doc.element_mut(ElementId(4)).unwrap().location = Some([20.5, 0.4, 0.0]);
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let linear = PipingFilter::default_run().with_linear_only(true);
        let line = build_pipe_line(&graph, ElementId(3), &linear, None).unwrap();
        assert_eq!(line.elements(), ids(&[1, 2, 3]).as_slice());
        let loose = build_default_pipe_line(&graph, ElementId(3), None).unwrap();
        assert!(loose.contains(ElementId(4)));
    }

    #[test]
    fn test_hidden_element_stops_walk() {
        let doc = run();
        let view = View::plan(ViewId(1), 48.0).hiding(ElementId(2));
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = build_default_pipe_line(&graph, ElementId(3), Some(&view)).unwrap();
        assert_eq!(line.elements(), ids(&[3, 4, 5]).as_slice());
    }

    #[test]
    fn test_lone_pipe_is_its_own_line() {
        let mut doc = Document::new();
        doc.add_element(Element::pipe(ElementId(1), pt(0.0), pt(1.0)));
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = build_default_pipe_line(&graph, ElementId(1), None).unwrap();
        assert_eq!(line.elements(), ids(&[1]).as_slice());
        assert_eq!(line.len(), 1);
    }

    #[test]
    fn test_single_port_stub_ends_walk() {
        let mut doc = Document::new();
        doc.add_element(Element::pipe(ElementId(1), pt(0.0), pt(1.0)));
        doc.add_element(
            Element::fitting(ElementId(2), PartType::Cap, "cap")
                .with_location(pt(1.0))
                .with_connector(pt(1.0)),
        );
        doc.connect(c(1, 1), c(2, 0)).unwrap();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = build_default_pipe_line(&graph, ElementId(1), None).unwrap();
        assert_eq!(line.elements(), ids(&[1, 2]).as_slice());
    }

    #[test]
    fn test_closed_loop_terminates() {
        // four pipes joined head to tail
        let mut doc = Document::new();
        let corners = [
            Point3::new(0.0, 0.0, 0.0),
            Point3::new(1.0, 0.0, 0.0),
            Point3::new(1.0, 1.0, 0.0),
            Point3::new(0.0, 1.0, 0.0),
        ];
        for i in 0..4 {
            doc.add_element(Element::pipe(
                ElementId(i as i64 + 1),
                corners[i],
                corners[(i + 1) % 4],
            ));
        }
        for i in 0..4i64 {
            doc.connect(c(i + 1, 1), c((i + 1) % 4 + 1, 0)).unwrap();
        }
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = build_default_pipe_line(&graph, ElementId(1), None).unwrap();
        assert_eq!(line.len(), 4);
        let mut members = line.elements().to_vec();
        members.sort();
        assert_eq!(members, ids(&[1, 2, 3, 4]));
    }

    #[test]
    fn test_walk_may_take_exactly_limit_steps() {
        // pipe 1 | pipe 2 | pipe 3, both outer ends open
        let mut doc = Document::new();
        doc.add_element(Element::pipe(ElementId(1), pt(0.0), pt(1.0)));
        doc.add_element(Element::pipe(ElementId(2), pt(1.0), pt(2.0)));
        doc.add_element(Element::pipe(ElementId(3), pt(2.0), pt(3.0)));
        doc.connect(c(1, 1), c(2, 0)).unwrap();
        doc.connect(c(2, 1), c(3, 0)).unwrap();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();

        let graph = ConnectorGraph::new(&doc, &rule, &notifier).with_limit(2);
        let line = build_default_pipe_line(&graph, ElementId(1), None).unwrap();
        assert_eq!(line.elements(), ids(&[1, 2, 3]).as_slice());

        let graph = ConnectorGraph::new(&doc, &rule, &notifier).with_limit(1);
        assert_eq!(
            build_default_pipe_line(&graph, ElementId(1), None),
            Err(PipeLineError::IterationLimit(1))
        );
        let line = build_default_pipe_line(&graph, ElementId(2), None).unwrap();
        assert_eq!(line.elements(), ids(&[1, 2, 3]).as_slice());
    }

    #[test]
    fn test_seed_must_be_a_pipe() {
        let doc = run();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        assert_eq!(
            build_default_pipe_line(&graph, ElementId(2), None),
            Err(PipeLineError::NotAPipe(ElementId(2)))
        );
        assert_eq!(
            build_default_pipe_line(&graph, ElementId(99), None),
            Err(PipeLineError::ElementNotFound(ElementId(99)))
        );
    }
}
