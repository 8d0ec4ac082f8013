//! Dimension line layout.

use pipekit_connect::ConnectorGraph;
use pipekit_line::PipeLine;
use pipekit_math::{lerp, Dir3, Line3, Plane, Point3, Tolerance, Vec3};
use pipekit_model::{ConnectorId, ElementId, PipingModel, View};

use crate::{DimensionError, DimensionStyles};

/// Unprojected end-to-end line of a pipe line.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElementLine {
    /// Start point.
    pub start: Point3,
    /// End point.
    pub end: Point3,
}

impl ElementLine {
    /// Vector from start to end.
    pub fn direction(&self) -> Vec3 {
        self.end - self.start
    }
}

/// One end of a pipe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Edge {
    Start,
    End,
}

impl Edge {
    /// Index of the edge element in a line of `len` elements.
    pub(crate) fn index(self, len: usize) -> usize {
        match self {
            Edge::Start => 0,
            Edge::End => len.saturating_sub(1),
        }
    }

    /// Index of the edge element's in-line neighbour.
    pub(crate) fn neighbour(self, len: usize) -> Option<usize> {
        if len < 2 {
            return None;
        }
        Some(match self {
            Edge::Start => 1,
            Edge::End => len - 2,
        })
    }
}

/// Connector of `from` joined to `to`.
pub(crate) fn joint<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    from: ElementId,
    to: ElementId,
) -> Option<ConnectorId> {
    graph
        .connectors(from)
        .into_iter()
        .find(|c| graph.try_get_connected(*c).is_some_and(|peer| peer.owner == to))
}

/// Port of an edge element facing away from the line.
pub(crate) fn outer_connector<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    line: &PipeLine,
    edge: Edge,
) -> Option<ConnectorId> {
    let elements = line.elements();
    let id = elements[edge.index(elements.len())];
    let connectors = graph.connectors(id);
    match edge.neighbour(elements.len()) {
        Some(n) => {
            let neighbour = elements[n];
            connectors.into_iter().find(|c| {
                graph
                    .try_get_connected(*c)
                    .map_or(true, |peer| peer.owner != neighbour)
            })
        }
        None => match edge {
            Edge::Start => connectors.first().copied(),
            Edge::End => connectors.last().copied(),
        },
    }
}

pub(crate) fn connector_position<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    connector: ConnectorId,
) -> Option<Point3> {
    graph.model().connector(connector).map(|c| c.origin_point())
}

fn join_position<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    a: ElementId,
    b: ElementId,
) -> Option<Point3> {
    joint(graph, a, b).and_then(|c| connector_position(graph, c))
}

fn centroid<M: PipingModel + ?Sized>(graph: &ConnectorGraph<'_, M>, id: ElementId) -> Option<Point3> {
    graph.model().element(id).and_then(|e| e.centroid())
}

/// End-to-end line of a pipe line.
///
/// Runs from the join between the first two elements to the join between
/// the last two, using an edge element's centroid where a join cannot be
/// found. Lines too short for that (one or two elements, or coincident
/// joins) use the outer connectors of the edge elements instead, or their
/// centroids where an edge element has no free port.
pub fn element_line<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    line: &PipeLine,
) -> Result<ElementLine, DimensionError> {
    let elements = line.elements();
    let n = elements.len();
    let tol = Tolerance::DEFAULT;

    if n >= 2 {
        let start = join_position(graph, elements[0], elements[1])
            .or_else(|| centroid(graph, elements[0]));
        let end = join_position(graph, elements[n - 2], elements[n - 1])
            .or_else(|| centroid(graph, elements[n - 1]));
        if let (Some(start), Some(end)) = (start, end) {
            if !tol.points_equal(&start, &end) {
                return Ok(ElementLine { start, end });
            }
        }
    }

    let terminal = |edge: Edge| {
        outer_connector(graph, line, edge)
            .and_then(|c| connector_position(graph, c))
            .or_else(|| centroid(graph, elements[edge.index(n)]))
    };
    let (start, end) = (terminal(Edge::Start), terminal(Edge::End));
    match (start, end) {
        (Some(start), Some(end)) if !tol.points_equal(&start, &end) => Ok(ElementLine { start, end }),
        _ => Err(DimensionError::DegenerateRun),
    }
}

/// Projected geometry of the dimensions of one pipe line in one view.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionLayout {
    /// View plane.
    pub plane: Plane,
    /// Unprojected element line.
    pub element_line: ElementLine,
    /// Element line projected onto the view plane.
    pub axis: Line3,
    /// Line of the overall dimension.
    pub primary: Line3,
    /// Line of the sub-dimensions; `None` when secondary dimensioning is
    /// disabled for this run.
    pub secondary: Option<Line3>,
}

impl DimensionLayout {
    /// Lay out the dimensions of `line` in `view`.
    ///
    /// The primary line passes through `placement` parallel to the projected
    /// run. Secondary dimensioning is only possible when the run lies
    /// parallel to the view plane; otherwise `secondary` is `None`. The
    /// secondary line is moved from the primary line toward the run by the
    /// clearance of the secondary dimension type at the view's scale.
    pub fn compute<M: PipingModel + ?Sized>(
        graph: &ConnectorGraph<'_, M>,
        line: &PipeLine,
        view: &View,
        placement: Point3,
        styles: &DimensionStyles,
    ) -> Result<Self, DimensionError> {
        let plane = view.plane().ok_or(DimensionError::DegenerateView(view.id.0))?;
        let element_line = element_line(graph, line)?;
        let start = plane.project_point(&element_line.start);
        let end = plane.project_point(&element_line.end);
        let axis = Line3::bound(start, end).ok_or(DimensionError::PerpendicularToView)?;

        let run = Dir3::new_normalize(element_line.direction());
        let parallel =
            (axis.direction.as_ref() - run.as_ref()).norm() < Tolerance::VIEW_DIRECTION;
        let primary = axis.through(placement);

        let secondary = if !parallel {
            log::debug!("run is not parallel to view {}; no sub-dimensions", view.id.0);
            None
        } else {
            match graph.model().dimension_type(styles.secondary) {
                Some(info) => {
                    let offset = info.clearance() * view.scale;
                    let foot = primary.closest_point(&start);
                    let gap = (start - foot).norm();
                    let origin = if gap < Tolerance::DEFAULT.linear {
                        foot
                    } else {
                        lerp(&foot, &start, offset / gap)
                    };
                    Some(primary.through(origin))
                }
                None => {
                    log::warn!(
                        "dimension type {} not found; no sub-dimensions",
                        styles.secondary.0
                    );
                    None
                }
            }
        };

        Ok(Self {
            plane,
            element_line,
            axis,
            primary,
            secondary,
        })
    }

    /// Whether sub-dimensions will be created.
    pub fn secondary_enabled(&self) -> bool {
        self.secondary.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures::*;
    use approx::assert_relative_eq;
    use pipekit_model::{PassThroughRule, RecordingNotifier, ViewId};

    #[test]
    fn test_element_line_spans_inner_joins() {
        let doc = straight_run(Vec3::x());
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 3);
        let el = element_line(&graph, &line).unwrap();
        assert_relative_eq!(el.start.x, 10.0);
        assert_relative_eq!(el.end.x, 21.0);
    }

    #[test]
    fn test_short_line_uses_outer_connectors() {
        let mut doc = straight_run(Vec3::x());
        // pipe 1 and flange 2 alone
        doc.disconnect(c(2, 1)).unwrap();
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 1);
        assert_eq!(line.len(), 2);
        let el = element_line(&graph, &line).unwrap();
        assert_relative_eq!(el.start.x, 0.0);
        assert_relative_eq!(el.end.x, 10.5);
    }

    #[test]
    fn test_parallel_run_gets_offset_secondary_line() {
        let doc = straight_run(Vec3::x());
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 3);
        let layout = DimensionLayout::compute(
            &graph,
            &line,
            &plan_view(),
            Point3::new(0.0, 5.0, 0.0),
            &styles(),
        )
        .unwrap();
        assert_relative_eq!(layout.primary.origin.y, 5.0);
        assert_relative_eq!(layout.primary.direction.x.abs(), 1.0);
        // clearance 0.25 at scale 4 moves the line one unit toward the run
        let secondary = layout.secondary.unwrap();
        assert_relative_eq!(secondary.origin.y, 4.0, epsilon = 1e-9);
        assert_relative_eq!(secondary.origin.x, 10.0, epsilon = 1e-9);
    }

    #[test]
    fn test_sloped_run_disables_secondary() {
        let doc = straight_run(Vec3::new(1.0, 0.0, 0.1));
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 3);
        let layout =
            DimensionLayout::compute(&graph, &line, &plan_view(), Point3::origin(), &styles())
                .unwrap();
        assert!(!layout.secondary_enabled());
    }

    #[test]
    fn test_end_on_run_cannot_be_dimensioned() {
        let doc = straight_run(Vec3::z());
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 3);
        let result =
            DimensionLayout::compute(&graph, &line, &plan_view(), Point3::origin(), &styles());
        assert!(matches!(result, Err(DimensionError::PerpendicularToView)));
    }

    #[test]
    fn test_zero_view_direction_is_rejected() {
        let doc = straight_run(Vec3::x());
        let rule = PassThroughRule::default();
        let notifier = RecordingNotifier::new();
        let graph = ConnectorGraph::new(&doc, &rule, &notifier);
        let line = line_of(&graph, 3);
        let view = View::new(ViewId(9), Vec3::zeros(), 1.0);
        let result = DimensionLayout::compute(&graph, &line, &view, Point3::origin(), &styles());
        assert!(matches!(result, Err(DimensionError::DegenerateView(9))));
    }
}
