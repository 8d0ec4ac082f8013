//! Planning and creating the dimensions of a pipe line.

use std::collections::HashSet;

use pipekit_connect::ConnectorGraph;
use pipekit_line::{is_linear, PipeLine, DEFAULT_LINEAR_TOLERANCE};
use pipekit_math::{Line3, Point3};
use pipekit_model::{
    ConnectorId, DimensionHost, DimensionId, DimensionRequest, Element, ElementClass, ElementId,
    Notifier, PipingModel, ReferenceId, View,
};

use crate::layout::{connector_position, joint, outer_connector, Edge};
use crate::{
    pipe_end_reference, resolve_centerline_reference, resolve_pseudo_reference, DimensionError,
    DimensionLayout, DimensionStyles, FlangeDimensionMode,
};

const DIMENSION_ERROR_TITLE: &str = "Dimension Error";

/// An element whose contribution was dropped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ElementFailure {
    /// The element.
    pub element: ElementId,
    /// What went wrong.
    pub message: String,
}

/// A sub-dimension and the element it measures.
#[derive(Debug, Clone, PartialEq)]
pub struct SubDimension {
    /// Measured element.
    pub element: ElementId,
    /// Request for the host.
    pub request: DimensionRequest,
}

/// Dimensions computed for a pipe line, not yet created in the host.
#[derive(Debug, Clone, PartialEq)]
pub struct DimensionPlan {
    /// Geometry the requests were built on.
    pub layout: DimensionLayout,
    /// Overall dimension; `None` when fewer than two run ends resolved.
    pub primary: Option<DimensionRequest>,
    /// Per-element sub-dimensions.
    pub secondary: Vec<SubDimension>,
    /// Elements whose contribution was dropped.
    pub failures: Vec<ElementFailure>,
}

/// Outcome of dimensioning a pipe line.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct DimensionReport {
    /// The overall dimension, if created.
    pub primary: Option<DimensionId>,
    /// Sub-dimensions created.
    pub secondary: Vec<DimensionId>,
    /// Whether the run allowed sub-dimensions at all.
    pub secondary_enabled: bool,
    /// Elements whose contribution was dropped, in planning or by the host.
    pub failures: Vec<ElementFailure>,
}

impl DimensionPlan {
    /// Create the planned dimensions. Host failures are reported through
    /// `notifier` and recorded; the remaining dimensions are still created.
    pub fn apply<H: DimensionHost + ?Sized>(
        &self,
        host: &mut H,
        notifier: &dyn Notifier,
    ) -> DimensionReport {
        let mut report = DimensionReport {
            primary: None,
            secondary: Vec::new(),
            secondary_enabled: self.layout.secondary_enabled(),
            failures: self.failures.clone(),
        };

        if let Some(request) = &self.primary {
            match host.create_dimension(request) {
                Ok(id) => report.primary = Some(id),
                Err(e) => {
                    log::warn!("primary dimension failed: {}", e);
                    notifier.notify(DIMENSION_ERROR_TITLE, &e.to_string());
                }
            }
        }

        for sub in &self.secondary {
            match host.create_dimension(&sub.request) {
                Ok(id) => report.secondary.push(id),
                Err(e) => {
                    notifier.notify(DIMENSION_ERROR_TITLE, &format!("element {}: {}", sub.element, e));
                    report.failures.push(ElementFailure {
                        element: sub.element,
                        message: e.to_string(),
                    });
                }
            }
        }

        log::debug!(
            "created {} of {} sub-dimensions",
            report.secondary.len(),
            self.secondary.len()
        );
        report
    }
}

/// Plan the dimensions of `line` in `view` without touching the host.
///
/// Layout errors abort. Errors on a single element are reported through the
/// graph's notifier, recorded in the plan and skipped.
pub fn plan_dimensions<M: PipingModel + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    line: &PipeLine,
    view: &View,
    placement: Point3,
    styles: &DimensionStyles,
) -> Result<DimensionPlan, DimensionError> {
    let layout = DimensionLayout::compute(graph, line, view, placement, styles)?;
    let mut planner = Planner {
        graph,
        line,
        styles,
        layout: &layout,
        failures: Vec::new(),
        pairs: HashSet::new(),
    };

    let references = planner.endpoints();
    let primary = if references.len() >= 2 {
        Some(DimensionRequest {
            view: view.id,
            line: layout.primary,
            references,
            dimension_type: styles.primary,
        })
    } else {
        log::warn!("only {} run end(s) resolved; no overall dimension", references.len());
        graph.notifier().notify(
            DIMENSION_ERROR_TITLE,
            "the overall dimension needs two resolved run ends",
        );
        None
    };

    let secondary = match layout.secondary {
        Some(secondary_line) => planner.sub_dimensions(view, secondary_line),
        None => Vec::new(),
    };

    let failures = planner.failures;
    Ok(DimensionPlan {
        layout,
        primary,
        secondary,
        failures,
    })
}

/// Plan and create the dimensions of `line` in `view`.
pub fn create_dimensions<M: PipingModel + ?Sized, H: DimensionHost + ?Sized>(
    graph: &ConnectorGraph<'_, M>,
    host: &mut H,
    line: &PipeLine,
    view: &View,
    placement: Point3,
    styles: &DimensionStyles,
) -> Result<DimensionReport, DimensionError> {
    let plan = plan_dimensions(graph, line, view, placement, styles)?;
    Ok(plan.apply(host, graph.notifier()))
}

struct Planner<'p, 'a, M: PipingModel + ?Sized> {
    graph: &'p ConnectorGraph<'a, M>,
    line: &'p PipeLine,
    styles: &'p DimensionStyles,
    layout: &'p DimensionLayout,
    failures: Vec<ElementFailure>,
    /// Element pairs already spanned by a partial flange dimension.
    pairs: HashSet<(ElementId, ElementId)>,
}

impl<'p, 'a, M: PipingModel + ?Sized> Planner<'p, 'a, M> {
    fn fail(&mut self, element: ElementId, error: DimensionError) {
        let message = error.to_string();
        self.graph.notifier().notify(
            DIMENSION_ERROR_TITLE,
            &format!("element {}: {}", element, message),
        );
        self.failures.push(ElementFailure { element, message });
    }

    fn element(&self, id: ElementId) -> Result<&'a Element, DimensionError> {
        self.graph
            .model()
            .element(id)
            .ok_or(DimensionError::ElementNotFound(id))
    }

    fn position(&self, connector: ConnectorId) -> Result<Point3, DimensionError> {
        connector_position(self.graph, connector).ok_or(DimensionError::NoConnector(connector.owner))
    }

    /// Reference standing in for one connector of `element`.
    fn connector_reference(
        &self,
        element: &Element,
        connector: ConnectorId,
    ) -> Result<ReferenceId, DimensionError> {
        let p = self.position(connector)?;
        match ElementClass::of(element) {
            ElementClass::Pipe => pipe_end_reference(element, &p),
            _ => resolve_pseudo_reference(
                element,
                &p,
                &self.layout.axis,
                &self.layout.plane,
                self.styles,
            ),
        }
    }

    fn centerline_reference(&self, element: &Element) -> Result<ReferenceId, DimensionError> {
        resolve_centerline_reference(element, &self.layout.axis, &self.layout.plane, self.styles)
    }

    fn endpoints(&mut self) -> Vec<ReferenceId> {
        let mut references = Vec::new();
        for edge in [Edge::Start, Edge::End] {
            let id = self.line.elements()[edge.index(self.line.len())];
            match self.endpoint_reference(edge) {
                Ok(Some(r)) => references.push(r),
                Ok(None) => {}
                Err(e) => self.fail(id, e),
            }
        }
        references
    }

    fn endpoint_reference(&self, edge: Edge) -> Result<Option<ReferenceId>, DimensionError> {
        let elements = self.line.elements();
        let id = elements[edge.index(elements.len())];
        let neighbour = edge.neighbour(elements.len()).map(|n| elements[n]);
        let element = self.element(id)?;
        let outer = || outer_connector(self.graph, self.line, edge).ok_or(DimensionError::NoConnector(id));

        match ElementClass::of(element) {
            ElementClass::Pipe => {
                let p = self.position(outer()?)?;
                pipe_end_reference(element, &p).map(Some)
            }
            ElementClass::Flange(_) => {
                let mode = self.styles.flange_mode(&element.type_id);
                if let (FlangeDimensionMode::Negate, Some(neighbour)) = (mode, neighbour) {
                    // the run ends where the neighbour meets the flange
                    let inner = joint(self.graph, neighbour, id)
                        .ok_or(DimensionError::NoConnector(neighbour))?;
                    return self
                        .connector_reference(self.element(neighbour)?, inner)
                        .map(Some);
                }
                let inner = self
                    .graph
                    .adjacent_connector(outer()?)
                    .ok_or(DimensionError::NoConnector(id))?;
                self.connector_reference(element, inner).map(Some)
            }
            ElementClass::MechanicalEquipment => {
                log::debug!("mechanical equipment {} has no run end reference", id);
                Ok(None)
            }
            _ if is_linear(element, DEFAULT_LINEAR_TOLERANCE) => {
                self.connector_reference(element, outer()?).map(Some)
            }
            _ => self.centerline_reference(element).map(Some),
        }
    }

    fn sub_dimensions(&mut self, view: &View, line: Line3) -> Vec<SubDimension> {
        let mut subs = Vec::new();
        for index in 0..self.line.len() {
            let id = self.line.elements()[index];
            let class = match self.element(id) {
                Ok(element) => ElementClass::of(element),
                Err(e) => {
                    self.fail(id, e);
                    continue;
                }
            };
            match self.sub_dimension_references(index) {
                Ok(Some(references)) => subs.push(SubDimension {
                    element: id,
                    request: DimensionRequest {
                        view: view.id,
                        line,
                        references,
                        dimension_type: self.styles.secondary_for(&class),
                    },
                }),
                Ok(None) => {}
                Err(e) => self.fail(id, e),
            }
        }
        subs
    }

    fn sub_dimension_references(
        &mut self,
        index: usize,
    ) -> Result<Option<Vec<ReferenceId>>, DimensionError> {
        let id = self.line.elements()[index];
        let element = self.element(id)?;
        let interior = !self.line.is_edge(index);

        match ElementClass::of(element) {
            ElementClass::Pipe | ElementClass::MechanicalEquipment => Ok(None),
            ElementClass::Flange(_) => match self.styles.flange_mode(&element.type_id) {
                FlangeDimensionMode::None | FlangeDimensionMode::Negate => Ok(None),
                FlangeDimensionMode::Default if !interior => Ok(None),
                FlangeDimensionMode::Default | FlangeDimensionMode::Exact => {
                    self.span(element).map(Some)
                }
                FlangeDimensionMode::Partial => self.partial_span(index),
            },
            _ if is_linear(element, DEFAULT_LINEAR_TOLERANCE) => self.span(element).map(Some),
            _ => self.centerline_span(index).map(Some),
        }
    }

    /// Both ends of a two-port element.
    fn span(&self, element: &Element) -> Result<Vec<ReferenceId>, DimensionError> {
        let connectors = self.graph.connectors(element.id);
        let (Some(first), Some(last)) = (connectors.first(), connectors.last()) else {
            return Err(DimensionError::NoConnector(element.id));
        };
        if first == last {
            return Err(DimensionError::NoConnector(element.id));
        }
        Ok(vec![
            self.connector_reference(element, *first)?,
            self.connector_reference(element, *last)?,
        ])
    }

    /// From the flange's external-facing port to the far port of its
    /// non-pipe neighbour, once per pair. Without such a neighbour the
    /// flange is treated like the default mode.
    fn partial_span(&mut self, index: usize) -> Result<Option<Vec<ReferenceId>>, DimensionError> {
        let elements = self.line.elements();
        let id = elements[index];
        let element = self.element(id)?;
        let neighbour = [index + 1, index.wrapping_sub(1)]
            .into_iter()
            .filter_map(|i| elements.get(i).copied())
            .find(|n| {
                self.graph
                    .model()
                    .element(*n)
                    .is_some_and(|e| ElementClass::of(e) != ElementClass::Pipe)
            });

        let Some(neighbour) = neighbour else {
            log::debug!("flange {} has no partner for a partial dimension", id);
            return if self.line.is_edge(index) {
                Ok(None)
            } else {
                self.span(element).map(Some)
            };
        };

        let key = (id.min(neighbour), id.max(neighbour));
        if !self.pairs.insert(key) {
            return Ok(None);
        }

        let external = self
            .graph
            .connectors(id)
            .into_iter()
            .find(|c| {
                self.graph
                    .try_get_connected(*c)
                    .map_or(true, |peer| peer.owner != neighbour)
            })
            .ok_or(DimensionError::NoConnector(id))?;
        let far = joint(self.graph, neighbour, id)
            .and_then(|c| self.graph.adjacent_connector(c))
            .ok_or(DimensionError::NoConnector(neighbour))?;
        Ok(Some(vec![
            self.connector_reference(element, external)?,
            self.connector_reference(self.element(neighbour)?, far)?,
        ]))
    }

    /// In-line connector to centerline, continued to the other in-line
    /// connector when the element is not a run edge.
    fn centerline_span(&self, index: usize) -> Result<Vec<ReferenceId>, DimensionError> {
        let elements = self.line.elements();
        let id = elements[index];
        let element = self.element(id)?;
        let before = index
            .checked_sub(1)
            .and_then(|i| joint(self.graph, id, elements[i]));
        let after = elements
            .get(index + 1)
            .and_then(|next| joint(self.graph, id, *next));

        let mut references = Vec::with_capacity(3);
        if let Some(c) = before {
            references.push(self.connector_reference(element, c)?);
        }
        references.push(self.centerline_reference(element)?);
        if let Some(c) = after {
            references.push(self.connector_reference(element, c)?);
        }
        if references.len() < 2 {
            return Err(DimensionError::NoConnector(id));
        }
        Ok(references)
    }
}
