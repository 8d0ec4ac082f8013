#![warn(missing_docs)]

//! Multi-segment dimensions along a pipe line.
//!
//! Given an assembled [`PipeLine`](pipekit_line::PipeLine), a view and a
//! placement point, this crate computes:
//!
//! - **Layout**: the end-to-end element line projected onto the view plane,
//!   the primary dimension line through the placement point and, when the
//!   run lies parallel to the view, a secondary line offset toward the run
//! - **References**: dimensionable handles for connectors and centerlines,
//!   found through a chain of geometric fallbacks
//! - **Dimensions**: one overall dimension between the run ends plus
//!   per-element sub-dimensions, created through a
//!   [`DimensionHost`](pipekit_model::DimensionHost)
//!
//! Failures on a single element are reported through the graph's notifier
//! and skipped; the rest of the run is still dimensioned.

mod create;
mod layout;
mod reference;
mod styles;

#[cfg(test)]
mod fixtures;

pub use create::{
    create_dimensions, plan_dimensions, DimensionPlan, DimensionReport, ElementFailure,
    SubDimension,
};
pub use layout::{element_line, DimensionLayout, ElementLine};
pub use reference::{
    pipe_end_reference, resolve_centerline_reference, resolve_pseudo_reference,
    REFERENCE_TOLERANCE,
};
pub use styles::{DimensionStyles, FlangeDimensionMode};

use pipekit_model::{ElementId, ModelError};
use thiserror::Error;

/// Errors from dimension layout and reference resolution.
#[derive(Error, Debug)]
pub enum DimensionError {
    /// The view direction has no length.
    #[error("view {0} has a degenerate view direction")]
    DegenerateView(i64),

    /// The pipe line has no measurable extent.
    #[error("pipe line has no measurable extent")]
    DegenerateRun,

    /// The run is seen end-on in the view.
    #[error("pipe line runs along the view direction")]
    PerpendicularToView,

    /// An element of the line is missing from the document.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// The element has no connector usable for this dimension.
    #[error("element {0} has no usable connector")]
    NoConnector(ElementId),

    /// Every reference strategy failed.
    #[error("no dimensionable reference found on element {0}")]
    NoReference(ElementId),

    /// Host-side failure.
    #[error(transparent)]
    Host(#[from] ModelError),
}
