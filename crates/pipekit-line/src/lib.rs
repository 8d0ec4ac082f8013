#![warn(missing_docs)]

//! Pipe-line assembly.
//!
//! A pipe line is a maximal contiguous run of connected piping elements
//! around a selected pipe, bounded by junctions, open ends, or elements the
//! caller's [`PipingFilter`] rejects. It is the input to pipe-line selection
//! and to multi-segment dimensioning.

mod assemble;
mod filter;

pub use assemble::{build_default_pipe_line, build_pipe_line, PipeLine};
pub use filter::{is_linear, PipingFilter, DEFAULT_LINEAR_TOLERANCE};

use pipekit_model::ElementId;
use thiserror::Error;

/// Errors from pipe-line assembly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PipeLineError {
    /// Seed element does not exist.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// Seed element is not a pipe.
    #[error("element {0} is not a pipe")]
    NotAPipe(ElementId),

    /// A directional walk took more steps than allowed.
    #[error("pipe-line walk exceeded {0} steps")]
    IterationLimit(usize),
}
