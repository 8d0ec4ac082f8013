#![warn(missing_docs)]

//! Connector graph traversal and end-prep classification.
//!
//! [`ConnectorGraph`] walks joins between connectors: peer lookup, the
//! adjacent port on the same owner, and skip-through traversal across
//! pass-through fittings. The end-prep classifier builds on it to describe
//! how each end of a pipe is prepared (`"MJ x PE"`).
//!
//! # Example
//!
//! ```
//! use pipekit_connect::{both_end_preps, ConnectorGraph, PreferenceSet};
//! use pipekit_math::Point3;
//! use pipekit_model::{Document, Element, ElementId, LogNotifier, PassThroughRule};
//!
//! let mut doc = Document::new();
//! doc.add_element(Element::pipe(ElementId(1), Point3::origin(), Point3::new(10.0, 0.0, 0.0)));
//!
//! let rule = PassThroughRule::default();
//! let graph = ConnectorGraph::new(&doc, &rule, &LogNotifier);
//! let prefs = PreferenceSet::seed(&doc);
//! assert_eq!(both_end_preps(&graph, ElementId(1), &prefs).unwrap(), "PE x PE");
//! ```

mod end_prep;
mod graph;
mod preferences;

pub use end_prep::{
    both_end_preps, check_if_reorder, end_prep, format_end_preps, parse_end_prep, EndPrepInfo,
    EndType, ParsedEndPrep, PLAIN_END,
};
pub use graph::{ConnectorGraph, DEFAULT_TRAVERSAL_LIMIT};
pub use preferences::{
    PipeEndPrepPreferences, PreferenceSet, DEFAULT_BELL, DEFAULT_SPIGOT, NULL_END_PREP,
};

use pipekit_model::{ConnectorId, ElementId};
use thiserror::Error;

/// Errors from connector traversal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TraversalError {
    /// A walk through pass-through fittings came back to a connector it
    /// had already visited.
    #[error("connector cycle detected: walk from {start} revisited {revisited}")]
    CycleDetected {
        /// Connector the walk started from.
        start: ConnectorId,
        /// Connector visited twice.
        revisited: ConnectorId,
    },

    /// A walk took more steps than allowed.
    #[error("traversal exceeded {0} steps")]
    IterationLimit(usize),
}

/// Errors from end-prep classification.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EndPrepError {
    /// Element does not exist.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// Element is not a two-port element.
    #[error("element {element} has {count} connectors, expected 2")]
    NotTwoPort {
        /// Element inspected.
        element: ElementId,
        /// Number of connectors found.
        count: usize,
    },

    /// Connector traversal failed.
    #[error(transparent)]
    Traversal(#[from] TraversalError),
}
