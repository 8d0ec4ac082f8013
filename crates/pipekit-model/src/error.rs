//! Error types for the host model.

use thiserror::Error;

use crate::{ConnectorId, ElementId};

/// Errors raised by the host model.
#[derive(Error, Debug)]
pub enum ModelError {
    /// Element does not exist.
    #[error("element {0} not found")]
    ElementNotFound(ElementId),

    /// Connector does not exist.
    #[error("connector {0} not found")]
    ConnectorNotFound(ConnectorId),

    /// Element has no usable connector manager.
    #[error("element {0} has no valid connector manager")]
    NoConnectorManager(ElementId),

    /// Connector already joined to another port.
    #[error("connector {0} is already connected")]
    AlreadyConnected(ConnectorId),

    /// Parameter does not exist on the element.
    #[error("parameter '{name}' not found on element {element}")]
    ParameterNotFound {
        /// Element queried.
        element: ElementId,
        /// Parameter name.
        name: String,
    },

    /// The host refused to create a dimension.
    #[error("dimension creation failed: {0}")]
    DimensionFailed(String),

    /// Element stored under a key other than its own id.
    #[error("element {found} is stored under id {key}")]
    ElementKeyMismatch {
        /// Map key.
        key: ElementId,
        /// Id carried by the element.
        found: ElementId,
    },

    /// Connector id does not match its owner and position.
    #[error("connector at position {position} of element {element} is labelled {found}")]
    ConnectorMismatch {
        /// Owning element.
        element: ElementId,
        /// Position in the element's connector list.
        position: usize,
        /// Id carried by the connector.
        found: ConnectorId,
    },

    /// JSON (de)serialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}
