#![warn(missing_docs)]

//! Host document model for the pipekit piping engine.
//!
//! The CAD host is opaque to the engine. This crate describes the slice of
//! it the engine reads and writes:
//!
//! - **Identities**: elements, connectors, fitting types, references, views
//! - **Elements and connectors**: category, part type, ports and their peers
//! - **Geometry**: planar faces, lines and instance/symbol geometry pairs
//!   used to find dimensionable references
//! - **Host traits**: [`PipingModel`], [`ParameterStore`], [`DimensionHost`]
//!   and [`Notifier`], the seams a real host integration implements
//! - **Classification**: pure category/part-type predicates and the
//!   [`ElementClass`] tagged union
//!
//! [`Document`] is an in-memory snapshot implementing every host trait. It
//! round-trips through JSON and is what tests and the CLI run against.

pub mod classify;
mod document;
mod element;
mod error;
mod geometry;
mod host;
mod view;

pub use classify::{ElementClass, PassThroughRule};
pub use document::{CreatedDimension, Document};
pub use element::{Category, ConnectionType, Connector, Element, PartType};
pub use error::ModelError;
pub use geometry::GeometryObject;
pub use host::{
    DimensionHost, DimensionRequest, LogNotifier, Notifier, ParameterStore, PipingModel,
    RecordingNotifier,
};
pub use view::{DimensionTypeInfo, View};

use serde::{Deserialize, Serialize};
use std::fmt;

/// Identity of an element in the host document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ElementId(pub i64);

impl ElementId {
    /// The host's "no element" sentinel.
    pub const INVALID: Self = Self(-1);

    /// Whether this id refers to a real element.
    pub fn is_valid(&self) -> bool {
        *self != Self::INVALID
    }
}

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identity of a connector: its owner plus the port index on that owner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ConnectorId {
    /// Owning element.
    pub owner: ElementId,
    /// Port index within the owner's connector manager.
    pub index: u32,
}

impl ConnectorId {
    /// Create a connector id.
    pub fn new(owner: ElementId, index: u32) -> Self {
        Self { owner, index }
    }
}

impl fmt::Display for ConnectorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.owner, self.index)
    }
}

/// Identity of a fitting type, serialized as a string.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, Default)]
#[serde(transparent)]
pub struct TypeId(pub String);

impl TypeId {
    /// Create a type id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// The id as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for TypeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A stable, dimensionable geometry handle.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ReferenceId(pub String);

impl ReferenceId {
    /// Create a reference id.
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }
}

impl fmt::Display for ReferenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identity of a graphics style (line style).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct StyleId(pub i64);

/// Identity of a dimension type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionTypeId(pub i64);

/// Identity of a view.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ViewId(pub i64);

/// Identity of a dimension created in the host.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DimensionId(pub i64);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_element_id() {
        assert!(!ElementId::INVALID.is_valid());
        assert!(ElementId(0).is_valid());
    }

    #[test]
    fn test_ids_serialize_transparently() {
        let json = serde_json::to_string(&ElementId(42)).unwrap();
        assert_eq!(json, "42");
        let ty: TypeId = serde_json::from_str("\"1234\"").unwrap();
        assert_eq!(ty.as_str(), "1234");
    }

    #[test]
    fn test_connector_id_display() {
        assert_eq!(ConnectorId::new(ElementId(7), 1).to_string(), "7:1");
    }
}
