//! Exposed element geometry.
//!
//! Connectors have no native dimensionable handle, so dimensioning looks
//! for faces and line endpoints that coincide with them. Instance geometry
//! carries world positions but no stable references; the symbol geometry
//! at the same index carries the references.

use pipekit_math::{point_from_array, vec_from_array, Point3, Vec3};
use serde::{Deserialize, Serialize};

use crate::{ReferenceId, StyleId};

/// A geometry object exposed by an element.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GeometryObject {
    /// A planar face.
    PlanarFace {
        /// A point on the face.
        origin: [f64; 3],
        /// Face normal.
        normal: [f64; 3],
        /// Dimensionable reference of the face.
        #[serde(default)]
        reference: Option<ReferenceId>,
    },
    /// A line (symbolic or model).
    Line {
        /// Start point.
        start: [f64; 3],
        /// End point.
        end: [f64; 3],
        /// Graphics style of the line.
        #[serde(default)]
        style: Option<StyleId>,
        /// Reference of the whole line.
        #[serde(default)]
        reference: Option<ReferenceId>,
        /// Reference of the start point.
        #[serde(default)]
        start_reference: Option<ReferenceId>,
        /// Reference of the end point.
        #[serde(default)]
        end_reference: Option<ReferenceId>,
    },
    /// A family instance's geometry paired with its symbol geometry.
    Instance {
        /// Geometry in world coordinates.
        instance: Vec<GeometryObject>,
        /// Geometry of the symbol, index-aligned with `instance`.
        symbol: Vec<GeometryObject>,
    },
}

impl GeometryObject {
    /// Line endpoints as points, if this is a line.
    pub fn line_points(&self) -> Option<(Point3, Point3)> {
        match self {
            GeometryObject::Line { start, end, .. } => {
                Some((point_from_array(*start), point_from_array(*end)))
            }
            _ => None,
        }
    }

    /// Face origin and normal, if this is a planar face.
    pub fn face_plane(&self) -> Option<(Point3, Vec3)> {
        match self {
            GeometryObject::PlanarFace { origin, normal, .. } => {
                Some((point_from_array(*origin), vec_from_array(*normal)))
            }
            _ => None,
        }
    }

    /// Own reference of a face or line.
    pub fn reference(&self) -> Option<&ReferenceId> {
        match self {
            GeometryObject::PlanarFace { reference, .. } => reference.as_ref(),
            GeometryObject::Line { reference, .. } => reference.as_ref(),
            GeometryObject::Instance { .. } => None,
        }
    }

    /// Graphics style of a line.
    pub fn style(&self) -> Option<StyleId> {
        match self {
            GeometryObject::Line { style, .. } => *style,
            _ => None,
        }
    }

    /// Reference of the start (`0`) or end (`1`) point of a line.
    pub fn endpoint_reference(&self, end: usize) -> Option<&ReferenceId> {
        match self {
            GeometryObject::Line {
                start_reference,
                end_reference,
                ..
            } => match end {
                0 => start_reference.as_ref(),
                1 => end_reference.as_ref(),
                _ => None,
            },
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serde_tagged_geometry() {
        let face = GeometryObject::PlanarFace {
            origin: [0.0, 0.0, 0.0],
            normal: [1.0, 0.0, 0.0],
            reference: Some(ReferenceId::new("f1")),
        };
        let json = serde_json::to_string(&face).unwrap();
        assert!(json.contains(r#""type":"PlanarFace""#));
        let restored: GeometryObject = serde_json::from_str(&json).unwrap();
        assert_eq!(face, restored);
    }

    #[test]
    fn test_endpoint_references() {
        let line = GeometryObject::Line {
            start: [0.0; 3],
            end: [1.0, 0.0, 0.0],
            style: Some(StyleId(5)),
            reference: None,
            start_reference: Some(ReferenceId::new("s")),
            end_reference: None,
        };
        assert_eq!(line.endpoint_reference(0), Some(&ReferenceId::new("s")));
        assert_eq!(line.endpoint_reference(1), None);
        assert_eq!(line.style(), Some(StyleId(5)));
        assert!(line.face_plane().is_none());
    }
}
