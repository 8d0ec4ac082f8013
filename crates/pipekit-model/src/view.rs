//! Views and dimension type metrics.

use std::collections::BTreeSet;

use pipekit_math::{vec_from_array, Plane, Vec3};
use serde::{Deserialize, Serialize};

use crate::{DimensionTypeId, ElementId, ViewId};

/// A host view that dimensions are placed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct View {
    /// Identity.
    pub id: ViewId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Direction the view looks along `[x, y, z]`.
    pub view_direction: [f64; 3],
    /// View scale (e.g. 48 for 1/4" = 1'-0").
    pub scale: f64,
    /// Elements hidden in this view.
    #[serde(default)]
    pub hidden: BTreeSet<ElementId>,
}

impl View {
    /// Create a view looking along `view_direction`.
    pub fn new(id: ViewId, view_direction: Vec3, scale: f64) -> Self {
        Self {
            id,
            name: String::new(),
            view_direction: [view_direction.x, view_direction.y, view_direction.z],
            scale,
            hidden: BTreeSet::new(),
        }
    }

    /// Plan view looking down the Z axis.
    pub fn plan(id: ViewId, scale: f64) -> Self {
        Self::new(id, Vec3::new(0.0, 0.0, -1.0), scale)
    }

    /// Builder: hide an element.
    pub fn hiding(mut self, element: ElementId) -> Self {
        self.hidden.insert(element);
        self
    }

    /// Whether `element` is visible in the view.
    pub fn is_visible(&self, element: ElementId) -> bool {
        !self.hidden.contains(&element)
    }

    /// The view plane, `None` for a degenerate view direction.
    pub fn plane(&self) -> Option<Plane> {
        Plane::from_normal(vec_from_array(self.view_direction))
    }
}

/// Text metrics of a dimension type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DimensionTypeInfo {
    /// Identity.
    pub id: DimensionTypeId,
    /// Display name.
    #[serde(default)]
    pub name: String,
    /// Text size in paper units.
    pub text_size: f64,
    /// Distance from text to dimension line in paper units.
    pub text_offset: f64,
}

impl DimensionTypeInfo {
    /// Paper-space clearance a dimension string of this type needs:
    /// text height plus three text offsets.
    pub fn clearance(&self) -> f64 {
        self.text_size + 3.0 * self.text_offset
    }
}
