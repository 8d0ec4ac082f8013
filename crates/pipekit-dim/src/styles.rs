//! Dimension styles consumed by dimension creation.

use std::collections::{BTreeMap, BTreeSet};

use pipekit_model::{DimensionTypeId, ElementClass, StyleId, TypeId};
use serde::{Deserialize, Serialize};

/// How a flange type is dimensioned inside a pipe line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
pub enum FlangeDimensionMode {
    /// No individual sub-dimension.
    None,
    /// Individual sub-dimension only when the flange is not a run edge.
    #[default]
    Default,
    /// Always an individual sub-dimension across both connectors.
    Exact,
    /// One sub-dimension spanning the flange and its in-line neighbour.
    Partial,
    /// Neither dimensioned individually nor used as a run endpoint.
    Negate,
}

/// Dimension types, centerline styles and flange modes of a document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DimensionStyles {
    /// Type of the overall (primary) dimension.
    pub primary: DimensionTypeId,
    /// Type of sub-dimensions without a more specific type. Its text
    /// metrics also set the offset of the secondary dimension line.
    pub secondary: DimensionTypeId,
    /// Sub-dimension type for pipes.
    pub secondary_pipe: Option<DimensionTypeId>,
    /// Sub-dimension type for fittings.
    pub secondary_fitting: Option<DimensionTypeId>,
    /// Sub-dimension type for accessories.
    pub secondary_accessory: Option<DimensionTypeId>,
    /// Line styles whose endpoints may stand in for connectors.
    pub centerline_styles: BTreeSet<StyleId>,
    /// Flange dimension mode per fitting type.
    pub flange_modes: BTreeMap<TypeId, FlangeDimensionMode>,
}

impl Default for DimensionStyles {
    fn default() -> Self {
        Self::new(DimensionTypeId(1), DimensionTypeId(1))
    }
}

impl DimensionStyles {
    /// Styles with the given primary and secondary types and nothing else.
    pub fn new(primary: DimensionTypeId, secondary: DimensionTypeId) -> Self {
        Self {
            primary,
            secondary,
            secondary_pipe: None,
            secondary_fitting: None,
            secondary_accessory: None,
            centerline_styles: BTreeSet::new(),
            flange_modes: BTreeMap::new(),
        }
    }

    /// Builder: allow a centerline style.
    pub fn with_centerline_style(mut self, style: StyleId) -> Self {
        self.centerline_styles.insert(style);
        self
    }

    /// Builder: set the flange mode of a fitting type.
    pub fn with_flange_mode(mut self, type_id: impl Into<String>, mode: FlangeDimensionMode) -> Self {
        self.flange_modes.insert(TypeId::new(type_id), mode);
        self
    }

    /// Flange mode of a fitting type; unlisted types use the default mode.
    pub fn flange_mode(&self, type_id: &TypeId) -> FlangeDimensionMode {
        self.flange_modes.get(type_id).copied().unwrap_or_default()
    }

    /// Whether lines of `style` may be used as references.
    pub fn is_centerline(&self, style: Option<StyleId>) -> bool {
        style.is_some_and(|s| self.centerline_styles.contains(&s))
    }

    /// Sub-dimension type for an element class.
    pub fn secondary_for(&self, class: &ElementClass) -> DimensionTypeId {
        let specific = match class {
            ElementClass::Pipe => self.secondary_pipe,
            ElementClass::Accessory => self.secondary_accessory,
            ElementClass::Flange(_) | ElementClass::Junction(_) | ElementClass::Other(_) => {
                self.secondary_fitting
            }
            ElementClass::MechanicalEquipment => None,
        };
        specific.unwrap_or(self.secondary)
    }
}
