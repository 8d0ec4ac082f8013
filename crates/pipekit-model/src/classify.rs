//! Element classification.
//!
//! Pure predicates over category and part type, plus [`ElementClass`], the
//! single classification step the dimensioning code switches on.

use serde::{Deserialize, Serialize};

use crate::{Category, Element, PartType};

/// Whether the element is a pipe.
pub fn is_pipe(element: &Element) -> bool {
    element.category == Category::Pipe
}

/// Whether the element is a pipe fitting.
pub fn is_fitting(element: &Element) -> bool {
    element.category == Category::PipeFitting
}

/// Whether the element is a pipe accessory.
pub fn is_accessory(element: &Element) -> bool {
    element.category == Category::PipeAccessory
}

/// Whether the element is mechanical equipment.
pub fn is_mechanical_equipment(element: &Element) -> bool {
    element.category == Category::MechanicalEquipment
}

/// Part type of a fitting; `Undefined` for everything else.
pub fn part_type(element: Option<&Element>) -> PartType {
    match element {
        Some(e) if is_fitting(e) => e.part_type,
        _ => PartType::Undefined,
    }
}

/// Flange-like part types: flange, union and multi-port.
pub fn is_flange_part(part_type: PartType) -> bool {
    matches!(
        part_type,
        PartType::Flange | PartType::Union | PartType::MultiPort
    )
}

/// Bend part types: elbows and every branching fitting.
pub fn is_bend_part(part_type: PartType) -> bool {
    matches!(
        part_type,
        PartType::Elbow
            | PartType::Tee
            | PartType::Wye
            | PartType::Cross
            | PartType::LateralTee
            | PartType::LateralCross
    )
}

/// Whether the element is a flange, union or multi-port fitting.
pub fn is_flange(element: &Element) -> bool {
    is_fitting(element) && is_flange_part(element.part_type)
}

/// Whether the element is a bend fitting.
pub fn is_bend(element: &Element) -> bool {
    is_fitting(element) && is_bend_part(element.part_type)
}

/// Whether the element is a junction: a bend fitting with three or more ports.
pub fn is_junction(element: &Element) -> bool {
    is_bend(element) && element.connector_count() >= 3
}

/// Closed classification of an element, computed once and switched on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ElementClass {
    /// Straight pipe.
    Pipe,
    /// Flange, union or multi-port fitting.
    Flange(PartType),
    /// Bend or branching fitting.
    Junction(PartType),
    /// Pipe accessory.
    Accessory,
    /// Mechanical equipment.
    MechanicalEquipment,
    /// Any other element or fitting.
    Other(PartType),
}

impl ElementClass {
    /// Classify an element.
    pub fn of(element: &Element) -> Self {
        match element.category {
            Category::Pipe => ElementClass::Pipe,
            Category::PipeAccessory => ElementClass::Accessory,
            Category::MechanicalEquipment => ElementClass::MechanicalEquipment,
            Category::PipeFitting if is_flange_part(element.part_type) => {
                ElementClass::Flange(element.part_type)
            }
            Category::PipeFitting if is_bend_part(element.part_type) => {
                ElementClass::Junction(element.part_type)
            }
            Category::PipeFitting => ElementClass::Other(element.part_type),
            Category::Other => ElementClass::Other(PartType::Undefined),
        }
    }

    /// Flange-like elements are always linear within a pipe line.
    pub fn is_always_linear(&self) -> bool {
        matches!(self, ElementClass::Pipe | ElementClass::Flange(_))
    }
}

/// Rule identifying pass-through ("non-connector") fittings.
///
/// Pass-through fittings are transparent to end-prep and adjacency logic.
/// How they are recognized is project-dependent, so the rule is supplied by
/// configuration rather than fixed in the traversal code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value")]
pub enum PassThroughRule {
    /// Family name contains any of these strings (case-insensitive).
    FamilyNames(Vec<String>),
    /// Fitting part type is one of these.
    PartTypes(Vec<PartType>),
    /// Element carries a text parameter with this name and value.
    Parameter {
        /// Parameter name.
        name: String,
        /// Required value.
        value: String,
    },
    /// Nothing is a pass-through fitting.
    Never,
}

impl Default for PassThroughRule {
    fn default() -> Self {
        PassThroughRule::FamilyNames(vec!["Non-Connector".to_string()])
    }
}

impl PassThroughRule {
    /// Whether the element is a pass-through fitting under this rule.
    pub fn is_pass_through(&self, element: &Element) -> bool {
        if !is_fitting(element) {
            return false;
        }
        match self {
            PassThroughRule::FamilyNames(names) => {
                let family = element.family_name.to_lowercase();
                names
                    .iter()
                    .any(|n| !n.is_empty() && family.contains(&n.to_lowercase()))
            }
            PassThroughRule::PartTypes(types) => types.contains(&element.part_type),
            PassThroughRule::Parameter { name, value } => {
                element.parameters.get(name).is_some_and(|v| v == value)
            }
            PassThroughRule::Never => false,
        }
    }
}
