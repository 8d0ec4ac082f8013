//! Element filter bounding a pipe-line walk.

use pipekit_math::Tolerance;
use pipekit_model::{classify, Element, ElementClass, View};
use serde::{Deserialize, Serialize};

/// Default distance within which a location point counts as lying on its
/// connector-to-connector line.
pub const DEFAULT_LINEAR_TOLERANCE: f64 = 1e-4;

/// Which piping elements a walk may pass into.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipingFilter {
    /// Straight pipes.
    pub pipes: bool,
    /// Flanges, unions and multi-port fittings.
    pub flanges: bool,
    /// Elbows and branching fittings.
    pub bends: bool,
    /// Every other fitting.
    pub other_fittings: bool,
    /// Pipe accessories.
    pub accessories: bool,
    /// Mechanical equipment.
    pub mechanical_equipment: bool,
    /// Additionally require the element to be linear (see [`is_linear`]).
    pub linear_only: bool,
    /// Distance tolerance of the linearity test.
    pub tolerance: f64,
}

impl Default for PipingFilter {
    fn default() -> Self {
        Self::default_run()
    }
}

impl PipingFilter {
    /// Pipes, flanges, other fittings and accessories; no bends or equipment.
    pub fn default_run() -> Self {
        Self {
            pipes: true,
            flanges: true,
            bends: false,
            other_fittings: true,
            accessories: true,
            mechanical_equipment: false,
            linear_only: false,
            tolerance: DEFAULT_LINEAR_TOLERANCE,
        }
    }

    /// Every piping element class.
    pub fn all() -> Self {
        Self {
            bends: true,
            mechanical_equipment: true,
            ..Self::default_run()
        }
    }

    /// Builder: toggle the linearity requirement.
    pub fn with_linear_only(mut self, linear_only: bool) -> Self {
        self.linear_only = linear_only;
        self
    }

    /// Builder: toggle bends and branching fittings.
    pub fn with_bends(mut self, bends: bool) -> Self {
        self.bends = bends;
        self
    }

    /// Whether the element's class is allowed, ignoring linearity and views.
    pub fn allows_class(&self, element: &Element) -> bool {
        match ElementClass::of(element) {
            ElementClass::Pipe => self.pipes,
            ElementClass::Flange(_) => self.flanges,
            ElementClass::Junction(_) => self.bends,
            ElementClass::Accessory => self.accessories,
            ElementClass::MechanicalEquipment => self.mechanical_equipment,
            ElementClass::Other(_) => self.other_fittings && classify::is_fitting(element),
        }
    }

    /// Whether a walk may pass into `element`, optionally only when it is
    /// visible in `view`.
    pub fn allows(&self, element: &Element, view: Option<&View>) -> bool {
        if view.is_some_and(|v| !v.is_visible(element.id)) {
            return false;
        }
        if !self.allows_class(element) {
            return false;
        }
        !self.linear_only || is_linear(element, self.tolerance)
    }
}

/// Whether an element runs straight through.
///
/// Pipes and flange-likes always do. Anything else needs exactly two
/// connectors with its location point on the line through them.
pub fn is_linear(element: &Element, tolerance: f64) -> bool {
    if ElementClass::of(element).is_always_linear() {
        return true;
    }
    let (Some(connectors), Some(location)) = (element.connectors.as_ref(), element.location_point())
    else {
        return false;
    };
    let [a, b] = connectors.as_slice() else {
        return false;
    };
    let tol = Tolerance {
        linear: tolerance,
        ..Tolerance::DEFAULT
    };
    tol.collinear(&a.origin_point(), &b.origin_point(), &location)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pipekit_math::Point3;
    use pipekit_model::{Category, ElementId, PartType, ViewId};

    fn valve(location: Point3) -> Element {
        Element::new(ElementId(5), Category::PipeAccessory)
            .with_location(location)
            .with_connector(Point3::new(0.0, 0.0, 0.0))
            .with_connector(Point3::new(2.0, 0.0, 0.0))
    }

    #[test]
    fn test_default_run_excludes_bends_and_equipment() {
        let f = PipingFilter::default_run();
        let elbow = Element::fitting(ElementId(1), PartType::Elbow, "e");
        let pump = Element::new(ElementId(2), Category::MechanicalEquipment);
        let cap = Element::fitting(ElementId(3), PartType::Cap, "c");
        let wall = Element::new(ElementId(4), Category::Other);
        assert!(!f.allows_class(&elbow));
        assert!(!f.allows_class(&pump));
        assert!(f.allows_class(&cap));
        assert!(!f.allows_class(&wall));
        assert!(PipingFilter::all().allows_class(&elbow));
    }

    #[test]
    fn test_collinear_location_is_linear() {
        assert!(is_linear(&valve(Point3::new(1.0, 0.0, 0.0)), 1e-4));
        assert!(!is_linear(&valve(Point3::new(1.0, 0.3, 0.0)), 1e-4));
    }

    #[test]
    fn test_linear_only_excludes_off_axis_elements() {
        let off_axis = valve(Point3::new(1.0, 0.3, 0.0));
        assert!(PipingFilter::default_run().allows(&off_axis, None));
        assert!(!PipingFilter::default_run()
            .with_linear_only(true)
            .allows(&off_axis, None));
    }

    #[test]
    fn test_junction_is_never_linear() {
        let tee = Element::fitting(ElementId(6), PartType::Tee, "t")
            .with_location(Point3::new(1.0, 0.0, 0.0))
            .with_connector(Point3::new(0.0, 0.0, 0.0))
            .with_connector(Point3::new(2.0, 0.0, 0.0))
            .with_connector(Point3::new(1.0, 1.0, 0.0));
        let f = PipingFilter::all().with_linear_only(true);
        assert!(!f.allows(&tee, None));
        assert!(PipingFilter::all().allows(&tee, None));
    }

    #[test]
    fn test_hidden_in_view_is_rejected() {
        let v = valve(Point3::new(1.0, 0.0, 0.0));
        let view = View::plan(ViewId(1), 48.0).hiding(ElementId(5));
        assert!(!PipingFilter::default_run().allows(&v, Some(&view)));
        let other = View::plan(ViewId(2), 48.0);
        assert!(PipingFilter::default_run().allows(&v, Some(&other)));
    }
}
