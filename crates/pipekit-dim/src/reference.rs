//! Dimensionable references for connectors and centerlines.
//!
//! Connectors have no reference of their own. A connector is stood in for
//! by geometry at the same station along the dimension axis, tried in this
//! order:
//!
//! 1. a planar face facing along the axis
//! 2. an endpoint of an allow-listed centerline
//! 3. a planar face of instance geometry, referenced through its symbol
//! 4. a centerline endpoint of instance geometry, referenced through its symbol

use pipekit_math::{Line3, Plane, Point3, Tolerance};
use pipekit_model::{Element, GeometryObject, ReferenceId};

use crate::{DimensionError, DimensionStyles};

/// Tolerance for matching geometry positions against connector positions.
pub const REFERENCE_TOLERANCE: Tolerance = Tolerance {
    linear: 1e-4,
    angular: 1e-6,
};

/// Projected position of `p` along `axis`.
fn station(axis: &Line3, plane: &Plane, p: &Point3) -> f64 {
    axis.parameter_of(&plane.project_point(p))
}

fn face_matches(geometry: &GeometryObject, target: f64, axis: &Line3, plane: &Plane) -> bool {
    let Some((origin, normal)) = geometry.face_plane() else {
        return false;
    };
    REFERENCE_TOLERANCE.parallel(&plane.project_vec(&normal), axis.direction.as_ref())
        && REFERENCE_TOLERANCE.is_zero(station(axis, plane, &origin) - target)
}

/// Index of the line endpoint lying on `target` in the view.
fn matching_endpoint(geometry: &GeometryObject, target: &Point3, plane: &Plane) -> Option<usize> {
    let (start, end) = geometry.line_points()?;
    [start, end]
        .iter()
        .position(|p| REFERENCE_TOLERANCE.points_equal(&plane.project_point(p), target))
}

fn instances(element: &Element) -> impl Iterator<Item = (&GeometryObject, &GeometryObject)> {
    element.geometry.iter().flat_map(|g| {
        let (instance, symbol): (&[GeometryObject], &[GeometryObject]) = match g {
            GeometryObject::Instance { instance, symbol } => (instance, symbol),
            _ => (&[], &[]),
        };
        instance.iter().zip(symbol)
    })
}

/// Reference standing in for the point `point` of `element`.
pub fn resolve_pseudo_reference(
    element: &Element,
    point: &Point3,
    axis: &Line3,
    plane: &Plane,
    styles: &DimensionStyles,
) -> Result<ReferenceId, DimensionError> {
    let target = station(axis, plane, point);
    let projected = plane.project_point(point);

    let found = element
        .geometry
        .iter()
        .filter(|g| face_matches(g, target, axis, plane))
        .find_map(|g| g.reference().cloned())
        .or_else(|| {
            element
                .geometry
                .iter()
                .filter(|g| styles.is_centerline(g.style()))
                .find_map(|g| {
                    let end = matching_endpoint(g, &projected, plane)?;
                    g.endpoint_reference(end).cloned()
                })
        })
        .or_else(|| {
            instances(element)
                .filter(|(inst, _)| face_matches(inst, target, axis, plane))
                .find_map(|(_, sym)| sym.reference().cloned())
        })
        .or_else(|| {
            instances(element)
                .filter(|(inst, sym)| styles.is_centerline(inst.style().or(sym.style())))
                .find_map(|(inst, sym)| {
                    let end = matching_endpoint(inst, &projected, plane)?;
                    sym.endpoint_reference(end).cloned()
                })
        });

    found.ok_or(DimensionError::NoReference(element.id))
}

/// Whether `geometry` is a visible centerline crossing the axis at `target`.
fn crosses_at(geometry: &GeometryObject, target: f64, axis: &Line3, plane: &Plane) -> bool {
    let Some((start, end)) = geometry.line_points() else {
        return false;
    };
    let visible = !REFERENCE_TOLERANCE
        .points_equal(&plane.project_point(&start), &plane.project_point(&end));
    visible
        && REFERENCE_TOLERANCE.is_zero(station(axis, plane, &start) - target)
        && REFERENCE_TOLERANCE.is_zero(station(axis, plane, &end) - target)
}

/// Reference of the centerline of a non-linear element: an allow-listed
/// line crossing the axis at the element's centre, or else a pseudo
/// reference at the centre point.
pub fn resolve_centerline_reference(
    element: &Element,
    axis: &Line3,
    plane: &Plane,
    styles: &DimensionStyles,
) -> Result<ReferenceId, DimensionError> {
    let center = element
        .centroid()
        .ok_or(DimensionError::NoReference(element.id))?;
    let target = station(axis, plane, &center);

    let direct = element
        .geometry
        .iter()
        .filter(|g| styles.is_centerline(g.style()) && crosses_at(g, target, axis, plane))
        .find_map(|g| g.reference().cloned());
    if let Some(reference) = direct {
        return Ok(reference);
    }
    let symbolic = instances(element)
        .filter(|(inst, sym)| {
            styles.is_centerline(inst.style().or(sym.style())) && crosses_at(inst, target, axis, plane)
        })
        .find_map(|(_, sym)| sym.reference().cloned());
    if let Some(reference) = symbolic {
        return Ok(reference);
    }

    resolve_pseudo_reference(element, &center, axis, plane, styles)
}

/// Endpoint reference of a pipe's centerline nearest to `point`.
pub fn pipe_end_reference(element: &Element, point: &Point3) -> Result<ReferenceId, DimensionError> {
    element
        .geometry
        .iter()
        .find_map(|g| {
            let (start, end) = g.line_points()?;
            let nearest = if (start - point).norm() <= (end - point).norm() { 0 } else { 1 };
            g.endpoint_reference(nearest).cloned()
        })
        .ok_or(DimensionError::NoReference(element.id))
}
