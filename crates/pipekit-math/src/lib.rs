#![warn(missing_docs)]

//! Math types for the pipekit piping engine.
//!
//! Thin wrappers around nalgebra providing the handful of geometric
//! primitives the traversal and dimensioning code needs: points, vectors,
//! view planes, unbounded lines, and tolerance constants.

use nalgebra::{Unit, Vector3};

/// A point in 3D space.
pub type Point3 = nalgebra::Point3<f64>;

/// A vector in 3D space.
pub type Vec3 = Vector3<f64>;

/// A unit (normalized) direction vector in 3D space.
pub type Dir3 = Unit<Vector3<f64>>;

/// Convert a serialized `[x, y, z]` triple into a point.
pub fn point_from_array(a: [f64; 3]) -> Point3 {
    Point3::new(a[0], a[1], a[2])
}

/// Convert a serialized `[x, y, z]` triple into a vector.
pub fn vec_from_array(a: [f64; 3]) -> Vec3 {
    Vec3::new(a[0], a[1], a[2])
}

/// Convert a point into its serialized `[x, y, z]` triple.
pub fn point_to_array(p: &Point3) -> [f64; 3] {
    [p.x, p.y, p.z]
}

/// Linear interpolation between two points (`t = 0` gives `a`).
pub fn lerp(a: &Point3, b: &Point3, t: f64) -> Point3 {
    a + (b - a) * t
}

/// A plane through the world origin, defined by its unit normal.
///
/// View planes are handled this way: the projection of `p` is
/// `p - (n·p) n`, independent of where the view itself is placed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Plane {
    /// Unit normal of the plane.
    pub normal: Dir3,
}

impl Plane {
    /// Create a plane from a (not necessarily normalized) normal.
    ///
    /// Returns `None` for a zero-length normal.
    pub fn from_normal(normal: Vec3) -> Option<Self> {
        if normal.norm() < Tolerance::DEFAULT.linear {
            return None;
        }
        Some(Self {
            normal: Dir3::new_normalize(normal),
        })
    }

    /// Project a point onto the plane.
    pub fn project_point(&self, p: &Point3) -> Point3 {
        let n = self.normal.as_ref();
        p - n * n.dot(&p.coords)
    }

    /// Project a vector onto the plane.
    pub fn project_vec(&self, v: &Vec3) -> Vec3 {
        let n = self.normal.as_ref();
        v - n * n.dot(v)
    }
}

/// A line in 3D space, either unbounded or bounded by two points.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Line3 {
    /// Point on the line (the start point when bounded).
    pub origin: Point3,
    /// Unit direction.
    pub direction: Dir3,
    /// Length when bounded; `None` for an unbounded line.
    pub length: Option<f64>,
}

impl Line3 {
    /// Unbounded line through `origin` along `direction`.
    pub fn unbound(origin: Point3, direction: Vec3) -> Option<Self> {
        if direction.norm() < Tolerance::DEFAULT.linear {
            return None;
        }
        Some(Self {
            origin,
            direction: Dir3::new_normalize(direction),
            length: None,
        })
    }

    /// Bounded line from `start` to `end`. Returns `None` when degenerate.
    pub fn bound(start: Point3, end: Point3) -> Option<Self> {
        let d = end - start;
        let len = d.norm();
        if len < Tolerance::DEFAULT.linear {
            return None;
        }
        Some(Self {
            origin: start,
            direction: Dir3::new_normalize(d),
            length: Some(len),
        })
    }

    /// End point of a bounded line.
    pub fn end(&self) -> Option<Point3> {
        self.length.map(|l| self.origin + self.direction.as_ref() * l)
    }

    /// Parameter of the orthogonal projection of `p` onto the line.
    pub fn parameter_of(&self, p: &Point3) -> f64 {
        self.direction.as_ref().dot(&(p - self.origin))
    }

    /// Closest point on the (infinite) line to `p`.
    pub fn closest_point(&self, p: &Point3) -> Point3 {
        self.origin + self.direction.as_ref() * self.parameter_of(p)
    }

    /// Distance from `p` to the (infinite) line.
    pub fn distance_to(&self, p: &Point3) -> f64 {
        (p - self.closest_point(p)).norm()
    }

    /// Same line moved so that it passes through `origin`.
    pub fn through(&self, origin: Point3) -> Self {
        Self {
            origin,
            direction: self.direction,
            length: None,
        }
    }
}

/// Tolerance constants for geometric comparisons.
#[derive(Debug, Clone, Copy)]
pub struct Tolerance {
    /// Linear distance tolerance in model units.
    pub linear: f64,
    /// Angular tolerance in radians.
    pub angular: f64,
}

impl Tolerance {
    /// Default tolerances (1e-6 linear, 1e-9 rad angular).
    pub const DEFAULT: Self = Self {
        linear: 1e-6,
        angular: 1e-9,
    };

    /// Angle window for treating two connector ports as parallel.
    pub const PARALLEL_PORT_ANGLE: f64 = 1e-4;

    /// Allowed deviation between a run's direction and its projection
    /// onto a view plane.
    pub const VIEW_DIRECTION: f64 = 1e-3;

    /// Check if two points are coincident within tolerance.
    pub fn points_equal(&self, a: &Point3, b: &Point3) -> bool {
        (a - b).norm() < self.linear
    }

    /// Check if a scalar distance is effectively zero.
    pub fn is_zero(&self, d: f64) -> bool {
        d.abs() < self.linear
    }

    /// Check if two angles are effectively equal (in radians).
    pub fn angles_equal(&self, a: f64, b: f64) -> bool {
        (a - b).abs() < self.angular
    }

    /// Check if two vectors point along the same axis (either sense).
    pub fn parallel(&self, a: &Vec3, b: &Vec3) -> bool {
        let (na, nb) = (a.norm(), b.norm());
        if na < self.linear || nb < self.linear {
            return false;
        }
        (a.dot(b).abs() / (na * nb) - 1.0).abs() < self.angular.max(1e-9)
    }

    /// Check if `p` lies on the line through `a` and `b`.
    pub fn collinear(&self, a: &Point3, b: &Point3, p: &Point3) -> bool {
        match Line3::bound(*a, *b) {
            Some(line) => line.distance_to(p) < self.linear,
            None => self.points_equal(a, p),
        }
    }
}

impl Default for Tolerance {
    fn default() -> Self {
        Self::DEFAULT
    }
}
