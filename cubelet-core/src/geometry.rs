//! Geometry primitives for picking: axes, cube faces and rays
use nalgebra::{Point3, Unit, Vector3};
use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// Half the edge length of the whole 3x3x3 cube
pub const HALF_EXTENT: f64 = 1.5;

/// Slack allowed when testing whether a point lies on a face
const BOUNDS_EPSILON: f64 = 1e-9;

/// Corners of the unit square every sticker is drawn from, in fan order
pub const UNIT_QUAD: [[f64; 3]; 4] = [
    [-0.5, 0.5, 0.0],
    [-0.5, -0.5, 0.0],
    [0.5, -0.5, 0.0],
    [0.5, 0.5, 0.0],
];

/// Coordinate axis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Axis {
    X,
    Y,
    Z,
}

impl Axis {
    pub const ALL: [Axis; 3] = [Axis::X, Axis::Y, Axis::Z];

    pub fn index(self) -> usize {
        match self {
            Axis::X => 0,
            Axis::Y => 1,
            Axis::Z => 2,
        }
    }

    pub fn unit(self) -> Unit<Vector3<f64>> {
        match self {
            Axis::X => Vector3::x_axis(),
            Axis::Y => Vector3::y_axis(),
            Axis::Z => Vector3::z_axis(),
        }
    }

    /// The two axes perpendicular to this one, in cyclic order
    pub fn others(self) -> [Axis; 2] {
        match self {
            Axis::X => [Axis::Y, Axis::Z],
            Axis::Y => [Axis::Z, Axis::X],
            Axis::Z => [Axis::X, Axis::Y],
        }
    }

    /// The axis that is neither `self` nor `other`
    pub fn third(self, other: Axis) -> Axis {
        match (self, other) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::X) => Axis::Z,
            (Axis::Y, Axis::Z) | (Axis::Z, Axis::Y) => Axis::X,
            _ => Axis::Y,
        }
    }

    /// +1 when `self` × `other` points along the third axis, -1 when it
    /// points against it, 0 for parallel axes
    pub fn handedness(self, other: Axis) -> i8 {
        match (self, other) {
            (Axis::X, Axis::Y) | (Axis::Y, Axis::Z) | (Axis::Z, Axis::X) => 1,
            (Axis::Y, Axis::X) | (Axis::Z, Axis::Y) | (Axis::X, Axis::Z) => -1,
            _ => 0,
        }
    }
}

impl FromStr for Axis {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "X" | "x" => Ok(Axis::X),
            "Y" | "y" => Ok(Axis::Y),
            "Z" | "z" => Ok(Axis::Z),
            other => Err(Error::InvalidAxis(other.to_string())),
        }
    }
}

impl fmt::Display for Axis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Axis::X => "X",
            Axis::Y => "Y",
            Axis::Z => "Z",
        };
        f.write_str(name)
    }
}

/// One of the six outer faces of the cube
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Face {
    pub axis: Axis,
    pub positive: bool,
}

impl Face {
    pub fn new(axis: Axis, positive: bool) -> Self {
        Self { axis, positive }
    }

    pub fn all() -> impl Iterator<Item = Face> {
        Axis::ALL
            .into_iter()
            .flat_map(|axis| [Face::new(axis, true), Face::new(axis, false)])
    }

    pub fn sign(self) -> f64 {
        if self.positive {
            1.0
        } else {
            -1.0
        }
    }

    /// Plane offset of this face along its axis
    pub fn offset(self) -> f64 {
        self.sign() * HALF_EXTENT
    }

    /// True when the two in-plane coordinates of `point` lie on the face
    pub fn contains(self, point: &Point3<f64>) -> bool {
        self.axis
            .others()
            .iter()
            .all(|a| point[a.index()].abs() <= HALF_EXTENT + BOUNDS_EPSILON)
    }
}

impl fmt::Display for Face {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", if self.positive { '+' } else { '-' }, self.axis)
    }
}

/// A ray between a point on the near clip plane and one on the far clip plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub near: Point3<f64>,
    pub far: Point3<f64>,
}

impl Ray {
    pub fn new(near: Point3<f64>, far: Point3<f64>) -> Self {
        Self { near, far }
    }

    pub fn at(&self, t: f64) -> Point3<f64> {
        self.near + (self.far - self.near) * t
    }

    /// Intersect with the plane `axis = value` by interpolating along the ray.
    /// Returns the ray parameter and the hit point, or `None` when the ray is
    /// parallel to the plane.
    pub fn intersect_plane(&self, axis: Axis, value: f64) -> Option<(f64, Point3<f64>)> {
        let i = axis.index();
        let span = self.far[i] - self.near[i];
        if span.abs() < f64::EPSILON {
            return None;
        }

        let t = (value - self.near[i]) / span;
        let mut point = self.at(t);
        point[i] = value;
        Some((t, point))
    }
}
