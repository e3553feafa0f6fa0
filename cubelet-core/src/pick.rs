//! Face picking: turn a press/release drag into a slice move
use log::debug;
use nalgebra::{Point2, Point3};

use crate::cube::Move;
use crate::error::{Error, Result};
use crate::geometry::{Axis, Face, Ray};
use crate::projection::unproject;
use crate::transform::Transform;

/// Slice boundaries along the rotation axis
const LAYER_THRESHOLD: f64 = 0.5;

/// Drags shorter than this (in object units) select nothing
const MIN_DRAG: f64 = 1e-9;

/// Everything learned from one drag
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Pick {
    /// Face the press landed on
    pub face: Face,
    /// Press point on the face plane
    pub press: Point3<f64>,
    /// Release point on the same plane
    pub release: Point3<f64>,
    /// In-plane axis the drag mostly followed
    pub drag_axis: Axis,
    pub axis: Axis,
    pub layer: i8,
    pub ccw: bool,
}

impl Pick {
    pub fn to_move(&self) -> Move {
        Move::new(self.axis, self.layer, self.ccw)
    }
}

/// Bucket a coordinate into slice -1, 0 or 1
pub fn layer_of(value: f64) -> i8 {
    if value < -LAYER_THRESHOLD {
        -1
    } else if value > LAYER_THRESHOLD {
        1
    } else {
        0
    }
}

/// Face the ray enters first, with the entry point. Only hits in front of
/// the ray's near point count.
pub fn hit_face(ray: &Ray) -> Option<(Face, Point3<f64>)> {
    Face::all()
        .filter_map(|face| {
            let (t, point) = ray.intersect_plane(face.axis, face.offset())?;
            (t >= 0.0 && face.contains(&point)).then_some((t, face, point))
        })
        .min_by(|a, b| a.0.total_cmp(&b.0))
        .map(|(_, face, point)| (face, point))
}

/// Work out which slice a drag from `press` to `release` (clip coordinates)
/// turns, and in which direction. The turn carries the touched sticker
/// along with the pointer.
pub fn pick(camera: &Transform, press: Point2<f64>, release: Point2<f64>) -> Result<Pick> {
    let inverse = camera.invert()?;

    let press_ray = object_ray(&inverse, press)?;
    let (face, press_point) = hit_face(&press_ray).ok_or(Error::DegenerateRay)?;

    let release_ray = object_ray(&inverse, release)?;
    let (_, release_point) = release_ray
        .intersect_plane(face.axis, face.offset())
        .ok_or(Error::DegenerateRay)?;

    let [a, b] = face.axis.others();
    let delta_a = release_point[a.index()] - press_point[a.index()];
    let delta_b = release_point[b.index()] - press_point[b.index()];
    let (drag_axis, delta) = if delta_a.abs() >= delta_b.abs() {
        (a, delta_a)
    } else {
        (b, delta_b)
    };
    if delta.abs() < MIN_DRAG {
        return Err(Error::DegenerateRay);
    }

    let axis = face.axis.third(drag_axis);
    let layer = layer_of(press_point[axis.index()]);
    let ccw = face.sign() * f64::from(face.axis.handedness(drag_axis)) * delta > 0.0;

    debug!(
        "pick: face {} at ({:.3}, {:.3}, {:.3}), drag along {} by {:.3} -> {}[{}] {}",
        face,
        press_point.x,
        press_point.y,
        press_point.z,
        drag_axis,
        delta,
        axis,
        layer,
        if ccw { "ccw" } else { "cw" }
    );

    Ok(Pick {
        face,
        press: press_point,
        release: release_point,
        drag_axis,
        axis,
        layer,
        ccw,
    })
}

fn object_ray(inverse: &Transform, clip: Point2<f64>) -> Result<Ray> {
    unproject(inverse, clip).map_err(|err| match err {
        Error::PointAtInfinity => Error::DegenerateRay,
        other => other,
    })
}
