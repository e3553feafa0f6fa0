//! Camera and projection utilities
use nalgebra::{Point2, Point3};

use crate::error::Result;
use crate::geometry::{Axis, Ray};
use crate::transform::Transform;

/// Symmetric perspective frustum; `right` and `top` are half extents at the
/// near plane
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Frustum {
    pub right: f64,
    pub top: f64,
    pub near: f64,
    pub far: f64,
}

impl Frustum {
    /// Keep `right` at 1 and derive `top` from a width/height aspect ratio
    pub fn for_aspect(aspect: f64) -> Self {
        Self {
            top: 1.0 / aspect,
            ..Self::default()
        }
    }
}

impl Default for Frustum {
    fn default() -> Self {
        Self {
            right: 1.0,
            top: 0.75,
            near: 5.0,
            far: 35.0,
        }
    }
}

/// Placement and size of the drawing area in pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self {
            left: 0.0,
            top: 0.0,
            width,
            height,
        }
    }

    /// Map a pixel position to clip space, y pointing up
    pub fn to_clip(&self, px: f64, py: f64) -> Point2<f64> {
        let width = self.width.max(1.0);
        let height = self.height.max(1.0);
        Point2::new(
            2.0 * (px - self.left) / width - 1.0,
            1.0 - 2.0 * (py - self.top) / height,
        )
    }
}

/// Camera looking at the cube from outside
#[derive(Debug, Clone)]
pub struct Camera {
    transform: Transform,
}

impl Camera {
    /// Frustum, then step back `distance` along -Z, tilt about X and turn
    /// about Y (angles in degrees)
    pub fn new(frustum: Frustum, distance: f64, tilt: f64, turn: f64) -> Self {
        let mut transform = Transform::new();
        transform
            .frustum(frustum.right, frustum.top, frustum.near, frustum.far)
            .translate(0.0, 0.0, -distance)
            .rotate(tilt, Axis::X)
            .rotate(turn, Axis::Y);
        Self { transform }
    }

    pub fn from_transform(transform: Transform) -> Self {
        Self { transform }
    }

    pub fn transform(&self) -> &Transform {
        &self.transform
    }

    pub fn transform_mut(&mut self) -> &mut Transform {
        &mut self.transform
    }

    /// Turn the cube in front of the camera
    pub fn orbit(&mut self, angle: f64, axis: Axis) {
        self.transform.rotate(angle, axis);
    }

    /// Ray through a clip-space point, expressed in object space
    pub fn ray_through(&self, clip: Point2<f64>) -> Result<Ray> {
        let inverse = self.transform.invert()?;
        unproject(&inverse, clip)
    }
}

impl Default for Camera {
    fn default() -> Self {
        Self::new(Frustum::default(), 20.0, 20.0, -30.0)
    }
}

/// Map the near (z = -1) and far (z = +1) clip points under `clip` back
/// through an inverted camera transform
pub fn unproject(inverse: &Transform, clip: Point2<f64>) -> Result<Ray> {
    let near = inverse.transform_vertex(&Point3::new(clip.x, clip.y, -1.0))?;
    let far = inverse.transform_vertex(&Point3::new(clip.x, clip.y, 1.0))?;
    Ok(Ray::new(near, far))
}
