//! 3D homogeneous transforms with a save/restore stack
use nalgebra::{Matrix4, Point3, Vector3, Vector4};
use std::fmt;
use std::ops::{Deref, DerefMut};

use crate::error::{Error, Result};
use crate::geometry::Axis;

/// Determinants below this are treated as zero when inverting
const SINGULAR_EPSILON: f64 = 1e-12;

/// A 4x4 transformation matrix plus a stack of saved matrices.
///
/// Mutators multiply the current matrix in place and return `&mut Self` so
/// calls chain: `t.translate(0.0, 0.0, -20.0).rotate(20.0, Axis::X)`.
/// Element order is row-major everywhere the matrix is exposed as a flat array.
#[derive(Debug, Clone, PartialEq)]
pub struct Transform {
    matrix: Matrix4<f64>,
    stack: Vec<Matrix4<f64>>,
}

impl Transform {
    pub fn new() -> Self {
        Self::from_matrix(Matrix4::identity())
    }

    pub fn from_matrix(matrix: Matrix4<f64>) -> Self {
        Self {
            matrix,
            stack: Vec::new(),
        }
    }

    pub fn from_row_major(elements: [f64; 16]) -> Self {
        Self::from_matrix(Matrix4::from_row_slice(&elements))
    }

    pub fn matrix(&self) -> &Matrix4<f64> {
        &self.matrix
    }

    pub fn to_row_major(&self) -> [f64; 16] {
        let mut out = [0.0; 16];
        for row in 0..4 {
            for col in 0..4 {
                out[row * 4 + col] = self.matrix[(row, col)];
            }
        }
        out
    }

    /// Row-major single precision copy, as uploaded to a rendering surface
    pub fn uniform(&self) -> [f32; 16] {
        self.to_row_major().map(|v| v as f32)
    }

    /// Number of saved matrices
    pub fn depth(&self) -> usize {
        self.stack.len()
    }

    /// Save a copy of the current matrix
    pub fn push(&mut self) {
        self.stack.push(self.matrix);
    }

    /// Restore the most recently saved matrix
    pub fn pop(&mut self) -> Result<()> {
        self.matrix = self.stack.pop().ok_or(Error::StackUnderflow)?;
        Ok(())
    }

    /// Save the current matrix and restore it when the returned guard drops
    pub fn scoped(&mut self) -> Scoped<'_> {
        self.push();
        let depth = self.stack.len();
        Scoped {
            transform: self,
            depth,
        }
    }

    fn post_multiply(&mut self, m: Matrix4<f64>) -> &mut Self {
        self.matrix = self.matrix * m;
        self
    }

    fn pre_multiply(&mut self, m: Matrix4<f64>) -> &mut Self {
        self.matrix = m * self.matrix;
        self
    }

    pub fn translate(&mut self, tx: f64, ty: f64, tz: f64) -> &mut Self {
        self.post_multiply(Matrix4::new_translation(&Vector3::new(tx, ty, tz)))
    }

    pub fn scale(&mut self, sx: f64, sy: f64, sz: f64) -> &mut Self {
        self.post_multiply(Matrix4::new_nonuniform_scaling(&Vector3::new(sx, sy, sz)))
    }

    /// Rotate about a coordinate axis by `angle` degrees
    pub fn rotate(&mut self, angle: f64, axis: Axis) -> &mut Self {
        self.post_multiply(rotation_matrix(angle, axis))
    }

    /// Rotate about a coordinate axis, applying the rotation before the
    /// current matrix instead of after it
    pub fn pre_rotate(&mut self, angle: f64, axis: Axis) -> &mut Self {
        self.pre_multiply(rotation_matrix(angle, axis))
    }

    /// `rotate`/`pre_rotate` with the axis given by name
    pub fn rotate_named(&mut self, angle: f64, axis: &str, pre: bool) -> Result<&mut Self> {
        let axis: Axis = axis.parse()?;
        Ok(if pre {
            self.pre_rotate(angle, axis)
        } else {
            self.rotate(angle, axis)
        })
    }

    pub fn multiply_by(&mut self, other: &Transform) -> &mut Self {
        self.post_multiply(other.matrix)
    }

    /// Compose a symmetric perspective frustum. `right` and `top` are the
    /// half extents at the near plane. `near` must differ from `far`.
    pub fn frustum(&mut self, right: f64, top: f64, near: f64, far: f64) -> &mut Self {
        let a = (near + far) / (near - far);
        let b = 2.0 * near * far / (near - far);
        #[rustfmt::skip]
        let m = Matrix4::new(
            near / right, 0.0,        0.0, 0.0,
            0.0,          near / top, 0.0, 0.0,
            0.0,          0.0,        a,   b,
            0.0,          0.0,       -1.0, 0.0,
        );
        self.post_multiply(m)
    }

    /// A new transform holding the inverse matrix (with an empty stack)
    pub fn invert(&self) -> Result<Transform> {
        let det = self.matrix.determinant();
        if !det.is_finite() || det.abs() < SINGULAR_EPSILON {
            return Err(Error::SingularMatrix);
        }
        let inverse = self.matrix.try_inverse().ok_or(Error::SingularMatrix)?;
        Ok(Transform::from_matrix(inverse))
    }

    /// Apply to the homogeneous point (x, y, z, 1) and divide by w
    pub fn transform_vertex(&self, vertex: &Point3<f64>) -> Result<Point3<f64>> {
        let v = self.matrix * Vector4::new(vertex.x, vertex.y, vertex.z, 1.0);
        if v.w.abs() < f64::EPSILON {
            return Err(Error::PointAtInfinity);
        }
        Ok(Point3::new(v.x / v.w, v.y / v.w, v.z / v.w))
    }

    /// Round every element to the nearest integer. Only meaningful for
    /// transforms that are known to be signed permutations.
    pub fn snap(&mut self) -> &mut Self {
        self.matrix = self.matrix.map(|v| v.round() + 0.0);
        self
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::new()
    }
}

impl std::ops::Index<(usize, usize)> for Transform {
    type Output = f64;

    fn index(&self, index: (usize, usize)) -> &f64 {
        &self.matrix[index]
    }
}

/// Bracketed 4x4 grid, six characters per element with two decimals
impl fmt::Display for Transform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let blank = " ".repeat(32);
        writeln!(f, "┌{blank}┐")?;
        for row in 0..4 {
            write!(f, "│")?;
            for col in 0..4 {
                let gap = if col == 0 { " " } else { "  " };
                write!(f, "{gap}{:6.2}", self.matrix[(row, col)])?;
            }
            writeln!(f, " │")?;
        }
        write!(f, "└{blank}┘")
    }
}

/// Guard returned by [`Transform::scoped`]
pub struct Scoped<'a> {
    transform: &'a mut Transform,
    depth: usize,
}

impl Deref for Scoped<'_> {
    type Target = Transform;

    fn deref(&self) -> &Transform {
        self.transform
    }
}

impl DerefMut for Scoped<'_> {
    fn deref_mut(&mut self) -> &mut Transform {
        self.transform
    }
}

impl Drop for Scoped<'_> {
    fn drop(&mut self) {
        // Pushes left unmatched inside the scope are discarded with it.
        let stack = &mut self.transform.stack;
        if stack.len() >= self.depth {
            stack.truncate(self.depth);
            if let Some(saved) = stack.pop() {
                self.transform.matrix = saved;
            }
        }
    }
}

fn rotation_matrix(angle: f64, axis: Axis) -> Matrix4<f64> {
    Matrix4::from_axis_angle(&axis.unit(), angle.to_radians())
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_identity() {
        let t = Transform::new();
        assert_eq!(*t.matrix(), Matrix4::identity());
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn test_row_major_order() {
        let mut t = Transform::new();
        t.translate(1.0, 2.0, 3.0);
        let m = t.to_row_major();
        assert_eq!(m[3], 1.0);
        assert_eq!(m[7], 2.0);
        assert_eq!(m[11], 3.0);
        assert_eq!(t[(2, 3)], 3.0);

        let back = Transform::from_row_major(m);
        assert_eq!(back.matrix(), t.matrix());
    }

    #[test]
    fn test_rotation_quarter_turns() {
        let mut t = Transform::new();
        t.rotate(90.0, Axis::Z);
        let p = t.transform_vertex(&Point3::new(1.0, 0.0, 0.0)).unwrap();
        assert_relative_eq!(p, Point3::new(0.0, 1.0, 0.0), epsilon = 1e-12);

        let mut t = Transform::new();
        t.rotate(90.0, Axis::X);
        let p = t.transform_vertex(&Point3::new(0.0, 1.0, 0.0)).unwrap();
        assert_relative_eq!(p, Point3::new(0.0, 0.0, 1.0), epsilon = 1e-12);

        let mut t = Transform::new();
        t.rotate(90.0, Axis::Y);
        let p = t.transform_vertex(&Point3::new(0.0, 0.0, 1.0)).unwrap();
        assert_relative_eq!(p, Point3::new(1.0, 0.0, 0.0), epsilon = 1e-12);
    }

    #[test]
    fn test_pre_and_post_rotation_order() {
        let mut post = Transform::new();
        post.translate(1.0, 0.0, 0.0).rotate(90.0, Axis::Z);
        let mut pre = Transform::new();
        pre.translate(1.0, 0.0, 0.0).pre_rotate(90.0, Axis::Z);

        let origin = Point3::origin();
        // post: rotate then translate; pre: translate then rotate
        assert_relative_eq!(
            post.transform_vertex(&origin).unwrap(),
            Point3::new(1.0, 0.0, 0.0),
            epsilon = 1e-12
        );
        assert_relative_eq!(
            pre.transform_vertex(&origin).unwrap(),
            Point3::new(0.0, 1.0, 0.0),
            epsilon = 1e-12
        );
    }

    #[test]
    fn test_rotate_named() {
        let mut t = Transform::new();
        t.rotate_named(30.0, "y", false).unwrap();
        let mut expected = Transform::new();
        expected.rotate(30.0, Axis::Y);
        assert_eq!(t.matrix(), expected.matrix());

        let before = t.clone();
        assert_eq!(
            t.rotate_named(30.0, "W", true).map(|_| ()),
            Err(Error::InvalidAxis("W".to_string()))
        );
        assert_eq!(t, before);
    }

    #[test]
    fn test_frustum_maps_near_and_far_planes() {
        let mut t = Transform::new();
        t.frustum(1.0, 0.75, 5.0, 35.0);

        let near = t.transform_vertex(&Point3::new(1.0, 0.75, -5.0)).unwrap();
        assert_relative_eq!(near, Point3::new(1.0, 1.0, -1.0), epsilon = 1e-12);

        let far = t.transform_vertex(&Point3::new(0.0, 0.0, -35.0)).unwrap();
        assert_relative_eq!(far.z, 1.0, epsilon = 1e-12);
    }

    #[test]
    fn test_transform_vertex_at_infinity() {
        let mut t = Transform::new();
        t.frustum(1.0, 1.0, 1.0, 10.0);
        // w = -z, so points on the eye plane have no projection
        assert_eq!(
            t.transform_vertex(&Point3::new(1.0, 1.0, 0.0)),
            Err(Error::PointAtInfinity)
        );
    }

    #[test]
    fn test_invert() {
        let mut t = Transform::new();
        t.frustum(1.0, 0.75, 5.0, 35.0)
            .translate(0.0, 0.0, -20.0)
            .rotate(20.0, Axis::X)
            .rotate(-30.0, Axis::Y)
            .scale(2.0, 1.0, 0.5);
        let inv = t.invert().unwrap();
        assert_relative_eq!(
            t.matrix() * inv.matrix(),
            Matrix4::identity(),
            epsilon = 1e-9
        );
        assert_eq!(inv.depth(), 0);
    }

    #[test]
    fn test_invert_singular() {
        let mut t = Transform::new();
        t.scale(1.0, 0.0, 1.0);
        assert_eq!(t.invert(), Err(Error::SingularMatrix));
    }

    #[test]
    fn test_push_pop() {
        let mut t = Transform::new();
        t.rotate(10.0, Axis::X);
        let saved = *t.matrix();

        t.push();
        t.pop().unwrap();
        assert_eq!(*t.matrix(), saved);

        t.push();
        t.translate(4.0, 5.0, 6.0).scale(2.0, 2.0, 2.0);
        t.pop().unwrap();
        assert_eq!(*t.matrix(), saved);

        assert_eq!(t.pop(), Err(Error::StackUnderflow));
        assert_eq!(*t.matrix(), saved);
    }

    #[test]
    fn test_scoped_guard_restores() {
        let mut t = Transform::new();
        t.translate(1.0, 0.0, 0.0);
        let saved = *t.matrix();
        {
            let mut outer = t.scoped();
            outer.rotate(45.0, Axis::Y);
            let after_outer = *outer.matrix();
            {
                let mut inner = outer.scoped();
                inner.scale(3.0, 3.0, 3.0);
                // an unmatched manual push is discarded with the scope
                inner.push();
                assert_eq!(inner.depth(), 3);
            }
            assert_eq!(*outer.matrix(), after_outer);
            assert_eq!(outer.depth(), 1);
        }
        assert_eq!(*t.matrix(), saved);
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn test_scoped_guard_restores_on_early_return() {
        fn bail(t: &mut Transform) -> Result<()> {
            let mut scope = t.scoped();
            scope.translate(9.0, 9.0, 9.0);
            scope.rotate_named(5.0, "Q", false)?;
            Ok(())
        }

        let mut t = Transform::new();
        assert!(bail(&mut t).is_err());
        assert_eq!(*t.matrix(), Matrix4::identity());
        assert_eq!(t.depth(), 0);
    }

    #[test]
    fn test_snap() {
        let mut t = Transform::new();
        for _ in 0..90 {
            t.pre_rotate(1.0, Axis::X);
        }
        t.snap();
        let mut expected = Transform::new();
        expected.rotate(90.0, Axis::X).snap();
        assert_eq!(t.matrix(), expected.matrix());
        assert_eq!(t[(1, 2)], -1.0);
        assert_eq!(t[(2, 1)], 1.0);
    }

    #[test]
    fn test_display() {
        let text = Transform::new().to_string();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 6);
        assert_eq!(lines[1], "│   1.00    0.00    0.00    0.00 │");
        assert!(lines[0].starts_with('┌') && lines[0].ends_with('┐'));
        assert!(lines[5].starts_with('└') && lines[5].ends_with('┘'));
        assert_eq!(lines[0].chars().count(), lines[1].chars().count());
    }
}
