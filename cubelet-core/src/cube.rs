//! The 3x3x3 cube: sub-cubes, slice moves and sticker drawing
use std::collections::HashSet;
use std::fmt;

use crate::geometry::Axis;
use crate::surface::Surface;
use crate::transform::Transform;

/// RGB colour in the [0, 1] range
pub type Color = [f32; 3];

const BORDER: Color = [0.0, 0.0, 0.0];

pub const PLUS_Z: Color = [0.0, 0.6, 0.3];
pub const PLUS_X: Color = [0.8, 0.0, 0.0];
pub const MINUS_Z: Color = [0.1, 0.4, 0.8];
pub const MINUS_X: Color = [0.9, 0.5, 0.0];
pub const MINUS_Y: Color = [0.9, 0.9, 0.9];
pub const PLUS_Y: Color = [1.0, 0.8, 0.0];

/// Inset of a coloured sticker inside its black border
const STICKER_SCALE: f64 = 0.9;
/// Lift of the sticker above the border, avoids depth fighting
const STICKER_LIFT: f64 = 0.001;

/// A quarter turn of one slice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Move {
    pub axis: Axis,
    /// Slice coordinate along `axis`, one of -1, 0, 1
    pub layer: i8,
    /// Counter-clockwise looking down the positive axis
    pub ccw: bool,
}

impl Move {
    pub fn new(axis: Axis, layer: i8, ccw: bool) -> Self {
        Self { axis, layer, ccw }
    }

    pub fn inverse(self) -> Self {
        Self {
            ccw: !self.ccw,
            ..self
        }
    }

    /// Signed angle of the full turn
    pub fn degrees(self) -> f64 {
        if self.ccw {
            90.0
        } else {
            -90.0
        }
    }
}

impl fmt::Display for Move {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}[{:+}] {}",
            self.axis,
            self.layer,
            if self.ccw { "ccw" } else { "cw" }
        )
    }
}

/// One of the 27 cells of the cube
#[derive(Debug, Clone, PartialEq)]
pub struct SubCube {
    origin: [i8; 3],
    position: [i8; 3],
    rot: Transform,
}

impl SubCube {
    pub fn new(x: i8, y: i8, z: i8) -> Self {
        Self {
            origin: [x, y, z],
            position: [x, y, z],
            rot: Transform::new(),
        }
    }

    /// Grid cell the sub-cube started in; decides which stickers it carries
    pub fn origin(&self) -> [i8; 3] {
        self.origin
    }

    /// Grid cell the sub-cube currently occupies
    pub fn position(&self) -> [i8; 3] {
        self.position
    }

    /// Every slice rotation applied so far
    pub fn rot(&self) -> &Transform {
        &self.rot
    }

    pub fn coordinate(&self, axis: Axis) -> i8 {
        self.position[axis.index()]
    }

    pub fn in_layer(&self, axis: Axis, layer: i8) -> bool {
        self.coordinate(axis) == layer
    }

    /// Rotate by `degrees` about `axis` in object space
    pub fn turn(&mut self, degrees: f64, axis: Axis) {
        self.rot.pre_rotate(degrees, axis);
    }

    /// Move the logical position a quarter turn about `axis`
    pub fn rotate_xyz(&mut self, axis: Axis, ccw: bool) {
        let [x, y, z] = self.position;
        self.position = match (axis, ccw) {
            (Axis::X, true) => [x, -z, y],
            (Axis::X, false) => [x, z, -y],
            (Axis::Y, true) => [z, y, -x],
            (Axis::Y, false) => [-z, y, x],
            (Axis::Z, true) => [-y, x, z],
            (Axis::Z, false) => [y, -x, z],
        };
    }

    /// Remove drift accumulated while animating
    pub fn settle(&mut self) {
        self.rot.snap();
    }

    pub fn draw<S: Surface + ?Sized>(&self, camera: &mut Transform, surface: &mut S) {
        let [x0, y0, z0] = self.origin;
        let mut t = camera.scoped();
        t.multiply_by(&self.rot)
            .translate(f64::from(x0), f64::from(y0), f64::from(z0));

        draw_sticker(&mut t, surface, PLUS_Z, z0 == 1);
        t.rotate(90.0, Axis::Y);
        draw_sticker(&mut t, surface, PLUS_X, x0 == 1);
        t.rotate(90.0, Axis::Y);
        draw_sticker(&mut t, surface, MINUS_Z, z0 == -1);
        t.rotate(90.0, Axis::Y);
        draw_sticker(&mut t, surface, MINUS_X, x0 == -1);
        t.rotate(90.0, Axis::X);
        draw_sticker(&mut t, surface, MINUS_Y, y0 == -1);
        t.rotate(180.0, Axis::X);
        draw_sticker(&mut t, surface, PLUS_Y, y0 == 1);
    }
}

/// Black square on the local +Z side, with a coloured inset when the side
/// faces out of the cube
fn draw_sticker<S: Surface + ?Sized>(
    transform: &mut Transform,
    surface: &mut S,
    color: Color,
    outside: bool,
) {
    let mut t = transform.scoped();
    t.translate(0.0, 0.0, 0.5);
    surface.set_matrix(t.uniform());
    surface.set_color(BORDER);
    surface.draw_quad();

    if outside {
        t.scale(STICKER_SCALE, STICKER_SCALE, 1.0)
            .translate(0.0, 0.0, STICKER_LIFT);
        surface.set_matrix(t.uniform());
        surface.set_color(color);
        surface.draw_quad();
    }
}

/// The full 3x3x3 arrangement
#[derive(Debug, Clone, PartialEq)]
pub struct Cube {
    cubelets: Vec<SubCube>,
}

impl Cube {
    pub fn new() -> Self {
        let mut cubelets = Vec::with_capacity(27);
        for x in -1..=1 {
            for y in -1..=1 {
                for z in -1..=1 {
                    cubelets.push(SubCube::new(x, y, z));
                }
            }
        }
        Self { cubelets }
    }

    pub fn cubelets(&self) -> &[SubCube] {
        &self.cubelets
    }

    pub fn layer(&self, axis: Axis, layer: i8) -> impl Iterator<Item = &SubCube> {
        self.cubelets
            .iter()
            .filter(move |c| c.in_layer(axis, layer))
    }

    /// Advance the slice of `mv` by `degrees`, leaving logical positions alone
    pub fn turn_layer(&mut self, mv: Move, degrees: f64) {
        for cubelet in self
            .cubelets
            .iter_mut()
            .filter(|c| c.in_layer(mv.axis, mv.layer))
        {
            cubelet.turn(degrees, mv.axis);
        }
    }

    /// Commit a finished quarter turn: permute positions and snap rotations
    pub fn settle_layer(&mut self, mv: Move) {
        for cubelet in self
            .cubelets
            .iter_mut()
            .filter(|c| c.in_layer(mv.axis, mv.layer))
        {
            cubelet.rotate_xyz(mv.axis, mv.ccw);
            cubelet.settle();
        }
    }

    /// Apply a whole quarter turn at once
    pub fn apply(&mut self, mv: Move) {
        self.turn_layer(mv, mv.degrees());
        self.settle_layer(mv);
    }

    pub fn draw<S: Surface + ?Sized>(&self, camera: &mut Transform, surface: &mut S) {
        for cubelet in &self.cubelets {
            cubelet.draw(camera, surface);
        }
    }

    /// Every sub-cube back in its starting cell and orientation
    pub fn is_solved(&self) -> bool {
        let identity = Transform::new();
        self.cubelets
            .iter()
            .all(|c| c.position == c.origin && c.rot.matrix() == identity.matrix())
    }

    /// Current positions form a permutation of the 27 grid cells
    pub fn is_consistent(&self) -> bool {
        let in_range = self
            .cubelets
            .iter()
            .all(|c| c.position.iter().all(|v| (-1..=1).contains(v)));
        let distinct: HashSet<[i8; 3]> = self.cubelets.iter().map(|c| c.position).collect();
        in_range && self.cubelets.len() == 27 && distinct.len() == 27
    }
}

impl Default for Cube {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use nalgebra::Point3;

    /// Counts draw calls and remembers the colours used
    #[derive(Default)]
    struct Recorder {
        quads: usize,
        colors: Vec<Color>,
        current: Color,
    }

    impl Surface for Recorder {
        fn set_matrix(&mut self, _row_major: [f32; 16]) {}

        fn set_color(&mut self, rgb: [f32; 3]) {
            self.current = rgb;
        }

        fn draw_quad(&mut self) {
            self.quads += 1;
            self.colors.push(self.current);
        }
    }

    #[test]
    fn test_new_cube() {
        let cube = Cube::new();
        assert_eq!(cube.cubelets().len(), 27);
        assert!(cube.is_solved());
        assert!(cube.is_consistent());
        assert_eq!(cube.layer(Axis::Y, 1).count(), 9);
    }

    #[test]
    fn test_rotate_xyz_matches_rotation_matrix() {
        for axis in Axis::ALL {
            for ccw in [true, false] {
                let mut cubelet = SubCube::new(1, -1, 0);
                let mut rot = Transform::new();
                rot.rotate(if ccw { 90.0 } else { -90.0 }, axis);
                let moved = rot.transform_vertex(&Point3::new(1.0, -1.0, 0.0)).unwrap();

                cubelet.rotate_xyz(axis, ccw);
                let [x, y, z] = cubelet.position();
                assert_relative_eq!(
                    moved,
                    Point3::new(f64::from(x), f64::from(y), f64::from(z)),
                    epsilon = 1e-12
                );
            }
        }
    }

    #[test]
    fn test_move_and_inverse() {
        let mut cube = Cube::new();
        let mv = Move::new(Axis::X, 1, true);
        cube.apply(mv);
        assert!(cube.is_consistent());
        assert!(!cube.is_solved());

        cube.apply(mv.inverse());
        assert!(cube.is_solved());
    }

    #[test]
    fn test_four_quarter_turns() {
        let mut cube = Cube::new();
        let mv = Move::new(Axis::Z, 0, false);
        for _ in 0..4 {
            cube.apply(mv);
            assert!(cube.is_consistent());
        }
        assert!(cube.is_solved());
    }

    #[test]
    fn test_rot_tracks_position() {
        let mut cube = Cube::new();
        cube.apply(Move::new(Axis::Y, -1, true));
        cube.apply(Move::new(Axis::X, 1, false));
        for c in cube.cubelets() {
            let [x0, y0, z0] = c.origin();
            let [x, y, z] = c.position();
            let start = Point3::new(f64::from(x0), f64::from(y0), f64::from(z0));
            let p = c.rot().transform_vertex(&start).unwrap();
            assert_eq!(p, Point3::new(f64::from(x), f64::from(y), f64::from(z)));
        }
    }

    #[test]
    fn test_draw_sticker_counts() {
        let cube = Cube::new();
        let mut camera = Transform::new();
        let mut recorder = Recorder::default();
        cube.draw(&mut camera, &mut recorder);

        // 27 * 6 black squares plus 54 coloured stickers
        assert_eq!(recorder.quads, 27 * 6 + 54);
        assert_eq!(recorder.colors.iter().filter(|c| **c == PLUS_Y).count(), 9);
        assert_eq!(camera.depth(), 0);
        assert_eq!(*camera.matrix(), *Transform::new().matrix());
    }

    #[test]
    fn test_move_display() {
        assert_eq!(Move::new(Axis::Y, -1, true).to_string(), "Y[-1] ccw");
        assert_eq!(Move::new(Axis::Z, 0, false).to_string(), "Z[+0] cw");
    }
}
