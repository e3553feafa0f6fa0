//! Session configuration
use crate::projection::{Camera, Frustum};

#[derive(Debug, Clone, PartialEq)]
pub struct SessionConfig {
    pub frustum: Frustum,
    /// Distance from the eye to the cube centre
    pub distance: f64,
    /// Camera tilt about X, degrees
    pub tilt: f64,
    /// Camera turn about Y, degrees
    pub turn: f64,
    /// Frames spent animating one quarter turn
    pub turn_frames: u32,
    /// Idle frames between autoplay moves
    pub pause_frames: u32,
    /// Scramble the cube with random moves while idle
    pub autoplay: bool,
}

impl SessionConfig {
    pub fn camera(&self) -> Camera {
        Camera::new(self.frustum, self.distance, self.tilt, self.turn)
    }

    pub fn turn_frames(&self) -> u32 {
        self.turn_frames.max(1)
    }

    /// Rotation applied to the moving slice on each frame
    pub fn step_degrees(&self) -> f64 {
        90.0 / f64::from(self.turn_frames())
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            frustum: Frustum::default(),
            distance: 20.0,
            tilt: 20.0,
            turn: -30.0,
            turn_frames: 90,
            pause_frames: 45,
            autoplay: false,
        }
    }
}
