//! Interactive session: camera, cube and the slice-rotation state machine.
//!
//! The session is stepped once per displayed frame by [`Session::tick`].
//! Pointer input arrives through [`Session::press`] and [`Session::release`];
//! a release while a slice is still turning is ignored.
use log::{debug, info, warn};
use nalgebra::Point2;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::config::SessionConfig;
use crate::cube::{Cube, Move};
use crate::error::{Error, Result};
use crate::geometry::Axis;
use crate::pick::pick;
use crate::projection::{Camera, Viewport};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Phase {
    /// Accepting picks
    Idle,
    /// A slice is turning; `frames_left` includes the upcoming frame
    Animating { mv: Move, frames_left: u32 },
}

/// Random scrambler that fires after a pause
struct Autoplay {
    rng: StdRng,
    idle_frames: u32,
}

impl Autoplay {
    fn new(rng: StdRng) -> Self {
        Self {
            rng,
            idle_frames: 0,
        }
    }

    fn random_move(&mut self) -> Move {
        let axis = Axis::ALL[self.rng.gen_range(0..Axis::ALL.len())];
        let layer = self.rng.gen_range(-1..=1);
        Move::new(axis, layer, self.rng.gen_bool(0.5))
    }
}

pub struct Session {
    config: SessionConfig,
    camera: Camera,
    cube: Cube,
    viewport: Viewport,
    phase: Phase,
    pressed: Option<Point2<f64>>,
    autoplay: Option<Autoplay>,
}

impl Session {
    pub fn new(config: SessionConfig, viewport: Viewport) -> Self {
        let camera = config.camera();
        debug!("camera:\n{}", camera.transform());
        let autoplay = config
            .autoplay
            .then(|| Autoplay::new(StdRng::from_entropy()));
        Self {
            config,
            camera,
            cube: Cube::new(),
            viewport,
            phase: Phase::Idle,
            pressed: None,
            autoplay,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn camera(&self) -> &Camera {
        &self.camera
    }

    pub fn cube(&self) -> &Cube {
        &self.cube
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_idle(&self) -> bool {
        self.phase == Phase::Idle
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn set_viewport(&mut self, viewport: Viewport) {
        self.viewport = viewport;
    }

    /// Turn the camera around the cube
    pub fn orbit(&mut self, angle: f64, axis: Axis) {
        self.camera.orbit(angle, axis);
    }

    pub fn autoplay(&self) -> bool {
        self.autoplay.is_some()
    }

    pub fn set_autoplay(&mut self, enabled: bool) {
        if enabled == self.autoplay() {
            return;
        }
        self.autoplay = enabled.then(|| Autoplay::new(StdRng::from_entropy()));
        info!("autoplay {}", if enabled { "on" } else { "off" });
    }

    /// Enable autoplay with a reproducible move sequence
    pub fn seed_autoplay(&mut self, seed: u64) {
        self.autoplay = Some(Autoplay::new(StdRng::seed_from_u64(seed)));
    }

    /// Pointer pressed at pixel coordinates
    pub fn press(&mut self, px: f64, py: f64) {
        self.pressed = Some(self.viewport.to_clip(px, py));
    }

    /// Pointer released at pixel coordinates. Starts and returns the picked
    /// move; a drag that misses the cube is dropped without touching it.
    pub fn release(&mut self, px: f64, py: f64) -> Result<Option<Move>> {
        let Some(press) = self.pressed.take() else {
            return Ok(None);
        };
        if !self.is_idle() {
            debug!("release ignored while animating");
            return Ok(None);
        }

        let release = self.viewport.to_clip(px, py);
        match pick(self.camera.transform(), press, release) {
            Ok(picked) => {
                let mv = picked.to_move();
                self.start(mv)?;
                Ok(Some(mv))
            }
            Err(err @ (Error::DegenerateRay | Error::SingularMatrix)) => {
                warn!("pick discarded: {}", err);
                Ok(None)
            }
            Err(err) => Err(err),
        }
    }

    /// Begin animating a quarter turn
    pub fn start(&mut self, mv: Move) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        info!("turning {}", mv);
        self.phase = Phase::Animating {
            mv,
            frames_left: self.config.turn_frames(),
        };
        Ok(())
    }

    /// Put every sub-cube back in place
    pub fn reset(&mut self) -> Result<()> {
        if !self.is_idle() {
            return Err(Error::Busy);
        }
        self.cube = Cube::new();
        info!("cube reset");
        Ok(())
    }

    /// Advance one frame and draw the cube. Returns the phase after the frame.
    pub fn tick<S: Surface + ?Sized>(&mut self, surface: &mut S) -> Phase {
        match self.phase {
            Phase::Animating { mv, frames_left } => {
                let step = self.config.step_degrees();
                self.cube
                    .turn_layer(mv, if mv.ccw { step } else { -step });
                self.cube.draw(self.camera.transform_mut(), surface);

                if frames_left <= 1 {
                    self.cube.settle_layer(mv);
                    self.phase = Phase::Idle;
                    if let Some(autoplay) = self.autoplay.as_mut() {
                        autoplay.idle_frames = 0;
                    }
                    info!("finished {}", mv);
                } else {
                    self.phase = Phase::Animating {
                        mv,
                        frames_left: frames_left - 1,
                    };
                }
            }
            Phase::Idle => {
                self.cube.draw(self.camera.transform_mut(), surface);

                let pause = self.config.pause_frames;
                let next = self.autoplay.as_mut().and_then(|autoplay| {
                    autoplay.idle_frames += 1;
                    (autoplay.idle_frames >= pause).then(|| autoplay.random_move())
                });
                if let Some(mv) = next {
                    self.phase = Phase::Animating {
                        mv,
                        frames_left: self.config.turn_frames(),
                    };
                    info!("autoplay turning {}", mv);
                }
            }
        }
        self.phase
    }
}
