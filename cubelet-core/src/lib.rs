//! Cubelet Core Library - transform engine and cube interaction logic
//!
//! This library provides a 4x4 homogeneous transform with a save/restore
//! stack, ray casting through an inverted camera, face picking on a 3x3x3
//! cube, and a frame-stepped slice rotation state machine. Drawing goes
//! through the [`Surface`] trait.

pub mod config;
pub mod cube;
pub mod error;
pub mod geometry;
pub mod pick;
pub mod projection;
pub mod session;
pub mod surface;
pub mod transform;

// Re-export commonly used types
pub use config::SessionConfig;
pub use cube::{Cube, Move, SubCube};
pub use error::{Error, Result};
pub use geometry::{Axis, Face, Ray};
pub use pick::{pick, Pick};
pub use projection::{Camera, Frustum, Viewport};
pub use session::{Phase, Session};
pub use surface::Surface;
pub use transform::{Scoped, Transform};
