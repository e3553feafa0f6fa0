//! Error type shared by the transform engine, picker and session
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Rotation axis name other than X, Y or Z
    #[error("invalid rotation axis {0:?} (expected X, Y or Z)")]
    InvalidAxis(String),

    /// Matrix has a zero determinant and cannot be inverted
    #[error("transform matrix is singular")]
    SingularMatrix,

    /// Drag ray does not meet any face of the cube
    #[error("drag ray does not hit the cube")]
    DegenerateRay,

    /// `pop` without a matching `push`
    #[error("transform stack underflow")]
    StackUnderflow,

    /// Homogeneous w is zero after transforming a vertex
    #[error("vertex maps to a point at infinity")]
    PointAtInfinity,

    /// A slice rotation is already in flight
    #[error("a slice rotation is already animating")]
    Busy,
}

pub type Result<T> = std::result::Result<T, Error>;
