//! Errors raised while constructing primitives.

use thiserror::Error;

/// Reasons a primitive constructor rejects its geometry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ShapeError {
    /// A coordinate or scalar parameter is NaN or infinite.
    #[error("{0} must be finite")]
    NonFinite(&'static str),

    /// A radius or height is zero or negative.
    #[error("{0} must be positive")]
    NonPositive(&'static str),

    /// A plane normal or cylinder axis has (almost) zero length.
    #[error("{0} must not be a zero vector")]
    ZeroVector(&'static str),

    /// The three vertices of a triangle are collinear or coincide.
    #[error("triangle has zero area")]
    DegenerateTriangle,
}
