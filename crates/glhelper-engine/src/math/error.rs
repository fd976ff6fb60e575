use std::fmt;

/// Rejected projection parameters.
///
/// Only the projection builders validate their input. Degenerate rotation axes
/// and look-at vectors pass through unchecked and produce NaNs.
#[derive(Debug, Clone, PartialEq)]
pub enum MathError {
    /// Zero-width, zero-height or zero-depth view volume (or zero aspect / zero fovy).
    NullFrustum {
        left: f32,
        right: f32,
        bottom: f32,
        top: f32,
        near: f32,
        far: f32,
    },
    NonPositiveNear(f32),
    NonPositiveFar(f32),
}

impl fmt::Display for MathError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MathError::NullFrustum { left, right, bottom, top, near, far } => write!(
                f,
                "null frustum: left={left} right={right} bottom={bottom} top={top} near={near} far={far}"
            ),
            MathError::NonPositiveNear(near) => write!(f, "near <= 0 (near={near})"),
            MathError::NonPositiveFar(far) => write!(f, "far <= 0 (far={far})"),
        }
    }
}

impl std::error::Error for MathError {}
