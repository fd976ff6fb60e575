//! Vector and matrix math.
//!
//! Conventions:
//! - 32-bit float storage everywhere
//! - matrices are column-major `[f32; 16]`
//! - composition is `this = this * arg` (post-multiplication)
//! - every angle parameter is in degrees

pub mod angle;
mod error;
mod matrix4;
mod vector3;
mod vector4;

pub use error::MathError;
pub use matrix4::Matrix4;
pub use vector3::Vector3;
pub use vector4::Vector4;
