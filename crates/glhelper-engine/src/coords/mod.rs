//! Screen-space sizes shared by the GL layer and demos.

mod viewport;

pub use viewport::Viewport;
