//! GL helper engine crate.
//!
//! Small building blocks for tutorial-style rendering demos: vector/matrix math,
//! save/restore transform stacks, a fail-fast GL resource layer with a headless
//! backend, and a render/update frame scheduler.

pub mod coords;
pub mod gl;
pub mod hooks;
pub mod logging;
pub mod math;
pub mod stack;
pub mod time;
