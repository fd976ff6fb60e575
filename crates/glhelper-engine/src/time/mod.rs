//! Frame timing for the update driver.
//!
//! One `FrameClock` per scheduler; the driver ticks it once per frame and passes
//! the resulting `FrameTime` to every update listener.

mod frame_clock;

pub use frame_clock::{FrameClock, FrameTime};
