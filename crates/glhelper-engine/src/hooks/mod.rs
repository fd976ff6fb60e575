//! Render/update event loop.
//!
//! Two independent channels per scheduler:
//! - render: synchronous publish/subscribe with a payload
//! - update: per-frame callbacks, handed the frame's timing, behind a driver that
//!   only runs while somebody listens
//!
//! The channels are not linked. An update listener that changes state emits on the
//! render channel itself to request a redraw.

mod listener;
mod render;
mod scheduler;
mod update;

pub use listener::Listener;
pub use render::RenderChannel;
pub use scheduler::{create_frame_scheduler, FrameScheduler};
pub use update::{Driver, UpdateChannel};
