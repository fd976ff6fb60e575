use std::cell::Cell;
use std::time::Duration;

use crate::time::{FrameClock, FrameTime};

use super::render::RenderChannel;
use super::update::UpdateChannel;

/// Owns one render channel and one update channel.
///
/// Schedulers never share state; two demos on one page (or two tests) each
/// create their own. The host calls [`tick`](Self::tick) once per frame, or
/// hands the loop over to [`run`](Self::run).
#[derive(Debug)]
pub struct FrameScheduler<P> {
    render: RenderChannel<P>,
    update: UpdateChannel,
    shut_down: Cell<bool>,
}

/// Creates a scheduler whose render payload is `P`.
pub fn create_frame_scheduler<P: 'static>() -> FrameScheduler<P> {
    FrameScheduler::new()
}

impl<P: 'static> FrameScheduler<P> {
    pub fn new() -> Self {
        Self::with_clock(FrameClock::new())
    }

    /// Uses `clock` (and its delta-time clamps) for the update driver.
    pub fn with_clock(clock: FrameClock) -> Self {
        Self {
            render: RenderChannel::new(),
            update: UpdateChannel::new(clock),
            shut_down: Cell::new(false),
        }
    }

    pub fn render(&self) -> RenderChannel<P> {
        self.render.clone()
    }

    pub fn update(&self) -> UpdateChannel {
        self.update.clone()
    }

    /// One frame: runs the update listeners if the driver is active.
    pub fn tick(&self) -> Option<FrameTime> {
        if self.shut_down.get() {
            return None;
        }
        self.update.tick()
    }

    pub fn is_running(&self) -> bool {
        !self.shut_down.get() && self.update.is_running()
    }

    /// Ticks until the driver goes idle or `max_frames` frames have run,
    /// sleeping `interval` between frames. Returns the number of frames ticked.
    pub fn run(&self, max_frames: Option<u64>, interval: Duration) -> u64 {
        let mut frames = 0;
        while self.is_running() && max_frames.is_none_or(|max| frames < max) {
            if self.tick().is_none() {
                break;
            }
            frames += 1;
            if !interval.is_zero() {
                std::thread::sleep(interval);
            }
        }
        log::debug!("scheduler loop exited after {frames} frames");
        frames
    }

    /// Stops the driver and drops every listener on both channels.
    ///
    /// Channel handles obtained earlier stay valid but inert.
    pub fn shutdown(&self) {
        if self.shut_down.replace(true) {
            return;
        }
        self.update.close();
        self.render.close();
        log::debug!("scheduler shut down");
    }

    pub fn is_shut_down(&self) -> bool {
        self.shut_down.get()
    }
}

impl<P: 'static> Default for FrameScheduler<P> {
    fn default() -> Self {
        Self::new()
    }
}
