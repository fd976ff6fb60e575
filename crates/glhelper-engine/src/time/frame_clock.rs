use std::time::{Duration, Instant};

/// Timing of one update tick, handed to every update listener.
#[derive(Debug, Copy, Clone)]
pub struct FrameTime {
    /// Seconds since the previous tick, clamped.
    pub dt: f32,

    /// Seconds accumulated from clamped `dt` values since the last reset.
    ///
    /// Animations that advance an angle by `speed * dt` can use this instead to
    /// stay deterministic across pauses.
    pub elapsed: f32,

    pub now: Instant,

    /// Ticks since the clock was created. Not reset by [`FrameClock::reset`].
    pub frame_index: u64,
}

/// Produces [`FrameTime`] values for the update driver.
///
/// Delta time is clamped so a stall (debugger, background tab, slow draw) does
/// not make animations jump, and a tight loop never reports zero.
#[derive(Debug, Clone)]
pub struct FrameClock {
    last: Instant,
    elapsed: Duration,
    frame_index: u64,
    dt_min: Duration,
    dt_max: Duration,
}

impl FrameClock {
    pub const DEFAULT_DT_MIN: Duration = Duration::from_micros(100);
    pub const DEFAULT_DT_MAX: Duration = Duration::from_millis(250);

    pub fn new() -> Self {
        Self::with_clamps(Self::DEFAULT_DT_MIN, Self::DEFAULT_DT_MAX)
    }

    pub fn with_clamps(dt_min: Duration, dt_max: Duration) -> Self {
        debug_assert!(dt_min <= dt_max);
        Self { last: Instant::now(), elapsed: Duration::ZERO, frame_index: 0, dt_min, dt_max }
    }

    /// Restarts the baseline and the elapsed accumulator.
    ///
    /// Called whenever the update driver starts.
    pub fn reset(&mut self) {
        self.last = Instant::now();
        self.elapsed = Duration::ZERO;
    }

    pub fn tick(&mut self) -> FrameTime {
        let now = Instant::now();
        let dt = now.saturating_duration_since(self.last).clamp(self.dt_min, self.dt_max);

        self.last = now;
        self.elapsed += dt;

        let time = FrameTime {
            dt: dt.as_secs_f32(),
            elapsed: self.elapsed.as_secs_f32(),
            now,
            frame_index: self.frame_index,
        };
        self.frame_index = self.frame_index.wrapping_add(1);
        time
    }

    #[inline]
    pub fn frame_index(&self) -> u64 {
        self.frame_index
    }
}

impl Default for FrameClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn dt_is_clamped_from_below() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(5), Duration::from_millis(50));
        let t = clock.tick();
        assert!(t.dt >= 0.005);
        assert!(t.dt <= 0.05);
    }

    #[test]
    fn elapsed_accumulates_and_resets() {
        let mut clock = FrameClock::with_clamps(Duration::from_millis(10), Duration::from_millis(10));
        clock.tick();
        let t = clock.tick();
        assert!((t.elapsed - 0.02).abs() < 1e-6);
        assert_eq!(t.frame_index, 1);

        clock.reset();
        let t = clock.tick();
        assert!((t.elapsed - 0.01).abs() < 1e-6);
        assert_eq!(t.frame_index, 2);
    }
}
