//! Per-frame update channel.
//!
//! Listeners receive the frame's [`FrameTime`]. A plain "something ticked"
//! callback ignores it (`|_| ...`); animations use `dt` instead of assuming a
//! fixed frame rate.

use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use crate::time::{FrameClock, FrameTime};

use super::listener::{Listener, ListenerSet};

/// Per-frame driver behind the update channel.
///
/// Only produces ticks while started. Starting resets the clock so the first
/// tick after an idle period does not report the whole idle time as `dt`.
#[derive(Debug, Clone, Default)]
pub struct Driver {
    running: bool,
    clock: FrameClock,
}

impl Driver {
    pub fn new(clock: FrameClock) -> Self {
        Self { running: false, clock }
    }

    pub fn start(&mut self) {
        if !self.running {
            self.clock.reset();
            self.running = true;
            log::trace!("update driver started");
        }
    }

    pub fn stop(&mut self) {
        if self.running {
            self.running = false;
            log::trace!("update driver stopped");
        }
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// `None` while stopped.
    pub fn tick(&mut self) -> Option<FrameTime> {
        self.running.then(|| self.clock.tick())
    }
}

type UpdateFn = dyn Fn(&FrameTime);

struct UpdateState {
    listeners: ListenerSet<UpdateFn>,
    driver: Driver,
    paused: bool,
    closed: bool,
}

/// Per-frame callback channel.
///
/// The driver runs only while somebody listens: the first subscription starts it,
/// removing the last listener stops it, and a tick that finds no listeners stops
/// it as well. Cloning yields another handle to the same channel.
#[derive(Clone)]
pub struct UpdateChannel {
    state: Rc<RefCell<UpdateState>>,
}

impl UpdateChannel {
    pub(crate) fn new(clock: FrameClock) -> Self {
        Self {
            state: Rc::new(RefCell::new(UpdateState {
                listeners: ListenerSet::default(),
                driver: Driver::new(clock),
                paused: false,
                closed: false,
            })),
        }
    }

    /// Subscribes `callback` to every tick and starts the driver if it is idle.
    pub fn add_event_listener(&self, callback: impl Fn(&FrameTime) + 'static) -> Listener {
        let mut state = self.state.borrow_mut();
        if state.closed {
            log::debug!("update channel closed; listener ignored");
            return Listener::inert();
        }
        let id = state.listeners.insert(Rc::new(callback));
        state.driver.start();

        let weak: Weak<RefCell<UpdateState>> = Rc::downgrade(&self.state);
        Listener::new(move || {
            let Some(state) = weak.upgrade() else {
                return;
            };
            let mut state = state.borrow_mut();
            if state.listeners.remove(id) && state.listeners.is_empty() {
                state.driver.stop();
            }
        })
    }

    /// Advances the driver and runs every listener once, unless paused.
    ///
    /// Returns the frame time when the driver ticked (paused included).
    pub fn tick(&self) -> Option<FrameTime> {
        let (time, listeners) = {
            let mut state = self.state.borrow_mut();
            if !state.driver.is_running() {
                return None;
            }
            if state.listeners.is_empty() {
                state.driver.stop();
                return None;
            }
            let time = state.driver.tick()?;
            if state.paused {
                return Some(time);
            }
            (time, state.listeners.snapshot())
        };

        log::trace!("update tick {} ({} listeners)", time.frame_index, listeners.len());
        for listener in listeners {
            listener(&time);
        }
        Some(time)
    }

    /// Keeps the driver and the listeners but skips callbacks until [`resume`](Self::resume).
    pub fn pause(&self) {
        self.state.borrow_mut().paused = true;
    }

    pub fn resume(&self) {
        self.state.borrow_mut().paused = false;
    }

    pub fn is_paused(&self) -> bool {
        self.state.borrow().paused
    }

    /// Halts the driver. Listeners stay registered; the next subscription restarts it.
    pub fn stop(&self) {
        self.state.borrow_mut().driver.stop();
    }

    pub fn is_running(&self) -> bool {
        self.state.borrow().driver.is_running()
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Stops the driver, drops every listener and refuses new ones.
    pub(crate) fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.listeners.clear();
        state.driver.stop();
    }
}

impl fmt::Debug for UpdateChannel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("UpdateChannel")
            .field("listeners", &state.listeners.len())
            .field("running", &state.driver.is_running())
            .field("paused", &state.paused)
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;

    use super::*;

    fn channel() -> UpdateChannel {
        UpdateChannel::new(FrameClock::new())
    }

    fn counter(ch: &UpdateChannel) -> (Rc<Cell<u32>>, Listener) {
        let hits = Rc::new(Cell::new(0));
        let h = Rc::clone(&hits);
        let listener = ch.add_event_listener(move |_| h.set(h.get() + 1));
        (hits, listener)
    }

    #[test]
    fn idle_without_listeners() {
        let ch = channel();
        assert!(!ch.is_running());
        assert!(ch.tick().is_none());
    }

    #[test]
    fn first_listener_starts_last_removal_stops() {
        let ch = channel();
        let (hits_a, a) = counter(&ch);
        assert!(ch.is_running());
        let (_hits_b, b) = counter(&ch);

        assert!(ch.tick().is_some());
        assert_eq!(hits_a.get(), 1);

        a.remove();
        assert!(ch.is_running());
        b.remove();
        assert!(!ch.is_running());
        assert!(ch.tick().is_none());
        assert_eq!(hits_a.get(), 1);
    }

    #[test]
    fn pause_skips_callbacks_but_keeps_ticking() {
        let ch = channel();
        let (hits, _l) = counter(&ch);

        ch.pause();
        assert!(ch.is_paused());
        assert!(ch.tick().is_some());
        assert_eq!(hits.get(), 0);
        assert_eq!(ch.listener_count(), 1);

        ch.resume();
        ch.tick();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn stop_halts_until_next_subscription() {
        let ch = channel();
        let (hits, _l) = counter(&ch);

        ch.stop();
        assert!(!ch.is_running());
        assert!(ch.tick().is_none());

        let (_other, _l2) = counter(&ch);
        assert!(ch.is_running());
        ch.tick();
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn frame_index_advances_per_tick() {
        let ch = channel();
        let (_hits, _l) = counter(&ch);

        let first = ch.tick().unwrap();
        let second = ch.tick().unwrap();
        assert_eq!(second.frame_index, first.frame_index + 1);
    }

    #[test]
    fn listener_can_unsubscribe_itself() {
        let ch = channel();
        let slot: Rc<RefCell<Option<Listener>>> = Rc::new(RefCell::new(None));
        let s = Rc::clone(&slot);
        let listener = ch.add_event_listener(move |_| {
            if let Some(l) = s.borrow().as_ref() {
                l.remove();
            }
        });
        *slot.borrow_mut() = Some(listener);

        ch.tick();
        assert_eq!(ch.listener_count(), 0);
        assert!(!ch.is_running());
    }

    #[test]
    fn driver_reports_state() {
        let mut driver = Driver::default();
        assert!(driver.tick().is_none());
        driver.start();
        assert!(driver.is_running());
        assert!(driver.tick().is_some());
        driver.stop();
        assert!(!driver.is_running());
    }
}
