use std::cell::RefCell;
use std::fmt;
use std::rc::{Rc, Weak};

use super::listener::{Listener, ListenerSet};

type RenderFn<P> = dyn Fn(&P);

struct RenderState<P> {
    listeners: ListenerSet<RenderFn<P>>,
    closed: bool,
}

/// Synchronous publish/subscribe channel for redraw requests.
///
/// `emit` calls every listener registered at the time of the call, in
/// registration order, with the same payload. Nothing is queued or replayed.
/// Cloning yields another handle to the same channel.
pub struct RenderChannel<P> {
    state: Rc<RefCell<RenderState<P>>>,
}

impl<P> Clone for RenderChannel<P> {
    fn clone(&self) -> Self {
        Self { state: Rc::clone(&self.state) }
    }
}

impl<P: 'static> RenderChannel<P> {
    pub(crate) fn new() -> Self {
        Self {
            state: Rc::new(RefCell::new(RenderState {
                listeners: ListenerSet::default(),
                closed: false,
            })),
        }
    }

    pub fn add_event_listener(&self, callback: impl Fn(&P) + 'static) -> Listener {
        let mut state = self.state.borrow_mut();
        if state.closed {
            log::debug!("render channel closed; listener ignored");
            return Listener::inert();
        }
        let id = state.listeners.insert(Rc::new(callback));

        let weak: Weak<RefCell<RenderState<P>>> = Rc::downgrade(&self.state);
        Listener::new(move || {
            if let Some(state) = weak.upgrade() {
                state.borrow_mut().listeners.remove(id);
            }
        })
    }

    /// Invokes the current listeners with `payload`.
    ///
    /// Listeners added or removed from inside a callback take effect on the next emit.
    pub fn emit(&self, payload: &P) {
        let listeners = {
            let state = self.state.borrow();
            if state.closed {
                return;
            }
            state.listeners.snapshot()
        };
        for listener in listeners {
            listener(payload);
        }
    }

    pub fn listener_count(&self) -> usize {
        self.state.borrow().listeners.len()
    }

    /// Drops every listener and refuses new ones.
    pub(crate) fn close(&self) {
        let mut state = self.state.borrow_mut();
        state.closed = true;
        state.listeners.clear();
    }
}

impl<P> fmt::Debug for RenderChannel<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.state.borrow();
        f.debug_struct("RenderChannel")
            .field("listeners", &state.listeners.len())
            .field("closed", &state.closed)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;

    use super::*;

    #[test]
    fn emit_reaches_listeners_in_order() {
        let channel = RenderChannel::<i32>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let _a = channel.add_event_listener(move |x| s.borrow_mut().push(("a", *x)));
        let s = Rc::clone(&seen);
        let _b = channel.add_event_listener(move |x| s.borrow_mut().push(("b", *x)));

        channel.emit(&7);
        assert_eq!(*seen.borrow(), vec![("a", 7), ("b", 7)]);
    }

    #[test]
    fn removed_listener_is_skipped() {
        let channel = RenderChannel::<()>::new();
        let seen = Rc::new(RefCell::new(Vec::new()));

        let s = Rc::clone(&seen);
        let a = channel.add_event_listener(move |_| s.borrow_mut().push("a"));
        let s = Rc::clone(&seen);
        let _b = channel.add_event_listener(move |_| s.borrow_mut().push("b"));

        a.remove();
        a.remove();
        channel.emit(&());
        assert_eq!(*seen.borrow(), vec!["b"]);
    }

    #[test]
    fn late_listener_misses_earlier_emits() {
        let channel = RenderChannel::<u8>::new();
        channel.emit(&1);

        let seen = Rc::new(RefCell::new(Vec::new()));
        let s = Rc::clone(&seen);
        let _l = channel.add_event_listener(move |x| s.borrow_mut().push(*x));
        channel.emit(&2);

        assert_eq!(*seen.borrow(), vec![2]);
    }

    #[test]
    fn listener_may_subscribe_during_emit() {
        let channel = RenderChannel::<()>::new();
        let inner = channel.clone();
        let _l = channel.add_event_listener(move |_| {
            let _ = inner.add_event_listener(|_| {});
        });

        channel.emit(&());
        assert_eq!(channel.listener_count(), 2);
    }

    #[test]
    fn closed_channel_is_silent() {
        let channel = RenderChannel::<()>::new();
        let hits = Rc::new(std::cell::Cell::new(0));
        let h = Rc::clone(&hits);
        let l = channel.add_event_listener(move |_| h.set(h.get() + 1));

        channel.close();
        channel.emit(&());
        l.remove();
        assert_eq!(hits.get(), 0);
        assert!(!channel.add_event_listener(|_| {}).is_active());
    }
}
