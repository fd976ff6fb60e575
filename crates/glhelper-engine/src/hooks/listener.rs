use std::cell::Cell;
use std::fmt;
use std::rc::Rc;

/// Callbacks keyed by registration id, kept in registration order.
pub(crate) struct ListenerSet<F: ?Sized> {
    next_id: u64,
    entries: Vec<(u64, Rc<F>)>,
}

impl<F: ?Sized> Default for ListenerSet<F> {
    fn default() -> Self {
        Self { next_id: 0, entries: Vec::new() }
    }
}

impl<F: ?Sized> ListenerSet<F> {
    pub(crate) fn insert(&mut self, callback: Rc<F>) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.entries.push((id, callback));
        id
    }

    /// `false` if `id` was not registered (already removed).
    pub(crate) fn remove(&mut self, id: u64) -> bool {
        let before = self.entries.len();
        self.entries.retain(|(entry, _)| *entry != id);
        self.entries.len() != before
    }

    /// Copy of the current callbacks, so dispatch can run without a borrow held.
    pub(crate) fn snapshot(&self) -> Vec<Rc<F>> {
        self.entries.iter().map(|(_, cb)| Rc::clone(cb)).collect()
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }
}

/// Subscription handle returned by `add_event_listener`.
///
/// Dropping the handle keeps the subscription; call [`remove`](Self::remove) to end it.
pub struct Listener {
    remover: Cell<Option<Box<dyn FnOnce()>>>,
}

impl Listener {
    pub(crate) fn new(remover: impl FnOnce() + 'static) -> Self {
        Self { remover: Cell::new(Some(Box::new(remover))) }
    }

    /// Handle whose removal does nothing (subscription refused).
    pub(crate) fn inert() -> Self {
        Self { remover: Cell::new(None) }
    }

    /// Unsubscribes. Later calls, and calls after the channel is gone, do nothing.
    pub fn remove(&self) {
        if let Some(remover) = self.remover.take() {
            remover();
        }
    }

    pub fn is_active(&self) -> bool {
        // Cell<Option<Box<..>>> cannot be inspected without taking it.
        let remover = self.remover.take();
        let active = remover.is_some();
        self.remover.set(remover);
        active
    }
}

impl fmt::Debug for Listener {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Listener").field("active", &self.is_active()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_keeps_registration_order() {
        let mut set: ListenerSet<dyn Fn() -> u8> = ListenerSet::default();
        let a = set.insert(Rc::new(|| 1u8));
        set.insert(Rc::new(|| 2u8));
        set.insert(Rc::new(|| 3u8));

        assert!(set.remove(a));
        assert!(!set.remove(a));
        let order: Vec<u8> = set.snapshot().iter().map(|cb| cb()).collect();
        assert_eq!(order, vec![2, 3]);
    }

    #[test]
    fn remove_runs_once() {
        let count = Rc::new(Cell::new(0));
        let c = Rc::clone(&count);
        let listener = Listener::new(move || c.set(c.get() + 1));

        assert!(listener.is_active());
        listener.remove();
        listener.remove();
        assert_eq!(count.get(), 1);
        assert!(!listener.is_active());
    }
}
