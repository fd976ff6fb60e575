use std::fmt;

type SnapshotFn<T> = Box<dyn Fn(&T) -> anyhow::Result<T>>;

/// LIFO stack of deep-copied snapshots.
///
/// Each `save` stores the value produced by the snapshot function, so mutating the
/// live value afterwards never affects a saved entry.
pub struct TransformStack<T> {
    snapshot: SnapshotFn<T>,
    items: Vec<T>,
}

impl<T: Clone + 'static> TransformStack<T> {
    /// Creates a stack that snapshots with `Clone`.
    pub fn new() -> Self {
        Self::with_snapshot(|item: &T| Ok(item.clone()))
    }
}

impl<T: Clone + 'static> Default for TransformStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> TransformStack<T> {
    /// Creates a stack with a custom snapshot function.
    ///
    /// A snapshot error makes [`save`](Self::save) return `false`.
    pub fn with_snapshot<F>(snapshot: F) -> Self
    where
        F: Fn(&T) -> anyhow::Result<T> + 'static,
    {
        Self { snapshot: Box::new(snapshot), items: Vec::new() }
    }

    /// Pushes a snapshot of `item`. Returns `false` if the snapshot could not be taken.
    pub fn save(&mut self, item: &T) -> bool {
        match (self.snapshot)(item) {
            Ok(copy) => {
                self.items.push(copy);
                true
            }
            Err(e) => {
                log::warn!("transform stack: snapshot failed: {e:#}");
                false
            }
        }
    }

    /// Pops the most recent snapshot. `None` on an empty stack.
    pub fn restore(&mut self) -> Option<T> {
        self.items.pop()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.items.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Drops every saved entry.
    pub fn clear(&mut self) {
        self.items.clear();
    }
}

impl<T> fmt::Debug for TransformStack<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransformStack").field("len", &self.items.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::Matrix4;

    #[test]
    fn restore_returns_value_at_save_time() {
        let mut stack = TransformStack::new();
        let mut live = Matrix4::identity();

        assert!(stack.save(&live));
        live.translate(1.0, 0.0, 0.0);

        let restored = stack.restore().unwrap();
        assert_eq!(restored, Matrix4::identity());
        assert_ne!(live, restored);
    }

    #[test]
    fn restore_is_lifo() {
        let mut stack = TransformStack::new();
        let mut m = Matrix4::identity();
        stack.save(&m);
        m.set_translate(1.0, 2.0, 3.0);
        stack.save(&m);
        assert_eq!(stack.len(), 2);

        assert_eq!(stack.restore().unwrap().elements[12], 1.0);
        assert_eq!(stack.restore().unwrap(), Matrix4::identity());
        assert!(stack.is_empty());
    }

    #[test]
    fn restore_on_empty_is_none() {
        let mut stack: TransformStack<Matrix4> = TransformStack::new();
        assert!(stack.restore().is_none());
    }

    #[test]
    fn failing_snapshot_reports_false() {
        let mut stack = TransformStack::with_snapshot(|m: &Matrix4| {
            anyhow::ensure!(m.elements.iter().all(|e| e.is_finite()), "non-finite matrix");
            Ok(*m)
        });

        let mut bad = Matrix4::identity();
        bad.elements[0] = f32::NAN;

        assert!(!stack.save(&bad));
        assert!(stack.is_empty());
        assert!(stack.save(&Matrix4::identity()));
        assert_eq!(stack.len(), 1);
    }
}
