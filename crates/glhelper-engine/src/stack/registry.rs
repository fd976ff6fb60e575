use std::collections::HashMap;

use super::TransformStack;

/// Named stacks owned by a single context.
///
/// Each context holds its own registry, so two contexts (or two sub-hierarchies
/// of one context using different names) never share entries.
#[derive(Debug)]
pub struct StackRegistry<T> {
    stacks: HashMap<String, TransformStack<T>>,
}

impl<T> Default for StackRegistry<T> {
    fn default() -> Self {
        Self { stacks: HashMap::new() }
    }
}

impl<T> StackRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the stack named `name`, creating it with `snapshot` on first use.
    ///
    /// `snapshot` is ignored when the stack already exists.
    pub fn get_with<F>(&mut self, name: &str, snapshot: F) -> &mut TransformStack<T>
    where
        F: Fn(&T) -> anyhow::Result<T> + 'static,
    {
        self.stacks
            .entry(name.to_owned())
            .or_insert_with(|| TransformStack::with_snapshot(snapshot))
    }

    pub fn contains(&self, name: &str) -> bool {
        self.stacks.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.stacks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stacks.is_empty()
    }
}

impl<T: Clone + 'static> StackRegistry<T> {
    /// Returns the stack named `name`, creating a `Clone`-snapshot stack on first use.
    pub fn get(&mut self, name: &str) -> &mut TransformStack<T> {
        self.stacks.entry(name.to_owned()).or_default()
    }
}
