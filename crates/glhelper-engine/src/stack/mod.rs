//! Save/restore stacks for hierarchical transforms.
//!
//! Typical use is drawing a jointed model with one mutable model matrix:
//! save before descending into a sub-branch, restore to continue with a sibling.
//! The stack does not validate nesting; unbalanced save/restore pairs silently
//! carry state into the next frame.

mod registry;
mod transform_stack;

pub use registry::StackRegistry;
pub use transform_stack::TransformStack;
