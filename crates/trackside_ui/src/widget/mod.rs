//! Widget system.
//!
//! A widget is the behaviour attached to a node: how it updates, draws and
//! reacts to input. The [`NodeTree`] owns both the nodes and their widgets.

mod context;
mod core;
mod motion;
mod tree;

pub use context::{DrawContext, EventContext, UpdateContext};
pub use core::{EventOutcome, Group, Widget};
pub use tree::NodeTree;
