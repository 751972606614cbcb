//! # Tree Error Types
//!
//! Structural misuse that the caller can act on. Operations on disposed
//! nodes are not errors; they are silent no-ops.

use crate::node::NodeId;
use thiserror::Error;

/// Errors returned by [`crate::NodeTree::add_child`].
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum TreeError {
    /// The node was disposed or never belonged to this tree.
    #[error("node {0:?} is disposed or unknown")]
    StaleNode(NodeId),

    /// The child is already owned by another parent.
    #[error("node {child:?} already has parent {parent:?}")]
    AlreadyAttached {
        /// The node being attached.
        child: NodeId,
        /// Its current owner.
        parent: NodeId,
    },

    /// The parent lies inside the child's subtree.
    #[error("attaching {child:?} under {parent:?} would create a cycle")]
    WouldCycle {
        /// Requested parent.
        parent: NodeId,
        /// Requested child.
        child: NodeId,
    },

    /// The root is owned by the tree itself.
    #[error("the root node cannot be attached to a parent")]
    RootNotAttachable,
}

/// Result type for tree operations.
pub type TreeResult<T> = Result<T, TreeError>;
