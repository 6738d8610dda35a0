//! Error types shared by hosts and the reconciler.

use thiserror::Error;

use crate::NodeId;

/// Errors reported by a [`Host`](crate::Host) implementation.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum HostError {
    /// The node was never created by this host.
    #[error("unknown host node {0:?}")]
    UnknownNode(NodeId),
    /// The operation needs an element but the node is a text leaf.
    #[error("host node {0:?} is not an element")]
    NotAnElement(NodeId),
    /// The operation needs a parent but the node is not attached anywhere.
    #[error("host node {0:?} is detached")]
    Detached(NodeId),
    /// The node would become its own ancestor.
    #[error("cannot insert host node {node:?} inside its own subtree at {target:?}")]
    Cycle {
        /// Node being inserted.
        node: NodeId,
        /// Insertion point that lies inside `node`'s subtree.
        target: NodeId,
    },
}
