//! The host platform abstraction.
//!
//! Eddy never owns platform nodes directly. Every mutation the reconciler performs goes
//! through [`Host`], which a backend implements on top of its own node tree (a browser
//! document, a terminal scene, or the arena in `eddy-memory`).
//!
//! Insertion follows document semantics: inserting a node that already has a parent moves
//! it, so the reconciler can reorder keyed items without removing them first.

use crate::{AttrValue, Handler, HostError};

/// Identifier of a node stored by a [`Host`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(usize);

impl NodeId {
    /// Creates a new [`NodeId`] from the raw index.
    #[must_use]
    pub const fn new(index: usize) -> Self {
        Self(index)
    }

    /// Returns the raw index backing this identifier.
    #[must_use]
    pub const fn index(self) -> usize {
        self.0
    }
}

/// A mutable node tree the reconciler renders into.
pub trait Host {
    /// Creates a detached element node with the given tag.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to create the node.
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError>;

    /// Creates a detached text leaf.
    ///
    /// # Errors
    ///
    /// Returns an error if the platform refuses to create the node.
    fn create_text(&mut self, text: &str) -> Result<NodeId, HostError>;

    /// Sets a plain attribute on an element.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown or not an element.
    fn set_attribute(&mut self, node: NodeId, name: &str, value: &AttrValue)
    -> Result<(), HostError>;

    /// Removes a plain attribute from an element. Removing a missing attribute is a no-op.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown or not an element.
    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError>;

    /// Registers a listener for `event` on an element.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown or not an element.
    fn add_listener(&mut self, node: NodeId, event: &str, handler: Handler)
    -> Result<(), HostError>;

    /// Removes every listener registered for `event` on an element.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown or not an element.
    fn remove_listeners(&mut self, node: NodeId, event: &str) -> Result<(), HostError>;

    /// Appends `child` as the last child of `parent`.
    ///
    /// # Errors
    ///
    /// Fails when either node is unknown or `parent` is not an element.
    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError>;

    /// Inserts `node` as the previous sibling of `reference`.
    ///
    /// # Errors
    ///
    /// Fails when either node is unknown or `reference` is detached.
    fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), HostError>;

    /// Inserts `node` as the next sibling of `reference`.
    ///
    /// # Errors
    ///
    /// Fails when either node is unknown or `reference` is detached.
    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), HostError>;

    /// Replaces `old` with the `replacement` nodes, in order, at the same position.
    ///
    /// # Errors
    ///
    /// Fails when a node is unknown or `old` is detached.
    fn replace_with(&mut self, old: NodeId, replacement: &[NodeId]) -> Result<(), HostError>;

    /// Detaches `node` from its parent. Detaching a detached node is a no-op.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown.
    fn remove(&mut self, node: NodeId) -> Result<(), HostError>;

    /// Returns the sibling following `node`, if any.
    ///
    /// # Errors
    ///
    /// Fails when `node` is unknown.
    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, HostError>;
}
