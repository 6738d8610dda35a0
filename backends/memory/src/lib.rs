//! In-memory host tree for Eddy.
//!
//! [`MemoryHost`] stores nodes in an arena and implements [`Host`] with document semantics:
//! inserting a node that already has a parent moves it. Every mutation is appended to a
//! log, which makes it the host of choice for tests and headless rendering.
//!
//! ```
//! use eddy_core::{AttrValue, Host};
//! use eddy_memory::MemoryHost;
//!
//! let mut host = MemoryHost::new();
//! let root = host.create_container("main");
//! let p = host.create_element("p").unwrap();
//! let text = host.create_text("hello").unwrap();
//! host.append_child(p, text).unwrap();
//! host.set_attribute(p, "class", &AttrValue::from("lead")).unwrap();
//! host.append_child(root, p).unwrap();
//! assert_eq!(host.render(root), r#"<main><p class="lead">hello</p></main>"#);
//! ```

use std::{collections::BTreeMap, fmt::Write as _};

use eddy_core::{AttrValue, Event, Handler, Host, HostError, NodeId};
use tracing::trace;

/// A single recorded host mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Mutation {
    /// An element was created.
    CreateElement {
        /// New node.
        node: NodeId,
        /// Its tag.
        tag: String,
    },
    /// A text leaf was created.
    CreateText {
        /// New node.
        node: NodeId,
        /// Its content.
        text: String,
    },
    /// A plain attribute was set.
    SetAttribute {
        /// Target element.
        node: NodeId,
        /// Attribute name.
        name: String,
        /// Rendered value.
        value: String,
    },
    /// A plain attribute was removed.
    RemoveAttribute {
        /// Target element.
        node: NodeId,
        /// Attribute name.
        name: String,
    },
    /// A listener was registered.
    AddListener {
        /// Target element.
        node: NodeId,
        /// Event kind.
        event: String,
    },
    /// Every listener for an event was removed.
    RemoveListeners {
        /// Target element.
        node: NodeId,
        /// Event kind.
        event: String,
    },
    /// A node was appended to a parent.
    Append {
        /// Parent element.
        parent: NodeId,
        /// Appended node.
        child: NodeId,
    },
    /// A node was inserted before a sibling.
    InsertBefore {
        /// Sibling the node now precedes.
        reference: NodeId,
        /// Inserted node.
        node: NodeId,
    },
    /// A node was inserted after a sibling.
    InsertAfter {
        /// Sibling the node now follows.
        reference: NodeId,
        /// Inserted node.
        node: NodeId,
    },
    /// A node was replaced by a run of nodes.
    ReplaceWith {
        /// Replaced node.
        old: NodeId,
        /// Nodes now occupying its position.
        replacement: Vec<NodeId>,
    },
    /// A node was detached from its parent.
    Remove {
        /// Detached node.
        node: NodeId,
    },
}

#[derive(Debug)]
enum NodeKind {
    Element {
        tag: String,
        attributes: BTreeMap<String, AttrValue>,
        listeners: BTreeMap<String, Vec<Handler>>,
    },
    Text(String),
}

#[derive(Debug)]
struct NodeEntry {
    parent: Option<NodeId>,
    children: Vec<NodeId>,
    kind: NodeKind,
}

impl NodeEntry {
    const fn new(kind: NodeKind) -> Self {
        Self {
            parent: None,
            children: Vec::new(),
            kind,
        }
    }
}

/// Arena-backed host tree with a mutation log.
#[derive(Debug, Default)]
pub struct MemoryHost {
    nodes: Vec<NodeEntry>,
    log: Vec<Mutation>,
}

impl MemoryHost {
    /// Creates an empty host.
    #[must_use]
    pub const fn new() -> Self {
        Self {
            nodes: Vec::new(),
            log: Vec::new(),
        }
    }

    /// Creates a detached element to mount into. Not recorded in the mutation log.
    pub fn create_container(&mut self, tag: &str) -> NodeId {
        self.push_entry(NodeEntry::new(element_kind(tag)))
    }

    /// Total number of nodes ever created.
    #[must_use]
    pub const fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Returns `true` if no node was ever created.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the tag of an element.
    #[must_use]
    pub fn tag(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Element { tag, .. } => Some(tag),
            NodeKind::Text(_) => None,
        }
    }

    /// Returns the content of a text leaf.
    #[must_use]
    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Text(text) => Some(text),
            NodeKind::Element { .. } => None,
        }
    }

    /// Returns a plain attribute of an element.
    #[must_use]
    pub fn attribute(&self, node: NodeId, name: &str) -> Option<&AttrValue> {
        match &self.nodes.get(node.index())?.kind {
            NodeKind::Element { attributes, .. } => attributes.get(name),
            NodeKind::Text(_) => None,
        }
    }

    /// Number of listeners registered for `event` on a node.
    #[must_use]
    pub fn listener_count(&self, node: NodeId, event: &str) -> usize {
        match self.nodes.get(node.index()).map(|entry| &entry.kind) {
            Some(NodeKind::Element { listeners, .. }) => listeners.get(event).map_or(0, Vec::len),
            _ => 0,
        }
    }

    /// The children of a node, in order.
    #[must_use]
    pub fn children(&self, node: NodeId) -> &[NodeId] {
        self.nodes
            .get(node.index())
            .map_or(&[], |entry| entry.children.as_slice())
    }

    /// The parent of a node, if attached.
    #[must_use]
    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes.get(node.index())?.parent
    }

    /// Invokes every listener registered for `kind` on `node`, returning how many ran.
    ///
    /// Events do not bubble.
    pub fn dispatch(&self, node: NodeId, kind: &str) -> usize {
        self.dispatch_event(&Event::new(kind, node))
    }

    /// Like [`dispatch`](Self::dispatch), with a prepared event.
    pub fn dispatch_event(&self, event: &Event) -> usize {
        let handlers: Vec<Handler> = match self.nodes.get(event.target().index()) {
            Some(NodeEntry {
                kind: NodeKind::Element { listeners, .. },
                ..
            }) => listeners.get(event.kind()).cloned().unwrap_or_default(),
            _ => Vec::new(),
        };
        for handler in &handlers {
            handler.call(event);
        }
        handlers.len()
    }

    /// The mutations recorded so far.
    #[must_use]
    pub fn mutations(&self) -> &[Mutation] {
        &self.log
    }

    /// Drains the mutation log.
    pub fn take_mutations(&mut self) -> Vec<Mutation> {
        std::mem::take(&mut self.log)
    }

    /// Clears the mutation log.
    pub fn clear_mutations(&mut self) {
        self.log.clear();
    }

    /// Renders the subtree under `node` as HTML-like markup. Listeners are omitted.
    #[must_use]
    pub fn render(&self, node: NodeId) -> String {
        let mut out = String::new();
        self.render_into(node, &mut out);
        out
    }

    fn render_into(&self, node: NodeId, out: &mut String) {
        let Some(entry) = self.nodes.get(node.index()) else {
            return;
        };
        match &entry.kind {
            NodeKind::Text(text) => out.push_str(text),
            NodeKind::Element {
                tag, attributes, ..
            } => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes {
                    let _ = write!(out, " {name}=\"{value}\"");
                }
                out.push('>');
                for child in &entry.children {
                    self.render_into(*child, out);
                }
                let _ = write!(out, "</{tag}>");
            }
        }
    }

    fn push_entry(&mut self, entry: NodeEntry) -> NodeId {
        let id = NodeId::new(self.nodes.len());
        self.nodes.push(entry);
        id
    }

    fn entry(&self, node: NodeId) -> Result<&NodeEntry, HostError> {
        self.nodes
            .get(node.index())
            .ok_or(HostError::UnknownNode(node))
    }

    fn entry_mut(&mut self, node: NodeId) -> Result<&mut NodeEntry, HostError> {
        self.nodes
            .get_mut(node.index())
            .ok_or(HostError::UnknownNode(node))
    }

    fn element_mut(
        &mut self,
        node: NodeId,
    ) -> Result<
        (
            &mut BTreeMap<String, AttrValue>,
            &mut BTreeMap<String, Vec<Handler>>,
        ),
        HostError,
    > {
        match &mut self.entry_mut(node)?.kind {
            NodeKind::Element {
                attributes,
                listeners,
                ..
            } => Ok((attributes, listeners)),
            NodeKind::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn ensure_element(&self, node: NodeId) -> Result<(), HostError> {
        match self.entry(node)?.kind {
            NodeKind::Element { .. } => Ok(()),
            NodeKind::Text(_) => Err(HostError::NotAnElement(node)),
        }
    }

    fn attached_parent(&self, node: NodeId) -> Result<NodeId, HostError> {
        self.entry(node)?.parent.ok_or(HostError::Detached(node))
    }

    fn check_cycle(&self, node: NodeId, target: NodeId) -> Result<(), HostError> {
        let mut cursor = Some(target);
        while let Some(current) = cursor {
            if current == node {
                return Err(HostError::Cycle { node, target });
            }
            cursor = self.entry(current)?.parent;
        }
        Ok(())
    }

    fn detach(&mut self, node: NodeId) -> Result<bool, HostError> {
        let Some(parent) = self.entry_mut(node)?.parent.take() else {
            return Ok(false);
        };
        self.entry_mut(parent)?.children.retain(|child| *child != node);
        Ok(true)
    }

    fn position(&self, parent: NodeId, node: NodeId) -> Result<usize, HostError> {
        self.entry(parent)?
            .children
            .iter()
            .position(|child| *child == node)
            .ok_or(HostError::Detached(node))
    }

    fn insert_at(&mut self, parent: NodeId, index: usize, node: NodeId) -> Result<(), HostError> {
        let entry = self.entry_mut(parent)?;
        let index = index.min(entry.children.len());
        entry.children.insert(index, node);
        self.entry_mut(node)?.parent = Some(parent);
        Ok(())
    }

    fn place_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), HostError> {
        let parent = self.attached_parent(reference)?;
        self.entry(node)?;
        if node == reference {
            return Ok(());
        }
        self.check_cycle(node, parent)?;
        self.detach(node)?;
        let index = self.position(parent, reference)?;
        self.insert_at(parent, index, node)
    }

    fn record(&mut self, mutation: Mutation) {
        trace!(?mutation, "host mutation");
        self.log.push(mutation);
    }
}

fn element_kind(tag: &str) -> NodeKind {
    NodeKind::Element {
        tag: tag.to_owned(),
        attributes: BTreeMap::new(),
        listeners: BTreeMap::new(),
    }
}

impl Host for MemoryHost {
    fn create_element(&mut self, tag: &str) -> Result<NodeId, HostError> {
        let node = self.push_entry(NodeEntry::new(element_kind(tag)));
        self.record(Mutation::CreateElement {
            node,
            tag: tag.to_owned(),
        });
        Ok(node)
    }

    fn create_text(&mut self, text: &str) -> Result<NodeId, HostError> {
        let node = self.push_entry(NodeEntry::new(NodeKind::Text(text.to_owned())));
        self.record(Mutation::CreateText {
            node,
            text: text.to_owned(),
        });
        Ok(node)
    }

    fn set_attribute(
        &mut self,
        node: NodeId,
        name: &str,
        value: &AttrValue,
    ) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(node)?;
        attributes.insert(name.to_owned(), value.clone());
        self.record(Mutation::SetAttribute {
            node,
            name: name.to_owned(),
            value: value.to_string(),
        });
        Ok(())
    }

    fn remove_attribute(&mut self, node: NodeId, name: &str) -> Result<(), HostError> {
        let (attributes, _) = self.element_mut(node)?;
        if attributes.remove(name).is_some() {
            self.record(Mutation::RemoveAttribute {
                node,
                name: name.to_owned(),
            });
        }
        Ok(())
    }

    fn add_listener(
        &mut self,
        node: NodeId,
        event: &str,
        handler: Handler,
    ) -> Result<(), HostError> {
        let (_, listeners) = self.element_mut(node)?;
        listeners.entry(event.to_owned()).or_default().push(handler);
        self.record(Mutation::AddListener {
            node,
            event: event.to_owned(),
        });
        Ok(())
    }

    fn remove_listeners(&mut self, node: NodeId, event: &str) -> Result<(), HostError> {
        let (_, listeners) = self.element_mut(node)?;
        if listeners.remove(event).is_some() {
            self.record(Mutation::RemoveListeners {
                node,
                event: event.to_owned(),
            });
        }
        Ok(())
    }

    fn append_child(&mut self, parent: NodeId, child: NodeId) -> Result<(), HostError> {
        self.ensure_element(parent)?;
        self.entry(child)?;
        self.check_cycle(child, parent)?;
        self.detach(child)?;
        let end = self.children(parent).len();
        self.insert_at(parent, end, child)?;
        self.record(Mutation::Append { parent, child });
        Ok(())
    }

    fn insert_before(&mut self, reference: NodeId, node: NodeId) -> Result<(), HostError> {
        self.place_before(reference, node)?;
        self.record(Mutation::InsertBefore { reference, node });
        Ok(())
    }

    fn insert_after(&mut self, reference: NodeId, node: NodeId) -> Result<(), HostError> {
        let parent = self.attached_parent(reference)?;
        self.entry(node)?;
        if node == reference {
            return Ok(());
        }
        self.check_cycle(node, parent)?;
        self.detach(node)?;
        let index = self.position(parent, reference)? + 1;
        self.insert_at(parent, index, node)?;
        self.record(Mutation::InsertAfter { reference, node });
        Ok(())
    }

    fn replace_with(&mut self, old: NodeId, replacement: &[NodeId]) -> Result<(), HostError> {
        self.attached_parent(old)?;
        for node in replacement {
            self.place_before(old, *node)?;
        }
        if !replacement.contains(&old) {
            self.detach(old)?;
        }
        self.record(Mutation::ReplaceWith {
            old,
            replacement: replacement.to_vec(),
        });
        Ok(())
    }

    fn remove(&mut self, node: NodeId) -> Result<(), HostError> {
        if self.detach(node)? {
            self.record(Mutation::Remove { node });
        }
        Ok(())
    }

    fn next_sibling(&self, node: NodeId) -> Result<Option<NodeId>, HostError> {
        let Some(parent) = self.entry(node)?.parent else {
            return Ok(None);
        };
        let index = self.position(parent, node)?;
        Ok(self.children(parent).get(index + 1).copied())
    }
}

#[cfg(test)]
mod tests {
    use std::{cell::Cell, rc::Rc};

    use super::*;

    fn tree() -> (MemoryHost, NodeId, [NodeId; 3]) {
        let mut host = MemoryHost::new();
        let root = host.create_container("ul");
        let items = ["a", "b", "c"].map(|name| {
            let li = host.create_element("li").unwrap();
            host.set_attribute(li, "id", &AttrValue::from(name)).unwrap();
            host.append_child(root, li).unwrap();
            li
        });
        host.clear_mutations();
        (host, root, items)
    }

    #[test]
    fn inserting_an_attached_node_moves_it() {
        let (mut host, root, [a, b, c]) = tree();
        host.insert_before(a, c).unwrap();
        assert_eq!(host.children(root), [c, a, b]);
        host.insert_after(b, c).unwrap();
        assert_eq!(host.children(root), [a, b, c]);
        assert_eq!(host.mutations().len(), 2);
    }

    #[test]
    fn replace_with_splices_in_place() {
        let (mut host, root, [a, b, c]) = tree();
        let x = host.create_text("x").unwrap();
        let y = host.create_text("y").unwrap();
        host.replace_with(b, &[x, y]).unwrap();
        assert_eq!(host.children(root), [a, x, y, c]);
        assert_eq!(host.parent(b), None, "replaced node is detached");
        assert_eq!(host.next_sibling(y).unwrap(), Some(c));
    }

    #[test]
    fn structural_errors_are_reported() {
        let (mut host, root, [a, ..]) = tree();
        let text = host.create_text("t").unwrap();
        assert_eq!(
            host.set_attribute(text, "id", &AttrValue::from("x")),
            Err(HostError::NotAnElement(text))
        );
        assert_eq!(host.append_child(a, root), Err(HostError::Cycle { node: root, target: a }));
        assert_eq!(host.insert_after(root, a), Err(HostError::Detached(root)));
        assert_eq!(
            host.remove(NodeId::new(999)),
            Err(HostError::UnknownNode(NodeId::new(999)))
        );
    }

    #[test]
    fn removing_a_detached_node_is_silent() {
        let (mut host, _, [a, ..]) = tree();
        host.remove(a).unwrap();
        host.remove(a).unwrap();
        assert_eq!(host.take_mutations(), [Mutation::Remove { node: a }]);
    }

    #[test]
    fn dispatch_runs_registered_listeners() {
        let (mut host, _, [a, ..]) = tree();
        let hits = Rc::new(Cell::new(0));
        let counter = hits.clone();
        host.add_listener(a, "click", Handler::new(move |_| counter.set(counter.get() + 1)))
            .unwrap();
        assert_eq!(host.dispatch(a, "click"), 1);
        assert_eq!(host.dispatch(a, "input"), 0);
        host.remove_listeners(a, "click").unwrap();
        assert_eq!(host.dispatch(a, "click"), 0);
        assert_eq!(hits.get(), 1);
    }

    #[test]
    fn render_prints_markup() {
        let (host, root, _) = tree();
        assert_eq!(
            host.render(root),
            r#"<ul><li id="a"></li><li id="b"></li><li id="c"></li></ul>"#
        );
    }
}
