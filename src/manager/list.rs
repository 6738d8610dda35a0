//! Keyed reconciliation of sequences.
//!
//! Items carrying a key keep their manager (and the state of any component inside it) when
//! the sequence is reordered; their host nodes are moved instead of recreated. Items
//! without a key are always mounted fresh, so their state does not survive a reorder.
//!
//! An empty list is represented by a single anchor node, which keeps a stable position in
//! the host tree for items that arrive later.

use std::{
    collections::{HashMap, HashSet},
    rc::Rc,
};

use eddy_core::{Element, Key, NodeId};
use tracing::trace;

use super::{Manager, mount_or_anchor};
use crate::{Diagnostic, ReconcileError, context::Ctx, mailbox::Mailbox};

#[derive(Debug)]
struct Entry {
    key: Option<Key>,
    manager: Manager,
}

/// Manager of a sequence.
#[derive(Debug)]
pub struct ListManager {
    items: Rc<[Element]>,
    entries: Vec<Entry>,
    anchor: Option<NodeId>,
    route: Option<Mailbox>,
}

impl ListManager {
    pub(crate) const fn new(items: Rc<[Element]>, route: Option<Mailbox>) -> Self {
        Self {
            items,
            entries: Vec::new(),
            anchor: None,
            route,
        }
    }

    /// The element last reconciled.
    #[must_use]
    pub const fn element(&self) -> &Rc<[Element]> {
        &self.items
    }

    /// Number of mounted items. The anchor of an empty list is not counted.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns `true` when the list only holds its anchor.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The anchor node, present while the list is empty.
    #[must_use]
    pub const fn anchor(&self) -> Option<NodeId> {
        self.anchor
    }

    /// Managers of the items, in order.
    pub fn managers(&self) -> impl Iterator<Item = &Manager> {
        self.entries.iter().map(|entry| &entry.manager)
    }

    pub(crate) fn managers_mut(&mut self) -> impl Iterator<Item = &mut Manager> {
        self.entries.iter_mut().map(|entry| &mut entry.manager)
    }

    pub(crate) const fn route(&self) -> Option<&Mailbox> {
        self.route.as_ref()
    }

    /// Every host node of the list in order, or the anchor alone when it is empty.
    #[must_use]
    pub fn host_nodes(&self) -> Vec<NodeId> {
        if self.entries.is_empty() {
            return self.anchor.into_iter().collect();
        }
        self.entries
            .iter()
            .flat_map(|entry| entry.manager.host_nodes())
            .collect()
    }

    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        let items = self.items.clone();
        let keys = plan_keys(&items, ctx);
        for (item, key) in items.iter().zip(keys) {
            let manager = mount_or_anchor(item, ctx)?;
            self.entries.push(Entry { key, manager });
        }
        if self.entries.is_empty() {
            self.anchor = Some(ctx.host.create_element(ctx.runtime.config.anchor_tag())?);
        }
        Ok(self.host_nodes())
    }

    pub(crate) fn did_attach(&mut self) {
        for entry in &mut self.entries {
            entry.manager.did_attach();
        }
    }

    pub(crate) fn receive(
        &mut self,
        next: &Rc<[Element]>,
        ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        if self.entries.is_empty() && self.anchor.is_none() {
            return Err(ReconcileError::NotMounted);
        }
        self.items = next.clone();
        let keys = plan_keys(next, ctx);
        let wanted: HashMap<&Key, &Element> = keys
            .iter()
            .zip(next.iter())
            .filter_map(|(key, item)| key.as_ref().map(|key| (key, item)))
            .collect();
        let survives = |entry: &Entry| {
            entry
                .key
                .as_ref()
                .and_then(|key| wanted.get(key))
                .is_some_and(|item| entry.manager.accepts(item))
        };

        // Keep an insertion point: the first slot if it survives, otherwise an anchor in
        // front of it.
        let (head, head_key) = match self.entries.first() {
            Some(first) if self.anchor.is_none() && survives(first) => {
                (first.manager.host_node(), first.key.clone())
            }
            _ => (None, None),
        };
        if head.is_none() && self.anchor.is_none() {
            let first = self
                .entries
                .first()
                .and_then(|entry| entry.manager.host_node())
                .ok_or(ReconcileError::NotMounted)?;
            let anchor = ctx.host.create_element(ctx.runtime.config.anchor_tag())?;
            ctx.host.insert_before(first, anchor)?;
            self.anchor = Some(anchor);
        }

        let mut survivors = HashMap::new();
        let mut removed = Vec::new();
        for entry in self.entries.drain(..) {
            if survives(&entry) {
                if let Some(key) = entry.key {
                    survivors.insert(key, entry.manager);
                }
            } else {
                removed.push(entry.manager);
            }
        }
        for mut manager in removed {
            let nodes = manager.host_nodes();
            manager.unmount(ctx);
            for node in nodes {
                ctx.host.remove(node)?;
            }
        }

        let mut cursor = self.anchor;
        let mut fresh = Vec::new();
        for (item, key) in next.iter().zip(keys.iter()) {
            // The surviving first slot already sits at the start of the list.
            let in_place = cursor.is_none() && key.is_some() && *key == head_key;
            let survivor = key.as_ref().and_then(|key| survivors.remove(key));
            let manager = if let Some(mut manager) = survivor {
                if let Err(error) = manager.receive(item, ctx) {
                    ctx.fail(error);
                }
                manager
            } else {
                fresh.push(self.entries.len());
                mount_or_anchor(item, ctx)?
            };
            for (index, node) in manager.host_nodes().into_iter().enumerate() {
                if !(in_place && index == 0) {
                    place(node, cursor, head, ctx)?;
                }
                cursor = Some(node);
            }
            self.entries.push(Entry {
                key: key.clone(),
                manager,
            });
        }

        if !self.entries.is_empty() {
            if let Some(anchor) = self.anchor.take() {
                ctx.host.remove(anchor)?;
            }
        }
        trace!(
            len = self.entries.len(),
            fresh = fresh.len(),
            "list reconciled"
        );
        for index in fresh {
            self.entries[index].manager.did_attach();
        }
        Ok(())
    }

    pub(crate) fn unmount(&mut self, ctx: &mut Ctx<'_>) {
        for entry in &mut self.entries {
            entry.manager.unmount(ctx);
        }
    }
}

/// Puts `node` right after `cursor`, or in front of `head` for the first node of the list.
/// Nodes already in place are left alone.
fn place(
    node: NodeId,
    cursor: Option<NodeId>,
    head: Option<NodeId>,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    match (cursor, head) {
        (Some(cursor), _) => {
            if ctx.host.next_sibling(cursor)? != Some(node) {
                ctx.host.insert_after(cursor, node)?;
            }
        }
        (None, Some(head)) => {
            if node != head {
                ctx.host.insert_before(head, node)?;
            }
        }
        (None, None) => return Err(ReconcileError::NotMounted),
    }
    Ok(())
}

/// Assigns each item the key it is matched by. Unkeyed items and repeated keys get `None`.
fn plan_keys(items: &[Element], ctx: &mut Ctx<'_>) -> Vec<Option<Key>> {
    let mut seen = HashSet::new();
    let mut unkeyed = 0;
    let keys = items
        .iter()
        .map(|item| match item.key() {
            Some(key) if seen.insert(key.clone()) => Some(key.clone()),
            Some(key) => {
                ctx.report(Diagnostic::DuplicateKey(key.clone()));
                None
            }
            None => {
                unkeyed += 1;
                None
            }
        })
        .collect();
    if unkeyed > 0 && ctx.config().warn_missing_keys() {
        ctx.report(Diagnostic::MissingKey {
            unkeyed,
            len: items.len(),
        });
    }
    keys
}
