use std::rc::Rc;

use eddy_core::{AttrValue, Attributes, HostElement, NodeId, event::listener_event};
use tracing::trace;

use super::{Manager, mount_or_anchor, splice};
use crate::{ReconcileError, context::Ctx, mailbox::Mailbox};

/// Manager of a host element.
#[derive(Debug)]
pub struct PrimitiveManager {
    element: Rc<HostElement>,
    node: Option<NodeId>,
    children: Vec<Manager>,
    route: Option<Mailbox>,
}

/// A child mutation found during the positional diff, applied once the pass is over.
enum ChildOp {
    Add(Vec<NodeId>),
    Replace { old: Vec<NodeId>, new: Vec<NodeId> },
    Remove(Vec<NodeId>),
}

impl PrimitiveManager {
    pub(crate) const fn new(element: Rc<HostElement>, route: Option<Mailbox>) -> Self {
        Self {
            element,
            node: None,
            children: Vec::new(),
            route,
        }
    }

    /// The element last reconciled.
    #[must_use]
    pub const fn element(&self) -> &Rc<HostElement> {
        &self.element
    }

    /// The host element, once mounted.
    #[must_use]
    pub const fn node(&self) -> Option<NodeId> {
        self.node
    }

    /// Managers of the children, in order.
    #[must_use]
    pub fn children(&self) -> &[Manager] {
        &self.children
    }

    pub(crate) fn children_mut(&mut self) -> &mut [Manager] {
        &mut self.children
    }

    pub(crate) const fn route(&self) -> Option<&Mailbox> {
        self.route.as_ref()
    }

    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        let element = self.element.clone();
        let node = ctx.host.create_element(element.tag())?;
        self.node = Some(node);
        diff_attributes(node, &Attributes::new(), element.attributes(), ctx)?;

        for child in element.child_elements() {
            let mut manager = mount_or_anchor(child, ctx)?;
            for child_node in manager.host_nodes() {
                ctx.host.append_child(node, child_node)?;
            }
            manager.did_attach();
            self.children.push(manager);
        }
        Ok(vec![node])
    }

    pub(crate) fn receive(
        &mut self,
        next: &Rc<HostElement>,
        ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        let node = self.node.ok_or(ReconcileError::NotMounted)?;
        let previous = std::mem::replace(&mut self.element, next.clone());
        if Rc::ptr_eq(&previous, next) {
            return Ok(());
        }
        diff_attributes(node, previous.attributes(), next.attributes(), ctx)?;

        let next_children = next.child_elements();
        let mut ops = Vec::new();
        let mut fresh = Vec::new();
        for (index, child) in next_children.iter().enumerate() {
            if index >= self.children.len() {
                let manager = mount_or_anchor(child, ctx)?;
                ops.push(ChildOp::Add(manager.host_nodes()));
                self.children.push(manager);
                fresh.push(index);
            } else if !self.children[index].accepts(child) {
                let old = self.children[index].host_nodes();
                self.children[index].unmount(ctx);
                let manager = mount_or_anchor(child, ctx)?;
                ops.push(ChildOp::Replace {
                    old,
                    new: manager.host_nodes(),
                });
                self.children[index] = manager;
                fresh.push(index);
            } else if let Err(error) = self.children[index].receive(child, ctx) {
                ctx.fail(error);
            }
        }
        if self.children.len() > next_children.len() {
            for mut removed in self.children.drain(next_children.len()..) {
                ops.push(ChildOp::Remove(removed.host_nodes()));
                removed.unmount(ctx);
            }
        }

        trace!(node = node.index(), ops = ops.len(), "applying child operations");
        for op in ops {
            match op {
                ChildOp::Add(nodes) => {
                    for child_node in nodes {
                        ctx.host.append_child(node, child_node)?;
                    }
                }
                ChildOp::Replace { old, new } => splice(&old, &new, ctx)?,
                ChildOp::Remove(nodes) => {
                    for child_node in nodes {
                        ctx.host.remove(child_node)?;
                    }
                }
            }
        }
        for index in fresh {
            self.children[index].did_attach();
        }
        Ok(())
    }

    pub(crate) fn unmount(&mut self, ctx: &mut Ctx<'_>) {
        for child in &mut self.children {
            child.unmount(ctx);
        }
    }
}

/// Diffs two attribute maps onto `node`: removed keys first, then added keys, then keys
/// whose value changed. Listener keys are rebound instead of set.
fn diff_attributes(
    node: NodeId,
    old: &Attributes,
    new: &Attributes,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    for (name, value) in old.iter() {
        if !new.contains(name) {
            unset(node, name, value, ctx)?;
        }
    }
    for (name, value) in new.iter() {
        if !old.contains(name) {
            set(node, name, value, ctx)?;
        }
    }
    for (name, value) in new.iter() {
        match old.get(name) {
            Some(previous) if previous != value => {
                if listener(name, previous).is_some() != listener(name, value).is_some() {
                    unset(node, name, previous, ctx)?;
                }
                set(node, name, value, ctx)?;
            }
            _ => {}
        }
    }
    Ok(())
}

fn listener(name: &str, value: &AttrValue) -> Option<String> {
    value.as_handler()?;
    listener_event(name)
}

fn set(
    node: NodeId,
    name: &str,
    value: &AttrValue,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    match (listener(name, value), value.as_handler()) {
        (Some(event), Some(handler)) => {
            let handler = ctx.bind(handler);
            ctx.host.remove_listeners(node, &event)?;
            ctx.host.add_listener(node, &event, handler)?;
        }
        _ => ctx.host.set_attribute(node, name, value)?,
    }
    Ok(())
}

fn unset(
    node: NodeId,
    name: &str,
    value: &AttrValue,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    match listener(name, value) {
        Some(event) => ctx.host.remove_listeners(node, &event)?,
        None => ctx.host.remove_attribute(node, name)?,
    }
    Ok(())
}
