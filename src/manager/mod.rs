//! Managers: the live counterpart of mounted elements.
//!
//! One manager exists per mounted element. It owns the host nodes the element produced and
//! the managers of its children, and knows how to bring them in line with a new element of
//! the same type. A change of type never mutates a manager in place; the parent replaces
//! it with a freshly mounted one.

mod async_composite;
mod composite;
mod list;
mod primitive;
mod text;

use eddy_core::{ComponentId, ComponentKind, Element, Instance, NodeId, host};
use tracing::trace;

pub use async_composite::AsyncManager;
pub use composite::CompositeManager;
pub use list::ListManager;
pub use primitive::PrimitiveManager;
pub use text::TextManager;

use crate::{ReconcileError, context::Ctx, mailbox::Mailbox};

/// What a mount hands back to its caller.
#[derive(Debug, Clone)]
pub enum PublicInstance {
    /// The root is a component; this is its live instance.
    Component(Instance),
    /// The root is a host element.
    Node(NodeId),
    /// The root is a text leaf with this content.
    Text(String),
    /// The root is a sequence occupying these nodes.
    List(Vec<NodeId>),
}

impl PublicInstance {
    /// Returns the component instance, if the root is a component.
    #[must_use]
    pub const fn as_component(&self) -> Option<&Instance> {
        match self {
            Self::Component(instance) => Some(instance),
            _ => None,
        }
    }

    /// Returns the host node, if the root is a host element.
    #[must_use]
    pub const fn as_node(&self) -> Option<NodeId> {
        match self {
            Self::Node(node) => Some(*node),
            _ => None,
        }
    }
}

/// A mounted element.
#[derive(Debug)]
pub enum Manager {
    /// A host element.
    Primitive(PrimitiveManager),
    /// A text leaf.
    Text(TextManager),
    /// A sequence of elements.
    List(ListManager),
    /// A synchronous component.
    Composite(CompositeManager),
    /// An asynchronous component.
    Async(AsyncManager),
}

impl Manager {
    /// Picks the manager variant for `element` and prepares it for mounting.
    ///
    /// Components are instantiated here; nothing touches the host until [`mount`](Self::mount).
    pub(crate) fn instantiate(
        element: &Element,
        ctx: &mut Ctx<'_>,
    ) -> Result<Self, ReconcileError> {
        let route = ctx.route().cloned();
        let manager = match element {
            Element::Sequence(items) => Self::List(ListManager::new(items.clone(), route)),
            Element::Text(text) => Self::Text(TextManager::new(text.clone())),
            Element::Host(host) => {
                validate_tag(host.tag())?;
                Self::Primitive(PrimitiveManager::new(host.clone(), route))
            }
            Element::Component(component) => match component.component_type().kind() {
                ComponentKind::Sync(factory) => {
                    Self::Composite(CompositeManager::new(component.clone(), factory, route, ctx))
                }
                ComponentKind::Async(factory) => {
                    Self::Async(AsyncManager::new(component.clone(), factory, route, ctx))
                }
            },
        };
        trace!(kind = element.kind_name(), "instantiated manager");
        Ok(manager)
    }

    /// Creates the host nodes of this element and its descendants. The nodes are returned
    /// detached, in order; the caller attaches them.
    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        let route = self.route().cloned();
        ctx.scoped(route, |ctx| match self {
            Self::Primitive(manager) => manager.mount(ctx),
            Self::Text(manager) => manager.mount(ctx),
            Self::List(manager) => manager.mount(ctx),
            Self::Composite(manager) => manager.mount(ctx),
            Self::Async(manager) => manager.mount(ctx),
        })
    }

    /// Brings the mounted subtree in line with `next`, which must have the same type.
    pub(crate) fn receive(
        &mut self,
        next: &Element,
        ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        let route = self.route().cloned();
        ctx.scoped(route, |ctx| match (self, next) {
            (Self::Primitive(manager), Element::Host(next)) => manager.receive(next, ctx),
            (Self::Text(manager), Element::Text(next)) => manager.receive(next, ctx),
            (Self::List(manager), Element::Sequence(next)) => manager.receive(next, ctx),
            (Self::Composite(manager), Element::Component(next)) => manager.receive(next, ctx),
            (Self::Async(manager), Element::Component(next)) => manager.receive(next, ctx),
            (manager, next) => Err(ReconcileError::InvalidElementKind {
                tag: next.kind_name().to_owned(),
                reason: type_mismatch(manager),
            }),
        })
    }

    /// Tears the subtree down and runs unmount hooks. The caller detaches the host nodes.
    pub(crate) fn unmount(&mut self, ctx: &mut Ctx<'_>) {
        match self {
            Self::Primitive(manager) => manager.unmount(ctx),
            Self::Text(_) => {}
            Self::List(manager) => manager.unmount(ctx),
            Self::Composite(manager) => manager.unmount(ctx),
            Self::Async(manager) => manager.unmount(ctx),
        }
    }

    /// Re-renders a component whose state changed. Other variants ignore the call.
    pub(crate) fn rerender(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ReconcileError> {
        let route = self.route().cloned();
        ctx.scoped(route, |ctx| match self {
            Self::Composite(manager) => manager.rerender(ctx),
            Self::Async(manager) => manager.rerender(ctx),
            Self::Primitive(_) | Self::Text(_) | Self::List(_) => Ok(()),
        })
    }

    /// Signals that the host nodes of this manager were just attached to a parent node.
    pub(crate) fn did_attach(&mut self) {
        match self {
            Self::List(manager) => manager.did_attach(),
            Self::Composite(manager) => manager.did_attach(),
            Self::Async(manager) => manager.did_attach(),
            Self::Primitive(_) | Self::Text(_) => {}
        }
    }

    /// The host node standing for this manager.
    ///
    /// For a list this is the node of its first entry only; use
    /// [`host_nodes`](Self::host_nodes) when the whole output matters.
    #[must_use]
    pub fn host_node(&self) -> Option<NodeId> {
        match self {
            Self::Primitive(manager) => manager.node(),
            Self::Text(manager) => manager.node(),
            Self::List(manager) => manager.host_nodes().first().copied(),
            Self::Composite(manager) => manager.child().and_then(Self::host_node),
            Self::Async(manager) => manager.child().and_then(Self::host_node),
        }
    }

    /// Every top-level host node this manager produced, in document order.
    #[must_use]
    pub fn host_nodes(&self) -> Vec<NodeId> {
        match self {
            Self::Primitive(manager) => manager.node().into_iter().collect(),
            Self::Text(manager) => manager.node().into_iter().collect(),
            Self::List(manager) => manager.host_nodes(),
            Self::Composite(manager) => manager.child().map(Self::host_nodes).unwrap_or_default(),
            Self::Async(manager) => manager.child().map(Self::host_nodes).unwrap_or_default(),
        }
    }

    /// The handle a caller gets for this manager.
    #[must_use]
    pub fn public_instance(&self) -> PublicInstance {
        match self {
            Self::Primitive(manager) => manager
                .node()
                .map_or_else(|| PublicInstance::List(Vec::new()), PublicInstance::Node),
            Self::Text(manager) => PublicInstance::Text(manager.text().to_owned()),
            Self::List(manager) => PublicInstance::List(manager.host_nodes()),
            Self::Composite(manager) => PublicInstance::Component(manager.instance().clone()),
            Self::Async(manager) => PublicInstance::Component(manager.instance().clone()),
        }
    }

    /// The element this manager last reconciled.
    #[must_use]
    pub fn element(&self) -> Element {
        match self {
            Self::Primitive(manager) => Element::Host(manager.element().clone()),
            Self::Text(manager) => Element::Text(manager.element().clone()),
            Self::List(manager) => Element::Sequence(manager.element().clone()),
            Self::Composite(manager) => Element::Component(manager.element().clone()),
            Self::Async(manager) => Element::Component(manager.element().clone()),
        }
    }

    /// Returns `true` if this manager can receive `next` without being replaced.
    #[must_use]
    pub fn accepts(&self, next: &Element) -> bool {
        match (self, next) {
            (Self::Primitive(manager), Element::Host(next)) => {
                manager.element().tag() == next.tag()
            }
            (Self::Text(_), Element::Text(_)) | (Self::List(_), Element::Sequence(_)) => true,
            (Self::Composite(manager), Element::Component(next)) => {
                manager.element().type_id() == next.type_id()
            }
            (Self::Async(manager), Element::Component(next)) => {
                manager.element().type_id() == next.type_id()
            }
            _ => false,
        }
    }

    /// The component id, for component managers.
    #[must_use]
    pub fn component_id(&self) -> Option<ComponentId> {
        match self {
            Self::Composite(manager) => Some(manager.instance().id()),
            Self::Async(manager) => Some(manager.instance().id()),
            Self::Primitive(_) | Self::Text(_) | Self::List(_) => None,
        }
    }

    /// Finds the component manager with the given id in this subtree.
    pub(crate) fn find(&mut self, id: ComponentId) -> Option<&mut Self> {
        if self.component_id() == Some(id) {
            return Some(self);
        }
        match self {
            Self::Primitive(manager) => manager
                .children_mut()
                .iter_mut()
                .find_map(|child| child.find(id)),
            Self::List(manager) => manager.managers_mut().find_map(|child| child.find(id)),
            Self::Composite(manager) => manager.child_mut().and_then(|child| child.find(id)),
            Self::Async(manager) => manager.child_mut().and_then(|child| child.find(id)),
            Self::Text(_) => None,
        }
    }

    /// Number of async components in this subtree waiting for a render reply.
    #[must_use]
    pub fn pending_async(&self) -> usize {
        match self {
            Self::Primitive(manager) => manager.children().iter().map(Self::pending_async).sum(),
            Self::List(manager) => manager.managers().map(Self::pending_async).sum(),
            Self::Composite(manager) => manager.child().map_or(0, Self::pending_async),
            Self::Async(manager) => {
                usize::from(manager.is_waiting()) + manager.child().map_or(0, Self::pending_async)
            }
            Self::Text(_) => 0,
        }
    }

    fn route(&self) -> Option<&Mailbox> {
        match self {
            Self::Primitive(manager) => manager.route(),
            Self::List(manager) => manager.route(),
            Self::Composite(manager) => manager.route(),
            Self::Async(manager) => manager.route(),
            Self::Text(_) => None,
        }
    }
}

const fn type_mismatch(manager: &Manager) -> &'static str {
    match manager {
        Manager::Primitive(_) => "a host element manager only receives host elements",
        Manager::Text(_) => "a text manager only receives text",
        Manager::List(_) => "a list manager only receives sequences",
        Manager::Composite(_) | Manager::Async(_) => "a component manager only receives components",
    }
}

fn validate_tag(tag: &str) -> Result<(), ReconcileError> {
    let reason = if tag.is_empty() {
        "empty tag"
    } else if !tag
        .chars()
        .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | ':' | '.'))
    {
        "tag contains characters outside [A-Za-z0-9-_:.]"
    } else {
        return Ok(());
    };
    Err(ReconcileError::InvalidElementKind {
        tag: tag.to_owned(),
        reason,
    })
}

/// Instantiates and mounts `element` in one step.
pub(crate) fn mount_element(
    element: &Element,
    ctx: &mut Ctx<'_>,
) -> Result<Manager, ReconcileError> {
    let mut manager = Manager::instantiate(element, ctx)?;
    manager.mount(ctx)?;
    Ok(manager)
}

/// Mounts `element`, or an anchor in its place when that fails.
///
/// The failure is recorded as a diagnostic so siblings can carry on.
pub(crate) fn mount_or_anchor(
    element: &Element,
    ctx: &mut Ctx<'_>,
) -> Result<Manager, ReconcileError> {
    match mount_element(element, ctx) {
        Ok(manager) => Ok(manager),
        Err(error) => {
            ctx.fail(error);
            anchor(ctx)
        }
    }
}

/// Mounts an empty element marking a position in the host tree.
pub(crate) fn anchor(ctx: &mut Ctx<'_>) -> Result<Manager, ReconcileError> {
    let element: Element = host(ctx.config().anchor_tag()).into();
    mount_element(&element, ctx)
}

/// Receives `next` when the types match, otherwise replaces the manager in `slot`.
pub(crate) fn reconcile(
    slot: &mut Manager,
    next: &Element,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    if slot.accepts(next) {
        slot.receive(next, ctx)
    } else {
        replace(slot, next, ctx)
    }
}

/// Unmounts the manager in `slot`, mounts `next` and splices its nodes in place.
///
/// If `next` fails to mount, an anchor takes its place and the error is returned; the old
/// subtree is gone either way.
pub(crate) fn replace(
    slot: &mut Manager,
    next: &Element,
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    trace!(from = slot.element().kind_name(), to = next.kind_name(), "replacing subtree");
    let old_nodes = slot.host_nodes();
    slot.unmount(ctx);
    let (replacement, outcome) = match mount_element(next, ctx) {
        Ok(manager) => (manager, Ok(())),
        Err(error) => (anchor(ctx)?, Err(error)),
    };
    splice(&old_nodes, &replacement.host_nodes(), ctx)?;
    *slot = replacement;
    slot.did_attach();
    outcome
}

/// Puts `new` where `old` is: the first old node is replaced, the rest detached.
pub(crate) fn splice(
    old: &[NodeId],
    new: &[NodeId],
    ctx: &mut Ctx<'_>,
) -> Result<(), ReconcileError> {
    if let Some((first, rest)) = old.split_first() {
        ctx.host.replace_with(*first, new)?;
        for node in rest {
            ctx.host.remove(*node)?;
        }
    }
    Ok(())
}
