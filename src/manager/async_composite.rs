//! Asynchronous components.
//!
//! Mounting puts a placeholder in the tree and asks the component's actor for the first
//! render. Every request bumps the generation; a reply is applied only when it carries the
//! latest generation, so overlapping requests collapse into the most recent one. The
//! placeholder is swapped for real content exactly once, on the first applied reply.

use std::{cell::RefCell, rc::Rc};

use eddy_core::{
    ComponentElement, Instance, NodeId, Props,
    component::{AsyncFactory, DynAsyncComponent},
    host,
};
use smol::Task;
use tracing::{debug, debug_span};

use super::{Manager, mount_element, reconcile, splice};
use crate::{
    Diagnostic, ReconcileError,
    context::Ctx,
    mailbox::{Mailbox, Method, Reply, Request},
};

#[derive(Debug)]
enum Slot {
    Unmounted,
    Placeheld(Box<Manager>),
    Mounted(Box<Manager>),
}

/// Manager of an asynchronous component.
pub struct AsyncManager {
    element: Rc<ComponentElement>,
    props: Props,
    committed_props: Props,
    instance: Instance,
    component: Rc<RefCell<dyn DynAsyncComponent>>,
    slot: Slot,
    generation: u64,
    applied: u64,
    mailbox: Option<Mailbox>,
    task: Option<Task<()>>,
    route: Option<Mailbox>,
}

impl std::fmt::Debug for AsyncManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AsyncManager")
            .field("instance", &self.instance)
            .field("generation", &self.generation)
            .field("applied", &self.applied)
            .field("slot", &self.slot)
            .finish_non_exhaustive()
    }
}

impl AsyncManager {
    pub(crate) fn new(
        element: Rc<ComponentElement>,
        factory: AsyncFactory,
        route: Option<Mailbox>,
        ctx: &Ctx<'_>,
    ) -> Self {
        let props = element.props();
        let id = ctx.runtime.next_component_id();
        let created = factory(&props, id, ctx.runtime.notify());
        Self {
            element,
            committed_props: props.clone(),
            props,
            instance: created.instance,
            component: created.component,
            slot: Slot::Unmounted,
            generation: 0,
            applied: 0,
            mailbox: None,
            task: None,
            route,
        }
    }

    /// The element last reconciled.
    #[must_use]
    pub const fn element(&self) -> &Rc<ComponentElement> {
        &self.element
    }

    /// The live component.
    #[must_use]
    pub const fn instance(&self) -> &Instance {
        &self.instance
    }

    /// Returns `true` while the placeholder is still shown.
    #[must_use]
    pub const fn is_placeheld(&self) -> bool {
        matches!(self.slot, Slot::Placeheld(_))
    }

    /// Returns `true` while a render request has not been answered.
    #[must_use]
    pub const fn is_waiting(&self) -> bool {
        self.generation > self.applied
    }

    /// Generation of the most recent request.
    #[must_use]
    pub const fn generation(&self) -> u64 {
        self.generation
    }

    /// The manager currently in the tree: the placeholder, then the rendered element.
    #[must_use]
    pub fn child(&self) -> Option<&Manager> {
        match &self.slot {
            Slot::Placeheld(manager) | Slot::Mounted(manager) => Some(manager),
            Slot::Unmounted => None,
        }
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Manager> {
        match &mut self.slot {
            Slot::Placeheld(manager) | Slot::Mounted(manager) => Some(manager),
            Slot::Unmounted => None,
        }
    }

    pub(crate) const fn route(&self) -> Option<&Mailbox> {
        self.route.as_ref()
    }

    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        let (mailbox, task) = Mailbox::spawn(
            self.instance.id(),
            self.component.clone(),
            ctx.config().mailbox_capacity(),
            ctx.runtime.replies(),
            &ctx.runtime.executor,
        );
        let placeholder = self
            .component
            .borrow()
            .placeholder_element()
            .unwrap_or_else(|| host(ctx.config().placeholder_tag()).into());
        let placeholder =
            ctx.scoped(Some(mailbox.clone()), |ctx| mount_element(&placeholder, ctx))?;
        let nodes = placeholder.host_nodes();
        self.slot = Slot::Placeheld(Box::new(placeholder));
        self.component.borrow_mut().placeheld();

        self.mailbox = Some(mailbox);
        self.task = Some(task);
        self.request(Method::Mount)?;
        Ok(nodes)
    }

    /// Forwards attachment to the placeholder. `did_mount` waits for the first commit.
    pub(crate) fn did_attach(&mut self) {
        if let Some(child) = self.child_mut() {
            child.did_attach();
        }
    }

    pub(crate) fn receive(
        &mut self,
        next: &Rc<ComponentElement>,
        _ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        let next_props = next.props();
        self.component.borrow_mut().will_update(&next_props);
        self.props = next_props;
        self.element = next.clone();
        self.request(Method::Receive)
    }

    /// Asks for a new render with the current props after a state change.
    pub(crate) fn rerender(&mut self, _ctx: &mut Ctx<'_>) -> Result<(), ReconcileError> {
        self.component.borrow_mut().will_update(&self.props);
        self.request(Method::Receive)
    }

    fn request(&mut self, method: Method) -> Result<(), ReconcileError> {
        let mailbox = self.mailbox.as_ref().ok_or(ReconcileError::NotMounted)?;
        self.generation += 1;
        debug!(
            component = self.instance.id().get(),
            generation = self.generation,
            ?method,
            "render requested"
        );
        mailbox.post(Request::Render {
            method,
            generation: self.generation,
            props: self.props.clone(),
        })
    }

    /// Applies a render reply. Replies older than the latest request are discarded.
    pub(crate) fn apply(&mut self, reply: Reply, ctx: &mut Ctx<'_>) -> Result<(), ReconcileError> {
        if reply.generation != self.generation {
            ctx.report(Diagnostic::StaleAsyncReply {
                component: reply.component,
                generation: reply.generation,
                latest: self.generation,
            });
            return Ok(());
        }
        self.applied = reply.generation;
        let mailbox = self.mailbox.clone();
        match &mut self.slot {
            Slot::Placeheld(placeholder) => {
                let span = debug_span!("commit", component = self.instance.id().get());
                let _entered = span.enter();
                self.component.borrow_mut().will_mount();
                let mut child = ctx.scoped(mailbox, |ctx| mount_element(&reply.element, ctx))?;
                splice(&placeholder.host_nodes(), &child.host_nodes(), ctx)?;
                placeholder.unmount(ctx);
                child.did_attach();
                self.slot = Slot::Mounted(Box::new(child));
                self.committed_props = self.props.clone();
                self.component.borrow_mut().did_mount();
                Ok(())
            }
            Slot::Mounted(child) => {
                let previous = std::mem::replace(&mut self.committed_props, self.props.clone());
                self.component.borrow_mut().did_update(&previous);
                ctx.scoped(mailbox, |ctx| reconcile(child, &reply.element, ctx))
            }
            Slot::Unmounted => Err(ReconcileError::NotMounted),
        }
    }

    pub(crate) fn unmount(&mut self, ctx: &mut Ctx<'_>) {
        self.component.borrow_mut().will_unmount();
        if let Some(child) = self.child_mut() {
            child.unmount(ctx);
        }
        if let Some(mailbox) = self.mailbox.take() {
            mailbox.close();
        }
        self.task = None;
        self.applied = self.generation;
        self.component.borrow_mut().did_unmount();
        ctx.runtime.scheduler.forget(self.instance.id());
    }
}
