use std::{cell::RefCell, rc::Rc};

use eddy_core::{
    ComponentElement, Element, Instance, NodeId, Props,
    component::{DynComponent, SyncFactory},
};
use tracing::{debug_span, trace};

use super::{Manager, mount_element, reconcile};
use crate::{ReconcileError, context::Ctx, mailbox::Mailbox};

/// Manager of a synchronous component.
pub struct CompositeManager {
    element: Rc<ComponentElement>,
    props: Props,
    instance: Instance,
    component: Rc<RefCell<dyn DynComponent>>,
    child: Option<Box<Manager>>,
    did_mount: bool,
    route: Option<Mailbox>,
}

impl std::fmt::Debug for CompositeManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompositeManager")
            .field("instance", &self.instance)
            .field("props", &self.props)
            .field("child", &self.child)
            .finish_non_exhaustive()
    }
}

impl CompositeManager {
    pub(crate) fn new(
        element: Rc<ComponentElement>,
        factory: SyncFactory,
        route: Option<Mailbox>,
        ctx: &Ctx<'_>,
    ) -> Self {
        let props = element.props();
        let id = ctx.runtime.next_component_id();
        let created = factory(&props, id, ctx.runtime.notify());
        Self {
            element,
            props,
            instance: created.instance,
            component: created.component,
            child: None,
            did_mount: false,
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

    /// The props of the last render.
    #[must_use]
    pub const fn props(&self) -> &Props {
        &self.props
    }

    /// The manager of the rendered element.
    #[must_use]
    pub fn child(&self) -> Option<&Manager> {
        self.child.as_deref()
    }

    pub(crate) fn child_mut(&mut self) -> Option<&mut Manager> {
        self.child.as_deref_mut()
    }

    pub(crate) const fn route(&self) -> Option<&Mailbox> {
        self.route.as_ref()
    }

    fn render(&self) -> Element {
        self.component.borrow().render_element(&self.props)
    }

    pub(crate) fn mount(&mut self, ctx: &mut Ctx<'_>) -> Result<Vec<NodeId>, ReconcileError> {
        self.component.borrow_mut().will_mount();
        let rendered = self.render();
        let child = mount_element(&rendered, ctx)?;
        let nodes = child.host_nodes();
        self.child = Some(Box::new(child));
        Ok(nodes)
    }

    /// Fires `did_mount` once the rendered output is attached.
    pub(crate) fn did_attach(&mut self) {
        if let Some(child) = self.child.as_deref_mut() {
            child.did_attach();
        }
        if !self.did_mount {
            self.did_mount = true;
            self.component.borrow_mut().did_mount();
        }
    }

    pub(crate) fn receive(
        &mut self,
        next: &Rc<ComponentElement>,
        ctx: &mut Ctx<'_>,
    ) -> Result<(), ReconcileError> {
        let span = debug_span!("receive", component = self.instance.id().get());
        let _entered = span.enter();
        let next_props = next.props();
        self.component.borrow_mut().will_update(&next_props);
        let previous = std::mem::replace(&mut self.props, next_props);
        self.element = next.clone();
        let rendered = self.render();
        self.component.borrow_mut().did_update(&previous);
        self.diff(&rendered, ctx)
    }

    /// Renders again with unchanged props after a state change.
    pub(crate) fn rerender(&mut self, ctx: &mut Ctx<'_>) -> Result<(), ReconcileError> {
        let span = debug_span!("rerender", component = self.instance.id().get());
        let _entered = span.enter();
        self.component.borrow_mut().will_update(&self.props);
        let rendered = self.render();
        self.component.borrow_mut().did_update(&self.props);
        self.diff(&rendered, ctx)
    }

    fn diff(&mut self, rendered: &Element, ctx: &mut Ctx<'_>) -> Result<(), ReconcileError> {
        let child = self.child.as_deref_mut().ok_or(ReconcileError::NotMounted)?;
        trace!(rendered = rendered.kind_name(), "diffing rendered child");
        reconcile(child, rendered, ctx)
    }

    pub(crate) fn unmount(&mut self, ctx: &mut Ctx<'_>) {
        self.component.borrow_mut().will_unmount();
        if let Some(child) = self.child.as_deref_mut() {
            child.unmount(ctx);
        }
        self.component.borrow_mut().did_unmount();
        ctx.runtime.scheduler.forget(self.instance.id());
    }
}
