//! Batched re-render scheduling.
//!
//! Components mark themselves dirty through their [`Handle`](eddy_core::Handle). The
//! scheduler keeps the dirty set in first-enqueue order without duplicates; the renderer
//! drains it one batch at a time on [`flush`](crate::Renderer::flush). How often that
//! happens is up to the embedding application.

use std::{cell::RefCell, collections::HashSet, rc::Rc};

use eddy_core::{ComponentId, Notify};
use tracing::trace;

#[derive(Debug, Default)]
struct DirtySet {
    order: Vec<ComponentId>,
    members: HashSet<ComponentId>,
}

/// Ordered, de-duplicated set of components waiting to re-render.
#[derive(Debug, Clone, Default)]
pub struct Scheduler {
    dirty: Rc<RefCell<DirtySet>>,
}

impl Scheduler {
    /// Creates an empty scheduler.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Marks `component` dirty. A component already queued keeps its position.
    pub fn enqueue(&self, component: ComponentId) {
        let mut dirty = self.dirty.borrow_mut();
        if dirty.members.insert(component) {
            dirty.order.push(component);
            trace!(?component, "component scheduled");
        }
    }

    /// Removes and returns the current batch. Enqueues made afterwards form the next one.
    pub fn take_batch(&self) -> Vec<ComponentId> {
        let mut dirty = self.dirty.borrow_mut();
        dirty.members.clear();
        std::mem::take(&mut dirty.order)
    }

    /// Drops a component from the queue, typically because it was unmounted.
    pub fn forget(&self, component: ComponentId) {
        let mut dirty = self.dirty.borrow_mut();
        if dirty.members.remove(&component) {
            dirty.order.retain(|queued| *queued != component);
        }
    }

    /// Returns `true` if `component` is queued.
    #[must_use]
    pub fn contains(&self, component: ComponentId) -> bool {
        self.dirty.borrow().members.contains(&component)
    }

    /// Number of queued components.
    #[must_use]
    pub fn len(&self) -> usize {
        self.dirty.borrow().order.len()
    }

    /// Returns `true` if nothing is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.dirty.borrow().order.is_empty()
    }
}

impl Notify for Scheduler {
    fn enqueue(&self, component: ComponentId) {
        Self::enqueue(self, component);
    }
}
