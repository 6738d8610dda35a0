use std::{cell::Cell, rc::Rc};

use async_channel::{Receiver, Sender};
use eddy_core::{ComponentId, Handler, Host, Notify};
use smol::LocalExecutor;
use tracing::{debug, error, warn};

use crate::{
    Diagnostic, EngineConfig, ReconcileError,
    mailbox::{Mailbox, Reply},
    scheduler::Scheduler,
};

/// State shared by every manager of one renderer.
pub(crate) struct Runtime {
    pub config: EngineConfig,
    pub scheduler: Scheduler,
    pub executor: LocalExecutor<'static>,
    notify: Rc<dyn Notify>,
    replies: Sender<Reply>,
    next_component: Cell<u64>,
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("config", &self.config)
            .field("scheduler", &self.scheduler)
            .field("next_component", &self.next_component.get())
            .finish_non_exhaustive()
    }
}

impl Runtime {
    pub fn new(config: EngineConfig) -> (Self, Receiver<Reply>) {
        let scheduler = Scheduler::new();
        let (replies, reply_rx) = async_channel::unbounded();
        let runtime = Self {
            config,
            notify: Rc::new(scheduler.clone()),
            scheduler,
            executor: LocalExecutor::new(),
            replies,
            next_component: Cell::new(1),
        };
        (runtime, reply_rx)
    }

    pub fn next_component_id(&self) -> ComponentId {
        let id = self.next_component.get();
        self.next_component.set(id + 1);
        ComponentId::new(id)
    }

    pub fn notify(&self) -> Rc<dyn Notify> {
        self.notify.clone()
    }

    pub fn replies(&self) -> Sender<Reply> {
        self.replies.clone()
    }
}

/// Everything a manager needs while mounting, diffing or unmounting.
pub(crate) struct Ctx<'a> {
    pub host: &'a mut dyn Host,
    pub runtime: &'a Runtime,
    diagnostics: &'a mut Vec<Diagnostic>,
    route: Option<Mailbox>,
}

impl<'a> Ctx<'a> {
    pub fn new(
        host: &'a mut dyn Host,
        runtime: &'a Runtime,
        diagnostics: &'a mut Vec<Diagnostic>,
    ) -> Self {
        Self {
            host,
            runtime,
            diagnostics,
            route: None,
        }
    }

    pub fn config(&self) -> &EngineConfig {
        &self.runtime.config
    }

    /// Mailbox of the nearest async component above the current position, if any.
    pub fn route(&self) -> Option<&Mailbox> {
        self.route.as_ref()
    }

    /// Runs `f` with listeners routed through `route`.
    pub fn scoped<R>(&mut self, route: Option<Mailbox>, f: impl FnOnce(&mut Self) -> R) -> R {
        let previous = std::mem::replace(&mut self.route, route);
        let result = f(self);
        self.route = previous;
        result
    }

    /// The handler to register on the host for `handler`.
    pub fn bind(&self, handler: &Handler) -> Handler {
        self.route
            .as_ref()
            .map_or_else(|| handler.clone(), |mailbox| mailbox.route(handler))
    }

    pub fn report(&mut self, diagnostic: Diagnostic) {
        match &diagnostic {
            Diagnostic::MissingKey { unkeyed, len } => {
                warn!(unkeyed, len, "sequence items without a key lose their state on reorder");
            }
            Diagnostic::DuplicateKey(key) => warn!(%key, "duplicate key in sequence"),
            Diagnostic::StaleAsyncReply {
                component,
                generation,
                latest,
            } => debug!(component = component.get(), generation, latest, "discarding stale reply"),
            Diagnostic::OrphanAsyncReply(component) => {
                debug!(component = component.get(), "discarding reply for unmounted component");
            }
            Diagnostic::SubtreeFailed(error) => error!(%error, "subtree failed"),
        }
        self.diagnostics.push(diagnostic);
    }

    pub fn fail(&mut self, error: ReconcileError) {
        self.report(Diagnostic::SubtreeFailed(error));
    }
}
