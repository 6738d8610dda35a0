//! Mount and unmount entry points.
//!
//! A [`Renderer`] owns a [`Host`] and every tree mounted into it, keyed by container node.
//! Nothing happens in the background: state changes queue up in the scheduler until
//! [`flush`](Renderer::flush), and async renders only make progress while the renderer is
//! [`pump`](Renderer::pump)ed or [`settle`](Renderer::settle)d.

use std::collections::BTreeMap;

use async_channel::Receiver;
use eddy_core::{ComponentId, Element, Host, NodeId};
use tracing::{debug, debug_span, trace};

use crate::{
    Diagnostic, EngineConfig, ReconcileError,
    context::{Ctx, Runtime},
    mailbox::Reply,
    manager::{Manager, PublicInstance, reconcile},
};

/// Mounts element trees into containers of a host and keeps them up to date.
///
/// ```
/// use eddy::{Renderer, host};
/// use eddy_memory::MemoryHost;
///
/// let mut memory = MemoryHost::new();
/// let root = memory.create_container("main");
/// let mut renderer = Renderer::new(memory);
///
/// renderer.mount(host("h1").child("Hello"), root).unwrap();
/// renderer.mount(host("h1").child("Goodbye"), root).unwrap();
/// assert_eq!(renderer.host().render(root), "<main><h1>Goodbye</h1></main>");
/// ```
pub struct Renderer<H: Host> {
    host: H,
    runtime: Runtime,
    replies: Receiver<Reply>,
    roots: BTreeMap<NodeId, Manager>,
    diagnostics: Vec<Diagnostic>,
}

impl<H: Host> std::fmt::Debug for Renderer<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Renderer")
            .field("runtime", &self.runtime)
            .field("roots", &self.roots.keys().collect::<Vec<_>>())
            .field("diagnostics", &self.diagnostics.len())
            .finish_non_exhaustive()
    }
}

impl<H: Host> Renderer<H> {
    /// Creates a renderer with the default configuration.
    pub fn new(host: H) -> Self {
        Self::with_config(host, EngineConfig::default())
    }

    /// Creates a renderer with `config`.
    pub fn with_config(host: H, config: EngineConfig) -> Self {
        let (runtime, replies) = Runtime::new(config);
        Self {
            host,
            runtime,
            replies,
            roots: BTreeMap::new(),
            diagnostics: Vec::new(),
        }
    }

    /// The host the trees are rendered into.
    pub const fn host(&self) -> &H {
        &self.host
    }

    /// Mutable access to the host, for creating containers or dispatching events.
    pub const fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    /// The active configuration.
    pub const fn config(&self) -> &EngineConfig {
        &self.runtime.config
    }

    /// Renders `element` into `container`.
    ///
    /// The first call for a container mounts the tree and appends its nodes. Later calls
    /// reconcile the mounted tree against the new element, reusing whatever matches.
    ///
    /// # Errors
    ///
    /// Fails when the root element cannot be mounted or the host rejects the container.
    /// Failures below the root are recorded as diagnostics instead.
    pub fn mount(
        &mut self,
        element: impl Into<Element>,
        container: NodeId,
    ) -> Result<PublicInstance, ReconcileError> {
        let element = element.into();
        let span = debug_span!("mount", container = container.index());
        let _entered = span.enter();
        let mut ctx = Ctx::new(&mut self.host, &self.runtime, &mut self.diagnostics);

        if let Some(root) = self.roots.get_mut(&container) {
            reconcile(root, &element, &mut ctx)?;
            return Ok(root.public_instance());
        }

        let mut manager = Manager::instantiate(&element, &mut ctx)?;
        let nodes = manager.mount(&mut ctx)?;
        for node in nodes {
            if let Err(error) = ctx.host.append_child(container, node) {
                manager.unmount(&mut ctx);
                return Err(error.into());
            }
        }
        manager.did_attach();
        debug!(kind = element.kind_name(), "root mounted");
        let instance = manager.public_instance();
        self.roots.insert(container, manager);
        Ok(instance)
    }

    /// Tears down the tree in `container` and detaches its nodes.
    ///
    /// Returns `false` if nothing was mounted there.
    ///
    /// # Errors
    ///
    /// Fails when the host refuses to detach a node.
    pub fn unmount(&mut self, container: NodeId) -> Result<bool, ReconcileError> {
        let Some(mut manager) = self.roots.remove(&container) else {
            return Ok(false);
        };
        let span = debug_span!("unmount", container = container.index());
        let _entered = span.enter();
        let mut ctx = Ctx::new(&mut self.host, &self.runtime, &mut self.diagnostics);
        let nodes = manager.host_nodes();
        manager.unmount(&mut ctx);
        for node in nodes {
            ctx.host.remove(node)?;
        }
        Ok(true)
    }

    /// The manager mounted in `container`.
    #[must_use]
    pub fn root(&self, container: NodeId) -> Option<&Manager> {
        self.roots.get(&container)
    }

    /// Re-renders every component scheduled since the last flush, in scheduling order.
    ///
    /// Components scheduled while the flush runs wait for the next one. Returns how many
    /// components re-rendered.
    pub fn flush(&mut self) -> usize {
        let batch = self.runtime.scheduler.take_batch();
        if batch.is_empty() {
            return 0;
        }
        let span = debug_span!("flush", batch = batch.len());
        let _entered = span.enter();
        let mut ctx = Ctx::new(&mut self.host, &self.runtime, &mut self.diagnostics);
        let mut rendered = 0;
        for id in batch {
            let Some(manager) = find(&mut self.roots, id) else {
                trace!(component = id.get(), "scheduled component is gone");
                continue;
            };
            match manager.rerender(&mut ctx) {
                Ok(()) => rendered += 1,
                Err(error) => ctx.fail(error),
            }
        }
        rendered
    }

    /// Runs actor tasks and applies their replies until neither makes progress.
    ///
    /// Returns the number of replies handled, stale ones included.
    pub fn pump(&mut self) -> usize {
        let mut handled = 0;
        loop {
            let mut progressed = false;
            while self.runtime.executor.try_tick() {
                progressed = true;
            }
            while let Ok(reply) = self.replies.try_recv() {
                self.apply_reply(reply);
                handled += 1;
                progressed = true;
            }
            if !progressed {
                return handled;
            }
        }
    }

    /// Alternates [`flush`](Self::flush) and [`pump`](Self::pump) until both are idle.
    ///
    /// Renders waiting on outside events (timers, I/O) are not awaited; use
    /// [`settle`](Self::settle) for those. A component that schedules itself on every
    /// render keeps this from returning.
    pub fn run_until_stalled(&mut self) -> usize {
        let mut total = 0;
        loop {
            let work = self.flush() + self.pump();
            if work == 0 && self.runtime.scheduler.is_empty() {
                return total;
            }
            total += work;
        }
    }

    /// Like [`run_until_stalled`](Self::run_until_stalled), but also waits for every
    /// outstanding async render to answer.
    pub async fn settle(&mut self) -> usize {
        let mut total = self.run_until_stalled();
        while self.pending_async() > 0 {
            let Ok(reply) = self.runtime.executor.run(self.replies.recv()).await else {
                break;
            };
            self.apply_reply(reply);
            total += 1 + self.run_until_stalled();
        }
        total
    }

    /// Number of async components waiting for a render reply.
    #[must_use]
    pub fn pending_async(&self) -> usize {
        self.roots.values().map(Manager::pending_async).sum()
    }

    /// Number of components scheduled for the next flush.
    #[must_use]
    pub fn pending_updates(&self) -> usize {
        self.runtime.scheduler.len()
    }

    /// Diagnostics recorded so far.
    #[must_use]
    pub fn diagnostics(&self) -> &[Diagnostic] {
        &self.diagnostics
    }

    /// Drains the recorded diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    fn apply_reply(&mut self, reply: Reply) {
        let component = reply.component;
        let mut ctx = Ctx::new(&mut self.host, &self.runtime, &mut self.diagnostics);
        match find(&mut self.roots, component) {
            Some(Manager::Async(manager)) => {
                if let Err(error) = manager.apply(reply, &mut ctx) {
                    ctx.fail(error);
                }
            }
            _ => ctx.report(Diagnostic::OrphanAsyncReply(component)),
        }
    }
}

fn find(roots: &mut BTreeMap<NodeId, Manager>, id: ComponentId) -> Option<&mut Manager> {
    roots.values_mut().find_map(|root| root.find(id))
}
