//! Mailboxes and actor tasks of async components.
//!
//! Every mounted async component owns one mailbox and one task on the renderer's local
//! executor that drains it strictly in arrival order. Render requests carry a generation
//! number; the task answers each one on the shared reply channel and the renderer only
//! applies the reply whose generation is still the latest.
//!
//! Render requests are always accepted. The capacity only bounds routed events: once that
//! many are queued, further events are rejected until the actor catches up.
//!
//! The task never touches host nodes. It only produces new [`Element`]s and runs event
//! handlers that were routed to the component.

use std::{
    cell::{Cell, RefCell},
    rc::Rc,
};

use async_channel::{Receiver, Sender};
use eddy_core::{ComponentId, Element, Event, Handler, Props, component::DynAsyncComponent};
use smol::{LocalExecutor, Task};
use tracing::{Instrument, debug, debug_span, trace, warn};

use crate::ReconcileError;

/// Which phase a render request belongs to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    /// First render, replacing the placeholder.
    Mount,
    /// Re-render with new props or state.
    Receive,
}

/// A message queued in a component's mailbox.
#[derive(Debug)]
pub enum Request {
    /// Render the component with `props`.
    Render {
        /// Phase of the request.
        method: Method,
        /// Generation tag the reply must carry.
        generation: u64,
        /// Props to render with.
        props: Props,
    },
    /// Run an event handler bound inside the component's subtree.
    Event {
        /// Handler to run.
        handler: Handler,
        /// Event to hand it.
        event: Event,
    },
}

/// A finished render, sent back to the renderer.
#[derive(Debug)]
pub struct Reply {
    /// Component that rendered.
    pub component: ComponentId,
    /// Phase of the answered request.
    pub method: Method,
    /// Generation of the answered request.
    pub generation: u64,
    /// Rendered element.
    pub element: Element,
}

/// Sending half of a component's mailbox.
#[derive(Debug, Clone)]
pub struct Mailbox {
    owner: ComponentId,
    sender: Sender<Request>,
    events: Rc<Cell<usize>>,
    capacity: usize,
}

impl Mailbox {
    /// Spawns the actor of `component` on `executor` and returns its mailbox and task.
    ///
    /// Dropping the task cancels the actor.
    pub fn spawn(
        owner: ComponentId,
        component: Rc<RefCell<dyn DynAsyncComponent>>,
        capacity: usize,
        replies: Sender<Reply>,
        executor: &LocalExecutor<'static>,
    ) -> (Self, Task<()>) {
        let (sender, requests) = async_channel::unbounded();
        let events = Rc::new(Cell::new(0));
        let span = debug_span!("actor", component = owner.get());
        let task = executor
            .spawn(serve(owner, component, requests, replies, events.clone()).instrument(span));
        let mailbox = Self {
            owner,
            sender,
            events,
            capacity: capacity.max(1),
        };
        (mailbox, task)
    }

    /// The component this mailbox belongs to.
    #[must_use]
    pub const fn owner(&self) -> ComponentId {
        self.owner
    }

    /// Queues a request. Render requests are never refused while the mailbox is open.
    ///
    /// # Errors
    ///
    /// Returns [`ReconcileError::MailboxClosed`] once the mailbox was closed, and
    /// [`ReconcileError::MailboxFull`] for an event while the queued events are at capacity.
    pub fn post(&self, request: Request) -> Result<(), ReconcileError> {
        let event = matches!(request, Request::Event { .. });
        if event && self.events.get() >= self.capacity {
            return Err(ReconcileError::MailboxFull(self.owner));
        }
        self.sender
            .try_send(request)
            .map_err(|_| ReconcileError::MailboxClosed(self.owner))?;
        if event {
            self.events.set(self.events.get() + 1);
        }
        Ok(())
    }

    /// Wraps `handler` so that events are delivered through this mailbox.
    #[must_use]
    pub fn route(&self, handler: &Handler) -> Handler {
        let mailbox = self.clone();
        let handler = handler.clone();
        Handler::new(move |event| {
            let request = Request::Event {
                handler: handler.clone(),
                event: event.clone(),
            };
            if let Err(error) = mailbox.post(request) {
                warn!(%error, kind = event.kind(), "dropping event");
            }
        })
    }

    /// Stops accepting requests. Requests already queued are discarded.
    pub fn close(&self) {
        self.sender.close();
    }

    /// Returns `true` once the mailbox was closed.
    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.sender.is_closed()
    }

    /// Number of queued requests.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sender.len()
    }

    /// Returns `true` if no request is queued.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.sender.is_empty()
    }
}

async fn serve(
    owner: ComponentId,
    component: Rc<RefCell<dyn DynAsyncComponent>>,
    requests: Receiver<Request>,
    replies: Sender<Reply>,
    events: Rc<Cell<usize>>,
) {
    while let Ok(request) = requests.recv().await {
        match request {
            Request::Render {
                method,
                generation,
                props,
            } => {
                let future = match component.try_borrow() {
                    Ok(component) => component.render_future(&props),
                    Err(_) => {
                        warn!(generation, "component busy, skipping render request");
                        continue;
                    }
                };
                let element = future.await;
                trace!(generation, ?method, "render finished");
                let reply = Reply {
                    component: owner,
                    method,
                    generation,
                    element,
                };
                if replies.send(reply).await.is_err() {
                    debug!("renderer gone, stopping actor");
                    break;
                }
            }
            Request::Event { handler, event } => {
                events.set(events.get().saturating_sub(1));
                trace!(kind = event.kind(), "delivering routed event");
                handler.call(&event);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use eddy_core::{AsyncComponent, Handle, Lifecycle, NodeId};
    use futures::{FutureExt, future::LocalBoxFuture};

    use super::*;

    struct Echo;

    impl Lifecycle for Echo {}

    impl AsyncComponent for Echo {
        fn create(_props: &Props, _handle: Handle<Self>) -> Self {
            Self
        }

        fn render(&self, props: &Props) -> LocalBoxFuture<'static, Element> {
            let label = props.get_str("label").unwrap_or_default().to_owned();
            async move { Element::from(label) }.boxed_local()
        }
    }

    fn props(label: &str) -> Props {
        Props::from(eddy_core::Attributes::new().with("label", label))
    }

    fn render(generation: u64, label: &str) -> Request {
        Request::Render {
            method: Method::Receive,
            generation,
            props: props(label),
        }
    }

    fn spawn(capacity: usize) -> (LocalExecutor<'static>, Mailbox, Task<()>, Receiver<Reply>) {
        let executor = LocalExecutor::new();
        let (replies, reply_rx) = async_channel::unbounded();
        let component: Rc<RefCell<dyn DynAsyncComponent>> = Rc::new(RefCell::new(Echo));
        let (mailbox, task) =
            Mailbox::spawn(ComponentId::new(1), component, capacity, replies, &executor);
        (executor, mailbox, task, reply_rx)
    }

    #[test]
    fn requests_are_answered_in_order() {
        let (executor, mailbox, _task, replies) = spawn(4);
        mailbox.post(render(1, "a")).unwrap();
        mailbox.post(render(2, "b")).unwrap();
        while executor.try_tick() {}

        let answered: Vec<_> = std::iter::from_fn(|| replies.try_recv().ok())
            .map(|reply| (reply.generation, reply.element))
            .collect();
        assert_eq!(
            answered,
            [(1, Element::from("a")), (2, Element::from("b"))],
            "one reply per request, in arrival order"
        );
    }

    fn click() -> Request {
        Request::Event {
            handler: Handler::new(|_| {}),
            event: Event::new("click", NodeId::new(0)),
        }
    }

    #[test]
    fn full_mailbox_rejects_events_but_keeps_renders() {
        let (executor, mailbox, _task, replies) = spawn(1);
        mailbox.post(render(1, "first")).unwrap();
        mailbox.post(click()).unwrap();
        assert_eq!(
            mailbox.post(click()),
            Err(ReconcileError::MailboxFull(ComponentId::new(1)))
        );
        mailbox.post(render(2, "second")).unwrap();
        while executor.try_tick() {}

        let answered: Vec<_> = std::iter::from_fn(|| replies.try_recv().ok())
            .map(|reply| reply.generation)
            .collect();
        assert_eq!(answered, [1, 2], "every render is answered");
        mailbox.post(click()).expect("room again once the event ran");
    }

    #[test]
    fn closed_mailbox_rejects_posts() {
        let (_executor, mailbox, _task, _replies) = spawn(2);
        mailbox.close();
        assert!(mailbox.is_closed());
        assert_eq!(
            mailbox.post(render(1, "x")),
            Err(ReconcileError::MailboxClosed(ComponentId::new(1)))
        );
    }

    #[test]
    fn routed_events_run_on_the_actor() {
        let (executor, mailbox, _task, _replies) = spawn(2);
        let hits = Rc::new(std::cell::Cell::new(0));
        let counter = hits.clone();
        let routed = mailbox.route(&Handler::new(move |_| counter.set(counter.get() + 1)));

        routed.call(&Event::new("click", NodeId::new(0)));
        assert_eq!(hits.get(), 0, "handler waits for the actor");
        while executor.try_tick() {}
        assert_eq!(hits.get(), 1);
    }
}
