//! Event handlers bound through `on<Event>` attributes.
//!
//! A [`Handler`] is a shared, reference-counted callback. Two handlers are equal only when
//! they point at the same callback, which is what the attribute diff uses to decide whether
//! a listener must be rebound.

use alloc::rc::Rc;
use core::{any::type_name, fmt::Debug};

use crate::Event;

/// A shared event callback.
#[derive(Clone)]
pub struct Handler(Rc<dyn Fn(&Event)>);

impl Handler {
    /// Wraps a closure into a handler.
    pub fn new(callback: impl Fn(&Event) + 'static) -> Self {
        Self(Rc::new(callback))
    }

    /// Invokes the callback.
    pub fn call(&self, event: &Event) {
        (self.0)(event);
    }

    /// Returns `true` when both handlers share the same callback.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        core::ptr::addr_eq(Rc::as_ptr(&self.0), Rc::as_ptr(&other.0))
    }
}

impl PartialEq for Handler {
    fn eq(&self, other: &Self) -> bool {
        self.ptr_eq(other)
    }
}

impl Debug for Handler {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}({:p})", type_name::<Self>(), Rc::as_ptr(&self.0).cast::<()>())
    }
}

impl<F> From<F> for Handler
where
    F: Fn(&Event) + 'static,
{
    fn from(callback: F) -> Self {
        Self::new(callback)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::Cell;

    use super::*;
    use crate::NodeId;

    #[test]
    fn clones_compare_equal_and_fresh_closures_do_not() {
        let first = Handler::new(|_| {});
        let second = Handler::new(|_| {});
        assert_eq!(first, first.clone(), "a clone shares the callback");
        assert_ne!(first, second, "distinct closures are distinct handlers");
    }

    #[test]
    fn call_forwards_the_event() {
        let seen = Rc::new(Cell::new(0));
        let counter = seen.clone();
        let handler = Handler::new(move |event| {
            assert_eq!(event.kind(), "click", "event kind is forwarded");
            counter.set(counter.get() + 1);
        });
        handler.call(&Event::new("click", NodeId::new(3)));
        handler.call(&Event::new("click", NodeId::new(3)));
        assert_eq!(seen.get(), 2, "each call invokes the callback once");
    }
}
