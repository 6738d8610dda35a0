//! User-defined components.
//!
//! A component is a value that turns [`Props`] into an [`Element`]. Synchronous components
//! implement [`Component`] and render immediately; asynchronous ones implement
//! [`AsyncComponent`] and produce their element from a future, showing an optional
//! placeholder until the first result arrives.
//!
//! Both kinds receive a [`Handle`] at creation time. The handle is the only way for a
//! component to change its own state from the outside (an event handler, a timer), and it
//! schedules a re-render whenever it does.

use alloc::rc::{Rc, Weak};
use core::{
    any::{Any, TypeId, type_name},
    cell::RefCell,
    fmt::{self, Debug},
};

use futures::future::LocalBoxFuture;

use crate::{Element, Props};

/// Identity of a mounted component instance, unique within one renderer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ComponentId(u64);

impl ComponentId {
    /// Creates an identifier from its raw value.
    #[must_use]
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    /// Returns the raw value.
    #[must_use]
    pub const fn get(self) -> u64 {
        self.0
    }
}

/// Receives "this component needs to render again" notifications.
pub trait Notify {
    /// Marks `component` dirty. Repeated calls before the next flush coalesce.
    fn enqueue(&self, component: ComponentId);
}

/// Lifecycle hooks shared by every component kind. All hooks default to no-ops.
pub trait Lifecycle {
    /// Called right before the first rendered subtree is attached.
    fn will_mount(&mut self) {}

    /// Called once the component's host nodes are attached.
    fn did_mount(&mut self) {}

    /// Called before the component renders with `next` props.
    fn will_update(&mut self, next: &Props) {
        let _ = next;
    }

    /// Called after an update has been applied; `previous` are the props it replaced.
    fn did_update(&mut self, previous: &Props) {
        let _ = previous;
    }

    /// Called before the component's subtree is torn down.
    fn will_unmount(&mut self) {}

    /// Called after the component's host nodes are gone.
    fn did_unmount(&mut self) {}
}

/// A component that renders synchronously.
///
/// ```
/// use eddy_core::{Component, Element, Handle, Lifecycle, Props, host};
///
/// struct Greeting;
///
/// impl Lifecycle for Greeting {}
///
/// impl Component for Greeting {
///     fn create(_props: &Props, _handle: Handle<Self>) -> Self {
///         Self
///     }
///
///     fn render(&self, props: &Props) -> Element {
///         host("p").child(props.get_str("name").unwrap_or("world")).into()
///     }
/// }
/// ```
pub trait Component: Lifecycle + Sized + 'static {
    /// Builds the instance. `handle` cannot reach the instance until this returns.
    fn create(props: &Props, handle: Handle<Self>) -> Self;

    /// Describes what the component looks like for `props`.
    fn render(&self, props: &Props) -> Element;
}

/// A component whose rendering completes asynchronously.
///
/// Render requests are queued in the component's mailbox and served one at a time; the
/// reconciler only applies the reply to the most recent request.
pub trait AsyncComponent: Lifecycle + Sized + 'static {
    /// Builds the instance. `handle` cannot reach the instance until this returns.
    fn create(props: &Props, handle: Handle<Self>) -> Self;

    /// Element shown until the first render completes. `None` uses the renderer's
    /// default placeholder.
    fn placeholder(&self) -> Option<Element> {
        None
    }

    /// Starts rendering for `props`. The future must not borrow the component.
    fn render(&self, props: &Props) -> LocalBoxFuture<'static, Element>;

    /// Called once the placeholder is mounted.
    fn did_placehold(&mut self) {}
}

/// Object-safe view of a [`Component`].
pub trait DynComponent: Lifecycle {
    /// Forwards to [`Component::render`].
    fn render_element(&self, props: &Props) -> Element;
}

impl<C: Component> DynComponent for C {
    fn render_element(&self, props: &Props) -> Element {
        self.render(props)
    }
}

/// Object-safe view of an [`AsyncComponent`].
pub trait DynAsyncComponent: Lifecycle {
    /// Forwards to [`AsyncComponent::placeholder`].
    fn placeholder_element(&self) -> Option<Element>;

    /// Forwards to [`AsyncComponent::render`].
    fn render_future(&self, props: &Props) -> LocalBoxFuture<'static, Element>;

    /// Forwards to [`AsyncComponent::did_placehold`].
    fn placeheld(&mut self);
}

impl<C: AsyncComponent> DynAsyncComponent for C {
    fn placeholder_element(&self) -> Option<Element> {
        self.placeholder()
    }

    fn render_future(&self, props: &Props) -> LocalBoxFuture<'static, Element> {
        self.render(props)
    }

    fn placeheld(&mut self) {
        self.did_placehold();
    }
}

/// A weak, schedulable reference a component keeps to itself.
pub struct Handle<C> {
    cell: Weak<RefCell<C>>,
    id: ComponentId,
    notify: Rc<dyn Notify>,
}

impl<C> Clone for Handle<C> {
    fn clone(&self) -> Self {
        Self {
            cell: self.cell.clone(),
            id: self.id,
            notify: self.notify.clone(),
        }
    }
}

impl<C> Debug for Handle<C> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Handle")
            .field("component", &type_name::<C>())
            .field("id", &self.id)
            .field("alive", &self.is_alive())
            .finish()
    }
}

impl<C> Handle<C> {
    /// The identity of the component this handle points at.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// Returns `true` while the instance still exists.
    #[must_use]
    pub fn is_alive(&self) -> bool {
        self.cell.strong_count() > 0
    }

    /// Mutates the component and schedules a re-render.
    ///
    /// Returns `None` without scheduling anything when the component is gone or is
    /// currently borrowed (for example from inside its own `render`).
    pub fn update<R>(&self, f: impl FnOnce(&mut C) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let result = {
            let mut component = cell.try_borrow_mut().ok()?;
            f(&mut component)
        };
        self.notify.enqueue(self.id);
        Some(result)
    }

    /// Reads the component without scheduling anything.
    pub fn read<R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let cell = self.cell.upgrade()?;
        let component = cell.try_borrow().ok()?;
        Some(f(&component))
    }
}

/// A type-erased, shareable reference to a live component instance.
#[derive(Clone)]
pub struct Instance {
    any: Rc<dyn Any>,
    id: ComponentId,
    name: &'static str,
}

impl Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Instance")
            .field("name", &self.name)
            .field("id", &self.id)
            .finish_non_exhaustive()
    }
}

impl Instance {
    fn new<C: 'static>(cell: Rc<RefCell<C>>, id: ComponentId) -> Self {
        Self {
            any: cell,
            id,
            name: type_name::<C>(),
        }
    }

    /// The identity of this instance.
    #[must_use]
    pub const fn id(&self) -> ComponentId {
        self.id
    }

    /// The component's type name.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// Recovers the concrete component.
    #[must_use]
    pub fn downcast<C: 'static>(&self) -> Option<Rc<RefCell<C>>> {
        Rc::downcast::<RefCell<C>>(self.any.clone()).ok()
    }

    /// Reads the concrete component, if it is a `C` and not mutably borrowed.
    pub fn read<C: 'static, R>(&self, f: impl FnOnce(&C) -> R) -> Option<R> {
        let cell = self.downcast::<C>()?;
        let component = cell.try_borrow().ok()?;
        Some(f(&component))
    }

    /// Returns `true` if both references point at the same instance.
    #[must_use]
    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.any, &other.any)
    }
}

/// A freshly created instance, both as its public face and its object-safe interface.
pub struct Created<T: ?Sized> {
    /// Public, downcastable reference.
    pub instance: Instance,
    /// Interface used by the reconciler.
    pub component: Rc<RefCell<T>>,
}

impl<T: ?Sized> Debug for Created<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Created")
            .field("instance", &self.instance)
            .finish_non_exhaustive()
    }
}

/// Creates a synchronous component instance.
pub type SyncFactory = fn(&Props, ComponentId, Rc<dyn Notify>) -> Created<dyn DynComponent>;

/// Creates an asynchronous component instance.
pub type AsyncFactory = fn(&Props, ComponentId, Rc<dyn Notify>) -> Created<dyn DynAsyncComponent>;

/// How a component type renders.
#[derive(Clone, Copy)]
pub enum ComponentKind {
    /// Renders synchronously.
    Sync(SyncFactory),
    /// Renders through a mailbox.
    Async(AsyncFactory),
}

impl Debug for ComponentKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Sync(_) => f.write_str("Sync"),
            Self::Async(_) => f.write_str("Async"),
        }
    }
}

/// Runtime description of a component type: identity, name and factory.
#[derive(Debug, Clone, Copy)]
pub struct ComponentType {
    type_id: TypeId,
    name: &'static str,
    kind: ComponentKind,
}

impl PartialEq for ComponentType {
    fn eq(&self, other: &Self) -> bool {
        self.type_id == other.type_id
    }
}

impl Eq for ComponentType {}

fn create_sync<C: Component>(
    props: &Props,
    id: ComponentId,
    notify: Rc<dyn Notify>,
) -> Created<dyn DynComponent> {
    let cell = Rc::new_cyclic(|weak: &Weak<RefCell<C>>| {
        let handle = Handle {
            cell: weak.clone(),
            id,
            notify,
        };
        RefCell::new(C::create(props, handle))
    });
    Created {
        instance: Instance::new(cell.clone(), id),
        component: cell,
    }
}

fn create_async<C: AsyncComponent>(
    props: &Props,
    id: ComponentId,
    notify: Rc<dyn Notify>,
) -> Created<dyn DynAsyncComponent> {
    let cell = Rc::new_cyclic(|weak: &Weak<RefCell<C>>| {
        let handle = Handle {
            cell: weak.clone(),
            id,
            notify,
        };
        RefCell::new(C::create(props, handle))
    });
    Created {
        instance: Instance::new(cell.clone(), id),
        component: cell,
    }
}

impl ComponentType {
    /// Describes the synchronous component `C`.
    #[must_use]
    pub fn of<C: Component>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: short_name(type_name::<C>()),
            kind: ComponentKind::Sync(create_sync::<C>),
        }
    }

    /// Describes the asynchronous component `C`.
    #[must_use]
    pub fn of_async<C: AsyncComponent>() -> Self {
        Self {
            type_id: TypeId::of::<C>(),
            name: short_name(type_name::<C>()),
            kind: ComponentKind::Async(create_async::<C>),
        }
    }

    /// The [`TypeId`] of the component.
    #[must_use]
    pub const fn type_id(&self) -> TypeId {
        self.type_id
    }

    /// The unqualified type name of the component.
    #[must_use]
    pub const fn name(&self) -> &'static str {
        self.name
    }

    /// How the component renders.
    #[must_use]
    pub const fn kind(&self) -> ComponentKind {
        self.kind
    }

    /// Returns `true` for asynchronous components.
    #[must_use]
    pub const fn is_async(&self) -> bool {
        matches!(self.kind, ComponentKind::Async(_))
    }
}

fn short_name(full: &'static str) -> &'static str {
    let end = full.find('<').unwrap_or(full.len());
    full[..end].rsplit("::").next().unwrap_or(full)
}

#[cfg(test)]
mod tests {
    use alloc::vec::Vec;
    use core::cell::Cell;

    use super::*;
    use crate::host;

    #[derive(Default)]
    struct Recorder(RefCell<Vec<ComponentId>>);

    impl Notify for Recorder {
        fn enqueue(&self, component: ComponentId) {
            self.0.borrow_mut().push(component);
        }
    }

    struct Counter {
        count: Cell<i64>,
        handle: Handle<Self>,
    }

    impl Lifecycle for Counter {}

    impl Component for Counter {
        fn create(props: &Props, handle: Handle<Self>) -> Self {
            Self {
                count: Cell::new(props.get_int("start").unwrap_or_default()),
                handle,
            }
        }

        fn render(&self, _props: &Props) -> Element {
            host("span").child(self.count.get()).into()
        }
    }

    fn create_counter(notify: &Rc<Recorder>) -> Created<dyn DynComponent> {
        let ComponentKind::Sync(factory) = ComponentType::of::<Counter>().kind() else {
            panic!("Counter is synchronous");
        };
        let props = Props::from(crate::Attributes::new().with("start", 4));
        factory(&props, ComponentId::new(9), notify.clone())
    }

    #[test]
    fn handle_updates_schedule_the_component() {
        let notify = Rc::new(Recorder::default());
        let created = create_counter(&notify);
        let handle = created
            .instance
            .read(|counter: &Counter| counter.handle.clone())
            .expect("instance is a Counter");

        let after = handle.update(|counter| {
            counter.count.set(counter.count.get() + 1);
            counter.count.get()
        });
        assert_eq!(after, Some(5), "update returns the closure result");
        assert_eq!(*notify.0.borrow(), [ComponentId::new(9)], "update enqueues once");
    }

    #[test]
    fn handle_is_inert_once_the_instance_is_dropped() {
        let notify = Rc::new(Recorder::default());
        let created = create_counter(&notify);
        let handle = created
            .instance
            .read(|counter: &Counter| counter.handle.clone())
            .expect("instance is a Counter");
        drop(created);

        assert!(!handle.is_alive());
        assert_eq!(handle.update(|counter| counter.count.get()), None);
        assert!(notify.0.borrow().is_empty(), "dead handles never schedule");
    }

    #[test]
    fn update_during_borrow_is_refused() {
        let notify = Rc::new(Recorder::default());
        let created = create_counter(&notify);
        let handle = created
            .instance
            .read(|counter: &Counter| counter.handle.clone())
            .expect("instance is a Counter");
        let _guard = created.component.borrow();
        assert_eq!(handle.update(|_| ()), None);
        assert!(notify.0.borrow().is_empty());
    }

    #[test]
    fn component_types_compare_by_type() {
        assert_eq!(ComponentType::of::<Counter>(), ComponentType::of::<Counter>());
        assert_eq!(ComponentType::of::<Counter>().name(), "Counter");
        assert!(!ComponentType::of::<Counter>().is_async());
    }
}
