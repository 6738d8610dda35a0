//! Element descriptions.
//!
//! An [`Element`] is an immutable description of what should be on screen: a text leaf, a
//! host element (`div`, `button`, ...), a component instantiation, or a sequence of
//! elements produced by an iterator. Elements are cheap to clone; their payloads are shared.
//!
//! ```
//! use eddy_core::{Element, host};
//!
//! let list: Element = host("ul")
//!     .attr("class", "todo")
//!     .child((1..=3).map(|n| host("li").key(n).child(n)).collect::<Element>())
//!     .into();
//! assert_eq!(list.kind_name(), "ul");
//! ```

use alloc::{borrow::Cow, rc::Rc, string::String, vec::Vec};
use core::any::TypeId;

use crate::{
    AttrValue, Attributes, Handler, Key, Props,
    component::{AsyncComponent, Component, ComponentType},
};

/// An immutable element description.
#[derive(Debug, Clone, PartialEq)]
pub enum Element {
    /// A primitive value rendered as text.
    Text(Rc<str>),
    /// A host element identified by its tag.
    Host(Rc<HostElement>),
    /// A component instantiation.
    Component(Rc<ComponentElement>),
    /// An ordered sequence of elements, typically produced by an iterator.
    Sequence(Rc<[Element]>),
}

impl Element {
    /// Creates a text element.
    #[must_use]
    pub fn text(text: impl AsRef<str>) -> Self {
        Self::Text(Rc::from(text.as_ref()))
    }

    /// Creates a sequence element.
    #[must_use]
    pub fn sequence(items: impl IntoIterator<Item = impl Into<Self>>) -> Self {
        Self::Sequence(items.into_iter().map(Into::into).collect())
    }

    /// Returns the key of this element, if it has one. Texts and sequences never do.
    #[must_use]
    pub fn key(&self) -> Option<&Key> {
        match self {
            Self::Host(host) => host.key.as_ref(),
            Self::Component(component) => component.key.as_ref(),
            Self::Text(_) | Self::Sequence(_) => None,
        }
    }

    /// Shallow type comparison used by the reconciler.
    ///
    /// Texts match texts, sequences match sequences, host elements match on tag and
    /// components match on their component type. Attributes and children are ignored.
    #[must_use]
    pub fn same_type(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Text(_), Self::Text(_)) | (Self::Sequence(_), Self::Sequence(_)) => true,
            (Self::Host(a), Self::Host(b)) => a.tag == b.tag,
            (Self::Component(a), Self::Component(b)) => a.ty.type_id() == b.ty.type_id(),
            _ => false,
        }
    }

    /// A short human readable name, used in logs and diagnostics.
    #[must_use]
    pub fn kind_name(&self) -> &str {
        match self {
            Self::Text(_) => "#text",
            Self::Host(host) => &host.tag,
            Self::Component(component) => component.ty.name(),
            Self::Sequence(_) => "#sequence",
        }
    }

    /// Returns the host element payload.
    #[must_use]
    pub fn as_host(&self) -> Option<&HostElement> {
        match self {
            Self::Host(host) => Some(host),
            _ => None,
        }
    }

    /// Returns the component payload.
    #[must_use]
    pub fn as_component(&self) -> Option<&ComponentElement> {
        match self {
            Self::Component(component) => Some(component),
            _ => None,
        }
    }

    /// Returns the text payload.
    #[must_use]
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Self::Text(text) => Some(text),
            _ => None,
        }
    }

    /// Returns the sequence items.
    #[must_use]
    pub fn as_sequence(&self) -> Option<&[Self]> {
        match self {
            Self::Sequence(items) => Some(items),
            _ => None,
        }
    }
}

impl From<&str> for Element {
    fn from(value: &str) -> Self {
        Self::text(value)
    }
}

impl From<String> for Element {
    fn from(value: String) -> Self {
        Self::Text(Rc::from(value))
    }
}

impl From<Cow<'_, str>> for Element {
    fn from(value: Cow<'_, str>) -> Self {
        Self::text(value)
    }
}

macro_rules! impl_from_display {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Element {
                fn from(value: $ty) -> Self {
                    Self::text(alloc::format!("{value}"))
                }
            }
        )*
    };
}

impl_from_display!(i32, i64, u32, u64, usize, f32, f64, bool);

impl From<HostElement> for Element {
    fn from(value: HostElement) -> Self {
        Self::Host(Rc::new(value))
    }
}

impl From<ComponentElement> for Element {
    fn from(value: ComponentElement) -> Self {
        Self::Component(Rc::new(value))
    }
}

impl From<Vec<Self>> for Element {
    fn from(value: Vec<Self>) -> Self {
        Self::Sequence(Rc::from(value))
    }
}

impl<E: Into<Self>> FromIterator<E> for Element {
    fn from_iter<I: IntoIterator<Item = E>>(iter: I) -> Self {
        Self::sequence(iter)
    }
}

/// A host element: tag, attributes and children.
#[derive(Debug, Clone, PartialEq)]
pub struct HostElement {
    tag: String,
    key: Option<Key>,
    attributes: Attributes,
    children: Vec<Element>,
}

/// Starts describing a host element with the given tag.
#[must_use]
pub fn host(tag: impl Into<String>) -> HostElement {
    HostElement::new(tag)
}

impl HostElement {
    /// Creates a host element with no attributes or children.
    #[must_use]
    pub fn new(tag: impl Into<String>) -> Self {
        Self {
            tag: tag.into(),
            key: None,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets an attribute.
    #[must_use]
    pub fn attr(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Binds a listener for `event` (stored under the `on<Event>` key).
    #[must_use]
    pub fn on(self, event: &str, handler: impl Into<Handler>) -> Self {
        let name = listener_key(event);
        self.attr(name, AttrValue::Handler(handler.into()))
    }

    /// Appends a child.
    #[must_use]
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// Appends several children.
    #[must_use]
    pub fn children(mut self, children: impl IntoIterator<Item = impl Into<Element>>) -> Self {
        self.children.extend(children.into_iter().map(Into::into));
        self
    }

    /// The tag of this element.
    #[must_use]
    pub fn tag(&self) -> &str {
        &self.tag
    }

    /// The reconciliation key, if any.
    #[must_use]
    pub const fn key_ref(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// The attributes of this element.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// The children of this element.
    #[must_use]
    pub fn child_elements(&self) -> &[Element] {
        &self.children
    }
}

fn listener_key(event: &str) -> String {
    let mut chars = event.chars();
    let mut name = String::from(crate::event::LISTENER_PREFIX);
    if let Some(first) = chars.next() {
        name.extend(first.to_uppercase());
        name.push_str(chars.as_str());
    }
    name
}

/// A component instantiation: which component, with which props.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentElement {
    ty: ComponentType,
    key: Option<Key>,
    attributes: Attributes,
    children: Vec<Element>,
}

/// Starts describing an instantiation of the synchronous component `C`.
#[must_use]
pub fn component<C: Component>() -> ComponentElement {
    ComponentElement::new(ComponentType::of::<C>())
}

/// Starts describing an instantiation of the asynchronous component `C`.
#[must_use]
pub fn async_component<C: AsyncComponent>() -> ComponentElement {
    ComponentElement::new(ComponentType::of_async::<C>())
}

impl ComponentElement {
    /// Creates an instantiation of `ty` with empty props.
    #[must_use]
    pub const fn new(ty: ComponentType) -> Self {
        Self {
            ty,
            key: None,
            attributes: Attributes::new(),
            children: Vec::new(),
        }
    }

    /// Sets the reconciliation key.
    #[must_use]
    pub fn key(mut self, key: impl Into<Key>) -> Self {
        self.key = Some(key.into());
        self
    }

    /// Sets a prop.
    #[must_use]
    pub fn prop(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.attributes.insert(name, value);
        self
    }

    /// Appends a child forwarded to the component through its props.
    #[must_use]
    pub fn child(mut self, child: impl Into<Element>) -> Self {
        self.children.push(child.into());
        self
    }

    /// The component type.
    #[must_use]
    pub const fn component_type(&self) -> &ComponentType {
        &self.ty
    }

    /// The reconciliation key, if any.
    #[must_use]
    pub const fn key_ref(&self) -> Option<&Key> {
        self.key.as_ref()
    }

    /// Builds the props handed to the component.
    #[must_use]
    pub fn props(&self) -> Props {
        Props::new(self.attributes.clone(), self.children.clone())
    }

    /// Returns the [`TypeId`] of the component.
    #[must_use]
    pub fn type_id(&self) -> TypeId {
        self.ty.type_id()
    }
}
