//! Attribute values, attribute maps, keys and component props.

use alloc::{collections::BTreeMap, rc::Rc, string::String, vec::Vec};
use core::fmt::{self, Display};

use crate::{Element, Handler, event::listener_event};

/// A single attribute value.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    /// A string value.
    Str(String),
    /// An integer value.
    Int(i64),
    /// A floating point value.
    Float(f64),
    /// A boolean value.
    Bool(bool),
    /// An event listener; only meaningful under an `on<Event>` key.
    Handler(Handler),
}

impl AttrValue {
    /// Returns the string payload, if this is a string.
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(value) => Some(value),
            _ => None,
        }
    }

    /// Returns the integer payload, if this is an integer.
    #[must_use]
    pub const fn as_int(&self) -> Option<i64> {
        match self {
            Self::Int(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the float payload, if this is a float.
    #[must_use]
    pub const fn as_float(&self) -> Option<f64> {
        match self {
            Self::Float(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the boolean payload, if this is a boolean.
    #[must_use]
    pub const fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(value) => Some(*value),
            _ => None,
        }
    }

    /// Returns the handler, if this is a listener.
    #[must_use]
    pub const fn as_handler(&self) -> Option<&Handler> {
        match self {
            Self::Handler(handler) => Some(handler),
            _ => None,
        }
    }
}

impl Display for AttrValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Str(value) => f.write_str(value),
            Self::Int(value) => write!(f, "{value}"),
            Self::Float(value) => write!(f, "{value}"),
            Self::Bool(value) => write!(f, "{value}"),
            Self::Handler(_) => f.write_str("[handler]"),
        }
    }
}

macro_rules! impl_from_for_attr {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for AttrValue {
                fn from(value: $ty) -> Self {
                    Self::$variant(<$target>::from(value))
                }
            }
        )*
    };
}

impl_from_for_attr!(
    &str => Str as String,
    String => Str as String,
    i64 => Int as i64,
    i32 => Int as i64,
    u32 => Int as i64,
    f64 => Float as f64,
    f32 => Float as f64,
    bool => Bool as bool,
    Handler => Handler as Handler,
);

/// Ordered attribute map.
///
/// Iteration order is the key order, which keeps attribute application deterministic.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes(BTreeMap<String, AttrValue>);

impl Attributes {
    /// Creates an empty attribute map.
    #[must_use]
    pub const fn new() -> Self {
        Self(BTreeMap::new())
    }

    /// Builder-style insert.
    #[must_use]
    pub fn with(mut self, name: impl Into<String>, value: impl Into<AttrValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Inserts or overwrites an attribute, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<AttrValue>,
    ) -> Option<AttrValue> {
        self.0.insert(name.into(), value.into())
    }

    /// Removes an attribute, returning its value.
    pub fn remove(&mut self, name: &str) -> Option<AttrValue> {
        self.0.remove(name)
    }

    /// Returns the value stored under `name`.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.0.get(name)
    }

    /// Returns the string stored under `name`.
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.get(name).and_then(AttrValue::as_str)
    }

    /// Returns the integer stored under `name`.
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.get(name).and_then(AttrValue::as_int)
    }

    /// Returns the boolean stored under `name`.
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.get(name).and_then(AttrValue::as_bool)
    }

    /// Returns the handler stored under `name`.
    #[must_use]
    pub fn get_handler(&self, name: &str) -> Option<&Handler> {
        self.get(name).and_then(AttrValue::as_handler)
    }

    /// Returns `true` if `name` is present.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains_key(name)
    }

    /// Iterates over `(name, value)` pairs in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &AttrValue)> {
        self.0.iter().map(|(name, value)| (name.as_str(), value))
    }

    /// Iterates over the listener entries as `(event, handler)` pairs.
    pub fn listeners(&self) -> impl Iterator<Item = (String, &Handler)> {
        self.0.iter().filter_map(|(name, value)| {
            let event = listener_event(name)?;
            value.as_handler().map(|handler| (event, handler))
        })
    }

    /// Number of attributes.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns `true` if there are no attributes.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl<K, V> FromIterator<(K, V)> for Attributes
where
    K: Into<String>,
    V: Into<AttrValue>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self(
            iter.into_iter()
                .map(|(name, value)| (name.into(), value.into()))
                .collect(),
        )
    }
}

/// Identity of an item inside a sequence.
///
/// Keys let the list reconciler keep a mounted item (and its component state) when the
/// sequence is reordered.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Key(Rc<str>);

impl Key {
    /// Creates a key from its textual form.
    #[must_use]
    pub fn new(key: impl AsRef<str>) -> Self {
        Self(Rc::from(key.as_ref()))
    }

    /// Returns the textual form of this key.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for Key {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for Key {
    fn from(value: String) -> Self {
        Self(Rc::from(value))
    }
}

macro_rules! impl_numeric_key {
    ($($ty:ty),*) => {
        $(
            impl From<$ty> for Key {
                fn from(value: $ty) -> Self {
                    Self::new(alloc::format!("{value}"))
                }
            }
        )*
    };
}

impl_numeric_key!(u32, u64, usize, i32, i64);

/// Props handed to a component: its attributes plus any children written between its tags.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Props {
    attributes: Attributes,
    children: Vec<Element>,
}

impl Props {
    /// Creates props from attributes and children.
    #[must_use]
    pub const fn new(attributes: Attributes, children: Vec<Element>) -> Self {
        Self {
            attributes,
            children,
        }
    }

    /// Returns the attribute map.
    #[must_use]
    pub const fn attributes(&self) -> &Attributes {
        &self.attributes
    }

    /// Returns the children passed to the component.
    #[must_use]
    pub fn children(&self) -> &[Element] {
        &self.children
    }

    /// Shortcut for [`Attributes::get`].
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&AttrValue> {
        self.attributes.get(name)
    }

    /// Shortcut for [`Attributes::get_str`].
    #[must_use]
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.attributes.get_str(name)
    }

    /// Shortcut for [`Attributes::get_int`].
    #[must_use]
    pub fn get_int(&self, name: &str) -> Option<i64> {
        self.attributes.get_int(name)
    }

    /// Shortcut for [`Attributes::get_bool`].
    #[must_use]
    pub fn get_bool(&self, name: &str) -> Option<bool> {
        self.attributes.get_bool(name)
    }
}

impl From<Attributes> for Props {
    fn from(attributes: Attributes) -> Self {
        Self::new(attributes, Vec::new())
    }
}
