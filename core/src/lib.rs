//! # eddy-core
//!
//! The vocabulary shared by the Eddy reconciler and its hosts: immutable [`Element`]
//! descriptions, the [`Component`] and [`AsyncComponent`] traits, event [`Handler`]s, and
//! the [`Host`] trait a platform implements to receive node mutations.
//!
//! This crate is `no_std` and only needs `alloc`.

#![no_std]

extern crate alloc;

pub mod component;
pub mod element;
pub mod error;
pub mod event;
pub mod handler;
pub mod host;
pub mod props;

pub use component::{
    AsyncComponent, Component, ComponentId, ComponentKind, ComponentType, Handle, Instance,
    Lifecycle, Notify,
};
pub use element::{ComponentElement, Element, HostElement, async_component, component, host};
pub use error::HostError;
pub use event::Event;
pub use handler::Handler;
pub use host::{Host, NodeId};
pub use props::{AttrValue, Attributes, Key, Props};
