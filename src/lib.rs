#![doc = include_str!("../README.md")]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::future_not_send)]

pub mod config;
mod context;
pub mod error;
pub mod logging;
pub mod mailbox;
pub mod manager;
pub mod renderer;
pub mod scheduler;

pub use config::{EngineConfig, EngineConfigBuilder};
pub use error::{Diagnostic, ReconcileError};
pub use logging::install_tracing;
pub use manager::{Manager, PublicInstance};
pub use renderer::Renderer;
pub use scheduler::Scheduler;

#[doc(inline)]
pub use eddy_core::{
    AsyncComponent, AttrValue, Attributes, Component, ComponentElement, ComponentId,
    ComponentType, Element, Event, Handle, Handler, Host, HostElement, HostError, Instance,
    Key, Lifecycle, NodeId, Props, async_component, component, host,
};
pub use tracing as log;

pub mod prelude {
    //! The types needed to write components and mount them.
    //!
    //! ```
    //! use eddy::prelude::*;
    //!
    //! struct Hello;
    //!
    //! impl Lifecycle for Hello {}
    //!
    //! impl Component for Hello {
    //!     fn create(_props: &Props, _handle: Handle<Self>) -> Self {
    //!         Self
    //!     }
    //!
    //!     fn render(&self, _props: &Props) -> Element {
    //!         host("p").child("hello").into()
    //!     }
    //! }
    //! ```
    pub use super::{
        AsyncComponent, Component, Element, Event, Handle, Handler, Lifecycle, Props,
        Renderer, async_component, component, host,
    };
    pub use futures::{FutureExt, future::LocalBoxFuture};
}
