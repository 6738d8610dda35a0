//! Shared fixtures: a renderer over the memory host, a lifecycle log and a few components.

#![allow(dead_code)]

use std::{cell::RefCell, time::Duration};

use eddy::{
    AsyncComponent, Component, Element, Handle, Instance, Lifecycle, Manager, NodeId, Props,
    Renderer, host,
};
use eddy_memory::MemoryHost;
use futures::{FutureExt, future::LocalBoxFuture};

thread_local! {
    static LOG: RefCell<Vec<String>> = const { RefCell::new(Vec::new()) };
}

/// Appends to this thread's lifecycle log.
pub fn log(entry: impl Into<String>) {
    LOG.with(|log| log.borrow_mut().push(entry.into()));
}

/// Drains this thread's lifecycle log.
pub fn take_log() -> Vec<String> {
    LOG.with(|log| std::mem::take(&mut *log.borrow_mut()))
}

/// A renderer over a fresh memory host, plus its root container.
pub fn setup() -> (Renderer<MemoryHost>, NodeId) {
    let mut memory = MemoryHost::new();
    let root = memory.create_container("main");
    (Renderer::new(memory), root)
}

/// Markup of `root`, without the container tag itself.
pub fn markup(renderer: &Renderer<MemoryHost>, root: NodeId) -> String {
    let html = renderer.host().render(root);
    html.strip_prefix("<main>")
        .and_then(|rest| rest.strip_suffix("</main>"))
        .unwrap_or(&html)
        .to_owned()
}

/// Every component instance under `manager`, in tree order.
pub fn instances(manager: &Manager) -> Vec<Instance> {
    let mut found = Vec::new();
    collect(manager, &mut found);
    found
}

fn collect(manager: &Manager, found: &mut Vec<Instance>) {
    match manager {
        Manager::Primitive(primitive) => {
            for child in primitive.children() {
                collect(child, found);
            }
        }
        Manager::List(list) => {
            for child in list.managers() {
                collect(child, found);
            }
        }
        Manager::Composite(composite) => {
            found.push(composite.instance().clone());
            if let Some(child) = composite.child() {
                collect(child, found);
            }
        }
        Manager::Async(manager) => {
            found.push(manager.instance().clone());
            if let Some(child) = manager.child() {
                collect(child, found);
            }
        }
        Manager::Text(_) => {}
    }
}

/// Instances mounted in `root`.
pub fn root_instances(renderer: &Renderer<MemoryHost>, root: NodeId) -> Vec<Instance> {
    renderer.root(root).map(instances).unwrap_or_default()
}

/// Renders `<li>{label}:{count}</li>`; `count` starts at the `start` prop.
pub struct Counter {
    pub count: i64,
    pub handle: Handle<Self>,
}

impl Lifecycle for Counter {}

impl Component for Counter {
    fn create(props: &Props, handle: Handle<Self>) -> Self {
        Self {
            count: props.get_int("start").unwrap_or_default(),
            handle,
        }
    }

    fn render(&self, props: &Props) -> Element {
        let label = props.get_str("label").unwrap_or_default();
        host("li").child(format!("{label}:{}", self.count)).into()
    }
}

impl Counter {
    /// Sets the count of the counter behind `instance` through its handle.
    pub fn set(instance: &Instance, count: i64) {
        let handle = instance
            .read(|counter: &Self| counter.handle.clone())
            .expect("instance is a Counter");
        handle.update(|counter| counter.count = count).expect("counter is alive");
    }

    /// Reads the count of the counter behind `instance`.
    pub fn get(instance: &Instance) -> i64 {
        instance.read(|counter: &Self| counter.count).expect("instance is a Counter")
    }
}

/// Logs every lifecycle hook as `"{name} {hook}"`. Renders its `tag` prop (default `span`), or a
/// nested `Probe` named `"{name}.inner"` when `nest` is set.
pub struct Probe {
    name: String,
    handle: Handle<Self>,
}

impl Lifecycle for Probe {
    fn will_mount(&mut self) {
        log(format!("{} will_mount", self.name));
    }

    fn did_mount(&mut self) {
        log(format!("{} did_mount", self.name));
    }

    fn will_update(&mut self, _next: &Props) {
        log(format!("{} will_update", self.name));
    }

    fn did_update(&mut self, _previous: &Props) {
        log(format!("{} did_update", self.name));
    }

    fn will_unmount(&mut self) {
        log(format!("{} will_unmount", self.name));
    }

    fn did_unmount(&mut self) {
        log(format!("{} did_unmount", self.name));
    }
}

impl Component for Probe {
    fn create(props: &Props, handle: Handle<Self>) -> Self {
        Self {
            name: props.get_str("name").unwrap_or("probe").to_owned(),
            handle,
        }
    }

    fn render(&self, props: &Props) -> Element {
        log(format!("{} render", self.name));
        if props.get_bool("nest").unwrap_or_default() {
            eddy::component::<Self>()
                .prop("name", format!("{}.inner", self.name))
                .into()
        } else {
            host(props.get_str("tag").unwrap_or("span")).into()
        }
    }
}

impl Probe {
    /// The probe's own handle.
    pub fn handle(&self) -> Handle<Self> {
        self.handle.clone()
    }

    /// Schedules the probe behind `instance` without changing anything.
    pub fn touch(instance: &Instance) -> Option<()> {
        instance.read(Self::handle)?.update(|_| ())
    }
}

/// Async component rendering `<p>{label}{suffix}</p>`. Logs its hooks like [`Probe`].
///
/// With a `delay` prop (milliseconds) the render waits on a timer first. With
/// `placeholder` set it shows `<i>loading</i>` instead of the default placeholder.
pub struct Loader {
    pub suffix: String,
    pub handle: Handle<Self>,
    placeholder: bool,
}

impl Lifecycle for Loader {
    fn will_mount(&mut self) {
        log("loader will_mount");
    }

    fn did_mount(&mut self) {
        log("loader did_mount");
    }

    fn will_update(&mut self, _next: &Props) {
        log("loader will_update");
    }

    fn did_update(&mut self, _previous: &Props) {
        log("loader did_update");
    }

    fn will_unmount(&mut self) {
        log("loader will_unmount");
    }

    fn did_unmount(&mut self) {
        log("loader did_unmount");
    }
}

impl AsyncComponent for Loader {
    fn create(props: &Props, handle: Handle<Self>) -> Self {
        Self {
            suffix: String::new(),
            handle,
            placeholder: props.get_bool("placeholder").unwrap_or_default(),
        }
    }

    fn placeholder(&self) -> Option<Element> {
        self.placeholder.then(|| host("i").child("loading").into())
    }

    fn render(&self, props: &Props) -> LocalBoxFuture<'static, Element> {
        let text = format!("{}{}", props.get_str("label").unwrap_or_default(), self.suffix);
        let delay = props.get_int("delay").and_then(|ms| u64::try_from(ms).ok());
        async move {
            if let Some(ms) = delay {
                smol::Timer::after(Duration::from_millis(ms)).await;
            }
            host("p").child(text).into()
        }
        .boxed_local()
    }

    fn did_placehold(&mut self) {
        log("loader did_placehold");
    }
}

impl Loader {
    /// Changes the suffix of the loader behind `instance` through its handle.
    pub fn set_suffix(instance: &Instance, suffix: &str) {
        let handle = instance
            .read(|loader: &Self| loader.handle.clone())
            .expect("instance is a Loader");
        handle
            .update(|loader| loader.suffix = suffix.to_owned())
            .expect("loader is alive");
    }
}
