//! Component lifecycle hooks and batched updates.

mod common;

use common::{Counter, Probe, markup, root_instances, setup, take_log};
use eddy::{Diagnostic, PublicInstance, ReconcileError, component, host};

fn probe(name: &str) -> eddy::ComponentElement {
    component::<Probe>().prop("name", name)
}

#[test]
fn nested_components_mount_inside_out() {
    let (mut renderer, root) = setup();
    let instance = renderer
        .mount(probe("outer").prop("nest", true), root)
        .expect("mount");

    assert!(matches!(instance, PublicInstance::Component(_)));
    assert_eq!(markup(&renderer, root), "<span></span>");
    assert_eq!(
        take_log(),
        [
            "outer will_mount",
            "outer render",
            "outer.inner will_mount",
            "outer.inner render",
            "outer.inner did_mount",
            "outer did_mount",
        ]
    );
}

#[test]
fn receive_updates_the_parent_before_diffing_the_child() {
    let (mut renderer, root) = setup();
    renderer
        .mount(probe("outer").prop("nest", true), root)
        .expect("mount");
    take_log();

    renderer
        .mount(probe("outer").prop("nest", true), root)
        .expect("update");
    assert_eq!(
        take_log(),
        [
            "outer will_update",
            "outer render",
            "outer did_update",
            "outer.inner will_update",
            "outer.inner render",
            "outer.inner did_update",
        ]
    );
}

#[test]
fn unmount_runs_hooks_outside_in() {
    let (mut renderer, root) = setup();
    renderer
        .mount(probe("outer").prop("nest", true), root)
        .expect("mount");
    take_log();

    renderer.unmount(root).expect("unmount");
    assert_eq!(
        take_log(),
        [
            "outer will_unmount",
            "outer.inner will_unmount",
            "outer.inner did_unmount",
            "outer did_unmount",
        ]
    );
    assert_eq!(markup(&renderer, root), "");
}

#[test]
fn type_change_unmounts_the_old_component_first() {
    let (mut renderer, root) = setup();
    renderer.mount(probe("old"), root).expect("mount");
    take_log();

    renderer.mount(host("p").child("new"), root).expect("replace");
    assert_eq!(take_log(), ["old will_unmount", "old did_unmount"]);
    assert_eq!(markup(&renderer, root), "<p>new</p>");
}

#[test]
fn failed_replacement_leaves_an_anchor_after_the_old_hooks() {
    let (mut renderer, root) = setup();
    let page = |outer: eddy::ComponentElement| host("div").child(outer).child(host("b"));
    renderer
        .mount(page(probe("outer").prop("nest", true)), root)
        .expect("mount");
    assert_eq!(markup(&renderer, root), "<div><span></span><b></b></div>");
    take_log();

    renderer
        .mount(page(probe("outer").prop("tag", "")), root)
        .expect("siblings still update");

    assert_eq!(markup(&renderer, root), "<div><empty></empty><b></b></div>");
    let div = renderer.host().children(root)[0];
    assert_eq!(renderer.host().children(div).len(), 2, "no dangling nodes");
    assert!(matches!(
        renderer.take_diagnostics().as_slice(),
        [Diagnostic::SubtreeFailed(ReconcileError::InvalidElementKind { .. })]
    ));
    assert_eq!(
        take_log(),
        [
            "outer will_update",
            "outer render",
            "outer did_update",
            "outer.inner will_unmount",
            "outer.inner did_unmount",
        ]
    );
    assert_eq!(root_instances(&renderer, root).len(), 1, "only the outer probe is left");
}

#[test]
fn repeated_updates_render_once_per_flush() {
    let (mut renderer, root) = setup();
    renderer.mount(probe("solo"), root).expect("mount");
    let instance = root_instances(&renderer, root).remove(0);
    take_log();

    Probe::touch(&instance).expect("alive");
    Probe::touch(&instance).expect("alive");
    assert_eq!(renderer.pending_updates(), 1, "updates coalesce");

    assert_eq!(renderer.flush(), 1);
    assert_eq!(
        take_log(),
        ["solo will_update", "solo render", "solo did_update"]
    );
    assert_eq!(renderer.flush(), 0, "nothing left to do");
}

#[test]
fn flush_renders_in_scheduling_order() {
    let (mut renderer, root) = setup();
    renderer
        .mount(host("div").child(probe("first")).child(probe("second")), root)
        .expect("mount");
    let instances = root_instances(&renderer, root);
    take_log();

    Probe::touch(&instances[1]).expect("alive");
    Probe::touch(&instances[0]).expect("alive");
    renderer.flush();

    let renders: Vec<_> = take_log()
        .into_iter()
        .filter(|entry| entry.ends_with("render"))
        .collect();
    assert_eq!(renders, ["second render", "first render"]);
}

#[test]
fn state_change_rerenders_only_the_component_subtree() {
    let (mut renderer, root) = setup();
    renderer
        .mount(
            host("ul")
                .child(component::<Counter>().prop("label", "x"))
                .child(host("li").child("static")),
            root,
        )
        .expect("mount");
    let counter = root_instances(&renderer, root).remove(0);
    renderer.host_mut().clear_mutations();

    Counter::set(&counter, 3);
    renderer.flush();

    assert_eq!(markup(&renderer, root), "<ul><li>x:3</li><li>static</li></ul>");
    assert_eq!(
        renderer.host().mutations().len(),
        2,
        "one new text leaf and one replacement: {:?}",
        renderer.host().mutations()
    );
}

#[test]
fn updates_to_unmounted_components_are_ignored() {
    let (mut renderer, root) = setup();
    renderer.mount(probe("gone"), root).expect("mount");
    let instance = root_instances(&renderer, root).remove(0);
    let handle = instance
        .read(|probe: &Probe| probe.handle())
        .expect("instance is a Probe");
    drop(instance);

    renderer.unmount(root).expect("unmount");
    assert!(!handle.is_alive());
    assert_eq!(handle.update(|_| ()), None);
    assert_eq!(renderer.flush(), 0);
}

#[test]
fn run_until_stalled_drains_cascading_updates() {
    let (mut renderer, root) = setup();
    renderer.mount(probe("a"), root).expect("mount");
    let instance = root_instances(&renderer, root).remove(0);

    Probe::touch(&instance).expect("alive");
    assert_eq!(renderer.run_until_stalled(), 1);
    assert_eq!(renderer.pending_updates(), 0);
}
