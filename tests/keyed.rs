//! Keyed and unkeyed sequence reconciliation.

mod common;

use common::{Counter, markup, root_instances, setup};
use eddy::{Diagnostic, Element, Key, component, host};
use eddy_memory::Mutation;

fn counters(keys: &[&str]) -> Element {
    host("ul")
        .child(
            keys.iter()
                .map(|key| component::<Counter>().key(*key).prop("label", *key))
                .collect::<Element>(),
        )
        .into()
}

fn unkeyed(labels: &[&str]) -> Element {
    host("ul")
        .child(
            labels
                .iter()
                .map(|label| component::<Counter>().prop("label", *label))
                .collect::<Element>(),
        )
        .into()
}

#[test]
fn keyed_reorder_preserves_instances_and_state() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a", "b", "c"]), root).expect("mount");
    let before = root_instances(&renderer, root);
    Counter::set(&before[0], 5);
    assert_eq!(renderer.flush(), 1);
    assert_eq!(markup(&renderer, root), "<ul><li>a:5</li><li>b:0</li><li>c:0</li></ul>");

    renderer.mount(counters(&["c", "a", "b"]), root).expect("reorder");

    let after = root_instances(&renderer, root);
    assert!(after[1].ptr_eq(&before[0]), "`a` keeps its instance");
    assert!(after[2].ptr_eq(&before[1]), "`b` keeps its instance");
    assert!(after[0].ptr_eq(&before[2]), "`c` keeps its instance");
    assert_eq!(Counter::get(&after[1]), 5, "state survives the move");
    assert_eq!(markup(&renderer, root), "<ul><li>c:0</li><li>a:5</li><li>b:0</li></ul>");
    assert!(renderer.take_diagnostics().is_empty());
}

#[test]
fn keyed_reorder_moves_nodes_instead_of_recreating_them() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a", "b", "c"]), root).expect("mount");
    let ul = renderer.host().children(root)[0];
    let [a, b, c] = renderer.host().children(ul) else {
        panic!("three items");
    };
    let (a, b, c) = (*a, *b, *c);
    renderer.host_mut().clear_mutations();

    renderer.mount(counters(&["c", "a", "b"]), root).expect("reorder");

    assert_eq!(renderer.host().children(ul), [c, a, b]);
    assert_eq!(
        renderer.host_mut().take_mutations(),
        [Mutation::InsertBefore { reference: a, node: c }],
        "a single move brings `c` to the front"
    );
}

#[test]
fn unkeyed_reorder_remounts_and_resets_state() {
    let (mut renderer, root) = setup();
    renderer.mount(unkeyed(&["a", "b"]), root).expect("mount");
    let before = root_instances(&renderer, root);
    Counter::set(&before[0], 5);
    renderer.flush();

    renderer.mount(unkeyed(&["b", "a"]), root).expect("reorder");

    let after = root_instances(&renderer, root);
    assert_eq!(after.len(), 2);
    assert!(
        after.iter().all(|instance| !before.iter().any(|old| old.ptr_eq(instance))),
        "every item is a fresh instance"
    );
    assert_eq!(markup(&renderer, root), "<ul><li>b:0</li><li>a:0</li></ul>");
    assert!(
        renderer
            .diagnostics()
            .contains(&Diagnostic::MissingKey { unkeyed: 2, len: 2 })
    );
}

#[test]
fn missing_key_warning_can_be_turned_off() {
    let mut memory = eddy_memory::MemoryHost::new();
    let root = memory.create_container("main");
    let config = eddy::EngineConfig::builder().warn_missing_keys(false).build();
    let mut renderer = eddy::Renderer::with_config(memory, config);

    renderer.mount(unkeyed(&["a"]), root).expect("mount");
    assert!(renderer.diagnostics().is_empty());
}

#[test]
fn duplicate_keys_are_reported_and_mounted_fresh() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a", "a"]), root).expect("mount");

    assert_eq!(
        renderer.take_diagnostics(),
        [Diagnostic::DuplicateKey(Key::from("a"))]
    );
    assert_eq!(markup(&renderer, root), "<ul><li>a:0</li><li>a:0</li></ul>");
}

#[test]
fn removed_keys_unmount_and_new_keys_mount() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a", "b", "c"]), root).expect("mount");
    let before = root_instances(&renderer, root);
    let ul = renderer.host().children(root)[0];
    let b = renderer.host().children(ul)[1];

    renderer.mount(counters(&["b", "d"]), root).expect("update");

    let after = root_instances(&renderer, root);
    assert!(after[0].ptr_eq(&before[1]), "`b` survives");
    assert!(!before.iter().any(|old| old.ptr_eq(&after[1])), "`d` is new");
    assert_eq!(renderer.host().children(ul)[0], b);
    assert_eq!(markup(&renderer, root), "<ul><li>b:0</li><li>d:0</li></ul>");
}

#[test]
fn emptied_list_keeps_an_anchor_and_refills_after_it() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a"]), root).expect("mount");

    renderer.mount(counters(&[]), root).expect("empty");
    assert_eq!(markup(&renderer, root), "<ul><empty></empty></ul>");

    renderer.mount(counters(&["b"]), root).expect("refill");
    assert_eq!(markup(&renderer, root), "<ul><li>b:0</li></ul>");
}

#[test]
fn list_keeps_its_place_between_siblings() {
    let (mut renderer, root) = setup();
    let page = |keys: &[&str]| -> Element {
        host("div")
            .child(host("header"))
            .child(
                keys.iter()
                    .map(|key| host("p").key(*key).child(*key))
                    .collect::<Element>(),
            )
            .child(host("footer"))
            .into()
    };

    renderer.mount(page(&["x", "y"]), root).expect("mount");
    renderer.mount(page(&[]), root).expect("empty");
    renderer.mount(page(&["y", "z", "x"]), root).expect("refill");

    assert_eq!(
        markup(&renderer, root),
        "<div><header></header><p>y</p><p>z</p><p>x</p><footer></footer></div>"
    );
}

#[test]
fn same_key_with_a_different_type_is_remounted() {
    let (mut renderer, root) = setup();
    renderer.mount(counters(&["a"]), root).expect("mount");
    assert_eq!(root_instances(&renderer, root).len(), 1);

    let replaced: Element = host("ul")
        .child(Element::sequence([host("li").key("a").child("plain")]))
        .into();
    renderer.mount(replaced, root).expect("update");

    assert!(root_instances(&renderer, root).is_empty(), "the component is gone");
    assert_eq!(markup(&renderer, root), "<ul><li>plain</li></ul>");
}
