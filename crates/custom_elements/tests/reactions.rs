//! Ordering, dedup, and error-isolation laws of the reaction dispatcher.

mod common;

use common::{define, el, events_with, logging_class, new_log, setup};
use custom_elements::{ElementClass, ReactionError};
use dom::Tree;

#[test]
fn connect_order_is_document_pre_order() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-p", logging_class(&log));

    // <x-p id=a><x-p id=b></x-p><x-p id=c><x-p id=d></x-p><x-p id=e></x-p></x-p></x-p>
    let a = el(&mut tree, "x-p", "a");
    let b = el(&mut tree, "x-p", "b");
    let c = el(&mut tree, "x-p", "c");
    let d = el(&mut tree, "x-p", "d");
    let e = el(&mut tree, "x-p", "e");
    tree.append_child(a, b);
    tree.append_child(a, c);
    tree.append_child(c, d);
    tree.append_child(c, e);
    let doc = tree.document();
    tree.append_child(doc, a);

    registry.flush(&mut tree).unwrap();
    // Per element the constructor runs before connection, and elements react
    // in pre-order.
    assert_eq!(
        *log.borrow(),
        vec![
            "constructed a",
            "connected a",
            "constructed b",
            "connected b",
            "constructed c",
            "connected c",
            "constructed d",
            "connected d",
            "constructed e",
            "connected e",
        ]
    );
}

#[test]
fn disconnect_order_mirrors_connect_order() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-p", logging_class(&log));

    let a = el(&mut tree, "x-p", "a");
    let b = el(&mut tree, "x-p", "b");
    let c = el(&mut tree, "x-p", "c");
    let d = el(&mut tree, "x-p", "d");
    let e = el(&mut tree, "x-p", "e");
    tree.append_child(a, b);
    tree.append_child(a, c);
    tree.append_child(c, d);
    tree.append_child(c, e);
    let doc = tree.document();
    tree.append_child(doc, a);
    registry.flush(&mut tree).unwrap();
    log.borrow_mut().clear();

    tree.remove(a);
    registry.flush(&mut tree).unwrap();
    assert_eq!(
        events_with(&log, "disconnected"),
        vec![
            "disconnected a",
            "disconnected b",
            "disconnected c",
            "disconnected d",
            "disconnected e",
        ]
    );
}

#[test]
fn same_turn_append_then_remove_fires_both_callbacks() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-p", logging_class(&log));

    let x = el(&mut tree, "x-p", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    tree.remove(x);
    registry.flush(&mut tree).unwrap();

    assert_eq!(
        *log.borrow(),
        vec!["constructed x", "connected x", "disconnected x"]
    );
}

#[test]
fn overlapping_walks_upgrade_once() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-p", logging_class(&log));

    // Two records in one batch: the child is reachable from both.
    let doc = tree.document();
    let parent = el(&mut tree, "x-p", "parent");
    tree.append_child(doc, parent);
    let child = el(&mut tree, "x-p", "child");
    tree.append_child(parent, child);
    registry.flush(&mut tree).unwrap();

    assert_eq!(events_with(&log, "constructed child").len(), 1);
    assert_eq!(registry.counters().upgrades, 2);
}

#[test]
fn construction_inserted_children_upgrade_in_the_same_pass() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-item", logging_class(&log));

    let kid_log = log.clone();
    let host_class = ElementClass::new(move |tree: &mut Tree, node| {
        kid_log
            .borrow_mut()
            .push(format!("constructed {}", common::id_of(tree, node)));
        let kid = tree.create_element_with("x-item", &[("id", "kid")]);
        tree.append_child(node, kid);
        Ok(())
    });
    define(&mut tree, &mut registry, "x-host", host_class);

    let host = el(&mut tree, "x-host", "host");
    let doc = tree.document();
    tree.append_child(doc, host);
    registry.flush(&mut tree).unwrap();
    assert_eq!(
        *log.borrow(),
        vec!["constructed host", "constructed kid", "connected kid"]
    );

    // The kid's own addition record delivers next flush and is a no-op.
    registry.flush(&mut tree).unwrap();
    assert_eq!(log.borrow().len(), 3);
}

#[test]
fn a_failing_reaction_does_not_abort_its_siblings() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    define(&mut tree, &mut registry, "x-ok", logging_class(&log));
    let failing = ElementClass::new(|_: &mut Tree, node| {
        Err(ReactionError::new(node, "constructor exploded"))
    });
    define(&mut tree, &mut registry, "x-bad", failing);

    let doc = tree.document();
    let wrap = tree.create_element("div");
    let bad1 = el(&mut tree, "x-bad", "f1");
    let ok = el(&mut tree, "x-ok", "o1");
    let bad2 = el(&mut tree, "x-bad", "f2");
    tree.append_child(wrap, bad1);
    tree.append_child(wrap, ok);
    tree.append_child(wrap, bad2);
    tree.append_child(doc, wrap);

    let err = registry.flush(&mut tree).unwrap_err();
    assert_eq!(err.element, bad1);
    assert_eq!(err.message, "constructor exploded");
    // Siblings reacted, and every failing element still upgraded.
    assert_eq!(
        *log.borrow(),
        vec!["constructed o1", "connected o1"]
    );
    assert!(registry.is_upgraded(bad1));
    assert!(registry.is_upgraded(bad2));
    assert_eq!(registry.counters().reaction_errors, 2);
}

#[test]
fn a_failing_connected_callback_keeps_flags_consistent() {
    let (mut tree, mut registry) = setup();
    let log = new_log();
    let on_disconnect = log.clone();
    let class = ElementClass::new(|_: &mut Tree, _| Ok(()))
        .on_connected(|_: &mut Tree, node| Err(ReactionError::new(node, "connect exploded")))
        .on_disconnected(move |tree: &mut Tree, node| {
            on_disconnect
                .borrow_mut()
                .push(format!("disconnected {}", common::id_of(tree, node)));
            Ok(())
        });
    define(&mut tree, &mut registry, "x-p", class);

    let x = el(&mut tree, "x-p", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    assert!(registry.flush(&mut tree).is_err());
    assert!(registry.is_connected(x));

    tree.remove(x);
    registry.flush(&mut tree).unwrap();
    assert!(!registry.is_connected(x));
    assert_eq!(*log.borrow(), vec!["disconnected x"]);
}
