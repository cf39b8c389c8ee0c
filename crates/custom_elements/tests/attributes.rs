//! Attribute reaction dispatcher: filtering, old-value capture, dedup.

mod common;

use common::{define, el, setup};
use custom_elements::{AttributeChange, ElementClass};
use dom::Tree;

use std::cell::RefCell;
use std::rc::Rc;

type ChangeLog = Rc<RefCell<Vec<(String, Option<String>, Option<String>)>>>;

fn observing_class(log: &ChangeLog, observed: &[&str]) -> ElementClass {
    let changes = log.clone();
    ElementClass::new(|_: &mut Tree, _| Ok(())).on_attribute_changed(
        observed,
        move |_: &mut Tree, _, change: &AttributeChange| {
            changes.borrow_mut().push((
                change.name.clone(),
                change.old_value.clone(),
                change.new_value.clone(),
            ));
            Ok(())
        },
    )
}

fn some(value: &str) -> Option<String> {
    Some(value.to_string())
}

#[test]
fn attributes_present_at_upgrade_synthesize_one_reaction_each() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    let x = el(&mut tree, "x-a", "x");
    tree.set_attribute(x, "p", "1");
    let doc = tree.document();
    tree.append_child(doc, x);

    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p", "q"]));
    assert_eq!(*log.borrow(), vec![("p".to_string(), None, some("1"))]);
}

#[test]
fn same_value_write_is_not_a_change() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p"]));
    let x = el(&mut tree, "x-a", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    tree.set_attribute(x, "p", "1");
    registry.flush(&mut tree).unwrap();
    log.borrow_mut().clear();

    tree.set_attribute(x, "p", "1");
    registry.flush(&mut tree).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn transitions_capture_old_and_new_values() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p"]));
    let x = el(&mut tree, "x-a", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    registry.flush(&mut tree).unwrap();

    tree.set_attribute(x, "p", "1");
    registry.flush(&mut tree).unwrap();
    tree.set_attribute(x, "p", "2");
    registry.flush(&mut tree).unwrap();
    tree.remove_attribute(x, "p");
    registry.flush(&mut tree).unwrap();

    assert_eq!(
        *log.borrow(),
        vec![
            ("p".to_string(), None, some("1")),
            ("p".to_string(), some("1"), some("2")),
            ("p".to_string(), some("2"), None),
        ]
    );
}

#[test]
fn unobserved_attributes_are_ignored() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p"]));
    let x = el(&mut tree, "x-a", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    registry.flush(&mut tree).unwrap();

    tree.set_attribute(x, "r", "1");
    registry.flush(&mut tree).unwrap();
    assert!(log.borrow().is_empty());
}

#[test]
fn a_flip_flop_within_one_batch_settles_to_one_reaction() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p"]));
    let x = el(&mut tree, "x-a", "x");
    tree.set_attribute(x, "p", "1");
    let doc = tree.document();
    tree.append_child(doc, x);
    registry.flush(&mut tree).unwrap();
    log.borrow_mut().clear();

    tree.set_attribute(x, "p", "2");
    tree.set_attribute(x, "p", "1");
    registry.flush(&mut tree).unwrap();
    // The first record's captured old value equals the settled value; only
    // the second record still reads as a change.
    assert_eq!(*log.borrow(), vec![("p".to_string(), some("2"), some("1"))]);
}

#[test]
fn the_attribute_subscription_survives_disconnection() {
    let (mut tree, mut registry) = setup();
    let log: ChangeLog = Rc::new(RefCell::new(Vec::new()));
    define(&mut tree, &mut registry, "x-a", observing_class(&log, &["p"]));
    let x = el(&mut tree, "x-a", "x");
    let doc = tree.document();
    tree.append_child(doc, x);
    registry.flush(&mut tree).unwrap();
    tree.remove(x);
    registry.flush(&mut tree).unwrap();
    log.borrow_mut().clear();

    // Detached, but still upgraded: attribute reactions keep firing.
    tree.set_attribute(x, "p", "5");
    registry.flush(&mut tree).unwrap();
    assert_eq!(*log.borrow(), vec![("p".to_string(), None, some("5"))]);
}
