#![allow(dead_code)]

use std::cell::RefCell;
use std::rc::Rc;

use custom_elements::{DefineOptions, ElementClass, Registry, RegistryConfig};
use dom::{NodeId, Tree};

pub type Log = Rc<RefCell<Vec<String>>>;

pub fn new_log() -> Log {
    Rc::new(RefCell::new(Vec::new()))
}

pub fn setup() -> (Tree, Registry) {
    let mut tree = Tree::new();
    let registry = Registry::new(
        &mut tree,
        RegistryConfig { enable_flush: true },
    );
    (tree, registry)
}

pub fn define(tree: &mut Tree, registry: &mut Registry, name: &str, class: ElementClass) {
    registry
        .define(tree, name, Rc::new(class), DefineOptions::default())
        .expect("define");
}

pub fn el(tree: &mut Tree, name: &str, id: &str) -> NodeId {
    tree.create_element_with(name, &[("id", id)])
}

pub fn id_of(tree: &Tree, node: NodeId) -> String {
    tree.attribute(node, "id").unwrap_or("?").to_string()
}

/// Class whose every lifecycle reaction appends `"<event> <id>"` to the log.
pub fn logging_class(log: &Log) -> ElementClass {
    let on_construct = log.clone();
    let on_connect = log.clone();
    let on_disconnect = log.clone();
    ElementClass::new(move |tree: &mut Tree, node| {
        let id = id_of(tree, node);
        on_construct.borrow_mut().push(format!("constructed {id}"));
        Ok(())
    })
    .on_connected(move |tree, node| {
        let id = id_of(tree, node);
        on_connect.borrow_mut().push(format!("connected {id}"));
        Ok(())
    })
    .on_disconnected(move |tree, node| {
        let id = id_of(tree, node);
        on_disconnect.borrow_mut().push(format!("disconnected {id}"));
        Ok(())
    })
}

pub fn events_with(log: &Log, prefix: &str) -> Vec<String> {
    log.borrow()
        .iter()
        .filter(|line| line.starts_with(prefix))
        .cloned()
        .collect()
}
