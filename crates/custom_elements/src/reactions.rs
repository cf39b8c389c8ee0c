//! Upgrade/reaction dispatcher.
//!
//! Turns delivered child-list batches into upgrades and lifecycle reactions.
//!
//! Invariants:
//! - Records of one batch are processed in the order the host reported
//!   them; within one record, additions run before removals. Relative
//!   ordering between the added set and the removed set of one batch is
//!   unspecified.
//! - Each added root is walked in document pre-order, so ancestors react
//!   before descendants and siblings react left to right.
//! - The per-pass visited set guards upgrade walks only; removal walks are
//!   guarded by flag polarity instead.
//! - Attachment is judged once per batch for the subscription root and
//!   inherited down the walk; an import document contributes its own (never
//!   attached) polarity.
//! - The first reaction error of a pass is latched and re-raised after the
//!   pass completes; the remaining reactions still run.

use std::collections::HashSet;
use std::rc::Rc;

use dom::{ImportState, MutationRecord, NodeId, ObserverId, Tree};

use crate::definition::{AttributeChange, Definition};
use crate::error::ReactionError;
use crate::registry::Registry;

/// State for one dispatch pass: a flush sweep, a define-time re-walk, or an
/// import-ready walk.
pub(crate) struct Pass {
    pub visited: HashSet<NodeId>,
    first_error: Option<ReactionError>,
}

impl Pass {
    pub fn new() -> Self {
        Self {
            visited: HashSet::new(),
            first_error: None,
        }
    }

    pub fn latch(&mut self, what: &str, err: ReactionError) {
        log::warn!(
            target: "custom_elements.reactions",
            "reaction error in {what} for {:?}: {}",
            err.element,
            err.message
        );
        if self.first_error.is_none() {
            self.first_error = Some(err);
        }
    }

    pub fn finish(self) -> Result<(), ReactionError> {
        match self.first_error {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl Registry {
    /// Drain one region subscription and process its batch.
    pub(crate) fn drain_region(
        &mut self,
        tree: &mut Tree,
        root: NodeId,
        observer: ObserverId,
        pass: &mut Pass,
    ) {
        if !tree.is_observing(observer) {
            return;
        }
        let records = tree.take_records(observer);
        if records.is_empty() {
            return;
        }
        self.counters.batches += 1;
        // Attachment of the subscription root at drain time, not of each
        // node in real time: an element appended and removed in the same
        // batch still connects, then disconnects.
        let attached = tree.is_in_live_tree(root);
        log::trace!(
            target: "custom_elements.reactions",
            "drain region {root:?}: {} records, attached={attached}",
            records.len()
        );
        for record in records {
            let MutationRecord::ChildList { added, removed, .. } = record else {
                continue;
            };
            self.counters.records += 1;
            for node in added {
                if tree.is_element(node) {
                    self.process_added_root(tree, node, attached, pass);
                }
            }
            for node in removed {
                if tree.is_element(node) {
                    self.process_removed_root(tree, node, pass);
                }
            }
        }
    }

    fn process_added_root(
        &mut self,
        tree: &mut Tree,
        root: NodeId,
        attached: bool,
        pass: &mut Pass,
    ) {
        // The root's mutations are visible through the enclosing region's
        // subscription now; its own would duplicate them.
        self.unobserve_root(tree, root);
        self.upgrade_walk(tree, root, attached, pass);
    }

    /// Pre-order upgrade walk. Recurses into shadow sub-roots (inheriting
    /// attachment) and loaded import documents (never attached); unloaded
    /// imports register a pending-load entry instead.
    pub(crate) fn upgrade_walk(
        &mut self,
        tree: &mut Tree,
        start: NodeId,
        attached: bool,
        pass: &mut Pass,
    ) {
        let mut stack: Vec<(NodeId, bool)> = vec![(start, attached)];
        while let Some((node, attached)) = stack.pop() {
            if !pass.visited.insert(node) {
                continue;
            }
            if tree.is_element(node) {
                self.visit_element(tree, node, attached, pass);
            }
            // Children are read after the node's reactions ran, so nodes a
            // construction reaction inserts below are walked in this pass.
            let mut frame: Vec<(NodeId, bool)> = Vec::new();
            if let Some(shadow) = tree.shadow_root(node) {
                // A shadow sub-root is its own observed region; mutations
                // under it never reach the enclosing subscription.
                self.observe_root(tree, shadow);
                frame.push((shadow, attached));
            }
            if let Some(key) = tree.import_reference(node) {
                match tree.import_state(&key) {
                    ImportState::Loaded(doc) => {
                        self.observe_root(tree, doc);
                        frame.push((doc, false));
                    }
                    ImportState::Pending => self.watch_import(key),
                }
            }
            for &child in tree.children(node) {
                frame.push((child, attached));
            }
            for entry in frame.into_iter().rev() {
                stack.push(entry);
            }
        }
    }

    fn visit_element(&mut self, tree: &mut Tree, element: NodeId, attached: bool, pass: &mut Pass) {
        let def = match self.flags.definition(element) {
            Some(def) => def.clone(),
            None => match self.match_definition(tree, element) {
                Some(def) => def,
                None => return,
            },
        };
        if !self.flags.is_upgraded(element) {
            self.upgrade_element(tree, element, &def, pass);
        }
        if attached && !self.flags.is_connected(element) {
            self.flags.set_connected(element, true);
            if let Some(callback) = def.connected.clone() {
                log::trace!(
                    target: "custom_elements.reactions",
                    "connected <{}> {element:?}",
                    def.name()
                );
                let result = callback(tree, element);
                self.react(pass, "connectedCallback", result);
            }
        }
    }

    fn upgrade_element(
        &mut self,
        tree: &mut Tree,
        element: NodeId,
        def: &Rc<Definition>,
        pass: &mut Pass,
    ) {
        log::trace!(
            target: "custom_elements.reactions",
            "upgrade <{}> {element:?}",
            def.name()
        );
        self.flags.upgrade(element, def.clone());
        self.counters.upgrades += 1;
        let construct = def.construct.clone();
        let result = construct(tree, element);
        self.react(pass, "constructor", result);
        if def.observes_attributes() {
            self.watch_attributes(tree, element, def);
        }
        if let Some(callback) = def.attribute_changed.clone() {
            // One synthesized reaction per observed attribute already
            // present on the element.
            for name in def.observed_attributes() {
                let Some(value) = tree.attribute(element, name).map(str::to_string) else {
                    continue;
                };
                let change = AttributeChange {
                    name: name.clone(),
                    old_value: None,
                    new_value: Some(value),
                    namespace: None,
                };
                let result = callback(tree, element, &change);
                self.react(pass, "attributeChangedCallback", result);
            }
        }
    }

    fn process_removed_root(&mut self, tree: &mut Tree, root: NodeId, pass: &mut Pass) {
        // The removed root is an independent region from here on.
        self.observe_root(tree, root);
        let mut stack: Vec<NodeId> = vec![root];
        while let Some(node) = stack.pop() {
            if tree.is_element(node) {
                self.disconnect_element(tree, node, pass);
            }
            let mut frame: Vec<NodeId> = Vec::new();
            if let Some(shadow) = tree.shadow_root(node) {
                frame.push(shadow);
            }
            frame.extend_from_slice(tree.children(node));
            for entry in frame.into_iter().rev() {
                stack.push(entry);
            }
        }
    }

    fn disconnect_element(&mut self, tree: &mut Tree, element: NodeId, pass: &mut Pass) {
        let Some(def) = self.flags.definition(element).cloned() else {
            return;
        };
        if !self.flags.is_connected(element) {
            return;
        }
        self.flags.set_connected(element, false);
        if let Some(callback) = def.disconnected.clone() {
            log::trace!(
                target: "custom_elements.reactions",
                "disconnected <{}> {element:?}",
                def.name()
            );
            let result = callback(tree, element);
            self.react(pass, "disconnectedCallback", result);
        }
    }

    /// Account for one reaction invocation; failures are latched, never
    /// propagated mid-pass.
    pub(crate) fn react(
        &mut self,
        pass: &mut Pass,
        what: &'static str,
        result: Result<(), ReactionError>,
    ) {
        self.counters.reactions += 1;
        if let Err(err) = result {
            self.counters.reaction_errors += 1;
            pass.latch(what, err);
        }
    }
}
