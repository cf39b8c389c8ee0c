//! Attribute reaction dispatcher.
//!
//! Per upgraded element with a non-empty observed-attribute set, one narrow
//! subscription filtered to exactly those names with old-value capture. The
//! subscription lives as long as the element; unlike region subscriptions it
//! is never torn down.

use dom::{MutationRecord, NodeId, ObserveOptions, ObserverId, Tree};

use crate::definition::{AttributeChange, Definition};
use crate::observers::FlushEntry;
use crate::reactions::Pass;
use crate::registry::Registry;

impl Registry {
    pub(crate) fn watch_attributes(&mut self, tree: &mut Tree, element: NodeId, def: &Definition) {
        if self.attribute_watch.contains_key(&element) {
            return;
        }
        let filter: Vec<String> = def.observed_attributes().iter().cloned().collect();
        let observer = tree.observe(element, ObserveOptions::attributes_filtered(filter));
        log::debug!(
            target: "custom_elements.attributes",
            "watch {element:?} <{}>",
            def.name()
        );
        self.attribute_watch.insert(element, observer);
        if self.config.enable_flush {
            self.flush_log.push(FlushEntry::Attributes { element, observer });
        }
    }

    pub(crate) fn drain_attributes(
        &mut self,
        tree: &mut Tree,
        element: NodeId,
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
        let Some(callback) = self
            .flags
            .definition(element)
            .and_then(|def| def.attribute_changed.clone())
        else {
            return;
        };
        for record in records {
            let MutationRecord::Attribute {
                target,
                name,
                old_value,
            } = record
            else {
                continue;
            };
            self.counters.records += 1;
            let new_value = tree.attribute(target, &name).map(str::to_string);
            // A record whose captured old value equals the current value is
            // not a change (same-value write, or a flip-flop that settled).
            if new_value == old_value {
                continue;
            }
            log::trace!(
                target: "custom_elements.attributes",
                "attribute {name} changed on {target:?}"
            );
            let change = AttributeChange {
                name,
                old_value,
                new_value,
                namespace: None,
            };
            let result = callback(tree, target, &change);
            self.react(pass, "attributeChangedCallback", result);
        }
    }
}
