//! Tree observer manager.
//!
//! Keeps exactly one batched child-list subscription per live,
//! independently-rooted region, and tracks not-yet-loaded import targets.
//!
//! Invariants:
//! - `observed` maps a region root to its one subscription; installing is a
//!   no-op when the root already carries one.
//! - Observe/unobserve are always paired: a root absorbed into another
//!   observed region loses its subscription, a root that becomes
//!   independent again gets a fresh one.
//! - At most one pending-load entry per resolved import URL, however many
//!   link elements name it.

use std::collections::{BTreeSet, HashMap};

use dom::{ImportState, NodeId, ObserveOptions, ObserverId, Tree};

use crate::reactions::Pass;
use crate::registry::Registry;

/// A subscription retained for `flush`. Only recorded when flushing is
/// enabled; the list is append-only and never pruned, which is the leak the
/// opt-in switch exists for.
#[derive(Clone, Copy, Debug)]
pub(crate) enum FlushEntry {
    Region { root: NodeId, observer: ObserverId },
    Attributes { element: NodeId, observer: ObserverId },
}

#[derive(Debug, Default)]
pub(crate) struct RegionObservers {
    pub observed: HashMap<NodeId, ObserverId>,
    pub pending_imports: BTreeSet<String>,
}

impl Registry {
    pub(crate) fn observe_root(&mut self, tree: &mut Tree, root: NodeId) {
        if self.regions.observed.contains_key(&root) {
            return;
        }
        let observer = tree.observe(root, ObserveOptions::child_list_subtree());
        log::debug!(target: "custom_elements.observe", "observe region {root:?}");
        self.regions.observed.insert(root, observer);
        if self.config.enable_flush {
            self.flush_log.push(FlushEntry::Region { root, observer });
        }
    }

    pub(crate) fn unobserve_root(&mut self, tree: &mut Tree, root: NodeId) {
        if let Some(observer) = self.regions.observed.remove(&root) {
            log::debug!(target: "custom_elements.observe", "unobserve region {root:?}");
            tree.disconnect(observer);
        }
    }

    /// Register interest in a not-yet-loaded import. Set membership is the
    /// listener: one entry per resolved URL.
    pub(crate) fn watch_import(&mut self, key: String) {
        if self.regions.pending_imports.insert(key.clone()) {
            log::debug!(target: "custom_elements.imports", "waiting on {key}");
        }
    }

    /// Deliver completed loads: each now-loaded pending import becomes an
    /// observed region and is walked.
    pub(crate) fn settle_imports(&mut self, tree: &mut Tree, pass: &mut Pass) {
        let ready: Vec<(String, NodeId)> = self
            .regions
            .pending_imports
            .iter()
            .filter_map(|key| match tree.import_state(key) {
                ImportState::Loaded(doc) => Some((key.clone(), doc)),
                ImportState::Pending => None,
            })
            .collect();
        for (key, doc) in ready {
            self.regions.pending_imports.remove(&key);
            log::debug!(target: "custom_elements.imports", "import ready {key} -> {doc:?}");
            self.observe_root(tree, doc);
            let attached = tree.is_in_live_tree(doc);
            self.upgrade_walk(tree, doc, attached, pass);
        }
    }
}
