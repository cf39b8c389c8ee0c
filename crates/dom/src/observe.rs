//! Batched mutation observation.
//!
//! Each observer owns a mailbox of `MutationRecord`s. Mutations are queued at
//! the instant they happen but are visible to consumers only through
//! `Tree::take_records` — that drain is the batching boundary.
//!
//! Invariants:
//! - Records are queued in mutation order and drained in queue order.
//! - Routing never crosses a shadow-root/host link or a document boundary;
//!   an independently rooted region is invisible to observers outside it.
//! - A disconnected observer queues nothing and drains empty.
//! - A same-value attribute write still queues a record (its old value equals
//!   the current value); deduplication is the consumer's job.

use crate::types::NodeId;

/// Handle to an installed observer.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ObserverId(pub(crate) u32);

#[derive(Clone, Debug, Default)]
pub struct ObserveOptions {
    /// Report child additions/removals under the root.
    pub child_list: bool,
    /// Extend child-list/attribute reporting to the whole region below the
    /// root (still bounded by shadow/document boundaries).
    pub subtree: bool,
    /// Report attribute writes.
    pub attributes: bool,
    /// When non-empty, only these attribute names are reported.
    pub attribute_filter: Vec<String>,
    /// Capture the pre-write value in `Attribute::old_value`.
    pub attribute_old_value: bool,
}

impl ObserveOptions {
    /// Child-list + subtree, the shape used for region observation.
    pub fn child_list_subtree() -> Self {
        Self {
            child_list: true,
            subtree: true,
            ..Self::default()
        }
    }

    /// Filtered attribute observation with old-value capture, the shape used
    /// for per-element attribute watching.
    pub fn attributes_filtered(filter: Vec<String>) -> Self {
        Self {
            attributes: true,
            attribute_filter: filter,
            attribute_old_value: true,
            ..Self::default()
        }
    }

    pub(crate) fn filter_matches(&self, name: &str) -> bool {
        self.attribute_filter.is_empty() || self.attribute_filter.iter().any(|f| f == name)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum MutationRecord {
    ChildList {
        target: NodeId,
        added: Vec<NodeId>,
        removed: Vec<NodeId>,
    },
    Attribute {
        target: NodeId,
        name: String,
        /// Pre-write value; `None` when the attribute was absent or the
        /// observer did not request old values.
        old_value: Option<String>,
    },
}

#[derive(Debug)]
pub(crate) struct Observer {
    pub root: NodeId,
    pub options: ObserveOptions,
    pub queue: Vec<MutationRecord>,
    pub active: bool,
}

/// Observer slot table. Slots are never reused; `ObserverId` indexes into it.
#[derive(Debug, Default)]
pub(crate) struct Observers {
    slots: Vec<Observer>,
}

impl Observers {
    pub fn install(&mut self, root: NodeId, options: ObserveOptions) -> ObserverId {
        let id = ObserverId(self.slots.len() as u32);
        self.slots.push(Observer {
            root,
            options,
            queue: Vec::new(),
            active: true,
        });
        log::debug!(target: "dom.observe", "install {id:?} root={root:?}");
        id
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        let slot = &mut self.slots[id.0 as usize];
        slot.active = false;
        slot.queue.clear();
        log::debug!(target: "dom.observe", "disconnect {id:?}");
    }

    pub fn is_active(&self, id: ObserverId) -> bool {
        self.slots[id.0 as usize].active
    }

    pub fn has_pending(&self, id: ObserverId) -> bool {
        !self.slots[id.0 as usize].queue.is_empty()
    }

    pub fn take(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        std::mem::take(&mut self.slots[id.0 as usize].queue)
    }

    pub fn push(&mut self, id: ObserverId, record: MutationRecord) {
        self.slots[id.0 as usize].queue.push(record);
    }

    pub fn active(&self) -> impl Iterator<Item = (ObserverId, &Observer)> {
        self.slots
            .iter()
            .enumerate()
            .filter(|(_, o)| o.active)
            .map(|(i, o)| (ObserverId(i as u32), o))
    }
}
