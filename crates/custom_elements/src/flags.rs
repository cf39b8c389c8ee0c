//! Side-table flag store.
//!
//! Per-node state kept outside the tree, keyed by node identity. The table
//! never owns nodes and never extends their lifetime; `NodeId`s are never
//! reused, so an entry for a discarded node is inert rather than dangling.

use std::collections::HashMap;
use std::rc::Rc;

use dom::NodeId;

use crate::definition::Definition;

/// Behavior set currently associated with a node.
#[derive(Clone, Default)]
pub(crate) enum Behavior {
    #[default]
    Generic,
    Upgraded(Rc<Definition>),
}

#[derive(Default)]
struct NodeState {
    behavior: Behavior,
    connected: bool,
}

#[derive(Default)]
pub(crate) struct FlagStore {
    states: HashMap<NodeId, NodeState>,
}

impl FlagStore {
    pub fn definition(&self, node: NodeId) -> Option<&Rc<Definition>> {
        match self.states.get(&node)?.behavior {
            Behavior::Upgraded(ref def) => Some(def),
            Behavior::Generic => None,
        }
    }

    pub fn is_upgraded(&self, node: NodeId) -> bool {
        self.definition(node).is_some()
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.states.get(&node).is_some_and(|s| s.connected)
    }

    /// Reassign the node's behavior set. Happens exactly once per node, at
    /// the moment its reactions begin.
    pub fn upgrade(&mut self, node: NodeId, def: Rc<Definition>) {
        let state = self.states.entry(node).or_default();
        debug_assert!(
            matches!(state.behavior, Behavior::Generic),
            "a node is never upgraded twice"
        );
        state.behavior = Behavior::Upgraded(def);
    }

    pub fn set_connected(&mut self, node: NodeId, connected: bool) {
        self.states.entry(node).or_default().connected = connected;
    }
}
