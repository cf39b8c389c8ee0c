/// Arena handle for a node. Ids are assigned once and never reused for the
/// life of a `Tree`, so maps keyed by `NodeId` never alias a freed node.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(pub u32);

impl NodeId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug)]
pub enum NodeKind {
    /// The main document or an independently rooted (import) document.
    Document,
    Element {
        name: String,
        attributes: Vec<(String, String)>,
        shadow_root: Option<NodeId>,
    },
    /// Shadow-like sub-root. Has no parent; reachable upward only through
    /// the host backlink.
    ShadowRoot { host: NodeId },
    Text { text: String },
    Comment { text: String },
}

#[derive(Debug)]
pub(crate) struct NodeData {
    pub kind: NodeKind,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
}

impl NodeData {
    pub(crate) fn new(kind: NodeKind) -> Self {
        Self {
            kind,
            parent: None,
            children: Vec::new(),
        }
    }

    pub(crate) fn is_container(&self) -> bool {
        matches!(
            self.kind,
            NodeKind::Document | NodeKind::Element { .. } | NodeKind::ShadowRoot { .. }
        )
    }
}
