//! Arena document tree with observable mutations.
//!
//! The arena owns the main document, any number of independently rooted
//! documents (import targets), and detached subtrees. Structural misuse
//! (inserting under a leaf, creating a cycle) is a programming error and
//! asserts; there is no error path for it.
//!
//! Invariants:
//! - Node ids are allocated once and never reused.
//! - A node has at most one parent; re-inserting a parented node detaches it
//!   first, and both steps queue their own mutation record.
//! - Element and attribute names are canonical ASCII-lowercase.
//! - Shadow roots have no parent; upward reachability crosses the host
//!   backlink only in `is_in_live_tree`, never in observer routing.

use url::Url;

use crate::imports::{ImportState, ImportTable};
use crate::observe::{MutationRecord, ObserveOptions, ObserverId, Observers};
use crate::types::{NodeData, NodeId, NodeKind};

#[derive(Debug)]
pub struct Tree {
    nodes: Vec<NodeData>,
    document: NodeId,
    observers: Observers,
    imports: ImportTable,
}

impl Default for Tree {
    fn default() -> Self {
        Self::new()
    }
}

impl Tree {
    pub fn new() -> Self {
        let mut tree = Self {
            nodes: Vec::new(),
            document: NodeId(0),
            observers: Observers::default(),
            imports: ImportTable::default(),
        };
        tree.document = tree.push(NodeData::new(NodeKind::Document));
        tree
    }

    /// The main (live) document root.
    pub fn document(&self) -> NodeId {
        self.document
    }

    /// A fresh, independently rooted document (import target).
    pub fn new_document(&mut self) -> NodeId {
        self.push(NodeData::new(NodeKind::Document))
    }

    pub fn create_element(&mut self, name: &str) -> NodeId {
        self.push(NodeData::new(NodeKind::Element {
            name: name.to_ascii_lowercase(),
            attributes: Vec::new(),
            shadow_root: None,
        }))
    }

    pub fn create_element_with(&mut self, name: &str, attributes: &[(&str, &str)]) -> NodeId {
        let element = self.create_element(name);
        let NodeKind::Element { attributes: attrs, .. } = &mut self.nodes[element.index()].kind
        else {
            unreachable!("create_element always yields an element");
        };
        for (name, value) in attributes {
            attrs.push((name.to_ascii_lowercase(), (*value).to_string()));
        }
        element
    }

    pub fn create_text(&mut self, text: &str) -> NodeId {
        self.push(NodeData::new(NodeKind::Text {
            text: text.to_string(),
        }))
    }

    pub fn create_comment(&mut self, text: &str) -> NodeId {
        self.push(NodeData::new(NodeKind::Comment {
            text: text.to_string(),
        }))
    }

    fn push(&mut self, data: NodeData) -> NodeId {
        let id = NodeId(self.nodes.len() as u32);
        self.nodes.push(data);
        id
    }

    // ---- structure ----

    pub fn append_child(&mut self, parent: NodeId, child: NodeId) {
        self.insert_child(parent, child, None);
    }

    pub fn insert_before(&mut self, parent: NodeId, child: NodeId, before: NodeId) {
        self.insert_child(parent, child, Some(before));
    }

    fn insert_child(&mut self, parent: NodeId, child: NodeId, before: Option<NodeId>) {
        assert!(
            self.nodes[parent.index()].is_container(),
            "cannot insert under a leaf node"
        );
        assert!(
            !matches!(
                self.nodes[child.index()].kind,
                NodeKind::Document | NodeKind::ShadowRoot { .. }
            ),
            "documents and shadow roots cannot be inserted"
        );
        assert!(
            !self.is_inclusive_ancestor(child, parent),
            "insertion would create a cycle"
        );
        if let Some(old_parent) = self.nodes[child.index()].parent {
            self.detach(old_parent, child);
        }
        let pos = match before {
            Some(reference) => self.nodes[parent.index()]
                .children
                .iter()
                .position(|&c| c == reference)
                .expect("reference node is not a child of parent"),
            None => self.nodes[parent.index()].children.len(),
        };
        self.nodes[parent.index()].children.insert(pos, child);
        self.nodes[child.index()].parent = Some(parent);
        self.queue_child_list(parent, vec![child], Vec::new());
    }

    /// Detach `node` from its parent. No-op when already detached.
    pub fn remove(&mut self, node: NodeId) {
        if let Some(parent) = self.nodes[node.index()].parent {
            self.detach(parent, node);
        }
    }

    fn detach(&mut self, parent: NodeId, child: NodeId) {
        let children = &mut self.nodes[parent.index()].children;
        let pos = children
            .iter()
            .position(|&c| c == child)
            .expect("parent/child links are consistent");
        children.remove(pos);
        self.nodes[child.index()].parent = None;
        self.queue_child_list(parent, Vec::new(), vec![child]);
    }

    pub fn attach_shadow(&mut self, host: NodeId) -> NodeId {
        let root = self.push(NodeData::new(NodeKind::ShadowRoot { host }));
        let NodeKind::Element { shadow_root, .. } = &mut self.nodes[host.index()].kind else {
            panic!("attach_shadow on a non-element node");
        };
        assert!(shadow_root.is_none(), "element already has a shadow root");
        *shadow_root = Some(root);
        root
    }

    // ---- attributes ----

    pub fn set_attribute(&mut self, element: NodeId, name: &str, value: &str) {
        let name = name.to_ascii_lowercase();
        let old;
        {
            let NodeKind::Element { attributes, .. } = &mut self.nodes[element.index()].kind
            else {
                panic!("set_attribute on a non-element node");
            };
            match attributes.iter_mut().find(|(k, _)| *k == name) {
                Some((_, v)) => {
                    old = Some(v.clone());
                    *v = value.to_string();
                }
                None => {
                    old = None;
                    attributes.push((name.clone(), value.to_string()));
                }
            }
        }
        self.queue_attribute(element, &name, old);
    }

    pub fn remove_attribute(&mut self, element: NodeId, name: &str) {
        let name = name.to_ascii_lowercase();
        let old;
        {
            let NodeKind::Element { attributes, .. } = &mut self.nodes[element.index()].kind
            else {
                panic!("remove_attribute on a non-element node");
            };
            match attributes.iter().position(|(k, _)| *k == name) {
                Some(pos) => old = Some(attributes.remove(pos).1),
                // Removing an absent attribute is not a mutation.
                None => return,
            }
        }
        self.queue_attribute(element, &name, old);
    }

    pub fn attribute(&self, element: NodeId, name: &str) -> Option<&str> {
        let NodeKind::Element { attributes, .. } = &self.nodes[element.index()].kind else {
            return None;
        };
        attributes
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    pub fn attributes(&self, element: NodeId) -> &[(String, String)] {
        match &self.nodes[element.index()].kind {
            NodeKind::Element { attributes, .. } => attributes,
            _ => &[],
        }
    }

    // ---- accessors ----

    pub fn kind(&self, node: NodeId) -> &NodeKind {
        &self.nodes[node.index()].kind
    }

    pub fn parent(&self, node: NodeId) -> Option<NodeId> {
        self.nodes[node.index()].parent
    }

    pub fn children(&self, node: NodeId) -> &[NodeId] {
        &self.nodes[node.index()].children
    }

    pub fn is_element(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.index()].kind, NodeKind::Element { .. })
    }

    pub fn is_document(&self, node: NodeId) -> bool {
        matches!(self.nodes[node.index()].kind, NodeKind::Document)
    }

    pub fn tag_name(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.index()].kind {
            NodeKind::Element { name, .. } => Some(name),
            _ => None,
        }
    }

    pub fn text(&self, node: NodeId) -> Option<&str> {
        match &self.nodes[node.index()].kind {
            NodeKind::Text { text, .. } | NodeKind::Comment { text, .. } => Some(text),
            _ => None,
        }
    }

    pub fn shadow_root(&self, element: NodeId) -> Option<NodeId> {
        match &self.nodes[element.index()].kind {
            NodeKind::Element { shadow_root, .. } => *shadow_root,
            _ => None,
        }
    }

    pub fn shadow_host(&self, node: NodeId) -> Option<NodeId> {
        match &self.nodes[node.index()].kind {
            NodeKind::ShadowRoot { host } => Some(*host),
            _ => None,
        }
    }

    /// Whether `node` is reachable from the main document, crossing
    /// shadow-root→host links on the way up.
    pub fn is_in_live_tree(&self, node: NodeId) -> bool {
        let mut cur = node;
        loop {
            if cur == self.document {
                return true;
            }
            let data = &self.nodes[cur.index()];
            cur = match data.parent {
                Some(parent) => parent,
                None => match data.kind {
                    NodeKind::ShadowRoot { host } => host,
                    _ => return false,
                },
            };
        }
    }

    fn is_inclusive_ancestor(&self, ancestor: NodeId, node: NodeId) -> bool {
        let mut cur = Some(node);
        while let Some(n) = cur {
            if n == ancestor {
                return true;
            }
            cur = self.nodes[n.index()].parent;
        }
        false
    }

    // ---- observation ----

    pub fn observe(&mut self, root: NodeId, options: ObserveOptions) -> ObserverId {
        assert!(
            self.nodes[root.index()].is_container(),
            "observation requires a container root"
        );
        self.observers.install(root, options)
    }

    pub fn disconnect(&mut self, id: ObserverId) {
        self.observers.disconnect(id);
    }

    pub fn is_observing(&self, id: ObserverId) -> bool {
        self.observers.is_active(id)
    }

    pub fn has_pending_records(&self, id: ObserverId) -> bool {
        self.observers.has_pending(id)
    }

    /// Drain the observer's mailbox. This is the batching boundary: records
    /// queued since the last drain become visible, in mutation order.
    pub fn take_records(&mut self, id: ObserverId) -> Vec<MutationRecord> {
        self.observers.take(id)
    }

    fn queue_child_list(&mut self, target: NodeId, added: Vec<NodeId>, removed: Vec<NodeId>) {
        let matched: Vec<ObserverId> = self
            .observers
            .active()
            .filter(|(_, o)| {
                o.options.child_list && self.region_contains(o.root, target, o.options.subtree)
            })
            .map(|(id, _)| id)
            .collect();
        if matched.is_empty() {
            return;
        }
        log::trace!(
            target: "dom.observe",
            "childList target={target:?} +{} -{} observers={}",
            added.len(),
            removed.len(),
            matched.len()
        );
        let record = MutationRecord::ChildList {
            target,
            added,
            removed,
        };
        for id in matched {
            self.observers.push(id, record.clone());
        }
    }

    fn queue_attribute(&mut self, target: NodeId, name: &str, old: Option<String>) {
        let matched: Vec<(ObserverId, bool)> = self
            .observers
            .active()
            .filter(|(_, o)| {
                o.options.attributes
                    && o.options.filter_matches(name)
                    && self.region_contains(o.root, target, o.options.subtree)
            })
            .map(|(id, o)| (id, o.options.attribute_old_value))
            .collect();
        if matched.is_empty() {
            return;
        }
        log::trace!(target: "dom.observe", "attribute target={target:?} name={name}");
        for (id, capture_old) in matched {
            self.observers.push(
                id,
                MutationRecord::Attribute {
                    target,
                    name: name.to_string(),
                    old_value: if capture_old { old.clone() } else { None },
                },
            );
        }
    }

    /// Containment within one observed region: parent links only, never a
    /// shadow-host link, never across a document boundary.
    fn region_contains(&self, root: NodeId, target: NodeId, subtree: bool) -> bool {
        if target == root {
            return true;
        }
        if !subtree {
            return false;
        }
        let mut cur = target;
        while let Some(parent) = self.nodes[cur.index()].parent {
            if parent == root {
                return true;
            }
            cur = parent;
        }
        false
    }

    // ---- imports ----

    pub fn set_base_url(&mut self, base: &str) -> Result<(), url::ParseError> {
        self.imports.set_base(Url::parse(base)?);
        Ok(())
    }

    /// Resolved identity of an import reference (`link rel=import`), or
    /// `None` for any other node.
    pub fn import_reference(&self, node: NodeId) -> Option<String> {
        let NodeKind::Element { name, attributes, .. } = &self.nodes[node.index()].kind else {
            return None;
        };
        if name != "link" {
            return None;
        }
        let rel = attributes.iter().find(|(k, _)| k == "rel").map(|(_, v)| v)?;
        if !rel
            .split_whitespace()
            .any(|t| t.eq_ignore_ascii_case("import"))
        {
            return None;
        }
        let href = attributes
            .iter()
            .find(|(k, _)| k == "href")
            .map(|(_, v)| v)?;
        Some(self.imports.resolve_key(href))
    }

    pub fn import_state(&self, key: &str) -> ImportState {
        self.imports.state(key)
    }

    /// Announce that the document for `href` finished loading.
    pub fn finish_import(&mut self, href: &str, doc: NodeId) {
        assert!(
            self.is_document(doc),
            "an import target must be a document root"
        );
        let key = self.imports.resolve_key(href);
        self.imports.finish(key, doc);
    }
}
