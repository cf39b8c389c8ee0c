//! Cross-document (import) references.
//!
//! A `link` element with `rel="import"` and an `href` names an external
//! document. The tree tracks which references have finished loading; hosts
//! announce completion with `Tree::finish_import`. There is no fetching here,
//! only identity: references are keyed by resolved URL so that any number of
//! link elements naming the same target share one entry.

use std::collections::HashMap;

use url::Url;

use crate::types::NodeId;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImportState {
    /// The target document has not been supplied yet.
    Pending,
    /// The target document is available as an independently rooted document.
    Loaded(NodeId),
}

#[derive(Debug, Default)]
pub(crate) struct ImportTable {
    base: Option<Url>,
    loaded: HashMap<String, NodeId>,
}

impl ImportTable {
    pub fn set_base(&mut self, base: Url) {
        self.base = Some(base);
    }

    /// Stable identity for a reference. Relative hrefs resolve against the
    /// document base; anything unparseable falls back to the raw text.
    pub fn resolve_key(&self, href: &str) -> String {
        let resolved = match &self.base {
            Some(base) => base.join(href).ok(),
            None => Url::parse(href).ok(),
        };
        match resolved {
            Some(url) => url.into(),
            None => href.to_string(),
        }
    }

    pub fn state(&self, key: &str) -> ImportState {
        match self.loaded.get(key) {
            Some(doc) => ImportState::Loaded(*doc),
            None => ImportState::Pending,
        }
    }

    pub fn finish(&mut self, key: String, doc: NodeId) {
        log::debug!(target: "dom.imports", "loaded {key} -> {doc:?}");
        self.loaded.insert(key, doc);
    }
}
