//! Registry façade.
//!
//! A single owned instance composes the definition table, the side-table
//! flag store, the observer manager, and the dispatchers. There are no
//! implicit globals; tests build isolated registries over isolated trees.

use std::collections::HashMap;
use std::rc::Rc;

use dom::{NodeId, ObserverId, Tree};

use crate::counters::Counters;
use crate::definition::{DefineOptions, Definition, ElementClass, Member};
use crate::error::{DefineError, ReactionError};
use crate::flags::FlagStore;
use crate::name::validate_name;
use crate::observers::{FlushEntry, RegionObservers};
use crate::reactions::Pass;
use crate::when_defined::{OneShot, WhenDefined};

#[derive(Clone, Debug, Default)]
pub struct RegistryConfig {
    /// Enables `flush`. Flushing retains a reference to every subscription
    /// ever created, so it is opt-in test support, off by default.
    pub enable_flush: bool,
}

pub struct Registry {
    pub(crate) config: RegistryConfig,
    pub(crate) definitions: HashMap<String, Rc<Definition>>,
    /// Constructor identity -> name it is bound to.
    by_constructor: HashMap<usize, String>,
    futures: HashMap<String, Rc<OneShot>>,
    pub(crate) flags: FlagStore,
    pub(crate) regions: RegionObservers,
    pub(crate) attribute_watch: HashMap<NodeId, ObserverId>,
    pub(crate) flush_log: Vec<FlushEntry>,
    pub(crate) counters: Counters,
}

impl Registry {
    /// Build a registry and start observing the tree's main document
    /// region. Lives for the life of the program; definitions are never
    /// removed.
    pub fn new(tree: &mut Tree, config: RegistryConfig) -> Self {
        let mut registry = Self {
            config,
            definitions: HashMap::new(),
            by_constructor: HashMap::new(),
            futures: HashMap::new(),
            flags: FlagStore::default(),
            regions: RegionObservers::default(),
            attribute_watch: HashMap::new(),
            flush_log: Vec::new(),
            counters: Counters::default(),
        };
        let document = tree.document();
        registry.observe_root(tree, document);
        registry
    }

    /// Register `name`. On success the whole document region is re-walked
    /// so pre-existing matching elements upgrade before this returns.
    pub fn define(
        &mut self,
        tree: &mut Tree,
        name: &str,
        class: Rc<ElementClass>,
        options: DefineOptions,
    ) -> Result<(), DefineError> {
        let construct = class
            .construct
            .clone()
            .ok_or(DefineError::ConstructorNotCallable)?;
        validate_name(name)?;
        if self.definitions.contains_key(name) {
            return Err(DefineError::DuplicateName(name.to_string()));
        }
        let constructor_key = Rc::as_ptr(&class) as usize;
        if let Some(existing) = self.by_constructor.get(&constructor_key) {
            return Err(DefineError::DuplicateConstructor {
                existing: existing.clone(),
            });
        }
        if class.prototype.is_none() {
            return Err(DefineError::PrototypeNotARecord);
        }
        let def = Rc::new(Definition::extract(name, class, construct, &options)?);
        self.definitions.insert(name.to_string(), def);
        self.by_constructor.insert(constructor_key, name.to_string());
        self.counters.definitions += 1;
        log::debug!(target: "custom_elements.registry", "define <{name}>");
        let mut pass = Pass::new();
        let document = tree.document();
        self.upgrade_walk(tree, document, true, &mut pass);
        if let Some(future) = self.futures.remove(name) {
            future.resolve();
        }
        pass.finish().map_err(DefineError::Reaction)
    }

    /// The constructor registered for `name`, if any. Pure lookup.
    pub fn get(&self, name: &str) -> Option<Rc<ElementClass>> {
        self.definitions.get(name).map(|def| def.class().clone())
    }

    /// One-shot future settled the first time `name` is defined. Malformed
    /// names reject synchronously instead of raising.
    pub fn when_defined(&mut self, name: &str) -> WhenDefined {
        if let Err(err) = validate_name(name) {
            return WhenDefined::rejected(err);
        }
        if self.definitions.contains_key(name) {
            return WhenDefined::resolved();
        }
        let cell = self
            .futures
            .entry(name.to_string())
            .or_insert_with(OneShot::pending)
            .clone();
        WhenDefined::pending(cell)
    }

    /// Deliver every still-live subscription's pending batch through the
    /// normal add/remove and attribute paths. No-op unless enabled in the
    /// config. Completed import loads are delivered first.
    pub fn flush(&mut self, tree: &mut Tree) -> Result<(), ReactionError> {
        if !self.config.enable_flush {
            return Ok(());
        }
        let mut pass = Pass::new();
        self.settle_imports(tree, &mut pass);
        // Snapshot: subscriptions a reaction creates mid-flush deliver at
        // the next flush.
        let entries = self.flush_log.clone();
        for entry in entries {
            match entry {
                FlushEntry::Region { root, observer } => {
                    self.drain_region(tree, root, observer, &mut pass);
                }
                FlushEntry::Attributes { element, observer } => {
                    self.drain_attributes(tree, element, observer, &mut pass);
                }
            }
        }
        pass.finish()
    }

    // ---- side-table inspectors ----

    pub fn is_upgraded(&self, node: NodeId) -> bool {
        self.flags.is_upgraded(node)
    }

    pub fn is_connected(&self, node: NodeId) -> bool {
        self.flags.is_connected(node)
    }

    pub fn definition_of(&self, node: NodeId) -> Option<Rc<Definition>> {
        self.flags.definition(node).cloned()
    }

    /// Member of the node's upgraded capability set, or `None` while the
    /// node is still generic.
    pub fn member(&self, node: NodeId, name: &str) -> Option<&Member> {
        self.flags
            .definition(node)?
            .class()
            .prototype
            .as_ref()?
            .member(name)
    }

    pub fn counters(&self) -> &Counters {
        &self.counters
    }

    /// Definition matching an element: `is` attribute first (type
    /// extensions), else the tag name; the definition's local name must
    /// agree either way.
    pub(crate) fn match_definition(&self, tree: &Tree, element: NodeId) -> Option<Rc<Definition>> {
        let tag = tree.tag_name(element)?;
        let name = tree.attribute(element, "is").unwrap_or(tag);
        let def = self.definitions.get(name)?;
        (def.local_name() == tag).then(|| def.clone())
    }
}
