//! Definitions and the constructor capability handed to `define`.

use std::collections::BTreeSet;
use std::fmt;
use std::rc::Rc;

use dom::{NodeId, Tree};

use crate::error::{DefineError, ReactionError};

/// Construction/connection/disconnection reaction. Callbacks receive the
/// tree and the element; they never receive the registry, so registry state
/// is only ever mutated from the dispatch thread of control.
pub type LifecycleCallback = Rc<dyn Fn(&mut Tree, NodeId) -> Result<(), ReactionError>>;

/// Attribute-change reaction.
pub type AttributeCallback =
    Rc<dyn Fn(&mut Tree, NodeId, &AttributeChange) -> Result<(), ReactionError>>;

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct AttributeChange {
    pub name: String,
    /// Value before the write; `None` when the attribute was absent.
    pub old_value: Option<String>,
    /// Value after the write; `None` when the attribute was removed.
    pub new_value: Option<String>,
    /// Always `None` on this host tree; kept in the reaction signature.
    pub namespace: Option<String>,
}

/// A named entry of a constructor's capability set.
#[derive(Clone)]
pub enum Member {
    Lifecycle(LifecycleCallback),
    AttributeChanged(AttributeCallback),
    ObservedAttributes(Vec<String>),
    /// Plain data member. Under a callback name this is the
    /// present-but-not-callable case `define` rejects.
    Value(String),
}

impl fmt::Debug for Member {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Member::Lifecycle(_) => f.write_str("Lifecycle(..)"),
            Member::AttributeChanged(_) => f.write_str("AttributeChanged(..)"),
            Member::ObservedAttributes(names) => {
                f.debug_tuple("ObservedAttributes").field(names).finish()
            }
            Member::Value(v) => f.debug_tuple("Value").field(v).finish(),
        }
    }
}

/// Ordered record of named members (the "prototype").
#[derive(Clone, Debug, Default)]
pub struct Prototype {
    members: Vec<(String, Member)>,
}

impl Prototype {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace a member.
    pub fn with(mut self, name: &str, member: Member) -> Self {
        match self.members.iter_mut().find(|(k, _)| k == name) {
            Some((_, slot)) => *slot = member,
            None => self.members.push((name.to_string(), member)),
        }
        self
    }

    pub fn member(&self, name: &str) -> Option<&Member> {
        self.members
            .iter()
            .find(|(k, _)| k == name)
            .map(|(_, m)| m)
    }
}

/// Constructor capability passed to `define`.
///
/// `construct: None` models a non-callable constructor and `prototype: None`
/// a capability set that is not a record; both are rejected at registration.
#[derive(Clone, Default)]
pub struct ElementClass {
    pub construct: Option<LifecycleCallback>,
    pub prototype: Option<Prototype>,
}

impl ElementClass {
    pub fn new<F>(construct: F) -> Self
    where
        F: Fn(&mut Tree, NodeId) -> Result<(), ReactionError> + 'static,
    {
        Self {
            construct: Some(Rc::new(construct)),
            prototype: Some(Prototype::new()),
        }
    }

    pub fn with_member(mut self, name: &str, member: Member) -> Self {
        let prototype = self.prototype.get_or_insert_with(Prototype::new);
        *prototype = std::mem::take(prototype).with(name, member);
        self
    }

    pub fn on_connected<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Tree, NodeId) -> Result<(), ReactionError> + 'static,
    {
        self.with_member("connectedCallback", Member::Lifecycle(Rc::new(callback)))
    }

    pub fn on_disconnected<F>(self, callback: F) -> Self
    where
        F: Fn(&mut Tree, NodeId) -> Result<(), ReactionError> + 'static,
    {
        self.with_member("disconnectedCallback", Member::Lifecycle(Rc::new(callback)))
    }

    /// Declares `attributeChangedCallback` together with the attributes it
    /// observes.
    pub fn on_attribute_changed<F>(self, observed: &[&str], callback: F) -> Self
    where
        F: Fn(&mut Tree, NodeId, &AttributeChange) -> Result<(), ReactionError> + 'static,
    {
        self.with_member(
            "attributeChangedCallback",
            Member::AttributeChanged(Rc::new(callback)),
        )
        .with_member(
            "observedAttributes",
            Member::ObservedAttributes(observed.iter().map(|s| s.to_string()).collect()),
        )
    }
}

#[derive(Clone, Debug, Default)]
pub struct DefineOptions {
    /// Built-in tag name this definition extends; such definitions match
    /// elements of that tag carrying `is="<name>"`.
    pub extends: Option<String>,
}

/// Immutable record describing a registered name. Created by `define`, never
/// mutated, never removed.
pub struct Definition {
    name: String,
    local_name: String,
    class: Rc<ElementClass>,
    pub(crate) construct: LifecycleCallback,
    pub(crate) connected: Option<LifecycleCallback>,
    pub(crate) disconnected: Option<LifecycleCallback>,
    pub(crate) attribute_changed: Option<AttributeCallback>,
    observed_attributes: BTreeSet<String>,
}

impl Definition {
    /// Extracts lifecycle capabilities from the class prototype. The caller
    /// has already checked that the constructor is callable and the
    /// prototype is a record.
    pub(crate) fn extract(
        name: &str,
        class: Rc<ElementClass>,
        construct: LifecycleCallback,
        options: &DefineOptions,
    ) -> Result<Self, DefineError> {
        let prototype = class
            .prototype
            .as_ref()
            .expect("caller checked the prototype is a record");
        let connected = lifecycle_member(prototype, "connectedCallback")?;
        let disconnected = lifecycle_member(prototype, "disconnectedCallback")?;
        let attribute_changed = match prototype.member("attributeChangedCallback") {
            None => None,
            Some(Member::AttributeChanged(f)) => Some(f.clone()),
            Some(_) => {
                return Err(DefineError::CallbackNotCallable("attributeChangedCallback"));
            }
        };
        let observed_attributes = if attribute_changed.is_some() {
            match prototype.member("observedAttributes") {
                Some(Member::ObservedAttributes(names)) => names.iter().cloned().collect(),
                _ => BTreeSet::new(),
            }
        } else {
            BTreeSet::new()
        };
        Ok(Self {
            name: name.to_string(),
            local_name: options.extends.clone().unwrap_or_else(|| name.to_string()),
            class,
            construct,
            connected,
            disconnected,
            attribute_changed,
            observed_attributes,
        })
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Tag name this definition upgrades: the extended built-in tag for
    /// type extensions, otherwise the definition name itself.
    pub fn local_name(&self) -> &str {
        &self.local_name
    }

    pub fn class(&self) -> &Rc<ElementClass> {
        &self.class
    }

    pub fn observed_attributes(&self) -> &BTreeSet<String> {
        &self.observed_attributes
    }

    pub(crate) fn observes_attributes(&self) -> bool {
        self.attribute_changed.is_some() && !self.observed_attributes.is_empty()
    }
}

impl std::fmt::Debug for Definition {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Definition")
            .field("name", &self.name)
            .field("local_name", &self.local_name)
            .field("connected", &self.connected.is_some())
            .field("disconnected", &self.disconnected.is_some())
            .field("attribute_changed", &self.attribute_changed.is_some())
            .field("observed_attributes", &self.observed_attributes)
            .finish()
    }
}

fn lifecycle_member(
    prototype: &Prototype,
    name: &'static str,
) -> Result<Option<LifecycleCallback>, DefineError> {
    match prototype.member(name) {
        None => Ok(None),
        Some(Member::Lifecycle(f)) => Ok(Some(f.clone())),
        Some(_) => Err(DefineError::CallbackNotCallable(name)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn noop_class() -> ElementClass {
        ElementClass::new(|_, _| Ok(()))
    }

    #[test]
    fn extract_pulls_callbacks_and_observed_attributes() {
        let class = Rc::new(
            noop_class()
                .on_connected(|_, _| Ok(()))
                .on_attribute_changed(&["b", "a"], |_, _, _| Ok(())),
        );
        let construct = class.construct.clone().unwrap();
        let def =
            Definition::extract("x-a", class, construct, &DefineOptions::default()).unwrap();
        assert!(def.connected.is_some());
        assert!(def.disconnected.is_none());
        assert!(def.observes_attributes());
        let observed: Vec<&str> = def.observed_attributes().iter().map(|s| s.as_str()).collect();
        assert_eq!(observed, ["a", "b"]);
    }

    #[test]
    fn observed_attributes_ignored_without_callback() {
        let class = Rc::new(noop_class().with_member(
            "observedAttributes",
            Member::ObservedAttributes(vec!["a".to_string()]),
        ));
        let construct = class.construct.clone().unwrap();
        let def =
            Definition::extract("x-a", class, construct, &DefineOptions::default()).unwrap();
        assert!(def.observed_attributes().is_empty());
    }

    #[test]
    fn non_callable_callback_is_rejected() {
        let class = Rc::new(
            noop_class().with_member("connectedCallback", Member::Value("oops".to_string())),
        );
        let construct = class.construct.clone().unwrap();
        let err = Definition::extract("x-a", class, construct, &DefineOptions::default())
            .unwrap_err();
        assert_eq!(err, DefineError::CallbackNotCallable("connectedCallback"));
    }

    #[test]
    fn extends_sets_local_name() {
        let class = Rc::new(noop_class());
        let construct = class.construct.clone().unwrap();
        let options = DefineOptions {
            extends: Some("button".to_string()),
        };
        let def = Definition::extract("x-a", class, construct, &options).unwrap();
        assert_eq!(def.local_name(), "button");
        assert_eq!(def.name(), "x-a");
    }
}
