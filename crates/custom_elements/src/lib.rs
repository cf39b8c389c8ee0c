//! Custom-element definition registry and reaction engine.
//!
//! Retrofits user-defined element types with lifecycle callbacks onto the
//! `dom` host tree. Definitions are recorded by tag name; batched mutation
//! notifications drive a pre-order upgrade walk that constructs matching
//! elements in place and fires connection/disconnection/attribute-change
//! reactions in deterministic order, with per-pass dedup and per-reaction
//! error isolation.
//!
//! The registry is an owned instance, not a global: build a [`Tree`], build
//! a [`Registry`] over it, `define` classes, mutate the tree, and drain
//! reactions at a batching boundary with [`Registry::flush`] (enabled via
//! [`RegistryConfig`]).
//!
//! [`Tree`]: dom::Tree

mod attributes;
mod counters;
mod definition;
mod error;
mod flags;
mod name;
mod observers;
mod reactions;
mod registry;
mod when_defined;

pub use crate::counters::Counters;
pub use crate::definition::{
    AttributeCallback, AttributeChange, DefineOptions, Definition, ElementClass,
    LifecycleCallback, Member, Prototype,
};
pub use crate::error::{DefineError, NameError, NameErrorReason, ReactionError};
pub use crate::name::validate_name;
pub use crate::registry::{Registry, RegistryConfig};
pub use crate::when_defined::WhenDefined;
