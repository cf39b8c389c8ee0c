//! Host document tree: an arena DOM with batched mutation observation,
//! shadow-like sub-roots, and cross-document (import) references.
//!
//! Trees are built programmatically; there is no markup parser here. The
//! observation surface is deliberately narrow: install an observer, mutate,
//! drain with `Tree::take_records` at a batching boundary.

pub mod debug;

mod imports;
mod observe;
mod tree;
mod types;

pub use crate::imports::ImportState;
pub use crate::observe::{MutationRecord, ObserveOptions, ObserverId};
pub use crate::tree::Tree;
pub use crate::types::{NodeId, NodeKind};
