//! Named relation descriptors for eager loading.
//!
//! The layer has no expression trees, so relations to load alongside a
//! primary entity are described by name and resolved by the persistence
//! collaborator, which owns the knowledge of how to populate them.

use serde::{Deserialize, Serialize};

/// Cardinality of a relation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RelationKind {
    /// A single-valued reference (e.g. an owning parent).
    Single,
    /// A collection of related rows (e.g. child items).
    Collection,
}

/// A named relation to eager-load in the same query round trip.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Relation {
    /// The relation name, as registered with the persistence collaborator.
    pub name: String,
    /// Whether the relation is single-valued or a collection.
    pub kind: RelationKind,
}

impl Relation {
    /// Create a relation descriptor.
    pub fn new(name: impl Into<String>, kind: RelationKind) -> Self {
        Self {
            name: name.into(),
            kind,
        }
    }

    /// Shorthand for a single-valued relation.
    pub fn single(name: impl Into<String>) -> Self {
        Self::new(name, RelationKind::Single)
    }

    /// Shorthand for a collection relation.
    pub fn collection(name: impl Into<String>) -> Self {
        Self::new(name, RelationKind::Collection)
    }
}
