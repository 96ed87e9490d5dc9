//! # dataforge-store
//!
//! Reference in-memory persistence engine for DataForge: a shared
//! [`MemoryStore`] row table plus per-request [`MemoryContext`] units of
//! work implementing `PersistenceContext`. Used by the integration tests
//! and by embedded deployments; production systems supply their own
//! context over a relational engine.

pub mod context;
pub mod store;

pub use context::MemoryContext;
pub use store::{MemoryStore, RelationResolver};
