//! Seam traits between the repository façade and its collaborators.

pub mod context;
pub mod entity;

pub use context::{EntityState, PersistenceContext};
pub use entity::{AuditFields, Entity};
