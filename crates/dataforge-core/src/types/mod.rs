//! Shared access-layer types.

pub mod pagination;
pub mod query;
pub mod relation;
pub mod sorting;

pub use pagination::{Page, PagedResult};
pub use query::{Comparator, Predicate, Query};
pub use relation::{Relation, RelationKind};
pub use sorting::SortDirection;
