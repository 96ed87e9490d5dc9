//! The unit-of-work persistence context consumed by the repository.
//!
//! A context scopes one unit of work over a backing store: an in-memory
//! identity map of tracked entities plus pending state changes, flushed to
//! the store in a single `save_changes` call. One context serves one
//! logical request; a context is not meant to be shared between tasks.

use async_trait::async_trait;

use crate::result::DataResult;
use crate::traits::entity::Entity;
use crate::types::query::{Predicate, Query};
use crate::types::relation::Relation;

/// Lifecycle state of an entity inside a unit of work.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum EntityState {
    /// Not known to this unit of work.
    Detached,
    /// Tracked with no pending change.
    Unchanged,
    /// Pending insert on the next flush.
    Added,
    /// Pending full-record overwrite on the next flush.
    Modified,
    /// Pending physical removal on the next flush.
    Deleted,
}

/// A unit-of-work persistence context over one entity type.
///
/// State operations are synchronous identity-map manipulation; only the
/// query and flush operations touch the backing store. Implementations
/// must not retry or swallow store failures.
#[async_trait]
pub trait PersistenceContext<T: Entity>: Send {
    /// The state of the entity with the given id in this unit of work.
    fn state(&self, id: i64) -> EntityState;

    /// Whether the id is present in the local identity map.
    fn is_tracked(&self, id: i64) -> bool {
        self.state(id) != EntityState::Detached
    }

    /// Associate an entity with this unit of work without scheduling a
    /// change. Keeps any pending state if the id is already tracked.
    fn attach(&mut self, entity: T);

    /// Remove the id from the identity map, discarding any pending change.
    fn detach(&mut self, id: i64);

    /// Schedule the entity for insert on the next flush.
    fn mark_added(&mut self, entity: T);

    /// Schedule a full-record overwrite on the next flush.
    fn mark_modified(&mut self, entity: T);

    /// Schedule physical removal on the next flush, attaching first when
    /// the entity is not already tracked.
    fn mark_deleted(&mut self, entity: T);

    /// Load an entity by id into the identity map. `None` on a miss.
    async fn find(&mut self, id: i64) -> DataResult<Option<T>>;

    /// Count rows matching the predicate (all rows when `None`).
    async fn count(&self, predicate: Option<&Predicate<T>>) -> DataResult<u64>;

    /// Execute a query description against the store. Tracked queries
    /// register each returned row in the identity map.
    async fn fetch(&mut self, query: &Query<T>) -> DataResult<Vec<T>>;

    /// Populate one named relation on the entity in the same round trip
    /// family as the fetch that produced it.
    async fn load_relation(&self, entity: &mut T, relation: &Relation) -> DataResult<()>;

    /// Flush all pending changes to the store in one round trip and return
    /// the number of rows affected. A flush with nothing pending returns 0
    /// without touching the store.
    async fn save_changes(&mut self) -> DataResult<u64>;
}
