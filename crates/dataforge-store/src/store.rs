//! Shared in-memory backing table.

use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use dataforge_core::traits::Entity;

use crate::context::MemoryContext;

/// Populates one named relation on an entity.
pub type RelationResolver<T> = Arc<dyn Fn(&mut T) + Send + Sync>;

/// The shared in-memory table for one entity type.
///
/// Cloning the store clones a handle to the same rows, the way a connection
/// pool handle is cloned per request; each [`MemoryContext`] opened from it
/// is an independent unit of work over the shared rows. The store counts
/// round trips so callers can observe how many times a unit of work
/// actually reached it.
pub struct MemoryStore<T: Entity> {
    inner: Arc<StoreInner<T>>,
}

struct StoreInner<T> {
    rows: RwLock<BTreeMap<i64, T>>,
    resolvers: RwLock<HashMap<String, RelationResolver<T>>>,
    next_id: AtomicI64,
    round_trips: AtomicU64,
}

impl<T: Entity> MemoryStore<T> {
    /// Create an empty store.
    pub fn new() -> Self {
        Self {
            inner: Arc::new(StoreInner {
                rows: RwLock::new(BTreeMap::new()),
                resolvers: RwLock::new(HashMap::new()),
                next_id: AtomicI64::new(1),
                round_trips: AtomicU64::new(0),
            }),
        }
    }

    /// Open a new unit of work over this store.
    pub fn context(&self) -> MemoryContext<T> {
        MemoryContext::new(self.clone())
    }

    /// Open a new unit of work stamping audit fields with the given actor.
    pub fn context_as(&self, actor: i64) -> MemoryContext<T> {
        MemoryContext::with_actor(self.clone(), actor)
    }

    /// Register the resolver that populates the named relation.
    pub fn register_relation(
        &self,
        name: impl Into<String>,
        resolver: impl Fn(&mut T) + Send + Sync + 'static,
    ) {
        self.resolvers_write()
            .insert(name.into(), Arc::new(resolver));
    }

    /// Look up the resolver for a relation name.
    pub(crate) fn resolver(&self, name: &str) -> Option<RelationResolver<T>> {
        self.resolvers_read().get(name).cloned()
    }

    /// Number of store round trips issued so far.
    pub fn round_trips(&self) -> u64 {
        self.inner.round_trips.load(Ordering::Relaxed)
    }

    /// Number of rows currently stored.
    pub fn len(&self) -> usize {
        self.rows_read().len()
    }

    /// Whether the store holds no rows.
    pub fn is_empty(&self) -> bool {
        self.rows_read().is_empty()
    }

    /// Whether a row with the given id exists.
    pub fn contains(&self, id: i64) -> bool {
        self.rows_read().contains_key(&id)
    }

    /// Peek at a stored row without opening a unit of work.
    pub fn peek(&self, id: i64) -> Option<T> {
        self.rows_read().get(&id).cloned()
    }

    pub(crate) fn record_round_trip(&self) {
        self.inner.round_trips.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn allocate_id(&self) -> i64 {
        self.inner.next_id.fetch_add(1, Ordering::Relaxed)
    }

    pub(crate) fn rows_read(&self) -> RwLockReadGuard<'_, BTreeMap<i64, T>> {
        self.inner.rows.read().unwrap_or_else(PoisonError::into_inner)
    }

    pub(crate) fn rows_write(&self) -> RwLockWriteGuard<'_, BTreeMap<i64, T>> {
        self.inner.rows.write().unwrap_or_else(PoisonError::into_inner)
    }

    fn resolvers_read(&self) -> RwLockReadGuard<'_, HashMap<String, RelationResolver<T>>> {
        self.inner
            .resolvers
            .read()
            .unwrap_or_else(PoisonError::into_inner)
    }

    fn resolvers_write(&self) -> RwLockWriteGuard<'_, HashMap<String, RelationResolver<T>>> {
        self.inner
            .resolvers
            .write()
            .unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T: Entity> Default for MemoryStore<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: Entity> Clone for MemoryStore<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<T: Entity> std::fmt::Debug for MemoryStore<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryStore")
            .field("rows", &self.len())
            .field("round_trips", &self.round_trips())
            .finish()
    }
}
