//! Generic repository over one entity type and one unit of work.

use std::collections::HashSet;
use std::marker::PhantomData;

use tracing::debug;

use dataforge_core::config::paging::PagingConfig;
use dataforge_core::error::DataError;
use dataforge_core::result::DataResult;
use dataforge_core::traits::{Entity, PersistenceContext};
use dataforge_core::types::query::{Comparator, Predicate, Query};
use dataforge_core::types::relation::{Relation, RelationKind};

/// Uniform CRUD/query façade per entity type.
///
/// One repository wraps one persistence context, i.e. one unit of work;
/// scope one per logical request. Convenience methods flush immediately;
/// to batch several mutations into a single flush, use the `mark_*`
/// primitives on [`context_mut`](Self::context_mut) followed by one
/// [`save_changes`](Self::save_changes).
///
/// Policy enforced here so no caller bypasses it ad hoc:
/// - single-entity deletes default to soft delete; range and bulk deletes
///   are always physical,
/// - reads default to untracked, and untracked listings exclude
///   soft-deleted rows,
/// - tracked `get_all` is the administrative path and returns everything,
///   soft-deleted rows included.
pub struct Repository<T, C>
where
    T: Entity,
    C: PersistenceContext<T>,
{
    ctx: C,
    paging: PagingConfig,
    _entity: PhantomData<T>,
}

impl<T, C> Repository<T, C>
where
    T: Entity,
    C: PersistenceContext<T>,
{
    /// Wrap a persistence context with default paging limits.
    pub fn new(ctx: C) -> Self {
        Self::with_paging(ctx, PagingConfig::default())
    }

    /// Wrap a persistence context with explicit paging limits.
    pub fn with_paging(ctx: C, paging: PagingConfig) -> Self {
        Self {
            ctx,
            paging,
            _entity: PhantomData,
        }
    }

    /// The underlying unit of work.
    pub fn context(&self) -> &C {
        &self.ctx
    }

    /// Mutable access to the unit of work, for composing several
    /// state changes into one flush.
    pub fn context_mut(&mut self) -> &mut C {
        &mut self.ctx
    }

    /// Consume the repository and return the unit of work.
    pub fn into_context(self) -> C {
        self.ctx
    }

    pub(crate) fn paging(&self) -> &PagingConfig {
        &self.paging
    }

    // ---- create ----

    /// Insert one entity. Returns rows affected.
    pub async fn add(&mut self, entity: T) -> DataResult<u64> {
        self.ctx.mark_added(entity);
        self.ctx.save_changes().await
    }

    /// Insert a batch of entities in one flush. An empty batch is a no-op
    /// returning 0 without a persistence round trip.
    pub async fn add_many(&mut self, entities: Vec<T>) -> DataResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        for entity in entities {
            self.ctx.mark_added(entity);
        }
        self.ctx.save_changes().await
    }

    // ---- update ----

    /// Overwrite the full record, regardless of which fields changed.
    /// Callers load, modify, and save the whole entity; the flush fails
    /// with `NotFound` when the id does not exist in the store.
    pub async fn update(&mut self, entity: T) -> DataResult<u64> {
        self.ctx.mark_modified(entity);
        self.ctx.save_changes().await
    }

    // ---- delete ----

    /// Delete one entity. Soft by default: sets `is_deleted` and routes
    /// through [`update`](Self::update), so the row is retained and the
    /// update audit stamps apply. `hard` physically removes the row,
    /// attaching the entity first when it is not already tracked.
    pub async fn delete(&mut self, mut entity: T, hard: bool) -> DataResult<u64> {
        if hard {
            debug!(id = entity.id(), "hard delete");
            self.ctx.mark_deleted(entity);
            self.ctx.save_changes().await
        } else {
            debug!(id = entity.id(), "soft delete");
            entity.set_deleted(true);
            self.update(entity).await
        }
    }

    /// Delete by id, looking the entity up first. A miss is an explicit
    /// `NotFound` error, never a silent success.
    pub async fn delete_by_id(&mut self, id: i64, hard: bool) -> DataResult<u64> {
        match self.ctx.find(id).await? {
            Some(entity) => self.delete(entity, hard).await,
            None => Err(DataError::not_found(format!(
                "cannot delete entity {id}: not found"
            ))),
        }
    }

    /// Physically delete every entity matching the predicate in one flush.
    /// Returns whether any row was removed. Range deletes are maintenance
    /// operations and have no soft variant; soft delete is a single-entity
    /// policy.
    pub async fn delete_range(
        &mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> DataResult<bool> {
        let matches = self.ctx.fetch(&Query::new().filter(predicate)).await?;
        for entity in matches {
            self.ctx.mark_deleted(entity);
        }
        let affected = self.ctx.save_changes().await?;
        debug!(rows = affected, "range delete");
        Ok(affected > 0)
    }

    // ---- add-or-update ----

    /// Insert or update in one call. If the id is already tracked in this
    /// unit of work the pending state is simply flushed; otherwise an
    /// unassigned id (0) routes to insert and an assigned id to update.
    pub async fn add_or_update(&mut self, entity: T) -> DataResult<u64> {
        if !self.ctx.is_tracked(entity.id()) {
            if entity.id() == 0 {
                self.ctx.mark_added(entity);
            } else {
                self.ctx.mark_modified(entity);
            }
        }
        self.ctx.save_changes().await
    }

    // ---- read ----

    /// A fresh composable query, untracked by default. Nothing executes
    /// until the query is handed to [`fetch`](Self::fetch) or
    /// [`paginate`](Self::paginate).
    pub fn query(&self) -> Query<T> {
        Query::new()
    }

    /// Execute a query description against the unit of work.
    pub async fn fetch(&mut self, query: &Query<T>) -> DataResult<Vec<T>> {
        self.ctx.fetch(query).await
    }

    /// First row matching the predicate, or `None`. Never errs on zero
    /// matches.
    pub async fn first_or_default(
        &mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
        relations: &[Relation],
    ) -> DataResult<Option<T>> {
        let mut query = Query::new().filter(predicate).take(1);
        query.relations = relations.to_vec();
        let mut rows = self.ctx.fetch(&query).await?;
        Ok(rows.pop())
    }

    /// Exactly one row matching the predicate: `None` on zero matches, the
    /// row on one, and an `AmbiguousResult` error on more. An ambiguous
    /// single-row lookup never silently picks a winner.
    pub async fn get_single(
        &mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
        relations: &[Relation],
    ) -> DataResult<Option<T>> {
        let mut query = Query::new().filter(predicate).take(2);
        query.relations = relations.to_vec();
        let mut rows = self.ctx.fetch(&query).await?;
        if rows.len() > 1 {
            return Err(DataError::ambiguous(
                "get_single matched more than one row",
            ));
        }
        Ok(rows.pop())
    }

    /// Filtered, optionally ordered, fully materialized list.
    pub async fn get_list(
        &mut self,
        predicate: Option<Predicate<T>>,
        order: Option<Comparator<T>>,
        relations: &[Relation],
    ) -> DataResult<Vec<T>> {
        let mut query = Query::new();
        query.predicate = predicate;
        query.order = order;
        query.relations = relations.to_vec();
        self.ctx.fetch(&query).await
    }

    /// All rows. Untracked (the default listing) excludes soft-deleted
    /// rows; tracked is the administrative path and returns everything,
    /// soft-deleted rows included.
    pub async fn get_all(&mut self, tracked: bool) -> DataResult<Vec<T>> {
        if tracked {
            self.ctx.fetch(&Query::new().tracked(true)).await
        } else {
            self.ctx
                .fetch(&Query::new().filter(|entity: &T| !entity.is_deleted()))
                .await
        }
    }

    /// Look up by id; `None` on a miss. Untracked lookups detach the found
    /// instance so later in-memory mutation is never persisted by an
    /// unrelated flush. Only single-valued relations are eager-loaded
    /// here, one explicit load per relation.
    pub async fn get_by_id(
        &mut self,
        id: i64,
        tracked: bool,
        relations: &[Relation],
    ) -> DataResult<Option<T>> {
        let Some(mut entity) = self.ctx.find(id).await? else {
            return Ok(None);
        };

        if !tracked {
            self.ctx.detach(id);
        }

        for relation in relations {
            if relation.kind == RelationKind::Single {
                self.ctx.load_relation(&mut entity, relation).await?;
            }
        }

        Ok(Some(entity))
    }

    // ---- bulk ----

    /// Insert a collection in one flush. Empty input is a no-op.
    pub async fn bulk_add(&mut self, entities: Vec<T>) -> DataResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        debug!(count = entities.len(), "bulk add");
        for entity in entities {
            self.ctx.mark_added(entity);
        }
        self.ctx.save_changes().await
    }

    /// Overwrite a collection in one flush. Empty input is a no-op.
    pub async fn bulk_update(&mut self, entities: Vec<T>) -> DataResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        debug!(count = entities.len(), "bulk update");
        for entity in entities {
            self.ctx.mark_modified(entity);
        }
        self.ctx.save_changes().await
    }

    /// Physically delete a collection in one flush. Empty input is a
    /// no-op. Bulk deletes have no soft variant.
    pub async fn bulk_delete(&mut self, entities: Vec<T>) -> DataResult<u64> {
        if entities.is_empty() {
            return Ok(0);
        }
        debug!(count = entities.len(), "bulk delete");
        for entity in entities {
            self.ctx.mark_deleted(entity);
        }
        self.ctx.save_changes().await
    }

    /// Physically delete every row whose id is in `ids`, in one flush.
    /// Empty input is a no-op.
    pub async fn bulk_delete_by_ids(&mut self, ids: &[i64]) -> DataResult<u64> {
        if ids.is_empty() {
            return Ok(0);
        }
        let wanted: HashSet<i64> = ids.iter().copied().collect();
        let matches = self
            .ctx
            .fetch(&Query::new().filter(move |entity: &T| wanted.contains(&entity.id())))
            .await?;
        self.bulk_delete(matches).await
    }

    /// Physically delete every row matching the predicate, in one flush.
    pub async fn bulk_delete_where(
        &mut self,
        predicate: impl Fn(&T) -> bool + Send + Sync + 'static,
    ) -> DataResult<u64> {
        let matches = self.ctx.fetch(&Query::new().filter(predicate)).await?;
        self.bulk_delete(matches).await
    }

    // ---- unit-of-work control ----

    /// Flush all pending changes in one round trip, letting callers batch
    /// several state changes made through the context primitives.
    pub async fn save_changes(&mut self) -> DataResult<u64> {
        self.ctx.save_changes().await
    }

    // ---- synchronous mirrors ----
    //
    // For call sites that cannot suspend. Each mirror drives the async
    // body to completion on the current thread, so the policy applied is
    // identical by construction. Do not call from within a runtime.

    /// Synchronous mirror of [`add`](Self::add).
    pub fn add_blocking(&mut self, entity: T) -> DataResult<u64> {
        futures::executor::block_on(self.add(entity))
    }

    /// Synchronous mirror of [`update`](Self::update).
    pub fn update_blocking(&mut self, entity: T) -> DataResult<u64> {
        futures::executor::block_on(self.update(entity))
    }

    /// Synchronous mirror of [`delete`](Self::delete).
    pub fn delete_blocking(&mut self, entity: T, hard: bool) -> DataResult<u64> {
        futures::executor::block_on(self.delete(entity, hard))
    }

    /// Synchronous mirror of [`get_by_id`](Self::get_by_id).
    pub fn get_by_id_blocking(
        &mut self,
        id: i64,
        tracked: bool,
        relations: &[Relation],
    ) -> DataResult<Option<T>> {
        futures::executor::block_on(self.get_by_id(id, tracked, relations))
    }

    /// Synchronous mirror of [`get_all`](Self::get_all).
    pub fn get_all_blocking(&mut self, tracked: bool) -> DataResult<Vec<T>> {
        futures::executor::block_on(self.get_all(tracked))
    }

    /// Synchronous mirror of [`save_changes`](Self::save_changes).
    pub fn save_changes_blocking(&mut self) -> DataResult<u64> {
        futures::executor::block_on(self.save_changes())
    }
}

impl<T, C> std::fmt::Debug for Repository<T, C>
where
    T: Entity,
    C: PersistenceContext<T>,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("paging", &self.paging)
            .finish_non_exhaustive()
    }
}
