//! In-memory unit of work over a [`MemoryStore`].

use std::collections::HashMap;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::debug;

use dataforge_core::error::DataError;
use dataforge_core::result::DataResult;
use dataforge_core::traits::{Entity, EntityState, PersistenceContext};
use dataforge_core::types::query::{Predicate, Query};
use dataforge_core::types::relation::Relation;

use crate::store::MemoryStore;

/// One tracked entry in the identity map.
struct Tracked<T> {
    entity: T,
    state: EntityState,
}

/// A unit of work over a shared [`MemoryStore`].
///
/// Holds an identity map of tracked entities and a list of pending inserts;
/// nothing reaches the store until [`save_changes`] flushes, and a failed
/// flush leaves the store untouched. One context serves one logical
/// request and is not meant to be shared between tasks.
///
/// Tracking here means identity-map membership: tracked rows participate in
/// `state`/`is_tracked`/`add_or_update` decisions, but mutations are only
/// persisted when explicitly scheduled via `mark_modified`.
///
/// [`save_changes`]: PersistenceContext::save_changes
pub struct MemoryContext<T: Entity> {
    store: MemoryStore<T>,
    tracker: HashMap<i64, Tracked<T>>,
    pending_inserts: Vec<T>,
    actor: i64,
}

impl<T: Entity> MemoryContext<T> {
    /// Open a unit of work with no acting user.
    pub fn new(store: MemoryStore<T>) -> Self {
        Self::with_actor(store, 0)
    }

    /// Open a unit of work stamping audit fields with the given actor.
    pub fn with_actor(store: MemoryStore<T>, actor: i64) -> Self {
        Self {
            store,
            tracker: HashMap::new(),
            pending_inserts: Vec::new(),
            actor,
        }
    }

    /// The store this unit of work flushes to.
    pub fn store(&self) -> &MemoryStore<T> {
        &self.store
    }

    /// The actor stamped into audit fields on flush.
    pub fn actor(&self) -> i64 {
        self.actor
    }

    fn has_pending(&self) -> bool {
        !self.pending_inserts.is_empty()
            || self
                .tracker
                .values()
                .any(|entry| entry.state != EntityState::Unchanged)
    }

    fn stamp_created(&self, entity: &mut T, now: DateTime<Utc>) {
        let audit = entity.audit_mut();
        audit.created_date = Some(now);
        if audit.created_user == 0 && self.actor != 0 {
            audit.created_user = self.actor;
        }
    }

    fn stamp_updated(&self, entity: &mut T, now: DateTime<Utc>) {
        let audit = entity.audit_mut();
        audit.updated_date = Some(now);
        if self.actor != 0 {
            audit.updated_user = Some(self.actor);
        }
    }
}

#[async_trait]
impl<T: Entity> PersistenceContext<T> for MemoryContext<T> {
    fn state(&self, id: i64) -> EntityState {
        self.tracker
            .get(&id)
            .map(|entry| entry.state)
            .unwrap_or(EntityState::Detached)
    }

    fn attach(&mut self, entity: T) {
        self.tracker.entry(entity.id()).or_insert(Tracked {
            entity,
            state: EntityState::Unchanged,
        });
    }

    fn detach(&mut self, id: i64) {
        self.tracker.remove(&id);
    }

    fn mark_added(&mut self, entity: T) {
        if entity.id() == 0 {
            self.pending_inserts.push(entity);
        } else {
            self.tracker.insert(
                entity.id(),
                Tracked {
                    entity,
                    state: EntityState::Added,
                },
            );
        }
    }

    fn mark_modified(&mut self, entity: T) {
        self.tracker.insert(
            entity.id(),
            Tracked {
                entity,
                state: EntityState::Modified,
            },
        );
    }

    fn mark_deleted(&mut self, entity: T) {
        self.tracker.insert(
            entity.id(),
            Tracked {
                entity,
                state: EntityState::Deleted,
            },
        );
    }

    async fn find(&mut self, id: i64) -> DataResult<Option<T>> {
        // identity map wins over the store within one unit of work
        if let Some(entry) = self.tracker.get(&id) {
            return Ok(Some(entry.entity.clone()));
        }

        self.store.record_round_trip();
        let found = self.store.rows_read().get(&id).cloned();
        if let Some(entity) = found.clone() {
            self.tracker.insert(
                id,
                Tracked {
                    entity,
                    state: EntityState::Unchanged,
                },
            );
        }
        Ok(found)
    }

    async fn count(&self, predicate: Option<&Predicate<T>>) -> DataResult<u64> {
        self.store.record_round_trip();
        let rows = self.store.rows_read();
        let count = match predicate {
            Some(pred) => rows.values().filter(|row| pred(row)).count(),
            None => rows.len(),
        };
        Ok(count as u64)
    }

    async fn fetch(&mut self, query: &Query<T>) -> DataResult<Vec<T>> {
        self.store.record_round_trip();

        let mut rows: Vec<T> = {
            let table = self.store.rows_read();
            match &query.predicate {
                Some(pred) => table.values().filter(|row| pred(row)).cloned().collect(),
                None => table.values().cloned().collect(),
            }
        };

        if let Some(order) = &query.order {
            rows.sort_by(|a, b| order(a, b));
        }

        if let Some(skip) = query.skip {
            let skip = skip.min(rows.len() as u64) as usize;
            rows.drain(..skip);
        }
        if let Some(take) = query.take {
            rows.truncate(take as usize);
        }

        for relation in &query.relations {
            let resolver = self.store.resolver(&relation.name).ok_or_else(|| {
                DataError::invalid_argument(format!(
                    "no resolver registered for relation '{}'",
                    relation.name
                ))
            })?;
            for row in &mut rows {
                resolver(row);
            }
        }

        if query.tracked {
            for row in &rows {
                self.tracker.entry(row.id()).or_insert(Tracked {
                    entity: row.clone(),
                    state: EntityState::Unchanged,
                });
            }
        }

        Ok(rows)
    }

    async fn load_relation(&self, entity: &mut T, relation: &Relation) -> DataResult<()> {
        let resolver = self.store.resolver(&relation.name).ok_or_else(|| {
            DataError::invalid_argument(format!(
                "no resolver registered for relation '{}'",
                relation.name
            ))
        })?;
        self.store.record_round_trip();
        resolver(entity);
        Ok(())
    }

    async fn save_changes(&mut self) -> DataResult<u64> {
        if !self.has_pending() {
            return Ok(0);
        }

        self.store.record_round_trip();
        let now = Utc::now();
        let mut rows = self.store.rows_write();

        // validate first so a rejected flush leaves the store untouched
        for (id, entry) in &self.tracker {
            match entry.state {
                EntityState::Added if rows.contains_key(id) => {
                    return Err(DataError::conflict(format!(
                        "cannot insert row {id}: id already exists"
                    )));
                }
                EntityState::Modified if !rows.contains_key(id) => {
                    return Err(DataError::not_found(format!(
                        "cannot update row {id}: not present in store"
                    )));
                }
                _ => {}
            }
        }

        let mut affected = 0u64;

        let pending_inserts = std::mem::take(&mut self.pending_inserts);
        for mut entity in pending_inserts {
            let id = self.store.allocate_id();
            entity.set_id(id);
            self.stamp_created(&mut entity, now);
            rows.insert(id, entity.clone());
            self.tracker.insert(
                id,
                Tracked {
                    entity,
                    state: EntityState::Unchanged,
                },
            );
            affected += 1;
        }

        let pending_ids: Vec<i64> = self
            .tracker
            .iter()
            .filter(|(_, entry)| entry.state != EntityState::Unchanged)
            .map(|(id, _)| *id)
            .collect();

        for id in pending_ids {
            let Some(mut entry) = self.tracker.remove(&id) else {
                continue;
            };
            match entry.state {
                EntityState::Added => {
                    self.stamp_created(&mut entry.entity, now);
                    rows.insert(id, entry.entity.clone());
                    entry.state = EntityState::Unchanged;
                    self.tracker.insert(id, entry);
                    affected += 1;
                }
                EntityState::Modified => {
                    // created_date/created_user are write-once; keep stored values
                    if let Some(stored) = rows.get(&id) {
                        let audit = entry.entity.audit_mut();
                        audit.created_date = stored.audit().created_date;
                        audit.created_user = stored.audit().created_user;
                    }
                    self.stamp_updated(&mut entry.entity, now);
                    rows.insert(id, entry.entity.clone());
                    entry.state = EntityState::Unchanged;
                    self.tracker.insert(id, entry);
                    affected += 1;
                }
                EntityState::Deleted => {
                    if rows.remove(&id).is_some() {
                        affected += 1;
                    }
                }
                EntityState::Unchanged | EntityState::Detached => {
                    self.tracker.insert(id, entry);
                }
            }
        }

        debug!(rows = affected, "flushed unit of work");
        Ok(affected)
    }
}
