//! Composable, not-yet-executed query descriptions.
//!
//! Predicates and orderings are plain closures over the entity type rather
//! than expression trees; a [`Query`] carries them together with eager-load
//! relations and execution flags, and is only evaluated when handed to a
//! persistence context.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;

use crate::types::relation::Relation;

/// A filter over entities, applied by the persistence collaborator.
pub type Predicate<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// A total ordering over entities, applied before paging.
pub type Comparator<T> = Arc<dyn Fn(&T, &T) -> Ordering + Send + Sync>;

/// A composable query description.
///
/// Reads default to untracked: fetched rows are not registered in the unit
/// of work and later in-memory mutation of them is never persisted
/// implicitly.
#[derive(Clone)]
pub struct Query<T> {
    /// Optional row filter.
    pub predicate: Option<Predicate<T>>,
    /// Optional ordering applied before skip/take.
    pub order: Option<Comparator<T>>,
    /// Relations to eager-load on each returned row.
    pub relations: Vec<Relation>,
    /// Whether fetched rows are registered in the unit of work.
    pub tracked: bool,
    /// Rows to skip before the first returned row.
    pub skip: Option<u64>,
    /// Maximum number of rows to return.
    pub take: Option<u64>,
}

impl<T> Query<T> {
    /// Create an unfiltered, untracked query.
    pub fn new() -> Self {
        Self {
            predicate: None,
            order: None,
            relations: Vec::new(),
            tracked: false,
            skip: None,
            take: None,
        }
    }

    /// Restrict the query with a predicate closure.
    pub fn filter(mut self, predicate: impl Fn(&T) -> bool + Send + Sync + 'static) -> Self {
        self.predicate = Some(Arc::new(predicate));
        self
    }

    /// Restrict the query with an already-shared predicate.
    pub fn filter_with(mut self, predicate: Predicate<T>) -> Self {
        self.predicate = Some(predicate);
        self
    }

    /// Order the results with a comparator closure.
    pub fn order_by(mut self, comparator: impl Fn(&T, &T) -> Ordering + Send + Sync + 'static) -> Self {
        self.order = Some(Arc::new(comparator));
        self
    }

    /// Eager-load the given relation on each returned row.
    pub fn include(mut self, relation: Relation) -> Self {
        self.relations.push(relation);
        self
    }

    /// Register fetched rows in the unit of work.
    pub fn tracked(mut self, tracked: bool) -> Self {
        self.tracked = tracked;
        self
    }

    /// Skip the first `n` matching rows.
    pub fn skip(mut self, n: u64) -> Self {
        self.skip = Some(n);
        self
    }

    /// Return at most `n` rows.
    pub fn take(mut self, n: u64) -> Self {
        self.take = Some(n);
        self
    }
}

impl<T> Default for Query<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> fmt::Debug for Query<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Query")
            .field("filtered", &self.predicate.is_some())
            .field("ordered", &self.order.is_some())
            .field("relations", &self.relations)
            .field("tracked", &self.tracked)
            .field("skip", &self.skip)
            .field("take", &self.take)
            .finish()
    }
}
