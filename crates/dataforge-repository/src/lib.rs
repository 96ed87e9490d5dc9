//! # dataforge-repository
//!
//! The generic repository façade: CRUD, filtered query, paging, and bulk
//! operations over any [`Entity`](dataforge_core::traits::Entity), applied
//! through a [`PersistenceContext`](dataforge_core::traits::PersistenceContext)
//! unit of work with a uniform soft-delete and tracking policy.

pub mod paging;
pub mod repository;

pub use repository::Repository;
