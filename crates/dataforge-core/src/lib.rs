//! # dataforge-core
//!
//! Core crate for DataForge. Contains the `Entity` and `PersistenceContext`
//! seam traits, configuration schemas, pagination/sorting/relation/query
//! types, and the unified error system.
//!
//! This crate has **no** internal dependencies on other DataForge crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::DataError;
pub use result::DataResult;
