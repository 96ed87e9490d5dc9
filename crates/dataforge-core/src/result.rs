//! Convenience result type alias for DataForge.

use crate::error::DataError;

/// A specialized `Result` type for DataForge operations.
///
/// This is defined as a convenience so that every crate does not need to
/// write `Result<T, DataError>` explicitly.
pub type DataResult<T> = Result<T, DataError>;
