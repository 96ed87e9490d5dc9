//! Unified error types for the DataForge access layer.
//!
//! All crates map their internal errors into [`DataError`] for consistent
//! propagation through the ? operator. Persistence failures are never caught
//! or retried at this layer; they carry through to the caller verbatim.

use std::fmt;
use thiserror::Error;

/// Top-level error kind categorization used across the access layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    /// An id or predicate lookup yielded zero rows where one was required.
    NotFound,
    /// A single-row lookup matched more than one row.
    AmbiguousResult,
    /// A caller-supplied argument was invalid (e.g. an unregistered relation).
    InvalidArgument,
    /// The backing store rejected or failed an operation.
    Persistence,
    /// A uniqueness or state conflict occurred (duplicate id, concurrent change).
    Conflict,
    /// A configuration error occurred.
    Configuration,
    /// A serialization/deserialization error occurred.
    Serialization,
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "NOT_FOUND"),
            Self::AmbiguousResult => write!(f, "AMBIGUOUS_RESULT"),
            Self::InvalidArgument => write!(f, "INVALID_ARGUMENT"),
            Self::Persistence => write!(f, "PERSISTENCE"),
            Self::Conflict => write!(f, "CONFLICT"),
            Self::Configuration => write!(f, "CONFIGURATION"),
            Self::Serialization => write!(f, "SERIALIZATION"),
        }
    }
}

/// The unified error used throughout DataForge.
///
/// Store implementations map their internal failures into `DataError` using
/// `From` impls or explicit `.map_err()` calls, giving callers a single error
/// type at the access-layer boundary.
#[derive(Debug, Error)]
#[error("{kind}: {message}")]
pub struct DataError {
    /// The category of error.
    pub kind: ErrorKind,
    /// A human-readable error message.
    pub message: String,
    /// Optional underlying cause.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl DataError {
    /// Create a new error.
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
            source: None,
        }
    }

    /// Create a new error with an underlying cause.
    pub fn with_source(
        kind: ErrorKind,
        message: impl Into<String>,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Create a not-found error.
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::NotFound, message)
    }

    /// Create an ambiguous-result error.
    pub fn ambiguous(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::AmbiguousResult, message)
    }

    /// Create an invalid-argument error.
    pub fn invalid_argument(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidArgument, message)
    }

    /// Create a persistence error.
    pub fn persistence(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Persistence, message)
    }

    /// Create a conflict error.
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Conflict, message)
    }

    /// Create a configuration error.
    pub fn configuration(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::Configuration, message)
    }
}

impl Clone for DataError {
    fn clone(&self) -> Self {
        Self {
            kind: self.kind,
            message: self.message.clone(),
            source: None,
        }
    }
}

impl From<serde_json::Error> for DataError {
    fn from(err: serde_json::Error) -> Self {
        Self::with_source(
            ErrorKind::Serialization,
            format!("JSON serialization error: {err}"),
            err,
        )
    }
}

impl From<config::ConfigError> for DataError {
    fn from(err: config::ConfigError) -> Self {
        Self::with_source(
            ErrorKind::Configuration,
            format!("Configuration error: {err}"),
            err,
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_display() {
        assert_eq!(ErrorKind::NotFound.to_string(), "NOT_FOUND");
        assert_eq!(ErrorKind::AmbiguousResult.to_string(), "AMBIGUOUS_RESULT");
        assert_eq!(ErrorKind::Persistence.to_string(), "PERSISTENCE");
    }

    #[test]
    fn test_error_display_includes_kind_and_message() {
        let err = DataError::not_found("row 5 missing");
        assert_eq!(err.to_string(), "NOT_FOUND: row 5 missing");
    }

    #[test]
    fn test_clone_drops_source() {
        let io = std::io::Error::new(std::io::ErrorKind::Other, "boom");
        let err = DataError::with_source(ErrorKind::Persistence, "flush failed", io);
        let cloned = err.clone();
        assert!(err.source.is_some());
        assert!(cloned.source.is_none());
        assert_eq!(cloned.kind, ErrorKind::Persistence);
    }
}
