//! The persisted-entity capability trait and its shared audit fields.
//!
//! Rather than forcing concrete entities to extend a base type, each entity
//! embeds an [`AuditFields`] value and exposes it through the [`Entity`]
//! trait. The repository applies its soft-delete and audit policy through
//! this seam alone.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Audit and soft-lifecycle fields carried by every persisted entity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Soft lifecycle state, distinct from deletion.
    #[serde(default = "default_true")]
    pub is_active: bool,
    /// Soft-delete marker; the row is retained but logically absent from
    /// default listings when set.
    #[serde(default)]
    pub is_deleted: bool,
    /// Set once by the persistence layer on insert, never mutated after.
    #[serde(default)]
    pub created_date: Option<DateTime<Utc>>,
    /// The user the row was created by; write-once like `created_date`.
    #[serde(default)]
    pub created_user: i64,
    /// Stamped by the persistence layer on every mutation after creation.
    #[serde(default)]
    pub updated_date: Option<DateTime<Utc>>,
    /// The user behind the most recent mutation.
    #[serde(default)]
    pub updated_user: Option<i64>,
    /// Free-form status code extension point for consumers.
    #[serde(default = "default_row_status")]
    pub row_status: i32,
}

impl Default for AuditFields {
    fn default() -> Self {
        Self {
            is_active: true,
            is_deleted: false,
            created_date: None,
            created_user: 0,
            updated_date: None,
            updated_user: None,
            row_status: 1,
        }
    }
}

/// Capability trait for entities managed by the access layer.
///
/// An id of `0` means "not yet assigned"; the persistence layer assigns
/// ids on insert and they are stable thereafter.
pub trait Entity: Clone + Send + Sync + 'static {
    /// The unique identifier, or `0` before the first insert.
    fn id(&self) -> i64;

    /// Assign the identifier. Reserved for the persistence layer.
    fn set_id(&mut self, id: i64);

    /// The shared audit fields.
    fn audit(&self) -> &AuditFields;

    /// Mutable access to the shared audit fields.
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Whether the entity is soft-deleted.
    fn is_deleted(&self) -> bool {
        self.audit().is_deleted
    }

    /// Set or clear the soft-delete marker.
    fn set_deleted(&mut self, deleted: bool) {
        self.audit_mut().is_deleted = deleted;
    }

    /// Whether the entity is active.
    fn is_active(&self) -> bool {
        self.audit().is_active
    }
}

fn default_true() -> bool {
    true
}

fn default_row_status() -> i32 {
    1
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_audit_defaults() {
        let audit = AuditFields::default();
        assert!(audit.is_active);
        assert!(!audit.is_deleted);
        assert_eq!(audit.row_status, 1);
        assert!(audit.created_date.is_none());
    }

    #[test]
    fn test_audit_serde_fills_defaults() {
        let audit: AuditFields = serde_json::from_str("{}").expect("deserialize");
        assert!(audit.is_active);
        assert_eq!(audit.row_status, 1);
    }
}
