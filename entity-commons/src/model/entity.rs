//! Audited entity base
//!
//! Concrete entities embed [`AuditFields`] and implement [`Entity`]. The
//! audit block carries the id, the creation and last-update timestamps, and
//! the lifecycle [`Status`].
//!
//! # Example
//!
//! ```rust
//! use entity_commons::model::{AuditFields, Entity};
//!
//! #[derive(Debug, Clone)]
//! struct Post {
//!     audit: AuditFields,
//!     title: String,
//! }
//!
//! impl Entity for Post {
//!     const KIND: &'static str = "Post";
//!
//!     fn audit(&self) -> &AuditFields {
//!         &self.audit
//!     }
//!
//!     fn audit_mut(&mut self) -> &mut AuditFields {
//!         &mut self.audit
//!     }
//! }
//!
//! entity_commons::impl_entity_eq!(Post);
//!
//! let post = Post { audit: AuditFields::default(), title: "Hello".into() };
//! assert!(post.key().is_none());
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::Status;
use crate::error::FieldErrors;

/// Id, timestamps and status shared by every audited entity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditFields {
    /// Assigned on first persistence
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<Uuid>,

    /// Set once, never updated afterwards
    #[serde(with = "timestamp")]
    pub created: DateTime<Utc>,

    /// Refreshed on every mutation
    #[serde(with = "timestamp")]
    pub updated: DateTime<Utc>,

    /// Lifecycle status
    #[serde(default)]
    pub status: Status,
}

impl AuditFields {
    /// Fresh audit block stamped with the current time
    pub fn new() -> Self {
        let now = Utc::now();
        Self {
            id: None,
            created: now,
            updated: now,
            status: Status::default(),
        }
    }

    /// Fresh audit block that keeps an existing id
    pub fn with_id(id: Option<Uuid>) -> Self {
        Self { id, ..Self::new() }
    }

    /// Refresh the last-update timestamp
    pub fn touch(&mut self) {
        self.updated = Utc::now();
    }
}

impl Default for AuditFields {
    fn default() -> Self {
        Self::new()
    }
}

/// Identity of a persisted entity: its kind plus its id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EntityKey {
    /// Concrete entity kind
    pub kind: &'static str,
    /// Row id
    pub id: Uuid,
}

/// An audited, persistable entity
pub trait Entity: Clone + Send + Sync + 'static {
    /// Name of the concrete kind, used for identity and error messages
    const KIND: &'static str;

    /// The audit block
    fn audit(&self) -> &AuditFields;

    /// The audit block, mutably
    fn audit_mut(&mut self) -> &mut AuditFields;

    /// Row id, if assigned
    fn id(&self) -> Option<Uuid> {
        self.audit().id
    }

    /// Current lifecycle status
    fn status(&self) -> Status {
        self.audit().status
    }

    /// Identity key; `None` until an id is assigned
    fn key(&self) -> Option<EntityKey> {
        self.id().map(|id| EntityKey {
            kind: Self::KIND,
            id,
        })
    }

    /// Field-level validation run before create and update
    ///
    /// Returns a map of field name to error message on failure.
    fn validate(&self) -> std::result::Result<(), FieldErrors> {
        Ok(())
    }
}

/// Identity comparison between two entities, possibly of different kinds
///
/// True only when both have ids and their keys match. An entity without an
/// id is never identical to another instance.
pub fn same_entity<A: Entity, B: Entity>(a: &A, b: &B) -> bool {
    match (a.key(), b.key()) {
        (Some(left), Some(right)) => left == right,
        _ => false,
    }
}

/// Derive `PartialEq`, `Eq` and `Hash` for an entity from its identity
///
/// An instance always equals itself; otherwise equality follows
/// [`same_entity`]. The hash covers [`Entity::key`] only, so entities
/// without an id all land in one bucket.
#[macro_export]
macro_rules! impl_entity_eq {
    ($ty:ty) => {
        impl ::std::cmp::PartialEq for $ty {
            fn eq(&self, other: &Self) -> bool {
                ::std::ptr::eq(self, other) || $crate::model::same_entity(self, other)
            }
        }

        impl ::std::cmp::Eq for $ty {}

        impl ::std::hash::Hash for $ty {
            fn hash<H: ::std::hash::Hasher>(&self, state: &mut H) {
                ::std::hash::Hash::hash(&<Self as $crate::model::Entity>::key(self), state);
            }
        }
    };
}

/// `yyyy-MM-dd'T'HH:mm:ss.SSSSSS'Z'` in UTC
pub mod timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    /// chrono format string for audit timestamps
    pub const FORMAT: &str = "%Y-%m-%dT%H:%M:%S%.6fZ";

    /// Serialize with six fractional digits and a literal `Z`
    pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&value.format(FORMAT).to_string())
    }

    /// Parse the fixed format, falling back to RFC 3339
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(deserializer)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .or_else(|_| DateTime::parse_from_rfc3339(&raw).map(|dt| dt.with_timezone(&Utc)))
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[derive(Debug, Clone)]
    struct Post {
        audit: AuditFields,
    }

    impl Entity for Post {
        const KIND: &'static str = "Post";

        fn audit(&self) -> &AuditFields {
            &self.audit
        }

        fn audit_mut(&mut self) -> &mut AuditFields {
            &mut self.audit
        }
    }

    crate::impl_entity_eq!(Post);

    #[derive(Debug, Clone)]
    struct Comment {
        audit: AuditFields,
    }

    impl Entity for Comment {
        const KIND: &'static str = "Comment";

        fn audit(&self) -> &AuditFields {
            &self.audit
        }

        fn audit_mut(&mut self) -> &mut AuditFields {
            &mut self.audit
        }
    }

    fn post(id: Option<Uuid>) -> Post {
        Post {
            audit: AuditFields::with_id(id),
        }
    }

    #[test]
    fn test_defaults() {
        let audit = AuditFields::default();
        assert!(audit.id.is_none());
        assert_eq!(audit.status, Status::Active);
        assert_eq!(audit.created, audit.updated);
    }

    #[test]
    fn test_touch_moves_updated_only() {
        let mut audit = AuditFields::new();
        let created = audit.created;
        audit.touch();
        assert_eq!(audit.created, created);
        assert!(audit.updated >= created);
    }

    #[test]
    fn test_same_id_same_kind_is_equal() {
        let id = Uuid::now_v7();
        assert_eq!(post(Some(id)), post(Some(id)));
    }

    #[test]
    fn test_different_ids_are_not_equal() {
        assert_ne!(post(Some(Uuid::now_v7())), post(Some(Uuid::now_v7())));
    }

    #[test]
    #[allow(clippy::eq_op)]
    fn test_missing_id_is_only_equal_to_itself() {
        let first = post(None);
        let second = post(None);
        assert_eq!(first, first);
        assert_ne!(first, second);
    }

    #[test]
    fn test_different_kinds_never_equal() {
        let id = Uuid::now_v7();
        let comment = Comment {
            audit: AuditFields::with_id(Some(id)),
        };
        assert!(!same_entity(&post(Some(id)), &comment));
        assert!(same_entity(&post(Some(id)), &post(Some(id))));
    }

    #[test]
    fn test_hash_follows_identity() {
        use std::collections::HashSet;

        let id = Uuid::now_v7();
        let mut first = post(Some(id));
        let mut second = post(Some(id));
        first.audit.status = Status::Draft;
        second.audit.status = Status::Blocked;

        let set: HashSet<Post> = [first, second, post(Some(Uuid::now_v7()))].into_iter().collect();
        assert_eq!(set.len(), 2);
        assert!(set.contains(&post(Some(id))));
        assert!(!set.contains(&post(None)));
    }

    #[test]
    fn test_key_carries_kind() {
        let id = Uuid::now_v7();
        let key = post(Some(id)).key().unwrap();
        assert_eq!(key.kind, "Post");
        assert_eq!(key.id, id);
    }

    #[test]
    fn test_timestamp_format() {
        let audit = AuditFields {
            id: None,
            created: Utc.with_ymd_and_hms(2024, 3, 1, 12, 30, 5).unwrap(),
            updated: Utc.with_ymd_and_hms(2024, 3, 2, 8, 0, 0).unwrap(),
            status: Status::Draft,
        };
        let json = serde_json::to_value(&audit).unwrap();
        assert_eq!(json["created"], "2024-03-01T12:30:05.000000Z");
        assert_eq!(json["updated"], "2024-03-02T08:00:00.000000Z");
        assert_eq!(json["status"], "DRAFT");
        assert!(json.get("id").is_none());

        let back: AuditFields = serde_json::from_value(json).unwrap();
        assert_eq!(back, audit);
    }

    #[test]
    fn test_timestamp_accepts_rfc3339() {
        let json = serde_json::json!({
            "created": "2024-03-01T12:30:05+02:00",
            "updated": "2024-03-01T12:30:05.123456Z",
        });
        let audit: AuditFields = serde_json::from_value(json).unwrap();
        assert_eq!(
            audit.created,
            Utc.with_ymd_and_hms(2024, 3, 1, 10, 30, 5).unwrap()
        );
        assert_eq!(audit.status, Status::Active);
    }
}
