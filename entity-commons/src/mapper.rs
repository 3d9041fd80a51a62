//! Entity / transfer-object mapping
//!
//! [`Mapper`] is the plain two-way conversion. [`AuditAwareMapper`] wraps a
//! mapper so that audit fields can never be populated from a transfer
//! object: status, creation and update timestamps always come from the
//! stored entity (or fresh defaults for a new one).
//!
//! # Example
//!
//! ```rust
//! use entity_commons::mapper::{AuditAwareMapper, Mapper};
//! use entity_commons::model::{AuditFields, Entity, Status};
//!
//! #[derive(Debug, Clone)]
//! struct Post { audit: AuditFields, title: String }
//!
//! impl Entity for Post {
//!     const KIND: &'static str = "Post";
//!     fn audit(&self) -> &AuditFields { &self.audit }
//!     fn audit_mut(&mut self) -> &mut AuditFields { &mut self.audit }
//! }
//!
//! struct PostDto { title: String, status: Status }
//!
//! struct PostMapper;
//!
//! impl Mapper<Post, PostDto> for PostMapper {
//!     fn to_dto(&self, post: &Post) -> PostDto {
//!         PostDto { title: post.title.clone(), status: post.status() }
//!     }
//!
//!     fn to_entity(&self, dto: &PostDto) -> Post {
//!         let mut audit = AuditFields::new();
//!         audit.status = dto.status;
//!         Post { audit, title: dto.title.clone() }
//!     }
//! }
//!
//! let mapper = AuditAwareMapper::new(PostMapper);
//! let forged = PostDto { title: "Hi".into(), status: Status::Blocked };
//! assert_eq!(mapper.to_entity(&forged).status(), Status::Active);
//! ```

use crate::model::{AuditFields, Entity};

/// Two-way conversion between an entity and its transfer form
pub trait Mapper<E, D> {
    /// Entity to transfer object
    fn to_dto(&self, entity: &E) -> D;

    /// Transfer object to entity
    fn to_entity(&self, dto: &D) -> E;

    /// Convert a batch of entities, keeping order
    fn to_dtos(&self, entities: &[E]) -> Vec<D> {
        entities.iter().map(|e| self.to_dto(e)).collect()
    }

    /// Convert a batch of transfer objects, keeping order
    fn to_entities(&self, dtos: &[D]) -> Vec<E> {
        dtos.iter().map(|d| self.to_entity(d)).collect()
    }
}

/// Mapper wrapper that keeps audit fields out of the caller's reach
#[derive(Debug, Clone, Default)]
pub struct AuditAwareMapper<M> {
    inner: M,
}

impl<M> AuditAwareMapper<M> {
    /// Wrap a mapper
    pub fn new(inner: M) -> Self {
        Self { inner }
    }

    /// The wrapped mapper
    pub fn inner(&self) -> &M {
        &self.inner
    }

    /// Apply a transfer object onto a stored entity
    ///
    /// The result carries the transfer object's data and the stored entity's
    /// id, status and timestamps.
    pub fn merge<E, D>(&self, dto: &D, existing: &E) -> E
    where
        E: Entity,
        M: Mapper<E, D>,
    {
        let mut entity = self.inner.to_entity(dto);
        *entity.audit_mut() = existing.audit().clone();
        entity
    }
}

impl<E, D, M> Mapper<E, D> for AuditAwareMapper<M>
where
    E: Entity,
    M: Mapper<E, D>,
{
    fn to_dto(&self, entity: &E) -> D {
        self.inner.to_dto(entity)
    }

    /// Only the id survives; status and timestamps are fresh defaults
    fn to_entity(&self, dto: &D) -> E {
        let mut entity = self.inner.to_entity(dto);
        let id = entity.id();
        *entity.audit_mut() = AuditFields::with_id(id);
        entity
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Status;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    #[derive(Debug, Clone)]
    struct Post {
        audit: AuditFields,
        title: String,
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

    // Deliberately leaky: copies every audit field from the transfer form
    #[derive(Debug, Clone)]
    struct PostDto {
        id: Option<Uuid>,
        title: String,
        status: Status,
        created: DateTime<Utc>,
    }

    struct PostMapper;

    impl Mapper<Post, PostDto> for PostMapper {
        fn to_dto(&self, post: &Post) -> PostDto {
            PostDto {
                id: post.id(),
                title: post.title.clone(),
                status: post.status(),
                created: post.audit.created,
            }
        }

        fn to_entity(&self, dto: &PostDto) -> Post {
            Post {
                audit: AuditFields {
                    id: dto.id,
                    created: dto.created,
                    updated: dto.created,
                    status: dto.status,
                },
                title: dto.title.clone(),
            }
        }
    }

    fn stored() -> Post {
        Post {
            audit: AuditFields {
                id: Some(Uuid::now_v7()),
                created: Utc.with_ymd_and_hms(2023, 5, 1, 9, 0, 0).unwrap(),
                updated: Utc.with_ymd_and_hms(2023, 6, 1, 9, 0, 0).unwrap(),
                status: Status::UnderModeration,
            },
            title: "Original".into(),
        }
    }

    #[test]
    fn test_to_entity_resets_audit_fields() {
        let mapper = AuditAwareMapper::new(PostMapper);
        let dto = PostDto {
            id: None,
            title: "New".into(),
            status: Status::Blocked,
            created: Utc.with_ymd_and_hms(2000, 1, 1, 0, 0, 0).unwrap(),
        };

        let entity = mapper.to_entity(&dto);
        assert_eq!(entity.title, "New");
        assert_eq!(entity.status(), Status::Active);
        assert!(entity.audit.created.timestamp() > dto.created.timestamp());
    }

    #[test]
    fn test_to_entity_keeps_id() {
        let id = Uuid::now_v7();
        let mapper = AuditAwareMapper::new(PostMapper);
        let dto = PostDto {
            id: Some(id),
            title: "t".into(),
            status: Status::Draft,
            created: Utc::now(),
        };
        assert_eq!(mapper.to_entity(&dto).id(), Some(id));
    }

    #[test]
    fn test_round_trip_preserves_audit() {
        let mapper = AuditAwareMapper::new(PostMapper);
        let original = stored();

        let mut dto = mapper.to_dto(&original);
        dto.title = "Edited".into();
        dto.status = Status::Active;
        dto.created = Utc::now();

        let merged = mapper.merge(&dto, &original);
        assert_eq!(merged.title, "Edited");
        assert_eq!(merged.audit, original.audit);
    }

    #[test]
    fn test_batch_conversion_keeps_order() {
        let mapper = PostMapper;
        let mut second = stored();
        second.title = "Second".into();
        let posts = vec![stored(), second];

        let titles: Vec<String> = mapper.to_dtos(&posts).into_iter().map(|d| d.title).collect();
        assert_eq!(titles, ["Original", "Second"]);

        let back = AuditAwareMapper::new(PostMapper).to_entities(&mapper.to_dtos(&posts));
        assert!(back.iter().all(|p| p.status() == Status::Active));
    }
}
