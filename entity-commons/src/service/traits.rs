//! Service contracts
//!
//! These traits describe the operations every entity service exposes. They
//! use RPITIT so implementations write plain `async fn` bodies.
//!
//! - [`CrudService`]: lookup, paging, counting, create, update, soft delete
//! - [`BlockableService`]: block / unblock
//! - [`ModeratableService`]: moderation decisions on top of blocking
//!
//! [`EntityService`](super::EntityService) implements all three over a
//! [`Repository`](crate::repository::Repository).

use std::future::Future;

use uuid::Uuid;

use crate::error::Result;
use crate::model::{Entity, FilterCriteria};
use crate::repository::Page;

/// Create, read, update and soft-delete operations for one entity kind
///
/// # Example
///
/// ```rust,ignore
/// use entity_commons::service::CrudService;
///
/// async fn show(service: &impl CrudService<Post, PostCriteria>, id: Uuid) -> Result<PostDto> {
///     let post = service.get_by_id(id).await?;
///     Ok(mapper.to_dto(&post))
/// }
/// ```
pub trait CrudService<E: Entity, C: FilterCriteria>: Send + Sync {
    /// Load a visible entity
    ///
    /// Same as [`CrudService::get_by_id_with`] with `safe_mode` off.
    fn get_by_id(&self, id: Uuid) -> impl Future<Output = Result<E>> + Send {
        self.get_by_id_with(id, false)
    }

    /// Load an entity, optionally ignoring the visibility policy
    ///
    /// With `safe_mode` off, deleted and blocked entities are reported as
    /// not found. With it on, any stored entity is returned.
    fn get_by_id_with(&self, id: Uuid, safe_mode: bool)
        -> impl Future<Output = Result<E>> + Send;

    /// One page of entities matching `criteria`
    fn get_all(&self, criteria: &C) -> impl Future<Output = Result<Page<E>>> + Send;

    /// Number of entities matching `criteria`, ignoring pagination
    fn count_all(&self, criteria: &C) -> impl Future<Output = Result<u64>> + Send;

    /// Persist a new entity
    ///
    /// Fails with `InvalidData` on validation failure and `AlreadyExists` on a
    /// duplicate id.
    fn create(&self, entity: E) -> impl Future<Output = Result<E>> + Send;

    /// Persist changes to an existing entity
    ///
    /// Status and creation time are kept from the stored entity.
    fn update(&self, entity: E) -> impl Future<Output = Result<E>> + Send;

    /// Soft-delete an entity
    fn delete(&self, id: Uuid) -> impl Future<Output = Result<()>> + Send;
}

/// Entities that moderators can suspend
pub trait BlockableService<E: Entity>: Send + Sync {
    /// Move the entity to `BLOCKED`
    fn block(&self, id: Uuid) -> impl Future<Output = Result<E>> + Send;

    /// Move a blocked entity back to `ACTIVE`
    fn unblock(&self, id: Uuid) -> impl Future<Output = Result<E>> + Send;
}

/// Entities that pass through moderation before publication
pub trait ModeratableService<E: Entity>: BlockableService<E> {
    /// Accept the entity (`ACTIVE`)
    fn allow(&self, id: Uuid) -> impl Future<Output = Result<E>> + Send;

    /// Reject the entity (`MODERATION_DECLINED`)
    fn disallow(&self, id: Uuid) -> impl Future<Output = Result<E>> + Send;
}
