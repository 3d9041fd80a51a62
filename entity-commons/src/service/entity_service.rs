//! Generic entity service over a repository

use std::marker::PhantomData;

use tracing::{debug, info, warn};
use uuid::Uuid;

use super::traits::{BlockableService, CrudService, ModeratableService};
use crate::error::{Error, Result};
use crate::model::{AuditFields, Entity, FilterCriteria, Status};
use crate::repository::{OrderDirection, Page, Repository, Sort};
use crate::specification::{CriteriaSpecBuilder, SpecBuilder};

/// Statuses a new entity may start in
const INITIAL_STATUSES: [Status; 4] = [
    Status::Active,
    Status::NotActive,
    Status::Draft,
    Status::UnderModeration,
];

/// CRUD, blocking and moderation for one entity kind
///
/// Filtering is delegated to a [`SpecBuilder`]; by default the criteria type
/// builds its own specification. All status changes go through the
/// [`Status`] transition table.
///
/// # Example
///
/// ```rust,ignore
/// use entity_commons::service::{CrudService, EntityService};
///
/// let posts: EntityService<Post, PostCriteria, _> = EntityService::new(PostRepository::new(pool));
/// let page = posts.get_all(&criteria).await?;
/// ```
pub struct EntityService<E, C, R, B = CriteriaSpecBuilder> {
    repository: R,
    spec_builder: B,
    default_sort: Sort,
    _marker: PhantomData<fn() -> (E, C)>,
}

impl<E, C, R> EntityService<E, C, R>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
{
    /// Service whose criteria build their own specification, newest first
    pub fn new(repository: R) -> Self {
        Self {
            repository,
            spec_builder: CriteriaSpecBuilder::default(),
            default_sort: Sort::by("created", OrderDirection::Desc),
            _marker: PhantomData,
        }
    }
}

impl<E, C, R, B> EntityService<E, C, R, B>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
    B: SpecBuilder<C>,
{
    /// Replace the specification builder
    pub fn with_spec_builder<B2>(self, spec_builder: B2) -> EntityService<E, C, R, B2>
    where
        B2: SpecBuilder<C>,
    {
        EntityService {
            repository: self.repository,
            spec_builder,
            default_sort: self.default_sort,
            _marker: PhantomData,
        }
    }

    /// Sort used when the criteria carry none
    #[must_use]
    pub fn with_default_sort(mut self, sort: Sort) -> Self {
        self.default_sort = sort;
        self
    }

    /// The underlying repository
    pub fn repository(&self) -> &R {
        &self.repository
    }

    fn not_found(id: Uuid) -> Error {
        Error::not_found(format!("{} {} not found", E::KIND, id))
    }

    async fn load(&self, id: Uuid, safe_mode: bool) -> Result<E> {
        let entity = self
            .repository
            .find_by_id(&id)
            .await?
            .ok_or_else(|| Self::not_found(id))?;

        if !safe_mode && !entity.status().is_visible() {
            debug!(kind = E::KIND, id = %id, status = %entity.status(), "Hiding entity from lookup");
            return Err(Self::not_found(id));
        }
        Ok(entity)
    }

    async fn transition(&self, id: Uuid, target: Status) -> Result<E> {
        let entity = self.load(id, true).await?;
        self.transition_entity(id, entity, target).await
    }

    // Status change on a row the caller already loaded; no second read.
    async fn transition_entity(&self, id: Uuid, mut entity: E, target: Status) -> Result<E> {
        let current = entity.status();

        if current == Status::Deleted {
            return Err(Self::not_found(id));
        }
        if let Err(err) = current.transition_to(target) {
            warn!(kind = E::KIND, id = %id, from = %current, to = %target, "Rejected status change");
            return Err(err);
        }

        let audit = entity.audit_mut();
        audit.status = target;
        audit.touch();

        let saved = self.repository.save(entity).await?;
        info!(kind = E::KIND, id = %id, from = %current, to = %target, "Changed entity status");
        Ok(saved)
    }
}

impl<E, C, R, B> CrudService<E, C> for EntityService<E, C, R, B>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
    B: SpecBuilder<C>,
{
    async fn get_by_id_with(&self, id: Uuid, safe_mode: bool) -> Result<E> {
        self.load(id, safe_mode).await
    }

    async fn get_all(&self, criteria: &C) -> Result<Page<E>> {
        let spec = self.spec_builder.build(criteria)?;
        let pageable = criteria.to_pageable(&self.default_sort);

        let items = self.repository.find_all(&spec, &pageable).await?;
        let total = self.repository.count(&spec).await?;

        debug!(
            kind = E::KIND,
            offset = pageable.offset,
            limit = pageable.limit,
            returned = items.len(),
            total,
            "Listed entities"
        );
        Ok(Page::new(items, &pageable, total))
    }

    async fn count_all(&self, criteria: &C) -> Result<u64> {
        let spec = self.spec_builder.build(criteria)?;
        Ok(self.repository.count(&spec).await?)
    }

    async fn create(&self, mut entity: E) -> Result<E> {
        entity.validate().map_err(Error::invalid_fields)?;

        let status = entity.status();
        if !INITIAL_STATUSES.contains(&status) {
            return Err(Error::invalid_data(format!(
                "{} cannot be created in status {}",
                E::KIND,
                status
            )));
        }

        if let Some(id) = entity.id() {
            if self.repository.exists(&id).await? {
                return Err(Error::already_exists(format!(
                    "{} {} already exists",
                    E::KIND,
                    id
                )));
            }
        }

        let id = entity.id().unwrap_or_else(Uuid::now_v7);
        *entity.audit_mut() = AuditFields {
            status,
            ..AuditFields::with_id(Some(id))
        };

        let saved = self.repository.insert(entity).await?;
        info!(kind = E::KIND, id = %id, status = %status, "Created entity");
        Ok(saved)
    }

    async fn update(&self, mut entity: E) -> Result<E> {
        let Some(id) = entity.id() else {
            return Err(Error::invalid_data(format!("{} id is required for update", E::KIND)));
        };

        let existing = self.load(id, false).await?;
        entity.validate().map_err(Error::invalid_fields)?;

        let stored = existing.audit();
        let audit = entity.audit_mut();
        audit.status = stored.status;
        audit.created = stored.created;
        audit.touch();

        let saved = self.repository.save(entity).await?;
        info!(kind = E::KIND, id = %id, "Updated entity");
        Ok(saved)
    }

    async fn delete(&self, id: Uuid) -> Result<()> {
        self.transition(id, Status::Deleted).await.map(|_| ())
    }
}

impl<E, C, R, B> BlockableService<E> for EntityService<E, C, R, B>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
    B: SpecBuilder<C>,
{
    async fn block(&self, id: Uuid) -> Result<E> {
        self.transition(id, Status::Blocked).await
    }

    async fn unblock(&self, id: Uuid) -> Result<E> {
        let entity = self.load(id, true).await?;
        match entity.status() {
            Status::Blocked => self.transition_entity(id, entity, Status::Active).await,
            Status::Deleted => Err(Self::not_found(id)),
            current => Err(Error::IllegalTransition {
                from: current,
                to: Status::Active,
            }),
        }
    }
}

impl<E, C, R, B> ModeratableService<E> for EntityService<E, C, R, B>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
    B: SpecBuilder<C>,
{
    async fn allow(&self, id: Uuid) -> Result<E> {
        self.moderate(id, Status::Active).await
    }

    async fn disallow(&self, id: Uuid) -> Result<E> {
        self.moderate(id, Status::ModerationDeclined).await
    }
}

impl<E, C, R, B> EntityService<E, C, R, B>
where
    E: Entity,
    C: FilterCriteria,
    R: Repository<E>,
    B: SpecBuilder<C>,
{
    // Moderation decisions apply only to entities awaiting or failing review.
    async fn moderate(&self, id: Uuid, target: Status) -> Result<E> {
        let entity = self.load(id, true).await?;
        let current = entity.status();
        if !matches!(current, Status::UnderModeration | Status::ModerationDeclined) {
            if current == Status::Deleted {
                return Err(Self::not_found(id));
            }
            warn!(kind = E::KIND, id = %id, from = %current, to = %target, "Rejected moderation decision");
            return Err(Error::IllegalTransition {
                from: current,
                to: target,
            });
        }
        self.transition_entity(id, entity, target).await
    }
}
