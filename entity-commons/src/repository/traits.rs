//! Repository port
//!
//! Storage adapters implement [`Repository`] for each entity kind. The trait
//! uses RPITIT (Return Position Impl Trait In Traits) so adapters write plain
//! `async fn` bodies without `async_trait`.
//!
//! Filtering arrives as a [`Specification`]; adapters render it against their
//! table with [`Specification::select`] / [`Specification::count`] and run
//! the resulting statement with whatever driver they use.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_commons::repository::{Pageable, Repository, RepositoryResult};
//! use entity_commons::specification::Specification;
//! use sea_query::PostgresQueryBuilder;
//!
//! struct PostRepository {
//!     pool: PgPool,
//! }
//!
//! impl Repository<Post> for PostRepository {
//!     async fn find_all(
//!         &self,
//!         spec: &Specification,
//!         pageable: &Pageable,
//!     ) -> RepositoryResult<Vec<Post>> {
//!         let (sql, values) = spec.select("posts", pageable).build(PostgresQueryBuilder);
//!         // bind `values` and fetch
//!         todo!()
//!     }
//!     // ... other methods
//! }
//! ```

use std::future::Future;

use uuid::Uuid;

use super::error::RepositoryError;
use super::page::Pageable;
use crate::model::Entity;
use crate::specification::Specification;

/// Result type for repository operations
pub type RepositoryResult<T> = std::result::Result<T, RepositoryError>;

/// Storage port for one entity kind
///
/// Rows are never physically removed through this trait; soft deletion is a
/// status change persisted with [`Repository::save`].
pub trait Repository<E: Entity>: Send + Sync {
    /// Load a row by id regardless of its status
    ///
    /// Returns `Ok(None)` when no row has this id.
    fn find_by_id(&self, id: &Uuid) -> impl Future<Output = RepositoryResult<Option<E>>> + Send;

    /// Load the rows matching `spec` inside the `pageable` window
    ///
    /// Orderings contributed by the specification come first, followed by
    /// the pageable's sort.
    fn find_all(
        &self,
        spec: &Specification,
        pageable: &Pageable,
    ) -> impl Future<Output = RepositoryResult<Vec<E>>> + Send;

    /// Count the rows matching `spec`, ignoring any window
    fn count(&self, spec: &Specification) -> impl Future<Output = RepositoryResult<u64>> + Send;

    /// Check whether a row with this id exists
    fn exists(&self, id: &Uuid) -> impl Future<Output = RepositoryResult<bool>> + Send;

    /// Write a new row
    ///
    /// Adapters report a duplicate key as
    /// [`RepositoryErrorKind::AlreadyExists`](super::RepositoryErrorKind::AlreadyExists).
    fn insert(&self, entity: E) -> impl Future<Output = RepositoryResult<E>> + Send;

    /// Overwrite an existing row
    fn save(&self, entity: E) -> impl Future<Output = RepositoryResult<E>> + Send;
}
