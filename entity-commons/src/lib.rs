//! # entity-commons
//!
//! Shared persistence building blocks for services that store audited,
//! status-tracked entities in PostgreSQL.
//!
//! ## Features
//!
//! - **Audited entities**: id, creation/update timestamps and a lifecycle
//!   [`Status`](model::Status) with an enforced transition table
//! - **Filter criteria**: paging, status, author and full-text query with
//!   validated bounds
//! - **Specifications**: composable predicates rendered with sea-query,
//!   including `tsvector` matching with rank ordering
//! - **Service contracts**: CRUD, blocking and moderation over any
//!   [`Repository`](repository::Repository)
//! - **Error taxonomy**: domain errors with an HTTP mapping (feature `http`)
//! - **Security defaults**: Argon2id passwords (feature `auth`) and JWT
//!   tokens (feature `jwt`), used only when the application supplies none
//!
//! ## Example
//!
//! ```rust,ignore
//! use entity_commons::prelude::*;
//!
//! #[tokio::main]
//! async fn main() -> Result<()> {
//!     let settings = Settings::load()?;
//!     init_tracing(&settings)?;
//!
//!     let components = CommonComponents::builder().build(&settings)?;
//!
//!     let posts = EntityService::new(PostRepository::connect().await?)
//!         .with_spec_builder(StandardSpecBuilder::new(Predicates::new(settings.search.clone())));
//!
//!     let criteria = Criteria::builder().query("rust async").per_page(20).build()?;
//!     let page = posts.get_all(&criteria).await?;
//!     println!("{} of {}", page.items.len(), page.total);
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod dto;
pub mod error;
pub mod mapper;
pub mod model;
pub mod observability;
pub mod repository;
pub mod service;
pub mod specification;

#[cfg(any(feature = "auth", feature = "jwt"))]
pub mod auth;

#[cfg(all(feature = "auth", feature = "jwt"))]
pub mod wiring;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::config::{JwtSettings, PasswordSettings, Settings};
    pub use crate::dto::{ErrorResponse, Validate};
    pub use crate::error::{Error, FieldErrors, Result};
    pub use crate::mapper::{AuditAwareMapper, Mapper};
    pub use crate::model::{
        AuditFields, Criteria, CriteriaDefaults, Entity, FilterCriteria, Status, TokenType,
    };
    pub use crate::observability::init_tracing;
    pub use crate::repository::{
        OrderDirection, Page, Pageable, Repository, RepositoryError, RepositoryErrorKind,
        RepositoryOperation, RepositoryResult, Sort,
    };
    pub use crate::service::{BlockableService, CrudService, EntityService, ModeratableService};
    pub use crate::specification::{
        FieldConventions, FunctionRegistry, Predicates, SpecBuilder, Specification,
        StandardSpecBuilder,
    };

    #[cfg(feature = "auth")]
    pub use crate::auth::{Argon2PasswordEncoder, PasswordEncoder};

    #[cfg(feature = "jwt")]
    pub use crate::auth::{JwtTokenService, TokenParameters, TokenService};

    #[cfg(all(feature = "auth", feature = "jwt"))]
    pub use crate::wiring::CommonComponents;
}
