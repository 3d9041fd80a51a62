//! Service layer: contracts and the generic repository-backed implementation

mod entity_service;
mod traits;

pub use entity_service::EntityService;
pub use traits::{BlockableService, CrudService, ModeratableService};
