//! Domain model: audited entities, lifecycle status, criteria and token tags

mod criteria;
mod entity;
mod status;
mod token;

pub use criteria::{Criteria, CriteriaBuilder, CriteriaDefaults, CriteriaParams, FilterCriteria};
pub use entity::{same_entity, timestamp, AuditFields, Entity, EntityKey};
pub use status::Status;
pub use token::TokenType;
