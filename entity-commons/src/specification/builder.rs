//! Criteria to specification builders

use super::{Predicates, Specification};
use crate::error::Result;
use crate::model::FilterCriteria;

/// Turns a criteria value into a [`Specification`]
pub trait SpecBuilder<C>: Send + Sync {
    /// Build the restriction for `criteria`
    fn build(&self, criteria: &C) -> Result<Specification>;
}

/// Delegates to [`FilterCriteria::to_specification`]
///
/// Fails with `NotSupported` for criteria types that keep the default.
#[derive(Debug, Clone, Default)]
pub struct CriteriaSpecBuilder {
    predicates: Predicates,
}

impl CriteriaSpecBuilder {
    /// Builder using the given predicates
    pub fn new(predicates: Predicates) -> Self {
        Self { predicates }
    }
}

impl<C: FilterCriteria> SpecBuilder<C> for CriteriaSpecBuilder {
    fn build(&self, criteria: &C) -> Result<Specification> {
        criteria.to_specification(&self.predicates)
    }
}

/// Status, author and query restrictions from the base criteria, for any
/// criteria type
#[derive(Debug, Clone, Default)]
pub struct StandardSpecBuilder {
    predicates: Predicates,
}

impl StandardSpecBuilder {
    /// Builder using the given predicates
    pub fn new(predicates: Predicates) -> Self {
        Self { predicates }
    }
}

impl<C: FilterCriteria> SpecBuilder<C> for StandardSpecBuilder {
    fn build(&self, criteria: &C) -> Result<Specification> {
        Ok(criteria.base().standard_specification(&self.predicates))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::model::{Criteria, Status};

    #[test]
    fn test_criteria_builder_requires_override() {
        let result = CriteriaSpecBuilder::default().build(&Criteria::default());
        assert!(matches!(result, Err(Error::NotSupported(_))));
    }

    #[test]
    fn test_standard_builder_uses_base_fields() {
        let criteria = Criteria::builder()
            .status(Status::UnderModeration)
            .query("rust async")
            .build()
            .unwrap();
        let spec = StandardSpecBuilder::default().build(&criteria).unwrap();
        let sql = spec.count_sql("posts");

        assert!(sql.contains("'UNDER_MODERATION'"));
        assert!(sql.contains("'rust:* & async:*'"));
        assert!(spec.joins().is_empty());
    }
}
