//! Filter and pagination criteria
//!
//! [`Criteria`] is the immutable base every list request carries: page
//! index, page size, status filter, free-text query, optional author and
//! sort. Concrete criteria types embed it, implement [`FilterCriteria`] and
//! override [`FilterCriteria::to_specification`].
//!
//! # Example
//!
//! ```rust
//! use entity_commons::model::{Criteria, Status};
//!
//! let criteria = Criteria::builder()
//!     .page_id(2)
//!     .query("  red car ")
//!     .status(Status::Draft)
//!     .build()
//!     .unwrap();
//!
//! assert_eq!(criteria.page_id(), 2);
//! assert_eq!(criteria.per_page(), 10);
//! assert_eq!(criteria.query(), "red car");
//! ```

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::status::Status;
use crate::error::{Error, Result};
use crate::repository::{Pageable, Sort};
use crate::specification::{Predicates, Specification};

/// Defaults a criteria builder starts from
///
/// Concrete criteria types that need different defaults pass their own
/// value to [`Criteria::builder_with`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CriteriaDefaults {
    /// 1-based page index
    pub page_id: u32,
    /// Page size
    pub per_page: u32,
    /// Status filter
    pub status: Status,
}

impl CriteriaDefaults {
    /// Page 1, ten rows, active entities
    pub const STANDARD: Self = Self {
        page_id: 1,
        per_page: 10,
        status: Status::Active,
    };
}

impl Default for CriteriaDefaults {
    fn default() -> Self {
        Self::STANDARD
    }
}

/// Immutable filter and pagination request
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Criteria {
    page_id: u32,
    per_page: u32,
    status: Status,
    query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    author_id: Option<Uuid>,
    #[serde(skip_serializing_if = "Option::is_none")]
    sort: Option<Sort>,
}

impl Criteria {
    /// Builder starting from [`CriteriaDefaults::STANDARD`]
    pub fn builder() -> CriteriaBuilder {
        Self::builder_with(CriteriaDefaults::STANDARD)
    }

    /// Builder starting from caller-supplied defaults
    pub fn builder_with(defaults: CriteriaDefaults) -> CriteriaBuilder {
        CriteriaBuilder {
            defaults,
            page_id: None,
            per_page: None,
            status: None,
            query: None,
            author_id: None,
            sort: None,
        }
    }

    /// 1-based page index
    pub fn page_id(&self) -> u32 {
        self.page_id
    }

    /// Page size
    pub fn per_page(&self) -> u32 {
        self.per_page
    }

    /// Status filter
    pub fn status(&self) -> Status {
        self.status
    }

    /// Trimmed free-text query; empty when none was given
    pub fn query(&self) -> &str {
        &self.query
    }

    /// Author filter
    pub fn author_id(&self) -> Option<Uuid> {
        self.author_id
    }

    /// Caller-requested sort
    pub fn sort(&self) -> Option<&Sort> {
        self.sort.as_ref()
    }

    /// Window for this page, using the caller's sort when one was given
    pub fn to_pageable(&self, default_sort: &Sort) -> Pageable {
        let sort = match &self.sort {
            Some(sort) if !sort.is_unsorted() => sort.clone(),
            _ => default_sort.clone(),
        };
        Pageable::page(u64::from(self.page_id), u64::from(self.per_page), sort)
    }

    /// Status, author and query restrictions built from the base fields
    pub fn standard_specification(&self, predicates: &Predicates) -> Specification {
        predicates
            .has_status(self.status)
            .and(predicates.has_author_id(self.author_id))
            .and(predicates.contains_query(Some(&self.query), None))
    }
}

impl Default for Criteria {
    fn default() -> Self {
        let defaults = CriteriaDefaults::STANDARD;
        Self {
            page_id: defaults.page_id,
            per_page: defaults.per_page,
            status: defaults.status,
            query: String::new(),
            author_id: None,
            sort: None,
        }
    }
}

/// Builder for [`Criteria`]
///
/// Setters accept optional values; `None` keeps the default. Out-of-range
/// page values are reported by [`CriteriaBuilder::build`] instead of being
/// clamped.
#[derive(Debug, Clone)]
pub struct CriteriaBuilder {
    defaults: CriteriaDefaults,
    page_id: Option<i64>,
    per_page: Option<i64>,
    status: Option<Status>,
    query: Option<String>,
    author_id: Option<Uuid>,
    sort: Option<Sort>,
}

impl CriteriaBuilder {
    /// 1-based page index; must be at least 1
    #[must_use]
    pub fn page_id(mut self, page_id: impl Into<Option<i64>>) -> Self {
        self.page_id = page_id.into();
        self
    }

    /// Page size; must be at least 1
    #[must_use]
    pub fn per_page(mut self, per_page: impl Into<Option<i64>>) -> Self {
        self.per_page = per_page.into();
        self
    }

    /// Status filter; `None` keeps the default status ([`Status::Active`]
    /// unless the builder was started with other defaults)
    #[must_use]
    pub fn status(mut self, status: impl Into<Option<Status>>) -> Self {
        self.status = status.into();
        self
    }

    /// Free-text query
    #[must_use]
    pub fn query(mut self, query: impl Into<String>) -> Self {
        self.query = Some(query.into());
        self
    }

    /// Optional free-text query
    #[must_use]
    pub fn maybe_query(mut self, query: Option<String>) -> Self {
        self.query = query;
        self
    }

    /// Restrict to one author
    #[must_use]
    pub fn author_id(mut self, author_id: impl Into<Option<Uuid>>) -> Self {
        self.author_id = author_id.into();
        self
    }

    /// Caller-requested sort
    #[must_use]
    pub fn sort(mut self, sort: impl Into<Option<Sort>>) -> Self {
        self.sort = sort.into();
        self
    }

    /// Finish the criteria
    ///
    /// # Errors
    ///
    /// [`Error::InvalidArgument`] when the page index or page size is below 1.
    pub fn build(self) -> Result<Criteria> {
        Ok(Criteria {
            page_id: at_least_one("page_id", self.page_id, self.defaults.page_id)?,
            per_page: at_least_one("per_page", self.per_page, self.defaults.per_page)?,
            status: self.status.unwrap_or(self.defaults.status),
            query: self
                .query
                .map(|q| q.trim().to_string())
                .unwrap_or_default(),
            author_id: self.author_id,
            sort: self.sort,
        })
    }
}

fn at_least_one(field: &str, value: Option<i64>, default: u32) -> Result<u32> {
    match value {
        None => Ok(default),
        Some(v) if v >= 1 => u32::try_from(v)
            .map_err(|_| Error::InvalidArgument(format!("{field} is too large: {v}"))),
        Some(v) => Err(Error::InvalidArgument(format!(
            "{field} must be at least 1, got {v}"
        ))),
    }
}

/// Raw criteria as bound from a query string (`?pageId=2&perPage=20&query=...`)
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CriteriaParams {
    /// 1-based page index
    pub page_id: Option<i64>,
    /// Page size
    pub per_page: Option<i64>,
    /// Status filter
    pub status: Option<Status>,
    /// Free-text query
    pub query: Option<String>,
    /// Author filter
    pub author_id: Option<Uuid>,
}

impl TryFrom<CriteriaParams> for Criteria {
    type Error = Error;

    fn try_from(params: CriteriaParams) -> Result<Self> {
        Criteria::builder()
            .page_id(params.page_id)
            .per_page(params.per_page)
            .status(params.status)
            .maybe_query(params.query)
            .author_id(params.author_id)
            .build()
    }
}

/// A criteria type the service layer can page and filter with
pub trait FilterCriteria: Send + Sync {
    /// The embedded base criteria
    fn base(&self) -> &Criteria;

    /// Window for the requested page
    fn to_pageable(&self, default_sort: &Sort) -> Pageable {
        self.base().to_pageable(default_sort)
    }

    /// Restriction this criteria stands for
    ///
    /// # Errors
    ///
    /// [`Error::NotSupported`] unless the concrete type overrides it.
    fn to_specification(&self, _predicates: &Predicates) -> Result<Specification> {
        Err(Error::NotSupported(format!(
            "{} does not define a specification",
            std::any::type_name::<Self>()
        )))
    }
}

impl FilterCriteria for Criteria {
    fn base(&self) -> &Criteria {
        self
    }
}
