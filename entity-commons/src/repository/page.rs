//! Pagination and sorting types for repository queries
//!
//! # Example
//!
//! ```rust
//! use entity_commons::repository::{OrderDirection, Pageable, Sort};
//!
//! let pageable = Pageable::page(3, 10, Sort::by("created", OrderDirection::Desc));
//! assert_eq!(pageable.offset, 20);
//! assert_eq!(pageable.limit, 10);
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

/// Sort direction
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OrderDirection {
    /// Ascending order (A-Z, 0-9, oldest first)
    #[default]
    Asc,
    /// Descending order (Z-A, 9-0, newest first)
    Desc,
}

impl OrderDirection {
    pub(crate) fn to_order(self) -> sea_query::Order {
        match self {
            Self::Asc => sea_query::Order::Asc,
            Self::Desc => sea_query::Order::Desc,
        }
    }
}

impl fmt::Display for OrderDirection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Asc => write!(f, "asc"),
            Self::Desc => write!(f, "desc"),
        }
    }
}

/// One column of a sort
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SortOrder {
    /// Column name
    pub field: String,
    /// Direction
    #[serde(default)]
    pub direction: OrderDirection,
}

/// Ordered list of sort columns; empty means unsorted
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sort(Vec<SortOrder>);

impl Sort {
    /// No ordering
    #[must_use]
    pub fn unsorted() -> Self {
        Self::default()
    }

    /// Single-column sort
    #[must_use]
    pub fn by(field: impl Into<String>, direction: OrderDirection) -> Self {
        Self::unsorted().then(field, direction)
    }

    /// Append a tie-breaking column
    #[must_use]
    pub fn then(mut self, field: impl Into<String>, direction: OrderDirection) -> Self {
        self.0.push(SortOrder {
            field: field.into(),
            direction,
        });
        self
    }

    /// Whether no column is set
    pub fn is_unsorted(&self) -> bool {
        self.0.is_empty()
    }

    /// Columns in priority order
    pub fn orders(&self) -> &[SortOrder] {
        &self.0
    }
}

/// Offset/limit window plus sort, handed to the repository
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pageable {
    /// Rows to skip
    pub offset: u64,
    /// Maximum rows to return
    pub limit: u64,
    /// Sort applied after any ordering the specification contributes
    pub sort: Sort,
}

impl Pageable {
    /// Explicit offset and limit
    #[must_use]
    pub fn new(offset: u64, limit: u64, sort: Sort) -> Self {
        Self {
            offset,
            limit,
            sort,
        }
    }

    /// Window for a 1-based page number
    #[must_use]
    pub fn page(page_number: u64, page_size: u64, sort: Sort) -> Self {
        Self::new(page_number.saturating_sub(1) * page_size, page_size, sort)
    }

    /// 1-based page number this window starts on
    pub fn page_number(&self) -> u64 {
        if self.limit == 0 {
            1
        } else {
            self.offset / self.limit + 1
        }
    }
}

/// One page of results together with the total row count
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Page<T> {
    /// Rows on this page
    pub items: Vec<T>,
    /// Rows across all pages
    pub total: u64,
    /// Current page number (1-indexed)
    pub page: u64,
    /// Requested page size
    pub per_page: u64,
}

impl<T> Page<T> {
    /// Assemble a page from the rows fetched for `pageable`
    pub fn new(items: Vec<T>, pageable: &Pageable, total: u64) -> Self {
        Self {
            items,
            total,
            page: pageable.page_number(),
            per_page: pageable.limit,
        }
    }

    /// Number of pages needed for `total` rows
    pub fn total_pages(&self) -> u64 {
        if self.per_page == 0 {
            0
        } else {
            self.total.div_ceil(self.per_page)
        }
    }

    /// Whether a later page exists
    pub fn has_next(&self) -> bool {
        self.page < self.total_pages()
    }

    /// Whether an earlier page exists
    pub fn has_previous(&self) -> bool {
        self.page > 1
    }

    /// Convert the rows, keeping the paging data
    pub fn map<U>(self, f: impl FnMut(T) -> U) -> Page<U> {
        Page {
            items: self.items.into_iter().map(f).collect(),
            total: self.total,
            page: self.page,
            per_page: self.per_page,
        }
    }
}
