//! Repository port and pagination types
//!
//! - [`Repository`]: storage port the service layer drives
//! - [`Pageable`], [`Sort`], [`Page`]: windowing and result pages
//! - [`RepositoryError`]: structured adapter failures

mod error;
mod page;
mod traits;

pub use error::{RepositoryError, RepositoryErrorKind, RepositoryOperation};
pub use page::{OrderDirection, Page, Pageable, Sort, SortOrder};
pub use traits::{Repository, RepositoryResult};
