//! Repository error types
//!
//! Storage adapters report failures through [`RepositoryError`], which the
//! service layer converts into the domain taxonomy in [`crate::error::Error`].
//!
//! # Example
//!
//! ```rust
//! use entity_commons::repository::{RepositoryError, RepositoryErrorKind};
//!
//! let error = RepositoryError::not_found("Post", "0190c7b2-6f7c-7cc2-8d2e-1f6b1c2d3e4f");
//! assert!(matches!(error.kind, RepositoryErrorKind::NotFound));
//! assert!(!error.is_retriable());
//! ```

use std::fmt;

/// Repository call that failed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryOperation {
    /// Loading one row by id
    FindById,
    /// Loading a page of rows matching a specification
    FindAll,
    /// Counting rows matching a specification
    Count,
    /// Checking whether an id is taken
    Exists,
    /// Writing a new row
    Insert,
    /// Overwriting an existing row
    Save,
}

impl fmt::Display for RepositoryOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::FindById => write!(f, "find_by_id"),
            Self::FindAll => write!(f, "find_all"),
            Self::Count => write!(f, "count"),
            Self::Exists => write!(f, "exists"),
            Self::Insert => write!(f, "insert"),
            Self::Save => write!(f, "save"),
        }
    }
}

/// Category of repository error
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RepositoryErrorKind {
    /// Row was not found
    NotFound,
    /// Row already exists (duplicate key)
    AlreadyExists,
    /// Database constraint violation
    ConstraintViolation,
    /// Row rejected before reaching the database
    ValidationFailed,
    /// Failed to connect to database
    ConnectionFailed,
    /// Operation timed out
    Timeout,
    /// Underlying database error
    DatabaseError,
    /// Other unclassified error
    Other,
}

impl fmt::Display for RepositoryErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::NotFound => write!(f, "not_found"),
            Self::AlreadyExists => write!(f, "already_exists"),
            Self::ConstraintViolation => write!(f, "constraint_violation"),
            Self::ValidationFailed => write!(f, "validation_failed"),
            Self::ConnectionFailed => write!(f, "connection_failed"),
            Self::Timeout => write!(f, "timeout"),
            Self::DatabaseError => write!(f, "database_error"),
            Self::Other => write!(f, "other"),
        }
    }
}

/// Structured repository error with operation context
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RepositoryError {
    /// The repository call that failed
    pub operation: RepositoryOperation,
    /// The category of error
    pub kind: RepositoryErrorKind,
    /// Human-readable error message
    pub message: String,
    /// The kind of entity involved (e.g. "Post")
    pub entity_type: Option<String>,
    /// The id of the entity involved
    pub entity_id: Option<String>,
}

impl RepositoryError {
    /// Create a new repository error
    pub fn new(
        operation: RepositoryOperation,
        kind: RepositoryErrorKind,
        message: impl Into<String>,
    ) -> Self {
        Self {
            operation,
            kind,
            message: message.into(),
            entity_type: None,
            entity_id: None,
        }
    }

    /// Row with the given id does not exist
    pub fn not_found(entity_type: impl Into<String>, entity_id: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::NotFound,
            "Entity not found",
        )
        .with_entity(entity_type, entity_id)
    }

    /// Row with the given identifier is already stored
    pub fn already_exists(entity_type: impl Into<String>, identifier: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Insert,
            RepositoryErrorKind::AlreadyExists,
            "Entity already exists",
        )
        .with_entity(entity_type, identifier)
    }

    /// Row rejected by adapter-side validation
    pub fn validation_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::Insert,
            RepositoryErrorKind::ValidationFailed,
            message,
        )
    }

    /// Database refused the write because of a constraint
    pub fn constraint_violation(
        operation: RepositoryOperation,
        message: impl Into<String>,
    ) -> Self {
        Self::new(operation, RepositoryErrorKind::ConstraintViolation, message)
    }

    /// Connection to the database could not be established
    pub fn connection_failed(message: impl Into<String>) -> Self {
        Self::new(
            RepositoryOperation::FindById,
            RepositoryErrorKind::ConnectionFailed,
            message,
        )
    }

    /// Query exceeded its deadline
    pub fn timeout(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::Timeout, message)
    }

    /// Any other database failure
    pub fn database_error(operation: RepositoryOperation, message: impl Into<String>) -> Self {
        Self::new(operation, RepositoryErrorKind::DatabaseError, message)
    }

    /// Add entity context to an existing error
    #[must_use]
    pub fn with_entity(
        mut self,
        entity_type: impl Into<String>,
        entity_id: impl Into<String>,
    ) -> Self {
        self.entity_type = Some(entity_type.into());
        self.entity_id = Some(entity_id.into());
        self
    }

    /// Set the operation that caused the error
    #[must_use]
    pub fn with_operation(mut self, operation: RepositoryOperation) -> Self {
        self.operation = operation;
        self
    }

    /// Transient errors that may succeed on retry
    pub fn is_retriable(&self) -> bool {
        matches!(
            self.kind,
            RepositoryErrorKind::ConnectionFailed | RepositoryErrorKind::Timeout
        )
    }
}

impl fmt::Display for RepositoryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Repository {} error during {}: {}",
            self.kind, self.operation, self.message
        )?;
        if let (Some(entity_type), Some(entity_id)) = (&self.entity_type, &self.entity_id) {
            write!(f, " [{}: {}]", entity_type, entity_id)?;
        }
        Ok(())
    }
}

impl std::error::Error for RepositoryError {}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_operation_display() {
        assert_eq!(RepositoryOperation::FindById.to_string(), "find_by_id");
        assert_eq!(RepositoryOperation::FindAll.to_string(), "find_all");
        assert_eq!(RepositoryOperation::Insert.to_string(), "insert");
        assert_eq!(RepositoryOperation::Save.to_string(), "save");
    }

    #[test]
    fn test_not_found_carries_entity() {
        let error = RepositoryError::not_found("Post", "p-1");
        assert_eq!(error.operation, RepositoryOperation::FindById);
        assert_eq!(error.entity_type.as_deref(), Some("Post"));
        assert_eq!(error.entity_id.as_deref(), Some("p-1"));
    }

    #[test]
    fn test_already_exists_is_an_insert_failure() {
        let error = RepositoryError::already_exists("Post", "p-1");
        assert_eq!(error.operation, RepositoryOperation::Insert);
        assert_eq!(error.kind, RepositoryErrorKind::AlreadyExists);
    }

    #[test]
    fn test_with_operation_overrides() {
        let error = RepositoryError::connection_failed("refused")
            .with_operation(RepositoryOperation::Save);
        assert_eq!(error.operation, RepositoryOperation::Save);
    }

    #[test]
    fn test_retriable_kinds() {
        assert!(RepositoryError::connection_failed("refused").is_retriable());
        assert!(RepositoryError::timeout(RepositoryOperation::Count, "slow").is_retriable());
        assert!(!RepositoryError::not_found("Post", "1").is_retriable());
        assert!(!RepositoryError::validation_failed("bad").is_retriable());
        assert!(
            !RepositoryError::database_error(RepositoryOperation::Save, "syntax").is_retriable()
        );
    }

    #[test]
    fn test_display_with_and_without_entity() {
        let plain = RepositoryError::database_error(RepositoryOperation::Count, "boom");
        assert_eq!(
            plain.to_string(),
            "Repository database_error error during count: boom"
        );

        let scoped = RepositoryError::not_found("Post", "p-1");
        assert!(scoped.to_string().ends_with("[Post: p-1]"));
    }
}
