//! Error types and HTTP response conversion
//!
//! The domain taxonomy (`NotFound`, `AccessDenied`, `AlreadyExists`,
//! `InvalidData`, `InvalidToken`, `UploadFailed`, `InsufficientBalance`) is
//! what services raise for business-rule failures. Each of those carries an
//! optional message; when absent, a generic message is rendered instead.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::model::Status;
use crate::repository::{RepositoryError, RepositoryErrorKind};

/// Field name to per-field error description
pub type FieldErrors = BTreeMap<String, String>;

/// Result type alias using the crate error
pub type Result<T> = std::result::Result<T, Error>;

/// Main error type for the crate
///
/// Large error variants are boxed to reduce stack size
#[derive(Debug, Error)]
pub enum Error {
    /// Requested resource does not exist or is not visible
    #[error("{}", .0.as_deref().unwrap_or("Resource not found"))]
    NotFound(Option<String>),

    /// Caller is not permitted to perform the operation
    #[error("{}", .0.as_deref().unwrap_or("Access denied"))]
    AccessDenied(Option<String>),

    /// A resource with the same identity already exists
    #[error("{}", .0.as_deref().unwrap_or("Resource already exists"))]
    AlreadyExists(Option<String>),

    /// Submitted data failed validation
    #[error("{}", .message.as_deref().unwrap_or("Invalid data"))]
    InvalidData {
        /// Overall message
        message: Option<String>,
        /// Per-field errors, empty when the failure is not field-specific
        fields: FieldErrors,
    },

    /// Token is malformed, expired or of the wrong type
    #[error("{}", .0.as_deref().unwrap_or("Invalid token"))]
    InvalidToken(Option<String>),

    /// File upload could not be completed
    #[error("{}", .0.as_deref().unwrap_or("Upload failed"))]
    UploadFailed(Option<String>),

    /// Account balance does not cover the operation
    #[error("{}", .0.as_deref().unwrap_or("Insufficient balance"))]
    InsufficientBalance(Option<String>),

    /// Argument outside its permitted range (builders, setters)
    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    /// Extension point that the concrete type has not implemented
    #[error("Not supported: {0}")]
    NotSupported(String),

    /// Status change that the lifecycle table does not allow
    #[error("Illegal status transition from {from} to {to}")]
    IllegalTransition {
        /// Current status
        from: Status,
        /// Requested status
        to: Status,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(Box<figment::Error>),

    /// Structured repository error with operation context
    #[error("{0}")]
    Repository(RepositoryError),

    /// Authentication error (password hashing, token generation, etc.)
    #[error("Auth error: {0}")]
    Auth(String),

    /// JWT error (requires `jwt` feature)
    #[cfg(feature = "jwt")]
    #[error("JWT error: {0}")]
    Jwt(Box<jsonwebtoken::errors::Error>),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl Error {
    /// Not-found error with a message
    pub fn not_found(message: impl Into<String>) -> Self {
        Self::NotFound(Some(message.into()))
    }

    /// Access-denied error with a message
    pub fn access_denied(message: impl Into<String>) -> Self {
        Self::AccessDenied(Some(message.into()))
    }

    /// Already-exists error with a message
    pub fn already_exists(message: impl Into<String>) -> Self {
        Self::AlreadyExists(Some(message.into()))
    }

    /// Invalid-data error without field details
    pub fn invalid_data(message: impl Into<String>) -> Self {
        Self::InvalidData {
            message: Some(message.into()),
            fields: FieldErrors::new(),
        }
    }

    /// Invalid-data error carrying per-field errors
    pub fn invalid_fields(fields: FieldErrors) -> Self {
        Self::InvalidData {
            message: Some("Validation failed".to_string()),
            fields,
        }
    }

    /// Invalid-token error with a message
    pub fn invalid_token(message: impl Into<String>) -> Self {
        Self::InvalidToken(Some(message.into()))
    }

    /// Upload-failure error with a message
    pub fn upload_failed(message: impl Into<String>) -> Self {
        Self::UploadFailed(Some(message.into()))
    }

    /// Insufficient-balance error with a message
    pub fn insufficient_balance(message: impl Into<String>) -> Self {
        Self::InsufficientBalance(Some(message.into()))
    }

    /// Configuration error built from a plain message
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(Box::new(figment::Error::from(message.into())))
    }

    /// The response body this error renders to
    pub fn to_error_response(&self) -> ErrorResponse {
        match self {
            Self::InvalidData { fields, .. } if !fields.is_empty() => {
                ErrorResponse::message_only(self.to_string()).with_errors(fields.clone())
            }
            Self::Config(_) | Self::Internal(_) => {
                ErrorResponse::message_only("Internal server error")
            }
            Self::Repository(_) => ErrorResponse::message_only("Repository operation failed"),
            _ => ErrorResponse::message_only(self.to_string()),
        }
    }
}

/// Error response body
///
/// A message plus an optional map of field name to per-field error.
///
/// # Example
///
/// ```rust
/// use entity_commons::error::ErrorResponse;
///
/// let body = ErrorResponse::message_only("Post not found");
/// assert!(body.errors.is_none());
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorResponse {
    /// Error message
    pub message: String,

    /// Optional per-field errors
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub errors: Option<FieldErrors>,
}

impl ErrorResponse {
    /// Create a response carrying both a message and field errors
    pub fn new(message: impl Into<String>, errors: Option<FieldErrors>) -> Self {
        Self {
            message: message.into(),
            errors,
        }
    }

    /// Create a response carrying only a message
    pub fn message_only(message: impl Into<String>) -> Self {
        Self::new(message, None)
    }

    /// Attach field errors
    #[must_use]
    pub fn with_errors(mut self, errors: FieldErrors) -> Self {
        self.errors = Some(errors);
        self
    }
}

impl std::fmt::Display for ErrorResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.message)
    }
}

#[cfg(feature = "http")]
impl Error {
    /// HTTP status code for this error
    pub fn status_code(&self) -> axum::http::StatusCode {
        use axum::http::StatusCode;

        match self {
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::AccessDenied(_) => StatusCode::FORBIDDEN,
            Self::AlreadyExists(_) | Self::IllegalTransition { .. } => StatusCode::CONFLICT,
            Self::InvalidData { .. } => StatusCode::UNPROCESSABLE_ENTITY,
            Self::InvalidToken(_) | Self::Auth(_) => StatusCode::UNAUTHORIZED,
            #[cfg(feature = "jwt")]
            Self::Jwt(_) => StatusCode::UNAUTHORIZED,
            Self::InsufficientBalance(_) => StatusCode::PAYMENT_REQUIRED,
            Self::InvalidArgument(_) => StatusCode::BAD_REQUEST,
            Self::NotSupported(_) => StatusCode::NOT_IMPLEMENTED,
            Self::Repository(e) => match e.kind {
                RepositoryErrorKind::Timeout => StatusCode::GATEWAY_TIMEOUT,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
            Self::UploadFailed(_) | Self::Config(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

#[cfg(feature = "http")]
impl axum::response::IntoResponse for Error {
    fn into_response(self) -> axum::response::Response {
        match &self {
            Self::Repository(e) => tracing::error!(
                operation = %e.operation,
                kind = %e.kind,
                retriable = e.is_retriable(),
                "Repository error: {}", e.message
            ),
            Self::Config(e) => tracing::error!("Configuration error: {}", e),
            Self::Internal(msg) => tracing::error!("Internal error: {}", msg),
            Self::UploadFailed(msg) => tracing::error!(
                "Upload failed: {}",
                msg.as_deref().unwrap_or("no details")
            ),
            _ => {}
        }

        let status = self.status_code();
        (status, axum::Json(self.to_error_response())).into_response()
    }
}

impl From<figment::Error> for Error {
    fn from(err: figment::Error) -> Self {
        Error::Config(Box::new(err))
    }
}

#[cfg(feature = "jwt")]
impl From<jsonwebtoken::errors::Error> for Error {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        Error::Jwt(Box::new(err))
    }
}

impl From<RepositoryError> for Error {
    fn from(err: RepositoryError) -> Self {
        let described = match (&err.entity_type, &err.entity_id) {
            (Some(entity_type), Some(entity_id)) => format!("{entity_type} {entity_id}"),
            _ => err.message.clone(),
        };

        match err.kind {
            RepositoryErrorKind::NotFound => Error::not_found(format!("{described} not found")),
            RepositoryErrorKind::AlreadyExists | RepositoryErrorKind::ConstraintViolation => {
                Error::already_exists(described)
            }
            RepositoryErrorKind::ValidationFailed => Error::invalid_data(err.message),
            _ => Error::Repository(err),
        }
    }
}
