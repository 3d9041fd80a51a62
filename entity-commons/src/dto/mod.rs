//! Transfer objects shared by services
//!
//! Authentication bodies, the error response body and field validation.

mod auth;
mod validation;

pub use auth::{
    ActivateRequest, AuthRequest, AuthResponse, RefreshRequest, ResetRequest, RestoreRequest,
};
pub use validation::{Validate, ValidationErrors, MAX_FIELD_LENGTH};

pub use crate::error::ErrorResponse;
