//! Authentication request and response bodies
//!
//! JSON field names are camelCase (`activateToken`, `newPassword`, ...).

use serde::{Deserialize, Serialize};

use super::validation::{Validate, ValidationErrors, Violations, MAX_FIELD_LENGTH};

const USERNAME_EMPTY: &str = "Username can not be empty.";
const PASSWORD_EMPTY: &str = "Password can not be empty.";
const ACTIVATE_TOKEN_EMPTY: &str = "Activate token can not be empty.";
const REFRESH_TOKEN_EMPTY: &str = "Refresh token can not be empty.";
const RESET_TOKEN_EMPTY: &str = "Reset token can not be empty.";

fn username_length() -> String {
    format!("Username length must be in 1 - {MAX_FIELD_LENGTH} symbols.")
}

fn password_length() -> String {
    format!("Password length must be in 1 - {MAX_FIELD_LENGTH} symbols.")
}

fn check_username(v: &mut Violations, field: &str, value: &str) {
    v.not_empty(field, value, USERNAME_EMPTY)
        .length(field, value, 1, MAX_FIELD_LENGTH, &username_length());
}

fn check_password(v: &mut Violations, field: &str, value: &str) {
    v.not_empty(field, value, PASSWORD_EMPTY)
        .length(field, value, 1, MAX_FIELD_LENGTH, &password_length());
}

/// Login credentials
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthRequest {
    /// Login name
    #[serde(default)]
    pub username: String,
    /// Plain-text password
    #[serde(default)]
    pub password: String,
}

impl std::fmt::Debug for AuthRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthRequest")
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for AuthRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Violations::new();
        check_username(&mut v, "username", &self.username);
        check_password(&mut v, "password", &self.password);
        v.finish()
    }
}

/// Start of password recovery
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RestoreRequest {
    /// Account to recover
    #[serde(default)]
    pub username: String,
}

impl Validate for RestoreRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Violations::new();
        check_username(&mut v, "username", &self.username);
        v.finish()
    }
}

/// Account activation
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActivateRequest {
    /// Token from the activation link
    #[serde(default)]
    pub activate_token: String,
}

impl Validate for ActivateRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Violations::new()
            .not_empty("activateToken", &self.activate_token, ACTIVATE_TOKEN_EMPTY)
            .finish()
    }
}

/// Access token renewal
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshRequest {
    /// Previously issued refresh token
    #[serde(default)]
    pub refresh_token: String,
}

impl Validate for RefreshRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        Violations::new()
            .not_empty("refreshToken", &self.refresh_token, REFRESH_TOKEN_EMPTY)
            .finish()
    }
}

/// Completion of password recovery
#[derive(Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ResetRequest {
    /// Token from the reset link
    #[serde(default)]
    pub reset_token: String,
    /// Replacement password
    #[serde(default)]
    pub new_password: String,
}

impl std::fmt::Debug for ResetRequest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResetRequest")
            .field("reset_token", &"[REDACTED]")
            .field("new_password", &"[REDACTED]")
            .finish()
    }
}

impl Validate for ResetRequest {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut v = Violations::new();
        v.not_empty("resetToken", &self.reset_token, RESET_TOKEN_EMPTY);
        check_password(&mut v, "newPassword", &self.new_password);
        v.finish()
    }
}

/// Token pair returned after login or refresh
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthResponse {
    /// Short-lived access token
    pub access_token: String,
    /// Refresh token
    pub refresh_token: String,
}

impl AuthResponse {
    /// Pair two issued tokens
    pub fn new(access_token: impl Into<String>, refresh_token: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: refresh_token.into(),
        }
    }
}

impl std::fmt::Debug for AuthResponse {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthResponse")
            .field("access_token", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .finish()
    }
}
