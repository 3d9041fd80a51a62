//! Token purpose tags

use std::fmt;

use serde::{Deserialize, Serialize};

/// What a token is issued for
///
/// Carried in the token's `type` claim and used to pick its default
/// lifetime from [`JwtSettings`](crate::config::JwtSettings).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TokenType {
    /// Short-lived API access
    Access,
    /// Exchanged for a new access token
    Refresh,
    /// Account activation link
    Activation,
    /// Password reset link
    PasswordReset,
    /// Application-defined purpose
    Custom,
}

impl TokenType {
    /// Claim value
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Access => "ACCESS",
            Self::Refresh => "REFRESH",
            Self::Activation => "ACTIVATION",
            Self::PasswordReset => "PASSWORD_RESET",
            Self::Custom => "CUSTOM",
        }
    }
}

impl fmt::Display for TokenType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
