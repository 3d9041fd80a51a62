//! Configuration management using Figment
//!
//! Settings are loaded from the following sources, highest precedence first:
//! 1. Environment variables (prefix `COMMONS_`, `__` between nesting levels,
//!    e.g. `COMMONS_SECURITY__JWT__SECRET`)
//! 2. A TOML file (`./config.toml` unless a path is given)
//! 3. Default values
//!
//! ```toml
//! [service]
//! name = "blog"
//! log_level = "debug"
//!
//! [security.jwt]
//! secret = "c2VjcmV0LWtleS1mb3ItdGVzdGluZy1wdXJwb3Nlcy1vbmx5"
//! access_secs = 600
//!
//! [search]
//! search_language = "english"
//! ```

use std::path::Path;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::model::TokenType;
use crate::specification::FieldConventions;

/// Environment variable prefix
pub const ENV_PREFIX: &str = "COMMONS_";

/// Message carried by the startup failure when no JWT secret is set
pub const MISSING_JWT_SECRET: &str =
    "JWT secret must be configured in application properties with prefix 'security.jwt'";

/// Root settings
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Settings {
    /// Service identity and logging
    #[serde(default)]
    pub service: ServiceSettings,

    /// Token and password settings
    #[serde(default)]
    pub security: SecuritySettings,

    /// Column names used by the standard predicates
    #[serde(default)]
    pub search: FieldConventions,
}

impl Settings {
    /// Load from `./config.toml` (if present) and the environment
    pub fn load() -> Result<Self> {
        Self::load_from("config.toml")
    }

    /// Load from the given TOML file (if present) and the environment
    pub fn load_from(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if path.exists() {
            tracing::info!("Loading configuration from: {}", path.display());
        } else {
            tracing::debug!("No configuration file at {}", path.display());
        }

        let settings = Self::figment(path).extract()?;
        Ok(settings)
    }

    /// The provider chain behind [`Settings::load_from`]
    ///
    /// Exposed so applications can merge their own providers on top.
    pub fn figment(path: impl AsRef<Path>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Settings::default()))
            .merge(Toml::file(path.as_ref()))
            .merge(Env::prefixed(ENV_PREFIX).split("__"))
    }
}

/// Service identity
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceSettings {
    /// Service name, attached to log output
    #[serde(default = "default_service_name")]
    pub name: String,

    /// Log filter directive (default: `info`)
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ServiceSettings {
    fn default() -> Self {
        Self {
            name: default_service_name(),
            log_level: default_log_level(),
        }
    }
}

/// Everything under `security`
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SecuritySettings {
    /// Token signing and lifetimes
    #[serde(default)]
    pub jwt: JwtSettings,

    /// Password hashing costs
    #[serde(default)]
    pub password: PasswordSettings,
}

/// Token settings under `security.jwt`
#[derive(Clone, Serialize, Deserialize)]
pub struct JwtSettings {
    /// HMAC signing secret
    ///
    /// Required only when the default token service is used.
    #[serde(default)]
    pub secret: Option<String>,

    /// Access token lifetime (default: 15 minutes)
    #[serde(default = "default_access_secs")]
    pub access_secs: u64,

    /// Refresh token lifetime (default: 7 days)
    #[serde(default = "default_refresh_secs")]
    pub refresh_secs: u64,

    /// Activation token lifetime (default: 1 day)
    #[serde(default = "default_activation_secs")]
    pub activation_secs: u64,

    /// Password reset token lifetime (default: 1 hour)
    #[serde(default = "default_reset_secs")]
    pub reset_secs: u64,
}

impl Default for JwtSettings {
    fn default() -> Self {
        Self {
            secret: None,
            access_secs: default_access_secs(),
            refresh_secs: default_refresh_secs(),
            activation_secs: default_activation_secs(),
            reset_secs: default_reset_secs(),
        }
    }
}

impl std::fmt::Debug for JwtSettings {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtSettings")
            .field("secret", &self.secret.as_ref().map(|_| "[REDACTED]"))
            .field("access_secs", &self.access_secs)
            .field("refresh_secs", &self.refresh_secs)
            .field("activation_secs", &self.activation_secs)
            .field("reset_secs", &self.reset_secs)
            .finish()
    }
}

impl JwtSettings {
    /// The signing secret, or a configuration error if it is missing or blank
    pub fn require_secret(&self) -> Result<&str> {
        match self.secret.as_deref().map(str::trim) {
            Some(secret) if !secret.is_empty() => Ok(secret),
            _ => Err(Error::config(MISSING_JWT_SECRET)),
        }
    }

    /// Access token lifetime
    pub fn access_ttl(&self) -> Duration {
        Duration::from_secs(self.access_secs)
    }

    /// Refresh token lifetime
    pub fn refresh_ttl(&self) -> Duration {
        Duration::from_secs(self.refresh_secs)
    }

    /// Activation token lifetime
    pub fn activation_ttl(&self) -> Duration {
        Duration::from_secs(self.activation_secs)
    }

    /// Password reset token lifetime
    pub fn reset_ttl(&self) -> Duration {
        Duration::from_secs(self.reset_secs)
    }

    /// Default lifetime for a token type
    ///
    /// Custom tokens get the access lifetime.
    pub fn ttl_for(&self, token_type: TokenType) -> Duration {
        match token_type {
            TokenType::Access | TokenType::Custom => self.access_ttl(),
            TokenType::Refresh => self.refresh_ttl(),
            TokenType::Activation => self.activation_ttl(),
            TokenType::PasswordReset => self.reset_ttl(),
        }
    }
}

/// Argon2id cost parameters under `security.password`
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PasswordSettings {
    /// Memory cost in KiB (default: 65536 = 64 MiB)
    #[serde(default = "default_memory_cost")]
    pub memory_cost_kib: u32,

    /// Iterations (default: 3)
    #[serde(default = "default_time_cost")]
    pub time_cost: u32,

    /// Parallelism degree (default: 4)
    #[serde(default = "default_parallelism")]
    pub parallelism: u32,

    /// Shortest password accepted for hashing (default: 8)
    #[serde(default = "default_min_length")]
    pub min_password_length: usize,
}

impl Default for PasswordSettings {
    fn default() -> Self {
        Self {
            memory_cost_kib: default_memory_cost(),
            time_cost: default_time_cost(),
            parallelism: default_parallelism(),
            min_password_length: default_min_length(),
        }
    }
}

fn default_service_name() -> String {
    "entity-commons".to_string()
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_access_secs() -> u64 {
    900
}

fn default_refresh_secs() -> u64 {
    604_800
}

fn default_activation_secs() -> u64 {
    86_400
}

fn default_reset_secs() -> u64 {
    3_600
}

fn default_memory_cost() -> u32 {
    65536
}

fn default_time_cost() -> u32 {
    3
}

fn default_parallelism() -> u32 {
    4
}

fn default_min_length() -> usize {
    8
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_config(contents: &str) -> tempfile::NamedTempFile {
        let mut file = tempfile::Builder::new().suffix(".toml").tempfile().unwrap();
        file.write_all(contents.as_bytes()).unwrap();
        file
    }

    #[test]
    fn test_default_settings() {
        let settings = Settings::default();
        assert_eq!(settings.service.log_level, "info");
        assert_eq!(settings.security.jwt.access_secs, 900);
        assert_eq!(settings.security.jwt.refresh_secs, 604_800);
        assert_eq!(settings.security.jwt.activation_secs, 86_400);
        assert_eq!(settings.security.jwt.reset_secs, 3_600);
        assert!(settings.security.jwt.secret.is_none());
        assert_eq!(settings.search.search_column, "fts");
    }

    #[test]
    fn test_load_from_file() {
        let file = write_config(
            r#"
            [service]
            name = "blog"

            [security.jwt]
            secret = "top-secret"
            access_secs = 60

            [search]
            search_language = "english"
            "#,
        );

        let settings = Settings::load_from(file.path()).unwrap();
        assert_eq!(settings.service.name, "blog");
        assert_eq!(settings.service.log_level, "info");
        assert_eq!(settings.security.jwt.require_secret().unwrap(), "top-secret");
        assert_eq!(settings.security.jwt.access_ttl(), Duration::from_secs(60));
        assert_eq!(settings.security.jwt.refresh_secs, 604_800);
        assert_eq!(settings.search.search_language, "english");
        assert_eq!(settings.search.search_column, "fts");
    }

    #[test]
    fn test_missing_file_yields_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let settings = Settings::load_from(dir.path().join("absent.toml")).unwrap();
        assert_eq!(settings.security.password.time_cost, 3);
    }

    #[test]
    fn test_require_secret_rejects_missing_and_blank() {
        let mut jwt = JwtSettings::default();
        let err = jwt.require_secret().unwrap_err();
        assert!(err.to_string().contains("JWT secret must be configured"));

        jwt.secret = Some("   ".to_string());
        assert!(matches!(jwt.require_secret(), Err(Error::Config(_))));
    }

    #[test]
    fn test_ttl_per_token_type() {
        let jwt = JwtSettings::default();
        assert_eq!(jwt.ttl_for(TokenType::Access), Duration::from_secs(900));
        assert_eq!(jwt.ttl_for(TokenType::PasswordReset), Duration::from_secs(3_600));
        assert_eq!(jwt.ttl_for(TokenType::Custom), jwt.access_ttl());
    }

    #[test]
    fn test_debug_hides_secret() {
        let jwt = JwtSettings {
            secret: Some("hunter2".to_string()),
            ..JwtSettings::default()
        };
        let rendered = format!("{jwt:?}");
        assert!(!rendered.contains("hunter2"));
        assert!(rendered.contains("REDACTED"));
    }
}
