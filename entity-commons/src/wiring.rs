//! Default component wiring
//!
//! Applications hand in whatever password encoder and token service they
//! already have; [`CommonComponentsBuilder::build`] fills the gaps with
//! [`Argon2PasswordEncoder`] and [`JwtTokenService`]. The JWT secret is only
//! required when the default token service is actually built.
//!
//! ```rust,ignore
//! use entity_commons::config::Settings;
//! use entity_commons::wiring::CommonComponents;
//!
//! let settings = Settings::load()?;
//! let components = CommonComponents::builder().build(&settings)?;
//!
//! let hash = components.password_encoder().encode("correct horse")?;
//! ```

use std::sync::Arc;

use crate::auth::{Argon2PasswordEncoder, JwtTokenService, PasswordEncoder, TokenService};
use crate::config::Settings;
use crate::error::Result;

/// Shared security components
#[derive(Clone)]
pub struct CommonComponents {
    password_encoder: Arc<dyn PasswordEncoder>,
    token_service: Arc<dyn TokenService>,
}

impl std::fmt::Debug for CommonComponents {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommonComponents").finish_non_exhaustive()
    }
}

impl CommonComponents {
    /// Start wiring
    pub fn builder() -> CommonComponentsBuilder {
        CommonComponentsBuilder::default()
    }

    /// Password encoder in use
    pub fn password_encoder(&self) -> Arc<dyn PasswordEncoder> {
        Arc::clone(&self.password_encoder)
    }

    /// Token service in use
    pub fn token_service(&self) -> Arc<dyn TokenService> {
        Arc::clone(&self.token_service)
    }
}

/// Collects application-supplied components
#[derive(Default)]
pub struct CommonComponentsBuilder {
    password_encoder: Option<Arc<dyn PasswordEncoder>>,
    token_service: Option<Arc<dyn TokenService>>,
}

impl CommonComponentsBuilder {
    /// Use this encoder instead of the Argon2id default
    #[must_use]
    pub fn password_encoder(mut self, encoder: Arc<dyn PasswordEncoder>) -> Self {
        self.password_encoder = Some(encoder);
        self
    }

    /// Use this token service instead of the JWT default
    #[must_use]
    pub fn token_service(mut self, service: Arc<dyn TokenService>) -> Self {
        self.token_service = Some(service);
        self
    }

    /// Fill in missing components from `settings`
    ///
    /// Fails with a configuration error when the default token service is
    /// needed and `security.jwt.secret` is missing or blank, or when the
    /// password cost parameters are rejected.
    pub fn build(self, settings: &Settings) -> Result<CommonComponents> {
        let password_encoder = match self.password_encoder {
            Some(encoder) => encoder,
            None => {
                tracing::debug!("Using default Argon2id password encoder");
                Arc::new(Argon2PasswordEncoder::new(&settings.security.password)?)
            }
        };

        let token_service = match self.token_service {
            Some(service) => service,
            None => {
                tracing::debug!("Using default JWT token service");
                Arc::new(JwtTokenService::new(&settings.security.jwt)?)
            }
        };

        Ok(CommonComponents {
            password_encoder,
            token_service,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::{TokenClaims, TokenParameters};
    use crate::error::Error;
    use crate::model::TokenType;

    struct PlainEncoder;

    impl PasswordEncoder for PlainEncoder {
        fn encode(&self, raw: &str) -> Result<String> {
            Ok(format!("plain:{raw}"))
        }

        fn matches(&self, raw: &str, encoded: &str) -> Result<bool> {
            Ok(encoded.strip_prefix("plain:") == Some(raw))
        }
    }

    struct FixedTokens;

    impl TokenService for FixedTokens {
        fn create(&self, params: &TokenParameters) -> Result<String> {
            Ok(format!("{}:{}", params.token_type(), params.subject()))
        }

        fn parse(&self, _token: &str) -> Result<TokenClaims> {
            Err(Error::InvalidToken(None))
        }

        fn is_expired(&self, _token: &str) -> Result<bool> {
            Ok(false)
        }
    }

    fn settings_with_secret(secret: Option<&str>) -> Settings {
        let mut settings = Settings::default();
        settings.security.jwt.secret = secret.map(str::to_string);
        settings.security.password.memory_cost_kib = 1024;
        settings.security.password.time_cost = 1;
        settings.security.password.parallelism = 1;
        settings
    }

    #[test]
    fn test_defaults_require_secret() {
        let err = CommonComponents::builder()
            .build(&settings_with_secret(None))
            .unwrap_err();
        assert!(err.to_string().contains("JWT secret must be configured"));

        let blank = CommonComponents::builder().build(&settings_with_secret(Some("  ")));
        assert!(matches!(blank, Err(Error::Config(_))));
    }

    #[test]
    fn test_defaults_built_with_secret() {
        let components = CommonComponents::builder()
            .build(&settings_with_secret(Some("secret")))
            .unwrap();

        let token = components.token_service().issue("alice", TokenType::Access).unwrap();
        assert_eq!(components.token_service().subject(&token).unwrap(), "alice");

        let hash = components.password_encoder().encode("long enough").unwrap();
        assert!(components.password_encoder().matches("long enough", &hash).unwrap());
    }

    #[test]
    fn test_supplied_token_service_skips_secret() {
        let components = CommonComponents::builder()
            .token_service(Arc::new(FixedTokens))
            .build(&settings_with_secret(None))
            .unwrap();

        let token = components.token_service().issue("bob", TokenType::Refresh).unwrap();
        assert_eq!(token, "REFRESH:bob");
    }

    #[test]
    fn test_supplied_encoder_is_kept() {
        let components = CommonComponents::builder()
            .password_encoder(Arc::new(PlainEncoder))
            .build(&settings_with_secret(Some("secret")))
            .unwrap();

        assert_eq!(components.password_encoder().encode("pw").unwrap(), "plain:pw");
    }
}
