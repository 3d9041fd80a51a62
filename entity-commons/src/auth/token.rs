//! Token issuing and parsing (requires `jwt` feature)
//!
//! Tokens are HS256 JWTs carrying the subject, a `type` claim naming the
//! [`TokenType`], issue and expiry times, a unique id and any extra claims
//! the caller attaches.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_commons::auth::{JwtTokenService, TokenParameters, TokenService};
//! use entity_commons::model::TokenType;
//!
//! let tokens = JwtTokenService::new(&settings.security.jwt)?;
//!
//! let access = tokens.create(
//!     &TokenParameters::builder("alice", TokenType::Access)
//!         .claim("roles", vec!["ADMIN"])
//!         .build(),
//! )?;
//!
//! assert_eq!(tokens.subject(&access)?, "alice");
//! assert!(tokens.has_type(&access, TokenType::Access)?);
//! ```

use std::time::Duration;

use chrono::{DateTime, Utc};
use jsonwebtoken::{
    decode, encode, errors::ErrorKind, Algorithm, DecodingKey, EncodingKey, Header, Validation,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::config::JwtSettings;
use crate::error::{Error, Result};
use crate::model::TokenType;

/// Decoded token contents
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject (usually the username)
    pub sub: String,

    /// What the token was issued for
    #[serde(rename = "type")]
    pub token_type: TokenType,

    /// Issued at (seconds since the epoch)
    pub iat: i64,

    /// Expires at (seconds since the epoch)
    pub exp: i64,

    /// Unique token id
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub jti: Option<String>,

    /// Application claims
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TokenClaims {
    /// Application claim by name
    pub fn claim(&self, name: &str) -> Option<&Value> {
        self.extra.get(name)
    }

    /// Expiry as a timestamp
    pub fn expires_at(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp(self.exp, 0)
    }
}

/// What to put into a new token
#[derive(Debug, Clone)]
pub struct TokenParameters {
    subject: String,
    token_type: TokenType,
    lifetime: Option<Duration>,
    expires_at: Option<DateTime<Utc>>,
    claims: Map<String, Value>,
}

impl TokenParameters {
    /// Start describing a token for `subject`
    pub fn builder(subject: impl Into<String>, token_type: TokenType) -> TokenParametersBuilder {
        TokenParametersBuilder {
            params: TokenParameters {
                subject: subject.into(),
                token_type,
                lifetime: None,
                expires_at: None,
                claims: Map::new(),
            },
        }
    }

    /// Token subject
    pub fn subject(&self) -> &str {
        &self.subject
    }

    /// Token purpose
    pub fn token_type(&self) -> TokenType {
        self.token_type
    }

    /// Extra claims
    pub fn claims(&self) -> &Map<String, Value> {
        &self.claims
    }
}

/// Builder for [`TokenParameters`]
#[derive(Debug, Clone)]
pub struct TokenParametersBuilder {
    params: TokenParameters,
}

impl TokenParametersBuilder {
    /// Attach an application claim
    ///
    /// Registered JWT names (`sub`, `iat`, `exp`, `jti`, `nbf`, `iss`, `aud`)
    /// and `type` are ignored when the token is created.
    #[must_use]
    pub fn claim(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.claims.insert(name.into(), value.into());
        self
    }

    /// Override the lifetime configured for the token type
    #[must_use]
    pub fn lifetime(mut self, lifetime: Duration) -> Self {
        self.params.lifetime = Some(lifetime);
        self
    }

    /// Fixed expiry; takes precedence over any lifetime
    #[must_use]
    pub fn expires_at(mut self, expires_at: DateTime<Utc>) -> Self {
        self.params.expires_at = Some(expires_at);
        self
    }

    /// Finish
    pub fn build(self) -> TokenParameters {
        self.params
    }
}

const RESERVED_CLAIMS: [&str; 8] = ["sub", "type", "iat", "exp", "jti", "nbf", "iss", "aud"];

/// Token issuing and inspection
///
/// Object safe, so applications can supply their own implementation as
/// `Arc<dyn TokenService>`.
pub trait TokenService: Send + Sync {
    /// Sign a new token
    fn create(&self, params: &TokenParameters) -> Result<String>;

    /// Decode and verify a token, including its expiry
    ///
    /// Fails with `InvalidToken` for a bad signature, malformed input or an
    /// expired token.
    fn parse(&self, token: &str) -> Result<TokenClaims>;

    /// Whether a correctly signed token is past its expiry
    fn is_expired(&self, token: &str) -> Result<bool>;

    /// Sign a token with no extra claims and the default lifetime
    fn issue(&self, subject: &str, token_type: TokenType) -> Result<String> {
        self.create(&TokenParameters::builder(subject, token_type).build())
    }

    /// Subject of a valid token
    fn subject(&self, token: &str) -> Result<String> {
        Ok(self.parse(token)?.sub)
    }

    /// Type of a valid token
    fn token_type(&self, token: &str) -> Result<TokenType> {
        Ok(self.parse(token)?.token_type)
    }

    /// Whether a valid token was issued for `token_type`
    fn has_type(&self, token: &str, token_type: TokenType) -> Result<bool> {
        Ok(self.token_type(token)? == token_type)
    }
}

/// HS256 token service over the `security.jwt` settings
#[derive(Clone)]
pub struct JwtTokenService {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    settings: JwtSettings,
}

impl std::fmt::Debug for JwtTokenService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtTokenService")
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl JwtTokenService {
    /// Build from settings
    ///
    /// Fails with a configuration error when the secret is missing or blank.
    pub fn new(settings: &JwtSettings) -> Result<Self> {
        let secret = settings.require_secret()?;

        Ok(Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            settings: settings.clone(),
        })
    }

    fn validation(check_expiry: bool) -> Validation {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.validate_exp = check_expiry;
        validation
    }

    fn decode_claims(&self, token: &str, check_expiry: bool) -> Result<TokenClaims> {
        decode::<TokenClaims>(token, &self.decoding_key, &Self::validation(check_expiry))
            .map(|data| data.claims)
            .map_err(|e| match e.kind() {
                ErrorKind::ExpiredSignature => Error::invalid_token("Token has expired"),
                _ => {
                    tracing::debug!(error = %e, "Rejected token");
                    Error::invalid_token("Token is invalid")
                }
            })
    }
}

impl TokenService for JwtTokenService {
    fn create(&self, params: &TokenParameters) -> Result<String> {
        let now = Utc::now();
        let exp = match params.expires_at {
            Some(at) => at.timestamp(),
            None => {
                let lifetime = params
                    .lifetime
                    .unwrap_or_else(|| self.settings.ttl_for(params.token_type));
                let secs = i64::try_from(lifetime.as_secs()).unwrap_or(i64::MAX);
                now.timestamp().saturating_add(secs)
            }
        };

        let extra = params
            .claims
            .iter()
            .filter(|(name, _)| !RESERVED_CLAIMS.contains(&name.as_str()))
            .map(|(name, value)| (name.clone(), value.clone()))
            .collect();

        let claims = TokenClaims {
            sub: params.subject.clone(),
            token_type: params.token_type,
            iat: now.timestamp(),
            exp,
            jti: Some(uuid::Uuid::new_v4().to_string()),
            extra,
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)?;

        tracing::debug!(
            subject = %params.subject,
            token_type = %params.token_type,
            "Issued token"
        );

        Ok(token)
    }

    fn parse(&self, token: &str) -> Result<TokenClaims> {
        self.decode_claims(token, true)
    }

    fn is_expired(&self, token: &str) -> Result<bool> {
        let claims = self.decode_claims(token, false)?;
        Ok(claims.exp < Utc::now().timestamp())
    }
}
