//! Password hashing using Argon2id
//!
//! Hashes are PHC strings (`$argon2id$v=19$m=...,t=...,p=...$salt$hash`), so
//! verification reads its parameters from the stored hash and keeps working
//! after the configured costs change.
//!
//! # Example
//!
//! ```rust,ignore
//! use entity_commons::auth::{Argon2PasswordEncoder, PasswordEncoder};
//! use entity_commons::config::PasswordSettings;
//!
//! let encoder = Argon2PasswordEncoder::new(&PasswordSettings::default())?;
//! let hash = encoder.encode("my_secure_password")?;
//!
//! assert!(encoder.matches("my_secure_password", &hash)?);
//! assert!(!encoder.matches("wrong_password", &hash)?);
//! ```

use argon2::{
    password_hash::{
        rand_core::OsRng, PasswordHash, PasswordHasher as _, PasswordVerifier, SaltString,
    },
    Algorithm, Argon2, Params, Version,
};

use crate::config::PasswordSettings;
use crate::error::{Error, Result};

/// One-way password encoding
///
/// Applications may plug in their own implementation through
/// [`CommonComponents`](crate::wiring::CommonComponents); the Argon2id
/// encoder is used otherwise.
pub trait PasswordEncoder: Send + Sync {
    /// Hash a plain-text password
    fn encode(&self, raw: &str) -> Result<String>;

    /// Check a plain-text password against a stored hash
    fn matches(&self, raw: &str, encoded: &str) -> Result<bool>;
}

/// Argon2id password encoder
#[derive(Clone)]
pub struct Argon2PasswordEncoder {
    params: Params,
    min_password_length: usize,
}

impl std::fmt::Debug for Argon2PasswordEncoder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Argon2PasswordEncoder")
            .field("m_cost", &self.params.m_cost())
            .field("t_cost", &self.params.t_cost())
            .field("p_cost", &self.params.p_cost())
            .field("min_password_length", &self.min_password_length)
            .finish()
    }
}

impl Argon2PasswordEncoder {
    /// Encoder with the given cost parameters
    ///
    /// Fails with a configuration error when Argon2 rejects the parameters
    /// (for example a memory cost below `8 * parallelism` KiB).
    pub fn new(settings: &PasswordSettings) -> Result<Self> {
        let params = Params::new(
            settings.memory_cost_kib,
            settings.time_cost,
            settings.parallelism,
            None,
        )
        .map_err(|e| Error::config(format!("Invalid Argon2 parameters: {e}")))?;

        Ok(Self {
            params,
            min_password_length: settings.min_password_length,
        })
    }

    /// Shortest password [`PasswordEncoder::encode`] accepts
    pub fn min_password_length(&self) -> usize {
        self.min_password_length
    }

    /// Whether a stored hash was produced with other parameters than ours
    ///
    /// Callers can re-encode on the next successful login.
    pub fn needs_rehash(&self, encoded: &str) -> bool {
        let Ok(parsed) = PasswordHash::new(encoded) else {
            return true;
        };

        if parsed.algorithm != Algorithm::Argon2id.ident() || parsed.version != Some(19) {
            return true;
        }

        let param = |name: &str| {
            parsed
                .params
                .iter()
                .find(|(k, _)| k.as_str() == name)
                .and_then(|(_, v)| v.decimal().ok())
        };

        param("m") != Some(self.params.m_cost())
            || param("t") != Some(self.params.t_cost())
            || param("p") != Some(self.params.p_cost())
    }

    fn argon2(&self) -> Argon2<'static> {
        Argon2::new(Algorithm::Argon2id, Version::V0x13, self.params.clone())
    }
}

impl PasswordEncoder for Argon2PasswordEncoder {
    fn encode(&self, raw: &str) -> Result<String> {
        if raw.chars().count() < self.min_password_length {
            return Err(Error::invalid_data(format!(
                "Password must be at least {} characters",
                self.min_password_length
            )));
        }

        let salt = SaltString::generate(&mut OsRng);
        let hash = self
            .argon2()
            .hash_password(raw.as_bytes(), &salt)
            .map_err(|e| Error::Auth(format!("Failed to hash password: {e}")))?;

        Ok(hash.to_string())
    }

    fn matches(&self, raw: &str, encoded: &str) -> Result<bool> {
        let parsed = PasswordHash::new(encoded)
            .map_err(|e| Error::Auth(format!("Invalid password hash format: {e}")))?;

        match Argon2::default().verify_password(raw.as_bytes(), &parsed) {
            Ok(()) => Ok(true),
            Err(argon2::password_hash::Error::Password) => Ok(false),
            Err(e) => Err(Error::Auth(format!("Password verification failed: {e}"))),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Cheap costs keep the suite fast
    fn cheap() -> PasswordSettings {
        PasswordSettings {
            memory_cost_kib: 1024,
            time_cost: 1,
            parallelism: 1,
            min_password_length: 8,
        }
    }

    #[test]
    fn test_encode_and_match() {
        let encoder = Argon2PasswordEncoder::new(&cheap()).unwrap();
        let hash = encoder.encode("test_password_123").unwrap();

        assert!(hash.starts_with("$argon2id$"));
        assert!(encoder.matches("test_password_123", &hash).unwrap());
        assert!(!encoder.matches("wrong_password", &hash).unwrap());
    }

    #[test]
    fn test_salted_hashes_differ() {
        let encoder = Argon2PasswordEncoder::new(&cheap()).unwrap();
        let first = encoder.encode("test_password_123").unwrap();
        let second = encoder.encode("test_password_123").unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn test_password_too_short() {
        let encoder = Argon2PasswordEncoder::new(&cheap()).unwrap();
        match encoder.encode("short") {
            Err(Error::InvalidData { message, .. }) => {
                assert!(message.unwrap().contains("at least 8 characters"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn test_invalid_parameters_are_config_errors() {
        let settings = PasswordSettings {
            memory_cost_kib: 1,
            ..cheap()
        };
        assert!(matches!(
            Argon2PasswordEncoder::new(&settings),
            Err(Error::Config(_))
        ));
    }

    #[test]
    fn test_invalid_hash_format() {
        let encoder = Argon2PasswordEncoder::new(&cheap()).unwrap();
        assert!(matches!(
            encoder.matches("password", "not_a_valid_hash"),
            Err(Error::Auth(_))
        ));
    }

    #[test]
    fn test_needs_rehash() {
        let encoder = Argon2PasswordEncoder::new(&cheap()).unwrap();
        let hash = encoder.encode("test_password_123").unwrap();
        assert!(!encoder.needs_rehash(&hash));

        let stronger = Argon2PasswordEncoder::new(&PasswordSettings {
            memory_cost_kib: 2048,
            ..cheap()
        })
        .unwrap();
        assert!(stronger.needs_rehash(&hash));
        assert!(stronger.needs_rehash("garbage"));
    }
}
