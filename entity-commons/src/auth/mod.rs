//! Password hashing and token services
//!
//! - [`PasswordEncoder`] / [`Argon2PasswordEncoder`] (feature `auth`)
//! - [`TokenService`] / [`JwtTokenService`] (feature `jwt`)
//!
//! Both traits are object safe; [`CommonComponents`](crate::wiring::CommonComponents)
//! holds them as `Arc<dyn ...>` and only falls back to the defaults here
//! when the application supplies nothing.

#[cfg(feature = "auth")]
mod password;
#[cfg(feature = "jwt")]
mod token;

#[cfg(feature = "auth")]
pub use password::{Argon2PasswordEncoder, PasswordEncoder};
#[cfg(feature = "jwt")]
pub use token::{JwtTokenService, TokenClaims, TokenParameters, TokenParametersBuilder, TokenService};
