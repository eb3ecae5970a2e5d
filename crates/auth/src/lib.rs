//! `doorsales-auth`, credential primitives: password hashing, session token
//! claims, and HS256 signing/validation.
//!
//! This crate is intentionally decoupled from HTTP and storage.

pub mod claims;
pub mod password;
pub mod principal;
pub mod token;
pub mod user;

pub use claims::{JwtClaims, TokenValidationError, validate_claims};
pub use password::{PasswordError, PasswordHash, PasswordHasher};
pub use principal::Principal;
pub use token::{Hs256TokenService, JwtIssuer, JwtValidator, TokenError};
pub use user::User;
