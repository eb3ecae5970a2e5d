//! HS256 session tokens.

use chrono::{DateTime, Duration, Utc};
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use thiserror::Error;

use crate::{JwtClaims, Principal, TokenValidationError, validate_claims};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("failed to sign token: {0}")]
    Signing(String),

    /// Bad signature, wrong algorithm, or malformed token.
    #[error("invalid token")]
    Invalid,

    #[error(transparent)]
    Claims(#[from] TokenValidationError),
}

/// Verifies a bearer token and returns its claims.
pub trait JwtValidator: Send + Sync {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError>;
}

/// Issues signed session tokens.
pub trait JwtIssuer: Send + Sync {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError>;
}

/// Symmetric HS256 implementation of both token roles.
#[derive(Clone)]
pub struct Hs256TokenService {
    encoding: EncodingKey,
    decoding: DecodingKey,
    ttl: Duration,
}

impl Hs256TokenService {
    pub fn new(secret: &[u8], ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret),
            decoding: DecodingKey::from_secret(secret),
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl JwtIssuer for Hs256TokenService {
    fn issue(&self, principal: &Principal, now: DateTime<Utc>) -> Result<String, TokenError> {
        let claims = JwtClaims::new(principal, now, self.ttl);
        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding).map_err(|e| {
            tracing::error!(error = %e, "failed to encode session token");
            TokenError::Signing(e.to_string())
        })
    }
}

impl JwtValidator for Hs256TokenService {
    fn validate(&self, token: &str, now: DateTime<Utc>) -> Result<JwtClaims, TokenError> {
        // Expiry is checked against the caller's clock in `validate_claims`.
        let mut validation = Validation::new(Algorithm::HS256);
        validation.validate_exp = false;

        let claims = decode::<JwtClaims>(token, &self.decoding, &validation)
            .map(|data| data.claims)
            .map_err(|e| {
                tracing::debug!(error = %e, "token decode failed");
                TokenError::Invalid
            })?;

        validate_claims(&claims, now)?;
        Ok(claims)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use doorsales_core::UserId;

    fn service(secret: &str) -> Hs256TokenService {
        Hs256TokenService::new(secret.as_bytes(), Duration::hours(24))
    }

    fn admin() -> Principal {
        Principal::new(UserId::new(1), "admin")
    }

    #[test]
    fn issued_token_validates_until_expiry() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue(&admin(), now).unwrap();

        let claims = svc.validate(&token, now).unwrap();
        assert_eq!(claims.principal(), admin());

        assert!(svc.validate(&token, now + Duration::hours(23)).is_ok());
        assert_eq!(
            svc.validate(&token, now + Duration::hours(24)),
            Err(TokenError::Claims(TokenValidationError::Expired))
        );
    }

    #[test]
    fn rejects_token_signed_with_other_secret() {
        let now = Utc::now();
        let token = service("other-secret").issue(&admin(), now).unwrap();
        assert_eq!(service("test-secret").validate(&token, now), Err(TokenError::Invalid));
    }

    #[test]
    fn rejects_tampered_signature() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue(&admin(), now).unwrap();

        let (rest, sig) = token.rsplit_once('.').unwrap();
        let mut sig: Vec<char> = sig.chars().collect();
        sig[0] = if sig[0] == 'A' { 'B' } else { 'A' };
        let tampered = format!("{rest}.{}", sig.into_iter().collect::<String>());

        assert_eq!(svc.validate(&tampered, now), Err(TokenError::Invalid));
    }

    #[test]
    fn rejects_tampered_payload() {
        let svc = service("test-secret");
        let now = Utc::now();
        let token = svc.issue(&admin(), now).unwrap();

        // Swap in the payload of a token for another user, keep the original signature.
        let other = svc.issue(&Principal::new(UserId::new(2), "mallory"), now).unwrap();
        let parts: Vec<&str> = token.split('.').collect();
        let other_parts: Vec<&str> = other.split('.').collect();
        let forged = format!("{}.{}.{}", parts[0], other_parts[1], parts[2]);

        assert_eq!(svc.validate(&forged, now), Err(TokenError::Invalid));
    }

    #[test]
    fn rejects_garbage() {
        let svc = service("test-secret");
        assert_eq!(svc.validate("not-a-jwt", Utc::now()), Err(TokenError::Invalid));
        assert_eq!(svc.validate("", Utc::now()), Err(TokenError::Invalid));
    }
}
