use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::AppError;

/// Represents the claims carried by a session token.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq)]
pub struct SessionClaims {
    /// The signed-in user's id.
    pub sub: Uuid,
    /// Issued-at, seconds since epoch.
    pub iat: i64,
    /// Expiry, seconds since epoch.
    pub exp: i64,
}

/// Signs and verifies session tokens.
///
/// Tokens are HS256 JWTs. The server keeps no record of issued tokens, so a token
/// stays valid until its `exp` passes; signing out only removes the cookie.
#[derive(Clone)]
pub struct SessionCodec {
    encoding: EncodingKey,
    decoding: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl SessionCodec {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        // Expiry is checked in `decode_at` against an explicit clock.
        validation.validate_exp = false;
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }

    /// Issues a token for `user_id` that expires after the configured TTL.
    pub fn encode(&self, user_id: Uuid) -> Result<String, AppError> {
        self.encode_at(user_id, Utc::now().timestamp())
    }

    pub fn encode_at(&self, user_id: Uuid, now: i64) -> Result<String, AppError> {
        let claims = SessionClaims {
            sub: user_id,
            iat: now,
            exp: now + self.ttl.num_seconds(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding)
            .map_err(|e| AppError::InternalServerError(format!("Failed to sign session: {}", e)))
    }

    /// Verifies a token taken from the session cookie.
    ///
    /// Returns `None` when the cookie is absent, the token is malformed, the signature
    /// does not match or the token has expired. Failures are logged, never raised.
    pub fn decode(&self, token: Option<&str>) -> Option<SessionClaims> {
        token.and_then(|token| self.decode_at(token, Utc::now().timestamp()))
    }

    pub fn decode_at(&self, token: &str, now: i64) -> Option<SessionClaims> {
        let claims = match decode::<SessionClaims>(token, &self.decoding, &self.validation) {
            Ok(data) => data.claims,
            Err(e) => {
                log::debug!("Rejected session token: {}", e);
                return None;
            }
        };

        if claims.exp <= now {
            log::debug!("Session for user {} expired at {}", claims.sub, claims.exp);
            return None;
        }

        Some(claims)
    }
}
