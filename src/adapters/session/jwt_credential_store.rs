//! HS256 JWT implementation of `CredentialStore`.
//!
//! The session payload is flattened into the JWT claims next to `iat` and
//! `exp`. Verification checks the signature, structure, and expiry with zero
//! leeway, and collapses every failure into `AccessError::InvalidCredential`.

use chrono::{Duration, Utc};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::domain::access::{AccessError, IssuedCredential, SessionPayload};
use crate::ports::CredentialStore;

/// Claims carried by the session JWT.
#[derive(Debug, Serialize, Deserialize)]
struct SessionClaims {
    #[serde(flatten)]
    payload: SessionPayload,
    iat: i64,
    exp: i64,
}

/// Signs session credentials with a server-held HMAC secret.
pub struct JwtCredentialStore {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl JwtCredentialStore {
    /// Create a store signing with `secret`, issuing credentials valid for `ttl`.
    pub fn new(secret: &SecretString, ttl: Duration) -> Self {
        let key = secret.expose_secret().as_bytes();

        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        Self {
            encoding_key: EncodingKey::from_secret(key),
            decoding_key: DecodingKey::from_secret(key),
            validation,
            ttl,
        }
    }

    pub fn ttl(&self) -> Duration {
        self.ttl
    }
}

impl CredentialStore for JwtCredentialStore {
    fn issue(&self, payload: &SessionPayload) -> Result<IssuedCredential, AccessError> {
        let issued_at = Utc::now();
        let expires_at = issued_at + self.ttl;

        let claims = SessionClaims {
            payload: payload.clone(),
            iat: issued_at.timestamp(),
            exp: expires_at.timestamp(),
        };

        let token = encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| {
                tracing::error!(error = %e, "Failed to sign session credential");
                AccessError::InvalidCredential
            })?;

        Ok(IssuedCredential { token, expires_at })
    }

    fn verify(&self, token: &str) -> Result<SessionPayload, AccessError> {
        decode::<SessionClaims>(token, &self.decoding_key, &self.validation)
            .map(|data| data.claims.payload)
            .map_err(|e| {
                tracing::debug!(error = %e, "Session credential rejected");
                AccessError::InvalidCredential
            })
    }
}
