//! Session credential port.
//!
//! Issues and verifies the signed, time-limited credential carried by the
//! visitor's `token` cookie. Implementations must never make network calls.
//!
//! # Contract
//!
//! - `verify(issue(p))` returns `p` unchanged while the credential is unexpired
//! - any signature, structure, or expiry failure is `AccessError::InvalidCredential`
//! - an absent cookie is not passed to `verify`; callers handle it separately

use crate::domain::access::{AccessError, IssuedCredential, SessionPayload};

/// Signs and verifies session credentials.
pub trait CredentialStore: Send + Sync {
    /// Seal a payload into a new credential with the configured TTL.
    fn issue(&self, payload: &SessionPayload) -> Result<IssuedCredential, AccessError>;

    /// Check signature and expiry, returning the sealed payload.
    fn verify(&self, token: &str) -> Result<SessionPayload, AccessError>;
}
