//! Signed OAuth `state` parameter.
//!
//! Format: `{provider}.{expiry}.{hex(hmac_sha256(secret, "{provider}.{expiry}"))}`.
//! The state binds the round trip to the provider whose login link was
//! rendered, and goes stale after a short window.

use chrono::{DateTime, Duration, Utc};
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use sha2::Sha256;
use subtle::ConstantTimeEq;
use thiserror::Error;

use super::ProviderKind;

type HmacSha256 = Hmac<Sha256>;

/// Default lifetime of a login link.
pub const DEFAULT_STATE_TTL_SECS: i64 = 600;

/// Reasons a returned `state` is rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OAuthStateError {
    #[error("OAuth state is malformed")]
    Malformed,

    #[error("OAuth state was issued for a different provider")]
    ProviderMismatch,

    #[error("OAuth state has expired")]
    Expired,

    #[error("OAuth state signature mismatch")]
    BadSignature,
}

/// Issues and checks signed OAuth state values.
pub struct OAuthStateSigner {
    secret: SecretString,
    ttl: Duration,
}

impl OAuthStateSigner {
    pub fn new(secret: SecretString) -> Self {
        Self {
            secret,
            ttl: Duration::seconds(DEFAULT_STATE_TTL_SECS),
        }
    }

    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// State for a login link rendered now.
    pub fn issue(&self, provider: ProviderKind) -> String {
        self.issue_at(provider, Utc::now())
    }

    pub fn issue_at(&self, provider: ProviderKind, now: DateTime<Utc>) -> String {
        let signed = format!("{}.{}", provider.as_str(), (now + self.ttl).timestamp());
        let signature = hex::encode(self.sign(&signed));
        format!("{}.{}", signed, signature)
    }

    /// Check a state returned on the redirect for `provider`.
    pub fn verify(&self, state: &str, provider: ProviderKind) -> Result<(), OAuthStateError> {
        self.verify_at(state, provider, Utc::now())
    }

    pub fn verify_at(
        &self,
        state: &str,
        provider: ProviderKind,
        now: DateTime<Utc>,
    ) -> Result<(), OAuthStateError> {
        let (signed, signature_hex) = state.rsplit_once('.').ok_or(OAuthStateError::Malformed)?;
        let (state_provider, expiry) =
            signed.split_once('.').ok_or(OAuthStateError::Malformed)?;

        let expiry: i64 = expiry.parse().map_err(|_| OAuthStateError::Malformed)?;
        let provided = hex::decode(signature_hex).map_err(|_| OAuthStateError::Malformed)?;

        let expected = self.sign(signed);
        if expected.len() != provided.len() || expected.ct_eq(&provided).unwrap_u8() != 1 {
            return Err(OAuthStateError::BadSignature);
        }

        if state_provider != provider.as_str() {
            return Err(OAuthStateError::ProviderMismatch);
        }

        if now.timestamp() > expiry {
            return Err(OAuthStateError::Expired);
        }

        Ok(())
    }

    fn sign(&self, message: &str) -> Vec<u8> {
        let mut mac = HmacSha256::new_from_slice(self.secret.expose_secret().as_bytes())
            .expect("HMAC accepts any key");
        mac.update(message.as_bytes());
        mac.finalize().into_bytes().to_vec()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signer() -> OAuthStateSigner {
        OAuthStateSigner::new(SecretString::new("state-secret".to_string()))
    }

    #[test]
    fn fresh_state_verifies_for_its_provider() {
        let signer = signer();
        let state = signer.issue(ProviderKind::Video);

        assert!(state.starts_with("video."));
        assert_eq!(signer.verify(&state, ProviderKind::Video), Ok(()));
    }

    #[test]
    fn state_for_other_provider_is_rejected() {
        let signer = signer();
        let state = signer.issue(ProviderKind::Video);

        assert_eq!(
            signer.verify(&state, ProviderKind::Crowdfunding),
            Err(OAuthStateError::ProviderMismatch)
        );
    }

    #[test]
    fn stale_state_is_rejected() {
        let signer = signer();
        let issued_at = Utc::now() - Duration::minutes(11);
        let state = signer.issue_at(ProviderKind::Crowdfunding, issued_at);

        assert_eq!(
            signer.verify(&state, ProviderKind::Crowdfunding),
            Err(OAuthStateError::Expired)
        );
    }

    #[test]
    fn altered_expiry_breaks_signature() {
        let signer = signer();
        let state = signer.issue(ProviderKind::Crowdfunding);
        let mut parts: Vec<String> = state.split('.').map(str::to_string).collect();
        parts[1] = (parts[1].parse::<i64>().unwrap() + 86_400).to_string();
        let forged = parts.join(".");

        assert_eq!(
            signer.verify(&forged, ProviderKind::Crowdfunding),
            Err(OAuthStateError::BadSignature)
        );
    }

    #[test]
    fn state_from_other_secret_is_rejected() {
        let other = OAuthStateSigner::new(SecretString::new("other".to_string()));
        let state = other.issue(ProviderKind::Video);

        assert_eq!(
            signer().verify(&state, ProviderKind::Video),
            Err(OAuthStateError::BadSignature)
        );
    }

    #[test]
    fn constant_state_from_old_clients_is_malformed() {
        assert_eq!(
            signer().verify("patron-gate", ProviderKind::Video),
            Err(OAuthStateError::Malformed)
        );
        assert_eq!(
            signer().verify("video.soon.abcd", ProviderKind::Video),
            Err(OAuthStateError::Malformed)
        );
    }
}
