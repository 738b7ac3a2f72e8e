//! Access-control error taxonomy.
//!
//! # Gate Outcome Mapping
//!
//! | Error | Outcome |
//! |-------|---------|
//! | InvalidCredential | redirect to login |
//! | OAuthExchangeFailed | redirect to login |
//! | UpstreamUnauthorized | revoke cookie, redirect to login |
//! | UpstreamTransport | error page (502) |
//! | NoEntitlement | insufficient tier page (403) |

use thiserror::Error;

use super::ProviderKind;

/// Errors that can occur between reading a session cookie and attaching a
/// resolved tier to the request.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AccessError {
    /// Credential is malformed, badly signed, or expired.
    #[error("Invalid or expired session credential")]
    InvalidCredential,

    /// The authorization code could not be exchanged for an access token.
    #[error("OAuth code exchange with {provider} failed: {reason}")]
    OAuthExchangeFailed {
        provider: ProviderKind,
        reason: String,
    },

    /// The provider no longer accepts the delegated access token.
    #[error("{provider} rejected the access token during {call}")]
    UpstreamUnauthorized {
        provider: ProviderKind,
        call: &'static str,
    },

    /// Network failure, timeout, 5xx, or an unusable response body.
    #[error("{provider} call {call} failed: {reason}")]
    UpstreamTransport {
        provider: ProviderKind,
        call: &'static str,
        reason: String,
    },

    /// The visitor is authenticated but holds no recognised tier.
    #[error("No entitled tier found via {provider}")]
    NoEntitlement { provider: ProviderKind },
}

impl AccessError {
    pub fn exchange_failed(provider: ProviderKind, reason: impl Into<String>) -> Self {
        AccessError::OAuthExchangeFailed {
            provider,
            reason: reason.into(),
        }
    }

    pub fn unauthorized(provider: ProviderKind, call: &'static str) -> Self {
        AccessError::UpstreamUnauthorized { provider, call }
    }

    pub fn transport(provider: ProviderKind, call: &'static str, reason: impl Into<String>) -> Self {
        AccessError::UpstreamTransport {
            provider,
            call,
            reason: reason.into(),
        }
    }

    /// Returns true if the visitor should be sent back to the login page.
    pub fn requires_reauthentication(&self) -> bool {
        matches!(
            self,
            AccessError::InvalidCredential
                | AccessError::OAuthExchangeFailed { .. }
                | AccessError::UpstreamUnauthorized { .. }
        )
    }

    /// Returns true if the stored cookie must be cleared before redirecting.
    pub fn revokes_session(&self) -> bool {
        matches!(self, AccessError::UpstreamUnauthorized { .. })
    }

    /// Returns the provider involved, if any.
    pub fn provider(&self) -> Option<ProviderKind> {
        match self {
            AccessError::InvalidCredential => None,
            AccessError::OAuthExchangeFailed { provider, .. }
            | AccessError::UpstreamUnauthorized { provider, .. }
            | AccessError::UpstreamTransport { provider, .. }
            | AccessError::NoEntitlement { provider } => Some(*provider),
        }
    }
}
