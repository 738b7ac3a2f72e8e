//! Identity provider port.
//!
//! One implementation per external OAuth platform. The access gate only ever
//! talks to the provider recorded in the visitor's verified session.
//!
//! # Error Contract
//!
//! Implementations must keep these failure modes apart:
//! - `ExchangeFailed` - the authorization code could not be redeemed
//! - `Unauthorized` - the provider rejected the delegated token, whether via
//!   HTTP status or an error embedded in a successful response body
//! - `Transport` - network failure, timeout, 5xx, or an unusable body

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::access::{AccessError, ProviderIdentity, ProviderKind};

/// Errors returned by provider adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ProviderError {
    #[error("Code exchange failed: {0}")]
    ExchangeFailed(String),

    #[error("Access token rejected by {call}")]
    Unauthorized { call: &'static str },

    #[error("{call} failed: {message}")]
    Transport { call: &'static str, message: String },
}

impl ProviderError {
    pub fn transport(call: &'static str, message: impl Into<String>) -> Self {
        ProviderError::Transport {
            call,
            message: message.into(),
        }
    }

    /// Attaches the provider kind, producing the gate-level error.
    pub fn into_access_error(self, provider: ProviderKind) -> AccessError {
        match self {
            ProviderError::ExchangeFailed(reason) => AccessError::exchange_failed(provider, reason),
            ProviderError::Unauthorized { call } => AccessError::unauthorized(provider, call),
            ProviderError::Transport { call, message } => {
                AccessError::transport(provider, call, message)
            }
        }
    }
}

/// A provider-issued access token.
#[derive(Clone, PartialEq, Eq)]
pub struct AccessToken(String);

impl AccessToken {
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    pub fn secret(&self) -> &str {
        &self.0
    }

    pub fn into_inner(self) -> String {
        self.0
    }
}

impl std::fmt::Debug for AccessToken {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("AccessToken([REDACTED])")
    }
}

/// External identity and entitlement source.
#[async_trait]
pub trait IdentityProvider: Send + Sync {
    /// Which provider this adapter wraps.
    fn kind(&self) -> ProviderKind;

    /// The redirect URI registered with the provider for this app.
    fn redirect_uri(&self) -> &str;

    /// Authorization URL for the login page, carrying the given `state`.
    fn authorize_url(&self, state: &str) -> String;

    /// Redeem an authorization code for an access token.
    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, ProviderError>;

    /// Fetch the caller's profile and entitlement facts.
    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError>;
}

/// The set of configured providers, keyed by kind.
#[derive(Clone, Default)]
pub struct IdentityProviders {
    providers: HashMap<ProviderKind, Arc<dyn IdentityProvider>>,
}

impl IdentityProviders {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a provider under its own kind, replacing any previous one.
    pub fn with(mut self, provider: Arc<dyn IdentityProvider>) -> Self {
        self.providers.insert(provider.kind(), provider);
        self
    }

    pub fn get(&self, kind: ProviderKind) -> Option<&Arc<dyn IdentityProvider>> {
        self.providers.get(&kind)
    }

    /// Providers in a stable order (crowdfunding first).
    pub fn iter(&self) -> impl Iterator<Item = &Arc<dyn IdentityProvider>> {
        [ProviderKind::Crowdfunding, ProviderKind::Video]
            .into_iter()
            .filter_map(move |kind| self.providers.get(&kind))
    }
}
