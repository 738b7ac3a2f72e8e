//! Mock identity provider for testing.
//!
//! Returns canned results and counts calls, so tests can assert that a
//! request never reached the provider.
//!
//! # Example
//!
//! ```ignore
//! let provider = MockIdentityProvider::new(ProviderKind::Video)
//!     .with_identity(identity)
//!     .with_access_token("ya29.test");
//! ```

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use crate::domain::access::{
    EntitlementFacts, ProviderIdentity, ProviderKind, VideoFacts,
};
use crate::ports::{AccessToken, IdentityProvider, ProviderError};

/// Canned `IdentityProvider`.
#[derive(Debug)]
pub struct MockIdentityProvider {
    kind: ProviderKind,
    redirect_uri: String,
    exchange_result: Result<String, ProviderError>,
    identity_result: Result<ProviderIdentity, ProviderError>,
    exchange_calls: AtomicUsize,
    identity_calls: AtomicUsize,
}

impl MockIdentityProvider {
    /// A provider that exchanges any code for `"mock-access-token"` and returns
    /// an identity with no entitlement facts.
    pub fn new(kind: ProviderKind) -> Self {
        let facts = match kind {
            ProviderKind::Crowdfunding => EntitlementFacts::Crowdfunding(serde_json::json!({})),
            ProviderKind::Video => EntitlementFacts::Video(VideoFacts::default()),
        };

        Self {
            kind,
            redirect_uri: format!("http://localhost:8080/oauth/redirect/{}", kind.route_segment()),
            exchange_result: Ok("mock-access-token".to_string()),
            identity_result: Ok(ProviderIdentity {
                display_name: None,
                photo_url: None,
                profile_url: None,
                email: None,
                facts,
            }),
            exchange_calls: AtomicUsize::new(0),
            identity_calls: AtomicUsize::new(0),
        }
    }

    pub fn with_access_token(mut self, token: impl Into<String>) -> Self {
        self.exchange_result = Ok(token.into());
        self
    }

    pub fn with_exchange_error(mut self, error: ProviderError) -> Self {
        self.exchange_result = Err(error);
        self
    }

    pub fn with_identity(mut self, identity: ProviderIdentity) -> Self {
        self.identity_result = Ok(identity);
        self
    }

    pub fn with_identity_error(mut self, error: ProviderError) -> Self {
        self.identity_result = Err(error);
        self
    }

    pub fn exchange_calls(&self) -> usize {
        self.exchange_calls.load(Ordering::SeqCst)
    }

    pub fn identity_calls(&self) -> usize {
        self.identity_calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl IdentityProvider for MockIdentityProvider {
    fn kind(&self) -> ProviderKind {
        self.kind
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn authorize_url(&self, state: &str) -> String {
        format!("https://auth.example.com/{}?state={}", self.kind.as_str(), state)
    }

    async fn exchange_code(
        &self,
        _code: &str,
        _redirect_uri: &str,
    ) -> Result<AccessToken, ProviderError> {
        self.exchange_calls.fetch_add(1, Ordering::SeqCst);
        self.exchange_result.clone().map(AccessToken::new)
    }

    async fn fetch_identity(&self, _access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        self.identity_calls.fetch_add(1, Ordering::SeqCst);
        self.identity_result.clone()
    }
}
