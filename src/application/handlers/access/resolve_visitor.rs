//! ResolveVisitorHandler - turns a session credential into a tiered visitor.
//!
//! Pipeline per gated request:
//!
//! ```text
//! credential ─verify─▶ SessionPayload ─fetch_identity─▶ ProviderIdentity
//!                                                         │
//!                                            TierResolver::resolve
//!                                                         ▼
//!                                                   Visitor { tier }
//! ```
//!
//! Only the provider recorded in the verified payload is ever called.

use std::sync::Arc;

use crate::domain::access::{
    AccessError, Entitlement, ProviderIdentity, SessionPayload, Tier, TierResolver, Visitor,
};
use crate::ports::{CredentialStore, IdentityProviders};

/// Query to resolve the visitor behind a session credential.
#[derive(Debug, Clone)]
pub struct ResolveVisitorQuery {
    pub credential: String,
}

/// Handler for resolving visitors.
pub struct ResolveVisitorHandler {
    credentials: Arc<dyn CredentialStore>,
    providers: IdentityProviders,
    resolver: Arc<TierResolver>,
}

impl ResolveVisitorHandler {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        providers: IdentityProviders,
        resolver: Arc<TierResolver>,
    ) -> Self {
        Self {
            credentials,
            providers,
            resolver,
        }
    }

    pub async fn handle(&self, query: ResolveVisitorQuery) -> Result<Visitor, AccessError> {
        let payload = self.authenticate(&query.credential)?;
        self.authorize(&payload).await
    }

    /// Verifies the credential. Makes no network calls.
    pub fn authenticate(&self, credential: &str) -> Result<SessionPayload, AccessError> {
        self.credentials.verify(credential)
    }

    /// Fetches entitlements from the issuing provider and resolves a tier.
    pub async fn authorize(&self, payload: &SessionPayload) -> Result<Visitor, AccessError> {
        let provider = self.providers.get(payload.provider).ok_or_else(|| {
            tracing::debug!(provider = %payload.provider, "No adapter registered for session provider");
            AccessError::InvalidCredential
        })?;

        let identity = provider
            .fetch_identity(&payload.access_token)
            .await
            .map_err(|e| e.into_access_error(payload.provider))?;

        match self.resolver.resolve(&identity.facts) {
            Entitlement::Granted(tier) => {
                tracing::debug!(
                    provider = %payload.provider,
                    tier = %tier,
                    email = identity.email.as_deref().unwrap_or(""),
                    "Visitor resolved"
                );
                Ok(visitor(payload, identity, tier))
            }
            Entitlement::NotEntitled => Err(AccessError::NoEntitlement {
                provider: payload.provider,
            }),
        }
    }
}

/// Profile fields come from the fresh identity, falling back to the session.
fn visitor(payload: &SessionPayload, identity: ProviderIdentity, tier: Tier) -> Visitor {
    Visitor {
        provider: payload.provider,
        display_name: identity.display_name.or_else(|| payload.display_name.clone()),
        photo_url: identity.photo_url.or_else(|| payload.photo_url.clone()),
        profile_url: identity.profile_url.or_else(|| payload.profile_url.clone()),
        tier,
    }
}
