//! CompleteLoginHandler - finishes the OAuth round trip.
//!
//! Verifies the signed `state`, redeems the authorization code with the
//! provider named in the redirect path, and issues a session credential for
//! that provider. Profile fields are left empty; the access gate fills them
//! from fresh provider data on every request.
//!
//! With provisioning enabled, a video login also registers the member with
//! the CMS. That step never blocks the login: its failures are logged.

use std::sync::Arc;

use crate::domain::access::{
    AccessError, IssuedCredential, OAuthStateSigner, ProviderKind, SessionPayload,
};
use crate::ports::{CredentialStore, IdentityProvider, IdentityProviders};

use super::ProvisionMemberHandler;

/// Command carrying the provider redirect parameters.
#[derive(Debug, Clone)]
pub struct CompleteLoginCommand {
    pub provider: ProviderKind,
    pub code: String,
    pub state: String,
}

/// Handler for OAuth redirects.
pub struct CompleteLoginHandler {
    credentials: Arc<dyn CredentialStore>,
    providers: IdentityProviders,
    state_signer: Arc<OAuthStateSigner>,
    provisioning: Option<Arc<ProvisionMemberHandler>>,
}

impl CompleteLoginHandler {
    pub fn new(
        credentials: Arc<dyn CredentialStore>,
        providers: IdentityProviders,
        state_signer: Arc<OAuthStateSigner>,
    ) -> Self {
        Self {
            credentials,
            providers,
            state_signer,
            provisioning: None,
        }
    }

    /// Registers video members with the CMS after each video login.
    pub fn with_member_provisioning(mut self, provisioning: Arc<ProvisionMemberHandler>) -> Self {
        self.provisioning = Some(provisioning);
        self
    }

    pub async fn handle(&self, cmd: CompleteLoginCommand) -> Result<IssuedCredential, AccessError> {
        let provider = self
            .providers
            .get(cmd.provider)
            .ok_or_else(|| AccessError::exchange_failed(cmd.provider, "provider not configured"))?;

        self.state_signer
            .verify(&cmd.state, cmd.provider)
            .map_err(|e| AccessError::exchange_failed(cmd.provider, e.to_string()))?;

        if cmd.code.is_empty() {
            return Err(AccessError::exchange_failed(cmd.provider, "missing authorization code"));
        }

        let token = provider
            .exchange_code(&cmd.code, provider.redirect_uri())
            .await
            .map_err(|e| e.into_access_error(cmd.provider))?;

        if cmd.provider == ProviderKind::Video {
            self.provision_member(provider.as_ref(), token.secret()).await;
        }

        let issued = self
            .credentials
            .issue(&SessionPayload::new(cmd.provider, token.into_inner()))?;

        tracing::info!(provider = %cmd.provider, "Session issued");
        Ok(issued)
    }

    async fn provision_member(&self, provider: &dyn IdentityProvider, access_token: &str) {
        let Some(provisioning) = &self.provisioning else {
            return;
        };

        let identity = match provider.fetch_identity(access_token).await {
            Ok(identity) => identity,
            Err(e) => {
                tracing::warn!(provider = %provider.kind(), error = %e, "Skipping member provisioning");
                return;
            }
        };

        if let Err(e) = provisioning.handle(&identity).await {
            tracing::warn!(
                provider = %provider.kind(),
                call = "members.provision",
                error = %e,
                "Member provisioning failed"
            );
        }
    }

    /// Authorization URLs for every configured provider, each with a fresh state.
    pub fn login_links(&self) -> Vec<(ProviderKind, String)> {
        self.providers
            .iter()
            .map(|p| (p.kind(), p.authorize_url(&self.state_signer.issue(p.kind()))))
            .collect()
    }
}
