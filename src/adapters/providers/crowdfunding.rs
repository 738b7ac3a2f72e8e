//! Crowdfunding platform identity adapter (Patreon API v2 shaped).
//!
//! A single `GET {api}/identity` call returns the user, their campaign
//! memberships, and the tiers each membership is currently entitled to, as a
//! JSON:API document. The document is passed through untouched as
//! `EntitlementFacts::Crowdfunding`; tier resolution happens in the domain.
//!
//! # Error Shapes
//!
//! The platform reports a revoked token in two ways: an HTTP 401, or an HTTP
//! 200 whose body carries `{"errors": [{"status": "401", ...}]}`. Both become
//! `ProviderError::Unauthorized`. Every other failure is `Transport`.

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde_json::Value;

use crate::domain::access::{EntitlementFacts, ProviderIdentity, ProviderKind};
use crate::ports::{AccessToken, IdentityProvider, ProviderError};

use super::oauth::{get_json, parse_url, OAuthClient, ProviderSetupError};

const IDENTITY_CALL: &str = "identity";

/// Login scope requested from the platform.
pub const CROWDFUNDING_SCOPE: &str = "identity identity[email]";

const IDENTITY_QUERY: &[(&str, &str)] = &[
    ("include", "memberships,memberships.currently_entitled_tiers"),
    ("fields[user]", "full_name,image_url,url"),
    ("fields[member]", "full_name,patron_status,last_charge_date"),
    ("fields[tier]", "title"),
];

/// Settings for the crowdfunding adapter.
#[derive(Debug, Clone)]
pub struct CrowdfundingClientConfig {
    pub oauth: OAuthClient,
    pub authorize_url: String,
    pub redirect_uri: String,
    /// API root, e.g. `https://www.patreon.com/api/oauth2/v2`.
    pub api_base_url: String,
}

/// `IdentityProvider` for the crowdfunding platform.
pub struct CrowdfundingProvider {
    oauth: OAuthClient,
    authorize_endpoint: Url,
    redirect_uri: String,
    identity_url: String,
    http: Client,
}

impl CrowdfundingProvider {
    pub fn new(config: CrowdfundingClientConfig, http: Client) -> Result<Self, ProviderSetupError> {
        let authorize_endpoint = parse_url("crowdfunding authorize", &config.authorize_url)?;
        parse_url("crowdfunding token", &config.oauth.token_url)?;
        parse_url("crowdfunding api", &config.api_base_url)?;

        Ok(Self {
            oauth: config.oauth,
            authorize_endpoint,
            redirect_uri: config.redirect_uri,
            identity_url: format!("{}/identity", config.api_base_url.trim_end_matches('/')),
            http,
        })
    }
}

#[async_trait]
impl IdentityProvider for CrowdfundingProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Crowdfunding
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn authorize_url(&self, state: &str) -> String {
        self.oauth.authorize_url(
            &self.authorize_endpoint,
            &self.redirect_uri,
            CROWDFUNDING_SCOPE,
            state,
            &[],
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, ProviderError> {
        self.oauth.exchange_code(&self.http, code, redirect_uri).await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let document = get_json(
            &self.http,
            &self.identity_url,
            IDENTITY_QUERY,
            access_token,
            IDENTITY_CALL,
        )
        .await?;

        check_embedded_errors(&document)?;

        Ok(identity_from_document(document))
    }
}

/// Second stage of the identity response check: errors reported inside a
/// successful HTTP response.
pub fn check_embedded_errors(document: &Value) -> Result<(), ProviderError> {
    let errors = match document.get("errors").and_then(Value::as_array) {
        Some(errors) if !errors.is_empty() => errors,
        _ => return Ok(()),
    };

    if errors.iter().any(is_unauthorized_error) {
        return Err(ProviderError::Unauthorized {
            call: IDENTITY_CALL,
        });
    }

    let first = &errors[0];
    let detail = ["detail", "title", "code_name"]
        .iter()
        .find_map(|key| first.get(*key).and_then(Value::as_str))
        .unwrap_or("unspecified error");
    let message = match first.get("status").map(status_text) {
        Some(status) if !status.is_empty() => format!("Embedded error {}: {}", status, detail),
        _ => format!("Embedded error: {}", detail),
    };

    Err(ProviderError::transport(IDENTITY_CALL, message))
}

fn is_unauthorized_error(error: &Value) -> bool {
    error.get("status").map(status_text).as_deref() == Some("401")
}

fn status_text(status: &Value) -> String {
    match status {
        Value::String(s) => s.trim().to_string(),
        Value::Number(n) => n.to_string(),
        _ => String::new(),
    }
}

fn identity_from_document(document: Value) -> ProviderIdentity {
    let attribute = |name: &str| {
        document
            .pointer(&format!("/data/attributes/{}", name))
            .and_then(Value::as_str)
            .filter(|s| !s.is_empty())
            .map(str::to_string)
    };

    ProviderIdentity {
        display_name: attribute("full_name"),
        photo_url: attribute("image_url"),
        profile_url: attribute("url"),
        email: attribute("email"),
        facts: EntitlementFacts::Crowdfunding(document),
    }
}
