//! HTTP plumbing shared by the OAuth provider adapters.

use std::time::Duration;

use reqwest::{Client, StatusCode, Url};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::ports::{AccessToken, ProviderError};

/// Errors raised while constructing a provider adapter.
#[derive(Debug, Error)]
pub enum ProviderSetupError {
    #[error("Invalid {field} URL '{value}': {message}")]
    InvalidUrl {
        field: &'static str,
        value: String,
        message: String,
    },

    #[error("Failed to build HTTP client: {0}")]
    HttpClient(#[from] reqwest::Error),
}

/// Build the outbound HTTP client used by every adapter.
///
/// Every request made through it is bounded by `timeout`.
pub fn build_http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("patron-gate/", env!("CARGO_PKG_VERSION")))
        .build()
}

pub(crate) fn parse_url(field: &'static str, value: &str) -> Result<Url, ProviderSetupError> {
    Url::parse(value).map_err(|e| ProviderSetupError::InvalidUrl {
        field,
        value: value.to_string(),
        message: e.to_string(),
    })
}

/// Registered OAuth client credentials.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    pub client_id: String,
    pub client_secret: SecretString,
    pub token_url: String,
}

impl OAuthClient {
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        token_url: impl Into<String>,
    ) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: SecretString::new(client_secret.into()),
            token_url: token_url.into(),
        }
    }

    /// Authorization URL with the standard code-flow parameters plus `extra`.
    pub fn authorize_url(
        &self,
        endpoint: &Url,
        redirect_uri: &str,
        scope: &str,
        state: &str,
        extra: &[(&str, &str)],
    ) -> String {
        let mut url = endpoint.clone();
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("response_type", "code")
                .append_pair("client_id", &self.client_id)
                .append_pair("redirect_uri", redirect_uri)
                .append_pair("scope", scope)
                .append_pair("state", state);
            for (key, value) in extra {
                query.append_pair(key, value);
            }
        }
        url.into()
    }

    /// One-shot authorization code exchange. No retries.
    pub async fn exchange_code(
        &self,
        http: &Client,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, ProviderError> {
        let response = http
            .post(&self.token_url)
            .form(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("client_id", self.client_id.as_str()),
                ("client_secret", self.client_secret.expose_secret().as_str()),
                ("redirect_uri", redirect_uri),
            ])
            .send()
            .await
            .map_err(|e| ProviderError::ExchangeFailed(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ProviderError::ExchangeFailed(format!("HTTP {}", status)));
        }

        let body: TokenResponse = response
            .json()
            .await
            .map_err(|e| ProviderError::ExchangeFailed(format!("Invalid token response: {}", e)))?;

        match body.access_token {
            Some(token) if !token.is_empty() => Ok(AccessToken::new(token)),
            _ => Err(ProviderError::ExchangeFailed(
                "Token response has no access_token".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
}

/// Authenticated GET returning a JSON body.
///
/// HTTP 401 is `Unauthorized`; any other failure is `Transport`.
pub(crate) async fn get_json(
    http: &Client,
    url: &str,
    query: &[(&str, &str)],
    access_token: &str,
    call: &'static str,
) -> Result<Value, ProviderError> {
    let response = http
        .get(url)
        .query(query)
        .bearer_auth(access_token)
        .send()
        .await
        .map_err(|e| ProviderError::transport(call, e.to_string()))?;

    let status = response.status();
    if status == StatusCode::UNAUTHORIZED {
        return Err(ProviderError::Unauthorized { call });
    }
    if !status.is_success() {
        return Err(ProviderError::transport(call, format!("HTTP {}", status)));
    }

    response
        .json::<Value>()
        .await
        .map_err(|e| ProviderError::transport(call, format!("Malformed JSON: {}", e)))
}
