//! Session payload carried inside the signed credential.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::ProviderKind;

/// Data sealed into the session credential.
///
/// The access token is the provider's delegated token. It is only ever sent
/// back to the provider that issued it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SessionPayload {
    pub provider: ProviderKind,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub profile_url: Option<String>,
}

impl SessionPayload {
    /// Creates a payload with only the provider and its access token.
    pub fn new(provider: ProviderKind, access_token: impl Into<String>) -> Self {
        Self {
            provider,
            access_token: access_token.into(),
            display_name: None,
            photo_url: None,
            profile_url: None,
        }
    }

    pub fn with_display_name(mut self, name: impl Into<String>) -> Self {
        self.display_name = Some(name.into());
        self
    }

    pub fn with_photo_url(mut self, url: impl Into<String>) -> Self {
        self.photo_url = Some(url.into());
        self
    }

    pub fn with_profile_url(mut self, url: impl Into<String>) -> Self {
        self.profile_url = Some(url.into());
        self
    }
}

/// A freshly signed credential, ready to be handed to the transport layer.
#[derive(Debug, Clone)]
pub struct IssuedCredential {
    pub token: String,
    pub expires_at: DateTime<Utc>,
}

impl IssuedCredential {
    /// Seconds until expiry, clamped at zero.
    pub fn max_age_secs(&self) -> i64 {
        (self.expires_at - Utc::now()).num_seconds().max(0)
    }
}
