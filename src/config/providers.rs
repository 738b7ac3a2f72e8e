//! Identity provider configuration (crowdfunding and video platforms)

use serde::Deserialize;

use super::error::ValidationError;
use super::server::is_http_url;

/// Crowdfunding platform (Patreon API v2) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrowdfundingConfig {
    /// OAuth client id
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Registered redirect URL; defaults to `{public_url}/oauth/redirect/patreon`
    pub redirect_url: Option<String>,

    #[serde(default = "default_crowdfunding_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_crowdfunding_token_url")]
    pub token_url: String,

    #[serde(default = "default_crowdfunding_api_base_url")]
    pub api_base_url: String,

    /// Campaign whose posts the importer copies
    pub campaign_id: Option<String>,

    /// Creator access token used by the importer
    pub creator_access_token: Option<String>,
}

impl CrowdfundingConfig {
    pub fn redirect_url(&self, public_base: &str) -> String {
        self.redirect_url
            .clone()
            .unwrap_or_else(|| format!("{}/oauth/redirect/patreon", public_base))
    }

    /// Validate crowdfunding configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("CROWDFUNDING__CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingRequired("CROWDFUNDING__CLIENT_SECRET"));
        }
        validate_urls(
            "crowdfunding",
            &[&self.authorize_url, &self.token_url, &self.api_base_url],
            self.redirect_url.as_deref(),
        )
    }

    /// Validate the importer-only settings
    pub fn validate_importer(&self) -> Result<(), ValidationError> {
        if self.campaign_id.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired("CROWDFUNDING__CAMPAIGN_ID"));
        }
        if self.creator_access_token.as_deref().map_or(true, str::is_empty) {
            return Err(ValidationError::MissingRequired(
                "CROWDFUNDING__CREATOR_ACCESS_TOKEN",
            ));
        }
        if !is_http_url(&self.api_base_url) {
            return Err(ValidationError::InvalidUrl("crowdfunding"));
        }
        Ok(())
    }
}

impl Default for CrowdfundingConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: None,
            authorize_url: default_crowdfunding_authorize_url(),
            token_url: default_crowdfunding_token_url(),
            api_base_url: default_crowdfunding_api_base_url(),
            campaign_id: None,
            creator_access_token: None,
        }
    }
}

/// Video platform (Google OAuth + YouTube Data API) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct VideoConfig {
    /// OAuth client id
    #[serde(default)]
    pub client_id: String,

    /// OAuth client secret
    #[serde(default)]
    pub client_secret: String,

    /// Registered redirect URL; defaults to `{public_url}/oauth/redirect/youtube`
    pub redirect_url: Option<String>,

    #[serde(default = "default_video_authorize_url")]
    pub authorize_url: String,

    #[serde(default = "default_video_token_url")]
    pub token_url: String,

    #[serde(default = "default_video_api_base_url")]
    pub api_base_url: String,
}

impl VideoConfig {
    pub fn redirect_url(&self, public_base: &str) -> String {
        self.redirect_url
            .clone()
            .unwrap_or_else(|| format!("{}/oauth/redirect/youtube", public_base))
    }

    /// Validate video configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.client_id.is_empty() {
            return Err(ValidationError::MissingRequired("VIDEO__CLIENT_ID"));
        }
        if self.client_secret.is_empty() {
            return Err(ValidationError::MissingRequired("VIDEO__CLIENT_SECRET"));
        }
        validate_urls(
            "video",
            &[&self.authorize_url, &self.token_url, &self.api_base_url],
            self.redirect_url.as_deref(),
        )
    }
}

impl Default for VideoConfig {
    fn default() -> Self {
        Self {
            client_id: String::new(),
            client_secret: String::new(),
            redirect_url: None,
            authorize_url: default_video_authorize_url(),
            token_url: default_video_token_url(),
            api_base_url: default_video_api_base_url(),
        }
    }
}

fn validate_urls(
    section: &'static str,
    urls: &[&String],
    redirect_url: Option<&str>,
) -> Result<(), ValidationError> {
    if urls.iter().any(|url| !is_http_url(url)) || redirect_url.map_or(false, |u| !is_http_url(u)) {
        return Err(ValidationError::InvalidUrl(section));
    }
    Ok(())
}

fn default_crowdfunding_authorize_url() -> String {
    "https://www.patreon.com/oauth2/authorize".to_string()
}

fn default_crowdfunding_token_url() -> String {
    "https://www.patreon.com/api/oauth2/token".to_string()
}

fn default_crowdfunding_api_base_url() -> String {
    "https://www.patreon.com/api/oauth2/v2".to_string()
}

fn default_video_authorize_url() -> String {
    "https://accounts.google.com/o/oauth2/v2/auth".to_string()
}

fn default_video_token_url() -> String {
    "https://oauth2.googleapis.com/token".to_string()
}

fn default_video_api_base_url() -> String {
    "https://www.googleapis.com".to_string()
}
