//! CMS (Ghost) configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::server::is_http_url;

/// CMS configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CmsConfig {
    /// Site URL, e.g. `https://cms.example.com`
    #[serde(default)]
    pub url: String,

    /// Content API key (read)
    #[serde(default)]
    pub content_api_key: String,

    /// Admin API key `{id}:{hex secret}` (importer only)
    pub admin_api_key: Option<String>,
}

impl CmsConfig {
    /// Validate CMS configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("CMS__URL"));
        }
        if !is_http_url(&self.url) {
            return Err(ValidationError::InvalidUrl("cms.url"));
        }
        if self.content_api_key.is_empty() {
            return Err(ValidationError::MissingRequired("CMS__CONTENT_API_KEY"));
        }
        Ok(())
    }

    /// Validate the importer-only settings
    pub fn validate_importer(&self) -> Result<(), ValidationError> {
        if self.url.is_empty() {
            return Err(ValidationError::MissingRequired("CMS__URL"));
        }
        if !is_http_url(&self.url) {
            return Err(ValidationError::InvalidUrl("cms.url"));
        }
        match self.admin_api_key.as_deref() {
            Some(key) if key.contains(':') => Ok(()),
            _ => Err(ValidationError::MissingRequired("CMS__ADMIN_API_KEY")),
        }
    }
}
