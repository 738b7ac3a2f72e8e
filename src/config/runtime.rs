//! Outbound HTTP, content listing, and importer tuning

use serde::Deserialize;
use std::time::Duration;

use super::error::ValidationError;
use crate::domain::content::PostStatus;

/// Outbound HTTP client settings
#[derive(Debug, Clone, Deserialize)]
pub struct HttpClientConfig {
    /// Per-request timeout for provider and CMS calls
    #[serde(default = "default_http_timeout")]
    pub timeout_secs: u64,
}

impl HttpClientConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }

    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.timeout_secs == 0 || self.timeout_secs > 120 {
            return Err(ValidationError::InvalidTimeout);
        }
        Ok(())
    }
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: default_http_timeout(),
        }
    }
}

/// Content listing settings
#[derive(Debug, Clone, Deserialize)]
pub struct ContentConfig {
    /// Posts per listing page
    #[serde(default = "default_page_size")]
    pub page_size: u32,
}

impl ContentConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.page_size == 0 || self.page_size > 100 {
            return Err(ValidationError::InvalidPageSize);
        }
        Ok(())
    }
}

impl Default for ContentConfig {
    fn default() -> Self {
        Self {
            page_size: default_page_size(),
        }
    }
}

/// Importer settings
#[derive(Debug, Clone, Deserialize)]
pub struct ImportConfig {
    /// Concurrent image uploads
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Status of imported posts
    #[serde(default)]
    pub status: PostStatus,

    /// Slug prefix for imported posts (`{prefix}-{source id}`)
    #[serde(default = "default_slug_prefix")]
    pub slug_prefix: String,
}

impl ImportConfig {
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.concurrency == 0 || self.concurrency > 64 {
            return Err(ValidationError::InvalidConcurrency);
        }
        if self.slug_prefix.trim().is_empty() {
            return Err(ValidationError::MissingRequired("IMPORT__SLUG_PREFIX"));
        }
        Ok(())
    }
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            status: PostStatus::default(),
            slug_prefix: default_slug_prefix(),
        }
    }
}

fn default_http_timeout() -> u64 {
    10
}

fn default_page_size() -> u32 {
    25
}

fn default_concurrency() -> usize {
    4
}

fn default_slug_prefix() -> String {
    "patreon".to_string()
}
