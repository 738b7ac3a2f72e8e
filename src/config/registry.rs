//! Known-member registry configuration

use std::collections::HashMap;
use std::path::PathBuf;

use serde::Deserialize;

use super::error::ValidationError;

/// Where video channel memberships are looked up
#[derive(Debug, Clone, Copy, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "lowercase")]
pub enum RegistryBackend {
    /// Inline members and/or a YAML members file
    #[default]
    Memory,
    /// Redis string keys `{key_prefix}{channel_id}`
    Redis,
}

/// Registry configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RegistryConfig {
    #[serde(default)]
    pub backend: RegistryBackend,

    /// Inline channel id → label entries (memory backend)
    #[serde(default)]
    pub members: HashMap<String, String>,

    /// YAML file of channel id → label or `{tier: label}` (memory backend)
    pub members_file: Option<PathBuf>,

    /// Redis connection URL (redis backend)
    pub redis_url: Option<String>,

    /// Key prefix override (redis backend)
    pub key_prefix: Option<String>,
}

impl RegistryConfig {
    /// Validate registry configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.backend != RegistryBackend::Redis {
            return Ok(());
        }
        match self.redis_url.as_deref() {
            None | Some("") => Err(ValidationError::MissingRequired("REGISTRY__REDIS_URL")),
            Some(url) if !url.starts_with("redis://") && !url.starts_with("rediss://") => {
                Err(ValidationError::InvalidRedisUrl)
            }
            Some(_) => Ok(()),
        }
    }
}
