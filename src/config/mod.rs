//! Application configuration module
//!
//! This module provides type-safe configuration loading using the `config` and
//! `dotenvy` crates. Values come from an optional `patron-gate.{yaml,toml,json}`
//! file, overridden by environment variables with the `PATRON_GATE` prefix;
//! nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use patron_gate::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Server running on {}", config.server.socket_addr().unwrap());
//! ```

mod cms;
mod error;
mod providers;
mod provisioning;
mod registry;
mod runtime;
mod server;
mod session;
mod tiers;

pub use cms::CmsConfig;
pub use error::{ConfigError, ValidationError};
pub use providers::{CrowdfundingConfig, VideoConfig};
pub use provisioning::{MemberTierId, ProvisioningConfig};
pub use registry::{RegistryBackend, RegistryConfig};
pub use runtime::{ContentConfig, HttpClientConfig, ImportConfig};
pub use server::{Environment, ServerConfig};
pub use session::SessionConfig;
pub use tiers::{TierLabel, TierTags, TiersConfig};

use serde::Deserialize;

/// Root application configuration
///
/// Shared by the gateway server and the importer. Load using
/// [`AppConfig::load()`], then call [`AppConfig::validate()`] (server) or
/// [`AppConfig::validate_importer()`] (importer).
#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    /// Server configuration (host, port, environment, public URL)
    #[serde(default)]
    pub server: ServerConfig,

    /// Session credential signing
    #[serde(default)]
    pub session: SessionConfig,

    /// Crowdfunding provider; disabled when absent
    pub crowdfunding: Option<CrowdfundingConfig>,

    /// Video provider; disabled when absent
    pub video: Option<VideoConfig>,

    /// CMS site and keys
    #[serde(default)]
    pub cms: CmsConfig,

    /// CMS members for video logins
    #[serde(default)]
    pub provisioning: ProvisioningConfig,

    /// Label tables and tag sets
    #[serde(default)]
    pub tiers: TiersConfig,

    /// Known-member registry
    #[serde(default)]
    pub registry: RegistryConfig,

    /// Outbound HTTP client
    #[serde(default)]
    pub http: HttpClientConfig,

    /// Content listing
    #[serde(default)]
    pub content: ContentConfig,

    /// Importer tuning
    #[serde(default)]
    pub import: ImportConfig,
}

impl AppConfig {
    /// Load configuration from file and environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads `patron-gate.{yaml,toml,json}` from the working directory if present
    /// 3. Reads environment variables with `PATRON_GATE` prefix
    /// 4. Uses `__` (double underscore) to separate nested values
    ///
    /// # Environment Variable Format
    ///
    /// - `PATRON_GATE__SERVER__PORT=8080` -> `server.port = 8080`
    /// - `PATRON_GATE__VIDEO__CLIENT_ID=...` -> `video.client_id = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("patron-gate").required(false))
            .add_source(
                config::Environment::default()
                    .prefix("PATRON_GATE")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate everything the gateway server needs
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` on the first invalid section, or
    /// `NoProviderConfigured` when neither provider is enabled.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.server.validate()?;
        self.session.validate()?;
        if self.crowdfunding.is_none() && self.video.is_none() {
            return Err(ValidationError::NoProviderConfigured);
        }
        if let Some(crowdfunding) = &self.crowdfunding {
            crowdfunding.validate()?;
        }
        if let Some(video) = &self.video {
            video.validate()?;
        }
        self.cms.validate()?;
        self.provisioning
            .validate(self.cms.admin_api_key.is_some())?;
        self.tiers.validate()?;
        self.registry.validate()?;
        self.http.validate()?;
        self.content.validate()?;
        Ok(())
    }

    /// Validate everything the importer needs
    pub fn validate_importer(&self) -> Result<(), ValidationError> {
        self.crowdfunding
            .as_ref()
            .ok_or(ValidationError::MissingRequired("CROWDFUNDING__CAMPAIGN_ID"))?
            .validate_importer()?;
        self.cms.validate_importer()?;
        self.http.validate()?;
        self.import.validate()?;
        Ok(())
    }

    /// Check if running in production environment
    pub fn is_production(&self) -> bool {
        self.server.is_production()
    }
}
