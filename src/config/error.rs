//! Configuration error types

use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid port number")]
    InvalidPort,

    #[error("Invalid request timeout")]
    InvalidTimeout,

    #[error("Invalid URL for {0}")]
    InvalidUrl(&'static str),

    #[error("Invalid Redis URL format")]
    InvalidRedisUrl,

    #[error("Session signing secret must be at least 32 bytes")]
    SigningSecretTooShort,

    #[error("Session TTL must be between 1 second and 365 days")]
    InvalidSessionTtl,

    #[error("At least one identity provider must be configured")]
    NoProviderConfigured,

    #[error("Invalid tier table: {0}")]
    InvalidTierTable(String),

    #[error("Page size must be between 1 and 100")]
    InvalidPageSize,

    #[error("Import concurrency must be between 1 and 64")]
    InvalidConcurrency,

    #[error("Public URL must use HTTPS in production")]
    PublicUrlMustBeHttps,
}
