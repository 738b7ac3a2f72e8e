//! Session credential configuration

use serde::Deserialize;

use super::error::ValidationError;
use super::Environment;

const DAY_SECS: u64 = 24 * 60 * 60;
/// Longest accepted `ttl_secs` override: one year.
pub const MAX_TTL_SECS: u64 = 365 * DAY_SECS;

/// Session cookie signing configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct SessionConfig {
    /// HMAC secret for session credentials and OAuth state
    #[serde(default)]
    pub signing_secret: String,

    /// Credential lifetime override in seconds
    pub ttl_secs: Option<u64>,
}

impl SessionConfig {
    /// Credential lifetime: the override if set, else 1 day in development
    /// and 7 days in production.
    pub fn ttl(&self, environment: &Environment) -> chrono::Duration {
        let secs = self.ttl_secs.unwrap_or(match environment {
            Environment::Production => 7 * DAY_SECS,
            _ => DAY_SECS,
        });
        chrono::Duration::seconds(secs.min(MAX_TTL_SECS) as i64)
    }

    /// Validate session configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.signing_secret.is_empty() {
            return Err(ValidationError::MissingRequired("SESSION__SIGNING_SECRET"));
        }
        if self.signing_secret.len() < 32 {
            return Err(ValidationError::SigningSecretTooShort);
        }
        match self.ttl_secs {
            Some(0) => return Err(ValidationError::InvalidSessionTtl),
            Some(secs) if secs > MAX_TTL_SECS => return Err(ValidationError::InvalidSessionTtl),
            _ => {}
        }
        Ok(())
    }
}
