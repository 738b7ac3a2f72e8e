//! Known-Member Registry port.
//!
//! The video platform exposes no tier concept to third parties, so the
//! operator keeps an external mapping from channel id to tier label. The
//! gateway only ever reads it.

use async_trait::async_trait;
use thiserror::Error;

/// Errors from the registry backend.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("Member registry unavailable: {0}")]
    Unavailable(String),
}

/// Read-only lookup from video channel id to tier label.
#[async_trait]
pub trait MemberRegistry: Send + Sync {
    /// Returns the tier label for a channel, or `None` if the channel is not
    /// a known member.
    async fn lookup(&self, channel_id: &str) -> Result<Option<String>, RegistryError>;
}
