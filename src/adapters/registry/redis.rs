//! Redis-backed Known-Member Registry.
//!
//! One key per channel, `{prefix}{channel_id}`. The value is either the bare
//! tier label or a JSON record `{"tier": "<label>"}` as exported from the
//! previous realtime store.

use async_trait::async_trait;
use redis::aio::MultiplexedConnection;
use redis::AsyncCommands;

use crate::ports::{MemberRegistry, RegistryError};

use super::in_memory::MemberEntry;

/// Default key prefix for registry entries.
pub const DEFAULT_KEY_PREFIX: &str = "youtube-members:";

/// Registry that reads channel entries from Redis.
#[derive(Clone)]
pub struct RedisMemberRegistry {
    conn: MultiplexedConnection,
    key_prefix: String,
}

impl RedisMemberRegistry {
    pub fn new(conn: MultiplexedConnection) -> Self {
        Self {
            conn,
            key_prefix: DEFAULT_KEY_PREFIX.to_string(),
        }
    }

    pub fn with_key_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.key_prefix = prefix.into();
        self
    }

    /// Connect to `url` and build a registry.
    pub async fn connect(url: &str) -> Result<Self, RegistryError> {
        let client = redis::Client::open(url)
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        let conn = client
            .get_multiplexed_tokio_connection()
            .await
            .map_err(|e| RegistryError::Unavailable(e.to_string()))?;
        Ok(Self::new(conn))
    }

    fn key(&self, channel_id: &str) -> String {
        format!("{}{}", self.key_prefix, channel_id)
    }
}

/// Interpret a stored value as a tier label.
pub(crate) fn parse_stored_label(value: &str) -> String {
    match serde_json::from_str::<MemberEntry>(value) {
        Ok(entry) => entry.label().to_string(),
        Err(_) => value.to_string(),
    }
}

#[async_trait]
impl MemberRegistry for RedisMemberRegistry {
    async fn lookup(&self, channel_id: &str) -> Result<Option<String>, RegistryError> {
        let mut conn = self.conn.clone();
        let value: Option<String> = conn
            .get(self.key(channel_id))
            .await
            .map_err(|e: redis::RedisError| RegistryError::Unavailable(e.to_string()))?;

        Ok(value.map(|v| parse_stored_label(&v)))
    }
}
