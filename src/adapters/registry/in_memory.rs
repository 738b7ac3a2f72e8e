//! In-memory Known-Member Registry.
//!
//! Loaded once at startup from inline configuration or from a YAML/JSON file
//! mapping channel ids to tier labels:
//!
//! ```yaml
//! UCxxxxxxxxxxxxxxxxxxxxxx: "Стрим + чат"
//! UCyyyyyyyyyyyyyyyyyyyyyy:
//!   tier: "Эксклюзив и черновики"
//! ```

use std::collections::HashMap;
use std::path::Path;

use async_trait::async_trait;
use serde::Deserialize;

use crate::ports::{MemberRegistry, RegistryError};

/// A registry entry: either a bare label or a record with a `tier` field.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MemberEntry {
    Label(String),
    Record { tier: String },
}

impl MemberEntry {
    pub fn label(&self) -> &str {
        match self {
            MemberEntry::Label(label) => label,
            MemberEntry::Record { tier } => tier,
        }
    }
}

/// Read-only registry held in memory.
#[derive(Debug, Clone, Default)]
pub struct InMemoryMemberRegistry {
    members: HashMap<String, String>,
}

impl InMemoryMemberRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_member(mut self, channel_id: impl Into<String>, label: impl Into<String>) -> Self {
        self.members.insert(channel_id.into(), label.into());
        self
    }

    /// Parse registry entries from YAML (JSON is accepted too).
    pub fn from_yaml(source: &str) -> Result<Self, RegistryError> {
        let entries: HashMap<String, MemberEntry> = serde_yaml::from_str(source)
            .map_err(|e| RegistryError::Unavailable(format!("Invalid registry file: {}", e)))?;
        Ok(entries.into_iter().collect())
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, RegistryError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|e| {
            RegistryError::Unavailable(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let registry = Self::from_yaml(&source)?;
        tracing::info!(path = %path.display(), members = registry.len(), "Loaded member registry");
        Ok(registry)
    }

    pub fn len(&self) -> usize {
        self.members.len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, MemberEntry)> for InMemoryMemberRegistry {
    fn from_iter<I: IntoIterator<Item = (K, MemberEntry)>>(iter: I) -> Self {
        Self {
            members: iter
                .into_iter()
                .map(|(id, entry)| (id.into(), entry.label().to_string()))
                .collect(),
        }
    }
}

#[async_trait]
impl MemberRegistry for InMemoryMemberRegistry {
    async fn lookup(&self, channel_id: &str) -> Result<Option<String>, RegistryError> {
        Ok(self.members.get(channel_id).cloned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[tokio::test]
    async fn lookup_returns_label_for_known_channel() {
        let registry = InMemoryMemberRegistry::new().with_member("UC1", "Стрим + чат");

        assert_eq!(registry.lookup("UC1").await.unwrap().as_deref(), Some("Стрим + чат"));
        assert_eq!(registry.lookup("UC2").await.unwrap(), None);
    }

    #[test]
    fn yaml_accepts_both_entry_shapes() {
        let registry = InMemoryMemberRegistry::from_yaml(
            "UC1: \"Стрим + чат\"\nUC2:\n  tier: admin\n",
        )
        .unwrap();

        assert_eq!(registry.len(), 2);
        assert_eq!(registry.members.get("UC2").map(String::as_str), Some("admin"));
    }

    #[tokio::test]
    async fn loads_json_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        write!(file, r#"{{"UCabc": {{"tier": "Эксклюзив и черновики"}}}}"#).unwrap();

        let registry = InMemoryMemberRegistry::from_file(file.path()).unwrap();

        assert_eq!(
            registry.lookup("UCabc").await.unwrap().as_deref(),
            Some("Эксклюзив и черновики")
        );
    }

    #[test]
    fn missing_file_is_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let err = InMemoryMemberRegistry::from_file(dir.path().join("absent.yaml")).unwrap_err();
        assert!(matches!(err, RegistryError::Unavailable(_)));
    }

    #[test]
    fn malformed_yaml_is_rejected() {
        assert!(InMemoryMemberRegistry::from_yaml("- just\n- a list\n").is_err());
    }
}
