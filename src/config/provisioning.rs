//! CMS member provisioning after video logins

use std::collections::{HashMap, HashSet};

use serde::Deserialize;

use super::error::ValidationError;

/// A registry label and the CMS tier id granted for it
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct MemberTierId {
    pub label: String,
    pub tier_id: String,
}

/// `provisioning` section. Off unless enabled; needs the CMS admin key.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ProvisioningConfig {
    #[serde(default)]
    pub enabled: bool,

    /// Registry labels mapped to CMS tier ids. Labels without an entry are
    /// not provisioned.
    #[serde(default)]
    pub tier_ids: Vec<MemberTierId>,
}

impl ProvisioningConfig {
    pub fn tier_id_table(&self) -> HashMap<String, String> {
        self.tier_ids
            .iter()
            .map(|entry| (entry.label.clone(), entry.tier_id.clone()))
            .collect()
    }

    /// `admin_key_present` is whether `cms.admin_api_key` is set.
    pub fn validate(&self, admin_key_present: bool) -> Result<(), ValidationError> {
        if !self.enabled {
            return Ok(());
        }
        if !admin_key_present {
            return Err(ValidationError::MissingRequired("CMS__ADMIN_API_KEY"));
        }
        if self.tier_ids.is_empty() {
            return Err(ValidationError::InvalidTierTable(
                "provisioning.tier_ids is empty".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for entry in &self.tier_ids {
            if entry.tier_id.trim().is_empty() {
                return Err(ValidationError::InvalidTierTable(format!(
                    "provisioning label {:?} has no tier id",
                    entry.label
                )));
            }
            if !seen.insert(entry.label.as_str()) {
                return Err(ValidationError::InvalidTierTable(format!(
                    "provisioning label {:?} listed twice",
                    entry.label
                )));
            }
        }
        Ok(())
    }
}
