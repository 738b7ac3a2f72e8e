//! Tier label tables and tag sets
//!
//! Labels are kept as `{label, tier}` lists rather than maps: map keys pass
//! through the config crate's key handling, and labels are case-sensitive
//! free text.

use std::collections::BTreeMap;

use serde::Deserialize;

use super::error::ValidationError;
use crate::domain::access::{TagFilterTable, Tier, TierResolver, TierTable};

/// One provider label mapped to an internal tier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierLabel {
    pub label: String,
    pub tier: Tier,
}

/// Tags visible to one tier
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct TierTags {
    pub tier: Tier,
    pub tags: Vec<String>,
}

/// Tier configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TiersConfig {
    /// Crowdfunding reward titles
    #[serde(default = "default_crowdfunding_titles")]
    pub crowdfunding_titles: Vec<TierLabel>,

    /// Member-registry labels for video channel members
    #[serde(default = "default_video_labels")]
    pub video_labels: Vec<TierLabel>,

    /// CMS tags per tier
    #[serde(default = "default_tag_sets")]
    pub tag_sets: Vec<TierTags>,
}

impl TiersConfig {
    pub fn tier_resolver(&self) -> Result<TierResolver, ValidationError> {
        Ok(TierResolver::new(
            label_table("crowdfunding_titles", &self.crowdfunding_titles)?,
            label_table("video_labels", &self.video_labels)?,
        ))
    }

    pub fn tag_filter_table(&self) -> Result<TagFilterTable, ValidationError> {
        let mut configured: BTreeMap<Tier, Vec<String>> = BTreeMap::new();
        for entry in &self.tag_sets {
            if configured.insert(entry.tier, entry.tags.clone()).is_some() {
                return Err(ValidationError::InvalidTierTable(format!(
                    "tag set for {} listed twice",
                    entry.tier
                )));
            }
        }
        TagFilterTable::new(configured)
            .map_err(|e| ValidationError::InvalidTierTable(e.to_string()))
    }

    /// Validate tier configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.tier_resolver()?;
        self.tag_filter_table()?;
        Ok(())
    }
}

impl Default for TiersConfig {
    fn default() -> Self {
        Self {
            crowdfunding_titles: default_crowdfunding_titles(),
            video_labels: default_video_labels(),
            tag_sets: default_tag_sets(),
        }
    }
}

fn label_table(name: &str, labels: &[TierLabel]) -> Result<TierTable, ValidationError> {
    for (i, entry) in labels.iter().enumerate() {
        if entry.label.trim().is_empty() {
            return Err(ValidationError::InvalidTierTable(format!(
                "{}: empty label",
                name
            )));
        }
        if labels[..i]
            .iter()
            .any(|earlier| earlier.label.trim() == entry.label.trim())
        {
            return Err(ValidationError::InvalidTierTable(format!(
                "{}: duplicate label '{}'",
                name, entry.label
            )));
        }
    }
    Ok(labels
        .iter()
        .map(|entry| (entry.label.clone(), entry.tier))
        .collect())
}

fn label(label: &str, tier: Tier) -> TierLabel {
    TierLabel {
        label: label.to_string(),
        tier,
    }
}

fn default_crowdfunding_titles() -> Vec<TierLabel> {
    vec![
        label("Стрим, видео без рекламы и письма", Tier::Entry),
        label("Стрим + видео без рекламы", Tier::Basic),
        label("Доступ в закулисье", Tier::Advanced),
    ]
}

fn default_video_labels() -> Vec<TierLabel> {
    vec![
        label("admin", Tier::Admin),
        label("Стрим + чат", Tier::Basic),
        label("Эксклюзив и черновики", Tier::Advanced),
    ]
}

fn default_tag_sets() -> Vec<TierTags> {
    let basic = vec!["hash-basic".to_string()];
    let advanced = vec!["hash-basic".to_string(), "hash-advanced".to_string()];
    vec![
        TierTags {
            tier: Tier::Entry,
            tags: basic.clone(),
        },
        TierTags {
            tier: Tier::Basic,
            tags: basic,
        },
        TierTags {
            tier: Tier::Advanced,
            tags: advanced.clone(),
        },
        TierTags {
            tier: Tier::Admin,
            tags: advanced,
        },
    ]
}
