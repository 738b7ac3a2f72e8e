//! Post import model: crowdfunding source posts and CMS drafts.

use serde::{Deserialize, Serialize};

/// A post as published on the crowdfunding platform.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourcePost {
    pub id: String,
    pub title: String,
    pub html: String,
    /// ISO 8601 publication time, if the platform reports one.
    pub published_at: Option<String>,
}

impl SourcePost {
    /// Stable CMS slug for this source post, so re-runs find earlier imports.
    pub fn import_slug(&self, prefix: &str) -> String {
        let id: String = self
            .id
            .chars()
            .filter(|c| c.is_ascii_alphanumeric())
            .collect::<String>()
            .to_ascii_lowercase();
        format!("{}-{}", prefix.trim_end_matches('-'), id)
    }
}

/// Status of a post created in the CMS.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PostStatus {
    #[default]
    Draft,
    Published,
}

/// A post ready to be written to the CMS admin API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PostDraft {
    pub title: String,
    pub slug: String,
    pub html: String,
    pub status: PostStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub published_at: Option<String>,
}

impl PostDraft {
    pub fn from_source(source: &SourcePost, slug: String, html: String, status: PostStatus) -> Self {
        Self {
            title: source.title.clone(),
            slug,
            html,
            status,
            created_at: source.published_at.clone(),
            published_at: source.published_at.clone(),
        }
    }
}

/// Summary of one importer run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ImportReport {
    pub imported: usize,
    pub replaced: usize,
    pub skipped: usize,
    pub failed: usize,
    pub images_uploaded: usize,
    pub images_reused: usize,
    pub images_failed: usize,
}

impl ImportReport {
    pub fn is_clean(&self) -> bool {
        self.failed == 0 && self.images_failed == 0
    }
}
