//! Content items served by the CMS.

mod images;
mod import;

pub use images::{image_sources, rewrite_image_sources};
pub use import::{ImportReport, PostDraft, PostStatus, SourcePost};

use serde::{Deserialize, Serialize};

/// A post or page as returned by the CMS content API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Content {
    pub id: String,
    pub slug: String,
    pub title: String,
    #[serde(default)]
    pub html: Option<String>,
    #[serde(default)]
    pub excerpt: Option<String>,
    #[serde(default)]
    pub feature_image: Option<String>,
    #[serde(default)]
    pub published_at: Option<String>,
}

/// Page-based pagination for post listings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Pagination {
    /// 1-based page number.
    pub page: u32,
    pub limit: u32,
}

impl Pagination {
    pub fn new(page: u32, limit: u32) -> Self {
        Self {
            page: page.max(1),
            limit: limit.clamp(1, 100),
        }
    }

    pub fn first(limit: u32) -> Self {
        Self::new(1, limit)
    }
}

/// Outcome of a tier-restricted single post lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SinglePost {
    /// The post matched the caller's filter.
    Visible(Content),
    /// The post exists but the caller's tier excludes it, or existence could
    /// not be determined.
    Restricted,
    /// The CMS confirmed no post has this slug.
    Absent,
}

/// Returns true if `slug` is a CMS slug (lowercase ASCII letters, digits,
/// and single dashes). Anything else is rejected before it can reach a CMS
/// filter expression.
pub fn is_valid_slug(slug: &str) -> bool {
    !slug.is_empty()
        && slug.len() <= 191
        && !slug.starts_with('-')
        && !slug.ends_with('-')
        && !slug.contains("--")
        && slug
            .chars()
            .all(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || c == '-')
}
