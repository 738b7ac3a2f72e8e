//! CMS and importer adapters.
//!
//! - `GhostContentRepository` - Ghost Content API (read, tier-filtered)
//! - `GhostAdminClient` - Ghost Admin API (importer writes, image uploads,
//!   member provisioning)
//! - `CrowdfundingPostSource` - campaign posts for the importer
//! - `HttpImageFetcher` - downloads embedded images
//! - `InMemoryCms`, `InMemoryPostSource`, `InMemoryImageFetcher`,
//!   `InMemoryMemberProvisioner` - test doubles

mod crowdfunding_posts;
mod ghost_admin;
mod ghost_content;
mod ghost_members;
mod image_fetcher;
mod in_memory;

pub use crowdfunding_posts::CrowdfundingPostSource;
pub use ghost_admin::GhostAdminClient;
pub use ghost_content::GhostContentRepository;
pub use image_fetcher::HttpImageFetcher;
pub use in_memory::{
    InMemoryCms, InMemoryImageFetcher, InMemoryMemberProvisioner, InMemoryPostSource,
    IN_MEMORY_IMAGE_HOST,
};

use thiserror::Error;

/// API version sent with every Ghost request.
pub(crate) const GHOST_ACCEPT_VERSION: &str = "v5.0";

/// Errors raised while constructing a CMS adapter.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CmsSetupError {
    #[error("CMS URL must be an absolute http(s) URL: {0}")]
    InvalidUrl(String),

    #[error("Admin API key must have the form <id>:<hex secret>")]
    InvalidAdminKey,
}

/// `{site}/ghost/api/{api}` for a Ghost site URL.
pub(crate) fn ghost_api_root(cms_url: &str, api: &str) -> Result<String, CmsSetupError> {
    let site = cms_url.trim_end_matches('/');
    if !(site.starts_with("http://") || site.starts_with("https://")) || site.len() <= "https://".len() {
        return Err(CmsSetupError::InvalidUrl(cms_url.to_string()));
    }
    Ok(format!("{}/ghost/api/{}", site, api))
}
