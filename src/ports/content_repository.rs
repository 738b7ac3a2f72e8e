//! CMS content-read port.
//!
//! Read-only access to pages and posts. Filtering by tier happens before this
//! port is called: adapters receive an already-built filter expression.

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::access::FilterExpression;
use crate::domain::content::{Content, Pagination};

/// Errors from CMS adapters.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ContentError {
    /// The CMS could not be reached or answered with a server error.
    #[error("CMS unavailable: {0}")]
    Unavailable(String),

    /// The CMS rejected our API key.
    #[error("CMS rejected credentials")]
    Unauthorized,

    /// The CMS answered with something we could not interpret.
    #[error("Unexpected CMS response: {0}")]
    InvalidResponse(String),
}

impl ContentError {
    pub fn unavailable(message: impl Into<String>) -> Self {
        ContentError::Unavailable(message.into())
    }

    pub fn invalid_response(message: impl Into<String>) -> Self {
        ContentError::InvalidResponse(message.into())
    }
}

/// CMS content API.
#[async_trait]
pub trait ContentRepository: Send + Sync {
    /// Read a static page by slug. `Ok(None)` if no page has that slug.
    async fn read_page(&self, slug: &str) -> Result<Option<Content>, ContentError>;

    /// List posts matching `filter`, newest first.
    async fn browse_posts(
        &self,
        filter: &FilterExpression,
        pagination: Pagination,
    ) -> Result<Vec<Content>, ContentError>;

    /// Read a post by slug without any tag filter. `Ok(None)` if absent.
    ///
    /// Used only to tell "filtered out" from "does not exist"; the result
    /// must never be shown to a visitor whose filter excluded it.
    async fn read_post(&self, slug: &str) -> Result<Option<Content>, ContentError>;
}
