//! Ghost Content API adapter.
//!
//! Read-only, authenticated with the content API key as a `key` query
//! parameter. Filter expressions are passed through verbatim; they are built
//! by the domain from validated tags and slugs.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::access::FilterExpression;
use crate::domain::content::{Content, Pagination};
use crate::ports::{ContentError, ContentRepository};

use super::{ghost_api_root, CmsSetupError, GHOST_ACCEPT_VERSION};

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<Content>,
}

#[derive(Debug, Deserialize)]
struct PagesEnvelope {
    #[serde(default)]
    pages: Vec<Content>,
}

/// `ContentRepository` backed by the Ghost Content API.
pub struct GhostContentRepository {
    api_root: String,
    key: SecretString,
    http: Client,
}

impl GhostContentRepository {
    pub fn new(cms_url: &str, content_api_key: impl Into<String>, http: Client) -> Result<Self, CmsSetupError> {
        Ok(Self {
            api_root: ghost_api_root(cms_url, "content")?,
            key: SecretString::new(content_api_key.into()),
            http,
        })
    }

    /// GET a content endpoint. `Ok(None)` on 404.
    async fn get<T: serde::de::DeserializeOwned>(
        &self,
        path: &str,
        query: &[(&str, String)],
    ) -> Result<Option<T>, ContentError> {
        let url = format!("{}/{}", self.api_root, path);
        let response = self
            .http
            .get(&url)
            .header("Accept-Version", GHOST_ACCEPT_VERSION)
            .query(&[("key", self.key.expose_secret().as_str())])
            .query(query)
            .send()
            .await
            .map_err(|e| ContentError::unavailable(e.to_string()))?;

        match response.status() {
            StatusCode::NOT_FOUND => return Ok(None),
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => {
                return Err(ContentError::Unauthorized)
            }
            status if !status.is_success() => {
                return Err(ContentError::unavailable(format!("HTTP {} from {}", status, path)))
            }
            _ => {}
        }

        response
            .json::<T>()
            .await
            .map(Some)
            .map_err(|e| ContentError::invalid_response(e.to_string()))
    }
}

#[async_trait]
impl ContentRepository for GhostContentRepository {
    async fn read_page(&self, slug: &str) -> Result<Option<Content>, ContentError> {
        let envelope: Option<PagesEnvelope> = self.get(&format!("pages/slug/{}/", slug), &[]).await?;
        Ok(envelope.and_then(|e| e.pages.into_iter().next()))
    }

    async fn browse_posts(
        &self,
        filter: &FilterExpression,
        pagination: Pagination,
    ) -> Result<Vec<Content>, ContentError> {
        let query = [
            ("limit", pagination.limit.to_string()),
            ("page", pagination.page.to_string()),
            ("filter", filter.as_str().to_string()),
        ];
        let envelope: Option<PostsEnvelope> = self.get("posts/", &query).await?;
        Ok(envelope.map(|e| e.posts).unwrap_or_default())
    }

    async fn read_post(&self, slug: &str) -> Result<Option<Content>, ContentError> {
        let envelope: Option<PostsEnvelope> = self.get(&format!("posts/slug/{}/", slug), &[]).await?;
        Ok(envelope.and_then(|e| e.posts.into_iter().next()))
    }
}
