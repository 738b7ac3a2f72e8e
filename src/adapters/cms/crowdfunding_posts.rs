//! Campaign post listing from the crowdfunding platform.
//!
//! Uses the creator's access token, not a visitor's. Pages are walked with
//! the opaque cursor found at `meta.pagination.cursors.next`.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Deserialize;

use crate::domain::content::SourcePost;
use crate::ports::{ContentError, PostPage, PostSource};

#[derive(Debug, Deserialize)]
struct PostsDocument {
    #[serde(default)]
    data: Vec<PostResource>,
    #[serde(default)]
    meta: Option<Meta>,
}

#[derive(Debug, Deserialize)]
struct PostResource {
    id: String,
    #[serde(default)]
    attributes: PostAttributes,
}

#[derive(Debug, Default, Deserialize)]
struct PostAttributes {
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    published_at: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Meta {
    #[serde(default)]
    pagination: Option<MetaPagination>,
}

#[derive(Debug, Deserialize)]
struct MetaPagination {
    #[serde(default)]
    cursors: Option<Cursors>,
}

#[derive(Debug, Deserialize)]
struct Cursors {
    #[serde(default)]
    next: Option<String>,
}

/// `PostSource` reading `GET {api}/campaigns/{id}/posts`.
pub struct CrowdfundingPostSource {
    posts_url: String,
    creator_token: SecretString,
    http: Client,
}

impl CrowdfundingPostSource {
    pub fn new(
        api_base_url: &str,
        campaign_id: &str,
        creator_access_token: impl Into<String>,
        http: Client,
    ) -> Self {
        Self {
            posts_url: format!(
                "{}/campaigns/{}/posts",
                api_base_url.trim_end_matches('/'),
                campaign_id
            ),
            creator_token: SecretString::new(creator_access_token.into()),
            http,
        }
    }
}

fn page_from_document(document: PostsDocument) -> PostPage {
    let next_cursor = document
        .meta
        .and_then(|m| m.pagination)
        .and_then(|p| p.cursors)
        .and_then(|c| c.next)
        .filter(|c| !c.is_empty());

    let posts = document
        .data
        .into_iter()
        .map(|resource| SourcePost {
            id: resource.id,
            title: resource.attributes.title.unwrap_or_default(),
            html: resource.attributes.content.unwrap_or_default(),
            published_at: resource.attributes.published_at,
        })
        .collect();

    PostPage { posts, next_cursor }
}

#[async_trait]
impl PostSource for CrowdfundingPostSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<PostPage, ContentError> {
        let mut request = self
            .http
            .get(&self.posts_url)
            .bearer_auth(self.creator_token.expose_secret())
            .query(&[("fields[post]", "title,content,published_at")]);
        if let Some(cursor) = cursor {
            request = request.query(&[("page[cursor]", cursor)]);
        }

        let response = request
            .send()
            .await
            .map_err(|e| ContentError::unavailable(format!("campaign posts: {}", e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED => return Err(ContentError::Unauthorized),
            status if !status.is_success() => {
                return Err(ContentError::unavailable(format!("campaign posts: HTTP {}", status)))
            }
            _ => {}
        }

        let document: PostsDocument = response
            .json()
            .await
            .map_err(|e| ContentError::invalid_response(e.to_string()))?;

        Ok(page_from_document(document))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn page_carries_posts_and_next_cursor() {
        let document: PostsDocument = serde_json::from_value(json!({
            "data": [{
                "id": "101",
                "type": "post",
                "attributes": {
                    "title": "Stream notes",
                    "content": "<p>hello</p>",
                    "published_at": "2021-03-04T05:06:07.000+00:00"
                }
            }],
            "meta": {"pagination": {"cursors": {"next": "abc"}, "total": 40}}
        }))
        .unwrap();

        let page = page_from_document(document);

        assert_eq!(page.next_cursor.as_deref(), Some("abc"));
        assert_eq!(page.posts[0].title, "Stream notes");
        assert_eq!(
            page.posts[0].published_at.as_deref(),
            Some("2021-03-04T05:06:07.000+00:00")
        );
    }

    #[test]
    fn last_page_has_no_cursor() {
        let document: PostsDocument = serde_json::from_value(json!({
            "data": [],
            "meta": {"pagination": {"cursors": {"next": null}}}
        }))
        .unwrap();

        assert_eq!(page_from_document(document).next_cursor, None);
    }

    #[test]
    fn missing_attributes_default_to_empty() {
        let document: PostsDocument =
            serde_json::from_value(json!({"data": [{"id": "7"}]})).unwrap();

        let page = page_from_document(document);
        assert_eq!(page.posts[0].html, "");
        assert_eq!(page.next_cursor, None);
    }
}
