//! Ghost Admin API adapter used by the importer and member provisioning.
//!
//! # Authentication
//!
//! The admin key has the form `{id}:{secret}` where `secret` is hex. Each
//! request carries a fresh short-lived HS256 JWT signed with the decoded
//! secret, `kid` set to the key id and `aud` set to `/admin/`:
//!
//! ```text
//! Authorization: Ghost <jwt>
//! ```

use async_trait::async_trait;
use chrono::Utc;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use reqwest::multipart::{Form, Part};
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::{Deserialize, Serialize};

use crate::domain::content::PostDraft;
use crate::ports::{ContentError, ContentPublisher, FetchedImage, PublishedPost};

use super::{ghost_api_root, CmsSetupError, GHOST_ACCEPT_VERSION};

const TOKEN_LIFETIME_SECS: i64 = 300;

#[derive(Debug, Serialize, Deserialize)]
struct AdminClaims {
    iat: i64,
    exp: i64,
    aud: String,
}

/// Admin API key split into its id and decoded secret.
struct AdminKey {
    id: String,
    encoding_key: EncodingKey,
}

impl AdminKey {
    fn parse(key: &str) -> Result<Self, CmsSetupError> {
        let (id, secret) = key.split_once(':').ok_or(CmsSetupError::InvalidAdminKey)?;
        if id.is_empty() {
            return Err(CmsSetupError::InvalidAdminKey);
        }
        let secret = hex::decode(secret).map_err(|_| CmsSetupError::InvalidAdminKey)?;
        if secret.is_empty() {
            return Err(CmsSetupError::InvalidAdminKey);
        }
        Ok(Self {
            id: id.to_string(),
            encoding_key: EncodingKey::from_secret(&secret),
        })
    }

    fn token(&self) -> Result<String, ContentError> {
        let now = Utc::now().timestamp();
        let claims = AdminClaims {
            iat: now,
            exp: now + TOKEN_LIFETIME_SECS,
            aud: "/admin/".to_string(),
        };
        let mut header = Header::new(Algorithm::HS256);
        header.kid = Some(self.id.clone());

        encode(&header, &claims, &self.encoding_key)
            .map_err(|e| ContentError::invalid_response(format!("Cannot sign admin token: {}", e)))
    }
}

#[derive(Debug, Deserialize)]
struct PostRecord {
    id: String,
    slug: String,
}

#[derive(Debug, Deserialize)]
struct PostsEnvelope {
    #[serde(default)]
    posts: Vec<PostRecord>,
}

#[derive(Debug, Serialize)]
struct NewPostsEnvelope<'a> {
    posts: [&'a PostDraft; 1],
}

#[derive(Debug, Deserialize)]
struct ImageRecord {
    url: String,
}

#[derive(Debug, Deserialize)]
struct ImagesEnvelope {
    #[serde(default)]
    images: Vec<ImageRecord>,
}

/// `ContentPublisher` backed by the Ghost Admin API.
pub struct GhostAdminClient {
    site_url: String,
    pub(super) api_root: String,
    key: AdminKey,
    pub(super) http: Client,
}

impl GhostAdminClient {
    pub fn new(cms_url: &str, admin_api_key: &str, http: Client) -> Result<Self, CmsSetupError> {
        Ok(Self {
            site_url: cms_url.trim_end_matches('/').to_string(),
            api_root: ghost_api_root(cms_url, "admin")?,
            key: AdminKey::parse(admin_api_key)?,
            http,
        })
    }

    fn authorized(&self, builder: RequestBuilder) -> Result<RequestBuilder, ContentError> {
        Ok(builder
            .header("Authorization", format!("Ghost {}", self.key.token()?))
            .header("Accept-Version", GHOST_ACCEPT_VERSION))
    }

    pub(super) async fn send(&self, builder: RequestBuilder, call: &str) -> Result<Response, ContentError> {
        let response = self
            .authorized(builder)?
            .send()
            .await
            .map_err(|e| ContentError::unavailable(format!("{}: {}", call, e)))?;

        match response.status() {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => Err(ContentError::Unauthorized),
            _ => Ok(response),
        }
    }
}

pub(super) async fn expect_success(response: Response, call: &str) -> Result<Response, ContentError> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    let body = response.text().await.unwrap_or_default();
    Err(ContentError::unavailable(format!(
        "{}: HTTP {} {}",
        call,
        status,
        body.chars().take(200).collect::<String>()
    )))
}

#[async_trait]
impl ContentPublisher for GhostAdminClient {
    async fn find_post(&self, slug: &str) -> Result<Option<PublishedPost>, ContentError> {
        let url = format!("{}/posts/slug/{}/", self.api_root, slug);
        let response = self.send(self.http.get(&url), "posts.read").await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }

        let envelope: PostsEnvelope = expect_success(response, "posts.read")
            .await?
            .json()
            .await
            .map_err(|e| ContentError::invalid_response(e.to_string()))?;

        Ok(envelope.posts.into_iter().next().map(|p| PublishedPost {
            id: p.id,
            slug: p.slug,
        }))
    }

    async fn add_post(&self, draft: &PostDraft) -> Result<PublishedPost, ContentError> {
        let url = format!("{}/posts/", self.api_root);
        let body = NewPostsEnvelope { posts: [draft] };
        let builder = self.http.post(&url).query(&[("source", "html")]).json(&body);

        let envelope: PostsEnvelope = expect_success(self.send(builder, "posts.add").await?, "posts.add")
            .await?
            .json()
            .await
            .map_err(|e| ContentError::invalid_response(e.to_string()))?;

        envelope
            .posts
            .into_iter()
            .next()
            .map(|p| PublishedPost {
                id: p.id,
                slug: p.slug,
            })
            .ok_or_else(|| ContentError::invalid_response("posts.add returned no post"))
    }

    async fn delete_post(&self, id: &str) -> Result<(), ContentError> {
        let url = format!("{}/posts/{}/", self.api_root, id);
        let response = self.send(self.http.delete(&url), "posts.delete").await?;
        expect_success(response, "posts.delete").await?;
        Ok(())
    }

    async fn upload_image(&self, image: FetchedImage) -> Result<String, ContentError> {
        let url = format!("{}/images/upload/", self.api_root);
        let file_name = image.file_name.clone();
        let part = Part::bytes(image.bytes)
            .file_name(image.file_name)
            .mime_str(&image.content_type)
            .map_err(|e| ContentError::invalid_response(format!("Bad content type: {}", e)))?;
        let form = Form::new().part("file", part).text("ref", file_name);

        let response = self.send(self.http.post(&url).multipart(form), "images.upload").await?;
        let envelope: ImagesEnvelope = expect_success(response, "images.upload")
            .await?
            .json()
            .await
            .map_err(|e| ContentError::invalid_response(e.to_string()))?;

        envelope
            .images
            .into_iter()
            .next()
            .map(|i| i.url)
            .ok_or_else(|| ContentError::invalid_response("images.upload returned no url"))
    }

    fn is_hosted(&self, url: &str) -> bool {
        url.starts_with(&format!("{}/content/images/", self.site_url))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jsonwebtoken::{decode, decode_header, DecodingKey, Validation};

    const ADMIN_KEY: &str = "6489a1b2c3d4e5f6a7b8c9d0:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

    #[test]
    fn admin_token_carries_kid_and_admin_audience() {
        let key = AdminKey::parse(ADMIN_KEY).unwrap();
        let token = key.token().unwrap();

        let header = decode_header(&token).unwrap();
        assert_eq!(header.kid.as_deref(), Some("6489a1b2c3d4e5f6a7b8c9d0"));

        let secret = hex::decode(ADMIN_KEY.split_once(':').unwrap().1).unwrap();
        let mut validation = Validation::new(Algorithm::HS256);
        validation.set_audience(&["/admin/"]);
        let claims = decode::<AdminClaims>(&token, &DecodingKey::from_secret(&secret), &validation)
            .unwrap()
            .claims;
        assert_eq!(claims.exp - claims.iat, TOKEN_LIFETIME_SECS);
    }

    #[test]
    fn malformed_admin_keys_are_rejected() {
        assert!(AdminKey::parse("no-colon").is_err());
        assert!(AdminKey::parse(":abcd").is_err());
        assert!(AdminKey::parse("id:not-hex").is_err());
        assert!(AdminKey::parse("id:").is_err());
    }

    #[test]
    fn hosted_urls_are_recognised() {
        let client = GhostAdminClient::new("https://cms.example.com/", ADMIN_KEY, Client::new()).unwrap();

        assert!(client.is_hosted("https://cms.example.com/content/images/2024/01/a.png"));
        assert!(!client.is_hosted("https://c10.patreonusercontent.com/a.png"));
    }

    #[test]
    fn new_post_body_wraps_single_post() {
        let draft = PostDraft {
            title: "T".to_string(),
            slug: "patreon-1".to_string(),
            html: "<p>x</p>".to_string(),
            status: crate::domain::content::PostStatus::Draft,
            created_at: None,
            published_at: None,
        };
        let json = serde_json::to_value(NewPostsEnvelope { posts: [&draft] }).unwrap();
        assert_eq!(json["posts"][0]["slug"], "patreon-1");
        assert_eq!(json["posts"][0]["status"], "draft");
    }
}
