//! Integration tests for the post importer.
//!
//! Wires `CrowdfundingPostSource`, `HttpImageFetcher`, and `GhostAdminClient`
//! to one fake server that plays both the crowdfunding campaign API and the
//! Ghost Admin API.

mod common;

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use axum::body::Bytes;
use axum::extract::{Path, Query, State};
use axum::http::{header, HeaderMap, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::routing::{delete, get, post};
use axum::{Json, Router};
use serde_json::{json, Value};

use common::{bearer, spawn_upstream};
use patron_gate::adapters::cms::{CrowdfundingPostSource, GhostAdminClient, HttpImageFetcher};
use patron_gate::adapters::providers::build_http_client;
use patron_gate::application::handlers::{ImportError, ImportPostsCommand, ImportPostsHandler};
use patron_gate::ports::ContentError;

const CREATOR_TOKEN: &str = "creator-token";
const ADMIN_KEY: &str =
    "6489a1b2c3d4e5f6a7b8c9d0:0123456789abcdef0123456789abcdef0123456789abcdef0123456789abcdef";

// =============================================================================
// Fake Campaign + CMS
// =============================================================================

#[derive(Default)]
struct Site {
    base: Mutex<String>,
    /// Serve the embedded image with a non-image content type.
    image_is_html: bool,
    /// Stored posts by id, as sent by the admin client.
    posts: Mutex<Vec<(String, Value)>>,
    deleted: Mutex<Vec<String>>,
    uploads: AtomicUsize,
    next_id: AtomicUsize,
    admin_auth: Mutex<Vec<String>>,
}

impl Site {
    fn base(&self) -> String {
        self.base.lock().unwrap().clone()
    }

    fn record_auth(&self, headers: &HeaderMap) {
        if let Some(value) = headers.get(header::AUTHORIZATION).and_then(|v| v.to_str().ok()) {
            self.admin_auth.lock().unwrap().push(value.to_string());
        }
    }

    fn stored(&self, slug: &str) -> Option<Value> {
        self.posts
            .lock()
            .unwrap()
            .iter()
            .find(|(_, post)| post["slug"] == slug)
            .map(|(_, post)| post.clone())
    }
}

fn site_router(site: Arc<Site>) -> Router {
    Router::new()
        .route("/campaigns/:id/posts", get(campaign_posts))
        .route("/media/:file", get(media))
        .route("/ghost/api/admin/posts/slug/:slug/", get(find_post))
        .route("/ghost/api/admin/posts/", post(add_post))
        .route("/ghost/api/admin/posts/:id/", delete(delete_post))
        .route("/ghost/api/admin/images/upload/", post(upload_image))
        .with_state(site)
}

async fn campaign_posts(
    State(site): State<Arc<Site>>,
    Path(campaign): Path<String>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
) -> Response {
    if bearer(&headers) != Some(CREATOR_TOKEN) {
        return StatusCode::UNAUTHORIZED.into_response();
    }
    if campaign != "790735" {
        return StatusCode::NOT_FOUND.into_response();
    }

    let base = site.base();
    match query.get("page[cursor]").map(String::as_str) {
        None => Json(json!({
            "data": [{
                "type": "post",
                "id": "101",
                "attributes": {
                    "title": "With image",
                    "content": format!(
                        "<p>Look</p><img src=\"{0}/media/a.png\"><img src=\"{0}/media/a.png\">",
                        base
                    ),
                    "published_at": "2021-03-01T10:00:00.000+00:00"
                }
            }],
            "meta": { "pagination": { "cursors": { "next": "cursor-2" }, "total": 2 } }
        }))
        .into_response(),
        Some("cursor-2") => Json(json!({
            "data": [{
                "type": "post",
                "id": "102",
                "attributes": {
                    "title": "Text only",
                    "content": format!("<p>Hi</p><img src=\"{}/media/a.png\">", base),
                    "published_at": "2021-04-01T10:00:00.000+00:00"
                }
            }],
            "meta": { "pagination": { "cursors": { "next": null }, "total": 2 } }
        }))
        .into_response(),
        Some(_) => StatusCode::BAD_REQUEST.into_response(),
    }
}

async fn media(State(site): State<Arc<Site>>) -> Response {
    if site.image_is_html {
        return ([(header::CONTENT_TYPE, "text/html")], "<html></html>").into_response();
    }
    (
        [(header::CONTENT_TYPE, "image/png")],
        vec![0x89u8, b'P', b'N', b'G', 0x0d, 0x0a, 0x1a, 0x0a],
    )
        .into_response()
}

async fn find_post(
    State(site): State<Arc<Site>>,
    Path(slug): Path<String>,
    headers: HeaderMap,
) -> Response {
    site.record_auth(&headers);
    let found = site
        .posts
        .lock()
        .unwrap()
        .iter()
        .find(|(_, post)| post["slug"] == slug.as_str())
        .map(|(id, post)| json!({ "id": id, "slug": post["slug"] }));

    match found {
        Some(post) => Json(json!({ "posts": [post] })).into_response(),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({ "errors": [{ "type": "NotFoundError" }] })),
        )
            .into_response(),
    }
}

async fn add_post(
    State(site): State<Arc<Site>>,
    Query(query): Query<HashMap<String, String>>,
    headers: HeaderMap,
    Json(body): Json<Value>,
) -> Response {
    site.record_auth(&headers);
    if query.get("source").map(String::as_str) != Some("html") {
        return StatusCode::BAD_REQUEST.into_response();
    }

    let post = body["posts"][0].clone();
    let id = format!("ghost-{}", site.next_id.fetch_add(1, Ordering::SeqCst));
    let slug = post["slug"].clone();
    site.posts.lock().unwrap().push((id.clone(), post));

    (
        StatusCode::CREATED,
        Json(json!({ "posts": [{ "id": id, "slug": slug }] })),
    )
        .into_response()
}

async fn delete_post(
    State(site): State<Arc<Site>>,
    Path(id): Path<String>,
    headers: HeaderMap,
) -> StatusCode {
    site.record_auth(&headers);
    let mut posts = site.posts.lock().unwrap();
    let before = posts.len();
    posts.retain(|(post_id, _)| post_id != &id);
    if posts.len() == before {
        return StatusCode::NOT_FOUND;
    }
    site.deleted.lock().unwrap().push(id);
    StatusCode::NO_CONTENT
}

async fn upload_image(State(site): State<Arc<Site>>, headers: HeaderMap, body: Bytes) -> Response {
    site.record_auth(&headers);
    if body.is_empty() {
        return StatusCode::BAD_REQUEST.into_response();
    }
    site.uploads.fetch_add(1, Ordering::SeqCst);

    (
        StatusCode::CREATED,
        Json(json!({
            "images": [{
                "url": format!("{}/content/images/2024/05/a.png", site.base()),
                "ref": "a.png"
            }]
        })),
    )
        .into_response()
}

// =============================================================================
// Fixture
// =============================================================================

async fn spawn_site(site: Site) -> Arc<Site> {
    let site = Arc::new(site);
    let routed = site.clone();
    spawn_upstream(move |base| {
        *routed.base.lock().unwrap() = base;
        site_router(routed)
    })
    .await;
    site
}

fn importer(site: &Site, creator_token: &str) -> ImportPostsHandler {
    let base = site.base();
    let http = build_http_client(Duration::from_secs(5)).unwrap();

    ImportPostsHandler::new(
        Arc::new(CrowdfundingPostSource::new(
            &base,
            "790735",
            creator_token,
            http.clone(),
        )),
        Arc::new(HttpImageFetcher::new(http.clone())),
        Arc::new(GhostAdminClient::new(&base, ADMIN_KEY, http).unwrap()),
    )
    .with_concurrency(2)
}

fn run(replace: bool) -> ImportPostsCommand {
    ImportPostsCommand {
        replace,
        limit: None,
    }
}

// =============================================================================
// Tests
// =============================================================================

#[tokio::test]
async fn first_run_imports_every_page_and_rehosts_images() {
    let site = spawn_site(Site::default()).await;

    let report = importer(&site, CREATOR_TOKEN).handle(run(false)).await.unwrap();

    assert_eq!(report.imported, 2);
    assert_eq!(report.failed, 0);
    assert_eq!(report.images_uploaded, 1);
    assert_eq!(report.images_reused, 1);
    assert!(report.is_clean());
    assert_eq!(site.uploads.load(Ordering::SeqCst), 1);

    let first = site.stored("patreon-101").unwrap();
    let html = first["html"].as_str().unwrap();
    assert!(html.contains("/content/images/2024/05/a.png"));
    assert!(!html.contains("/media/a.png"));
    assert_eq!(first["title"], "With image");
    assert_eq!(first["status"], "draft");
    assert_eq!(first["published_at"], "2021-03-01T10:00:00.000+00:00");

    assert!(site.stored("patreon-102").is_some());
    let auth = site.admin_auth.lock().unwrap();
    assert!(!auth.is_empty());
    assert!(auth.iter().all(|value| value.starts_with("Ghost ")));
}

#[tokio::test]
async fn rerun_skips_posts_imported_before() {
    let site = spawn_site(Site::default()).await;
    importer(&site, CREATOR_TOKEN).handle(run(false)).await.unwrap();

    let report = importer(&site, CREATOR_TOKEN).handle(run(false)).await.unwrap();

    assert_eq!(report.skipped, 2);
    assert_eq!(report.imported, 0);
    assert_eq!(site.uploads.load(Ordering::SeqCst), 1);
    assert_eq!(site.posts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn replace_deletes_and_recreates_earlier_imports() {
    let site = spawn_site(Site::default()).await;
    importer(&site, CREATOR_TOKEN).handle(run(false)).await.unwrap();

    let report = importer(&site, CREATOR_TOKEN).handle(run(true)).await.unwrap();

    assert_eq!(report.replaced, 2);
    assert_eq!(site.deleted.lock().unwrap().len(), 2);
    assert_eq!(site.posts.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn limit_stops_before_the_second_page() {
    let site = spawn_site(Site::default()).await;

    let report = importer(&site, CREATOR_TOKEN)
        .handle(ImportPostsCommand {
            replace: false,
            limit: Some(1),
        })
        .await
        .unwrap();

    assert_eq!(report.imported, 1);
    assert!(site.stored("patreon-102").is_none());
}

#[tokio::test]
async fn non_image_response_keeps_the_original_url() {
    let site = spawn_site(Site {
        image_is_html: true,
        ..Site::default()
    })
    .await;

    let report = importer(&site, CREATOR_TOKEN).handle(run(false)).await.unwrap();

    assert_eq!(report.imported, 2);
    assert!(report.images_failed >= 1);
    assert!(!report.is_clean());
    assert_eq!(site.uploads.load(Ordering::SeqCst), 0);
    let html = site.stored("patreon-101").unwrap()["html"]
        .as_str()
        .unwrap()
        .to_string();
    assert!(html.contains("/media/a.png"));
}

#[tokio::test]
async fn rejected_creator_token_aborts_the_run() {
    let site = spawn_site(Site::default()).await;

    let err = importer(&site, "wrong-token").handle(run(false)).await.unwrap_err();

    assert!(matches!(err, ImportError::Source(ContentError::Unauthorized)));
    assert!(site.posts.lock().unwrap().is_empty());
}
