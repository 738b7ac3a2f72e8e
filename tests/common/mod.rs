//! Shared fixtures for the integration tests.
//!
//! Upstream services (providers, CMS) are faked with small axum routers served
//! on ephemeral local ports, so the real HTTP adapters run unchanged.

#![allow(dead_code)]

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::response::Response;
use axum::Router;
use serde_json::Value;
use tokio::net::TcpListener;
use tower::ServiceExt;

use patron_gate::domain::content::Content;

// =============================================================================
// Fake Upstreams
// =============================================================================

/// Serves the router built by `app` on a local port and returns its base URL.
///
/// `app` receives the base URL, for fakes that must link back to themselves.
pub async fn spawn_upstream<F>(app: F) -> String
where
    F: FnOnce(String) -> Router,
{
    let listener = TcpListener::bind("127.0.0.1:0")
        .await
        .expect("bind fake upstream");
    let base = format!("http://{}", listener.local_addr().expect("local addr"));
    let router = app(base.clone());

    tokio::spawn(async move {
        axum::serve(listener, router).await.ok();
    });

    base
}

/// The bearer token of an upstream request, if any.
pub fn bearer(headers: &axum::http::HeaderMap) -> Option<&str> {
    headers
        .get(header::AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
}

// =============================================================================
// Gateway Requests
// =============================================================================

/// Sends a GET to the gateway router, optionally with a session cookie.
pub async fn get(router: &Router, uri: &str, token: Option<&str>) -> Response {
    let mut request = Request::builder().uri(uri);
    if let Some(token) = token {
        request = request.header(header::COOKIE, format!("token={}", token));
    }

    router
        .clone()
        .oneshot(request.body(Body::empty()).unwrap())
        .await
        .unwrap()
}

pub fn location(response: &Response) -> &str {
    response.headers()[header::LOCATION].to_str().unwrap()
}

pub fn set_cookie(response: &Response) -> &str {
    response.headers()[header::SET_COOKIE].to_str().unwrap()
}

pub fn assert_redirect(response: &Response, to: &str) {
    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    assert_eq!(location(response), to);
}

pub async fn json_body(response: Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

// =============================================================================
// Content Fixtures
// =============================================================================

pub fn content(id: &str, slug: &str, title: &str) -> Content {
    Content {
        id: id.to_string(),
        slug: slug.to_string(),
        title: title.to_string(),
        html: Some(format!("<p>{}</p>", title)),
        excerpt: None,
        feature_image: None,
        published_at: Some("2024-02-01T12:00:00.000Z".to_string()),
    }
}
