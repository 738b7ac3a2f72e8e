//! HTTP handlers for the gateway routes.
//!
//! These handlers connect axum routes to the application handlers and turn
//! their results into rendered pages.

use axum::extract::{Path, Query, State};
use axum::http::{header, StatusCode};
use axum::response::{IntoResponse, Redirect, Response};
use axum::Json;
use serde::Deserialize;

use super::middleware::{access_error_response, CurrentVisitor, LOGIN_PATH, POSTS_PATH};
use super::pages::{LoginLink, Page};
use super::AppState;
use crate::application::handlers::{CompleteLoginCommand, GetPostQuery, ListPostsQuery};
use crate::domain::access::ProviderKind;
use crate::domain::content::SinglePost;
use crate::ports::ContentError;

const UPSTREAM_ERROR: &str = "Content is temporarily unavailable. Please try again later.";

// ════════════════════════════════════════════════════════════════════════════════
// Query Parameters
// ════════════════════════════════════════════════════════════════════════════════

/// `?page=N` on the post listing.
#[derive(Debug, Default, Deserialize)]
pub struct ListParams {
    pub page: Option<u32>,
}

/// Parameters the provider appends to the OAuth redirect.
#[derive(Debug, Default, Deserialize)]
pub struct RedirectParams {
    pub code: Option<String>,
    pub state: Option<String>,
    /// Set when the visitor declined consent.
    pub error: Option<String>,
}

// ════════════════════════════════════════════════════════════════════════════════
// Ungated
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /` - the CMS `index` page.
pub async fn home(State(state): State<AppState>) -> Response {
    cms_page(&state, "index").await
}

/// `GET /privacy` - the CMS `privacy` page.
pub async fn privacy(State(state): State<AppState>) -> Response {
    cms_page(&state, "privacy").await
}

async fn cms_page(state: &AppState, slug: &str) -> Response {
    match state.content.get_page(slug).await {
        Ok(Some(content)) => state.page(StatusCode::OK, &Page::CmsPage { content }),
        Ok(None) => {
            tracing::warn!(slug = %slug, "CMS page missing");
            state.page(StatusCode::NOT_FOUND, &Page::NotFound)
        }
        Err(e) => content_error_response(state, "pages.read", e),
    }
}

/// `GET /login` - authorization links for every configured provider.
pub async fn login(State(state): State<AppState>) -> Response {
    let links = state
        .complete_login
        .login_links()
        .into_iter()
        .map(|(provider, url)| LoginLink { provider, url })
        .collect();

    state.page(StatusCode::OK, &Page::Login { links })
}

/// `GET /logout` - clear the session cookie.
pub async fn logout(State(state): State<AppState>) -> Response {
    (
        [(header::SET_COOKIE, state.cookies.revoke())],
        Redirect::to("/"),
    )
        .into_response()
}

/// `GET /oauth/redirect/:provider` - finish the OAuth round trip.
pub async fn oauth_redirect(
    State(state): State<AppState>,
    Path(provider): Path<String>,
    Query(params): Query<RedirectParams>,
) -> Response {
    let Ok(provider) = provider.parse::<ProviderKind>() else {
        return state.page(StatusCode::NOT_FOUND, &Page::NotFound);
    };

    if let Some(error) = params.error {
        tracing::info!(provider = %provider, call = "oauth.authorize", error = %error, "Authorization declined");
        return Redirect::to(LOGIN_PATH).into_response();
    }

    let cmd = CompleteLoginCommand {
        provider,
        code: params.code.unwrap_or_default(),
        state: params.state.unwrap_or_default(),
    };

    match state.complete_login.handle(cmd).await {
        Ok(issued) => (
            [(header::SET_COOKIE, state.cookies.issue(&issued))],
            Redirect::to(POSTS_PATH),
        )
            .into_response(),
        Err(e) => access_error_response(&state, e),
    }
}

/// `GET /health` - liveness check.
pub async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

// ════════════════════════════════════════════════════════════════════════════════
// Gated
// ════════════════════════════════════════════════════════════════════════════════

/// `GET /posts?page=N` - posts visible to the visitor's tier.
pub async fn list_posts(
    State(state): State<AppState>,
    CurrentVisitor(visitor): CurrentVisitor,
    Query(params): Query<ListParams>,
) -> Response {
    let page = params.page.unwrap_or(1).max(1);
    let query = ListPostsQuery {
        tier: visitor.tier,
        page,
    };

    match state.content.list_posts(query).await {
        Ok(posts) => state.page(
            StatusCode::OK,
            &Page::Posts {
                visitor,
                posts,
                page_number: page,
            },
        ),
        Err(e) => content_error_response(&state, "posts.browse", e),
    }
}

/// `GET /posts/:slug` - one post, or the tier placeholder.
pub async fn get_post(
    State(state): State<AppState>,
    CurrentVisitor(visitor): CurrentVisitor,
    Path(slug): Path<String>,
) -> Response {
    let query = GetPostQuery {
        tier: visitor.tier,
        slug: slug.clone(),
    };

    match state.content.get_post(query).await {
        Ok(SinglePost::Visible(post)) => state.page(StatusCode::OK, &Page::Post { visitor, post }),
        Ok(SinglePost::Restricted) => state.page(
            StatusCode::OK,
            &Page::TierPlaceholder { visitor, slug },
        ),
        Ok(SinglePost::Absent) => state.page(
            StatusCode::NOT_FOUND,
            &Page::TierPlaceholder { visitor, slug },
        ),
        Err(e) => content_error_response(&state, "posts.read", e),
    }
}

fn content_error_response(state: &AppState, call: &'static str, error: ContentError) -> Response {
    tracing::error!(provider = "cms", call = %call, error = %error, "CMS call failed");
    state.page(StatusCode::BAD_GATEWAY, &Page::error(UPSTREAM_ERROR))
}
