//! Access gate middleware and extractors for axum.
//!
//! This module provides:
//! - `access_gate` - Layer that resolves the visitor behind the `token` cookie
//!   and injects it into request extensions
//! - `redirect_if_logged_in` - Layer for `/` and `/login` that sends visitors
//!   with a verifiable cookie straight to `/posts`
//! - `CurrentVisitor` - Extractor for handlers behind the gate
//!
//! # Architecture
//!
//! ```text
//! Request → access_gate → ResolveVisitorHandler → injects Visitor into extensions
//!                                  ↓
//!                          Handler → CurrentVisitor extractor reads from extensions
//! ```
//!
//! Every failure short-circuits the request:
//!
//! | Outcome | Response | Log level |
//! |---------|----------|-----------|
//! | no cookie | redirect `/login` | none |
//! | `InvalidCredential` | redirect `/login` | debug |
//! | `OAuthExchangeFailed` | redirect `/login` | warn |
//! | `UpstreamUnauthorized` | revoke cookie, redirect `/login` | info |
//! | `UpstreamTransport` | error page, 502 | error |
//! | `NoEntitlement` | insufficient tier page, 403 | info |

use axum::{
    extract::{Request, State},
    http::{header, StatusCode},
    middleware::Next,
    response::{IntoResponse, Redirect, Response},
};

use crate::adapters::http::cookies::session_token;
use crate::adapters::http::pages::Page;
use crate::adapters::http::AppState;
use crate::domain::access::{AccessError, Visitor};

/// Where unauthenticated visitors are sent.
pub const LOGIN_PATH: &str = "/login";

/// Where logged-in visitors land.
pub const POSTS_PATH: &str = "/posts";

/// Middleware that resolves the visitor for gated routes.
///
/// This middleware:
/// 1. Reads the `token` cookie; if absent, redirects to `/login` without
///    contacting any provider
/// 2. Verifies the credential (no network)
/// 3. Fetches fresh entitlements from the provider recorded in the credential
/// 4. On success, injects `Visitor` into request extensions
pub async fn access_gate(State(state): State<AppState>, mut request: Request, next: Next) -> Response {
    let Some(credential) = session_token(request.headers()) else {
        return Redirect::to(LOGIN_PATH).into_response();
    };

    let resolved = match state.resolve_visitor.authenticate(&credential) {
        Ok(payload) => state.resolve_visitor.authorize(&payload).await,
        Err(e) => Err(e),
    };

    match resolved {
        Ok(visitor) => {
            tracing::debug!(provider = %visitor.provider, tier = %visitor.tier, "Visitor admitted");
            request.extensions_mut().insert(visitor);
            next.run(request).await
        }
        Err(e) => access_error_response(&state, e),
    }
}

/// Middleware that skips the login views for visitors who already hold a
/// verifiable cookie. Checks the signature only; no provider calls.
pub async fn redirect_if_logged_in(
    State(state): State<AppState>,
    request: Request,
    next: Next,
) -> Response {
    let logged_in = session_token(request.headers())
        .map_or(false, |credential| {
            state.resolve_visitor.authenticate(&credential).is_ok()
        });

    if logged_in {
        return Redirect::to(POSTS_PATH).into_response();
    }
    next.run(request).await
}

/// Maps an access failure to its response, logging at the level its kind calls for.
pub fn access_error_response(state: &AppState, error: AccessError) -> Response {
    match &error {
        AccessError::InvalidCredential => {
            tracing::debug!("Invalid session credential");
            Redirect::to(LOGIN_PATH).into_response()
        }
        AccessError::OAuthExchangeFailed { provider, reason } => {
            tracing::warn!(provider = %provider, call = "oauth.exchange", reason = %reason, "OAuth exchange failed");
            Redirect::to(LOGIN_PATH).into_response()
        }
        AccessError::UpstreamUnauthorized { provider, call } => {
            tracing::info!(provider = %provider, call = %call, "Provider rejected access token, forcing re-login");
            (
                [(header::SET_COOKIE, state.cookies.revoke())],
                Redirect::to(LOGIN_PATH),
            )
                .into_response()
        }
        AccessError::UpstreamTransport {
            provider,
            call,
            reason,
        } => {
            tracing::error!(provider = %provider, call = %call, reason = %reason, "Provider call failed");
            state.page(
                StatusCode::BAD_GATEWAY,
                &Page::error("The membership service is not responding. Please try again later."),
            )
        }
        AccessError::NoEntitlement { provider } => {
            tracing::info!(provider = %provider, call = "tier.resolve", "No entitled tier");
            state.page(
                StatusCode::FORBIDDEN,
                &Page::InsufficientTier {
                    provider: *provider,
                },
            )
        }
    }
}

/// Extractor for handlers behind [`access_gate`].
///
/// # Example
///
/// ```ignore
/// async fn my_handler(CurrentVisitor(visitor): CurrentVisitor) -> impl IntoResponse {
///     format!("Tier: {}", visitor.tier)
/// }
/// ```
#[derive(Debug, Clone)]
pub struct CurrentVisitor(pub Visitor);

impl<S> axum::extract::FromRequestParts<S> for CurrentVisitor
where
    S: Send + Sync,
{
    type Rejection = Redirect;

    fn from_request_parts<'life0, 'life1, 'async_trait>(
        parts: &'life0 mut axum::http::request::Parts,
        _state: &'life1 S,
    ) -> std::pin::Pin<
        Box<dyn std::future::Future<Output = Result<Self, Self::Rejection>> + Send + 'async_trait>,
    >
    where
        'life0: 'async_trait,
        'life1: 'async_trait,
        Self: 'async_trait,
    {
        Box::pin(async move {
            parts
                .extensions
                .get::<Visitor>()
                .cloned()
                .map(CurrentVisitor)
                .ok_or_else(|| Redirect::to(LOGIN_PATH))
        })
    }
}
