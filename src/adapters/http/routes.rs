//! Axum router configuration for the gateway.

use axum::{
    extract::Request,
    http::{header, HeaderValue, Method},
    middleware,
    routing::get,
    Router,
};
use tower::ServiceBuilder;
use tower_http::{
    compression::CompressionLayer,
    cors::{AllowOrigin, CorsLayer},
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};

use super::handlers::{
    get_post, health, home, list_posts, login, logout, oauth_redirect, privacy,
};
use super::middleware::{access_gate, redirect_if_logged_in};
use super::AppState;
use crate::config::ServerConfig;

/// Create the gateway router.
///
/// # Routes
///
/// ## Entry (redirect to `/posts` when already logged in)
/// - `GET /` - CMS `index` page
/// - `GET /login` - Provider login links
///
/// ## Gated (access gate)
/// - `GET /posts?page=N` - Tier-filtered post list
/// - `GET /posts/:slug` - Single post or tier placeholder
///
/// ## Open
/// - `GET /logout` - Clear session cookie
/// - `GET /oauth/redirect/:provider` - OAuth redirect target
/// - `GET /privacy` - CMS `privacy` page
/// - `GET /health` - Liveness check
pub fn gateway_router(state: AppState) -> Router {
    let gated = Router::new()
        .route("/posts", get(list_posts))
        .route("/posts/:slug", get(get_post))
        .route_layer(middleware::from_fn_with_state(state.clone(), access_gate));

    let entry = Router::new()
        .route("/", get(home))
        .route("/login", get(login))
        .route_layer(middleware::from_fn_with_state(
            state.clone(),
            redirect_if_logged_in,
        ));

    Router::new()
        .merge(gated)
        .merge(entry)
        .route("/logout", get(logout))
        .route("/oauth/redirect/:provider", get(oauth_redirect))
        .route("/privacy", get(privacy))
        .route("/health", get(health))
        .with_state(state)
}

/// Wraps the router in the request-scoped tower-http stack: request ids,
/// tracing, timeout, CORS, and gzip.
pub fn with_http_layers(router: Router, server: &ServerConfig) -> Router {
    router.layer(
        ServiceBuilder::new()
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
            .layer(
                TraceLayer::new_for_http().make_span_with(|request: &Request| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or("-");
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id = %request_id,
                    )
                }),
            )
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(TimeoutLayer::new(server.request_timeout()))
            .layer(cors_layer(server))
            .layer(CompressionLayer::new()),
    )
}

fn cors_layer(server: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = server
        .cors_origins_list()
        .iter()
        .filter_map(|origin| match HeaderValue::from_str(origin) {
            Ok(value) => Some(value),
            Err(_) => {
                tracing::warn!(origin = %origin, "Ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET])
        .allow_headers([header::CONTENT_TYPE])
        .allow_credentials(true)
}
