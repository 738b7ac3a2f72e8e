//! Shared application state for the gateway router.

use std::sync::Arc;

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};

use super::cookies::SessionCookies;
use super::pages::{Page, PageRenderer};
use crate::application::handlers::{
    BrowseContentHandler, CompleteLoginHandler, ResolveVisitorHandler,
};

/// Shared application state containing all dependencies.
///
/// Cloned per request; every field is an `Arc` or `Copy`.
#[derive(Clone)]
pub struct AppState {
    pub resolve_visitor: Arc<ResolveVisitorHandler>,
    pub complete_login: Arc<CompleteLoginHandler>,
    pub content: Arc<BrowseContentHandler>,
    pub renderer: Arc<dyn PageRenderer>,
    pub cookies: SessionCookies,
}

impl AppState {
    /// Renders a page with an explicit status code.
    pub fn page(&self, status: StatusCode, page: &Page) -> Response {
        (status, self.renderer.render(page)).into_response()
    }
}
