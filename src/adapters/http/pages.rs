//! Page models and rendering.
//!
//! Handlers produce a [`Page`]; a [`PageRenderer`] turns it into a response
//! body. Templating lives outside this crate, so the bundled renderer emits
//! the page model as JSON.

use axum::response::{IntoResponse, Response};
use axum::Json;
use serde::Serialize;

use crate::domain::access::{ProviderKind, Visitor};
use crate::domain::content::Content;

/// One provider's authorization link on the login page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoginLink {
    pub provider: ProviderKind,
    pub url: String,
}

/// Everything a rendered page may show.
///
/// Visitors never carry provider tokens, so nothing here can leak one.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "page", rename_all = "snake_case")]
pub enum Page {
    /// Static CMS page (`index`, `privacy`).
    CmsPage { content: Content },
    Login { links: Vec<LoginLink> },
    Posts {
        visitor: Visitor,
        posts: Vec<Content>,
        page_number: u32,
    },
    Post { visitor: Visitor, post: Content },
    /// The post is missing or above the visitor's tier.
    TierPlaceholder { visitor: Visitor, slug: String },
    /// Authenticated, but no recognised tier.
    InsufficientTier { provider: ProviderKind },
    NotFound,
    /// Upstream failure. The message is generic.
    Error { message: String },
}

impl Page {
    pub fn error(message: impl Into<String>) -> Self {
        Page::Error {
            message: message.into(),
        }
    }
}

/// Turns page models into response bodies.
pub trait PageRenderer: Send + Sync {
    fn render(&self, page: &Page) -> Response;
}

/// Renders the page model as JSON.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonPageRenderer;

impl PageRenderer for JsonPageRenderer {
    fn render(&self, page: &Page) -> Response {
        Json(page).into_response()
    }
}
