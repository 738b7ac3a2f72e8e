//! HTTP adapter - the axum gateway.
//!
//! Routes, the access gate middleware, session cookies, and page rendering.

pub mod cookies;
pub mod handlers;
pub mod middleware;
pub mod pages;
pub mod routes;
mod state;

pub use cookies::{session_token, SessionCookies, SESSION_COOKIE};
pub use middleware::{access_gate, redirect_if_logged_in, CurrentVisitor};
pub use pages::{JsonPageRenderer, LoginLink, Page, PageRenderer};
pub use routes::{gateway_router, with_http_layers};
pub use state::AppState;
