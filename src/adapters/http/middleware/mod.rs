//! HTTP middleware for axum.
//!
//! - `access_gate` - Session verification, entitlement resolution, and the
//!   login shortcut for visitors who already hold a session

pub mod access_gate;

pub use access_gate::{
    access_error_response, access_gate, redirect_if_logged_in, CurrentVisitor, LOGIN_PATH,
    POSTS_PATH,
};
