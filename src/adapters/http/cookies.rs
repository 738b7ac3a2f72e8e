//! Session cookie encoding.
//!
//! The credential travels in a single `token` cookie. Logout overwrites it with
//! an empty, already-expired cookie; there is no server-side revocation.

use axum::http::{header, HeaderMap};

use crate::domain::access::IssuedCredential;

/// Name of the session cookie.
pub const SESSION_COOKIE: &str = "token";

const EPOCH: &str = "Thu, 01 Jan 1970 00:00:00 GMT";

/// Builds `Set-Cookie` values for the session cookie.
#[derive(Debug, Clone, Copy, Default)]
pub struct SessionCookies {
    secure: bool,
}

impl SessionCookies {
    /// `secure` adds the `Secure` attribute (production).
    pub fn new(secure: bool) -> Self {
        Self { secure }
    }

    /// Cookie carrying a freshly issued credential.
    pub fn issue(&self, credential: &IssuedCredential) -> String {
        format!(
            "{}={}; Max-Age={}; Expires={}; {}",
            SESSION_COOKIE,
            credential.token,
            credential.max_age_secs(),
            credential.expires_at.format("%a, %d %b %Y %H:%M:%S GMT"),
            self.attributes()
        )
    }

    /// Empty cookie that expires immediately.
    pub fn revoke(&self) -> String {
        format!(
            "{}=; Max-Age=0; Expires={}; {}",
            SESSION_COOKIE,
            EPOCH,
            self.attributes()
        )
    }

    fn attributes(&self) -> &'static str {
        if self.secure {
            "Path=/; HttpOnly; SameSite=Lax; Secure"
        } else {
            "Path=/; HttpOnly; SameSite=Lax"
        }
    }
}

/// Reads the session credential from the request's `Cookie` headers.
///
/// An empty value (left behind by logout) counts as absent.
pub fn session_token(headers: &HeaderMap) -> Option<String> {
    headers
        .get_all(header::COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .flat_map(|value| value.split(';'))
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
