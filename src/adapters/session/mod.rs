//! Session credential adapters.
//!
//! - `JwtCredentialStore` - HS256 session cookie credentials

mod jwt_credential_store;

pub use jwt_credential_store::JwtCredentialStore;
