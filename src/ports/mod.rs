//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Access Ports
//!
//! - `CredentialStore` - Signs and verifies session credentials
//! - `IdentityProvider` - OAuth exchange and identity/entitlement lookup
//! - `MemberRegistry` - Video channel → tier label lookup
//!
//! ## Content Ports
//!
//! - `ContentRepository` - CMS content API (read)
//! - `ContentPublisher`, `PostSource`, `ImageFetcher` - Importer I/O
//! - `MemberProvisioner` - CMS member creation after video logins

mod content_repository;
mod credential_store;
mod identity_provider;
mod member_provisioner;
mod member_registry;
mod post_import;

pub use content_repository::{ContentError, ContentRepository};
pub use credential_store::CredentialStore;
pub use identity_provider::{AccessToken, IdentityProvider, IdentityProviders, ProviderError};
pub use member_provisioner::{MemberGrant, MemberProvisioner, ProvisionOutcome};
pub use member_registry::{MemberRegistry, RegistryError};
pub use post_import::{
    ContentPublisher, FetchedImage, ImageFetcher, PostPage, PostSource, PublishedPost,
};
