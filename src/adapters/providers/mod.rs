//! Identity provider adapters.
//!
//! - `CrowdfundingProvider` - Patreon-shaped OAuth + JSON:API identity
//! - `VideoProvider` - Google OAuth + YouTube channels, tiered via the registry
//! - `MockIdentityProvider` - canned responses for tests

mod crowdfunding;
mod mock;
mod oauth;
mod video;

pub use crowdfunding::{
    check_embedded_errors, CrowdfundingClientConfig, CrowdfundingProvider, CROWDFUNDING_SCOPE,
};
pub use mock::MockIdentityProvider;
pub use oauth::{build_http_client, OAuthClient, ProviderSetupError};
pub use video::{VideoClientConfig, VideoProvider, VIDEO_SCOPE};
