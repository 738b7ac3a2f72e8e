//! Composition root shared by the server and importer binaries.
//!
//! Turns a validated [`AppConfig`] into wired adapters and handlers.

use std::sync::Arc;

use reqwest::Client;
use secrecy::SecretString;
use thiserror::Error;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::adapters::cms::{
    CmsSetupError, CrowdfundingPostSource, GhostAdminClient, GhostContentRepository,
    HttpImageFetcher,
};
use crate::adapters::http::{AppState, JsonPageRenderer, SessionCookies};
use crate::adapters::providers::{
    build_http_client, CrowdfundingClientConfig, CrowdfundingProvider, OAuthClient,
    ProviderSetupError, VideoClientConfig, VideoProvider,
};
use crate::adapters::registry::{InMemoryMemberRegistry, RedisMemberRegistry};
use crate::adapters::session::JwtCredentialStore;
use crate::application::handlers::{
    BrowseContentHandler, CompleteLoginHandler, ImportPostsHandler, ProvisionMemberHandler,
    ResolveVisitorHandler,
};
use crate::config::{AppConfig, RegistryBackend, RegistryConfig, ServerConfig, ValidationError};
use crate::domain::access::OAuthStateSigner;
use crate::ports::{CredentialStore, IdentityProviders, MemberRegistry, RegistryError};

/// Errors that abort startup.
#[derive(Debug, Error)]
pub enum StartupError {
    #[error("Invalid configuration: {0}")]
    Config(#[from] ValidationError),

    #[error("HTTP client setup failed: {0}")]
    HttpClient(#[from] reqwest::Error),

    #[error(transparent)]
    Provider(#[from] ProviderSetupError),

    #[error(transparent)]
    Cms(#[from] CmsSetupError),

    #[error("Member registry unavailable: {0}")]
    Registry(#[from] RegistryError),
}

/// Install the global tracing subscriber.
///
/// `RUST_LOG` wins over `server.log_level`. Production logs are JSON.
pub fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&server.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    if server.is_production() {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }
}

/// Build the gateway state: credential store, providers, resolver, and CMS.
pub async fn build_app_state(config: &AppConfig) -> Result<AppState, StartupError> {
    let http = build_http_client(config.http.timeout())?;

    let secret = SecretString::new(config.session.signing_secret.clone());
    let credentials: Arc<dyn CredentialStore> = Arc::new(JwtCredentialStore::new(
        &secret,
        config.session.ttl(&config.server.environment),
    ));
    let state_signer = Arc::new(OAuthStateSigner::new(secret));

    let providers = build_providers(config, &http).await?;
    let mut complete_login =
        CompleteLoginHandler::new(credentials.clone(), providers.clone(), state_signer);
    if let Some(provisioning) = build_member_provisioning(config, &http)? {
        complete_login = complete_login.with_member_provisioning(provisioning);
    }
    let resolver = Arc::new(config.tiers.tier_resolver()?);
    let filters = Arc::new(config.tiers.tag_filter_table()?);
    let content = Arc::new(GhostContentRepository::new(
        &config.cms.url,
        config.cms.content_api_key.clone(),
        http,
    )?);

    Ok(AppState {
        resolve_visitor: Arc::new(ResolveVisitorHandler::new(
            credentials,
            providers,
            resolver,
        )),
        complete_login: Arc::new(complete_login),
        content: Arc::new(BrowseContentHandler::new(
            content,
            filters,
            config.content.page_size,
        )),
        renderer: Arc::new(JsonPageRenderer),
        cookies: SessionCookies::new(config.is_production()),
    })
}

async fn build_providers(
    config: &AppConfig,
    http: &Client,
) -> Result<IdentityProviders, StartupError> {
    let public_base = config.server.public_base();
    let mut providers = IdentityProviders::new();

    if let Some(crowdfunding) = &config.crowdfunding {
        let provider = CrowdfundingProvider::new(
            CrowdfundingClientConfig {
                oauth: OAuthClient::new(
                    &crowdfunding.client_id,
                    &crowdfunding.client_secret,
                    &crowdfunding.token_url,
                ),
                authorize_url: crowdfunding.authorize_url.clone(),
                redirect_uri: crowdfunding.redirect_url(&public_base),
                api_base_url: crowdfunding.api_base_url.clone(),
            },
            http.clone(),
        )?;
        providers = providers.with(Arc::new(provider));
        tracing::info!(provider = "crowdfunding", "Identity provider enabled");
    }

    if let Some(video) = &config.video {
        let registry = build_registry(&config.registry).await?;
        let mut provider = VideoProvider::new(
            VideoClientConfig {
                oauth: OAuthClient::new(&video.client_id, &video.client_secret, &video.token_url),
                authorize_url: video.authorize_url.clone(),
                redirect_uri: video.redirect_url(&public_base),
                api_base_url: video.api_base_url.clone(),
            },
            registry,
            http.clone(),
        )?;
        if config.provisioning.enabled {
            provider = provider.with_email_scope();
        }
        providers = providers.with(Arc::new(provider));
        tracing::info!(provider = "video", "Identity provider enabled");
    }

    Ok(providers)
}

/// CMS member provisioning for video logins, when `provisioning.enabled`.
pub fn build_member_provisioning(
    config: &AppConfig,
    http: &Client,
) -> Result<Option<Arc<ProvisionMemberHandler>>, StartupError> {
    if !config.provisioning.enabled {
        return Ok(None);
    }
    let admin_key = config
        .cms
        .admin_api_key
        .as_deref()
        .ok_or(ValidationError::MissingRequired("CMS__ADMIN_API_KEY"))?;

    let admin = GhostAdminClient::new(&config.cms.url, admin_key, http.clone())?;
    tracing::info!(
        tiers = config.provisioning.tier_ids.len(),
        "CMS member provisioning enabled"
    );
    Ok(Some(Arc::new(ProvisionMemberHandler::new(
        Arc::new(admin),
        config.provisioning.tier_id_table(),
    ))))
}

/// Build the Known-Member Registry selected by `registry.backend`.
pub async fn build_registry(
    config: &RegistryConfig,
) -> Result<Arc<dyn MemberRegistry>, StartupError> {
    match config.backend {
        RegistryBackend::Memory => {
            let mut registry = match &config.members_file {
                Some(path) => InMemoryMemberRegistry::from_file(path)?,
                None => InMemoryMemberRegistry::new(),
            };
            for (channel_id, label) in &config.members {
                registry = registry.with_member(channel_id, label);
            }
            tracing::info!(members = registry.len(), "Member registry loaded");
            Ok(Arc::new(registry))
        }
        RegistryBackend::Redis => {
            let url = config
                .redis_url
                .as_deref()
                .ok_or(ValidationError::MissingRequired("REGISTRY__REDIS_URL"))?;
            let mut registry = RedisMemberRegistry::connect(url).await?;
            if let Some(prefix) = &config.key_prefix {
                registry = registry.with_key_prefix(prefix);
            }
            tracing::info!("Member registry connected to Redis");
            Ok(Arc::new(registry))
        }
    }
}

/// Build the importer from a configuration that passed `validate_importer`.
pub fn build_importer(config: &AppConfig) -> Result<ImportPostsHandler, StartupError> {
    let crowdfunding = config
        .crowdfunding
        .as_ref()
        .ok_or(ValidationError::MissingRequired("CROWDFUNDING__CAMPAIGN_ID"))?;
    let campaign_id = crowdfunding
        .campaign_id
        .as_deref()
        .ok_or(ValidationError::MissingRequired("CROWDFUNDING__CAMPAIGN_ID"))?;
    let creator_token = crowdfunding
        .creator_access_token
        .clone()
        .ok_or(ValidationError::MissingRequired(
            "CROWDFUNDING__CREATOR_ACCESS_TOKEN",
        ))?;
    let admin_key = config
        .cms
        .admin_api_key
        .as_deref()
        .ok_or(ValidationError::MissingRequired("CMS__ADMIN_API_KEY"))?;

    let http = build_http_client(config.http.timeout())?;
    let source = Arc::new(CrowdfundingPostSource::new(
        &crowdfunding.api_base_url,
        campaign_id,
        creator_token,
        http.clone(),
    ));
    let images = Arc::new(HttpImageFetcher::new(http.clone()));
    let publisher = Arc::new(GhostAdminClient::new(&config.cms.url, admin_key, http)?);

    Ok(ImportPostsHandler::new(source, images, publisher)
        .with_concurrency(config.import.concurrency)
        .with_status(config.import.status)
        .with_slug_prefix(config.import.slug_prefix.clone()))
}
