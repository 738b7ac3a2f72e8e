//! Video platform identity adapter (Google OAuth + YouTube Data API shaped).
//!
//! `fetch_identity` issues `userinfo` and `channels.list(mine=true)`
//! concurrently, then checks the caller's channels against the Known-Member
//! Registry. The platform has no membership concept visible to third parties,
//! so the registry is the only source of a tier label.

use std::sync::Arc;

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use serde_json::Value;

use crate::domain::access::{
    EntitlementFacts, KnownMember, ProviderIdentity, ProviderKind, VideoFacts,
};
use crate::ports::{AccessToken, IdentityProvider, MemberRegistry, ProviderError};

use super::oauth::{get_json, parse_url, OAuthClient, ProviderSetupError};

const USERINFO_CALL: &str = "userinfo";
const CHANNELS_CALL: &str = "channels.list";
const REGISTRY_CALL: &str = "registry.lookup";

/// Login scope requested from the platform.
pub const VIDEO_SCOPE: &str = "https://www.googleapis.com/auth/youtube.readonly";
/// Added when the account email is needed.
const EMAIL_SCOPE: &str = "email";

/// Settings for the video adapter.
#[derive(Debug, Clone)]
pub struct VideoClientConfig {
    pub oauth: OAuthClient,
    pub authorize_url: String,
    pub redirect_uri: String,
    /// API root, e.g. `https://www.googleapis.com`.
    pub api_base_url: String,
}

/// `IdentityProvider` for the video platform.
pub struct VideoProvider {
    oauth: OAuthClient,
    authorize_endpoint: Url,
    redirect_uri: String,
    scope: String,
    userinfo_url: String,
    channels_url: String,
    registry: Arc<dyn MemberRegistry>,
    http: Client,
}

impl VideoProvider {
    pub fn new(
        config: VideoClientConfig,
        registry: Arc<dyn MemberRegistry>,
        http: Client,
    ) -> Result<Self, ProviderSetupError> {
        let authorize_endpoint = parse_url("video authorize", &config.authorize_url)?;
        parse_url("video token", &config.oauth.token_url)?;
        parse_url("video api", &config.api_base_url)?;

        let api = config.api_base_url.trim_end_matches('/');
        Ok(Self {
            oauth: config.oauth,
            authorize_endpoint,
            redirect_uri: config.redirect_uri,
            scope: VIDEO_SCOPE.to_string(),
            userinfo_url: format!("{}/oauth2/v2/userinfo", api),
            channels_url: format!("{}/youtube/v3/channels", api),
            registry,
            http,
        })
    }

    /// Also ask for the account email, so `userinfo` returns it.
    pub fn with_email_scope(mut self) -> Self {
        self.scope = format!("{} {}", VIDEO_SCOPE, EMAIL_SCOPE);
        self
    }

    async fn fetch_userinfo(&self, access_token: &str) -> Result<UserInfo, ProviderError> {
        let body = get_json(&self.http, &self.userinfo_url, &[], access_token, USERINFO_CALL).await?;
        serde_json::from_value(body)
            .map_err(|e| ProviderError::transport(USERINFO_CALL, format!("Unexpected body: {}", e)))
    }

    async fn fetch_channels(&self, access_token: &str) -> Result<Vec<Channel>, ProviderError> {
        let body = get_json(
            &self.http,
            &self.channels_url,
            &[("part", "snippet"), ("mine", "true")],
            access_token,
            CHANNELS_CALL,
        )
        .await?;
        let list: ChannelList = serde_json::from_value(body)
            .map_err(|e| ProviderError::transport(CHANNELS_CALL, format!("Unexpected body: {}", e)))?;
        Ok(list.items)
    }

    /// First of `channels`, in provider order, present in the registry.
    async fn find_known_member(
        &self,
        channels: &[Channel],
    ) -> Result<Option<KnownMember>, ProviderError> {
        for channel in channels {
            let label = self
                .registry
                .lookup(&channel.id)
                .await
                .map_err(|e| ProviderError::transport(REGISTRY_CALL, e.to_string()))?;

            if let Some(label) = label {
                return Ok(Some(KnownMember {
                    channel_id: channel.id.clone(),
                    label,
                }));
            }
        }
        Ok(None)
    }
}

#[async_trait]
impl IdentityProvider for VideoProvider {
    fn kind(&self) -> ProviderKind {
        ProviderKind::Video
    }

    fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    fn authorize_url(&self, state: &str) -> String {
        self.oauth.authorize_url(
            &self.authorize_endpoint,
            &self.redirect_uri,
            &self.scope,
            state,
            &[("access_type", "online")],
        )
    }

    async fn exchange_code(
        &self,
        code: &str,
        redirect_uri: &str,
    ) -> Result<AccessToken, ProviderError> {
        self.oauth.exchange_code(&self.http, code, redirect_uri).await
    }

    async fn fetch_identity(&self, access_token: &str) -> Result<ProviderIdentity, ProviderError> {
        let (userinfo, channels) = tokio::join!(
            self.fetch_userinfo(access_token),
            self.fetch_channels(access_token)
        );

        let (userinfo, channels) = match (userinfo, channels) {
            (Ok(userinfo), Ok(channels)) => (userinfo, channels),
            (Err(first), other) => {
                if let Err(second) = other {
                    tracing::warn!(
                        provider = %ProviderKind::Video,
                        call = CHANNELS_CALL,
                        error = %second,
                        "Concurrent video call also failed"
                    );
                }
                return Err(first);
            }
            (Ok(_), Err(err)) => return Err(err),
        };

        let known_member = self.find_known_member(&channels).await?;
        if known_member.is_none() {
            tracing::debug!(
                provider = %ProviderKind::Video,
                channels = channels.len(),
                "No channel found in member registry"
            );
        }

        Ok(identity_from_parts(userinfo, &channels, known_member))
    }
}

#[derive(Debug, Default, Deserialize)]
struct UserInfo {
    #[serde(default)]
    email: Option<String>,
    #[serde(default)]
    name: Option<String>,
    #[serde(default)]
    picture: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ChannelList {
    #[serde(default)]
    items: Vec<Channel>,
}

#[derive(Debug, Clone, Deserialize)]
struct Channel {
    id: String,
    #[serde(default)]
    snippet: Value,
}

impl Channel {
    fn title(&self) -> Option<String> {
        self.snippet
            .get("title")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn thumbnail(&self) -> Option<String> {
        self.snippet
            .pointer("/thumbnails/medium/url")
            .and_then(Value::as_str)
            .map(str::to_string)
    }

    fn profile_url(&self) -> String {
        format!("https://www.youtube.com/channel/{}", self.id)
    }
}

fn identity_from_parts(
    userinfo: UserInfo,
    channels: &[Channel],
    known_member: Option<KnownMember>,
) -> ProviderIdentity {
    // Profile follows the matched channel, else the first one.
    let profile_channel = known_member
        .as_ref()
        .and_then(|m| channels.iter().find(|c| c.id == m.channel_id))
        .or_else(|| channels.first());

    ProviderIdentity {
        display_name: profile_channel.and_then(Channel::title).or(userinfo.name),
        photo_url: profile_channel.and_then(Channel::thumbnail).or(userinfo.picture),
        profile_url: profile_channel.map(Channel::profile_url),
        email: userinfo.email,
        facts: EntitlementFacts::Video(VideoFacts {
            channel_ids: channels.iter().map(|c| c.id.clone()).collect(),
            known_member,
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn channel(id: &str, title: &str) -> Channel {
        serde_json::from_value(json!({
            "id": id,
            "snippet": {
                "title": title,
                "thumbnails": {"medium": {"url": format!("https://yt3.example.com/{}.jpg", id)}}
            }
        }))
        .unwrap()
    }

    #[test]
    fn profile_prefers_known_member_channel() {
        let channels = vec![channel("UC1", "Side channel"), channel("UC2", "Main channel")];
        let member = KnownMember {
            channel_id: "UC2".to_string(),
            label: "Стрим + чат".to_string(),
        };

        let identity = identity_from_parts(UserInfo::default(), &channels, Some(member.clone()));

        assert_eq!(identity.display_name.as_deref(), Some("Main channel"));
        assert_eq!(
            identity.profile_url.as_deref(),
            Some("https://www.youtube.com/channel/UC2")
        );
        assert_eq!(
            identity.facts,
            EntitlementFacts::Video(VideoFacts {
                channel_ids: vec!["UC1".to_string(), "UC2".to_string()],
                known_member: Some(member),
            })
        );
    }

    #[test]
    fn profile_falls_back_to_userinfo_without_channels() {
        let userinfo = UserInfo {
            email: Some("viewer@example.com".to_string()),
            name: Some("Viewer".to_string()),
            picture: Some("https://lh3.example.com/p.jpg".to_string()),
        };

        let identity = identity_from_parts(userinfo, &[], None);

        assert_eq!(identity.display_name.as_deref(), Some("Viewer"));
        assert_eq!(identity.photo_url.as_deref(), Some("https://lh3.example.com/p.jpg"));
        assert_eq!(identity.profile_url, None);
        assert_eq!(identity.email.as_deref(), Some("viewer@example.com"));
    }

    fn provider() -> VideoProvider {
        VideoProvider::new(
            VideoClientConfig {
                oauth: OAuthClient::new("video-client", "secret", "https://oauth2.example.com/token"),
                authorize_url: "https://accounts.example.com/o/oauth2/v2/auth".to_string(),
                redirect_uri: "https://gate.example.com/oauth/redirect/youtube".to_string(),
                api_base_url: "https://www.googleapis.com".to_string(),
            },
            Arc::new(crate::adapters::registry::InMemoryMemberRegistry::new()),
            Client::new(),
        )
        .unwrap()
    }

    #[test]
    fn email_scope_is_opt_in() {
        let plain = provider().authorize_url("video.1.sig");
        let with_email = provider().with_email_scope().authorize_url("video.1.sig");

        assert!(plain.contains("scope=https%3A%2F%2Fwww.googleapis.com%2Fauth%2Fyoutube.readonly&"));
        assert!(with_email.contains("youtube.readonly+email&"));
        assert!(with_email.contains("access_type=online"));
    }

    #[test]
    fn channel_list_tolerates_missing_items() {
        let list: ChannelList = serde_json::from_value(json!({"kind": "youtube#channelListResponse"}))
            .unwrap();
        assert!(list.items.is_empty());
    }
}
