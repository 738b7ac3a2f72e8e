//! Entitlement facts and resolution outcomes.

use serde::Serialize;

use super::{ProviderKind, Tier};

/// Raw, provider-specific entitlement data for one request.
///
/// Never persisted; fetched again on every gated request.
#[derive(Debug, Clone, PartialEq)]
pub enum EntitlementFacts {
    /// The JSON:API identity document returned by the crowdfunding platform,
    /// including memberships and currently entitled tiers.
    Crowdfunding(serde_json::Value),
    /// Channel data plus the Known-Member Registry lookup result.
    Video(VideoFacts),
}

impl EntitlementFacts {
    pub fn provider(&self) -> ProviderKind {
        match self {
            EntitlementFacts::Crowdfunding(_) => ProviderKind::Crowdfunding,
            EntitlementFacts::Video(_) => ProviderKind::Video,
        }
    }
}

/// Video platform facts.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct VideoFacts {
    /// Channel ids owned by the caller, in provider order.
    pub channel_ids: Vec<String>,
    /// First channel found in the Known-Member Registry, if any.
    pub known_member: Option<KnownMember>,
}

/// A registry hit: channel id plus the operator-defined tier label.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct KnownMember {
    pub channel_id: String,
    pub label: String,
}

/// Outcome of tier resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entitlement {
    Granted(Tier),
    NotEntitled,
}

impl Entitlement {
    pub fn tier(&self) -> Option<Tier> {
        match self {
            Entitlement::Granted(tier) => Some(*tier),
            Entitlement::NotEntitled => None,
        }
    }
}

/// Identity and profile data returned by a provider adapter.
#[derive(Debug, Clone, PartialEq)]
pub struct ProviderIdentity {
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub profile_url: Option<String>,
    /// Keys CMS member provisioning for video logins.
    pub email: Option<String>,
    pub facts: EntitlementFacts,
}

/// The resolved visitor attached to a gated request.
///
/// Deliberately carries no provider tokens.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Visitor {
    pub provider: ProviderKind,
    pub display_name: Option<String>,
    pub photo_url: Option<String>,
    pub profile_url: Option<String>,
    pub tier: Tier,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn facts_report_their_provider() {
        let facts = EntitlementFacts::Video(VideoFacts::default());
        assert_eq!(facts.provider(), ProviderKind::Video);

        let facts = EntitlementFacts::Crowdfunding(serde_json::json!({}));
        assert_eq!(facts.provider(), ProviderKind::Crowdfunding);
    }

    #[test]
    fn entitlement_tier_accessor() {
        assert_eq!(Entitlement::Granted(Tier::Basic).tier(), Some(Tier::Basic));
        assert_eq!(Entitlement::NotEntitled.tier(), None);
    }

    #[test]
    fn visitor_serialization_has_no_token_field() {
        let visitor = Visitor {
            provider: ProviderKind::Crowdfunding,
            display_name: Some("Ann".to_string()),
            photo_url: None,
            profile_url: None,
            tier: Tier::Entry,
        };
        let json = serde_json::to_value(&visitor).unwrap();
        assert!(json.get("access_token").is_none());
        assert_eq!(json["tier"], "entry");
    }
}
