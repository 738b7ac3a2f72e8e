//! Identity provider kinds.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// The external identity provider that authenticated a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProviderKind {
    /// Crowdfunding platform (Patreon-shaped API).
    Crowdfunding,
    /// Video platform (YouTube-shaped API).
    Video,
}

impl ProviderKind {
    /// Path segment used in `/oauth/redirect/{provider}`.
    ///
    /// Kept identical to the provider names the OAuth apps were registered
    /// with, so existing redirect URIs keep working.
    pub fn route_segment(&self) -> &'static str {
        match self {
            ProviderKind::Crowdfunding => "patreon",
            ProviderKind::Video => "youtube",
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderKind::Crowdfunding => "crowdfunding",
            ProviderKind::Video => "video",
        }
    }
}

impl fmt::Display for ProviderKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderKind {
    type Err = String;

    /// Accepts both the route segment and the internal name.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "patreon" | "crowdfunding" => Ok(ProviderKind::Crowdfunding),
            "youtube" | "video" => Ok(ProviderKind::Video),
            other => Err(format!("unknown provider: {}", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_route_segments() {
        assert_eq!("patreon".parse::<ProviderKind>(), Ok(ProviderKind::Crowdfunding));
        assert_eq!("youtube".parse::<ProviderKind>(), Ok(ProviderKind::Video));
    }

    #[test]
    fn route_segment_round_trips() {
        for kind in [ProviderKind::Crowdfunding, ProviderKind::Video] {
            assert_eq!(kind.route_segment().parse::<ProviderKind>(), Ok(kind));
        }
    }

    #[test]
    fn rejects_unknown_provider() {
        assert!("twitch".parse::<ProviderKind>().is_err());
    }
}
