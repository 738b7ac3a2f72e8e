//! Tier resolution from provider entitlement facts.

use super::{Entitlement, EntitlementFacts, LinkedRecords, Tier, TierTable, VideoFacts};

/// Pure mapping from entitlement facts to an internal tier.
///
/// Holds one label table per provider; both come from configuration.
#[derive(Debug, Clone, Default)]
pub struct TierResolver {
    crowdfunding: TierTable,
    video: TierTable,
}

impl TierResolver {
    pub fn new(crowdfunding: TierTable, video: TierTable) -> Self {
        Self {
            crowdfunding,
            video,
        }
    }

    /// Resolves facts from either provider.
    ///
    /// A label mapped to [`Tier::None`] is treated the same as an unknown
    /// label.
    pub fn resolve(&self, facts: &EntitlementFacts) -> Entitlement {
        let tier = match facts {
            EntitlementFacts::Crowdfunding(document) => self.resolve_crowdfunding(document),
            EntitlementFacts::Video(video) => self.resolve_video(video),
        };

        match tier {
            Some(tier) if tier.grants_access() => Entitlement::Granted(tier),
            _ => Entitlement::NotEntitled,
        }
    }

    /// Maps the first entitled tier title in provider order.
    ///
    /// This is not "highest tier wins": a patron entitled to several tiers
    /// gets whichever the provider lists first.
    fn resolve_crowdfunding(&self, document: &serde_json::Value) -> Option<Tier> {
        let records = LinkedRecords::from_document(document);
        let titles = records.entitled_tier_titles();
        let first = titles.first()?;

        let tier = self.crowdfunding.lookup(first);
        if tier.is_none() {
            tracing::warn!(title = %first, "Unmapped crowdfunding tier title");
        }
        tier
    }

    fn resolve_video(&self, facts: &VideoFacts) -> Option<Tier> {
        let member = facts.known_member.as_ref()?;

        let tier = self.video.lookup(&member.label);
        if tier.is_none() {
            tracing::warn!(
                channel_id = %member.channel_id,
                label = %member.label,
                "Unmapped video member label"
            );
        }
        tier
    }
}
