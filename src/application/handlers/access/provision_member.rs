//! ProvisionMemberHandler - registers a video member with the CMS.
//!
//! The registry label of the matched channel selects the CMS tier. Identities
//! without an email, without a registry match, or with a label missing from
//! the tier id table are skipped.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::access::{EntitlementFacts, ProviderIdentity};
use crate::ports::{ContentError, MemberGrant, MemberProvisioner, ProvisionOutcome};

/// Handler for CMS member provisioning.
pub struct ProvisionMemberHandler {
    provisioner: Arc<dyn MemberProvisioner>,
    tier_ids: HashMap<String, String>,
}

impl ProvisionMemberHandler {
    pub fn new(provisioner: Arc<dyn MemberProvisioner>, tier_ids: HashMap<String, String>) -> Self {
        Self {
            provisioner,
            tier_ids,
        }
    }

    /// The grant for `identity`, or `None` when it should be skipped.
    pub fn grant_for(&self, identity: &ProviderIdentity) -> Option<MemberGrant> {
        let EntitlementFacts::Video(facts) = &identity.facts else {
            return None;
        };
        let member = facts.known_member.as_ref()?;
        let email = identity.email.as_deref().filter(|e| !e.is_empty())?;
        let Some(tier_id) = self.tier_ids.get(&member.label) else {
            tracing::debug!(label = %member.label, "No CMS tier for registry label");
            return None;
        };

        Some(MemberGrant {
            email: email.to_string(),
            name: identity.display_name.clone(),
            note: identity.profile_url.clone(),
            tier_id: tier_id.clone(),
        })
    }

    /// Returns `Ok(None)` when the identity was skipped.
    pub async fn handle(
        &self,
        identity: &ProviderIdentity,
    ) -> Result<Option<ProvisionOutcome>, ContentError> {
        let Some(grant) = self.grant_for(identity) else {
            return Ok(None);
        };

        let outcome = self.provisioner.provision(&grant).await?;
        tracing::info!(
            call = "members.provision",
            outcome = outcome.as_str(),
            tier_id = %grant.tier_id,
            "CMS member provisioned"
        );
        Ok(Some(outcome))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cms::InMemoryMemberProvisioner;
    use crate::domain::access::{KnownMember, VideoFacts};

    const LABEL: &str = "Стрим + чат";
    const TIER_ID: &str = "63b99523550c9b6ec3fef9d5";

    fn identity(email: Option<&str>, label: Option<&str>) -> ProviderIdentity {
        ProviderIdentity {
            display_name: Some("Member Channel".to_string()),
            photo_url: None,
            profile_url: Some("https://www.youtube.com/channel/UC-member".to_string()),
            email: email.map(str::to_string),
            facts: EntitlementFacts::Video(VideoFacts {
                channel_ids: vec!["UC-member".to_string()],
                known_member: label.map(|label| KnownMember {
                    channel_id: "UC-member".to_string(),
                    label: label.to_string(),
                }),
            }),
        }
    }

    fn handler(provisioner: Arc<InMemoryMemberProvisioner>) -> ProvisionMemberHandler {
        ProvisionMemberHandler::new(
            provisioner,
            HashMap::from([(LABEL.to_string(), TIER_ID.to_string())]),
        )
    }

    #[tokio::test]
    async fn known_member_is_created_with_the_mapped_tier() {
        let provisioner = Arc::new(InMemoryMemberProvisioner::new());

        let outcome = handler(provisioner.clone())
            .handle(&identity(Some("viewer@example.com"), Some(LABEL)))
            .await
            .unwrap();

        assert_eq!(outcome, Some(ProvisionOutcome::Created));
        assert_eq!(
            provisioner.grants(),
            vec![MemberGrant {
                email: "viewer@example.com".to_string(),
                name: Some("Member Channel".to_string()),
                note: Some("https://www.youtube.com/channel/UC-member".to_string()),
                tier_id: TIER_ID.to_string(),
            }]
        );
    }

    #[tokio::test]
    async fn free_member_is_upgraded_and_paying_member_left_alone() {
        let provisioner = Arc::new(
            InMemoryMemberProvisioner::new()
                .with_member("free@example.com", "free")
                .with_member("paid@example.com", "paid"),
        );
        let handler = handler(provisioner.clone());

        let free = handler
            .handle(&identity(Some("free@example.com"), Some(LABEL)))
            .await
            .unwrap();
        let paid = handler
            .handle(&identity(Some("paid@example.com"), Some(LABEL)))
            .await
            .unwrap();

        assert_eq!(free, Some(ProvisionOutcome::Upgraded));
        assert_eq!(paid, Some(ProvisionOutcome::Unchanged));
        assert_eq!(provisioner.status("free@example.com").as_deref(), Some("comped"));
        assert_eq!(provisioner.status("paid@example.com").as_deref(), Some("paid"));
    }

    #[tokio::test]
    async fn identities_without_email_match_or_mapping_are_skipped() {
        let provisioner = Arc::new(InMemoryMemberProvisioner::new());
        let handler = handler(provisioner.clone());

        for skipped in [
            identity(None, Some(LABEL)),
            identity(Some(""), Some(LABEL)),
            identity(Some("viewer@example.com"), None),
            identity(Some("viewer@example.com"), Some("Unmapped label")),
        ] {
            assert_eq!(handler.handle(&skipped).await.unwrap(), None);
        }
        assert!(provisioner.grants().is_empty());
    }

    #[test]
    fn crowdfunding_identities_are_never_provisioned() {
        let handler = handler(Arc::new(InMemoryMemberProvisioner::new()));
        let identity = ProviderIdentity {
            email: Some("patron@example.com".to_string()),
            facts: EntitlementFacts::Crowdfunding(serde_json::json!({})),
            ..identity(None, None)
        };

        assert!(handler.grant_for(&identity).is_none());
    }

    #[tokio::test]
    async fn cms_failure_is_returned() {
        let provisioner = Arc::new(InMemoryMemberProvisioner::unavailable());

        let err = handler(provisioner)
            .handle(&identity(Some("viewer@example.com"), Some(LABEL)))
            .await
            .unwrap_err();

        assert!(matches!(err, ContentError::Unavailable(_)));
    }
}
