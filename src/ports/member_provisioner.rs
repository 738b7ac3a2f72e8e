//! Member provisioning port.
//!
//! Video members have no account on the CMS of their own. After a video
//! login the gateway makes sure the CMS knows them as a complimentary member
//! of the tier their registry label maps to, so CMS-side member features
//! (newsletters, comments) recognise them.

use async_trait::async_trait;

use super::ContentError;

/// What the CMS should know about a member.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemberGrant {
    pub email: String,
    pub name: Option<String>,
    /// Free text stored on the member, here the channel URL.
    pub note: Option<String>,
    /// CMS tier id to grant.
    pub tier_id: String,
}

/// What provisioning did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProvisionOutcome {
    /// No member with that email existed; one was created with the grant.
    Created,
    /// A free member was upgraded to a complimentary one.
    Upgraded,
    /// The member already pays or is already complimentary.
    Unchanged,
}

impl ProvisionOutcome {
    pub fn as_str(&self) -> &'static str {
        match self {
            ProvisionOutcome::Created => "created",
            ProvisionOutcome::Upgraded => "upgraded",
            ProvisionOutcome::Unchanged => "unchanged",
        }
    }
}

/// Creates or upgrades CMS members.
#[async_trait]
pub trait MemberProvisioner: Send + Sync {
    /// Look the member up by email, then create or upgrade as needed.
    /// Members that already pay are left alone.
    async fn provision(&self, grant: &MemberGrant) -> Result<ProvisionOutcome, ContentError>;
}
