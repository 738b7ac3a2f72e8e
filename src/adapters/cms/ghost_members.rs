//! `MemberProvisioner` on the Ghost Admin API.
//!
//! Members are looked up with an NQL email filter. New members are added
//! with the tier as a complimentary grant; existing `free` members are
//! edited to `comped` with the tier prepended to the ones they hold. Both
//! writes ask Ghost to send its subscribe email.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::ports::{ContentError, MemberGrant, MemberProvisioner, ProvisionOutcome};

use super::ghost_admin::{expect_success, GhostAdminClient};

const WELCOME_EMAIL: [(&str, &str); 2] = [("send_email", "true"), ("email_type", "subscribe")];

#[derive(Debug, Deserialize)]
struct MemberRecord {
    id: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    tiers: Vec<TierRef>,
}

#[derive(Debug, Deserialize)]
struct MembersEnvelope {
    #[serde(default)]
    members: Vec<MemberRecord>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
struct TierRef {
    id: String,
}

#[derive(Debug, Serialize)]
struct NewMember<'a> {
    email: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    name: Option<&'a str>,
    #[serde(skip_serializing_if = "Option::is_none")]
    note: Option<&'a str>,
    subscribed: bool,
    labels: [&'a str; 0],
    comped: bool,
    tiers: Vec<TierRef>,
}

#[derive(Debug, Serialize)]
struct CompedUpdate {
    comped: bool,
    tiers: Vec<TierRef>,
}

#[derive(Debug, Serialize)]
struct Envelope<T> {
    members: [T; 1],
}

/// NQL string literal: single quotes, with `\` and `'` escaped.
fn email_filter(email: &str) -> String {
    let escaped = email.replace('\\', "\\\\").replace('\'', "\\'");
    format!("email:'{}'", escaped)
}

impl GhostAdminClient {
    async fn find_member(&self, email: &str) -> Result<Option<MemberRecord>, ContentError> {
        let url = format!("{}/members/", self.api_root);
        let filter = email_filter(email);
        let builder = self
            .http
            .get(&url)
            .query(&[("filter", filter.as_str()), ("limit", "1")]);

        let envelope: MembersEnvelope =
            expect_success(self.send(builder, "members.browse").await?, "members.browse")
                .await?
                .json()
                .await
                .map_err(|e| ContentError::invalid_response(e.to_string()))?;

        Ok(envelope.members.into_iter().next())
    }

    async fn add_member(&self, grant: &MemberGrant) -> Result<(), ContentError> {
        let url = format!("{}/members/", self.api_root);
        let body = Envelope {
            members: [NewMember {
                email: &grant.email,
                name: grant.name.as_deref(),
                note: grant.note.as_deref(),
                subscribed: true,
                labels: [],
                comped: true,
                tiers: vec![TierRef {
                    id: grant.tier_id.clone(),
                }],
            }],
        };
        let builder = self.http.post(&url).query(&WELCOME_EMAIL).json(&body);
        expect_success(self.send(builder, "members.add").await?, "members.add").await?;
        Ok(())
    }

    async fn comp_member(&self, member: MemberRecord, tier_id: &str) -> Result<(), ContentError> {
        let url = format!("{}/members/{}/", self.api_root, member.id);
        let granted = TierRef {
            id: tier_id.to_string(),
        };
        let mut tiers = vec![granted.clone()];
        tiers.extend(member.tiers.into_iter().filter(|t| *t != granted));

        let body = Envelope {
            members: [CompedUpdate {
                comped: true,
                tiers,
            }],
        };
        let builder = self.http.put(&url).query(&WELCOME_EMAIL).json(&body);
        expect_success(self.send(builder, "members.edit").await?, "members.edit").await?;
        Ok(())
    }
}

#[async_trait]
impl MemberProvisioner for GhostAdminClient {
    async fn provision(&self, grant: &MemberGrant) -> Result<ProvisionOutcome, ContentError> {
        match self.find_member(&grant.email).await? {
            None => {
                self.add_member(grant).await?;
                Ok(ProvisionOutcome::Created)
            }
            Some(member) if member.status == "free" => {
                self.comp_member(member, &grant.tier_id).await?;
                Ok(ProvisionOutcome::Upgraded)
            }
            Some(_) => Ok(ProvisionOutcome::Unchanged),
        }
    }
}
