//! Access control domain.
//!
//! Everything between "this visitor holds a session" and "this visitor may see
//! these tags": providers, session payloads, entitlement facts, tier
//! resolution, and the tag filter table.

mod entitlement;
mod errors;
mod linked_records;
mod oauth_state;
mod provider;
mod resolver;
mod session;
mod tag_filter;
mod tier;
mod tier_table;

pub use entitlement::{
    Entitlement, EntitlementFacts, KnownMember, ProviderIdentity, VideoFacts, Visitor,
};
pub use errors::AccessError;
pub use linked_records::LinkedRecords;
pub use oauth_state::{OAuthStateError, OAuthStateSigner, DEFAULT_STATE_TTL_SECS};
pub use provider::ProviderKind;
pub use resolver::TierResolver;
pub use session::{IssuedCredential, SessionPayload};
pub use tag_filter::{FilterExpression, TagFilterError, TagFilterTable};
pub use tier::Tier;
pub use tier_table::TierTable;
