//! Access handlers: login completion, CMS member provisioning, and
//! per-request visitor resolution.

mod complete_login;
mod provision_member;
mod resolve_visitor;

pub use complete_login::{CompleteLoginCommand, CompleteLoginHandler};
pub use provision_member::ProvisionMemberHandler;
pub use resolve_visitor::{ResolveVisitorHandler, ResolveVisitorQuery};
