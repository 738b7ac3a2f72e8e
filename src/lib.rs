//! Patron Gate - Membership-Gated Content Gateway
//!
//! Visitors log in with a crowdfunding or video platform account; every gated
//! request re-checks their supporter tier with that platform and shows only
//! the CMS content tagged for it. The `import-posts` binary copies crowdfunding
//! posts into the CMS.

pub mod adapters;
pub mod application;
pub mod bootstrap;
pub mod config;
pub mod domain;
pub mod ports;
