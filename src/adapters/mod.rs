//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `cms` - Ghost content/admin APIs, the crowdfunding post source, image fetching
//! - `http` - The axum gateway (routes, access gate, cookies, pages)
//! - `providers` - OAuth identity providers (crowdfunding, video)
//! - `registry` - Known-member registry (in-memory, Redis)
//! - `session` - Signed session credentials

pub mod cms;
pub mod http;
pub mod providers;
pub mod registry;
pub mod session;
