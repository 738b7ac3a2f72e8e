//! Domain layer containing business logic and domain types.
//!
//! # Module Organization
//!
//! - `access` - Sessions, providers, tier resolution, and tag filters
//! - `content` - CMS content items and the importer's post model

pub mod access;
pub mod content;
