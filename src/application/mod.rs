//! Application layer - Commands, Queries, and Handlers.
//!
//! This layer orchestrates domain operations and coordinates between ports:
//! access handlers decide who the visitor is and at which tier, content
//! handlers decide what that tier may read, and the importer fills the CMS.

pub mod handlers;

pub use handlers::{
    // Access handlers
    CompleteLoginCommand, CompleteLoginHandler, ResolveVisitorHandler, ResolveVisitorQuery,
    // Content handlers
    BrowseContentHandler, GetPostQuery, ImportError, ImportPostsCommand, ImportPostsHandler,
    ListPostsQuery,
};
