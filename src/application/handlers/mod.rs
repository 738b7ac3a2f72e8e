//! Command and query handlers.
//!
//! Handlers orchestrate domain logic and ports; they hold no I/O of their own.

pub mod access;
pub mod content;

pub use access::{
    CompleteLoginCommand, CompleteLoginHandler, ProvisionMemberHandler, ResolveVisitorHandler,
    ResolveVisitorQuery,
};
pub use content::{
    BrowseContentHandler, GetPostQuery, ImportError, ImportPostsCommand, ImportPostsHandler,
    ListPostsQuery,
};
