//! Content handlers: tier-filtered reads and the post importer.

mod browse_content;
mod import_posts;

pub use browse_content::{BrowseContentHandler, GetPostQuery, ListPostsQuery};
pub use import_posts::{ImportError, ImportPostsCommand, ImportPostsHandler};
