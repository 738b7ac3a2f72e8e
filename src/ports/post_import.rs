//! Ports used by the post importer.
//!
//! - `PostSource` - paginated crowdfunding campaign posts
//! - `ImageFetcher` - downloads images embedded in source posts
//! - `ContentPublisher` - CMS admin API (posts and image uploads)

use async_trait::async_trait;

use crate::domain::content::{PostDraft, SourcePost};

use super::ContentError;

/// One page of source posts plus the cursor for the next page.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PostPage {
    pub posts: Vec<SourcePost>,
    /// `None` on the last page.
    pub next_cursor: Option<String>,
}

/// Campaign post listing on the crowdfunding platform.
#[async_trait]
pub trait PostSource: Send + Sync {
    /// Fetch one page. `cursor` is `None` for the first page.
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<PostPage, ContentError>;
}

/// Raw image bytes with their media type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedImage {
    pub file_name: String,
    pub content_type: String,
    pub bytes: Vec<u8>,
}

/// Downloads embedded images.
#[async_trait]
pub trait ImageFetcher: Send + Sync {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ContentError>;
}

/// A post that exists in the CMS.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedPost {
    pub id: String,
    pub slug: String,
}

/// CMS admin API.
#[async_trait]
pub trait ContentPublisher: Send + Sync {
    /// Find a post of any status by slug.
    async fn find_post(&self, slug: &str) -> Result<Option<PublishedPost>, ContentError>;

    async fn add_post(&self, draft: &PostDraft) -> Result<PublishedPost, ContentError>;

    async fn delete_post(&self, id: &str) -> Result<(), ContentError>;

    /// Upload an image, returning its CMS-hosted URL.
    async fn upload_image(&self, image: FetchedImage) -> Result<String, ContentError>;

    /// True if `url` already points at CMS-hosted storage.
    fn is_hosted(&self, url: &str) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn import_ports_are_object_safe_and_send_sync() {
        fn _assert_source(_: &dyn PostSource) {}
        fn _assert_fetcher(_: &dyn ImageFetcher) {}
        fn _assert_publisher(_: &dyn ContentPublisher) {}
        fn _assert_arc_send_sync<T: Send + Sync + ?Sized>() {}
        _assert_arc_send_sync::<std::sync::Arc<dyn PostSource>>();
        _assert_arc_send_sync::<std::sync::Arc<dyn ImageFetcher>>();
        _assert_arc_send_sync::<std::sync::Arc<dyn ContentPublisher>>();
    }
}
