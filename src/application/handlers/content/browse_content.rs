//! BrowseContentHandler - tier-filtered CMS reads.

use std::sync::Arc;

use crate::domain::access::{TagFilterTable, Tier};
use crate::domain::content::{is_valid_slug, Content, Pagination, SinglePost};
use crate::ports::{ContentError, ContentRepository};

/// Query for one page of posts visible to a tier.
#[derive(Debug, Clone, Copy)]
pub struct ListPostsQuery {
    pub tier: Tier,
    /// 1-based.
    pub page: u32,
}

/// Query for a single post by slug.
#[derive(Debug, Clone)]
pub struct GetPostQuery {
    pub tier: Tier,
    pub slug: String,
}

/// Handler for content reads.
pub struct BrowseContentHandler {
    content: Arc<dyn ContentRepository>,
    filters: Arc<TagFilterTable>,
    page_size: u32,
}

impl BrowseContentHandler {
    pub fn new(
        content: Arc<dyn ContentRepository>,
        filters: Arc<TagFilterTable>,
        page_size: u32,
    ) -> Self {
        Self {
            content,
            filters,
            page_size,
        }
    }

    /// Posts visible to the tier, newest first.
    pub async fn list_posts(&self, query: ListPostsQuery) -> Result<Vec<Content>, ContentError> {
        let filter = self.filters.filter_for_tier(query.tier);
        let pagination = Pagination::new(query.page, self.page_size);

        tracing::debug!(tier = %query.tier, filter = %filter, page = pagination.page, "Browsing posts");
        self.content.browse_posts(&filter, pagination).await
    }

    /// One post, if the tier may see it.
    ///
    /// When the filtered lookup finds nothing, an unfiltered existence check
    /// tells a restricted post from a missing one. The post found that way is
    /// never returned. A failing check counts as restricted.
    pub async fn get_post(&self, query: GetPostQuery) -> Result<SinglePost, ContentError> {
        if !is_valid_slug(&query.slug) {
            tracing::debug!(slug = %query.slug, "Rejected malformed slug");
            return Ok(SinglePost::Absent);
        }

        let filter = self.filters.filter_for_tier(query.tier).with_slug(&query.slug);
        let mut matches = self
            .content
            .browse_posts(&filter, Pagination::first(1))
            .await?;

        if let Some(post) = matches.pop() {
            return Ok(SinglePost::Visible(post));
        }

        match self.content.read_post(&query.slug).await {
            Ok(Some(_)) => {
                tracing::info!(slug = %query.slug, tier = %query.tier, "Post restricted for tier");
                Ok(SinglePost::Restricted)
            }
            Ok(None) => Ok(SinglePost::Absent),
            Err(e) => {
                tracing::warn!(slug = %query.slug, error = %e, "Existence check failed");
                Ok(SinglePost::Restricted)
            }
        }
    }

    /// A static CMS page (`index`, `privacy`). Ungated.
    pub async fn get_page(&self, slug: &str) -> Result<Option<Content>, ContentError> {
        self.content.read_page(slug).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::cms::InMemoryCms;
    use std::collections::BTreeMap;

    fn post(slug: &str) -> Content {
        Content {
            id: format!("id-{}", slug),
            slug: slug.to_string(),
            title: slug.to_string(),
            html: Some(format!("<p>{}</p>", slug)),
            excerpt: None,
            feature_image: None,
            published_at: None,
        }
    }

    fn filters() -> Arc<TagFilterTable> {
        let mut configured = BTreeMap::new();
        configured.insert(Tier::Entry, vec!["hash-basic".to_string()]);
        configured.insert(
            Tier::Advanced,
            vec!["hash-basic".to_string(), "hash-advanced".to_string()],
        );
        Arc::new(TagFilterTable::new(configured).unwrap())
    }

    fn handler(cms: InMemoryCms) -> (BrowseContentHandler, Arc<InMemoryCms>) {
        let cms = Arc::new(cms);
        (BrowseContentHandler::new(cms.clone(), filters(), 25), cms)
    }

    fn cms() -> InMemoryCms {
        InMemoryCms::new()
            .with_post(post("basic-news"), &["hash-basic"])
            .with_post(post("backstage"), &["hash-advanced"])
    }

    // ══════════════════════════════════════════════════════════════
    // Listing
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn basic_tier_sees_only_basic_posts() {
        let (handler, _) = handler(cms());

        let posts = handler
            .list_posts(ListPostsQuery {
                tier: Tier::Basic,
                page: 1,
            })
            .await
            .unwrap();

        assert_eq!(posts.iter().map(|p| p.slug.as_str()).collect::<Vec<_>>(), vec!["basic-news"]);
    }

    #[tokio::test]
    async fn advanced_tier_sees_superset() {
        let (handler, _) = handler(cms());

        let posts = handler
            .list_posts(ListPostsQuery {
                tier: Tier::Advanced,
                page: 1,
            })
            .await
            .unwrap();

        assert_eq!(posts.len(), 2);
    }

    // ══════════════════════════════════════════════════════════════
    // Single post
    // ══════════════════════════════════════════════════════════════

    #[tokio::test]
    async fn visible_post_is_returned() {
        let (handler, _) = handler(cms());

        let result = handler
            .get_post(GetPostQuery {
                tier: Tier::Basic,
                slug: "basic-news".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result, SinglePost::Visible(post("basic-news")));
    }

    #[tokio::test]
    async fn filtered_out_post_is_restricted() {
        let (handler, _) = handler(cms());

        let result = handler
            .get_post(GetPostQuery {
                tier: Tier::Basic,
                slug: "backstage".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result, SinglePost::Restricted);
    }

    #[tokio::test]
    async fn missing_post_is_absent() {
        let (handler, _) = handler(cms());

        let result = handler
            .get_post(GetPostQuery {
                tier: Tier::Admin,
                slug: "no-such-post".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result, SinglePost::Absent);
    }

    #[tokio::test]
    async fn malformed_slug_never_reaches_cms() {
        let (handler, cms) = handler(cms());

        let result = handler
            .get_post(GetPostQuery {
                tier: Tier::Basic,
                slug: "x+tags:[hash-advanced]".to_string(),
            })
            .await
            .unwrap();

        assert_eq!(result, SinglePost::Absent);
        assert_eq!(cms.browse_calls(), 0);
    }

    #[tokio::test]
    async fn cms_outage_is_an_error() {
        let (handler, _) = handler(InMemoryCms::unavailable());

        let result = handler
            .list_posts(ListPostsQuery {
                tier: Tier::Basic,
                page: 1,
            })
            .await;

        assert!(matches!(result, Err(ContentError::Unavailable(_))));
    }
}
