//! In-memory CMS for tests and local development.
//!
//! `InMemoryCms` understands the subset of the filter grammar the gateway
//! emits: `tags:[a,b]` and `slug:x`, joined with `+` (logical AND).
//! `InMemoryPostSource` and `InMemoryImageFetcher` feed the importer.
//! `InMemoryMemberProvisioner` keeps CMS members by email.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Mutex, RwLock};

use async_trait::async_trait;

use crate::domain::access::FilterExpression;
use crate::domain::content::{Content, Pagination, PostDraft};
use crate::ports::{
    ContentError, ContentPublisher, ContentRepository, FetchedImage, ImageFetcher, MemberGrant,
    MemberProvisioner, PostPage, PostSource, ProvisionOutcome, PublishedPost,
};

/// Base URL used for "uploaded" images.
pub const IN_MEMORY_IMAGE_HOST: &str = "https://cms.local/content/images";

#[derive(Debug, Clone)]
struct StoredPost {
    content: Content,
    tags: Vec<String>,
}

#[derive(Debug, Default)]
struct CmsState {
    pages: HashMap<String, Content>,
    /// Newest first.
    posts: Vec<StoredPost>,
    drafts: Vec<(PublishedPost, PostDraft)>,
    uploads: Vec<String>,
    next_id: usize,
}

/// In-memory content API and admin API.
#[derive(Debug, Default)]
pub struct InMemoryCms {
    state: RwLock<CmsState>,
    unavailable: bool,
    browse_calls: AtomicUsize,
}

fn lock_error() -> ContentError {
    ContentError::unavailable("in-memory CMS lock poisoned")
}

impl InMemoryCms {
    pub fn new() -> Self {
        Self::default()
    }

    /// A CMS that fails every call.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_page(self, content: Content) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.pages.insert(content.slug.clone(), content);
        }
        self
    }

    /// Adds a post. Later posts are listed first.
    pub fn with_post(self, content: Content, tags: &[&str]) -> Self {
        if let Ok(mut state) = self.state.write() {
            state.posts.insert(
                0,
                StoredPost {
                    content,
                    tags: tags.iter().map(|t| t.to_string()).collect(),
                },
            );
        }
        self
    }

    /// Posts created through the admin API, in creation order.
    pub fn drafts(&self) -> Vec<PostDraft> {
        self.state
            .read()
            .map(|s| s.drafts.iter().map(|(_, d)| d.clone()).collect())
            .unwrap_or_default()
    }

    /// File names uploaded through the admin API.
    pub fn uploads(&self) -> Vec<String> {
        self.state.read().map(|s| s.uploads.clone()).unwrap_or_default()
    }

    pub fn browse_calls(&self) -> usize {
        self.browse_calls.load(Ordering::SeqCst)
    }

    fn check_available(&self) -> Result<(), ContentError> {
        if self.unavailable {
            return Err(ContentError::unavailable("in-memory CMS configured as down"));
        }
        Ok(())
    }
}

/// Parsed form of a filter expression.
#[derive(Debug, Default)]
struct ParsedFilter {
    tags: Option<HashSet<String>>,
    slug: Option<String>,
}

impl ParsedFilter {
    fn parse(filter: &FilterExpression) -> Result<Self, ContentError> {
        let mut parsed = ParsedFilter::default();
        for clause in filter.as_str().split('+').filter(|c| !c.is_empty()) {
            if let Some(list) = clause
                .strip_prefix("tags:[")
                .and_then(|rest| rest.strip_suffix(']'))
            {
                parsed.tags = Some(list.split(',').map(|t| t.trim().to_string()).collect());
            } else if let Some(slug) = clause.strip_prefix("slug:") {
                parsed.slug = Some(slug.to_string());
            } else {
                return Err(ContentError::invalid_response(format!(
                    "Unsupported filter clause '{}'",
                    clause
                )));
            }
        }
        Ok(parsed)
    }

    fn matches(&self, post: &StoredPost) -> bool {
        let tags_match = self
            .tags
            .as_ref()
            .map_or(true, |wanted| post.tags.iter().any(|t| wanted.contains(t)));
        let slug_match = self
            .slug
            .as_ref()
            .map_or(true, |slug| &post.content.slug == slug);
        tags_match && slug_match
    }
}

#[async_trait]
impl ContentRepository for InMemoryCms {
    async fn read_page(&self, slug: &str) -> Result<Option<Content>, ContentError> {
        self.check_available()?;
        let state = self.state.read().map_err(|_| lock_error())?;
        Ok(state.pages.get(slug).cloned())
    }

    async fn browse_posts(
        &self,
        filter: &FilterExpression,
        pagination: Pagination,
    ) -> Result<Vec<Content>, ContentError> {
        self.browse_calls.fetch_add(1, Ordering::SeqCst);
        self.check_available()?;
        let parsed = ParsedFilter::parse(filter)?;
        let state = self.state.read().map_err(|_| lock_error())?;

        let skip = ((pagination.page - 1) * pagination.limit) as usize;
        Ok(state
            .posts
            .iter()
            .filter(|p| parsed.matches(p))
            .skip(skip)
            .take(pagination.limit as usize)
            .map(|p| p.content.clone())
            .collect())
    }

    async fn read_post(&self, slug: &str) -> Result<Option<Content>, ContentError> {
        self.check_available()?;
        let state = self.state.read().map_err(|_| lock_error())?;
        Ok(state
            .posts
            .iter()
            .find(|p| p.content.slug == slug)
            .map(|p| p.content.clone()))
    }
}

#[async_trait]
impl ContentPublisher for InMemoryCms {
    async fn find_post(&self, slug: &str) -> Result<Option<PublishedPost>, ContentError> {
        self.check_available()?;
        let state = self.state.read().map_err(|_| lock_error())?;
        Ok(state
            .drafts
            .iter()
            .find(|(p, _)| p.slug == slug)
            .map(|(p, _)| p.clone()))
    }

    async fn add_post(&self, draft: &PostDraft) -> Result<PublishedPost, ContentError> {
        self.check_available()?;
        let mut state = self.state.write().map_err(|_| lock_error())?;
        state.next_id += 1;
        let published = PublishedPost {
            id: format!("post-{}", state.next_id),
            slug: draft.slug.clone(),
        };
        state.drafts.push((published.clone(), draft.clone()));
        Ok(published)
    }

    async fn delete_post(&self, id: &str) -> Result<(), ContentError> {
        self.check_available()?;
        let mut state = self.state.write().map_err(|_| lock_error())?;
        state.drafts.retain(|(p, _)| p.id != id);
        Ok(())
    }

    async fn upload_image(&self, image: FetchedImage) -> Result<String, ContentError> {
        self.check_available()?;
        let mut state = self.state.write().map_err(|_| lock_error())?;
        state.uploads.push(image.file_name.clone());
        Ok(format!("{}/{}/{}", IN_MEMORY_IMAGE_HOST, state.uploads.len(), image.file_name))
    }

    fn is_hosted(&self, url: &str) -> bool {
        url.starts_with(IN_MEMORY_IMAGE_HOST)
    }
}

/// Fixed pages of source posts.
#[derive(Debug, Default)]
pub struct InMemoryPostSource {
    pages: Vec<PostPage>,
}

impl InMemoryPostSource {
    /// Builds cursors `"1"`, `"2"`, ... linking consecutive pages.
    pub fn new(pages: Vec<Vec<crate::domain::content::SourcePost>>) -> Self {
        let count = pages.len();
        let pages = pages
            .into_iter()
            .enumerate()
            .map(|(i, posts)| PostPage {
                posts,
                next_cursor: (i + 1 < count).then(|| (i + 1).to_string()),
            })
            .collect();
        Self { pages }
    }
}

#[async_trait]
impl PostSource for InMemoryPostSource {
    async fn fetch_page(&self, cursor: Option<&str>) -> Result<PostPage, ContentError> {
        let index = match cursor {
            None => 0,
            Some(c) => c
                .parse::<usize>()
                .map_err(|_| ContentError::invalid_response(format!("Unknown cursor {}", c)))?,
        };
        Ok(self.pages.get(index).cloned().unwrap_or_default())
    }
}

/// Serves images from a map; unknown URLs fail.
#[derive(Debug, Default)]
pub struct InMemoryImageFetcher {
    images: HashMap<String, FetchedImage>,
    fetches: AtomicUsize,
}

impl InMemoryImageFetcher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_image(mut self, url: impl Into<String>, file_name: &str) -> Self {
        self.images.insert(
            url.into(),
            FetchedImage {
                file_name: file_name.to_string(),
                content_type: "image/png".to_string(),
                bytes: vec![0x89, b'P', b'N', b'G'],
            },
        );
        self
    }

    pub fn fetches(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ImageFetcher for InMemoryImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ContentError> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        self.images
            .get(url)
            .cloned()
            .ok_or_else(|| ContentError::unavailable(format!("image {}: HTTP 404", url)))
    }
}

/// Members keyed by email, each with a status (`free`, `paid`, `comped`).
#[derive(Debug, Default)]
pub struct InMemoryMemberProvisioner {
    members: Mutex<HashMap<String, String>>,
    grants: Mutex<Vec<MemberGrant>>,
    unavailable: bool,
}

impl InMemoryMemberProvisioner {
    pub fn new() -> Self {
        Self::default()
    }

    /// A provisioner that fails every call.
    pub fn unavailable() -> Self {
        Self {
            unavailable: true,
            ..Self::default()
        }
    }

    pub fn with_member(self, email: &str, status: &str) -> Self {
        if let Ok(mut members) = self.members.lock() {
            members.insert(email.to_string(), status.to_string());
        }
        self
    }

    pub fn status(&self, email: &str) -> Option<String> {
        self.members.lock().ok()?.get(email).cloned()
    }

    /// Every grant received, in call order.
    pub fn grants(&self) -> Vec<MemberGrant> {
        self.grants.lock().map(|g| g.clone()).unwrap_or_default()
    }
}

#[async_trait]
impl MemberProvisioner for InMemoryMemberProvisioner {
    async fn provision(&self, grant: &MemberGrant) -> Result<ProvisionOutcome, ContentError> {
        if let Ok(mut grants) = self.grants.lock() {
            grants.push(grant.clone());
        }
        if self.unavailable {
            return Err(ContentError::unavailable("in-memory CMS is unavailable"));
        }

        let mut members = self.members.lock().map_err(|_| lock_error())?;
        match members.get(&grant.email).map(String::as_str) {
            None => {
                members.insert(grant.email.clone(), "comped".to_string());
                Ok(ProvisionOutcome::Created)
            }
            Some("free") => {
                members.insert(grant.email.clone(), "comped".to_string());
                Ok(ProvisionOutcome::Upgraded)
            }
            Some(_) => Ok(ProvisionOutcome::Unchanged),
        }
    }
}
