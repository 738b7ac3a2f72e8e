//! ImportPostsHandler - copies crowdfunding posts into the CMS.
//!
//! For each source post, in source order:
//!
//! 1. Look up its stable slug (`{prefix}-{source id}`) in the CMS
//! 2. Skip it if present, unless `replace` is set
//! 3. Re-host embedded images (bounded concurrency, per-run URL cache)
//! 4. Delete the earlier copy when replacing, then add the new post
//!
//! A failure on one post or image is counted and logged; only a failure to
//! list source posts aborts the run.

use std::collections::HashMap;
use std::sync::Arc;

use futures::stream::{self, StreamExt};
use thiserror::Error;

use crate::domain::content::{
    image_sources, rewrite_image_sources, ImportReport, PostDraft, PostStatus, SourcePost,
};
use crate::ports::{ContentError, ContentPublisher, ImageFetcher, PostSource};

/// Errors that abort an import run.
#[derive(Debug, Error)]
pub enum ImportError {
    #[error("Failed to list source posts: {0}")]
    Source(#[source] ContentError),
}

/// Command to run the importer.
#[derive(Debug, Clone)]
pub struct ImportPostsCommand {
    /// Delete and re-create posts that were imported before.
    pub replace: bool,
    /// Stop after this many source posts.
    pub limit: Option<usize>,
}

/// Handler for the post importer.
pub struct ImportPostsHandler {
    source: Arc<dyn PostSource>,
    images: Arc<dyn ImageFetcher>,
    publisher: Arc<dyn ContentPublisher>,
    concurrency: usize,
    status: PostStatus,
    slug_prefix: String,
}

impl ImportPostsHandler {
    pub fn new(
        source: Arc<dyn PostSource>,
        images: Arc<dyn ImageFetcher>,
        publisher: Arc<dyn ContentPublisher>,
    ) -> Self {
        Self {
            source,
            images,
            publisher,
            concurrency: 4,
            status: PostStatus::Draft,
            slug_prefix: "patreon".to_string(),
        }
    }

    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    pub fn with_status(mut self, status: PostStatus) -> Self {
        self.status = status;
        self
    }

    pub fn with_slug_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.slug_prefix = prefix.into();
        self
    }

    pub async fn handle(&self, cmd: ImportPostsCommand) -> Result<ImportReport, ImportError> {
        let mut report = ImportReport::default();
        let mut image_cache: HashMap<String, String> = HashMap::new();
        let mut cursor: Option<String> = None;
        let mut seen = 0usize;

        'pages: loop {
            let page = self
                .source
                .fetch_page(cursor.as_deref())
                .await
                .map_err(ImportError::Source)?;

            tracing::debug!(posts = page.posts.len(), cursor = ?cursor, "Fetched source page");

            for post in &page.posts {
                if cmd.limit.map_or(false, |limit| seen >= limit) {
                    break 'pages;
                }
                seen += 1;
                self.import_one(post, cmd.replace, &mut image_cache, &mut report)
                    .await;
            }

            match page.next_cursor {
                Some(next) => cursor = Some(next),
                None => break,
            }
        }

        tracing::info!(
            imported = report.imported,
            replaced = report.replaced,
            skipped = report.skipped,
            failed = report.failed,
            images_uploaded = report.images_uploaded,
            images_reused = report.images_reused,
            images_failed = report.images_failed,
            "Import finished"
        );
        Ok(report)
    }

    async fn import_one(
        &self,
        post: &SourcePost,
        replace: bool,
        image_cache: &mut HashMap<String, String>,
        report: &mut ImportReport,
    ) {
        let slug = post.import_slug(&self.slug_prefix);

        let existing = match self.publisher.find_post(&slug).await {
            Ok(existing) => existing,
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "Lookup failed, post not imported");
                report.failed += 1;
                return;
            }
        };

        if existing.is_some() && !replace {
            tracing::debug!(slug = %slug, "Already imported, skipping");
            report.skipped += 1;
            return;
        }

        let html = self.rehost_images(&post.html, image_cache, report).await;

        if let Some(existing) = &existing {
            if let Err(e) = self.publisher.delete_post(&existing.id).await {
                tracing::warn!(slug = %slug, error = %e, "Delete failed, post not replaced");
                report.failed += 1;
                return;
            }
        }

        let draft = PostDraft::from_source(post, slug.clone(), html, self.status);
        match self.publisher.add_post(&draft).await {
            Ok(_) if existing.is_some() => {
                tracing::info!(slug = %slug, "Post replaced");
                report.replaced += 1;
            }
            Ok(_) => {
                tracing::info!(slug = %slug, "Post imported");
                report.imported += 1;
            }
            Err(e) => {
                tracing::warn!(slug = %slug, error = %e, "Add failed");
                report.failed += 1;
            }
        }
    }

    /// Uploads every external image once per run and rewrites `html` to the
    /// hosted copies. Images that fail keep their original URL.
    async fn rehost_images(
        &self,
        html: &str,
        image_cache: &mut HashMap<String, String>,
        report: &mut ImportReport,
    ) -> String {
        let sources: Vec<String> = image_sources(html)
            .into_iter()
            .filter(|url| !self.publisher.is_hosted(url))
            .collect();

        let (cached, pending): (Vec<String>, Vec<String>) = sources
            .iter()
            .cloned()
            .partition(|url| image_cache.contains_key(url));
        report.images_reused += cached.len();

        let images = &self.images;
        let publisher = &self.publisher;
        let results: Vec<(String, Result<String, ContentError>)> = stream::iter(pending)
            .map(|url| async move {
                let uploaded = match images.fetch(&url).await {
                    Ok(image) => publisher.upload_image(image).await,
                    Err(e) => Err(e),
                };
                (url, uploaded)
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for (url, result) in results {
            match result {
                Ok(hosted) => {
                    report.images_uploaded += 1;
                    image_cache.insert(url, hosted);
                }
                Err(e) => {
                    tracing::warn!(url = %url, error = %e, "Image not re-hosted");
                    report.images_failed += 1;
                }
            }
        }

        let replacements: HashMap<String, String> = sources
            .into_iter()
            .filter_map(|url| image_cache.get(&url).map(|hosted| (url, hosted.clone())))
            .collect();

        rewrite_image_sources(html, &replacements)
    }
}
