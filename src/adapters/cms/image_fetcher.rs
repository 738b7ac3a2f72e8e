//! HTTP image downloader for the importer.

use async_trait::async_trait;
use reqwest::header::CONTENT_TYPE;
use reqwest::Client;

use crate::ports::{ContentError, FetchedImage, ImageFetcher};

/// Downloads images over HTTP(S).
pub struct HttpImageFetcher {
    http: Client,
}

impl HttpImageFetcher {
    pub fn new(http: Client) -> Self {
        Self { http }
    }
}

/// Derive an upload file name from the last path segment of `url`.
pub(crate) fn file_name_for(url: &str, content_type: &str) -> String {
    let path = url.split(['?', '#']).next().unwrap_or(url);
    let segment = path.rsplit('/').next().unwrap_or("").trim();

    if !segment.is_empty() && segment.contains('.') {
        return segment.to_string();
    }

    let extension = match content_type {
        "image/png" => "png",
        "image/gif" => "gif",
        "image/webp" => "webp",
        "image/svg+xml" => "svg",
        _ => "jpg",
    };
    let stem = if segment.is_empty() { "image" } else { segment };
    format!("{}.{}", stem, extension)
}

#[async_trait]
impl ImageFetcher for HttpImageFetcher {
    async fn fetch(&self, url: &str) -> Result<FetchedImage, ContentError> {
        let response = self
            .http
            .get(url)
            .send()
            .await
            .map_err(|e| ContentError::unavailable(format!("image {}: {}", url, e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(ContentError::unavailable(format!("image {}: HTTP {}", url, status)));
        }

        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(|v| v.split(';').next().unwrap_or(v).trim().to_string())
            .unwrap_or_else(|| "application/octet-stream".to_string());

        if !content_type.starts_with("image/") {
            return Err(ContentError::invalid_response(format!(
                "image {}: unexpected content type {}",
                url, content_type
            )));
        }

        let bytes = response
            .bytes()
            .await
            .map_err(|e| ContentError::unavailable(format!("image {}: {}", url, e)))?;

        Ok(FetchedImage {
            file_name: file_name_for(url, &content_type),
            content_type,
            bytes: bytes.to_vec(),
        })
    }
}
