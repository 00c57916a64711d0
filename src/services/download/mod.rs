//! Document download service.
//!
//! Fetches one document at a time into its final path. Existing files are
//! never fetched again, and bodies land in a `.part` file first so an
//! interrupted write is not mistaken for a finished one on the next run.

mod types;

use std::path::Path;
use std::sync::Arc;

use async_trait::async_trait;
use tracing::{debug, info, warn};

use crate::scrapers::HttpClient;
use crate::storage::partial_path;

pub use types::{DownloadConfig, DownloadError, DownloadOutcome};

/// Source of document bodies.
#[async_trait]
pub trait Fetcher: Send + Sync {
    /// GET a URL and return the full body of a 2xx response.
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError>;
}

#[async_trait]
impl Fetcher for HttpClient {
    async fn fetch(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let response = self.get(url).await?;
        if !response.is_success() {
            return Err(DownloadError::Status {
                status: response.status.as_u16(),
            });
        }
        if let Some(content_type) = response.content_type() {
            if !content_type.contains("pdf") {
                debug!("Unexpected content type for {}: {}", url, content_type);
            }
        }
        Ok(response.bytes().await?)
    }
}

/// Service for downloading exam documents to disk.
#[derive(Clone)]
pub struct DownloadService {
    fetcher: Arc<dyn Fetcher>,
    config: DownloadConfig,
}

impl DownloadService {
    /// Create a new download service.
    pub fn new(fetcher: Arc<dyn Fetcher>, config: DownloadConfig) -> Self {
        Self { fetcher, config }
    }

    /// Download `url` to `path` unless `path` already exists.
    ///
    /// The parent directory must exist.
    pub async fn download(&self, url: &str, path: &Path) -> Result<DownloadOutcome, DownloadError> {
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());

        if tokio::fs::try_exists(path).await.unwrap_or(false) {
            info!("File {} already exists. Skipping download.", name);
            return Ok(DownloadOutcome::AlreadyPresent);
        }

        info!("Downloading {} from {}", name, url);
        let body = self.fetch_with_retries(url).await?;
        let bytes = body.len() as u64;
        write_atomically(path, &body).await?;

        info!("Downloaded {} ({} bytes)", name, bytes);
        Ok(DownloadOutcome::Downloaded { bytes })
    }

    async fn fetch_with_retries(&self, url: &str) -> Result<Vec<u8>, DownloadError> {
        let attempts = self.config.attempts.max(1);
        let mut attempt = 1;
        loop {
            match self.fetcher.fetch(url).await {
                Ok(body) => return Ok(body),
                Err(e) if e.is_retryable() && attempt < attempts => {
                    warn!(
                        "Attempt {}/{} for {} failed: {}. Retrying in {:?}",
                        attempt, attempts, url, e, self.config.retry_delay
                    );
                    tokio::time::sleep(self.config.retry_delay).await;
                    attempt += 1;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

async fn write_atomically(path: &Path, body: &[u8]) -> Result<(), DownloadError> {
    let write_err = |source| DownloadError::Write {
        path: path.display().to_string(),
        source,
    };

    let part = partial_path(path);
    if let Err(e) = tokio::fs::write(&part, body).await {
        let _ = tokio::fs::remove_file(&part).await;
        return Err(write_err(e));
    }
    tokio::fs::rename(&part, path).await.map_err(write_err)
}
