//! Service layer: downloading documents and orchestrating the crawl.

pub mod crawl;
pub mod download;

pub use crawl::{run_with_session, CrawlError, CrawlIssue, CrawlReport, CrawlState, Crawler};
pub use download::{DownloadConfig, DownloadError, DownloadOutcome, DownloadService, Fetcher};
