//! Crawl orchestration.
//!
//! Drives one pass over the listing: navigate, discover the years, then for
//! each year activate its tab, extract its links and download them. Failures
//! inside a year are recorded in the [`CrawlReport`] and the crawl moves on to
//! the next year.

mod report;

pub use report::{CrawlIssue, CrawlReport};

use std::fmt;
use std::panic::AssertUnwindSafe;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use futures::FutureExt;
use thiserror::Error;
use tracing::{debug, error, info, warn};
use url::Url;

use crate::config::Settings;
use crate::models::{DocumentLink, Year};
use crate::scrapers::browser::{BrowserError, BrowserPage, BrowserSessionControl};
use crate::scrapers::listing::{read_links, read_years, TabActivator};
use crate::scrapers::pacing::{Pacer, PacingConfig};
use crate::services::download::{DownloadOutcome, DownloadService};
use crate::storage::{ensure_year_dir, exam_storage_path};

/// Errors that end a crawl before any year is processed.
#[derive(Debug, Error)]
pub enum CrawlError {
    #[error("invalid base URL '{url}': {source}")]
    InvalidBaseUrl {
        url: String,
        #[source]
        source: url::ParseError,
    },

    #[error("could not load the listing after {attempts} attempt(s): {source}")]
    Navigation {
        attempts: u32,
        #[source]
        source: BrowserError,
    },

    #[error("could not create output directory {path}: {source}")]
    OutputDir {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Where the crawl currently is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CrawlState {
    Init,
    Navigated,
    DiscoveringYears,
    Activating(Year),
    Extracting(Year),
    Downloading(Year),
    Finished,
}

impl fmt::Display for CrawlState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Init => f.write_str("init"),
            Self::Navigated => f.write_str("navigated"),
            Self::DiscoveringYears => f.write_str("discovering years"),
            Self::Activating(y) => write!(f, "activating {}", y),
            Self::Extracting(y) => write!(f, "extracting {}", y),
            Self::Downloading(y) => write!(f, "downloading {}", y),
            Self::Finished => f.write_str("finished"),
        }
    }
}

/// Sequential crawler over the exam listing.
pub struct Crawler {
    base_url: Url,
    output_dir: PathBuf,
    navigation_attempts: u32,
    navigation_retry_delay: Duration,
    tabs: TabActivator,
    pacing: PacingConfig,
    downloads: DownloadService,
    pacer: Arc<dyn Pacer>,
}

impl Crawler {
    pub fn new(
        settings: &Settings,
        downloads: DownloadService,
        pacer: Arc<dyn Pacer>,
    ) -> Result<Self, CrawlError> {
        let base_url = Url::parse(&settings.base_url).map_err(|source| CrawlError::InvalidBaseUrl {
            url: settings.base_url.clone(),
            source,
        })?;

        let mut tabs = TabActivator::new(settings.tab_timeout, settings.pacing.before_click);
        tabs.poll_interval = settings.tab_poll_interval;

        Ok(Self {
            base_url,
            output_dir: settings.output_dir.clone(),
            navigation_attempts: settings.navigation_attempts.max(1),
            navigation_retry_delay: settings.navigation_retry_delay,
            tabs,
            pacing: settings.pacing.clone(),
            downloads,
            pacer,
        })
    }

    /// Run one full pass over the listing with an already open page.
    pub async fn run<P: BrowserPage + ?Sized>(&self, page: &mut P) -> Result<CrawlReport, CrawlError> {
        let mut report = CrawlReport::default();
        transition(CrawlState::Init);

        std::fs::create_dir_all(&self.output_dir).map_err(|source| CrawlError::OutputDir {
            path: self.output_dir.display().to_string(),
            source,
        })?;

        self.navigate(page).await?;
        transition(CrawlState::Navigated);
        self.pacer.pause(self.pacing.after_navigation).await;

        transition(CrawlState::DiscoveringYears);
        let years = match read_years(page).await {
            Ok(years) => years,
            Err(e) => {
                warn!("Could not read the year tabs: {}", e);
                report.record(CrawlIssue::YearDiscoveryFailed {
                    reason: e.to_string(),
                });
                Vec::new()
            }
        };
        report.years_found = years.clone();

        for year in years {
            info!("--- Processing exams for {} ---", year);
            self.pacer.pause(self.pacing.before_year).await;
            self.process_year(page, year, &mut report).await;
        }

        transition(CrawlState::Finished);
        Ok(report)
    }

    async fn navigate<P: BrowserPage + ?Sized>(&self, page: &mut P) -> Result<(), CrawlError> {
        let url = self.base_url.as_str();
        let mut attempt = 1;
        loop {
            match page.navigate(url).await {
                Ok(()) => {
                    info!("Page loaded: {}", url);
                    return Ok(());
                }
                Err(e) if attempt < self.navigation_attempts => {
                    warn!(
                        "Loading {} failed (attempt {}/{}): {}",
                        url, attempt, self.navigation_attempts, e
                    );
                    tokio::time::sleep(self.navigation_retry_delay).await;
                    attempt += 1;
                }
                Err(source) => {
                    error!("Could not load {}: {}", url, source);
                    return Err(CrawlError::Navigation {
                        attempts: attempt,
                        source,
                    });
                }
            }
        }
    }

    async fn process_year<P: BrowserPage + ?Sized>(
        &self,
        page: &mut P,
        year: Year,
        report: &mut CrawlReport,
    ) {
        transition(CrawlState::Activating(year));
        if let Err(e) = self.tabs.activate(page, self.pacer.as_ref(), year).await {
            warn!("Skipping {}: tab activation failed: {}", year, e);
            report.years_skipped += 1;
            report.record(CrawlIssue::ActivationFailed {
                year,
                reason: e.to_string(),
            });
            return;
        }

        self.pacer.pause(self.pacing.before_extract).await;

        transition(CrawlState::Extracting(year));
        let extraction = match read_links(page, year, &self.base_url).await {
            Ok(extraction) => extraction,
            Err(e) => {
                warn!("Skipping {}: could not read tab content: {}", year, e);
                report.years_skipped += 1;
                report.record(CrawlIssue::ActivationFailed {
                    year,
                    reason: e.to_string(),
                });
                return;
            }
        };
        report.years_processed += 1;

        for category in &extraction.missing_required {
            report.record(CrawlIssue::MissingLink {
                year,
                category: *category,
            });
        }

        if extraction.is_empty() {
            warn!("No document links found for {}", year);
            report.record(CrawlIssue::NoLinks { year });
            return;
        }

        transition(CrawlState::Downloading(year));
        if let Err(e) = ensure_year_dir(&self.output_dir, year) {
            error!("Could not create directory for {}: {}", year, e);
            for link in &extraction.links {
                report.failed += 1;
                report.record(download_failure(year, link, e.to_string()));
            }
            return;
        }

        for link in &extraction.links {
            self.download_link(year, link, report).await;
        }

        info!("--- Finished {} ---", year);
    }

    async fn download_link(&self, year: Year, link: &DocumentLink, report: &mut CrawlReport) {
        let path = exam_storage_path(&self.output_dir, year, link.category);
        match self.downloads.download(&link.url, &path).await {
            Ok(DownloadOutcome::AlreadyPresent) => {
                report.already_present += 1;
                return;
            }
            Ok(DownloadOutcome::Downloaded { .. }) => {
                report.downloaded += 1;
            }
            Err(e) => {
                error!("Failed to download {} for {}: {}", link.category, year, e);
                report.failed += 1;
                report.record(download_failure(year, link, e.to_string()));
            }
        }
        self.pacer.pause(self.pacing.after_download).await;
    }
}

fn download_failure(year: Year, link: &DocumentLink, reason: String) -> CrawlIssue {
    CrawlIssue::DownloadFailed {
        year,
        category: link.category,
        url: link.url.clone(),
        reason,
    }
}

fn transition(state: CrawlState) {
    debug!("Crawl state: {}", state);
}

/// Run the crawler on `session` and shut the session down afterwards.
///
/// The session is shut down exactly once, whether the crawl succeeds, fails
/// or panics. A panic is re-raised after shutdown.
pub async fn run_with_session<S: BrowserSessionControl>(
    crawler: &Crawler,
    mut session: S,
) -> Result<CrawlReport, CrawlError> {
    let outcome = AssertUnwindSafe(crawler.run(&mut session))
        .catch_unwind()
        .await;
    session.shutdown().await;
    match outcome {
        Ok(result) => result,
        Err(panic) => std::panic::resume_unwind(panic),
    }
}
