//! `enem` - download every ENEM exam and answer key from the INEP listing.

use std::fs::OpenOptions;
use std::path::Path;
use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use enemacquire::config::Settings;
use enemacquire::scrapers::pacing::RandomPacer;
use enemacquire::scrapers::{BrowserSession, HttpClient};
use enemacquire::services::{run_with_session, Crawler, DownloadService};

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    let settings = Settings::load().context("Failed to load configuration")?;
    init_logging(&settings.log_file)?;

    info!("Starting ENEM crawler...");

    let client = HttpClient::new(settings.request_timeout, settings.user_agent.as_deref())
        .context("Failed to build HTTP client")?;
    let downloads = DownloadService::new(Arc::new(client), settings.download_config());
    let crawler = Crawler::new(&settings, downloads, Arc::new(RandomPacer))?;

    let session = match BrowserSession::start(settings.browser.clone()).await {
        Ok(session) => session,
        Err(e) => {
            error!("Failed to start browser: {}", e);
            return Err(e.into());
        }
    };

    match run_with_session(&crawler, session).await {
        Ok(report) => {
            report.print_summary();
            info!("Crawler finished.");
            Ok(())
        }
        Err(e) => {
            error!("Crawl aborted: {}", e);
            Err(e.into())
        }
    }
}

/// Log to stderr and append to `log_file`.
fn init_logging(log_file: &Path) -> anyhow::Result<()> {
    if let Some(parent) = log_file.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create log directory {}", parent.display()))?;
    }
    let file = OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_file)
        .with_context(|| format!("Failed to open log file {}", log_file.display()))?;

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "enemacquire=info,enem=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Arc::new(file))
                .with_ansi(false),
        )
        .init();

    Ok(())
}
