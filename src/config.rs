//! Configuration for the ENEM crawler.
//!
//! [`Settings`] holds the values the crawler runs with and defaults to the
//! built-in constants. An optional `enemacquire.{toml,json,yaml,yml}` file in
//! the working directory is read into a [`Config`] and applied over them.

use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::scrapers::pacing::PacingConfig;
use crate::scrapers::BrowserEngineConfig;
use crate::services::download::DownloadConfig;

/// Listing of exams and answer keys on the INEP portal.
pub const DEFAULT_BASE_URL: &str =
    "https://www.gov.br/inep/pt-br/areas-de-atuacao/avaliacao-e-exames-educacionais/enem/provas-e-gabaritos";

pub const DEFAULT_OUTPUT_DIR: &str = "data";
pub const DEFAULT_LOG_FILE: &str = "crawler_enem.log";

/// Config file names looked up in the working directory, in priority order.
pub const CONFIG_FILE_NAMES: &[&str] = &[
    "enemacquire.toml",
    "enemacquire.json",
    "enemacquire.yaml",
    "enemacquire.yml",
];

/// Errors loading the configuration file.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config file {path}: {message}")]
    Parse { path: String, message: String },
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Listing page URL.
    pub base_url: String,
    /// Root of the `{year}/` directory tree.
    pub output_dir: PathBuf,
    pub log_file: PathBuf,
    /// Headless browser options.
    pub browser: BrowserEngineConfig,
    /// User agent for downloads (None = desktop Chrome, "impersonate" = random).
    pub user_agent: Option<String>,
    /// HTTP request timeout for downloads.
    pub request_timeout: Duration,
    pub navigation_attempts: u32,
    pub navigation_retry_delay: Duration,
    /// How long to wait for a year's tab to render.
    pub tab_timeout: Duration,
    pub tab_poll_interval: Duration,
    pub download_attempts: u32,
    pub retry_delay: Duration,
    pub pacing: PacingConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            log_file: PathBuf::from(DEFAULT_LOG_FILE),
            browser: BrowserEngineConfig::default(),
            user_agent: None,
            request_timeout: Duration::from_secs(30),
            navigation_attempts: 3,
            navigation_retry_delay: Duration::from_secs(5),
            tab_timeout: Duration::from_secs(20),
            tab_poll_interval: Duration::from_millis(500),
            download_attempts: 3,
            retry_delay: Duration::from_secs(5),
            pacing: PacingConfig::default(),
        }
    }
}

impl Settings {
    /// Load settings from the config file in the working directory, if any.
    pub fn load() -> Result<Self, ConfigError> {
        let cwd = std::env::current_dir().map_err(|source| ConfigError::Read {
            path: ".".to_string(),
            source,
        })?;
        Self::load_from_dir(&cwd)
    }

    /// Load settings from the config file in `dir`, if any.
    pub fn load_from_dir(dir: &Path) -> Result<Self, ConfigError> {
        let mut settings = Settings::default();
        if let Some(path) = Config::discover(dir) {
            let config = Config::load_from_path(&path)?;
            let base_dir = config.base_dir().unwrap_or_else(|| dir.to_path_buf());
            config.apply_to_settings(&mut settings, &base_dir);
        }
        Ok(settings)
    }

    pub fn download_config(&self) -> DownloadConfig {
        DownloadConfig {
            attempts: self.download_attempts,
            retry_delay: self.retry_delay,
        }
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Config {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub base_url: Option<String>,
    /// Output directory, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output_dir: Option<String>,
    /// Log file path, relative to the config file.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub log_file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    /// Request timeout in seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_timeout: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_attempts: Option<u32>,
    /// Seconds between navigation attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub navigation_retry_delay: Option<u64>,
    /// Seconds to wait for a tab's content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_timeout: Option<u64>,
    /// Milliseconds between checks for a tab's content.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tab_poll_interval: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub download_attempts: Option<u32>,
    /// Seconds between download attempts.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retry_delay: Option<u64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub browser: Option<BrowserEngineConfig>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pacing: Option<PacingConfig>,
    /// Path to the config file this was loaded from (not serialized).
    #[serde(skip)]
    pub source_path: Option<PathBuf>,
}

impl Config {
    /// First config file present in `dir`.
    pub fn discover(dir: &Path) -> Option<PathBuf> {
        CONFIG_FILE_NAMES
            .iter()
            .map(|name| dir.join(name))
            .find(|path| path.is_file())
    }

    /// Load configuration from a specific file path.
    /// The format follows the extension; anything unknown is read as JSON.
    pub fn load_from_path(path: &Path) -> Result<Self, ConfigError> {
        let shown = path.display().to_string();
        let contents = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: shown.clone(),
            source,
        })?;

        let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
        let parsed: Result<Config, String> = match ext {
            "toml" => toml::from_str(&contents).map_err(|e| e.to_string()),
            "yaml" | "yml" => serde_yaml::from_str(&contents).map_err(|e| e.to_string()),
            _ => serde_json::from_str(&contents).map_err(|e| e.to_string()),
        };
        let mut config = parsed.map_err(|message| ConfigError::Parse {
            path: shown.clone(),
            message,
        })?;

        debug!("Loaded config from {}", shown);
        config.source_path = Some(path.to_path_buf());
        Ok(config)
    }

    /// Directory of the config file, used to resolve relative paths.
    pub fn base_dir(&self) -> Option<PathBuf> {
        self.source_path
            .as_ref()
            .and_then(|p| p.parent().map(|p| p.to_path_buf()))
    }

    fn resolve_path(path_str: &str, base_dir: &Path) -> PathBuf {
        let path = Path::new(path_str);
        if path.is_absolute() {
            path.to_path_buf()
        } else {
            base_dir.join(path)
        }
    }

    /// Apply configuration to settings.
    pub fn apply_to_settings(&self, settings: &mut Settings, base_dir: &Path) {
        if let Some(ref url) = self.base_url {
            settings.base_url = url.clone();
        }
        if let Some(ref dir) = self.output_dir {
            settings.output_dir = Self::resolve_path(dir, base_dir);
        }
        if let Some(ref log_file) = self.log_file {
            settings.log_file = Self::resolve_path(log_file, base_dir);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = Some(user_agent.clone());
        }
        if let Some(secs) = self.request_timeout {
            settings.request_timeout = Duration::from_secs(secs);
        }
        if let Some(attempts) = self.navigation_attempts {
            settings.navigation_attempts = attempts;
        }
        if let Some(secs) = self.navigation_retry_delay {
            settings.navigation_retry_delay = Duration::from_secs(secs);
        }
        if let Some(secs) = self.tab_timeout {
            settings.tab_timeout = Duration::from_secs(secs);
        }
        if let Some(ms) = self.tab_poll_interval {
            settings.tab_poll_interval = Duration::from_millis(ms);
        }
        if let Some(attempts) = self.download_attempts {
            settings.download_attempts = attempts;
        }
        if let Some(secs) = self.retry_delay {
            settings.retry_delay = Duration::from_secs(secs);
        }
        if let Some(ref browser) = self.browser {
            settings.browser = browser.clone();
        }
        if let Some(ref pacing) = self.pacing {
            settings.pacing = pacing.clone();
        }
    }
}
