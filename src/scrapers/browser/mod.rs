//! Headless browser access to the exam listing.
//!
//! The listing renders its year tabs with JavaScript, so it is driven through
//! chromiumoxide (CDP). Everything above this module talks to the
//! [`BrowserPage`] trait, which fakes implement in tests.

mod chrome;
mod config;
#[cfg(feature = "browser")]
mod session;
mod stealth;

pub use config::BrowserEngineConfig;
#[cfg(feature = "browser")]
pub use session::BrowserSession;

use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;

/// Errors raised by browser operations.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error(
        "Chrome/Chromium not found. Please install it:\n\
         - Arch/Manjaro: sudo pacman -S chromium\n\
         - Ubuntu/Debian: sudo apt install chromium-browser\n\
         - Fedora: sudo dnf install chromium\n\
         - Or download from: https://www.google.com/chrome/"
    )]
    ChromeNotFound,

    #[error("Browser failed to start: {0}")]
    Launch(String),

    #[error("Navigation to {url} failed: {message}")]
    Navigation { url: String, message: String },

    #[error("Timed out after {after:?} waiting for {what}")]
    Timeout { what: String, after: Duration },

    #[error("Element not found: {0}")]
    ElementNotFound(String),

    #[error("Browser interaction failed: {0}")]
    Interaction(String),

    #[error("Browser support not compiled. Rebuild with: cargo build --features browser")]
    NotCompiled,
}

/// One open page the crawler drives.
#[async_trait]
pub trait BrowserPage: Send {
    /// Load a URL and wait until the page is ready.
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError>;

    /// Scroll the first element matching `selector` into view.
    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Click the first element matching `selector`.
    async fn click(&mut self, selector: &str) -> Result<(), BrowserError>;

    /// Snapshot of the rendered DOM as HTML.
    async fn content(&mut self) -> Result<String, BrowserError>;
}

/// A page that owns its browser and must be released when the crawl ends.
#[async_trait]
pub trait BrowserSessionControl: BrowserPage + Sized {
    /// Close the browser and release every resource it holds.
    async fn shutdown(self);
}

// Stub for when browser feature is disabled
#[cfg(not(feature = "browser"))]
pub struct BrowserSession {
    _private: (),
}

#[cfg(not(feature = "browser"))]
impl BrowserSession {
    pub async fn start(_config: BrowserEngineConfig) -> Result<Self, BrowserError> {
        Err(BrowserError::NotCompiled)
    }
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserSessionControl for BrowserSession {
    async fn shutdown(self) {}
}

#[cfg(not(feature = "browser"))]
#[async_trait]
impl BrowserPage for BrowserSession {
    async fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn scroll_into_view(&mut self, _selector: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn click(&mut self, _selector: &str) -> Result<(), BrowserError> {
        Err(BrowserError::NotCompiled)
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        Err(BrowserError::NotCompiled)
    }
}
