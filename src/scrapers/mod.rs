//! Access to the INEP exam listing: the browser session, the HTML listing
//! model, the download HTTP client and request pacing.

pub mod browser;
mod http_client;
pub mod listing;
pub mod pacing;

pub use browser::{BrowserEngineConfig, BrowserError, BrowserPage, BrowserSession, BrowserSessionControl};
pub use http_client::{HttpClient, HttpResponse};
