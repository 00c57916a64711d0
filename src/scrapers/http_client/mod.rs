//! HTTP client used for document downloads.

mod response;
mod user_agent;

pub use response::HttpResponse;
pub use user_agent::{resolve_user_agent, DESKTOP_USER_AGENT};

use std::time::{Duration, Instant};

use reqwest::Client;
use tracing::debug;

/// Thin wrapper over `reqwest::Client` carrying the crawler's user agent and
/// timeout.
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
}

impl HttpClient {
    /// Create a new HTTP client.
    /// - None: desktop Chrome user agent
    /// - Some("impersonate"): random real browser user agent
    /// - Some(custom): custom user agent string
    pub fn new(timeout: Duration, user_agent_config: Option<&str>) -> Result<Self, reqwest::Error> {
        let user_agent = resolve_user_agent(user_agent_config);
        let client = Client::builder()
            .user_agent(&user_agent)
            .timeout(timeout)
            .gzip(true)
            .brotli(true)
            .build()?;

        Ok(Self { client })
    }

    /// Make a GET request.
    pub async fn get(&self, url: &str) -> Result<HttpResponse, reqwest::Error> {
        let start = Instant::now();
        let response = self.client.get(url).send().await?;
        debug!(
            "GET {} -> {} in {:?}",
            url,
            response.status(),
            start.elapsed()
        );
        Ok(HttpResponse::from_reqwest(response))
    }
}
