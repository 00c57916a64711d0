//! Chromium-backed browser session.

use std::time::{Duration, Instant};

use anyhow::Context;
use async_trait::async_trait;
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::Handler;
use chromiumoxide::{Browser, BrowserConfig, Page};
use futures::StreamExt;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use super::chrome::find_chrome;
use super::stealth::STEALTH_SCRIPTS;
use super::{BrowserEngineConfig, BrowserError, BrowserPage, BrowserSessionControl};

/// A single browser with one tab, owned by the crawler for the whole run.
///
/// Dropping a session without calling `shutdown` still kills a launched
/// browser process, but only `shutdown` closes it gracefully.
pub struct BrowserSession {
    config: BrowserEngineConfig,
    browser: Browser,
    page: Page,
    handler: JoinHandle<()>,
}

impl BrowserSession {
    /// Launch (or connect to) a browser and open a blank tab.
    pub async fn start(config: BrowserEngineConfig) -> Result<Self, BrowserError> {
        let (browser, mut handler) = match config.remote_url.clone() {
            Some(remote_url) => connect_remote(&remote_url, &config).await?,
            None => launch(&config).await?,
        };

        let handler = tokio::spawn(async move {
            while let Some(h) = handler.next().await {
                if h.is_err() {
                    break;
                }
            }
        });

        let page = browser
            .new_page("about:blank")
            .await
            .map_err(|e| BrowserError::Launch(format!("Failed to open tab: {}", e)))?;
        page.execute(SetUserAgentOverrideParams::new(config.user_agent.clone()))
            .await
            .map_err(|e| BrowserError::Launch(format!("Failed to set user agent: {}", e)))?;

        info!("Browser started (headless={})", config.headless);

        Ok(Self {
            config,
            browser,
            page,
            handler,
        })
    }

    fn timeout(&self) -> Duration {
        Duration::from_secs(self.config.timeout)
    }

    async fn wait_for_selector(&self, selector: &str) -> Result<(), BrowserError> {
        let deadline = Instant::now() + self.timeout();
        loop {
            if self.page.find_element(selector).await.is_ok() {
                debug!("Selector found: {}", selector);
                return Ok(());
            }
            if Instant::now() >= deadline {
                return Err(BrowserError::Timeout {
                    what: format!("selector {}", selector),
                    after: self.timeout(),
                });
            }
            tokio::time::sleep(Duration::from_millis(self.config.ready_poll_interval)).await;
        }
    }

    async fn apply_stealth(&self) {
        debug!("Applying stealth scripts");
        for script in STEALTH_SCRIPTS {
            if let Err(e) = self.page.evaluate(script.to_string()).await {
                debug!("Stealth script injection skipped: {}", e);
            }
        }
    }
}

#[async_trait]
impl BrowserSessionControl for BrowserSession {
    async fn shutdown(mut self) {
        if let Err(e) = self.browser.close().await {
            warn!("Error closing browser: {}", e);
        }
        if let Err(e) = self.browser.wait().await {
            debug!("Error waiting for browser process: {}", e);
        }
        self.handler.abort();
        info!("Browser closed.");
    }
}

#[async_trait]
impl BrowserPage for BrowserSession {
    async fn navigate(&mut self, url: &str) -> Result<(), BrowserError> {
        info!("Navigating to {}", url);
        match tokio::time::timeout(self.timeout(), self.page.goto(url)).await {
            Ok(Ok(_)) => {}
            Ok(Err(e)) => {
                return Err(BrowserError::Navigation {
                    url: url.to_string(),
                    message: e.to_string(),
                })
            }
            Err(_) => {
                return Err(BrowserError::Timeout {
                    what: format!("navigation to {}", url),
                    after: self.timeout(),
                })
            }
        }

        if let Some(selector) = self
            .config
            .wait_for_selector
            .clone()
            .filter(|s| !s.is_empty())
        {
            self.wait_for_selector(&selector).await?;
        }

        if self.config.stealth {
            self.apply_stealth().await;
        }

        Ok(())
    }

    async fn scroll_into_view(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;
        element
            .scroll_into_view()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        Ok(())
    }

    async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
        let element = self
            .page
            .find_element(selector)
            .await
            .map_err(|_| BrowserError::ElementNotFound(selector.to_string()))?;

        let native_error = match element.click().await {
            Ok(_) => return Ok(()),
            Err(e) => e,
        };

        warn!(
            "Native click on '{}' failed ({}). Trying script click.",
            selector, native_error
        );
        let quoted = serde_json::to_string(selector)
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;
        let script = format!(
            "(() => {{ const el = document.querySelector({}); if (!el) return false; el.click(); return true; }})()",
            quoted
        );
        let clicked: bool = self
            .page
            .evaluate(script)
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))?
            .into_value()
            .map_err(|e| BrowserError::Interaction(e.to_string()))?;

        if clicked {
            Ok(())
        } else {
            Err(BrowserError::ElementNotFound(selector.to_string()))
        }
    }

    async fn content(&mut self) -> Result<String, BrowserError> {
        self.page
            .content()
            .await
            .map_err(|e| BrowserError::Interaction(e.to_string()))
    }
}

type Launched = (Browser, Handler);

/// Launch a local Chrome with the configured arguments.
async fn launch(config: &BrowserEngineConfig) -> Result<Launched, BrowserError> {
    info!("Launching browser (headless={})", config.headless);

    let chrome_path = find_chrome()?;
    let (width, height) = config.window_size;

    let mut builder = BrowserConfig::builder()
        .chrome_executable(chrome_path)
        .window_size(width, height)
        .request_timeout(Duration::from_secs(config.timeout));

    // with_head means NOT headless
    if !config.headless {
        builder = builder.with_head();
    }

    if let Some(ref proxy) = config.proxy {
        builder = builder.arg(format!("--proxy-server={}", proxy));
    }

    builder = builder
        .arg(format!("--user-agent={}", config.user_agent))
        .arg("--disable-blink-features=AutomationControlled")
        .arg("--disable-infobars")
        .arg("--disable-dev-shm-usage")
        .arg("--no-first-run")
        .arg("--no-default-browser-check")
        .arg("--no-sandbox")
        .arg("--disable-gpu");

    for arg in &config.chrome_args {
        builder = builder.arg(arg);
    }

    let browser_config = builder
        .build()
        .map_err(|e| BrowserError::Launch(format!("Failed to build browser config: {}", e)))?;

    Browser::launch(browser_config)
        .await
        .map_err(|e| BrowserError::Launch(format!("Failed to launch browser: {}", e)))
}

/// Connect to a remote Chrome instance.
async fn connect_remote(url: &str, config: &BrowserEngineConfig) -> Result<Launched, BrowserError> {
    info!("Connecting to remote browser at {}", url);

    let ws_url = resolve_ws_url(url)
        .await
        .map_err(|e| BrowserError::Launch(format!("{:#}", e)))?;

    info!("Connecting to WebSocket: {}", ws_url);

    let handler_config = chromiumoxide::handler::HandlerConfig {
        request_timeout: Duration::from_secs(config.timeout),
        ..Default::default()
    };

    Browser::connect_with_config(ws_url, handler_config)
        .await
        .map_err(|e| BrowserError::Launch(format!("Failed to connect to remote browser: {}", e)))
}

/// Get the WebSocket URL from the /json/version endpoint.
async fn resolve_ws_url(url: &str) -> anyhow::Result<String> {
    let http_url = url
        .replace("ws://", "http://")
        .replace("wss://", "https://");
    let version_url = format!("{}/json/version", http_url.trim_end_matches('/'));

    let resp: serde_json::Value = reqwest::Client::new()
        .get(&version_url)
        .send()
        .await
        .context("Failed to connect to remote browser")?
        .json()
        .await
        .context("Failed to parse browser version info")?;

    resp.get("webSocketDebuggerUrl")
        .and_then(|v| v.as_str())
        .map(|s| s.to_string())
        .ok_or_else(|| anyhow::anyhow!("No webSocketDebuggerUrl in response"))
}
