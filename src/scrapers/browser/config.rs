//! Browser engine configuration types.

use serde::{Deserialize, Serialize};

use super::super::http_client::DESKTOP_USER_AGENT;

/// Browser engine configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BrowserEngineConfig {
    /// Run in headless mode (default: true).
    /// Set to false for debugging or if headless detection is an issue.
    #[serde(default = "default_headless")]
    pub headless: bool,

    /// User agent presented by the browser.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,

    /// Window size as (width, height).
    #[serde(default = "default_window_size")]
    pub window_size: (u32, u32),

    /// Proxy server URL (e.g., "socks5://127.0.0.1:1080").
    #[serde(default)]
    pub proxy: Option<String>,

    /// Page load timeout in seconds.
    #[serde(default = "default_timeout")]
    pub timeout: u64,

    /// Wait for this CSS selector before considering the page loaded.
    #[serde(default = "default_ready_selector")]
    pub wait_for_selector: Option<String>,

    /// Milliseconds between checks for the ready selector.
    #[serde(default = "default_ready_poll_interval")]
    pub ready_poll_interval: u64,

    /// Hide automation markers after each navigation.
    #[serde(default = "default_stealth")]
    pub stealth: bool,

    /// Additional Chrome arguments.
    #[serde(default)]
    pub chrome_args: Vec<String>,

    /// Remote Chrome DevTools URL (e.g., "ws://localhost:9222").
    /// If set, connects to existing browser instead of launching one.
    #[serde(default)]
    pub remote_url: Option<String>,
}

pub fn default_headless() -> bool {
    true
}

pub fn default_user_agent() -> String {
    DESKTOP_USER_AGENT.to_string()
}

pub fn default_window_size() -> (u32, u32) {
    (1920, 1080)
}

pub fn default_timeout() -> u64 {
    20
}

pub fn default_ready_selector() -> Option<String> {
    Some("#content-core".to_string())
}

pub fn default_ready_poll_interval() -> u64 {
    250
}

pub fn default_stealth() -> bool {
    true
}

impl Default for BrowserEngineConfig {
    fn default() -> Self {
        Self {
            headless: default_headless(),
            user_agent: default_user_agent(),
            window_size: default_window_size(),
            proxy: None,
            timeout: default_timeout(),
            wait_for_selector: default_ready_selector(),
            ready_poll_interval: default_ready_poll_interval(),
            stealth: default_stealth(),
            chrome_args: Vec::new(),
            remote_url: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml() {
        let config: BrowserEngineConfig = toml::from_str("").unwrap();
        assert!(config.headless);
        assert_eq!(config.window_size, (1920, 1080));
        assert_eq!(config.wait_for_selector.as_deref(), Some("#content-core"));
        assert_eq!(config.ready_poll_interval, 250);
        assert!(config.user_agent.contains("Mozilla"));
    }

    #[test]
    fn test_override_fields() {
        let config: BrowserEngineConfig = toml::from_str(
            r#"
            headless = false
            remote_url = "ws://localhost:9222"
            chrome_args = ["--lang=pt-BR"]
            "#,
        )
        .unwrap();
        assert!(!config.headless);
        assert_eq!(config.remote_url.as_deref(), Some("ws://localhost:9222"));
        assert_eq!(config.chrome_args, vec!["--lang=pt-BR"]);
    }
}
