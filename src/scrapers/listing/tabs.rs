//! Year tab activation.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, info, warn};

use super::super::browser::{BrowserError, BrowserPage};
use super::super::pacing::{DelayRange, Pacer};
use super::{tab_selector, ListingDocument};
use crate::models::Year;

/// Brings a year's content pane into view by clicking its tab.
#[derive(Debug, Clone)]
pub struct TabActivator {
    /// How long to wait for the pane to render after the click.
    pub timeout: Duration,
    pub poll_interval: Duration,
    /// Pause between scrolling the tab into view and clicking it.
    pub before_click: DelayRange,
}

impl Default for TabActivator {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(20),
            poll_interval: Duration::from_millis(500),
            before_click: DelayRange::new(0.5, 1.5),
        }
    }
}

impl TabActivator {
    pub fn new(timeout: Duration, before_click: DelayRange) -> Self {
        Self {
            timeout,
            before_click,
            ..Default::default()
        }
    }

    /// Scroll the tab into view, click it, and wait for its pane to show a
    /// heading or callout.
    ///
    /// Fails if the tab cannot be found or clicked, or if the pane never
    /// renders within `timeout`.
    pub async fn activate<P: BrowserPage + ?Sized>(
        &self,
        page: &mut P,
        pacer: &dyn Pacer,
        year: Year,
    ) -> Result<(), BrowserError> {
        let selector = tab_selector(year);
        debug!("Activating tab {}", selector);

        page.scroll_into_view(&selector).await?;
        pacer.pause(self.before_click).await;
        page.click(&selector).await?;

        let deadline = Instant::now() + self.timeout;
        loop {
            let html = page.content().await?;
            if ListingDocument::parse(&html).is_tab_loaded(year) {
                info!("Tab {} activated", year);
                return Ok(());
            }
            if Instant::now() >= deadline {
                warn!("Content for tab {} did not load within {:?}", year, self.timeout);
                return Err(BrowserError::Timeout {
                    what: format!("content of tab {}", year),
                    after: self.timeout,
                });
            }
            tokio::time::sleep(self.poll_interval).await;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scrapers::pacing::NoPacer;
    use async_trait::async_trait;

    /// Page whose pane appears after a number of content snapshots.
    struct ScriptedPage {
        tab_exists: bool,
        loads_after: Option<usize>,
        snapshots: usize,
        clicks: Vec<String>,
    }

    impl ScriptedPage {
        fn new(tab_exists: bool, loads_after: Option<usize>) -> Self {
            Self {
                tab_exists,
                loads_after,
                snapshots: 0,
                clicks: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl BrowserPage for ScriptedPage {
        async fn navigate(&mut self, _url: &str) -> Result<(), BrowserError> {
            Ok(())
        }

        async fn scroll_into_view(&mut self, selector: &str) -> Result<(), BrowserError> {
            if self.tab_exists {
                Ok(())
            } else {
                Err(BrowserError::ElementNotFound(selector.to_string()))
            }
        }

        async fn click(&mut self, selector: &str) -> Result<(), BrowserError> {
            self.clicks.push(selector.to_string());
            Ok(())
        }

        async fn content(&mut self) -> Result<String, BrowserError> {
            self.snapshots += 1;
            let loaded = self.loads_after.is_some_and(|n| self.snapshots > n);
            Ok(if loaded {
                r#"<div class="tab-content" data-id="2022"><h3>ENEM 2022</h3></div>"#.to_string()
            } else {
                r#"<div class="tab-content" data-id="2022"></div>"#.to_string()
            })
        }
    }

    fn activator() -> TabActivator {
        TabActivator {
            timeout: Duration::from_millis(200),
            poll_interval: Duration::from_millis(10),
            before_click: DelayRange::new(0.0, 0.0),
        }
    }

    #[tokio::test]
    async fn test_activate_waits_for_content() {
        let mut page = ScriptedPage::new(true, Some(2));
        activator()
            .activate(&mut page, &NoPacer, Year(2022))
            .await
            .unwrap();
        assert_eq!(page.clicks, vec!["a[data-id=\"2022\"]"]);
        assert_eq!(page.snapshots, 3);
    }

    #[tokio::test]
    async fn test_activate_missing_tab() {
        let mut page = ScriptedPage::new(false, Some(0));
        let err = activator()
            .activate(&mut page, &NoPacer, Year(2022))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::ElementNotFound(_)));
        assert!(page.clicks.is_empty());
    }

    #[tokio::test]
    async fn test_activate_times_out() {
        let mut page = ScriptedPage::new(true, None);
        let err = activator()
            .activate(&mut page, &NoPacer, Year(2022))
            .await
            .unwrap_err();
        assert!(matches!(err, BrowserError::Timeout { .. }));
    }
}
