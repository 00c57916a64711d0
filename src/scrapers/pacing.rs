//! Randomized pacing between page interactions and downloads.
//!
//! Every pause the crawler takes goes through a [`Pacer`], so tests can swap
//! in [`NoPacer`] and run without sleeping.

use std::time::Duration;

use async_trait::async_trait;
use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::info;

/// Longest single pause, in seconds.
pub const MAX_DELAY_SECS: f64 = 3600.0;

/// Inclusive range of seconds to wait.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DelayRange {
    pub min_secs: f64,
    pub max_secs: f64,
}

impl DelayRange {
    pub const fn new(min_secs: f64, max_secs: f64) -> Self {
        Self { min_secs, max_secs }
    }

    /// Pick a duration uniformly inside the range.
    ///
    /// Bounds are clamped to `0..=MAX_DELAY_SECS`; a NaN bound counts as 0.
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> Duration {
        let min = clamp_secs(self.min_secs);
        let max = clamp_secs(self.max_secs);
        let secs = if max > min {
            rng.random_range(min..=max)
        } else {
            min
        };
        Duration::from_secs_f64(secs)
    }
}

fn clamp_secs(secs: f64) -> f64 {
    if secs.is_nan() {
        0.0
    } else {
        secs.clamp(0.0, MAX_DELAY_SECS)
    }
}

/// Delay ranges for each point in the crawl where the crawler pauses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PacingConfig {
    /// After the listing page loads.
    #[serde(default = "default_after_navigation")]
    pub after_navigation: DelayRange,
    /// Before starting each year.
    #[serde(default = "default_before_year")]
    pub before_year: DelayRange,
    /// Between scrolling a tab into view and clicking it.
    #[serde(default = "default_before_click")]
    pub before_click: DelayRange,
    /// After a tab loads, before reading its links.
    #[serde(default = "default_before_extract")]
    pub before_extract: DelayRange,
    /// After each download attempt.
    #[serde(default = "default_after_download")]
    pub after_download: DelayRange,
}

fn default_after_navigation() -> DelayRange {
    DelayRange::new(2.0, 5.0)
}

fn default_before_year() -> DelayRange {
    DelayRange::new(3.0, 7.0)
}

fn default_before_click() -> DelayRange {
    DelayRange::new(0.5, 1.5)
}

fn default_before_extract() -> DelayRange {
    DelayRange::new(5.0, 10.0)
}

fn default_after_download() -> DelayRange {
    DelayRange::new(1.0, 4.0)
}

impl Default for PacingConfig {
    fn default() -> Self {
        Self {
            after_navigation: default_after_navigation(),
            before_year: default_before_year(),
            before_click: default_before_click(),
            before_extract: default_before_extract(),
            after_download: default_after_download(),
        }
    }
}

/// Something that can pause the crawl for a while.
#[async_trait]
pub trait Pacer: Send + Sync {
    async fn pause(&self, range: DelayRange);
}

/// Sleeps for a random duration inside the requested range.
#[derive(Debug, Default, Clone, Copy)]
pub struct RandomPacer;

#[async_trait]
impl Pacer for RandomPacer {
    async fn pause(&self, range: DelayRange) {
        let delay = range.sample(&mut rand::rng());
        info!("Waiting {:.2} seconds...", delay.as_secs_f64());
        tokio::time::sleep(delay).await;
    }
}

/// Never waits.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoPacer;

#[async_trait]
impl Pacer for NoPacer {
    async fn pause(&self, _range: DelayRange) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sample_within_range() {
        let range = DelayRange::new(0.5, 1.5);
        let mut rng = rand::rng();
        for _ in 0..100 {
            let d = range.sample(&mut rng).as_secs_f64();
            assert!((0.5..=1.5).contains(&d), "{} out of range", d);
        }
    }

    #[test]
    fn test_sample_degenerate_range() {
        let mut rng = rand::rng();
        assert_eq!(
            DelayRange::new(2.0, 2.0).sample(&mut rng),
            Duration::from_secs(2)
        );
        // Inverted bounds fall back to the minimum
        assert_eq!(
            DelayRange::new(3.0, 1.0).sample(&mut rng),
            Duration::from_secs(3)
        );
        assert_eq!(DelayRange::new(-1.0, 0.0).sample(&mut rng), Duration::ZERO);
    }

    #[test]
    fn test_sample_out_of_range_bounds() {
        let mut rng = rand::rng();
        let cap = Duration::from_secs_f64(MAX_DELAY_SECS);
        assert_eq!(DelayRange::new(f64::INFINITY, f64::INFINITY).sample(&mut rng), cap);
        assert_eq!(DelayRange::new(1e300, 1e301).sample(&mut rng), cap);
        assert_eq!(DelayRange::new(f64::NAN, f64::NAN).sample(&mut rng), Duration::ZERO);
        assert!(DelayRange::new(0.0, f64::INFINITY).sample(&mut rng) <= cap);
    }

    #[test]
    fn test_pacing_config_partial_toml() {
        let config: PacingConfig =
            toml::from_str("before_year = { min_secs = 0.0, max_secs = 0.1 }").unwrap();
        assert_eq!(config.before_year, DelayRange::new(0.0, 0.1));
        assert_eq!(config.after_download, default_after_download());
    }

    #[tokio::test]
    async fn test_no_pacer_returns_immediately() {
        let start = std::time::Instant::now();
        NoPacer.pause(DelayRange::new(60.0, 120.0)).await;
        assert!(start.elapsed() < Duration::from_secs(1));
    }
}
