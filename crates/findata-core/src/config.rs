//! Scraper configuration.
//!
//! All waits the scraper performs are bounded by values in [`ScrapeConfig`].
//! The defaults are tuned against the live site's rendering latency; they
//! carry no semantic meaning and can be overridden from the environment.

use std::time::Duration;
use tracing::debug;

use crate::error::{FinDataError, Result};

/// Default site root.
pub const DEFAULT_BASE_URL: &str = "https://www.alphaspread.com";

/// Timing and probing parameters for one job.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ScrapeConfig {
    /// Site root, without trailing slash.
    pub base_url: String,
    /// How long the resolver waits for a candidate's statement marker.
    pub probe_timeout: Duration,
    /// How long each surface waits for its statement marker after loading.
    pub marker_timeout: Duration,
    /// Pause between opening surfaces.
    pub open_pause: Duration,
    /// How long to wait for the period menu to become visible.
    pub menu_timeout: Duration,
    /// Pause used when the period menu did not show up in time.
    pub menu_fallback_pause: Duration,
    /// Pause after clicking a period option.
    pub post_click_pause: Duration,
    /// Settle delay after each period wave, shared by all surfaces.
    pub settle_delay: Duration,
    /// How long to wait for the revenue breakdown marker.
    pub breakdown_timeout: Duration,
    /// Pause used when the breakdown marker did not show up in time.
    pub breakdown_fallback_pause: Duration,
    /// Maximum number of "Show More" click waves.
    pub expand_waves: usize,
    /// Pause after each click wave.
    pub expand_pause: Duration,
    /// How many candidates the resolver probes at most.
    pub max_candidates: usize,
    /// Exchange slug used when a ticker comes without one.
    pub default_exchange: String,
}

impl Default for ScrapeConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            probe_timeout: Duration::from_secs(3),
            marker_timeout: Duration::from_secs(3),
            open_pause: Duration::from_millis(200),
            menu_timeout: Duration::from_secs(2),
            menu_fallback_pause: Duration::from_millis(500),
            post_click_pause: Duration::from_millis(500),
            settle_delay: Duration::from_secs(2),
            breakdown_timeout: Duration::from_secs(5),
            breakdown_fallback_pause: Duration::from_millis(2500),
            expand_waves: 3,
            expand_pause: Duration::from_millis(500),
            max_candidates: 10,
            default_exchange: "nyse".to_string(),
        }
    }
}

impl ScrapeConfig {
    /// Loads the configuration from `FINDATA_*` environment variables.
    ///
    /// A `.env` file is read first if present. Durations are given in
    /// milliseconds; unset or unparsable variables keep their defaults.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();

        let defaults = Self::default();
        let config = Self {
            base_url: std::env::var("FINDATA_BASE_URL")
                .map(|v| v.trim_end_matches('/').to_string())
                .unwrap_or(defaults.base_url),
            probe_timeout: env_millis("FINDATA_PROBE_TIMEOUT_MS", defaults.probe_timeout),
            marker_timeout: env_millis("FINDATA_MARKER_TIMEOUT_MS", defaults.marker_timeout),
            open_pause: env_millis("FINDATA_OPEN_PAUSE_MS", defaults.open_pause),
            menu_timeout: env_millis("FINDATA_MENU_TIMEOUT_MS", defaults.menu_timeout),
            menu_fallback_pause: defaults.menu_fallback_pause,
            post_click_pause: env_millis("FINDATA_POST_CLICK_MS", defaults.post_click_pause),
            settle_delay: env_millis("FINDATA_SETTLE_MS", defaults.settle_delay),
            breakdown_timeout: env_millis(
                "FINDATA_BREAKDOWN_TIMEOUT_MS",
                defaults.breakdown_timeout,
            ),
            breakdown_fallback_pause: defaults.breakdown_fallback_pause,
            expand_waves: env_var_parse("FINDATA_EXPAND_WAVES", defaults.expand_waves),
            expand_pause: env_millis("FINDATA_EXPAND_PAUSE_MS", defaults.expand_pause),
            max_candidates: env_var_parse("FINDATA_MAX_CANDIDATES", defaults.max_candidates),
            default_exchange: std::env::var("FINDATA_DEFAULT_EXCHANGE")
                .map(|v| v.trim().to_lowercase())
                .unwrap_or(defaults.default_exchange),
        };
        config.validate()?;
        debug!(
            base_url = %config.base_url,
            settle_ms = config.settle_delay.as_millis() as u64,
            max_candidates = config.max_candidates,
            "Loaded scrape configuration"
        );
        Ok(config)
    }

    /// Checks values that would make a job impossible.
    pub fn validate(&self) -> Result<()> {
        if self.max_candidates == 0 {
            return Err(FinDataError::Config(
                "max_candidates must be at least 1".to_string(),
            ));
        }
        if self.base_url.is_empty() {
            return Err(FinDataError::Config("base_url is empty".to_string()));
        }
        if self.default_exchange.is_empty() {
            return Err(FinDataError::Config("default_exchange is empty".to_string()));
        }
        Ok(())
    }

    /// Sets the settle delay applied after each period wave.
    #[must_use]
    pub const fn with_settle_delay(mut self, settle_delay: Duration) -> Self {
        self.settle_delay = settle_delay;
        self
    }

    /// Sets the site root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Sets how many candidates are probed at most.
    #[must_use]
    pub const fn with_max_candidates(mut self, max_candidates: usize) -> Self {
        self.max_candidates = max_candidates;
        self
    }
}

fn env_var_parse<T: std::str::FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

fn env_millis(key: &str, default: Duration) -> Duration {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_millis)
        .unwrap_or(default)
}
