//! Configuration for the dashboard pages

use crate::api::RetryPolicy;
use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Page scraped by the news page when nothing else is configured
pub const DEFAULT_NEWS_URL: &str = "https://www.moneycontrol.com/news/stocksinnews-142.html";

/// Bounds of the news auto-refresh interval, in seconds
pub const MIN_REFRESH_SECS: u64 = 5;
pub const MAX_REFRESH_SECS: u64 = 60;

/// Upper bound on fetch attempts
pub const MAX_RETRIES: u32 = 10;

/// Configuration for all dashboard pages
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardConfig {
    /// Page scraped for headlines
    pub news_url: String,

    /// CSS selector of headline elements
    pub headline_selector: String,

    /// CSS selector of summary elements
    pub summary_selector: String,

    /// Auto-refresh period of the news page
    #[serde(with = "secs")]
    pub refresh_interval: Duration,

    /// Request timeout duration
    #[serde(with = "secs")]
    pub request_timeout: Duration,

    /// Attempts made for one HTTP fetch before giving up
    pub max_retries: u32,

    /// Initial backoff duration for retries
    #[serde(with = "secs")]
    pub retry_backoff_base: Duration,

    /// Rate limit applied to news requests
    pub requests_per_minute: u32,

    /// Cache TTL for price histories
    #[serde(with = "secs")]
    pub cache_ttl_quotes: Duration,

    /// Cache TTL for scraped news pages
    #[serde(with = "secs")]
    pub cache_ttl_news: Duration,

    /// Weights file of the forecast model
    pub model_path: PathBuf,

    /// Closes per model input window
    pub window_size: usize,

    /// Years of history fed to the forecast page
    pub history_years: u32,

    /// Windows per inference batch
    pub batch_size: usize,

    /// Directory where chart descriptions are written, if any
    pub chart_dir: Option<PathBuf>,
}

impl Default for DashboardConfig {
    fn default() -> Self {
        Self {
            news_url: DEFAULT_NEWS_URL.to_string(),
            headline_selector: "h2".to_string(),
            summary_selector: "p".to_string(),
            refresh_interval: Duration::from_secs(30),
            request_timeout: Duration::from_secs(30),
            max_retries: 3,
            retry_backoff_base: Duration::from_secs(1),
            requests_per_minute: 30,
            cache_ttl_quotes: Duration::from_secs(60),
            cache_ttl_news: Duration::from_secs(300),
            model_path: PathBuf::from("Latest_stock_price_model.json"),
            window_size: 100,
            history_years: 20,
            batch_size: 256,
            chart_dir: None,
        }
    }
}

impl DashboardConfig {
    /// Create a new configuration builder
    pub fn builder() -> DashboardConfigBuilder {
        DashboardConfigBuilder::default()
    }

    /// Load a JSON config file on top of the defaults
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let config: Self = dashboard_utils::load_json_config(path)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<()> {
        url::Url::parse(&self.news_url).map_err(|e| {
            DashboardError::Config(format!("news_url '{}' is not a valid URL: {e}", self.news_url))
        })?;

        if self.headline_selector.trim().is_empty() || self.summary_selector.trim().is_empty() {
            return Err(DashboardError::Config(
                "headline and summary selectors must not be empty".to_string(),
            ));
        }

        if self.max_retries == 0 || self.max_retries > MAX_RETRIES {
            return Err(DashboardError::Config(format!(
                "max_retries must be between 1 and {MAX_RETRIES}"
            )));
        }

        if self.requests_per_minute == 0 {
            return Err(DashboardError::Config(
                "requests_per_minute must be greater than 0".to_string(),
            ));
        }

        if self.window_size == 0 || self.batch_size == 0 {
            return Err(DashboardError::Config(
                "window_size and batch_size must be greater than 0".to_string(),
            ));
        }

        if self.history_years == 0 {
            return Err(DashboardError::Config(
                "history_years must be greater than 0".to_string(),
            ));
        }

        Ok(())
    }

    /// Retry policy shared by the market data and news clients
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, self.retry_backoff_base)
    }

    /// Auto-refresh period clamped to the supported range
    pub fn refresh_interval(&self) -> Duration {
        let secs = self
            .refresh_interval
            .as_secs()
            .clamp(MIN_REFRESH_SECS, MAX_REFRESH_SECS);
        Duration::from_secs(secs)
    }
}

/// Builder for DashboardConfig
#[derive(Debug, Default)]
pub struct DashboardConfigBuilder {
    base: Option<DashboardConfig>,
    news_url: Option<String>,
    headline_selector: Option<String>,
    summary_selector: Option<String>,
    refresh_interval: Option<Duration>,
    request_timeout: Option<Duration>,
    max_retries: Option<u32>,
    requests_per_minute: Option<u32>,
    model_path: Option<PathBuf>,
    batch_size: Option<usize>,
    chart_dir: Option<PathBuf>,
}

impl DashboardConfigBuilder {
    /// Start from an existing configuration instead of the defaults
    pub fn base(mut self, config: DashboardConfig) -> Self {
        self.base = Some(config);
        self
    }

    /// Set the news page URL
    pub fn news_url(mut self, url: impl Into<String>) -> Self {
        self.news_url = Some(url.into());
        self
    }

    /// Set the headline selector
    pub fn headline_selector(mut self, selector: impl Into<String>) -> Self {
        self.headline_selector = Some(selector.into());
        self
    }

    /// Set the summary selector
    pub fn summary_selector(mut self, selector: impl Into<String>) -> Self {
        self.summary_selector = Some(selector.into());
        self
    }

    /// Set the news auto-refresh period
    pub fn refresh_interval(mut self, interval: Duration) -> Self {
        self.refresh_interval = Some(interval);
        self
    }

    /// Set request timeout
    pub fn request_timeout(mut self, duration: Duration) -> Self {
        self.request_timeout = Some(duration);
        self
    }

    /// Set maximum retries
    pub fn max_retries(mut self, retries: u32) -> Self {
        self.max_retries = Some(retries);
        self
    }

    /// Set the news request rate limit
    pub fn requests_per_minute(mut self, rpm: u32) -> Self {
        self.requests_per_minute = Some(rpm);
        self
    }

    /// Set the model weights path
    pub fn model_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.model_path = Some(path.into());
        self
    }

    /// Set the inference batch size
    pub fn batch_size(mut self, size: usize) -> Self {
        self.batch_size = Some(size);
        self
    }

    /// Set the chart output directory
    pub fn chart_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.chart_dir = Some(dir.into());
        self
    }

    /// Load overrides from `DASHBOARD_*` environment variables
    pub fn with_env(mut self) -> Self {
        if let Ok(url) = std::env::var("DASHBOARD_NEWS_URL") {
            self.news_url = Some(url);
        }
        if let Ok(path) = std::env::var("DASHBOARD_MODEL_PATH") {
            self.model_path = Some(PathBuf::from(path));
        }
        if let Ok(dir) = std::env::var("DASHBOARD_CHART_DIR") {
            self.chart_dir = Some(PathBuf::from(dir));
        }
        self
    }

    /// Build the configuration
    pub fn build(self) -> Result<DashboardConfig> {
        let base = self.base.unwrap_or_default();

        let config = DashboardConfig {
            news_url: self.news_url.unwrap_or(base.news_url),
            headline_selector: self.headline_selector.unwrap_or(base.headline_selector),
            summary_selector: self.summary_selector.unwrap_or(base.summary_selector),
            refresh_interval: self.refresh_interval.unwrap_or(base.refresh_interval),
            request_timeout: self.request_timeout.unwrap_or(base.request_timeout),
            max_retries: self.max_retries.unwrap_or(base.max_retries),
            requests_per_minute: self.requests_per_minute.unwrap_or(base.requests_per_minute),
            model_path: self.model_path.unwrap_or(base.model_path),
            batch_size: self.batch_size.unwrap_or(base.batch_size),
            chart_dir: self.chart_dir.or(base.chart_dir),
            ..base
        };

        config.validate()?;
        Ok(config)
    }
}

/// Durations as whole seconds in config files
mod secs {
    use serde::{Deserialize, Deserializer, Serializer};
    use std::time::Duration;

    pub fn serialize<S: Serializer>(duration: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(duration.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}
