//! Dashboard pages
//!
//! [`Dashboard`] owns the shared configuration, the data sources and the
//! session caches. Each page module adds the method that runs that page:
//!
//! - [`news`]: scraped headlines with summaries
//! - [`technical`]: indicator snapshot, table and candlestick chart
//! - [`forecast`]: model predictions against the actual closes

pub mod forecast;
pub mod news;
pub mod technical;

pub use forecast::{DEFAULT_FORECAST_SYMBOL, ForecastReport};
pub use news::{NewsPage, Selection};

use news::FetchedPage;
pub use technical::{DEFAULT_TECHNICAL_SYMBOL, TechnicalReport, TechnicalRequest};

use crate::api::{NewsScraper, NewsSource, Quote, QuoteSource, YahooFinanceClient};
use crate::cache::{CacheKey, FetchCache};
use crate::config::DashboardConfig;
use crate::error::{DashboardError, Result};
use crate::render::NamedChart;
use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::str::FromStr;
use std::sync::Arc;

/// Navigation entries of the dashboard
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Page {
    News,
    TechnicalAnalysis,
    FutureForecast,
}

impl Page {
    pub const ALL: [Page; 3] = [Page::News, Page::TechnicalAnalysis, Page::FutureForecast];

    /// Navigation label
    pub fn label(&self) -> &'static str {
        match self {
            Page::News => "Home",
            Page::TechnicalAnalysis => "Technical Analysis",
            Page::FutureForecast => "Future Forecast",
        }
    }

    /// Command that opens the page
    pub fn command(&self) -> &'static str {
        match self {
            Page::News => "/news",
            Page::TechnicalAnalysis => "/technical <symbol> [timeframe] [data] [chart]",
            Page::FutureForecast => "/forecast <symbol>",
        }
    }

    /// Navigation menu listing every page
    pub fn menu() -> String {
        let mut out = String::from("Navigation\n");
        for page in Self::ALL {
            out.push_str(&format!("  {:<20} {}\n", page.label(), page.command()));
        }
        out
    }
}

impl fmt::Display for Page {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Page {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "home" | "news" => Ok(Page::News),
            "technical" | "ta" | "technical analysis" => Ok(Page::TechnicalAnalysis),
            "forecast" | "future forecast" => Ok(Page::FutureForecast),
            other => Err(DashboardError::Command(format!("Unknown page: {other}"))),
        }
    }
}

/// Shared state behind every page
pub struct Dashboard {
    config: Arc<DashboardConfig>,
    quotes: Arc<dyn QuoteSource>,
    news: Arc<dyn NewsSource>,
    quote_cache: FetchCache<Vec<Quote>>,
    news_cache: FetchCache<FetchedPage>,
}

impl Dashboard {
    /// Dashboard backed by Yahoo Finance and the configured news page
    pub fn new(config: DashboardConfig) -> Result<Self> {
        config.validate()?;

        let quotes = Arc::new(YahooFinanceClient::new(config.retry_policy()));
        let news = Arc::new(NewsScraper::new(
            config.request_timeout,
            config.requests_per_minute,
            config.retry_policy(),
        )?);

        Ok(Self::with_sources(config, quotes, news))
    }

    /// Dashboard over arbitrary data sources
    pub fn with_sources(
        config: DashboardConfig,
        quotes: Arc<dyn QuoteSource>,
        news: Arc<dyn NewsSource>,
    ) -> Self {
        Self {
            quote_cache: FetchCache::new(config.cache_ttl_quotes),
            news_cache: FetchCache::new(config.cache_ttl_news),
            config: Arc::new(config),
            quotes,
            news,
        }
    }

    pub fn config(&self) -> &DashboardConfig {
        &self.config
    }

    /// Drop every cached fetch
    pub async fn clear_cache(&self) {
        self.quote_cache.clear().await;
        self.news_cache.clear().await;
    }

    /// Price history for `symbol` from `fetch`, cached under `key`
    ///
    /// An empty history is reported as [`DashboardError::NoData`] and is not cached.
    async fn history<Fut>(&self, key: CacheKey, symbol: &str, fetch: Fut) -> Result<Vec<Quote>>
    where
        Fut: Future<Output = Result<Vec<Quote>>>,
    {
        self.quote_cache
            .get_or_fetch(key, || async move {
                let quotes = fetch.await?;
                if quotes.is_empty() {
                    return Err(DashboardError::NoData {
                        symbol: symbol.to_string(),
                    });
                }
                Ok::<_, DashboardError>(quotes)
            })
            .await
    }

    /// Write `charts` under the configured chart directory
    ///
    /// Returns the written paths, or nothing when no directory is configured.
    pub fn save_charts(&self, charts: &[NamedChart]) -> Result<Vec<PathBuf>> {
        let Some(dir) = self.config.chart_dir.as_deref() else {
            return Ok(Vec::new());
        };
        charts.iter().map(|chart| chart.write_json(dir)).collect()
    }
}

/// Ticker as typed by the user, trimmed and upper-cased
pub(crate) fn normalize_symbol(symbol: &str) -> Result<String> {
    let symbol = symbol.trim();
    if symbol.is_empty() {
        return Err(DashboardError::MissingSymbol);
    }
    Ok(symbol.to_uppercase())
}
