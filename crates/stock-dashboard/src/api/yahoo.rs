//! Yahoo Finance market data

use super::RetryPolicy;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use std::time::Duration;
use time::OffsetDateTime;
use yahoo_finance_api as yahoo;

/// One daily OHLCV bar
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Quote {
    pub symbol: String,
    pub timestamp: DateTime<Utc>,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub adjclose: f64,
}

impl Quote {
    /// Trading day of the bar
    pub fn date(&self) -> NaiveDate {
        self.timestamp.date_naive()
    }
}

impl ta::Open for Quote {
    fn open(&self) -> f64 {
        self.open
    }
}

impl ta::High for Quote {
    fn high(&self) -> f64 {
        self.high
    }
}

impl ta::Low for Quote {
    fn low(&self) -> f64 {
        self.low
    }
}

impl ta::Close for Quote {
    fn close(&self) -> f64 {
        self.close
    }
}

impl ta::Volume for Quote {
    fn volume(&self) -> f64 {
        self.volume as f64
    }
}

/// Lookback window offered by the technical analysis page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum Timeframe {
    OneDay,
    FiveDays,
    OneMonth,
    ThreeMonths,
    SixMonths,
    #[default]
    OneYear,
    TwoYears,
    FiveYears,
    TenYears,
    YearToDate,
    Max,
}

impl Timeframe {
    /// Every timeframe in selector order
    pub const ALL: [Timeframe; 11] = [
        Timeframe::OneDay,
        Timeframe::FiveDays,
        Timeframe::OneMonth,
        Timeframe::ThreeMonths,
        Timeframe::SixMonths,
        Timeframe::OneYear,
        Timeframe::TwoYears,
        Timeframe::FiveYears,
        Timeframe::TenYears,
        Timeframe::YearToDate,
        Timeframe::Max,
    ];

    /// Short code, e.g. `"3mo"`; also the Yahoo range parameter
    pub fn as_str(&self) -> &'static str {
        match self {
            Timeframe::OneDay => "1d",
            Timeframe::FiveDays => "5d",
            Timeframe::OneMonth => "1mo",
            Timeframe::ThreeMonths => "3mo",
            Timeframe::SixMonths => "6mo",
            Timeframe::OneYear => "1y",
            Timeframe::TwoYears => "2y",
            Timeframe::FiveYears => "5y",
            Timeframe::TenYears => "10y",
            Timeframe::YearToDate => "ytd",
            Timeframe::Max => "max",
        }
    }
}

impl fmt::Display for Timeframe {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Timeframe {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim().to_lowercase();
        Timeframe::ALL
            .into_iter()
            .find(|tf| tf.as_str() == s)
            .ok_or_else(|| {
                DashboardError::InvalidTimeframe(format!(
                    "{s} (expected one of: {})",
                    Timeframe::ALL.map(|tf| tf.as_str()).join(", ")
                ))
            })
    }
}

/// Source of daily price history
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait QuoteSource: Send + Sync {
    /// Daily bars between `start` and `end`, oldest first
    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>>;

    /// Daily bars of the trailing `timeframe`, oldest first
    ///
    /// Counts trading sessions rather than calendar days, so `1d` is the
    /// latest session even over a weekend.
    async fn history_range(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Quote>>;
}

/// Yahoo Finance API client
#[derive(Debug, Clone)]
pub struct YahooFinanceClient {
    retry: RetryPolicy,
}

impl YahooFinanceClient {
    pub fn new(retry: RetryPolicy) -> Self {
        Self { retry }
    }

    fn yahoo_err(symbol: &str) -> impl Fn(yahoo::YahooError) -> DashboardError + '_ {
        move |e| DashboardError::YahooFinance {
            symbol: symbol.to_string(),
            reason: e.to_string(),
        }
    }

    async fn fetch_between(
        &self,
        symbol: &str,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<Quote>> {
        let provider = yahoo::YahooConnector::new().map_err(Self::yahoo_err(symbol))?;
        let response = provider
            .get_quote_history(symbol, start, end)
            .await
            .map_err(Self::yahoo_err(symbol))?;
        to_quotes(symbol, &response)
    }

    async fn fetch_range(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Quote>> {
        let provider = yahoo::YahooConnector::new().map_err(Self::yahoo_err(symbol))?;
        let response = provider
            .get_quote_range(symbol, "1d", timeframe.as_str())
            .await
            .map_err(Self::yahoo_err(symbol))?;
        to_quotes(symbol, &response)
    }
}

fn to_quotes(symbol: &str, response: &yahoo::YResponse) -> Result<Vec<Quote>> {
    let quotes = response.quotes().map_err(YahooFinanceClient::yahoo_err(symbol))?;

    Ok(quotes
        .iter()
        .map(|q| Quote {
            symbol: symbol.to_string(),
            timestamp: DateTime::from_timestamp(q.timestamp as i64, 0).unwrap_or_else(Utc::now),
            open: q.open,
            high: q.high,
            low: q.low,
            close: q.close,
            volume: q.volume,
            adjclose: q.adjclose,
        })
        .collect())
}

impl Default for YahooFinanceClient {
    fn default() -> Self {
        Self::new(RetryPolicy::new(3, Duration::from_secs(1)))
    }
}

#[async_trait]
impl QuoteSource for YahooFinanceClient {
    async fn history(
        &self,
        symbol: &str,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<Quote>> {
        // Convert chrono DateTime to time OffsetDateTime
        let to_odt = |dt: DateTime<Utc>| {
            OffsetDateTime::from_unix_timestamp(dt.timestamp()).map_err(|e| {
                DashboardError::YahooFinance {
                    symbol: symbol.to_string(),
                    reason: format!("invalid timestamp {dt}: {e}"),
                }
            })
        };
        let (start_odt, end_odt) = (to_odt(start)?, to_odt(end)?);

        let quotes = self
            .retry
            .run(symbol, || self.fetch_between(symbol, start_odt, end_odt))
            .await?;
        tracing::debug!(symbol, rows = quotes.len(), "fetched price history");
        Ok(quotes)
    }

    async fn history_range(&self, symbol: &str, timeframe: Timeframe) -> Result<Vec<Quote>> {
        let quotes = self
            .retry
            .run(symbol, || self.fetch_range(symbol, timeframe))
            .await?;
        tracing::debug!(symbol, %timeframe, rows = quotes.len(), "fetched price range");
        Ok(quotes)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_timeframe_parse_and_display() {
        assert_eq!("3mo".parse::<Timeframe>().unwrap(), Timeframe::ThreeMonths);
        assert_eq!(" YTD ".parse::<Timeframe>().unwrap(), Timeframe::YearToDate);
        assert_eq!(Timeframe::TenYears.to_string(), "10y");
        assert_eq!(Timeframe::default(), Timeframe::OneYear);

        let err = "7w".parse::<Timeframe>().unwrap_err();
        assert!(err.to_string().contains("7w"));
    }

    #[test]
    fn test_quote_implements_ta_traits() {
        use ta::{Close, High, Low, Volume};

        let quote = Quote {
            symbol: "AAPL".to_string(),
            timestamp: Utc.with_ymd_and_hms(2024, 6, 14, 13, 30, 0).unwrap(),
            open: 10.0,
            high: 12.0,
            low: 9.0,
            close: 11.0,
            volume: 1_000,
            adjclose: 11.0,
        };

        assert_eq!(quote.high(), 12.0);
        assert_eq!(quote.low(), 9.0);
        assert_eq!(quote.close(), 11.0);
        assert_eq!(quote.volume(), 1_000.0);
        assert_eq!(quote.date().to_string(), "2024-06-14");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_history() {
        let client = YahooFinanceClient::default();
        let end = Utc::now();
        let quotes = client
            .history("AAPL", end - chrono::Duration::days(30), end)
            .await
            .unwrap();

        assert!(!quotes.is_empty());
        assert_eq!(quotes[0].symbol, "AAPL");
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_one_day_range_returns_latest_session() {
        let client = YahooFinanceClient::default();
        let quotes = client.history_range("AAPL", Timeframe::OneDay).await.unwrap();

        assert!(!quotes.is_empty());
        assert!(quotes.iter().all(|q| q.symbol == "AAPL"));
    }
}
