//! Terminal stock dashboard
//!
//! Three pages behind one navigation switch:
//!
//! - **Home**: headlines and summaries scraped from a news page
//! - **Technical Analysis**: EMA, RSI, ADX and ATR snapshot with pass/fail
//!   markers, the full indicator table and a candlestick chart
//! - **Future Forecast**: a stacked LSTM model run over 20 years of closes,
//!   compared against the actual prices daily and per week
//!
//! Price history comes from Yahoo Finance. Charts are emitted as JSON
//! descriptions that any plotting frontend can draw.
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_dashboard::{Dashboard, DashboardConfig, TechnicalRequest, Timeframe};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let dashboard = Dashboard::new(DashboardConfig::builder().with_env().build()?)?;
//!
//!     let request = TechnicalRequest::new("AAPL").timeframe(Timeframe::SixMonths);
//!     println!("{}", dashboard.technical(&request).await?);
//!
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod forecast;
pub mod indicators;
pub mod pages;
pub mod render;
pub mod session;

// Re-export main types for convenience
pub use api::{Headline, Quote, QuoteSource, RetryPolicy, Timeframe, YahooFinanceClient};
pub use config::DashboardConfig;
pub use error::{DashboardError, Result};
pub use pages::{Dashboard, ForecastReport, NewsPage, Page, Selection, TechnicalReport, TechnicalRequest};
pub use session::{Command, Outcome, Session};
