//! Clients for external data: market prices and news pages

pub mod news;
pub mod retry;
pub mod yahoo;

pub use news::{Headline, NewsScraper, NewsSource, parse_headlines};
pub use retry::RetryPolicy;
pub use yahoo::{Quote, QuoteSource, Timeframe, YahooFinanceClient};
