//! Headline scraping

use super::RetryPolicy;
use crate::error::{DashboardError, Result};
use async_trait::async_trait;
use governor::clock::DefaultClock;
use governor::state::{InMemoryState, NotKeyed};
use governor::{Quota, RateLimiter};
use reqwest::Client;
use scraper::{Html, Selector};
use serde::{Deserialize, Serialize};
use std::num::NonZeroU32;
use std::sync::Arc;
use std::time::Duration;

type SharedRateLimiter = Arc<RateLimiter<NotKeyed, InMemoryState, DefaultClock>>;

/// A headline paired with its summary
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Headline {
    pub headline: String,
    pub summary: String,
}

/// Source of news page markup
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait NewsSource: Send + Sync {
    /// Fetch the raw HTML of `url`
    async fn fetch_html(&self, url: &str) -> Result<String>;
}

/// Pair headline and summary elements of a page in document order
///
/// Element text is trimmed. Pairing stops at the shorter of the two lists,
/// so trailing unmatched elements are dropped.
pub fn parse_headlines(
    html: &str,
    headline_selector: &str,
    summary_selector: &str,
) -> Result<Vec<Headline>> {
    let headline_sel = parse_selector(headline_selector)?;
    let summary_sel = parse_selector(summary_selector)?;

    let document = Html::parse_document(html);
    let texts = |selector: &Selector| -> Vec<String> {
        document
            .select(selector)
            .map(|el| el.text().collect::<String>().trim().to_string())
            .collect()
    };

    let headlines = texts(&headline_sel);
    let summaries = texts(&summary_sel);

    Ok(headlines
        .into_iter()
        .zip(summaries)
        .map(|(headline, summary)| Headline { headline, summary })
        .collect())
}

fn parse_selector(selector: &str) -> Result<Selector> {
    Selector::parse(selector)
        .map_err(|e| DashboardError::Parse(format!("invalid selector '{selector}': {e}")))
}

/// HTTP client for news pages with rate limiting
#[derive(Clone)]
pub struct NewsScraper {
    client: Client,
    rate_limiter: SharedRateLimiter,
    retry: RetryPolicy,
}

impl NewsScraper {
    /// Create a new scraper
    ///
    /// # Arguments
    /// * `timeout` - Per-request timeout
    /// * `rate_limit` - Requests per minute
    /// * `retry` - Attempts per fetch and the backoff between them
    pub fn new(timeout: Duration, rate_limit: u32, retry: RetryPolicy) -> Result<Self> {
        let client = Client::builder()
            .timeout(timeout)
            .user_agent(concat!("stock-dashboard/", env!("CARGO_PKG_VERSION")))
            .build()?;

        let quota = Quota::per_minute(NonZeroU32::new(rate_limit).unwrap_or(NonZeroU32::MIN));

        Ok(Self {
            client,
            rate_limiter: Arc::new(RateLimiter::direct(quota)),
            retry,
        })
    }

    async fn fetch_once(&self, url: &str) -> Result<String> {
        self.rate_limiter.until_ready().await;

        let response = self.client.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(DashboardError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        Ok(response.text().await?)
    }
}

#[async_trait]
impl NewsSource for NewsScraper {
    async fn fetch_html(&self, url: &str) -> Result<String> {
        let body = self.retry.run(url, || self.fetch_once(url)).await?;
        tracing::debug!(url, bytes = body.len(), "fetched news page");
        Ok(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const PAGE: &str = r#"
        <html><body>
          <h2>  Markets rally on rate cut hopes </h2>
          <p>Benchmarks closed higher for a third session.</p>
          <h2><a href="/a">Oil slips</a></h2>
          <p>
            Crude fell <b>2%</b> overnight.
          </p>
          <h2>Orphan headline</h2>
        </body></html>
    "#;

    #[test]
    fn test_parse_headlines_pairs_in_order() {
        let items = parse_headlines(PAGE, "h2", "p").unwrap();

        assert_eq!(items.len(), 2);
        assert_eq!(items[0].headline, "Markets rally on rate cut hopes");
        assert_eq!(items[0].summary, "Benchmarks closed higher for a third session.");
        assert_eq!(items[1].headline, "Oil slips");
        assert_eq!(items[1].summary, "Crude fell 2% overnight.");
    }

    #[test]
    fn test_parse_headlines_without_matches() {
        let items = parse_headlines("<html><body><div>nothing</div></body></html>", "h2", "p").unwrap();
        assert!(items.is_empty());
    }

    #[test]
    fn test_custom_selectors() {
        let html = r#"<h3 class="t">One</h3><p class="s">First</p><p>skip</p><h3 class="t">Two</h3><p class="s">Second</p>"#;
        let items = parse_headlines(html, "h3.t", "p.s").unwrap();

        assert_eq!(
            items,
            vec![
                Headline {
                    headline: "One".to_string(),
                    summary: "First".to_string()
                },
                Headline {
                    headline: "Two".to_string(),
                    summary: "Second".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_invalid_selector() {
        let err = parse_headlines(PAGE, "h2[", "p").unwrap_err();
        assert!(matches!(err, DashboardError::Parse(_)));
    }

    #[tokio::test]
    #[ignore] // Requires network access
    async fn test_fetch_html() {
        let scraper = NewsScraper::new(
            Duration::from_secs(30),
            30,
            RetryPolicy::new(1, Duration::from_secs(1)),
        )
        .unwrap();
        let html = scraper
            .fetch_html(crate::config::DEFAULT_NEWS_URL)
            .await
            .unwrap();
        assert!(!html.is_empty());
    }
}
