//! Home page: real-time news headlines with summaries

use super::Dashboard;
use crate::api::{Headline, parse_headlines};
use crate::cache::CacheKey;
use crate::error::{DashboardError, Result};
use chrono::{DateTime, Local};
use std::fmt;
use std::str::FromStr;

const BOLD: &str = "\x1b[1m";
const RESET: &str = "\x1b[0m";

/// Raw page as cached between renders
#[derive(Debug, Clone)]
pub(crate) struct FetchedPage {
    html: String,
    fetched_at: DateTime<Local>,
}

/// Which headline to show in full
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    /// 1-based position in the list
    Index(usize),
    /// Exact headline text
    Text(String),
}

impl FromStr for Selection {
    type Err = DashboardError;

    fn from_str(s: &str) -> Result<Self> {
        let s = s.trim();
        if s.is_empty() {
            return Err(DashboardError::Command(
                "Missing headline number or text".to_string(),
            ));
        }
        Ok(s.parse::<usize>()
            .map_or_else(|_| Selection::Text(s.to_string()), Selection::Index))
    }
}

/// Rendered state of the news page
#[derive(Debug, Clone)]
pub struct NewsPage {
    pub source_url: String,
    pub items: Vec<Headline>,
    pub updated_at: DateTime<Local>,
    selected: usize,
}

impl NewsPage {
    /// Page with the first headline selected
    pub fn new(source_url: impl Into<String>, items: Vec<Headline>, updated_at: DateTime<Local>) -> Self {
        Self {
            source_url: source_url.into(),
            items,
            updated_at,
            selected: 0,
        }
    }

    /// Currently selected headline, `None` when the page is empty
    pub fn selected(&self) -> Option<&Headline> {
        self.items.get(self.selected)
    }

    /// Change the selected headline
    ///
    /// Text matches the first headline equal to it.
    pub fn select(&mut self, selection: &Selection) -> Result<&Headline> {
        if self.items.is_empty() {
            return Err(DashboardError::Command("No headlines to select".to_string()));
        }

        let index = match selection {
            Selection::Index(n) if (1..=self.items.len()).contains(n) => n - 1,
            Selection::Index(n) => {
                return Err(DashboardError::Command(format!(
                    "Headline number {n} is out of range (1-{})",
                    self.items.len()
                )));
            }
            Selection::Text(text) => self
                .items
                .iter()
                .position(|item| item.headline == *text)
                .ok_or_else(|| DashboardError::Command(format!("Headline not found: {text}")))?,
        };

        self.selected = index;
        Ok(&self.items[index])
    }

    /// Keep the selection of `previous` when its headline is still listed
    pub fn keep_selection(&mut self, previous: &NewsPage) {
        let Some(prev) = previous.selected() else {
            return;
        };
        if self.select(&Selection::Text(prev.headline.clone())).is_err() {
            tracing::debug!(headline = %prev.headline, "previous headline gone, keeping default selection");
        }
    }

    /// `Last updated: YYYY-MM-DD HH:MM:SS`
    pub fn last_updated(&self) -> String {
        format!("Last updated: {}", self.updated_at.format("%Y-%m-%d %H:%M:%S"))
    }
}

impl fmt::Display for NewsPage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Real-Time News Headlines with Summaries")?;
        writeln!(f, "Source: {}", self.source_url)?;
        writeln!(f)?;

        match self.selected() {
            None => writeln!(f, "No headlines found")?,
            Some(selected) => {
                for (i, item) in self.items.iter().enumerate() {
                    let marker = if i == self.selected { '>' } else { ' ' };
                    writeln!(f, "{marker} {:>2}. {}", i + 1, item.headline)?;
                }
                writeln!(f)?;
                writeln!(f, "{BOLD}{}{RESET}", selected.headline)?;
                writeln!(f, "{}", selected.summary)?;
            }
        }

        writeln!(f)?;
        write!(f, "{}", self.last_updated())
    }
}

impl Dashboard {
    /// Headlines of the configured news page
    ///
    /// Served from the session cache while it is fresh.
    pub async fn news(&self) -> Result<NewsPage> {
        let url = self.config.news_url.as_str();
        let key = CacheKey::new(url, "news", ());

        let page = self
            .news_cache
            .get_or_fetch(key, || async {
                let html = self.news.fetch_html(url).await?;
                Ok::<_, DashboardError>(FetchedPage {
                    html,
                    fetched_at: Local::now(),
                })
            })
            .await?;

        let items = parse_headlines(
            &page.html,
            &self.config.headline_selector,
            &self.config.summary_selector,
        )?;
        tracing::info!(url, headlines = items.len(), "news page loaded");

        Ok(NewsPage::new(url, items, page.fetched_at))
    }

    /// Fetch the news page again, bypassing the cache
    pub async fn refresh_news(&self) -> Result<NewsPage> {
        let key = CacheKey::new(self.config.news_url.as_str(), "news", ());
        self.news_cache.invalidate(&key).await;
        self.news().await
    }
}
