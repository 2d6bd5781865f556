//! Interactive dashboard session
//!
//! Parses slash commands, runs the matching page and returns its rendered
//! text. The news page stays open between commands so `/select` can switch
//! headlines without fetching again.
//!
//! # Example
//!
//! ```rust,ignore
//! use stock_dashboard::{Dashboard, DashboardConfig, Outcome, Session};
//!
//! let mut session = Session::new(Dashboard::new(DashboardConfig::default())?);
//! if let Outcome::Render(text) = session.process_input("/technical AAPL 6mo").await? {
//!     println!("{text}");
//! }
//! ```

pub mod commands;

pub use commands::Command;

use crate::error::{DashboardError, Result};
use crate::pages::{DEFAULT_FORECAST_SYMBOL, Dashboard, NewsPage, Page, TechnicalRequest};
use crate::render::NamedChart;

/// Result of one command
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// Text to print
    Render(String),
    /// The user asked to leave
    Exit,
}

/// State of an interactive dashboard
pub struct Session {
    dashboard: Dashboard,
    news: Option<NewsPage>,
    prompt: String,
}

impl Session {
    pub fn new(dashboard: Dashboard) -> Self {
        Self {
            dashboard,
            news: None,
            prompt: "dashboard> ".to_string(),
        }
    }

    pub fn dashboard(&self) -> &Dashboard {
        &self.dashboard
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    /// Banner printed when the session starts
    pub fn welcome(&self) -> String {
        format!(
            "Stock Dashboard\n\n{}\nType /help for commands, /exit to quit.",
            Page::menu()
        )
    }

    /// News page currently open, if any
    pub fn news_page(&self) -> Option<&NewsPage> {
        self.news.as_ref()
    }

    /// Process user input and return what to show
    pub async fn process_input(&mut self, input: &str) -> Result<Outcome> {
        let command = Command::parse(input)?;
        self.execute_command(command).await
    }

    /// Execute a parsed command
    pub async fn execute_command(&mut self, command: Command) -> Result<Outcome> {
        let output = match command {
            Command::News | Command::Open(Page::News) => {
                let page = self.dashboard.news().await?;
                self.show_news(page)
            }
            Command::Refresh => {
                let page = self.dashboard.refresh_news().await?;
                self.show_news(page)
            }
            Command::Select(selection) => {
                let page = self.news.as_mut().ok_or_else(|| {
                    DashboardError::Command("Open the news page first with /news".to_string())
                })?;
                page.select(&selection)?;
                page.to_string()
            }
            Command::Technical(request) => self.technical(&request).await?,
            Command::Open(Page::TechnicalAnalysis) => {
                self.technical(&TechnicalRequest::default()).await?
            }
            Command::Forecast { symbol } => self.forecast(&symbol).await?,
            Command::Open(Page::FutureForecast) => self.forecast(DEFAULT_FORECAST_SYMBOL).await?,
            Command::Pages => Page::menu(),
            Command::Help => Command::help_text().trim().to_string(),
            Command::Exit => return Ok(Outcome::Exit),
        };

        Ok(Outcome::Render(output))
    }

    async fn technical(&self, request: &TechnicalRequest) -> Result<String> {
        let report = self.dashboard.technical(request).await?;
        let charts: Vec<NamedChart> = report.chart.iter().cloned().collect();
        self.with_saved_charts(report.to_string(), &charts)
    }

    async fn forecast(&self, symbol: &str) -> Result<String> {
        let report = self.dashboard.forecast(symbol).await?;
        self.with_saved_charts(report.to_string(), &report.charts)
    }

    /// Open `page`, keeping the headline selected on the previous one
    fn show_news(&mut self, mut page: NewsPage) -> String {
        if let Some(previous) = &self.news {
            page.keep_selection(previous);
        }
        let rendered = page.to_string();
        self.news = Some(page);
        rendered
    }

    fn with_saved_charts(&self, mut rendered: String, charts: &[NamedChart]) -> Result<String> {
        for path in self.dashboard.save_charts(charts)? {
            rendered.push_str(&format!("\nSaved chart: {}", path.display()));
        }
        Ok(rendered)
    }
}
