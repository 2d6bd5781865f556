//! Command parsing for the interactive dashboard

use crate::api::Timeframe;
use crate::error::{DashboardError, Result};
use crate::pages::{
    DEFAULT_FORECAST_SYMBOL, DEFAULT_TECHNICAL_SYMBOL, Page, Selection, TechnicalRequest,
};

/// Parsed command from user input
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Show the news page
    News,
    /// Fetch the news page again
    Refresh,
    /// Show another headline in full
    Select(Selection),
    /// Run the technical analysis page
    Technical(TechnicalRequest),
    /// Run the forecast page
    Forecast { symbol: String },
    /// Open a page with its default inputs
    Open(Page),
    /// List the pages
    Pages,
    /// Show help
    Help,
    /// Leave the dashboard
    Exit,
}

fn command_err(msg: impl Into<String>) -> DashboardError {
    DashboardError::Command(msg.into())
}

fn parse_technical(args: &[&str]) -> Result<TechnicalRequest> {
    let symbol = args.first().copied().unwrap_or(DEFAULT_TECHNICAL_SYMBOL);
    let mut request = TechnicalRequest::new(symbol.to_uppercase());

    for arg in args.iter().skip(1) {
        match arg.to_lowercase().as_str() {
            "data" => request.show_data = true,
            "chart" => request.show_chart = true,
            other => request.timeframe = other.parse::<Timeframe>()?,
        }
    }
    Ok(request)
}

impl Command {
    /// Parse a command from user input
    ///
    /// Input without a leading `/` is read as a page name.
    pub fn parse(input: &str) -> Result<Self> {
        let input = input.trim();

        if input.is_empty() {
            return Err(command_err("Empty input"));
        }

        let Some(rest) = input.strip_prefix('/') else {
            return input.parse::<Page>().map(Command::Open).map_err(|_| {
                command_err(format!("Unknown input: {input}. Type /help for commands"))
            });
        };

        let parts: Vec<&str> = rest.split_whitespace().collect();
        let Some((cmd, args)) = parts.split_first() else {
            return Err(command_err("Empty command"));
        };
        let cmd = cmd.to_lowercase();

        match cmd.as_str() {
            "news" | "n" | "home" => Ok(Command::News),
            "refresh" | "r" => Ok(Command::Refresh),
            "select" | "s" => {
                if args.is_empty() {
                    return Err(command_err("Missing headline number or text for select"));
                }
                Ok(Command::Select(args.join(" ").parse()?))
            }
            "technical" | "tech" | "ta" | "t" => Ok(Command::Technical(parse_technical(args)?)),
            "forecast" | "f" => {
                let symbol = args.first().copied().unwrap_or(DEFAULT_FORECAST_SYMBOL);
                Ok(Command::Forecast {
                    symbol: symbol.to_uppercase(),
                })
            }
            "pages" | "p" | "menu" => Ok(Command::Pages),
            "help" | "h" | "?" => Ok(Command::Help),
            "exit" | "quit" | "q" => Ok(Command::Exit),
            _ => Err(command_err(format!("Unknown command: {cmd}"))),
        }
    }

    /// Get help text for all commands
    pub fn help_text() -> &'static str {
        r#"
Stock Dashboard Commands
========================

Pages:
  /news                          Headlines with summaries (Home)
  /refresh                       Fetch the headlines again
  /select <n|headline>           Show another headline in full
  /technical <symbol> [timeframe] [data] [chart]
                                 Technical analysis
  /forecast <symbol>             Model forecast vs actual closes

Timeframes:
  1d 5d 1mo 3mo 6mo 1y 2y 5y 10y ytd max   (default 1y)

Other Commands:
  /pages                         List the pages
  /help                          Show help
  /exit                          Exit

Command Aliases:
  /n = /news        /r = /refresh      /s = /select
  /t = /technical   /ta = /technical   /f = /forecast
  /p = /pages       /q = /exit

Typing a page name (Home, Technical Analysis, Future Forecast) opens it
with its default inputs.
"#
    }

    /// Get a short description of the command
    pub fn description(&self) -> &'static str {
        match self {
            Command::News => "Show headlines",
            Command::Refresh => "Refresh headlines",
            Command::Select(_) => "Select a headline",
            Command::Technical(_) => "Technical analysis",
            Command::Forecast { .. } => "Price forecast",
            Command::Open(_) => "Open a page",
            Command::Pages => "List pages",
            Command::Help => "Show help",
            Command::Exit => "Exit the dashboard",
        }
    }
}
