//! Command-line arguments and configuration layering

use clap::{Parser, Subcommand};
use dashboard_utils::LogFormat;
use std::path::PathBuf;
use std::time::Duration;
use stock_dashboard::pages::{DEFAULT_FORECAST_SYMBOL, DEFAULT_TECHNICAL_SYMBOL};
use stock_dashboard::{DashboardConfig, Selection, TechnicalRequest, Timeframe};

#[derive(Parser, Debug)]
#[command(name = "stock-dashboard")]
#[command(about = "Stock news, technical analysis and price forecasts in the terminal")]
#[command(
    long_about = "Runs one page and exits, or starts an interactive session when no page is given."
)]
pub struct Cli {
    /// JSON config file applied over the defaults
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    /// Directory where chart JSON files are written
    #[arg(long, global = true)]
    pub chart_dir: Option<PathBuf>,

    /// Forecast model weights file
    #[arg(long, global = true)]
    pub model: Option<PathBuf>,

    #[command(subcommand)]
    pub page: Option<PageCommand>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum PageCommand {
    /// Headlines with summaries
    News {
        /// Keep fetching until interrupted
        #[arg(short, long)]
        watch: bool,

        /// Headline to show in full, by number or text
        #[arg(short, long)]
        select: Option<Selection>,

        /// Seconds between fetches in watch mode (5-60)
        #[arg(short, long)]
        interval: Option<u64>,
    },

    /// Technical analysis of one symbol
    Technical {
        #[arg(default_value = DEFAULT_TECHNICAL_SYMBOL)]
        symbol: String,

        /// Lookback window: 1d 5d 1mo 3mo 6mo 1y 2y 5y 10y ytd max
        #[arg(short, long, default_value_t = Timeframe::default())]
        timeframe: Timeframe,

        /// Print the full indicator table
        #[arg(short, long)]
        data: bool,

        /// Produce the candlestick chart
        #[arg(long)]
        chart: bool,
    },

    /// Forecast model predictions against actual closes
    Forecast {
        #[arg(default_value = DEFAULT_FORECAST_SYMBOL)]
        symbol: String,
    },
}

impl PageCommand {
    /// Technical page inputs, if this is the technical command
    pub fn technical_request(&self) -> Option<TechnicalRequest> {
        match self {
            PageCommand::Technical {
                symbol,
                timeframe,
                data,
                chart,
            } => Some(
                TechnicalRequest::new(symbol.as_str())
                    .timeframe(*timeframe)
                    .show_data(*data)
                    .show_chart(*chart),
            ),
            _ => None,
        }
    }
}

impl Cli {
    pub fn log_format(&self) -> LogFormat {
        if self.log_json {
            LogFormat::Json
        } else {
            LogFormat::Text
        }
    }

    /// Defaults, then the config file, then `DASHBOARD_*` variables, then flags
    pub fn load_config(&self) -> stock_dashboard::Result<DashboardConfig> {
        let base = match &self.config {
            Some(path) => DashboardConfig::from_file(path)?,
            None => DashboardConfig::default(),
        };

        let mut builder = DashboardConfig::builder().base(base).with_env();
        if let Some(dir) = &self.chart_dir {
            builder = builder.chart_dir(dir);
        }
        if let Some(model) = &self.model {
            builder = builder.model_path(model);
        }
        if let Some(PageCommand::News {
            interval: Some(secs),
            ..
        }) = &self.page
        {
            builder = builder.refresh_interval(Duration::from_secs(*secs));
        }

        builder.build()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_technical() {
        let cli = Cli::try_parse_from([
            "stock-dashboard",
            "technical",
            "msft",
            "--timeframe",
            "6mo",
            "--data",
        ])
        .unwrap();

        let request = cli.page.unwrap().technical_request().unwrap();
        assert_eq!(request.symbol, "msft");
        assert_eq!(request.timeframe, Timeframe::SixMonths);
        assert!(request.show_data);
        assert!(!request.show_chart);
    }

    #[test]
    fn test_parse_defaults() {
        let cli = Cli::try_parse_from(["stock-dashboard", "technical"]).unwrap();
        let request = cli.page.unwrap().technical_request().unwrap();
        assert_eq!(request, TechnicalRequest::default());

        let cli = Cli::try_parse_from(["stock-dashboard", "forecast"]).unwrap();
        assert_eq!(
            cli.page,
            Some(PageCommand::Forecast {
                symbol: "GOOG".to_string()
            })
        );

        let cli = Cli::try_parse_from(["stock-dashboard"]).unwrap();
        assert!(cli.page.is_none());
        assert_eq!(cli.log_format(), LogFormat::Text);
    }

    #[test]
    fn test_parse_news() {
        let cli = Cli::try_parse_from([
            "stock-dashboard",
            "--log-json",
            "news",
            "--watch",
            "--select",
            "2",
        ])
        .unwrap();

        assert_eq!(cli.log_format(), LogFormat::Json);
        assert_eq!(
            cli.page,
            Some(PageCommand::News {
                watch: true,
                select: Some(Selection::Index(2)),
                interval: None,
            })
        );
    }

    #[test]
    fn test_bad_timeframe_rejected() {
        assert!(Cli::try_parse_from(["stock-dashboard", "technical", "AAPL", "-t", "7w"]).is_err());
    }

    #[test]
    fn test_config_layering() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("dashboard.json");
        std::fs::write(
            &path,
            r#"{"model_path": "from_file.json", "batch_size": 64, "refresh_interval": 10}"#,
        )
        .unwrap();

        let cli = Cli::try_parse_from([
            "stock-dashboard",
            "--config",
            path.to_str().unwrap(),
            "--model",
            "from_flag.json",
            "news",
            "--interval",
            "90",
        ])
        .unwrap();
        let config = cli.load_config().unwrap();

        assert_eq!(config.model_path, PathBuf::from("from_flag.json"));
        assert_eq!(config.batch_size, 64);
        // Stored as given, clamped when used
        assert_eq!(config.refresh_interval, Duration::from_secs(90));
        assert_eq!(config.refresh_interval(), Duration::from_secs(60));
    }

    #[test]
    fn test_missing_config_file() {
        let cli = Cli::try_parse_from(["stock-dashboard", "--config", "/nonexistent/dashboard.json"])
            .unwrap();
        assert!(cli.load_config().is_err());
    }
}
