//! Error types for dashboard operations

use thiserror::Error;

/// Dashboard specific errors
///
/// The `Display` text of each variant is what the user sees when a page fails.
#[derive(Debug, Error)]
pub enum DashboardError {
    /// Network or HTTP error
    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    /// Server answered with a non-success status
    #[error("Request to {url} failed with status {status}")]
    HttpStatus { url: String, status: u16 },

    /// JSON parsing error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filesystem error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Yahoo Finance API error
    #[error("Error fetching data for {symbol}: {reason}")]
    YahooFinance { symbol: String, reason: String },

    /// History came back empty
    #[error("No data found for stock symbol: {symbol}")]
    NoData { symbol: String },

    /// No ticker was supplied
    #[error("Please enter a stock symbol.")]
    MissingSymbol,

    /// Unknown lookback window
    #[error("Invalid timeframe: {0}")]
    InvalidTimeframe(String),

    /// Technical indicator calculation error
    #[error("Technical indicator error: {0}")]
    Indicator(String),

    /// Model weights could not be loaded
    #[error("Error loading the model: {0}")]
    ModelLoad(String),

    /// Fewer rows than one input window
    #[error("Not enough data to make predictions.")]
    InsufficientData { rows: usize, required: usize },

    /// Inference failed
    #[error("Prediction failed: {0}")]
    Prediction(String),

    /// Markup or selector could not be parsed
    #[error("Parse error: {0}")]
    Parse(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Interactive command could not be understood
    #[error("Command error: {0}")]
    Command(String),
}

/// Result type alias for dashboard operations
pub type Result<T> = std::result::Result<T, DashboardError>;

impl From<dashboard_utils::ConfigFileError> for DashboardError {
    fn from(err: dashboard_utils::ConfigFileError) -> Self {
        DashboardError::Config(err.to_string())
    }
}
