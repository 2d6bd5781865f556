//! Future forecast page

use super::{Dashboard, normalize_symbol};
use crate::cache::CacheKey;
use crate::error::{DashboardError, Result};
use crate::forecast::{ComparisonRow, Forecast, SequenceModel, history_start, run_forecast};
use crate::render::{BarMode, ChartSpec, LineDash, NamedChart, Trace, build_table, preview_rows};
use chrono::Utc;
use std::fmt;
use std::path::PathBuf;

/// Symbol shown when the page opens
pub const DEFAULT_FORECAST_SYMBOL: &str = "GOOG";

const DARK_TEMPLATE: &str = "plotly_dark";

/// Output of the forecast page
#[derive(Debug, Clone)]
pub struct ForecastReport {
    pub forecast: Forecast,
    pub charts: Vec<NamedChart>,
}

fn comparison_table(rows: &[ComparisonRow], date_header: &str) -> comfy_table::Table {
    let rows = rows
        .iter()
        .map(|row| {
            vec![
                row.date.format("%Y-%m-%d").to_string(),
                format!("{:.2}", row.original_test_data),
                format!("{:.2}", row.predictions),
            ]
        })
        .collect();
    build_table(
        [date_header, "original_test_data", "predictions"],
        preview_rows(rows),
    )
}

impl fmt::Display for ForecastReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let forecast = &self.forecast;
        writeln!(f, "📉 Stock Price Prediction")?;

        writeln!(f, "\nStock Data for {}", forecast.symbol)?;
        let history = forecast
            .history
            .iter()
            .map(|p| vec![p.date.format("%Y-%m-%d").to_string(), format!("{:.2}", p.close)])
            .collect();
        writeln!(f, "{}", build_table(["Date", "Close"], preview_rows(history)))?;

        writeln!(f, "\nOriginal values vs Predicted values")?;
        writeln!(f, "{}", comparison_table(&forecast.comparison, "Date"))?;

        writeln!(f, "\nWeekly Aggregated Data")?;
        write!(f, "{}", comparison_table(&forecast.weekly, "Week ending"))?;

        for chart in &self.charts {
            write!(f, "\nChart: {}", chart.chart.summary())?;
        }
        Ok(())
    }
}

fn dates(rows: &[ComparisonRow]) -> Vec<String> {
    rows.iter()
        .map(|row| row.date.format("%Y-%m-%d").to_string())
        .collect()
}

fn bar(name: &str, rows: &[ComparisonRow], pick: fn(&ComparisonRow) -> f64, color: &str) -> Trace {
    Trace::Bar {
        name: name.to_string(),
        x: dates(rows),
        y: rows.iter().map(pick).collect(),
        color: color.to_string(),
    }
}

/// Actual closes and predictions over time
pub fn line_chart(forecast: &Forecast) -> ChartSpec {
    let test_dates = dates(&forecast.comparison);
    let line = |name: &str, x: Vec<String>, y: Vec<Option<f64>>, color: &str, dash: LineDash| {
        Trace::Line {
            name: name.to_string(),
            x,
            y,
            color: color.to_string(),
            dash,
        }
    };

    ChartSpec::price_chart("Original Close Price vs Predicted Close Price (Line Chart)")
        .with_template(DARK_TEMPLATE)
        .with_trace(line(
            "Original Data",
            forecast
                .history
                .iter()
                .map(|p| p.date.format("%Y-%m-%d").to_string())
                .collect(),
            forecast.history.iter().map(|p| Some(p.close)).collect(),
            "blue",
            LineDash::Solid,
        ))
        .with_trace(line(
            "Original Test Data",
            test_dates.clone(),
            forecast
                .comparison
                .iter()
                .map(|r| Some(r.original_test_data))
                .collect(),
            "green",
            LineDash::Solid,
        ))
        .with_trace(line(
            "Predicted Test Data",
            test_dates,
            forecast.comparison.iter().map(|r| Some(r.predictions)).collect(),
            "blue",
            LineDash::Dash,
        ))
}

/// Daily actual vs predicted closes as grouped columns
pub fn column_chart(forecast: &Forecast) -> ChartSpec {
    ChartSpec::price_chart("Original Close Price vs Predicted Close Price (Column Chart)")
        .with_template(DARK_TEMPLATE)
        .with_bar_mode(BarMode::Group)
        .with_trace(bar(
            "Original Test Data",
            &forecast.comparison,
            |r| r.original_test_data,
            "green",
        ))
        .with_trace(bar(
            "Predicted Test Data",
            &forecast.comparison,
            |r| r.predictions,
            "blue",
        ))
}

/// Weekly means as grouped columns
pub fn weekly_chart(forecast: &Forecast) -> ChartSpec {
    ChartSpec::price_chart("Weekly Aggregated Data (Column Chart)")
        .with_template(DARK_TEMPLATE)
        .with_bar_mode(BarMode::Group)
        .with_trace(bar(
            "Weekly Aggregated Original Data",
            &forecast.weekly,
            |r| r.original_test_data,
            "green",
        ))
        .with_trace(bar(
            "Weekly Aggregated Predicted Data",
            &forecast.weekly,
            |r| r.predictions,
            "blue",
        ))
}

async fn load_model(path: PathBuf) -> Result<SequenceModel> {
    tokio::task::spawn_blocking(move || SequenceModel::load(&path))
        .await
        .map_err(|e| DashboardError::ModelLoad(e.to_string()))?
}

impl Dashboard {
    /// Predict every close after the first window and compare with the actual one
    ///
    /// The history is fetched before the model is loaded, so a bad symbol is
    /// reported even when the weights file is missing.
    pub async fn forecast(&self, symbol: &str) -> Result<ForecastReport> {
        let symbol = normalize_symbol(symbol)?;
        let years = self.config.history_years;

        let end = Utc::now();
        let start = history_start(end, years);
        let key = CacheKey::new(&symbol, "history", format!("{years}y"));
        let fetch = async { self.quotes.history(&symbol, start, end).await };
        let quotes = self.history(key, &symbol, fetch).await?;

        let model = load_model(self.config.model_path.clone()).await?;
        if model.window() != self.config.window_size {
            return Err(DashboardError::ModelLoad(format!(
                "model expects {} closes per window, window_size is {}",
                model.window(),
                self.config.window_size
            )));
        }

        let forecast = run_forecast(&symbol, &quotes, &model, self.config.batch_size)?;
        let charts = vec![
            NamedChart::new(format!("{symbol}_line"), line_chart(&forecast)),
            NamedChart::new(format!("{symbol}_columns"), column_chart(&forecast)),
            NamedChart::new(format!("{symbol}_weekly"), weekly_chart(&forecast)),
        ];

        tracing::info!(
            symbol = %symbol,
            rows = quotes.len(),
            predictions = forecast.comparison.len(),
            "forecast computed"
        );

        Ok(ForecastReport { forecast, charts })
    }
}
