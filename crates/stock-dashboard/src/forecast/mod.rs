//! Price forecast pipeline: scale, window, infer, unscale, aggregate

pub mod model;
pub mod resample;
pub mod scaler;
pub mod window;

pub use model::{Activation, LayerSpec, ModelSpec, SequenceModel};
pub use resample::{ComparisonRow, week_ending, weekly_means};
pub use scaler::MinMaxScaler;
pub use window::{Windows, build_windows};

use crate::api::Quote;
use crate::error::{DashboardError, Result};
use chrono::{DateTime, Months, NaiveDate, Utc};
use serde::Serialize;

/// A dated close of the fetched history
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PricePoint {
    pub date: NaiveDate,
    pub close: f64,
}

/// Output of the forecast pipeline for one symbol
#[derive(Debug, Clone, Serialize)]
pub struct Forecast {
    pub symbol: String,
    /// Full close series
    pub history: Vec<PricePoint>,
    /// Actual vs predicted close for every date after the first window
    pub comparison: Vec<ComparisonRow>,
    /// `comparison` averaged per calendar week
    pub weekly: Vec<ComparisonRow>,
}

/// Same calendar day `years` years before `end`; Feb 29 lands on Feb 28
pub fn history_start(end: DateTime<Utc>, years: u32) -> DateTime<Utc> {
    end.checked_sub_months(Months::new(12 * years))
        .unwrap_or(DateTime::<Utc>::MIN_UTC)
}

/// Run the model over every window of `quotes` and map the outputs back to prices
pub fn run_forecast(
    symbol: &str,
    quotes: &[Quote],
    model: &SequenceModel,
    batch_size: usize,
) -> Result<Forecast> {
    let closes: Vec<f64> = quotes.iter().map(|q| q.close).collect();
    let window = model.window();
    if closes.len() <= window {
        return Err(DashboardError::InsufficientData {
            rows: closes.len(),
            required: window + 1,
        });
    }

    let scaler = MinMaxScaler::fit(&closes)?;
    let windows = build_windows(&scaler.transform_all(&closes), window)?;
    let predictions = model.predict(&windows.inputs, batch_size)?;

    let comparison: Vec<ComparisonRow> = quotes[window..]
        .iter()
        .zip(&windows.targets)
        .zip(&predictions)
        .map(|((quote, &target), &predicted)| ComparisonRow {
            date: quote.date(),
            original_test_data: scaler.inverse_transform(target),
            predictions: scaler.inverse_transform(f64::from(predicted)),
        })
        .collect();
    let weekly = weekly_means(&comparison);

    tracing::debug!(
        symbol,
        windows = windows.len(),
        weeks = weekly.len(),
        "forecast computed"
    );

    Ok(Forecast {
        symbol: symbol.to_string(),
        history: quotes
            .iter()
            .map(|q| PricePoint {
                date: q.date(),
                close: q.close,
            })
            .collect(),
        comparison,
        weekly,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::frame::tests::trending_quotes;
    use chrono::TimeZone;

    #[test]
    fn test_history_start() {
        let end = Utc.with_ymd_and_hms(2024, 6, 15, 9, 0, 0).unwrap();
        assert_eq!(
            history_start(end, 20),
            Utc.with_ymd_and_hms(2004, 6, 15, 9, 0, 0).unwrap()
        );

        let leap = Utc.with_ymd_and_hms(2024, 2, 29, 0, 0, 0).unwrap();
        assert_eq!(
            history_start(leap, 1),
            Utc.with_ymd_and_hms(2023, 2, 28, 0, 0, 0).unwrap()
        );
    }

    #[test]
    fn test_run_forecast_recovers_price_units() {
        // Identity-like model: predicts roughly tanh(tanh(last scaled close))
        let model = SequenceModel::from_spec(model::tests::last_step_spec(10)).unwrap();
        let quotes = trending_quotes(40, 100.0, 1.0);

        let forecast = run_forecast("TEST", &quotes, &model, 8).unwrap();

        assert_eq!(forecast.history.len(), 40);
        assert_eq!(forecast.comparison.len(), 30);
        assert_eq!(forecast.comparison[0].date, quotes[10].date());
        // Targets come back as the actual closes
        for (row, quote) in forecast.comparison.iter().zip(&quotes[10..]) {
            assert!((row.original_test_data - quote.close).abs() < 1e-9);
        }
        // Predictions stay inside the fitted price range
        assert!(
            forecast
                .comparison
                .iter()
                .all(|r| (100.0..=139.0).contains(&r.predictions))
        );
        assert!(!forecast.weekly.is_empty());
        assert!(forecast.weekly.len() <= forecast.comparison.len());
    }

    #[test]
    fn test_run_forecast_needs_more_than_one_window() {
        let model = SequenceModel::from_spec(model::tests::last_step_spec(10)).unwrap();
        let err = run_forecast("TEST", &trending_quotes(10, 1.0, 1.0), &model, 4).unwrap_err();
        assert_eq!(err.to_string(), "Not enough data to make predictions.");
    }
}
