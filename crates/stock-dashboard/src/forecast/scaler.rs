//! Min-max scaling of a price series

use crate::error::{DashboardError, Result};
use serde::{Deserialize, Serialize};

/// Linear map of a fitted series onto `[0, 1]`
///
/// A constant series has zero range; it is given a unit range so every value
/// maps to `0.0` and the inverse still recovers it.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MinMaxScaler {
    data_min: f64,
    range: f64,
}

impl MinMaxScaler {
    /// Fit the scaler to `values`
    pub fn fit(values: &[f64]) -> Result<Self> {
        let (min, max) = values
            .iter()
            .filter(|v| v.is_finite())
            .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), &v| {
                (lo.min(v), hi.max(v))
            });

        if !min.is_finite() {
            return Err(DashboardError::Prediction(
                "cannot fit a scaler to an empty series".to_string(),
            ));
        }

        let range = if max > min { max - min } else { 1.0 };

        Ok(Self {
            data_min: min,
            range,
        })
    }

    /// Smallest fitted value
    pub fn data_min(&self) -> f64 {
        self.data_min
    }

    pub fn transform(&self, value: f64) -> f64 {
        (value - self.data_min) / self.range
    }

    pub fn inverse_transform(&self, value: f64) -> f64 {
        value * self.range + self.data_min
    }

    pub fn transform_all(&self, values: &[f64]) -> Vec<f64> {
        values.iter().map(|&v| self.transform(v)).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_and_transform() {
        let scaler = MinMaxScaler::fit(&[10.0, 20.0, 15.0, 30.0]).unwrap();

        assert_eq!(scaler.transform_all(&[10.0, 20.0, 15.0, 30.0]), vec![0.0, 0.5, 0.25, 1.0]);
        assert_eq!(scaler.inverse_transform(0.5), 20.0);
        // Values outside the fitted range extrapolate linearly
        assert_eq!(scaler.transform(40.0), 1.5);
    }

    #[test]
    fn test_constant_series() {
        let scaler = MinMaxScaler::fit(&[7.0, 7.0, 7.0]).unwrap();
        assert_eq!(scaler.transform(7.0), 0.0);
        assert_eq!(scaler.inverse_transform(0.0), 7.0);
    }

    #[test]
    fn test_empty_series() {
        assert!(MinMaxScaler::fit(&[]).is_err());
        assert!(MinMaxScaler::fit(&[f64::NAN]).is_err());
    }
}
