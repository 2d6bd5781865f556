//! Sliding input windows for the sequence model

use crate::error::{DashboardError, Result};
use ndarray::Array2;

/// Model inputs and their next-step targets
#[derive(Debug, Clone)]
pub struct Windows {
    /// One row per window, `window` scaled closes each
    pub inputs: Array2<f32>,
    /// Scaled close following each window
    pub targets: Vec<f64>,
}

impl Windows {
    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }
}

/// Build overlapping windows: for `i in window..len`, input `series[i - window..i]`, target `series[i]`
///
/// At least one window is required, so `series` must be strictly longer than `window`.
pub fn build_windows(series: &[f64], window: usize) -> Result<Windows> {
    if window == 0 || series.len() <= window {
        return Err(DashboardError::InsufficientData {
            rows: series.len(),
            required: window + 1,
        });
    }

    let count = series.len() - window;
    let inputs = Array2::from_shape_fn((count, window), |(row, step)| series[row + step] as f32);
    let targets = series[window..].to_vec();

    Ok(Windows { inputs, targets })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_windows() {
        let series: Vec<f64> = (0..6).map(f64::from).collect();
        let windows = build_windows(&series, 3).unwrap();

        assert_eq!(windows.len(), 3);
        assert_eq!(windows.inputs.shape(), &[3, 3]);
        assert_eq!(windows.inputs.row(0).to_vec(), vec![0.0, 1.0, 2.0]);
        assert_eq!(windows.inputs.row(2).to_vec(), vec![2.0, 3.0, 4.0]);
        assert_eq!(windows.targets, vec![3.0, 4.0, 5.0]);
    }

    #[test]
    fn test_series_must_exceed_window() {
        let series = vec![1.0; 100];
        let err = build_windows(&series, 100).unwrap_err();
        assert!(matches!(
            err,
            DashboardError::InsufficientData {
                rows: 100,
                required: 101
            }
        ));

        assert_eq!(build_windows(&[1.0; 101], 100).unwrap().len(), 1);
    }
}
