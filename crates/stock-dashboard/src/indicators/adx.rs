//! Average directional index
//!
//! The `ta` crate ships EMA, RSI and ATR but no directional movement system,
//! so this indicator follows the same `Next` / `Period` / `Reset` contract to
//! sit alongside them.

use crate::error::{DashboardError, Result};
use std::fmt;
use ta::{Close, High, Low, Next, Period, Reset};

/// Wilder's running average: `avg = avg + (x - avg) / n`, seeded with the first input
#[derive(Debug, Clone)]
struct WilderAverage {
    period: usize,
    value: Option<f64>,
}

impl WilderAverage {
    fn new(period: usize) -> Self {
        Self {
            period,
            value: None,
        }
    }

    fn next(&mut self, input: f64) -> f64 {
        let value = match self.value {
            None => input,
            Some(prev) => prev + (input - prev) / self.period as f64,
        };
        self.value = Some(value);
        value
    }

    fn reset(&mut self) {
        self.value = None;
    }
}

/// Output of [`AverageDirectionalIndex`] for one bar
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AdxOutput {
    /// Trend strength, 0..=100
    pub adx: f64,
    /// Positive directional indicator (+DI)
    pub plus_di: f64,
    /// Negative directional indicator (−DI)
    pub minus_di: f64,
}

/// Average directional index with its directional components
///
/// True range, +DM and −DM are smoothed with Wilder's average; DX is then
/// smoothed again with the same period to give ADX.
#[derive(Debug, Clone)]
pub struct AverageDirectionalIndex {
    period: usize,
    prev: Option<(f64, f64, f64)>,
    true_range: WilderAverage,
    plus_dm: WilderAverage,
    minus_dm: WilderAverage,
    adx: WilderAverage,
}

impl AverageDirectionalIndex {
    pub fn new(period: usize) -> Result<Self> {
        if period == 0 {
            return Err(DashboardError::Indicator(
                "ADX period must be greater than 0".to_string(),
            ));
        }

        Ok(Self {
            period,
            prev: None,
            true_range: WilderAverage::new(period),
            plus_dm: WilderAverage::new(period),
            minus_dm: WilderAverage::new(period),
            adx: WilderAverage::new(period),
        })
    }
}

impl Period for AverageDirectionalIndex {
    fn period(&self) -> usize {
        self.period
    }
}

impl<T: High + Low + Close> Next<&T> for AverageDirectionalIndex {
    type Output = AdxOutput;

    fn next(&mut self, bar: &T) -> AdxOutput {
        let (high, low, close) = (bar.high(), bar.low(), bar.close());

        let (tr, plus_dm, minus_dm) = match self.prev {
            None => (high - low, 0.0, 0.0),
            Some((prev_high, prev_low, prev_close)) => {
                let tr = (high - low)
                    .max((high - prev_close).abs())
                    .max((low - prev_close).abs());
                let up = high - prev_high;
                let down = prev_low - low;
                let plus_dm = if up > down && up > 0.0 { up } else { 0.0 };
                let minus_dm = if down > up && down > 0.0 { down } else { 0.0 };
                (tr, plus_dm, minus_dm)
            }
        };
        self.prev = Some((high, low, close));

        let atr = self.true_range.next(tr);
        let plus_dm = self.plus_dm.next(plus_dm);
        let minus_dm = self.minus_dm.next(minus_dm);

        let (plus_di, minus_di) = if atr > 0.0 {
            (100.0 * plus_dm / atr, 100.0 * minus_dm / atr)
        } else {
            (0.0, 0.0)
        };

        let di_sum = plus_di + minus_di;
        let dx = if di_sum > 0.0 {
            100.0 * (plus_di - minus_di).abs() / di_sum
        } else {
            0.0
        };

        AdxOutput {
            adx: self.adx.next(dx),
            plus_di,
            minus_di,
        }
    }
}

impl Reset for AverageDirectionalIndex {
    fn reset(&mut self) {
        self.prev = None;
        self.true_range.reset();
        self.plus_dm.reset();
        self.minus_dm.reset();
        self.adx.reset();
    }
}

impl Default for AverageDirectionalIndex {
    fn default() -> Self {
        Self {
            period: 14,
            prev: None,
            true_range: WilderAverage::new(14),
            plus_dm: WilderAverage::new(14),
            minus_dm: WilderAverage::new(14),
            adx: WilderAverage::new(14),
        }
    }
}

impl fmt::Display for AverageDirectionalIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ADX({})", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Bar(f64, f64, f64);

    impl High for Bar {
        fn high(&self) -> f64 {
            self.0
        }
    }
    impl Low for Bar {
        fn low(&self) -> f64 {
            self.1
        }
    }
    impl Close for Bar {
        fn close(&self) -> f64 {
            self.2
        }
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(AverageDirectionalIndex::new(0).is_err());
    }

    #[test]
    fn test_steady_uptrend() {
        let mut adx = AverageDirectionalIndex::new(14).unwrap();
        let mut last = None;
        for i in 0..60 {
            let base = 100.0 + f64::from(i);
            last = Some(adx.next(&Bar(base + 1.0, base - 1.0, base + 0.5)));
        }
        let out = last.unwrap();

        // Only upward movement: −DI stays at zero and DX is 100 on every bar after the first
        assert!(out.plus_di > 0.0);
        assert_eq!(out.minus_di, 0.0);
        assert!(out.adx > 90.0);
    }

    #[test]
    fn test_steady_downtrend() {
        let mut adx = AverageDirectionalIndex::new(14).unwrap();
        let mut last = None;
        for i in 0..60 {
            let base = 200.0 - f64::from(i);
            last = Some(adx.next(&Bar(base + 1.0, base - 1.0, base - 0.5)));
        }
        let out = last.unwrap();

        assert_eq!(out.plus_di, 0.0);
        assert!(out.minus_di > 0.0);
        assert!(out.adx > 90.0);
    }

    #[test]
    fn test_flat_market_has_no_trend() {
        let mut adx = AverageDirectionalIndex::default();
        for _ in 0..30 {
            let out = adx.next(&Bar(10.0, 10.0, 10.0));
            assert_eq!(out.adx, 0.0);
            assert_eq!(out.plus_di, 0.0);
            assert_eq!(out.minus_di, 0.0);
        }
    }

    #[test]
    fn test_reset() {
        let mut adx = AverageDirectionalIndex::new(5).unwrap();
        let first = adx.next(&Bar(11.0, 9.0, 10.0));
        adx.next(&Bar(13.0, 10.0, 12.0));
        adx.reset();
        assert_eq!(adx.next(&Bar(11.0, 9.0, 10.0)), first);
        assert_eq!(adx.period(), 5);
        assert_eq!(adx.to_string(), "ADX(5)");
    }
}
