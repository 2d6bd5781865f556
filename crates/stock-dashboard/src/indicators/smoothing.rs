//! EMA, RSI and ATR with charting-library seeding
//!
//! The EMA starts from the simple average of its first `period` inputs. RSI
//! and ATR smooth with Wilder's factor `1 / period` as an exponentially
//! weighted mean over every input seen so far. Each indicator yields `None`
//! until it has enough inputs.

use crate::error::{DashboardError, Result};
use std::fmt;
use ta::{Close, High, Low, Next, Period, Reset};

fn check_period(name: &str, period: usize) -> Result<usize> {
    if period == 0 {
        return Err(DashboardError::Indicator(format!(
            "{name} period must be greater than 0"
        )));
    }
    Ok(period)
}

/// Exponential moving average seeded with the SMA of the first `period` inputs
#[derive(Debug, Clone)]
pub struct SmaSeededEma {
    period: usize,
    alpha: f64,
    seed_sum: f64,
    seen: usize,
    value: Option<f64>,
}

impl SmaSeededEma {
    pub fn new(period: usize) -> Result<Self> {
        let period = check_period("EMA", period)?;
        Ok(Self {
            period,
            alpha: 2.0 / (period as f64 + 1.0),
            seed_sum: 0.0,
            seen: 0,
            value: None,
        })
    }
}

impl Period for SmaSeededEma {
    fn period(&self) -> usize {
        self.period
    }
}

impl Next<f64> for SmaSeededEma {
    type Output = Option<f64>;

    fn next(&mut self, input: f64) -> Option<f64> {
        self.value = match self.value {
            Some(prev) => Some(prev + self.alpha * (input - prev)),
            None => {
                self.seed_sum += input;
                self.seen += 1;
                (self.seen == self.period).then(|| self.seed_sum / self.period as f64)
            }
        };
        self.value
    }
}

impl Reset for SmaSeededEma {
    fn reset(&mut self) {
        self.seed_sum = 0.0;
        self.seen = 0;
        self.value = None;
    }
}

impl fmt::Display for SmaSeededEma {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "EMA({})", self.period)
    }
}

/// Exponentially weighted mean with `alpha = 1 / period`
///
/// Keeps the weighted sum and the total weight separately, so early values
/// are the properly normalized mean of the inputs so far.
#[derive(Debug, Clone)]
struct WilderMean {
    period: usize,
    decay: f64,
    weighted_sum: f64,
    weight_total: f64,
    seen: usize,
}

impl WilderMean {
    fn new(period: usize) -> Self {
        Self {
            period,
            decay: 1.0 - 1.0 / period as f64,
            weighted_sum: 0.0,
            weight_total: 0.0,
            seen: 0,
        }
    }

    fn next(&mut self, input: f64) -> Option<f64> {
        self.weighted_sum = input + self.decay * self.weighted_sum;
        self.weight_total = 1.0 + self.decay * self.weight_total;
        self.seen += 1;
        (self.seen >= self.period).then(|| self.weighted_sum / self.weight_total)
    }

    fn reset(&mut self) {
        self.weighted_sum = 0.0;
        self.weight_total = 0.0;
        self.seen = 0;
    }
}

/// Relative strength index over Wilder-smoothed gains and losses
///
/// The first value needs `period` price changes, i.e. `period + 1` closes.
/// A window without any movement has no defined RSI.
#[derive(Debug, Clone)]
pub struct WilderRsi {
    period: usize,
    prev_close: Option<f64>,
    gains: WilderMean,
    losses: WilderMean,
}

impl WilderRsi {
    pub fn new(period: usize) -> Result<Self> {
        let period = check_period("RSI", period)?;
        Ok(Self {
            period,
            prev_close: None,
            gains: WilderMean::new(period),
            losses: WilderMean::new(period),
        })
    }
}

impl Period for WilderRsi {
    fn period(&self) -> usize {
        self.period
    }
}

impl Next<f64> for WilderRsi {
    type Output = Option<f64>;

    fn next(&mut self, close: f64) -> Option<f64> {
        let prev = self.prev_close.replace(close)?;
        let change = close - prev;

        let gain = self.gains.next(change.max(0.0));
        let loss = self.losses.next((-change).max(0.0));
        let (gain, loss) = (gain?, loss?);

        let total = gain + loss;
        (total > 0.0).then(|| 100.0 * gain / total)
    }
}

impl Reset for WilderRsi {
    fn reset(&mut self) {
        self.prev_close = None;
        self.gains.reset();
        self.losses.reset();
    }
}

impl fmt::Display for WilderRsi {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "RSI({})", self.period)
    }
}

/// Average true range with Wilder smoothing
///
/// True range needs the previous close, so the first bar yields nothing and
/// the first value arrives on bar `period + 1`.
#[derive(Debug, Clone)]
pub struct WilderAtr {
    period: usize,
    prev_close: Option<f64>,
    true_range: WilderMean,
}

impl WilderAtr {
    pub fn new(period: usize) -> Result<Self> {
        let period = check_period("ATR", period)?;
        Ok(Self {
            period,
            prev_close: None,
            true_range: WilderMean::new(period),
        })
    }
}

impl Period for WilderAtr {
    fn period(&self) -> usize {
        self.period
    }
}

impl<T: High + Low + Close> Next<&T> for WilderAtr {
    type Output = Option<f64>;

    fn next(&mut self, bar: &T) -> Option<f64> {
        let prev_close = self.prev_close.replace(bar.close())?;
        let tr = (bar.high() - bar.low())
            .max((bar.high() - prev_close).abs())
            .max((bar.low() - prev_close).abs());
        self.true_range.next(tr)
    }
}

impl Reset for WilderAtr {
    fn reset(&mut self) {
        self.prev_close = None;
        self.true_range.reset();
    }
}

impl fmt::Display for WilderAtr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "ATR({})", self.period)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::round2;

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

    fn run<I: Next<f64, Output = Option<f64>>>(indicator: &mut I, inputs: &[f64]) -> Vec<Option<f64>> {
        inputs.iter().map(|&x| indicator.next(x)).collect()
    }

    #[test]
    fn test_zero_period_rejected() {
        assert!(SmaSeededEma::new(0).is_err());
        assert!(WilderRsi::new(0).is_err());
        assert!(WilderAtr::new(0).is_err());
    }

    #[test]
    fn test_ema_starts_from_simple_average() {
        let mut ema = SmaSeededEma::new(3).unwrap();
        // Seed (2 + 4 + 6) / 3 = 4, then 4 + 0.5 * (1 - 4) = 2.5, then 2.5 + 0.5 * (9.5 - 2.5) = 6
        assert_eq!(
            run(&mut ema, &[2.0, 4.0, 6.0, 1.0, 9.5]),
            vec![None, None, Some(4.0), Some(2.5), Some(6.0)]
        );
    }

    #[test]
    fn test_ema_seed_differs_from_first_close_seed() {
        // A first-value seed would start at 10 and sit near 15 by the fourth input
        let mut ema = SmaSeededEma::new(4).unwrap();
        let values = run(&mut ema, &[10.0, 20.0, 30.0, 40.0]);
        assert_eq!(values[3], Some(25.0));
    }

    #[test]
    fn test_rsi_reference_values() {
        // Changes +1, -1, +2 with alpha 1/2:
        // gains (0 + 0.5 * 1) / 1.5 = 1/3, losses (1 + 0) / 1.5 = 2/3 -> 33.33
        // gains (2 + 0.25) / 1.75, losses 0.5 / 1.75 -> 2.25 / 2.75 = 81.82
        let mut rsi = WilderRsi::new(2).unwrap();
        let values = run(&mut rsi, &[10.0, 11.0, 10.0, 12.0]);

        assert_eq!(values[0], None);
        assert_eq!(values[1], None);
        assert_eq!(values[2].map(round2), Some(33.33));
        assert_eq!(values[3].map(round2), Some(81.82));
    }

    #[test]
    fn test_rsi_warm_up_and_extremes() {
        let mut rsi = WilderRsi::new(14).unwrap();
        let rising: Vec<f64> = (0..20).map(f64::from).collect();
        let values = run(&mut rsi, &rising);

        assert!(values[..14].iter().all(Option::is_none));
        assert_eq!(values[14].map(round2), Some(100.0));
        assert_eq!(values[19].map(round2), Some(100.0));

        let mut rsi = WilderRsi::new(3).unwrap();
        assert!(run(&mut rsi, &[5.0; 6]).iter().all(Option::is_none));
    }

    #[test]
    fn test_rsi_reset() {
        let mut rsi = WilderRsi::new(2).unwrap();
        let first = run(&mut rsi, &[10.0, 11.0, 10.0]);
        rsi.reset();
        assert_eq!(run(&mut rsi, &[10.0, 11.0, 10.0]), first);
        assert_eq!(rsi.to_string(), "RSI(2)");
    }

    #[test]
    fn test_atr_reference_values() {
        let mut atr = WilderAtr::new(2).unwrap();

        assert_eq!(atr.next(&Bar(11.0, 9.0, 10.0)), None);
        // True range 2, one value seen
        assert_eq!(atr.next(&Bar(12.0, 10.0, 11.0)), None);
        // True range 3: (3 + 0.5 * 2) / 1.5
        let value = atr.next(&Bar(13.0, 10.0, 12.0)).unwrap();
        assert_eq!(round2(value), 2.67);
        // Gap above the previous close counts toward true range
        let value = atr.next(&Bar(20.0, 19.0, 19.5)).unwrap();
        assert_eq!(round2(value), round2((8.0 + 0.5 * 3.0 + 0.25 * 2.0) / 1.75));
        assert_eq!(atr.period(), 2);
    }
}
