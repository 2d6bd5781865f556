//! Price history with indicator columns

use super::adx::AverageDirectionalIndex;
use super::smoothing::{SmaSeededEma, WilderAtr, WilderRsi};
use crate::api::Quote;
use crate::error::{DashboardError, Result};
use chrono::NaiveDate;
use serde::Serialize;
use ta::Next;

pub const EMA_FAST: usize = 20;
pub const EMA_SLOW: usize = 200;
pub const RSI_PERIOD: usize = 14;
pub const ADX_PERIOD: usize = 14;
pub const ATR_PERIOD: usize = 14;

/// One row of the technical analysis table
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct IndicatorRow {
    pub time: NaiveDate,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: u64,
    pub ema_20: Option<f64>,
    pub ema_200: Option<f64>,
    pub rsi_14: Option<f64>,
    pub adx_14: Option<f64>,
    pub dmp_14: Option<f64>,
    pub dmn_14: Option<f64>,
    pub atr_14: Option<f64>,
}

/// Indicator table for one symbol, oldest row first
#[derive(Debug, Clone, Serialize)]
pub struct IndicatorFrame {
    pub symbol: String,
    pub rows: Vec<IndicatorRow>,
}

/// `value` once `seen` rows cover the `needed` warm-up
fn warmed(value: f64, seen: usize, needed: usize) -> Option<f64> {
    (seen >= needed && value.is_finite()).then_some(value)
}

fn finite(value: Option<f64>) -> Option<f64> {
    value.filter(|v| v.is_finite())
}

impl IndicatorFrame {
    /// Compute every indicator column over `quotes` (oldest first)
    ///
    /// A column is `None` until its warm-up is complete: `period` rows for
    /// EMA and the directional indicators, `period + 1` rows for RSI and ATR,
    /// `2 * period` rows for ADX.
    pub fn compute(symbol: impl Into<String>, quotes: &[Quote]) -> Result<Self> {
        let symbol = symbol.into();
        if quotes.is_empty() {
            return Err(DashboardError::NoData { symbol });
        }

        let mut ema_fast = SmaSeededEma::new(EMA_FAST)?;
        let mut ema_slow = SmaSeededEma::new(EMA_SLOW)?;
        let mut rsi = WilderRsi::new(RSI_PERIOD)?;
        let mut atr = WilderAtr::new(ATR_PERIOD)?;
        let mut adx = AverageDirectionalIndex::new(ADX_PERIOD)?;

        let rows = quotes
            .iter()
            .enumerate()
            .map(|(i, q)| {
                let seen = i + 1;
                let directional = adx.next(q);

                IndicatorRow {
                    time: q.date(),
                    open: q.open,
                    high: q.high,
                    low: q.low,
                    close: q.close,
                    volume: q.volume,
                    ema_20: finite(ema_fast.next(q.close)),
                    ema_200: finite(ema_slow.next(q.close)),
                    rsi_14: finite(rsi.next(q.close)),
                    adx_14: warmed(directional.adx, seen, 2 * ADX_PERIOD),
                    dmp_14: warmed(directional.plus_di, seen, ADX_PERIOD),
                    dmn_14: warmed(directional.minus_di, seen, ADX_PERIOD),
                    atr_14: finite(atr.next(q)),
                }
            })
            .collect();

        Ok(Self { symbol, rows })
    }

    /// Number of rows
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    /// Whether the frame has no rows
    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Most recent row
    pub fn latest(&self) -> Option<&IndicatorRow> {
        self.rows.last()
    }

    /// Rows newest first, the order the dashboard displays them
    pub fn newest_first(&self) -> impl Iterator<Item = &IndicatorRow> {
        self.rows.iter().rev()
    }

    /// Close `rows_back` rows before the latest one
    ///
    /// Falls back to the latest close when the frame is too short.
    pub fn close_back(&self, rows_back: usize) -> Option<f64> {
        self.newest_first()
            .nth(rows_back)
            .or_else(|| self.latest())
            .map(|row| row.close)
    }
}
