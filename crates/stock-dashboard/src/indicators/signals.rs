//! Pass/fail classification of the latest indicator values

use super::frame::IndicatorFrame;
use serde::Serialize;
use std::fmt;

/// Trailing return horizons in rows back from the latest row
pub const RETURN_HORIZONS: [(usize, &str); 4] = [
    (20, "1 MONTH"),
    (60, "3 MONTHS"),
    (120, "6 MONTHS"),
    (240, "12 MONTHS"),
];

/// Lower and upper RSI bounds of a healthy reading (both exclusive)
pub const RSI_BAND: (f64, f64) = (30.0, 70.0);

/// ADX above this marks a trending market
pub const ADX_TREND_THRESHOLD: f64 = 25.0;

/// Round half away from zero to two decimals
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Pass/fail marker shown next to a metric
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Signal {
    Pass,
    Fail,
}

impl Signal {
    fn from_bool(pass: bool) -> Self {
        if pass { Signal::Pass } else { Signal::Fail }
    }

    /// Marker glyph
    pub fn emoji(&self) -> &'static str {
        match self {
            Signal::Pass => "✅",
            Signal::Fail => "🔴",
        }
    }

    /// Pass iff the rounded return is not negative
    pub fn for_return(percent: Option<f64>) -> Self {
        Self::from_bool(percent.is_some_and(|p| round2(p) >= 0.0))
    }

    /// Pass iff the price sits at or above the moving average
    pub fn for_ema(ltp: f64, ema: Option<f64>) -> Self {
        Self::from_bool(ema.is_some_and(|ema| round2(ltp) >= round2(ema)))
    }

    /// Pass iff RSI is strictly inside the neutral band
    pub fn for_rsi(rsi: Option<f64>) -> Self {
        Self::from_bool(rsi.is_some_and(|rsi| {
            let rsi = round2(rsi);
            RSI_BAND.0 < rsi && rsi < RSI_BAND.1
        }))
    }

    /// Pass iff ADX signals a trend
    pub fn for_adx(adx: Option<f64>) -> Self {
        Self::from_bool(adx.is_some_and(|adx| round2(adx) > ADX_TREND_THRESHOLD))
    }
}

impl fmt::Display for Signal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.emoji())
    }
}

/// Percentage change from the close `rows_back` rows ago to the latest close
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct TrailingReturn {
    pub label: &'static str,
    pub rows_back: usize,
    /// `None` when the reference close is zero
    pub percent: Option<f64>,
}

impl TrailingReturn {
    pub fn signal(&self) -> Signal {
        Signal::for_return(self.percent)
    }
}

/// Latest values of every dashboard metric
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Snapshot {
    pub symbol: String,
    pub ltp: f64,
    pub ema_20: Option<f64>,
    pub ema_200: Option<f64>,
    pub rsi: Option<f64>,
    pub adx: Option<f64>,
    pub dmp: Option<f64>,
    pub dmn: Option<f64>,
    pub atr: Option<f64>,
    pub returns: Vec<TrailingReturn>,
}

impl Snapshot {
    /// Read the latest row of `frame`; `None` for an empty frame
    pub fn from_frame(frame: &IndicatorFrame) -> Option<Self> {
        let latest = frame.latest()?;
        let ltp = latest.close;

        let returns = RETURN_HORIZONS
            .iter()
            .map(|&(rows_back, label)| {
                let base = frame.close_back(rows_back).unwrap_or(ltp);
                let percent = (base != 0.0).then(|| (ltp - base) / base * 100.0);
                TrailingReturn {
                    label,
                    rows_back,
                    percent,
                }
            })
            .collect();

        Some(Self {
            symbol: frame.symbol.clone(),
            ltp,
            ema_20: latest.ema_20,
            ema_200: latest.ema_200,
            rsi: latest.rsi_14,
            adx: latest.adx_14,
            dmp: latest.dmp_14,
            dmn: latest.dmn_14,
            atr: latest.atr_14,
            returns,
        })
    }

    pub fn ema_20_signal(&self) -> Signal {
        Signal::for_ema(self.ltp, self.ema_20)
    }

    pub fn ema_200_signal(&self) -> Signal {
        Signal::for_ema(self.ltp, self.ema_200)
    }

    pub fn rsi_signal(&self) -> Signal {
        Signal::for_rsi(self.rsi)
    }

    pub fn adx_signal(&self) -> Signal {
        Signal::for_adx(self.adx)
    }
}
