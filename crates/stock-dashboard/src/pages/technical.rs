//! Technical analysis page

use super::{Dashboard, normalize_symbol};
use crate::api::Timeframe;
use crate::cache::CacheKey;
use crate::error::{DashboardError, Result};
use crate::indicators::{IndicatorFrame, Signal, Snapshot};
use crate::render::{ChartSpec, LineDash, NamedChart, Trace, build_table, fmt_opt};
use std::fmt;

/// Symbol shown when the page opens
pub const DEFAULT_TECHNICAL_SYMBOL: &str = "AAPL";

/// Inputs of the technical analysis page
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TechnicalRequest {
    pub symbol: String,
    pub timeframe: Timeframe,
    /// Render the full indicator table
    pub show_data: bool,
    /// Produce the candlestick chart
    pub show_chart: bool,
}

impl Default for TechnicalRequest {
    fn default() -> Self {
        Self::new(DEFAULT_TECHNICAL_SYMBOL)
    }
}

impl TechnicalRequest {
    pub fn new(symbol: impl Into<String>) -> Self {
        Self {
            symbol: symbol.into(),
            timeframe: Timeframe::default(),
            show_data: false,
            show_chart: false,
        }
    }

    pub fn timeframe(mut self, timeframe: Timeframe) -> Self {
        self.timeframe = timeframe;
        self
    }

    pub fn show_data(mut self, show: bool) -> Self {
        self.show_data = show;
        self
    }

    pub fn show_chart(mut self, show: bool) -> Self {
        self.show_chart = show;
        self
    }
}

/// Output of the technical analysis page
#[derive(Debug, Clone)]
pub struct TechnicalReport {
    pub timeframe: Timeframe,
    pub snapshot: Snapshot,
    pub frame: IndicatorFrame,
    pub show_data: bool,
    pub chart: Option<NamedChart>,
}

impl TechnicalReport {
    fn returns_panel(&self) -> String {
        self.snapshot
            .returns
            .iter()
            .map(|ret| match ret.percent {
                Some(p) => format!("- {} : {p:.2}% {}", ret.label, ret.signal()),
                None => format!("- {} : N/A {}", ret.label, ret.signal()),
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    fn momentum_panel(&self) -> String {
        let s = &self.snapshot;
        [
            format!("- LTP : {:.2}", s.ltp),
            metric_line("EMA20", s.ema_20, s.ema_20_signal()),
            metric_line("EMA200", s.ema_200, s.ema_200_signal()),
            metric_line("RSI", s.rsi, s.rsi_signal()),
        ]
        .join("\n")
    }

    fn trend_panel(&self) -> String {
        let s = &self.snapshot;
        [
            metric_line("ADX", s.adx, s.adx_signal()),
            format!("- DMP : {}", fmt_opt(s.dmp)),
            format!("- DMN : {}", fmt_opt(s.dmn)),
        ]
        .join("\n")
    }

    /// Full indicator table, newest row first
    pub fn data_table(&self) -> comfy_table::Table {
        let rows = self.frame.newest_first().map(|row| {
            vec![
                row.time.format("%Y-%m-%d").to_string(),
                format!("{:.2}", row.open),
                format!("{:.2}", row.high),
                format!("{:.2}", row.low),
                format!("{:.2}", row.close),
                row.volume.to_string(),
                fmt_opt(row.ema_20),
                fmt_opt(row.ema_200),
                fmt_opt(row.rsi_14),
                fmt_opt(row.adx_14),
                fmt_opt(row.dmp_14),
                fmt_opt(row.dmn_14),
                fmt_opt(row.atr_14),
            ]
        });

        build_table(
            [
                "time", "open", "high", "low", "close", "volume", "EMA_20", "EMA_200", "RSI_14",
                "ADX_14", "DMP_14", "DMN_14", "ATR_14",
            ],
            rows,
        )
    }
}

fn metric_line(name: &str, value: Option<f64>, signal: Signal) -> String {
    format!("- {name} : {} {signal}", fmt_opt(value))
}

impl fmt::Display for TechnicalReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(
            f,
            "Stock Technical Analysis Dashboard: {} ({})",
            self.snapshot.symbol, self.timeframe
        )?;

        let panels = build_table(
            ["Returns", "Momentum", "Trend Strength"],
            [vec![self.returns_panel(), self.momentum_panel(), self.trend_panel()]],
        );
        write!(f, "{panels}")?;

        if self.show_data {
            write!(f, "\n{}", self.data_table())?;
        }
        if let Some(chart) = &self.chart {
            write!(f, "\nChart: {}", chart.chart.summary())?;
        }
        Ok(())
    }
}

/// Candlestick chart of `frame` with the EMA overlays
pub fn candlestick_chart(frame: &IndicatorFrame) -> ChartSpec {
    let x: Vec<String> = frame
        .rows
        .iter()
        .map(|row| row.time.format("%Y-%m-%d").to_string())
        .collect();
    let column = |pick: fn(&crate::indicators::IndicatorRow) -> f64| -> Vec<f64> {
        frame.rows.iter().map(pick).collect()
    };
    let overlay = |name: &str, color: &str, values: Vec<Option<f64>>| Trace::Line {
        name: name.to_string(),
        x: x.clone(),
        y: values,
        color: color.to_string(),
        dash: LineDash::Solid,
    };

    let ema_20 = overlay("EMA 20", "blue", frame.rows.iter().map(|r| r.ema_20).collect());
    let ema_200 = overlay("EMA 200", "red", frame.rows.iter().map(|r| r.ema_200).collect());

    ChartSpec::price_chart(format!("{} Historical Candlestick Chart", frame.symbol))
        .with_range_slider()
        .with_trace(Trace::Candlestick {
            name: "Candlestick".to_string(),
            x,
            open: column(|r| r.open),
            high: column(|r| r.high),
            low: column(|r| r.low),
            close: column(|r| r.close),
        })
        .with_trace(ema_20)
        .with_trace(ema_200)
}

impl Dashboard {
    /// Indicator snapshot of one symbol over a lookback window
    pub async fn technical(&self, request: &TechnicalRequest) -> Result<TechnicalReport> {
        let symbol = normalize_symbol(&request.symbol)?;
        let timeframe = request.timeframe;

        let key = CacheKey::new(&symbol, "history", timeframe.as_str());
        let fetch = async { self.quotes.history_range(&symbol, timeframe).await };
        let quotes = self.history(key, &symbol, fetch).await?;

        let frame = IndicatorFrame::compute(&symbol, &quotes)?;
        let snapshot = Snapshot::from_frame(&frame).ok_or_else(|| DashboardError::NoData {
            symbol: symbol.clone(),
        })?;
        let chart = request
            .show_chart
            .then(|| NamedChart::new(format!("{symbol}_candlestick"), candlestick_chart(&frame)));

        tracing::info!(
            symbol = %symbol,
            timeframe = %timeframe,
            rows = frame.len(),
            "technical analysis computed"
        );

        Ok(TechnicalReport {
            timeframe,
            snapshot,
            frame,
            show_data: request.show_data,
            chart,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::news::MockNewsSource;
    use crate::api::yahoo::MockQuoteSource;
    use crate::config::DashboardConfig;
    use crate::indicators::frame::tests::trending_quotes;
    use crate::pages::tests::dashboard;

    fn quote_source(rows: usize) -> MockQuoteSource {
        let mut quotes = MockQuoteSource::new();
        quotes
            .expect_history_range()
            .withf(|symbol, timeframe| symbol == "AAPL" && *timeframe == Timeframe::OneYear)
            .times(1)
            .returning(move |_, _| Ok(trending_quotes(rows, 100.0, 1.0)));
        quotes
    }

    #[test]
    fn test_request_defaults() {
        let request = TechnicalRequest::default();
        assert_eq!(request.symbol, "AAPL");
        assert_eq!(request.timeframe, Timeframe::OneYear);
        assert!(!request.show_data);
        assert!(!request.show_chart);
    }

    #[tokio::test]
    async fn test_technical_report() {
        let dashboard = dashboard(DashboardConfig::default(), quote_source(250), MockNewsSource::new());
        let request = TechnicalRequest::new("aapl").show_data(true).show_chart(true);

        let report = dashboard.technical(&request).await.unwrap();
        assert_eq!(report.snapshot.symbol, "AAPL");
        assert_eq!(report.snapshot.ltp, 349.0);

        let rendered = report.to_string();
        assert!(rendered.contains("Stock Technical Analysis Dashboard: AAPL (1y)"));
        assert!(rendered.contains("- 1 MONTH : 6.08% ✅"));
        assert!(rendered.contains("- 12 MONTHS : 220.18% ✅"));
        assert!(rendered.contains("- LTP : 349.00"));
        // Steady climb pushes RSI out of the neutral band
        assert!(rendered.contains("- RSI : 100.00 🔴"));
        assert!(rendered.contains("EMA_200"));
        assert!(rendered.contains("Chart: AAPL Historical Candlestick Chart"));

        let chart = report.chart.unwrap();
        assert_eq!(chart.name, "AAPL_candlestick");
        assert!(chart.chart.range_slider);
        assert_eq!(chart.chart.traces.len(), 3);
        let names: Vec<&str> = chart.chart.traces.iter().map(Trace::name).collect();
        assert_eq!(names, vec!["Candlestick", "EMA 20", "EMA 200"]);
        assert!(chart.chart.traces.iter().all(|t| t.len() == 250));
    }

    #[tokio::test]
    async fn test_short_history_prints_na() {
        let dashboard = dashboard(DashboardConfig::default(), quote_source(30), MockNewsSource::new());

        let report = dashboard.technical(&TechnicalRequest::default()).await.unwrap();
        let rendered = report.to_string();

        assert!(rendered.contains("- EMA200 : N/A 🔴"));
        assert_eq!(report.snapshot.adx_signal(), Signal::Pass);
        // 129 vs 109
        assert!(rendered.contains("- 1 MONTH : 18.35% ✅"));
        assert!(rendered.contains("- 3 MONTHS : 0.00% ✅"));
        assert!(!rendered.contains("EMA_200"));
        assert!(report.chart.is_none());
    }

    #[tokio::test]
    async fn test_one_day_asks_for_latest_session() {
        let mut quotes = MockQuoteSource::new();
        quotes.expect_history().never();
        quotes
            .expect_history_range()
            .withf(|symbol, timeframe| symbol == "SPY" && *timeframe == Timeframe::OneDay)
            .times(1)
            .returning(|_, _| Ok(trending_quotes(1, 540.0, 1.0)));
        let dashboard = dashboard(DashboardConfig::default(), quotes, MockNewsSource::new());

        let request = TechnicalRequest::new("spy").timeframe(Timeframe::OneDay);
        let report = dashboard.technical(&request).await.unwrap();

        assert_eq!(report.frame.len(), 1);
        assert!(report.to_string().contains("- LTP : 540.00"));
    }

    #[tokio::test]
    async fn test_empty_history() {
        let mut quotes = MockQuoteSource::new();
        quotes.expect_history_range().returning(|_, _| Ok(Vec::new()));
        let dashboard = dashboard(DashboardConfig::default(), quotes, MockNewsSource::new());

        let err = dashboard
            .technical(&TechnicalRequest::new("ZZZZ"))
            .await
            .unwrap_err();
        assert_eq!(err.to_string(), "No data found for stock symbol: ZZZZ");
    }

    #[tokio::test]
    async fn test_missing_symbol() {
        let dashboard = dashboard(
            DashboardConfig::default(),
            MockQuoteSource::new(),
            MockNewsSource::new(),
        );
        let err = dashboard
            .technical(&TechnicalRequest::new(" "))
            .await
            .unwrap_err();
        assert!(matches!(err, DashboardError::MissingSymbol));
    }
}
