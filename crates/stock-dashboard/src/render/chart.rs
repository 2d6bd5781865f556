//! Serializable chart descriptions
//!
//! Pages describe what to plot; drawing is left to whatever frontend reads
//! the JSON.

use crate::error::Result;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Line style
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LineDash {
    Solid,
    Dash,
}

/// Placement of bars sharing an x value
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum BarMode {
    Group,
}

/// One data series of a chart
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Trace {
    Candlestick {
        name: String,
        x: Vec<String>,
        open: Vec<f64>,
        high: Vec<f64>,
        low: Vec<f64>,
        close: Vec<f64>,
    },
    Line {
        name: String,
        x: Vec<String>,
        /// `None` leaves a gap, e.g. during an indicator's warm-up
        y: Vec<Option<f64>>,
        color: String,
        dash: LineDash,
    },
    Bar {
        name: String,
        x: Vec<String>,
        y: Vec<f64>,
        color: String,
    },
}

impl Trace {
    pub fn name(&self) -> &str {
        match self {
            Trace::Candlestick { name, .. } | Trace::Line { name, .. } | Trace::Bar { name, .. } => {
                name
            }
        }
    }

    /// Number of points
    pub fn len(&self) -> usize {
        match self {
            Trace::Candlestick { x, .. } | Trace::Line { x, .. } | Trace::Bar { x, .. } => x.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// A complete chart
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChartSpec {
    pub title: String,
    pub x_axis_title: String,
    pub y_axis_title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub template: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bar_mode: Option<BarMode>,
    pub range_slider: bool,
    pub traces: Vec<Trace>,
}

impl ChartSpec {
    /// Chart with `Date` / `Price` axes and no traces
    pub fn price_chart(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            x_axis_title: "Date".to_string(),
            y_axis_title: "Price".to_string(),
            template: None,
            bar_mode: None,
            range_slider: false,
            traces: Vec::new(),
        }
    }

    pub fn with_trace(mut self, trace: Trace) -> Self {
        self.traces.push(trace);
        self
    }

    pub fn with_template(mut self, template: impl Into<String>) -> Self {
        self.template = Some(template.into());
        self
    }

    pub fn with_bar_mode(mut self, mode: BarMode) -> Self {
        self.bar_mode = Some(mode);
        self
    }

    pub fn with_range_slider(mut self) -> Self {
        self.range_slider = true;
        self
    }

    /// One-line description for the terminal
    pub fn summary(&self) -> String {
        let traces: Vec<String> = self
            .traces
            .iter()
            .map(|t| format!("{} ({} pts)", t.name(), t.len()))
            .collect();
        format!("{}: {}", self.title, traces.join(", "))
    }
}

/// A chart with the file stem it is saved under
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct NamedChart {
    pub name: String,
    pub chart: ChartSpec,
}

impl NamedChart {
    pub fn new(name: impl Into<String>, chart: ChartSpec) -> Self {
        Self {
            name: name.into(),
            chart,
        }
    }

    /// Write the chart as pretty JSON to `<dir>/<name>.json`
    pub fn write_json(&self, dir: &Path) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", self.name));
        std::fs::write(&path, serde_json::to_string_pretty(&self.chart)?)?;
        tracing::debug!(path = %path.display(), "wrote chart");
        Ok(path)
    }
}
