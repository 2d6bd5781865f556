//! Terminal tables and chart descriptions

pub mod chart;
pub mod table;

pub use chart::{BarMode, ChartSpec, LineDash, NamedChart, Trace};
pub use table::{build_table, fmt_opt, preview_rows};
