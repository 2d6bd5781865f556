//! Technical indicators and their dashboard classification

pub mod adx;
pub mod frame;
pub mod signals;
pub mod smoothing;

pub use adx::{AdxOutput, AverageDirectionalIndex};
pub use frame::{IndicatorFrame, IndicatorRow};
pub use signals::{RETURN_HORIZONS, Signal, Snapshot, TrailingReturn, round2};
pub use smoothing::{SmaSeededEma, WilderAtr, WilderRsi};
