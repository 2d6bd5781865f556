//! Shared utilities for stock-dashboard
//!
//! This crate provides common functionality used across the workspace:
//! tracing setup and loading of JSON configuration files.

pub mod config;
pub mod logging;

pub use config::{ConfigFileError, load_json_config};
pub use logging::{LogFormat, init_tracing};
