//! Configuration management for dirmon.
//!
//! Supports configuration from:
//! - Command-line arguments (highest priority)
//! - Environment variables (`DIRMON_*`)
//! - Built-in defaults

mod settings;

pub use settings::{Config, DEFAULT_TICK_INTERVAL, MAX_TICK_INTERVAL};
