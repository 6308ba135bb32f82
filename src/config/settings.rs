//! Configuration settings and validation.

use crate::{Error, Result};
use std::path::PathBuf;
use std::time::Duration;

/// Default tick interval, roughly one frame at 60 fps.
pub const DEFAULT_TICK_INTERVAL: Duration = Duration::from_millis(16);

/// Longest tick interval accepted by [`Config::validate`].
pub const MAX_TICK_INTERVAL: Duration = Duration::from_secs(10);

/// Main configuration for a dirmon session.
#[derive(Debug, Clone)]
pub struct Config {
    /// Directories to watch recursively at startup.
    pub watch_dirs: Vec<PathBuf>,

    /// Interval between `drain_once` calls in the host loop.
    pub tick_interval: Duration,

    /// Log level (trace, debug, info, warn, error).
    pub log_level: String,

    /// Emit logs as JSON.
    pub log_json: bool,

    /// Relay access notifications (reported as `unknown`).
    pub include_access: bool,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            watch_dirs: Vec::new(),
            tick_interval: DEFAULT_TICK_INTERVAL,
            log_level: "info".to_string(),
            log_json: false,
            include_access: false,
        }
    }
}

impl Config {
    /// Create a new configuration with defaults.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate configuration values.
    ///
    /// Watch directories are not checked here; each one is validated when
    /// it is registered.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration value is invalid.
    pub fn validate(&self) -> Result<()> {
        if self.tick_interval.is_zero() {
            return Err(Error::config("tick interval cannot be 0"));
        }

        if self.tick_interval > MAX_TICK_INTERVAL {
            return Err(Error::config(format!(
                "tick interval cannot exceed {}s",
                MAX_TICK_INTERVAL.as_secs()
            )));
        }

        let valid_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_levels.contains(&self.log_level.to_lowercase().as_str()) {
            return Err(Error::config(format!(
                "invalid log level '{}', must be one of: {}",
                self.log_level,
                valid_levels.join(", ")
            )));
        }

        if self.watch_dirs.iter().any(|d| d.as_os_str().is_empty()) {
            return Err(Error::config("watch directory cannot be empty"));
        }

        Ok(())
    }
}
