//! Structured logging configuration.
//!
//! Sets up the `tracing` subscriber with a plain or JSON formatter. Thread
//! ids and names are always included because capture runs on the OS
//! watcher's threads while dispatch runs on the tick thread.

use tracing_subscriber::{
    filter::EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt, Registry,
};

/// Tracing configuration options.
#[derive(Debug, Clone)]
pub struct TracingConfig {
    /// Log level (trace, debug, info, warn, error)
    pub level: String,
    /// Enable JSON output format
    pub json: bool,
}

impl Default for TracingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
        }
    }
}

impl From<&crate::Config> for TracingConfig {
    fn from(config: &crate::Config) -> Self {
        Self {
            level: config.log_level.clone(),
            json: config.log_json,
        }
    }
}

/// Initialize tracing with the given configuration.
///
/// `RUST_LOG` takes precedence over `config.level` when set. Logs go to
/// stderr so that stdout stays reserved for dispatched events.
///
/// # Panics
///
/// Panics if tracing subscriber has already been initialized in this process.
pub fn init_tracing(config: &TracingConfig) {
    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(&config.level));

    if config.json {
        let json_layer = fmt::layer()
            .json()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(json_layer).init();
    } else {
        let fmt_layer = fmt::layer()
            .with_writer(std::io::stderr)
            .with_target(true)
            .with_thread_ids(true)
            .with_thread_names(true)
            .with_file(true)
            .with_line_number(true);

        Registry::default().with(env_filter).with(fmt_layer).init();
    }

    tracing::debug!(
        "Tracing initialized: level={}, json={}",
        config.level,
        config.json
    );
}

/// Span helpers for the two execution contexts.
pub mod spans {
    use tracing::{debug_span, Span};

    /// Span for one capture invocation on the notification thread.
    #[must_use]
    pub fn capture_span(watch_id: u32) -> Span {
        debug_span!("capture", watch_id)
    }

    /// Span for one tick of the drain loop.
    #[must_use]
    pub fn tick_span(tick: u64) -> Span {
        debug_span!("tick", tick)
    }
}
