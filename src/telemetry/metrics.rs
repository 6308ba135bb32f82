//! Prometheus metrics definitions.

use once_cell::sync::Lazy;
use prometheus::{
    register_int_counter, register_int_gauge, Encoder, IntCounter, IntGauge, TextEncoder,
};

/// Events produced by capture and published to a handoff slot.
pub static EVENTS_CAPTURED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dirmon_events_captured_total",
        "Total number of events published by capture"
    )
    .unwrap()
});

/// Pending events replaced before they were drained.
pub static EVENTS_OVERWRITTEN: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dirmon_events_overwritten_total",
        "Total number of pending events overwritten by a newer event"
    )
    .unwrap()
});

/// Events handed to a sink successfully.
pub static EVENTS_DISPATCHED: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dirmon_events_dispatched_total",
        "Total number of events delivered to a sink"
    )
    .unwrap()
});

/// Sink calls that returned an error.
pub static SINK_FAILURES: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dirmon_sink_failures_total",
        "Total number of failed sink deliveries"
    )
    .unwrap()
});

/// Errors reported by the OS watcher backend.
pub static WATCH_ERRORS: Lazy<IntCounter> = Lazy::new(|| {
    register_int_counter!(
        "dirmon_watch_errors_total",
        "Total number of errors reported by the OS watcher"
    )
    .unwrap()
});

/// Currently registered watches across all sessions.
pub static ACTIVE_WATCHES: Lazy<IntGauge> = Lazy::new(|| {
    register_int_gauge!("dirmon_active_watches", "Number of active watches").unwrap()
});

/// Initialize all metrics (call once at startup).
pub fn init_metrics() {
    let _ = &*EVENTS_CAPTURED;
    let _ = &*EVENTS_OVERWRITTEN;
    let _ = &*EVENTS_DISPATCHED;
    let _ = &*SINK_FAILURES;
    let _ = &*WATCH_ERRORS;
    let _ = &*ACTIVE_WATCHES;

    tracing::debug!("Prometheus metrics initialized");
}

/// Render the default registry in the Prometheus text format.
///
/// # Errors
///
/// Returns an error if encoding fails.
pub fn render_metrics() -> crate::Result<String> {
    let mut buffer = Vec::new();
    TextEncoder::new()
        .encode(&prometheus::gather(), &mut buffer)
        .map_err(|e| crate::Error::Io(std::io::Error::other(e.to_string())))?;
    String::from_utf8(buffer)
        .map_err(|e| crate::Error::Io(std::io::Error::new(std::io::ErrorKind::InvalidData, e)))
}
