//! dirmon - directory change relay
//!
//! Watches directories and prints one JSON line per dispatched event,
//! draining the relay on a fixed tick the way a frame loop would.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

use std::path::PathBuf;
use std::time::Duration;

use clap::Parser;
use dirmon::telemetry::{init_metrics, init_tracing, render_metrics, spans, TracingConfig};
use dirmon::{Config, DirectoryMonitor, EventSink, JsonLinesSink, Result};
use tokio::signal;
use tokio::time::MissedTickBehavior;

/// dirmon - relay directory changes to stdout as JSON lines
#[derive(Parser, Debug)]
#[command(name = "dirmon")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Directories to watch recursively
    #[arg(required = true, env = "DIRMON_WATCH_DIRS", value_delimiter = ',')]
    watch: Vec<PathBuf>,

    /// Milliseconds between drains
    #[arg(long, env = "DIRMON_TICK_MS", default_value = "16")]
    tick_ms: u64,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, env = "DIRMON_LOG_LEVEL", default_value = "info")]
    log_level: String,

    /// Enable JSON logging output
    #[arg(long, env = "DIRMON_LOG_JSON")]
    log_json: bool,

    /// Relay access notifications as `unknown` events
    #[arg(long, env = "DIRMON_INCLUDE_ACCESS")]
    include_access: bool,

    /// Print Prometheus metrics to stderr on exit
    #[arg(long)]
    metrics: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let config = Config {
        watch_dirs: cli.watch,
        tick_interval: Duration::from_millis(cli.tick_ms),
        log_level: cli.log_level,
        log_json: cli.log_json,
        include_access: cli.include_access,
    };

    init_tracing(&TracingConfig::from(&config));

    tracing::info!("dirmon v{} starting...", env!("CARGO_PKG_VERSION"));
    tracing::debug!(?config, "Configuration loaded");
    config.validate()?;

    init_metrics();

    let sink = JsonLinesSink::new(std::io::stdout());
    let mut monitor = DirectoryMonitor::from_config(&config, sink)?;

    run(&mut monitor, config.tick_interval).await;

    let (flushed, _) = monitor.shutdown();
    if flushed?.is_some() {
        tracing::debug!("Flushed final event on shutdown");
    }

    if cli.metrics {
        eprint!("{}", render_metrics()?);
    }

    tracing::info!("dirmon stopped");
    Ok(())
}

/// Drain once per tick until a shutdown signal arrives.
async fn run<S: EventSink>(monitor: &mut DirectoryMonitor<S>, tick: Duration) {
    let mut ticker = tokio::time::interval(tick);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut ticks: u64 = 0;
    loop {
        tokio::select! {
            () = &mut shutdown => break,
            _ = ticker.tick() => {
                ticks += 1;
                let _span = spans::tick_span(ticks).entered();
                if let Err(e) = monitor.drain_once() {
                    tracing::warn!("Drain failed: {}", e);
                }
            }
        }
    }
}

/// Wait for shutdown signal (SIGTERM or Ctrl+C).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, shutting down");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, shutting down");
        }
    }
}
