//! dirmon
//!
//! Relays recursive directory change notifications from the OS watcher's
//! threads to a consumer that polls once per frame.

#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod config;
pub mod error;
pub mod monitor;
pub mod telemetry;

pub use config::Config;
pub use error::{Error, Result};
pub use monitor::{
    Action, DirectoryMonitor, DispatchedEvent, Event, EventSink, JsonLinesSink, WatchHandle,
};
