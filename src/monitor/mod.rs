//! Cross-thread relay of directory change notifications.
//!
//! This module provides:
//! - A registry of recursive watches keyed by handle
//! - Capture of raw OS notifications into [`Event`]s
//! - A latest-wins single-slot handoff between the OS callback threads and
//!   the tick thread
//! - A per-tick drain that delivers at most one event to an [`EventSink`]
//!
//! Delivery is lossy by construction: events published faster than the
//! host drains them overwrite each other and only the latest survives.

mod dispatch;
mod events;
mod registry;
mod session;
mod slot;

pub use dispatch::{
    DispatchState, DispatchedEvent, Dispatcher, EventSink, JsonLinesSink, EVENT_NAME,
};
pub use events::{capture, Action, Event};
pub use registry::{capture_handler, WatchEntry, WatchHandle, WatchRegistry};
pub use session::DirectoryMonitor;
pub use slot::HandoffSlot;
