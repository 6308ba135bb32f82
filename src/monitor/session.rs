//! A watch session: registry, handoff slot and dispatcher with one owner.

use std::fmt;
use std::path::Path;
use std::sync::Arc;

use super::dispatch::{DispatchState, DispatchedEvent, Dispatcher, EventSink};
use super::registry::{WatchEntry, WatchHandle, WatchRegistry};
use super::slot::HandoffSlot;
use crate::{Config, Result};

/// Owns every piece of one relay. Independent monitors share nothing.
pub struct DirectoryMonitor<S> {
    registry: WatchRegistry,
    dispatcher: Dispatcher<S>,
}

impl<S> fmt::Debug for DirectoryMonitor<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DirectoryMonitor")
            .field("registry", &self.registry)
            .field("dispatcher", &self.dispatcher)
            .finish()
    }
}

impl<S: EventSink> DirectoryMonitor<S> {
    /// Create a monitor with no active watches.
    pub fn new(sink: S) -> Self {
        Self::with_options(sink, false)
    }

    /// Create a monitor and register every directory in `config.watch_dirs`.
    ///
    /// # Errors
    ///
    /// Returns an error if the config is invalid or any directory cannot be
    /// watched. Watches registered before the failure are released.
    pub fn from_config(config: &Config, sink: S) -> Result<Self> {
        config.validate()?;

        let mut monitor = Self::with_options(sink, config.include_access);
        for dir in &config.watch_dirs {
            monitor.watch(dir)?;
        }
        Ok(monitor)
    }

    fn with_options(sink: S, include_access: bool) -> Self {
        let slot = Arc::new(HandoffSlot::new());
        Self {
            registry: WatchRegistry::new(Arc::clone(&slot), include_access),
            dispatcher: Dispatcher::new(slot, sink),
        }
    }

    /// Start a recursive watch. See [`WatchRegistry::watch`].
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` or `WatchSetupFailed`.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<WatchHandle> {
        self.registry.watch(path)
    }

    /// Cancel a watch. An event already pending for it may still be
    /// drained once.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an unknown or already removed handle.
    pub fn unwatch(&mut self, handle: WatchHandle) -> Result<()> {
        self.registry.unwatch(handle)
    }

    /// Drain at most one pending event into the sink. Call once per tick.
    ///
    /// # Errors
    ///
    /// Returns `SinkDeliveryFailed` if the sink fails.
    pub fn drain_once(&mut self) -> Result<Option<DispatchedEvent>> {
        self.dispatcher.drain_once()
    }

    /// Whether `handle` refers to an active watch.
    #[must_use]
    pub fn is_watching(&self, handle: WatchHandle) -> bool {
        self.registry.contains(handle)
    }

    /// Active watches, ordered by handle.
    #[must_use]
    pub fn watches(&self) -> Vec<&WatchEntry> {
        self.registry.entries()
    }

    /// Current dispatch state.
    #[must_use]
    pub const fn state(&self) -> DispatchState {
        self.dispatcher.state()
    }

    /// Borrow the sink.
    pub const fn sink(&self) -> &S {
        self.dispatcher.sink()
    }

    /// Stop all OS watchers, flush at most one pending event, then release
    /// the slot.
    ///
    /// The sink is handed back whatever the outcome of the final delivery,
    /// so a host can still flush or close it. Watchers are stopped before
    /// the flush in both cases.
    #[must_use]
    pub fn shutdown(mut self) -> (Result<Option<DispatchedEvent>>, S) {
        let stopped = self.registry.clear();
        tracing::info!(watches = stopped, "Directory monitor shutting down");

        let flushed = self.dispatcher.drain_once();
        let Self {
            registry,
            dispatcher,
        } = self;
        drop(registry);

        (flushed, dispatcher.into_sink())
    }
}
