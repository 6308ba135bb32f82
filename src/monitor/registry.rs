//! Watch registry: maps handles to live recursive OS subscriptions.

use std::collections::HashMap;
use std::fmt;
use std::io::ErrorKind;
use std::path::Path;
use std::sync::Arc;

use notify::{RecommendedWatcher, RecursiveMode, Watcher};
use serde::Serialize;

use super::events::capture;
use super::slot::HandoffSlot;
use crate::telemetry::{metrics, spans};
use crate::{Error, Result};

/// Opaque identifier of an active watch.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(transparent)]
pub struct WatchHandle(u32);

impl WatchHandle {
    /// Wrap a raw handle value, e.g. one received back from a host runtime.
    #[must_use]
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    /// Raw handle value.
    #[must_use]
    pub const fn id(self) -> u32 {
        self.0
    }
}

impl From<u32> for WatchHandle {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for WatchHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Bookkeeping for one registered watch. Owns the OS subscription; dropping
/// the entry cancels it.
pub struct WatchEntry {
    handle: WatchHandle,
    root_directory: String,
    watcher: RecommendedWatcher,
}

impl WatchEntry {
    /// Handle returned by `watch`.
    #[must_use]
    pub const fn handle(&self) -> WatchHandle {
        self.handle
    }

    /// Canonical root directory being watched.
    #[must_use]
    pub fn root_directory(&self) -> &str {
        &self.root_directory
    }
}

impl fmt::Debug for WatchEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchEntry")
            .field("handle", &self.handle)
            .field("root_directory", &self.root_directory)
            .finish_non_exhaustive()
    }
}

/// Registry of active watches for one session.
///
/// Mutated only through `&mut self`, so `watch` and `unwatch` are
/// serialized by the borrow checker. The only state shared with the OS
/// callback threads is the handoff slot.
pub struct WatchRegistry {
    slot: Arc<HandoffSlot>,
    include_access: bool,
    next_id: u32,
    entries: HashMap<WatchHandle, WatchEntry>,
}

impl WatchRegistry {
    /// Create an empty registry publishing into `slot`.
    #[must_use]
    pub fn new(slot: Arc<HandoffSlot>, include_access: bool) -> Self {
        Self {
            slot,
            include_access,
            next_id: 1,
            entries: HashMap::new(),
        }
    }

    /// Start a recursive watch on `path` and return its handle.
    ///
    /// The path is canonicalized and must name an existing directory.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` for an empty path and `WatchSetupFailed`
    /// when the path is missing, not a directory, or refused by the OS.
    pub fn watch(&mut self, path: impl AsRef<Path>) -> Result<WatchHandle> {
        let path = path.as_ref();
        if path.as_os_str().is_empty() {
            return Err(Error::invalid_argument("watch path cannot be empty"));
        }

        let display = path.display().to_string();
        let root = path.canonicalize().map_err(|e| match e.kind() {
            ErrorKind::NotFound => Error::watch_setup(&display, "directory does not exist"),
            _ => Error::watch_setup(&display, e),
        })?;
        if !root.is_dir() {
            return Err(Error::watch_setup(display, "not a directory"));
        }

        let handle = WatchHandle(self.next_id);
        let next_id = self
            .next_id
            .checked_add(1)
            .ok_or_else(|| Error::watch_setup(&display, "watch handles exhausted"))?;

        let root_directory = root.to_string_lossy().into_owned();
        let handler = capture_handler(
            handle,
            root_directory.clone(),
            Arc::clone(&self.slot),
            self.include_access,
        );
        let mut watcher =
            notify::recommended_watcher(handler).map_err(|e| Error::watch_setup(&display, e))?;
        watcher
            .watch(&root, RecursiveMode::Recursive)
            .map_err(|e| Error::watch_setup(&display, e))?;

        self.next_id = next_id;
        self.entries.insert(
            handle,
            WatchEntry {
                handle,
                root_directory,
                watcher,
            },
        );
        metrics::ACTIVE_WATCHES.inc();
        tracing::info!(%handle, path = %root.display(), "Watching directory");

        Ok(handle)
    }

    /// Cancel the watch for `handle`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidArgument` if the handle was never issued or has
    /// already been unwatched. Nothing changes in that case.
    pub fn unwatch(&mut self, handle: WatchHandle) -> Result<()> {
        let entry = self
            .entries
            .remove(&handle)
            .ok_or_else(|| Error::invalid_argument(format!("unknown watch handle {handle}")))?;

        close(entry);
        tracing::info!(%handle, "Stopped watching directory");
        Ok(())
    }

    /// Cancel every watch. Returns how many were active.
    pub fn clear(&mut self) -> usize {
        let count = self.entries.len();
        for (_, entry) in self.entries.drain() {
            close(entry);
        }
        count
    }

    /// Whether `handle` refers to an active watch.
    #[must_use]
    pub fn contains(&self, handle: WatchHandle) -> bool {
        self.entries.contains_key(&handle)
    }

    /// Look up an active watch.
    #[must_use]
    pub fn get(&self, handle: WatchHandle) -> Option<&WatchEntry> {
        self.entries.get(&handle)
    }

    /// Active watches, ordered by handle.
    #[must_use]
    pub fn entries(&self) -> Vec<&WatchEntry> {
        let mut entries: Vec<_> = self.entries.values().collect();
        entries.sort_by_key(|e| e.handle);
        entries
    }

    /// Number of active watches.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether no watch is active.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Drop for WatchRegistry {
    fn drop(&mut self) {
        self.clear();
    }
}

impl fmt::Debug for WatchRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("WatchRegistry")
            .field("next_id", &self.next_id)
            .field("entries", &self.entries())
            .finish_non_exhaustive()
    }
}

fn close(mut entry: WatchEntry) {
    if let Err(e) = entry.watcher.unwatch(Path::new(&entry.root_directory)) {
        // The watcher is dropped below regardless, which releases the subscription.
        tracing::debug!(handle = %entry.handle, "Unwatch reported: {}", e);
    }
    drop(entry);
    metrics::ACTIVE_WATCHES.dec();
}

/// Build the callback the OS watcher invokes for `handle`.
///
/// Access notifications are skipped unless `include_access` is set. Backend
/// errors are logged and counted, never published.
pub fn capture_handler(
    handle: WatchHandle,
    root_directory: String,
    slot: Arc<HandoffSlot>,
    include_access: bool,
) -> impl FnMut(notify::Result<notify::Event>) + Send + 'static {
    move |result: notify::Result<notify::Event>| match result {
        Ok(raw) => {
            if raw.kind.is_access() && !include_access {
                return;
            }

            let _span = spans::capture_span(handle.id()).entered();
            for event in capture(handle, &root_directory, &raw) {
                tracing::debug!(
                    action = %event.action(),
                    path = event.file_path(),
                    "Captured event"
                );
                slot.publish(event);
            }
        }
        Err(e) => {
            metrics::WATCH_ERRORS.inc();
            tracing::error!(%handle, "Watch error: {:?}", e);
        }
    }
}
