//! Change events and their capture from raw OS notifications.
//!
//! Capture runs on whatever thread the OS watcher uses for its callback.
//! It only reads the raw notification and builds owned [`Event`] values, so
//! concurrent invocations never share state beyond the handoff slot.

use std::fmt;
use std::path::Path;

use notify::event::{ModifyKind, RenameMode};
use notify::EventKind;
use serde::Serialize;

use super::registry::WatchHandle;

/// Kind of change reported for a path.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Action {
    /// Path was created (or moved into the tree).
    Create,
    /// Path was removed (or moved out of the tree).
    Delete,
    /// Contents or metadata changed.
    Modify,
    /// Path was renamed within the tree.
    Move,
    /// Anything the OS reported that fits none of the above.
    Unknown,
}

impl Action {
    /// Map a raw OS notification kind to an action.
    ///
    /// Total over every kind; unrecognized kinds become [`Action::Unknown`].
    /// Any rename kind other than an unpaired `From`/`To` maps to
    /// [`Action::Move`]; [`capture`] downgrades it when the notification
    /// does not carry both paths.
    #[must_use]
    pub const fn from_kind(kind: &EventKind) -> Self {
        match kind {
            EventKind::Create(_) => Self::Create,
            EventKind::Remove(_) => Self::Delete,
            EventKind::Modify(ModifyKind::Name(mode)) => match mode {
                RenameMode::From => Self::Delete,
                RenameMode::To => Self::Create,
                _ => Self::Move,
            },
            EventKind::Modify(_) => Self::Modify,
            _ => Self::Unknown,
        }
    }

    /// Lowercase name used in dispatched payloads.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Create => "create",
            Self::Delete => "delete",
            Self::Modify => "modify",
            Self::Move => "move",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single filesystem change under a watched root.
///
/// Immutable once built. `previous_file_path` is only populated for
/// [`Action::Move`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Event {
    #[serde(rename = "watchID")]
    watch_id: WatchHandle,
    action: Action,
    file_path: String,
    previous_file_path: String,
    root_directory: String,
}

impl Event {
    /// Build an event. `previous_file_path` is discarded unless `action` is
    /// [`Action::Move`].
    #[must_use]
    pub fn new(
        watch_id: WatchHandle,
        action: Action,
        file_path: impl Into<String>,
        previous_file_path: impl Into<String>,
        root_directory: impl Into<String>,
    ) -> Self {
        let previous_file_path = if action == Action::Move {
            previous_file_path.into()
        } else {
            String::new()
        };

        Self {
            watch_id,
            action,
            file_path: file_path.into(),
            previous_file_path,
            root_directory: root_directory.into(),
        }
    }

    /// Handle of the watch that produced this event.
    #[must_use]
    pub const fn watch_id(&self) -> WatchHandle {
        self.watch_id
    }

    /// Kind of change.
    #[must_use]
    pub const fn action(&self) -> Action {
        self.action
    }

    /// Full path of the changed entry.
    #[must_use]
    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    /// Path before a move; empty for every other action.
    #[must_use]
    pub fn previous_file_path(&self) -> &str {
        &self.previous_file_path
    }

    /// Root directory of the watch.
    #[must_use]
    pub fn root_directory(&self) -> &str {
        &self.root_directory
    }

    /// `file_path` relative to the watch root, if it lies under it.
    #[must_use]
    pub fn relative_path(&self) -> Option<&Path> {
        Path::new(&self.file_path)
            .strip_prefix(&self.root_directory)
            .ok()
    }
}

/// Turn a raw OS notification into events for `watch_id`.
///
/// A rename carrying both paths produces a single [`Action::Move`] event.
/// A rename reported with one path (FSEvents sends one notification per
/// side) becomes [`Action::Modify`] on that path, since a move without its
/// previous path cannot be represented. A notification without any path,
/// such as a rescan request after a queue overflow, produces one
/// [`Action::Unknown`] event on the root directory. Anything else produces
/// one event per reported path.
#[must_use]
pub fn capture(watch_id: WatchHandle, root_directory: &str, raw: &notify::Event) -> Vec<Event> {
    let action = Action::from_kind(&raw.kind);

    match (action, raw.paths.as_slice()) {
        (_, []) => vec![Event::new(
            watch_id,
            Action::Unknown,
            root_directory,
            String::new(),
            root_directory,
        )],
        (Action::Move, [from, to, ..]) => {
            vec![Event::new(watch_id, action, lossy(to), lossy(from), root_directory)]
        }
        (Action::Move, [path]) => vec![Event::new(
            watch_id,
            Action::Modify,
            lossy(path),
            String::new(),
            root_directory,
        )],
        (_, paths) => paths
            .iter()
            .map(|path| Event::new(watch_id, action, lossy(path), String::new(), root_directory))
            .collect(),
    }
}

fn lossy(path: &Path) -> String {
    path.to_string_lossy().into_owned()
}
