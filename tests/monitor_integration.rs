//! Integration tests driving real directories through the relay.
//!
//! OS notification latency is unbounded, so every test polls `drain_once`
//! with a deadline instead of expecting an event on the first tick.

use std::fs;
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};

use dirmon::{Action, Config, DirectoryMonitor, DispatchedEvent, Event, EventSink, Result};
use tempfile::TempDir;

const DEADLINE: Duration = Duration::from_secs(5);
const TICK: Duration = Duration::from_millis(10);

fn discard(_: &DispatchedEvent) -> Result<()> {
    Ok(())
}

/// Drain until an event satisfies `pred` or the deadline passes.
fn drain_until<S: EventSink>(
    monitor: &mut DirectoryMonitor<S>,
    pred: impl Fn(&Event) -> bool,
) -> Option<Event> {
    let start = Instant::now();
    while start.elapsed() < DEADLINE {
        if let Some(dispatched) = monitor.drain_once().unwrap() {
            if pred(dispatched.event()) {
                return Some(dispatched.into_event());
            }
        }
        thread::sleep(TICK);
    }
    None
}

/// Drain until nothing has arrived for a while.
fn settle<S: EventSink>(monitor: &mut DirectoryMonitor<S>) {
    let mut quiet = 0;
    while quiet < 20 {
        if monitor.drain_once().unwrap().is_some() {
            quiet = 0;
        } else {
            quiet += 1;
        }
        thread::sleep(TICK);
    }
}

fn canonical(path: &Path) -> String {
    path.canonicalize().unwrap().to_string_lossy().into_owned()
}

/// Creating a file is relayed as a create with the watch root and full path.
///
/// inotify reports the create and then the close. The close is an access
/// notification and is filtered, so the create is what stays pending.
#[cfg(target_os = "linux")]
#[test]
fn test_create_file_is_dispatched() {
    let tmp = TempDir::new().unwrap();
    let root = canonical(tmp.path());
    let mut monitor = DirectoryMonitor::new(discard);
    let handle = monitor.watch(tmp.path()).unwrap();

    fs::File::create(tmp.path().join("a.txt")).unwrap();
    let expected = format!("{root}/a.txt");

    let event = drain_until(&mut monitor, |e| e.file_path() == expected)
        .expect("no event for created file");
    assert_eq!(event.watch_id(), handle);
    assert_eq!(event.action(), Action::Create);
    assert_eq!(event.root_directory(), root);
    assert_eq!(event.relative_path(), Some(Path::new("a.txt")));

    settle(&mut monitor);
    assert!(monitor.drain_once().unwrap().is_none());
}

/// Watches are recursive: changes in subdirectories are relayed.
#[test]
fn test_nested_changes_are_dispatched() {
    let tmp = TempDir::new().unwrap();
    let nested = tmp.path().join("sub/inner");
    fs::create_dir_all(&nested).unwrap();

    let mut monitor = DirectoryMonitor::new(discard);
    monitor.watch(tmp.path()).unwrap();

    fs::write(nested.join("deep.txt"), "hello").unwrap();
    let expected = format!("{}/deep.txt", canonical(&nested));

    assert!(drain_until(&mut monitor, |e| e.file_path() == expected).is_some());
}

/// Two writes before any drain leave a single pending event.
#[test]
fn test_rapid_modifications_coalesce() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("m.txt");
    fs::write(&file, "0").unwrap();

    let mut monitor = DirectoryMonitor::new(discard);
    monitor.watch(tmp.path()).unwrap();

    fs::write(&file, "first").unwrap();
    fs::write(&file, "second").unwrap();
    thread::sleep(Duration::from_millis(300));

    let event = monitor.drain_once().unwrap().expect("expected a pending event");
    assert_eq!(event.event().file_path(), canonical(&file));
    assert_eq!(event.event().action(), Action::Modify);
    assert!(monitor.drain_once().unwrap().is_none());
}

/// Removing a file is relayed as a delete.
#[test]
fn test_delete_is_dispatched() {
    let tmp = TempDir::new().unwrap();
    let file = tmp.path().join("gone.txt");
    fs::write(&file, "bye").unwrap();
    let expected = canonical(&file);

    let mut monitor = DirectoryMonitor::new(discard);
    monitor.watch(tmp.path()).unwrap();

    fs::remove_file(&file).unwrap();
    let event = drain_until(&mut monitor, |e| e.action() == Action::Delete)
        .expect("no delete event");
    assert_eq!(event.file_path(), expected);
}

/// Renames within the tree keep both paths.
#[cfg(target_os = "linux")]
#[test]
fn test_rename_is_dispatched_as_move() {
    let tmp = TempDir::new().unwrap();
    let old = tmp.path().join("old.txt");
    let new = tmp.path().join("new.txt");
    fs::write(&old, "x").unwrap();
    let old_path = canonical(&old);

    let mut monitor = DirectoryMonitor::new(discard);
    monitor.watch(tmp.path()).unwrap();

    fs::rename(&old, &new).unwrap();
    let event = drain_until(&mut monitor, |e| e.action() == Action::Move)
        .expect("no move event");
    assert_eq!(event.previous_file_path(), old_path);
    assert_eq!(event.file_path(), canonical(&new));
}

/// After unwatch, new activity under the root is no longer relayed.
#[test]
fn test_unwatch_stops_capture() {
    let tmp = TempDir::new().unwrap();
    let mut monitor = DirectoryMonitor::new(discard);
    let handle = monitor.watch(tmp.path()).unwrap();

    monitor.unwatch(handle).unwrap();
    assert!(!monitor.is_watching(handle));
    // A stale event may still be pending; flush it.
    monitor.drain_once().unwrap();

    fs::write(tmp.path().join("late.txt"), "late").unwrap();
    thread::sleep(Duration::from_millis(300));
    assert!(monitor.drain_once().unwrap().is_none());
}

/// Independent monitors do not see each other's events.
#[test]
fn test_sessions_are_independent() {
    let a = TempDir::new().unwrap();
    let b = TempDir::new().unwrap();
    let mut first = DirectoryMonitor::new(discard);
    let mut second = DirectoryMonitor::new(discard);
    first.watch(a.path()).unwrap();
    second.watch(b.path()).unwrap();

    fs::write(a.path().join("only-a.txt"), "a").unwrap();
    assert!(drain_until(&mut first, |e| e.file_path().ends_with("only-a.txt")).is_some());

    settle(&mut second);
    assert!(second.drain_once().unwrap().is_none());
}

/// The sink receives exactly what `drain_once` returns.
#[test]
fn test_sink_receives_payload() {
    let tmp = TempDir::new().unwrap();
    let mut delivered = Vec::new();
    let mut monitor = DirectoryMonitor::new(|e: &DispatchedEvent| -> Result<()> {
        delivered.push(serde_json::to_value(e)?);
        Ok(())
    });
    monitor.watch(tmp.path()).unwrap();

    fs::File::create(tmp.path().join("p.txt")).unwrap();
    let event = drain_until(&mut monitor, |e| e.file_path().ends_with("p.txt"))
        .expect("no event for payload test");
    drop(monitor);

    let last = delivered.last().unwrap();
    assert_eq!(last["name"], "directoryMonitor");
    assert_eq!(last["watchID"], event.watch_id().id());
    assert_eq!(last["filePath"], event.file_path());
    assert_eq!(last["rootDirectory"], event.root_directory());
}

/// Shutdown stops watchers and flushes at most one event.
#[test]
fn test_shutdown_from_config() {
    let tmp = TempDir::new().unwrap();
    let config = Config {
        watch_dirs: vec![tmp.path().to_path_buf()],
        ..Default::default()
    };
    let monitor = DirectoryMonitor::from_config(&config, discard).unwrap();
    assert_eq!(monitor.watches().len(), 1);

    fs::write(tmp.path().join("last.txt"), "x").unwrap();
    thread::sleep(Duration::from_millis(300));

    let (flushed, _) = monitor.shutdown();
    let flushed = flushed
        .unwrap()
        .expect("pending event should be flushed");
    assert!(flushed.event().file_path().ends_with("last.txt"));
}
