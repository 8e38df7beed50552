//! Live inotify coverage: real watches on a tempdir, driven the same way
//! the master loop drives the source.

use std::ffi::OsString;
use std::fs;

use tempfile::TempDir;

use treesync_core::logging::{Level, LogConfig, Logger};
use treesync_events::{EventKind, EventSource, FsEvent, Normalizer, Notification};

fn muted() -> Logger {
    Logger::new(LogConfig {
        min_level: Level::Error,
        file: None,
        syslog: false,
        daemonized: true,
    })
}

/// One drain pass: wait briefly for data, read batches until a zero-timeout
/// poll reports the queue empty, then flush.
fn drain(source: &mut EventSource, normalizer: &mut Normalizer, logger: &Logger) -> Vec<FsEvent> {
    let mut notifications = Vec::new();
    let mut ready = source.wait(Some(2000)).expect("poll source");
    while ready {
        for record in source.read_batch().expect("read batch") {
            normalizer.feed(logger, record, &mut notifications);
        }
        ready = source.wait(Some(0)).expect("peek source");
    }
    if let Some(flushed) = normalizer.flush() {
        notifications.push(Notification::Event(flushed));
    }

    notifications
        .into_iter()
        .map(|n| match n {
            Notification::Event(event) => event,
            Notification::Overflow => panic!("unexpected queue overflow in test"),
        })
        .collect()
}

#[test]
fn create_modify_attrib_delete_arrive_in_order() {
    let logger = muted();
    let dir = TempDir::new().expect("tempdir");
    let mut source = EventSource::new().expect("source");
    let mut normalizer = Normalizer::new();

    let wd = source.add_watch(dir.path()).expect("watch");
    assert!(wd > 0);

    let file = dir.path().join("note.txt");
    fs::write(&file, b"hello").expect("write");

    let events = drain(&mut source, &mut normalizer, &logger);
    let kinds: Vec<(EventKind, OsString)> = events
        .iter()
        .map(|e| (e.kind, e.name.clone()))
        .collect();
    assert_eq!(
        kinds,
        vec![
            (EventKind::Create, OsString::from("note.txt")),
            (EventKind::Modify, OsString::from("note.txt")),
        ]
    );
    assert!(events.iter().all(|e| e.watch == wd && !e.is_dir));

    let mut perms = fs::metadata(&file).expect("meta").permissions();
    perms.set_readonly(true);
    fs::set_permissions(&file, perms).expect("chmod");
    fs::remove_file(&file).expect("rm");

    let events = drain(&mut source, &mut normalizer, &logger);
    let kinds: Vec<EventKind> = events.iter().map(|e| e.kind).collect();
    assert_eq!(kinds, vec![EventKind::Attrib, EventKind::Delete]);
}

#[test]
fn rename_within_one_watch_pairs_into_move() {
    let logger = muted();
    let dir = TempDir::new().expect("tempdir");
    let mut source = EventSource::new().expect("source");
    let mut normalizer = Normalizer::new();

    let wd = source.add_watch(dir.path()).expect("watch");
    fs::write(dir.path().join("a"), b"x").expect("write");
    let _ = drain(&mut source, &mut normalizer, &logger);

    fs::rename(dir.path().join("a"), dir.path().join("b")).expect("rename");

    let events = drain(&mut source, &mut normalizer, &logger);
    assert_eq!(events.len(), 1);
    let moved = &events[0];
    assert_eq!(moved.kind, EventKind::Move);
    assert_eq!(moved.watch, wd);
    assert_eq!(moved.name, OsString::from("a"));
    assert_eq!(moved.name2, Some(OsString::from("b")));
}

#[test]
fn rename_across_the_watch_boundary_degrades() {
    let logger = muted();
    let watched = TempDir::new().expect("tempdir");
    let outside = TempDir::new().expect("tempdir");
    let mut source = EventSource::new().expect("source");
    let mut normalizer = Normalizer::new();

    source.add_watch(watched.path()).expect("watch");
    fs::write(watched.path().join("leaving"), b"x").expect("write");
    let _ = drain(&mut source, &mut normalizer, &logger);

    // Out of the watched tree: the lone rename source flushes to a delete.
    fs::rename(watched.path().join("leaving"), outside.path().join("gone")).expect("rename out");
    let events = drain(&mut source, &mut normalizer, &logger);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Delete);
    assert_eq!(events[0].name, OsString::from("leaving"));

    // Into the watched tree: the lone rename destination is a create.
    fs::write(outside.path().join("arriving"), b"y").expect("write");
    fs::rename(outside.path().join("arriving"), watched.path().join("here")).expect("rename in");
    let events = drain(&mut source, &mut normalizer, &logger);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].kind, EventKind::Create);
    assert_eq!(events[0].name, OsString::from("here"));
}

#[test]
fn read_buffer_grows_to_fit_long_names() {
    let logger = muted();
    let dir = TempDir::new().expect("tempdir");
    let mut source = EventSource::with_buffer_size(16).expect("source");
    let mut normalizer = Normalizer::new();

    source.add_watch(dir.path()).expect("watch");
    let long_name = "n".repeat(200);
    fs::write(dir.path().join(&long_name), b"x").expect("write");

    let events = drain(&mut source, &mut normalizer, &logger);
    assert!(
        events
            .iter()
            .any(|e| e.kind == EventKind::Create && e.name == OsString::from(&long_name)),
        "create for the long name must survive the undersized buffer"
    );
    assert!(
        source.buffer_size() > 16,
        "buffer must have grown beyond its initial size"
    );
}
