//! Per-record classification and rename pairing.
//!
//! A rename inside the watched tree arrives as two kernel records tied only
//! by an opaque cookie. The normalizer holds at most one `IN_MOVED_FROM`
//! half in its pending slot; the very next record either completes it into
//! a `Move` or proves it unmatched, in which case the buffered half
//! degrades to a `Delete`. An unmatched half still pending when a drain
//! runs dry is flushed the same way.

use std::ffi::OsString;

use treesync_core::logging::{Level, Logger};

use crate::event::{EventKind, FsEvent};

/// A raw kernel record, copied out of the read buffer. The mask carries the
/// kernel's `IN_*` bits verbatim.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RawRecord {
    pub watch: i32,
    pub mask: u32,
    pub cookie: u32,
    pub name: OsString,
}

impl RawRecord {
    fn has(&self, bit: u32) -> bool {
        self.mask & bit != 0
    }

    fn is_dir(&self) -> bool {
        self.has(libc::IN_ISDIR)
    }
}

/// What a consumed record asks the daemon to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notification {
    /// Dispatch this event to the runner.
    Event(FsEvent),
    /// The kernel queue overflowed; invoke the runner's overflow entry.
    Overflow,
}

/// Stateful record classifier. One per event stream, alive for the process
/// duration.
#[derive(Debug, Default)]
pub struct Normalizer {
    pending: Option<RawRecord>,
}

impl Normalizer {
    pub fn new() -> Self {
        Self::default()
    }

    /// True while a rename half is buffered awaiting its partner.
    pub fn has_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// Classify one record, appending zero, one, or two notifications.
    pub fn feed(&mut self, logger: &Logger, record: RawRecord, out: &mut Vec<Notification>) {
        if record.has(libc::IN_Q_OVERFLOW) {
            out.push(Notification::Overflow);
            return;
        }
        if record.has(libc::IN_IGNORED) {
            return;
        }

        if let Some(buffered) = self.pending.take() {
            if record.has(libc::IN_MOVED_TO) && record.cookie == buffered.cookie {
                out.push(Notification::Event(FsEvent {
                    kind: EventKind::Move,
                    watch: buffered.watch,
                    is_dir: record.is_dir(),
                    name: buffered.name,
                    name2: Some(record.name),
                }));
                return;
            }
            // Anything but the matching half means the buffered source left
            // the watched tree.
            out.push(Notification::Event(delete_of(buffered)));
        }

        if record.has(libc::IN_MOVED_FROM) {
            self.pending = Some(record);
            return;
        }

        let kind = if record.has(libc::IN_MOVED_TO) {
            // Rename into the watched tree.
            EventKind::Create
        } else if record.has(libc::IN_ATTRIB) {
            EventKind::Attrib
        } else if record.has(libc::IN_CLOSE_WRITE) {
            EventKind::Modify
        } else if record.has(libc::IN_CREATE) {
            EventKind::Create
        } else if record.has(libc::IN_DELETE) || record.has(libc::IN_DELETE_SELF) {
            EventKind::Delete
        } else {
            logger.core(
                Level::Debug,
                format_args!("skipped inotify record with mask {:#x}", record.mask),
            );
            return;
        };

        out.push(Notification::Event(FsEvent {
            kind,
            watch: record.watch,
            is_dir: record.is_dir(),
            name: record.name,
            name2: None,
        }));
    }

    /// Drain-end flush: an unmatched rename source becomes a deletion.
    pub fn flush(&mut self) -> Option<FsEvent> {
        self.pending.take().map(delete_of)
    }
}

fn delete_of(record: RawRecord) -> FsEvent {
    FsEvent {
        kind: EventKind::Delete,
        watch: record.watch,
        is_dir: record.is_dir(),
        name: record.name,
        name2: None,
    }
}
