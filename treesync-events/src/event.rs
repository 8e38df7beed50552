//! Canonical event vocabulary shared with the runner.

use std::ffi::OsString;
use std::fmt;

/// Raw contract values for event kinds. Stable; the runner may persist or
/// switch on them. `MOVE_FROM` and `MOVE_TO` exist for the runner's own
/// bookkeeping when it splits a move back into halves; a dispatched event
/// never carries them.
pub mod raw {
    pub const NONE: i32 = 0;
    pub const ATTRIB: i32 = 1;
    pub const MODIFY: i32 = 2;
    pub const CREATE: i32 = 3;
    pub const DELETE: i32 = 4;
    pub const MOVE: i32 = 5;
    pub const MOVE_FROM: i32 = 6;
    pub const MOVE_TO: i32 = 7;
}

/// Kind of a normalized filesystem change. `Move` is the only binary kind;
/// it carries both the source and destination basename.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum EventKind {
    Attrib = raw::ATTRIB,
    Modify = raw::MODIFY,
    Create = raw::CREATE,
    Delete = raw::DELETE,
    Move = raw::MOVE,
}

impl EventKind {
    pub fn raw(self) -> i32 {
        self as i32
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            EventKind::Attrib => "attrib",
            EventKind::Modify => "modify",
            EventKind::Create => "create",
            EventKind::Delete => "delete",
            EventKind::Move => "move",
        };
        f.write_str(name)
    }
}

/// A normalized filesystem change, ready for dispatch to the runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FsEvent {
    pub kind: EventKind,
    /// Watch descriptor the event arrived on. For `Move`, the descriptor of
    /// the source half.
    pub watch: i32,
    pub is_dir: bool,
    /// Basename of the affected entry; source basename for `Move`.
    pub name: OsString,
    /// Destination basename, present only for `Move`.
    pub name2: Option<OsString>,
}
