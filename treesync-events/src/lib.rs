//! Inotify event acquisition and normalization.
//!
//! Public API surface:
//! - [`event`] — canonical event vocabulary shared with the runner
//! - [`source`] — watch registration, buffered draining, fd polling
//! - [`normalize`] — rename pairing and per-record classification
//! - [`error`] — [`EventError`]

pub mod error;
pub mod event;
pub mod normalize;
pub mod source;

pub use error::EventError;
pub use event::{EventKind, FsEvent};
pub use normalize::{Normalizer, Notification, RawRecord};
pub use source::EventSource;
