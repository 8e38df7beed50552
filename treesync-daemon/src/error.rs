use thiserror::Error;

use treesync_core::Ticks;
use treesync_events::EventError;

/// Error surface for the daemon runtime. Every variant is fatal: the
/// process logs and exits non-zero.
#[derive(Debug, Error)]
pub enum DaemonError {
    #[error("event source error: {0}")]
    Events(#[from] EventError),

    #[error("alarm {alarm:?} is not in the future of {now:?}")]
    AlarmInPast { now: Ticks, alarm: Ticks },

    #[error("runner version '{runner}' does not match core version '{core}'")]
    VersionMismatch { runner: String, core: String },

    #[error("cannot install signal handlers: {0}")]
    Signals(#[source] std::io::Error),
}
