//! Kernel-proximal services for the treesync daemon.
//!
//! Public API surface:
//! - [`logging`] — level-filtered log fan-out to console, file, and syslog
//! - [`clock`] — monotonic tick clock with wrap-safe comparisons
//! - [`fsops`] — directory enumeration and path canonicalization
//! - [`spawn`] — asynchronous subprocess launch and batch reaping
//! - [`reset`] — process-wide stop flag, settable from signal handlers

pub mod clock;
pub mod fsops;
pub mod logging;
pub mod reset;
pub mod spawn;

pub use clock::{Clock, Ticks};
pub use logging::{Level, LogConfig, Logger, Origin};
