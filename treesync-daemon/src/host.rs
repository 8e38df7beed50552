//! Core services handed to the runner.
//!
//! Everything the runner may ask of the operating system goes through this
//! value; nothing here raises across the embedding boundary. Operations
//! either return a testable absent/zero result or are fatal outright.

use std::ffi::OsString;
use std::fmt;
use std::path::{Path, PathBuf};
use std::process;

use treesync_core::logging::{Level, Logger};
use treesync_core::spawn::Collector;
use treesync_core::{fsops, spawn, Clock, Ticks};
use treesync_events::{EventError, EventSource};

pub struct Host {
    logger: Logger,
    clock: Clock,
    source: EventSource,
}

impl Host {
    pub fn new(logger: Logger, source: EventSource) -> Self {
        Self {
            logger,
            clock: Clock::new(),
            source,
        }
    }

    pub fn logger(&self) -> &Logger {
        &self.logger
    }

    pub(crate) fn clock(&self) -> &Clock {
        &self.clock
    }

    pub(crate) fn source_mut(&mut self) -> &mut EventSource {
        &mut self.source
    }

    /// Register a directory for the standard notification mask and return
    /// its watch descriptor.
    pub fn add_watch(&mut self, path: &Path) -> Result<i32, EventError> {
        self.source.add_watch(path)
    }

    /// Log a runner-originated message.
    pub fn log(&self, level: Level, message: fmt::Arguments<'_>) {
        self.logger.runner(level, message);
    }

    /// Current kernel tick counter. The only time source the runner sees
    /// for scheduling.
    pub fn now(&self) -> Ticks {
        self.clock.now()
    }

    /// Wrap-safe tick addition, for building alarm instants from spans.
    pub fn addup_clocks(&self, a: Ticks, b: Ticks) -> Ticks {
        a.addup(b)
    }

    /// Spawn a helper binary without waiting for it. Returns the pid, or 0
    /// when the spawn failed.
    pub fn exec(&self, binary: &Path, args: &[OsString]) -> i32 {
        spawn::exec(&self.logger, binary, args)
    }

    /// Canonicalized directory path with trailing separator, or `None`.
    pub fn real_dir(&self, path: &Path) -> Option<PathBuf> {
        fsops::real_dir(&self.logger, path)
    }

    /// Basenames of the directories directly under `path`.
    pub fn sub_dirs(&self, path: &Path) -> Vec<OsString> {
        fsops::sub_dirs(&self.logger, path)
    }

    /// Park until every non-zero pid in `pids` is collected. See
    /// [`spawn::wait_pids`].
    pub fn wait_pids(&self, pids: &mut [i32], collector: Option<Collector<'_>>) {
        spawn::wait_pids(&self.logger, pids, collector);
    }

    /// End the daemon with the given exit code. Does not return.
    pub fn terminate(&self, exit_code: i32) -> ! {
        self.logger.core(
            Level::Normal,
            format_args!("terminating with exit code {exit_code}"),
        );
        process::exit(exit_code);
    }
}

impl fmt::Debug for Host {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Host").finish_non_exhaustive()
    }
}
