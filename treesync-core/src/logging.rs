//! Level-filtered logging to console, log file, and syslog.
//!
//! The daemon and the runner share one [`Logger`]; messages carry an
//! [`Origin`] that becomes a textual prefix so operators can tell core
//! diagnostics from runner output. Configuration is fixed after startup.

use std::ffi::CString;
use std::fmt;
use std::fs::OpenOptions;
use std::io::Write;
use std::path::PathBuf;
use std::process;

use chrono::Local;

/// Bit marking a raw level value as core-originated.
pub const CORE_FLAG: u8 = 0x80;

/// Log severity. Raw values are part of the embedding contract and must not
/// be renumbered.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
#[repr(u8)]
pub enum Level {
    Debug = 1,
    Verbose = 2,
    Normal = 3,
    Error = 4,
}

impl Level {
    /// Raw contract value of this level, without the origin flag.
    pub fn raw(self) -> u8 {
        self as u8
    }

    /// Parse a raw contract value, ignoring the [`CORE_FLAG`] bit.
    pub fn from_raw(raw: u8) -> Option<Level> {
        match raw & !CORE_FLAG {
            1 => Some(Level::Debug),
            2 => Some(Level::Verbose),
            3 => Some(Level::Normal),
            4 => Some(Level::Error),
            _ => None,
        }
    }

    fn syslog_priority(self) -> libc::c_int {
        match self {
            Level::Debug => libc::LOG_DEBUG,
            Level::Verbose | Level::Normal => libc::LOG_NOTICE,
            Level::Error => libc::LOG_ERR,
        }
    }
}

/// Which side of the embedding boundary a message came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Origin {
    Core,
    Runner,
}

/// Logging configuration, fixed once the daemon is running.
#[derive(Debug, Clone)]
pub struct LogConfig {
    /// Messages below this level are dropped before formatting.
    pub min_level: Level,
    /// Optional log file, opened append-only per message.
    pub file: Option<PathBuf>,
    /// Also forward messages to syslog.
    pub syslog: bool,
    /// Suppresses the console sink. Consulted here, set by whoever
    /// daemonizes the process.
    pub daemonized: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            min_level: Level::Normal,
            file: None,
            syslog: false,
            daemonized: false,
        }
    }
}

/// Fan-out log sink. Cheap to pass by reference everywhere a failure may
/// need reporting.
#[derive(Debug)]
pub struct Logger {
    config: LogConfig,
}

impl Logger {
    pub fn new(config: LogConfig) -> Self {
        Self { config }
    }

    /// True if a message at `level` would be emitted.
    pub fn enabled(&self, level: Level) -> bool {
        level >= self.config.min_level
    }

    /// Log a core-originated message.
    pub fn core(&self, level: Level, message: fmt::Arguments<'_>) {
        self.log(Origin::Core, level, message);
    }

    /// Log a message forwarded from the runner.
    pub fn runner(&self, level: Level, message: fmt::Arguments<'_>) {
        self.log(Origin::Runner, level, message);
    }

    /// Format and emit `message` to every enabled sink. Filtered messages
    /// are dropped before any formatting work happens.
    pub fn log(&self, origin: Origin, level: Level, message: fmt::Arguments<'_>) {
        if !self.enabled(level) {
            return;
        }
        let message = message.to_string();
        let prefix = prefix_for(origin, level);

        if !self.config.daemonized {
            // Console writes must never kill the daemon, even with stdout
            // or stderr gone.
            let stamp = Local::now().format("%H:%M:%S");
            if level == Level::Error {
                let _ = writeln!(std::io::stderr(), "{stamp} {prefix}{message}");
            } else {
                let _ = writeln!(std::io::stdout(), "{stamp} {prefix}{message}");
            }
        }

        if let Some(path) = &self.config.file {
            let stamp = Local::now().format("%a %b %e %H:%M:%S %Y");
            let result = OpenOptions::new()
                .create(true)
                .append(true)
                .open(path)
                .and_then(|mut file| writeln!(file, "{stamp}: {prefix}{message}"));
            if let Err(err) = result {
                // A dead log file is a dead daemon.
                let _ = writeln!(
                    std::io::stderr(),
                    "core: cannot write logfile [{}]: {err}",
                    path.display()
                );
                process::exit(1);
            }
        }

        if self.config.syslog {
            send_syslog(level.syslog_priority(), &format!("{prefix}{message}"));
        }
    }
}

fn prefix_for(origin: Origin, level: Level) -> &'static str {
    match (origin, level) {
        (Origin::Core, Level::Error) => "CORE ERROR: ",
        (Origin::Runner, Level::Error) => "ERROR: ",
        (Origin::Core, _) => "core: ",
        (Origin::Runner, _) => "",
    }
}

fn send_syslog(priority: libc::c_int, message: &str) {
    const FMT: &std::ffi::CStr = c"%s";
    let Ok(text) = CString::new(message) else {
        // Interior NUL; nothing sensible to forward.
        return;
    };
    unsafe {
        libc::syslog(priority, FMT.as_ptr(), text.as_ptr());
    }
}
