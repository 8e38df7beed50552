//! Filesystem helpers exposed to the runner.
//!
//! Failures here are reported through the logger and surfaced as empty or
//! absent results; the runner tests the value instead of catching anything.

use std::ffi::OsString;
use std::fs;
use std::path::{Path, PathBuf};

use crate::logging::{Level, Logger};
use crate::reset;

/// Basenames of the directories directly under `dir`.
///
/// Entries whose type cannot be determined are skipped. The scan honors the
/// reset flag: once it is set, the names accumulated so far are returned.
pub fn sub_dirs(logger: &Logger, dir: &Path) -> Vec<OsString> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(err) => {
            logger.core(
                Level::Error,
                format_args!("cannot open dir [{}]: {err}", dir.display()),
            );
            return Vec::new();
        }
    };

    let mut names = Vec::new();
    for entry in entries {
        if reset::is_set() {
            break;
        }
        let Ok(entry) = entry else {
            continue;
        };
        match entry.file_type() {
            Ok(file_type) if file_type.is_dir() => names.push(entry.file_name()),
            Ok(_) => {}
            Err(_) => {}
        }
    }
    names
}

/// Canonicalize `path`, verify it names a directory, and return the absolute
/// form with a trailing separator. `None` on any failure.
pub fn real_dir(logger: &Logger, path: &Path) -> Option<PathBuf> {
    let resolved = match fs::canonicalize(path) {
        Ok(resolved) => resolved,
        Err(err) => {
            logger.core(
                Level::Error,
                format_args!(
                    "failure getting absolute path of [{}]: {err}",
                    path.display()
                ),
            );
            return None;
        }
    };

    let is_dir = fs::metadata(&resolved)
        .map(|meta| meta.is_dir())
        .unwrap_or(false);
    if !is_dir {
        logger.core(
            Level::Error,
            format_args!("[{}] is not a directory", path.display()),
        );
        return None;
    }

    let mut with_separator = resolved.into_os_string();
    with_separator.push("/");
    Some(PathBuf::from(with_separator))
}
