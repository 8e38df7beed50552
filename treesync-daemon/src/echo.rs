//! The built-in runner shipped with `treesyncd`.
//!
//! It performs no mirroring of its own: it registers the directory trees
//! named in the config file (one per line, `#` for comments), keeps the
//! watch table growing as directories appear, and reports every change
//! through the log. It doubles as the reference wiring for a real policy.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::fs;
use std::path::PathBuf;

use treesync_core::logging::Level;
use treesync_core::Ticks;
use treesync_events::{EventKind, FsEvent};

use crate::host::Host;
use crate::runner::{Alarm, Runner};

pub struct EchoRunner {
    runner_file: PathBuf,
    config_file: PathBuf,
    /// Watch descriptor to directory path, for rendering full paths.
    watches: HashMap<i32, PathBuf>,
}

impl EchoRunner {
    pub fn new(runner_file: PathBuf, config_file: PathBuf) -> Self {
        Self {
            runner_file,
            config_file,
            watches: HashMap::new(),
        }
    }

    /// Register `root` and everything below it.
    fn watch_tree(&mut self, host: &mut Host, root: PathBuf) {
        let Some(root) = host.real_dir(&root) else {
            // real_dir already reported the failure.
            return;
        };
        let mut queue = vec![root];
        while let Some(dir) = queue.pop() {
            match host.add_watch(&dir) {
                Ok(wd) => {
                    self.watches.insert(wd, dir.clone());
                }
                Err(err) => {
                    host.log(Level::Error, format_args!("{err}"));
                    continue;
                }
            }
            for name in host.sub_dirs(&dir) {
                queue.push(dir.join(name));
            }
        }
    }
}

/// Directories named by the config file: one per line, blank lines and
/// `#` comments skipped.
fn parse_roots(config: &str) -> Vec<PathBuf> {
    config
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(PathBuf::from)
        .collect()
}

impl Runner for EchoRunner {
    fn version(&self) -> &str {
        env!("CARGO_PKG_VERSION")
    }

    fn initialize(&mut self, host: &mut Host) {
        host.log(
            Level::Debug,
            format_args!(
                "built-in runner active, wiring named by [{}]",
                self.runner_file.display()
            ),
        );

        let config = match fs::read_to_string(&self.config_file) {
            Ok(config) => config,
            Err(err) => {
                host.log(
                    Level::Error,
                    format_args!("cannot read config [{}]: {err}", self.config_file.display()),
                );
                host.terminate(1);
            }
        };

        let roots = parse_roots(&config);
        if roots.is_empty() {
            host.log(
                Level::Error,
                format_args!(
                    "config [{}] names no directories to watch",
                    self.config_file.display()
                ),
            );
            host.terminate(1);
        }

        for root in roots {
            self.watch_tree(host, root);
        }
        host.log(
            Level::Normal,
            format_args!("watching {} directories", self.watches.len()),
        );
    }

    fn get_alarm(&mut self, _now: Ticks) -> Alarm {
        Alarm::Idle
    }

    fn event(&mut self, host: &mut Host, event: &FsEvent) {
        let dir = self.watches.get(&event.watch).cloned();
        let full = |name: &OsStr| match &dir {
            Some(dir) => dir.join(name),
            None => PathBuf::from(name),
        };

        match &event.name2 {
            Some(name2) => host.log(
                Level::Normal,
                format_args!(
                    "move {} -> {}",
                    full(&event.name).display(),
                    full(name2).display()
                ),
            ),
            None => host.log(
                Level::Normal,
                format_args!("{} {}", event.kind, full(&event.name).display()),
            ),
        }

        // New directories join the watch table immediately, whether created
        // in place or moved in.
        if event.is_dir {
            let arrived = match (event.kind, &event.name2) {
                (EventKind::Create, _) => Some(full(&event.name)),
                (EventKind::Move, Some(name2)) => Some(full(name2)),
                _ => None,
            };
            if let Some(path) = arrived {
                self.watch_tree(host, path);
            }
        }
    }

    fn overflow(&mut self, host: &mut Host) {
        host.log(
            Level::Error,
            format_args!("kernel event queue overflowed, changes may have been lost"),
        );
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_lines_become_roots() {
        let roots = parse_roots("# mirrored trees\n/srv/www\n\n  /home/data  \n# end\n");
        assert_eq!(
            roots,
            vec![PathBuf::from("/srv/www"), PathBuf::from("/home/data")]
        );
    }

    #[test]
    fn empty_config_yields_no_roots() {
        assert!(parse_roots("").is_empty());
        assert!(parse_roots("# only comments\n\n").is_empty());
    }
}
