//! Asynchronous subprocess launch and batch reaping.
//!
//! The daemon never transfers file contents itself; it spawns helper
//! binaries (rsync and friends) and the runner later parks on
//! [`wait_pids`] until a whole batch has finished.

use std::ffi::OsString;
use std::path::Path;
use std::process::Command;

use nix::errno::Errno;
use nix::sys::wait::{waitpid, WaitStatus};
use nix::unistd::Pid;

use crate::logging::{Level, Logger};

/// Invoked per reaped child with `(pid, exit_code)`. Returns 0 when the
/// child's slot is done, or a replacement pid when a follow-up process was
/// spawned for the same slot.
pub type Collector<'a> = &'a mut dyn FnMut(i32, i32) -> i32;

/// Spawn `binary` with `args`, without waiting for it.
///
/// Returns the child pid, or 0 when the spawn failed. The child is left
/// running and must eventually be collected through [`wait_pids`].
pub fn exec(logger: &Logger, binary: &Path, args: &[OsString]) -> i32 {
    match Command::new(binary).args(args).spawn() {
        Ok(child) => child.id() as i32,
        Err(err) => {
            logger.core(
                Level::Error,
                format_args!("failed executing [{}]: {err}", binary.display()),
            );
            0
        }
    }
}

/// Block until every non-zero pid in `pids` has been reaped or replaced by
/// 0 through the collector.
///
/// Children that did not exit normally (signal-killed, stopped) are
/// silently dropped and never decrement the remaining count; whoever
/// launched such a process has to deal with it out-of-band, or this call
/// waits for a follow-up reap that may never come. Reaped pids not present
/// in `pids` are strangers and are discarded. Duplicate pids are allowed;
/// every matching slot is replaced.
pub fn wait_pids(logger: &Logger, pids: &mut [i32], mut collector: Option<Collector<'_>>) {
    let mut remaining = pids.iter().filter(|&&pid| pid != 0).count();

    while remaining > 0 {
        let status = match waitpid(None::<Pid>, None) {
            Ok(status) => status,
            Err(Errno::EINTR) => continue,
            Err(Errno::ECHILD) => {
                logger.core(
                    Level::Error,
                    format_args!("no children left while {remaining} pid(s) still awaited"),
                );
                return;
            }
            Err(err) => {
                logger.core(Level::Error, format_args!("waitpid failed: {err}"));
                return;
            }
        };

        let (pid, exit_code) = match status {
            WaitStatus::Exited(pid, code) => (pid.as_raw(), code),
            _ => continue,
        };

        if !pids.contains(&pid) {
            continue;
        }

        let replacement = match collector.as_mut() {
            Some(collect) => collect(pid, exit_code),
            None => 0,
        };

        for slot in pids.iter_mut() {
            if *slot == pid {
                *slot = replacement;
                if replacement == 0 {
                    remaining -= 1;
                }
            }
        }
    }
}
