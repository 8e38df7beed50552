//! End-to-end reaping behavior with real child processes.
//!
//! Everything lives in one test function: `wait_pids` reaps with
//! `waitpid(-1)`, so concurrent tests in the same process would steal each
//! other's children.

use std::ffi::OsString;
use std::path::Path;

use treesync_core::logging::{Level, LogConfig, Logger};
use treesync_core::spawn::{exec, wait_pids};

fn muted() -> Logger {
    Logger::new(LogConfig {
        min_level: Level::Error,
        file: None,
        syslog: false,
        daemonized: true,
    })
}

#[test]
fn reaps_batches_with_collector_replacement_and_strangers() {
    let logger = muted();

    // A failed spawn is reported as pid 0, not an error.
    assert_eq!(exec(&logger, Path::new("/nonexistent/treesync-helper"), &[]), 0);

    // Batches with no live pids return immediately.
    wait_pids(&logger, &mut [], None);
    wait_pids(&logger, &mut [0, 0], None);

    // Two children, no collector: both slots zero out.
    let first = exec(&logger, Path::new("/bin/true"), &[]);
    let second = exec(&logger, Path::new("/bin/true"), &[]);
    assert!(first > 0 && second > 0);
    let mut batch = [first, second];
    wait_pids(&logger, &mut batch, None);
    assert_eq!(batch, [0, 0]);

    // A stranger child outside the batch must not disturb the wait.
    let stranger = exec(&logger, Path::new("/bin/true"), &[]);
    assert!(stranger > 0);

    // Collector sees the exit code and replaces the slot with a follow-up
    // child; the wait only finishes once the follow-up is reaped too.
    let failing = exec(
        &logger,
        Path::new("/bin/sh"),
        &[OsString::from("-c"), OsString::from("exit 3")],
    );
    assert!(failing > 0);

    let mut reaps: Vec<(i32, i32)> = Vec::new();
    let mut follow_up = 0;
    let mut batch = [failing];
    {
        let mut collect = |pid: i32, exit_code: i32| -> i32 {
            reaps.push((pid, exit_code));
            if pid == failing {
                follow_up = exec(&logger, Path::new("/bin/true"), &[]);
                follow_up
            } else {
                0
            }
        };
        wait_pids(&logger, &mut batch, Some(&mut collect));
    }

    assert_eq!(batch, [0]);
    assert_eq!(reaps.len(), 2, "original and follow-up child both collected");
    assert_eq!(reaps[0], (failing, 3));
    assert_eq!(reaps[1], (follow_up, 0));
}
