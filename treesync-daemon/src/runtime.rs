//! The master loop.
//!
//! A single-threaded cooperative multiplexer over three inputs: the inotify
//! stream, the runner's alarm, and the reset flag. Child reaping is never
//! done here; it happens only inside `wait_pids` calls the runner makes
//! from its own handlers, so a batch of helpers blocks the loop by design.

use treesync_core::logging::Level;
use treesync_core::reset;
use treesync_events::{Normalizer, Notification};

use crate::error::DaemonError;
use crate::host::Host;
use crate::runner::{Alarm, Runner};

/// Run the loop until the reset flag is raised or a fatal error occurs.
///
/// Per iteration: query the runner's alarm, wait on the event source
/// accordingly, drain and dispatch every available record, then flush an
/// unmatched rename half. The alarm is never re-queried mid-drain, and a
/// wait interrupted by a signal re-enters at the top so timers are
/// re-evaluated rather than starved.
pub fn run(host: &mut Host, runner: &mut dyn Runner) -> Result<(), DaemonError> {
    let mut normalizer = Normalizer::new();
    let mut notifications = Vec::new();

    while !reset::is_set() {
        let now = host.now();

        let mut ready = match runner.get_alarm(now) {
            Alarm::Immediate => {
                host.logger()
                    .core(Level::Debug, format_args!("handling due work immediately"));
                false
            }
            Alarm::At(alarm) => {
                if !alarm.is_after(now) {
                    host.logger().core(
                        Level::Error,
                        format_args!("critical failure: alarm lies in the past"),
                    );
                    return Err(DaemonError::AlarmInPast { now, alarm });
                }
                let millis = host.clock().span_to_millis(alarm.since(now));
                let ready = host.source_mut().wait(Some(millis))?;
                if ready {
                    host.logger()
                        .core(Level::Debug, format_args!("data on the event source"));
                } else {
                    host.logger()
                        .core(Level::Debug, format_args!("timeout or signal"));
                }
                ready
            }
            Alarm::Idle => {
                host.logger()
                    .core(Level::Debug, format_args!("gone blocking"));
                host.source_mut().wait(None)?
            }
        };

        // Drain everything currently queued. A zero-timeout poll after each
        // batch decides whether the kernel has more; only the reset flag
        // bounds this loop.
        while ready && !reset::is_set() {
            let records = host.source_mut().read_batch()?;
            for record in records {
                if reset::is_set() {
                    break;
                }
                normalizer.feed(host.logger(), record, &mut notifications);
                for notification in notifications.drain(..) {
                    match notification {
                        Notification::Event(event) => runner.event(host, &event),
                        Notification::Overflow => runner.overflow(host),
                    }
                }
            }
            ready = host.source_mut().wait(Some(0))?;
        }

        // A rename source still buffered after the drain ran dry has left
        // the watched tree.
        if let Some(flushed) = normalizer.flush() {
            runner.event(host, &flushed);
        }
    }

    Ok(())
}
