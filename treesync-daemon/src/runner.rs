//! The embedding contract between the native core and the runner.
//!
//! The runner decides what each filesystem change means and when the next
//! batch of work is due; the core only moves events and time. A runner is
//! any type wiring these entry points; the daemon drives it as a trait
//! object from the master loop.

use treesync_core::Ticks;
use treesync_events::FsEvent;

use crate::host::Host;

/// The next wakeup the runner wants, answered on every loop iteration.
///
/// On the raw contract this is a `(state, time)` pair with state `< 0`,
/// `> 0`, or `0`; spelled here as an enum.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alarm {
    /// Work is already due. The loop dispatches without waiting on the
    /// event source this iteration.
    Immediate,
    /// Wake at the given tick unless events arrive first. Must be strictly
    /// in the future; a past tick is treated as scheduler corruption and
    /// kills the daemon.
    At(Ticks),
    /// Nothing scheduled; block on the event source indefinitely.
    Idle,
}

/// A synchronization policy embedded in the daemon.
///
/// All entry points run on the single daemon thread; a runner that blocks,
/// blocks the world. That is intentional: `wait_pids` from inside
/// [`Runner::event`] is how a runner models "this batch of helpers must
/// finish before anything else happens".
pub trait Runner {
    /// Version string compared against the core's compiled-in version at
    /// startup. A mismatch is fatal.
    fn version(&self) -> &str;

    /// Called once at startup, before the first loop iteration. This is
    /// where watches get registered.
    fn initialize(&mut self, host: &mut Host);

    /// Called at the top of every loop iteration with the current tick.
    fn get_alarm(&mut self, now: Ticks) -> Alarm;

    /// Called synchronously for every normalized event. The return value
    /// of the runner's handling is ignored by the core.
    fn event(&mut self, host: &mut Host, event: &FsEvent);

    /// Called when the kernel event queue overflowed and changes were
    /// lost. Recovery (typically a full rescan) is the runner's business.
    fn overflow(&mut self, host: &mut Host);
}
