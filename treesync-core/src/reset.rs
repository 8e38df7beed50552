//! Process-wide reset flag.
//!
//! Termination signals do exactly one thing: store into this flag. The
//! master loop, the event-drain loop, and directory enumeration poll it at
//! their boundaries and wind down promptly once it is set. It is the only
//! state in the process written from signal context.

use std::io;
use std::sync::atomic::{AtomicBool, Ordering};

use nix::sys::signal::{sigaction, SaFlags, SigAction, SigHandler, SigSet, Signal};

static RESET: AtomicBool = AtomicBool::new(false);

/// True once a termination signal arrived or [`request`] was called.
pub fn is_set() -> bool {
    RESET.load(Ordering::SeqCst)
}

/// Request a reset from normal (non-signal) context.
pub fn request() {
    RESET.store(true, Ordering::SeqCst);
}

/// Re-arm the flag, for a supervisor restarting the loop after a reset.
pub fn clear() {
    RESET.store(false, Ordering::SeqCst);
}

extern "C" fn on_signal(_signal: libc::c_int) {
    // Only the atomic store; everything else waits for a loop boundary.
    RESET.store(true, Ordering::SeqCst);
}

/// Route SIGTERM, SIGINT, and SIGHUP into the reset flag.
pub fn install_handlers() -> io::Result<()> {
    let action = SigAction::new(
        SigHandler::Handler(on_signal),
        SaFlags::empty(),
        SigSet::empty(),
    );
    for signal in [Signal::SIGTERM, Signal::SIGINT, Signal::SIGHUP] {
        unsafe { sigaction(signal, &action) }.map_err(io::Error::from)?;
    }
    Ok(())
}
