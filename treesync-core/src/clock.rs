//! Monotonic tick clock backed by `times(2)`.
//!
//! Alarms in the runner are scheduled exclusively in kernel ticks, never in
//! wall-clock time. Tick values wrap, so every comparison goes through the
//! wrap-safe [`Ticks::is_after`] / [`Ticks::is_before`] pair.

use std::mem;

/// A point on the kernel tick counter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ticks(pub i64);

impl Ticks {
    /// Wrap-safe "strictly later than". `a.is_after(b)` holds iff the
    /// wrapping difference `b - a` is negative.
    pub fn is_after(self, other: Ticks) -> bool {
        other.0.wrapping_sub(self.0) < 0
    }

    pub fn is_before(self, other: Ticks) -> bool {
        other.is_after(self)
    }

    /// Wrapping addition of two tick values (spans add to instants).
    pub fn addup(self, other: Ticks) -> Ticks {
        Ticks(self.0.wrapping_add(other.0))
    }

    /// Wrapping span from `earlier` to `self`, in ticks.
    pub fn since(self, earlier: Ticks) -> i64 {
        self.0.wrapping_sub(earlier.0)
    }
}

/// Process clock. Captures the kernel's ticks-per-second once at startup.
#[derive(Debug, Clone)]
pub struct Clock {
    ticks_per_sec: i64,
}

impl Clock {
    pub fn new() -> Self {
        let tps = unsafe { libc::sysconf(libc::_SC_CLK_TCK) };
        Self {
            // 100 Hz is the kernel default should sysconf ever fail.
            ticks_per_sec: if tps > 0 { tps } else { 100 },
        }
    }

    /// Current kernel tick counter.
    pub fn now(&self) -> Ticks {
        let mut cpu: libc::tms = unsafe { mem::zeroed() };
        let ticks = unsafe { libc::times(&mut cpu) };
        Ticks(ticks as i64)
    }

    pub fn ticks_per_sec(&self) -> i64 {
        self.ticks_per_sec
    }

    /// Convert a tick span to whole milliseconds, for `poll(2)` timeouts.
    pub fn span_to_millis(&self, span: i64) -> i64 {
        span.saturating_mul(1000) / self.ticks_per_sec
    }
}

impl Default for Clock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn comparisons_are_wrap_safe() {
        let before_wrap = Ticks(i64::MAX - 5);
        let after_wrap = Ticks(i64::MAX.wrapping_add(10));
        assert!(after_wrap.is_after(before_wrap));
        assert!(before_wrap.is_before(after_wrap));
        assert!(!before_wrap.is_after(before_wrap), "not strictly after itself");
    }

    #[test]
    fn addup_wraps() {
        let sum = Ticks(i64::MAX).addup(Ticks(1));
        assert_eq!(sum.0, i64::MIN);
    }

    #[test]
    fn since_measures_spans() {
        assert_eq!(Ticks(150).since(Ticks(100)), 50);
    }

    #[test]
    fn now_is_monotonic_under_wrap_safe_compare() {
        let clock = Clock::new();
        let a = clock.now();
        let b = clock.now();
        assert!(!a.is_after(b));
    }

    #[test]
    fn span_conversion_uses_captured_rate() {
        let clock = Clock {
            ticks_per_sec: 100,
        };
        assert_eq!(clock.span_to_millis(100), 1000);
        assert_eq!(clock.span_to_millis(1), 10);
        assert_eq!(clock.span_to_millis(0), 0);
    }
}
