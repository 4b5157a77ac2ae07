// Path: crates/types/src/app/clock.rs
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{SystemTime, UNIX_EPOCH};

/// Milliseconds since the Unix epoch. All timestamps in the workspace use this unit.
pub type UnixMillis = u64;

/// Milliseconds in one minute.
pub const MILLIS_PER_MINUTE: u64 = 60_000;

/// A source of wall-clock time.
///
/// Components never call `SystemTime::now()` directly; they read an injected
/// clock so that expiry and ordering can be driven deterministically in tests.
pub trait Clock: Send + Sync + std::fmt::Debug {
    /// Returns the current time in Unix milliseconds.
    fn now_ms(&self) -> UnixMillis;
}

/// The process wall clock.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> UnixMillis {
        // A clock set before 1970 reads as the epoch rather than failing.
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }
}

/// A manually driven clock for simulations and tests.
#[derive(Debug, Default)]
pub struct ManualClock {
    now: AtomicU64,
}

impl ManualClock {
    /// Creates a clock frozen at `start`.
    pub fn new(start: UnixMillis) -> Self {
        Self {
            now: AtomicU64::new(start),
        }
    }

    /// Moves the clock forward by `millis`.
    pub fn advance(&self, millis: u64) {
        self.now.fetch_add(millis, Ordering::SeqCst);
    }

    /// Moves the clock forward by whole minutes.
    pub fn advance_minutes(&self, minutes: u64) {
        self.advance(minutes.saturating_mul(MILLIS_PER_MINUTE));
    }

    /// Sets the clock to an absolute instant.
    pub fn set(&self, at: UnixMillis) {
        self.now.store(at, Ordering::SeqCst);
    }
}

impl Clock for ManualClock {
    fn now_ms(&self) -> UnixMillis {
        self.now.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn manual_clock_advances() {
        let clock = ManualClock::new(1_000);
        assert_eq!(clock.now_ms(), 1_000);
        clock.advance_minutes(15);
        assert_eq!(clock.now_ms(), 1_000 + 15 * MILLIS_PER_MINUTE);
        clock.set(42);
        assert_eq!(clock.now_ms(), 42);
    }

    #[test]
    fn system_clock_is_after_2020() {
        // 2020-01-01T00:00:00Z
        assert!(SystemClock.now_ms() > 1_577_836_800_000);
    }
}
