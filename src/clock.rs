//! Injected time.
//!
//! Every timing rule in the scan pipeline (attempt throttle, manual
//! readiness wait, dedup window) runs against milliseconds handed in by
//! the caller or read from a `Clock` trait object, so tests drive the
//! clock by hand.

use std::time::Instant;

pub trait Clock {
    /// Monotonic milliseconds. The origin is arbitrary but fixed.
    fn now_ms(&self) -> u64;

    /// Block the cooperative loop for `ms`.
    fn sleep_ms(&self, ms: u64);
}

/// Wall clock: `Instant`-based, origin at construction.
pub struct SystemClock {
    origin: Instant,
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for SystemClock {
    fn now_ms(&self) -> u64 {
        self.origin.elapsed().as_millis() as u64
    }

    fn sleep_ms(&self, ms: u64) {
        std::thread::sleep(std::time::Duration::from_millis(ms));
    }
}
