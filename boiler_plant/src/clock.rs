//! Monotonic time sources.
//!
//! Pumps measure their startup ramp against a [`Clock`] instead of reading
//! wall-clock time directly. Production uses [`MonotonicClock`]; tests drive a
//! [`ManualClock`] forward explicitly so no test sleeps through a ramp.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, Instant};

/// Monotonic time source.
pub trait Clock: Send + Sync + fmt::Debug {
    /// Time elapsed since the clock's origin. Never decreases.
    fn now(&self) -> Duration;
}

/// `Instant`-backed clock. The origin is the construction instant.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    /// Create a clock whose origin is now.
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Manually advanced clock for deterministic tests.
///
/// Time only moves forward. Shared through `Arc` so a test can advance the
/// clock the pumps are reading.
#[derive(Debug, Default)]
pub struct ManualClock {
    now_us: AtomicU64,
}

impl ManualClock {
    /// Create a clock at time zero.
    pub fn new() -> Self {
        Self::default()
    }

    /// Advance time by `by`. Returns the new time.
    pub fn advance(&self, by: Duration) -> Duration {
        let by_us = u64::try_from(by.as_micros()).unwrap_or(u64::MAX);
        let prev = self.now_us.fetch_add(by_us, Ordering::AcqRel);
        Duration::from_micros(prev.saturating_add(by_us))
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        Duration::from_micros(self.now_us.load(Ordering::Acquire))
    }
}
