//! Periodic task runner.
//!
//! Every periodic task (physics, control) runs the same loop: execute the
//! body, record timing, then sleep until the next absolute wake time. Sleeping
//! waits on the shared [`StopSignal`], so a stop request wakes every task
//! immediately instead of at the end of its period.
//!
//! A body that overruns its period is counted and the schedule restarts from
//! now; missed activations are not replayed.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::{Condvar, Mutex};
use tracing::{debug, warn};

// ─── Cycle Statistics ───────────────────────────────────────────────

/// Per-task timing statistics. O(1) update, no allocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CycleStats {
    /// Total activations executed.
    pub cycle_count: u64,
    /// Last body duration.
    pub last_cycle: Duration,
    /// Shortest body duration.
    pub min_cycle: Duration,
    /// Longest body duration.
    pub max_cycle: Duration,
    /// Running sum for the average.
    pub sum_cycle: Duration,
    /// Activations whose body outlasted the period.
    pub overruns: u64,
    /// Largest delay between the scheduled and the actual wake-up.
    pub max_latency: Duration,
}

impl CycleStats {
    /// Create zeroed stats.
    pub const fn new() -> Self {
        Self {
            cycle_count: 0,
            last_cycle: Duration::ZERO,
            min_cycle: Duration::MAX,
            max_cycle: Duration::ZERO,
            sum_cycle: Duration::ZERO,
            overruns: 0,
            max_latency: Duration::ZERO,
        }
    }

    /// Record one activation.
    #[inline]
    pub fn record(&mut self, duration: Duration, latency: Duration) {
        self.cycle_count += 1;
        self.last_cycle = duration;
        self.min_cycle = self.min_cycle.min(duration);
        self.max_cycle = self.max_cycle.max(duration);
        self.sum_cycle = self.sum_cycle.saturating_add(duration);
        self.max_latency = self.max_latency.max(latency);
    }

    /// Average body duration (zero if nothing ran).
    #[inline]
    pub fn avg_cycle(&self) -> Duration {
        match u32::try_from(self.cycle_count) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.sum_cycle / n,
            Err(_) => Duration::from_secs_f64(
                self.sum_cycle.as_secs_f64() / self.cycle_count as f64,
            ),
        }
    }
}

impl Default for CycleStats {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CycleStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.cycle_count == 0 {
            return f.write_str("cycles=0");
        }
        write!(
            f,
            "cycles={} min={:?} avg={:?} max={:?} overruns={} max_latency={:?}",
            self.cycle_count,
            self.min_cycle,
            self.avg_cycle(),
            self.max_cycle,
            self.overruns,
            self.max_latency
        )
    }
}

// ─── Stop Signal ────────────────────────────────────────────────────

/// Cooperative stop shared by every task.
///
/// Cloning shares the same flag. Once requested, a stop cannot be undone.
#[derive(Debug, Clone, Default)]
pub struct StopSignal {
    inner: Arc<(Mutex<bool>, Condvar)>,
}

impl StopSignal {
    /// Signal that is not yet stopped.
    pub fn new() -> Self {
        Self::default()
    }

    /// Request a stop and wake every waiter.
    pub fn request_stop(&self) {
        let (flag, cvar) = &*self.inner;
        *flag.lock() = true;
        cvar.notify_all();
    }

    /// Whether a stop was requested.
    pub fn is_stopped(&self) -> bool {
        *self.inner.0.lock()
    }

    /// Wait until `deadline` or a stop request. Returns `true` if stopped.
    pub fn wait_until(&self, deadline: Instant) -> bool {
        let (flag, cvar) = &*self.inner;
        let mut stopped = flag.lock();
        while !*stopped {
            if cvar.wait_until(&mut stopped, deadline).timed_out() {
                break;
            }
        }
        *stopped
    }

    /// Wait at most `timeout`. Returns `true` if stopped.
    pub fn wait_timeout(&self, timeout: Duration) -> bool {
        match Instant::now().checked_add(timeout) {
            Some(deadline) => self.wait_until(deadline),
            None => {
                self.wait();
                true
            }
        }
    }

    /// Block until a stop is requested.
    pub fn wait(&self) {
        let (flag, cvar) = &*self.inner;
        let mut stopped = flag.lock();
        while !*stopped {
            cvar.wait(&mut stopped);
        }
    }
}

// ─── Periodic Loop ──────────────────────────────────────────────────

/// Run `body` every `period` until `stop` is requested.
///
/// The first activation runs immediately. `body` receives the activation
/// index. Returns the task's timing statistics.
pub fn run_periodic<F>(task: &str, period: Duration, stop: &StopSignal, mut body: F) -> CycleStats
where
    F: FnMut(u64),
{
    let mut stats = CycleStats::new();
    let mut next_wake = Instant::now();

    debug!(task, ?period, "periodic task started");
    while !stop.is_stopped() {
        let cycle_start = Instant::now();
        let latency = cycle_start.saturating_duration_since(next_wake);

        body(stats.cycle_count);

        let elapsed = cycle_start.elapsed();
        stats.record(elapsed, latency);
        if elapsed > period {
            stats.overruns += 1;
            warn!(task, ?elapsed, ?period, "cycle overrun");
        }

        next_wake += period;
        let now = Instant::now();
        if next_wake < now {
            next_wake = now;
        }
        if stop.wait_until(next_wake) {
            break;
        }
    }
    debug!(task, cycles = stats.cycle_count, "periodic task stopped");
    stats
}
