//! Feed pump with startup ramp.
//!
//! A pump delivers its rated capacity only when it is working (physical
//! health, changed by fault injection), running (commanded by the controller)
//! and the startup ramp has elapsed since the last start command.

use parking_lot::Mutex;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use crate::clock::Clock;

/// Consistent view of one pump, taken under its lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PumpStatus {
    /// Physically healthy.
    pub working: bool,
    /// Commanded on.
    pub running: bool,
    /// Delivered inflow per step.
    pub throughput: f64,
}

#[derive(Debug)]
struct PumpState {
    working: bool,
    running: bool,
    /// Clock time of the last start command; `None` while stopped.
    ramp_started_at: Option<Duration>,
}

/// A single feed pump.
pub struct Pump {
    id: String,
    capacity: f64,
    startup_delay: Duration,
    clock: Arc<dyn Clock>,
    state: Mutex<PumpState>,
}

impl Pump {
    /// Create a working, stopped pump.
    pub fn new(
        id: impl Into<String>,
        capacity: f64,
        startup_delay: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            id: id.into(),
            capacity,
            startup_delay,
            clock,
            state: Mutex::new(PumpState {
                working: true,
                running: false,
                ramp_started_at: None,
            }),
        }
    }

    /// Pump identity used in log lines.
    pub fn id(&self) -> &str {
        &self.id
    }

    /// Rated throughput per step.
    pub fn capacity(&self) -> f64 {
        self.capacity
    }

    fn throughput_locked(&self, s: &PumpState) -> f64 {
        if !s.working || !s.running {
            return 0.0;
        }
        match s.ramp_started_at {
            Some(started) if self.clock.now().saturating_sub(started) >= self.startup_delay => {
                self.capacity
            }
            _ => 0.0,
        }
    }

    /// Delivered inflow per step. Side-effect free.
    pub fn throughput(&self) -> f64 {
        let s = self.state.lock();
        self.throughput_locked(&s)
    }

    /// Working, running and throughput under one lock.
    pub fn status(&self) -> PumpStatus {
        let s = self.state.lock();
        PumpStatus {
            working: s.working,
            running: s.running,
            throughput: self.throughput_locked(&s),
        }
    }

    /// Command the pump on or off.
    ///
    /// Starting a stopped pump records the ramp start; starting a running pump
    /// keeps the original ramp. A broken pump cannot be started.
    pub fn set_running(&self, running: bool) {
        let mut s = self.state.lock();
        if running {
            if !s.working {
                debug!(pump = %self.id, "start refused: pump is not working");
                return;
            }
            if !s.running {
                s.running = true;
                s.ramp_started_at = Some(self.clock.now());
                debug!(pump = %self.id, "pump started");
            }
        } else {
            if s.running {
                debug!(pump = %self.id, "pump stopped");
            }
            s.running = false;
            s.ramp_started_at = None;
        }
    }

    /// Commanded state.
    pub fn is_running(&self) -> bool {
        self.state.lock().running
    }

    /// Physical health.
    pub fn is_working(&self) -> bool {
        self.state.lock().working
    }

    /// Break the pump. A broken pump is never running.
    pub fn fail(&self) {
        let mut s = self.state.lock();
        s.working = false;
        s.running = false;
        s.ramp_started_at = None;
        warn!(pump = %self.id, "[EVENT] pump failed");
    }

    /// Repair the pump. It stays stopped until commanded on.
    pub fn repair(&self) {
        self.state.lock().working = true;
        info!(pump = %self.id, "[EVENT] pump repaired");
    }
}

impl fmt::Debug for Pump {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.state.lock();
        f.debug_struct("Pump")
            .field("id", &self.id)
            .field("capacity", &self.capacity)
            .field("working", &s.working)
            .field("running", &s.running)
            .finish()
    }
}
