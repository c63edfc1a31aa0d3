//! Physical process: the water in the boiler.
//!
//! One discrete step adds the pump inflow and removes the vapor outflow.
//! Vapor only leaves a non-empty vessel. The quantity is clamped to
//! `[0, capacity]` after every mutation.

use boiler_common::config::ProcessLimits;
use parking_lot::Mutex;

/// Consistent view of the process taken under one lock.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ProcessSnapshot {
    /// Water quantity (q).
    pub quantity: f64,
    /// Pump inflow per step (p).
    pub pump_throughput: f64,
    /// Vapor setpoint per step (v).
    pub vapor_throughput: f64,
}

#[derive(Debug)]
struct ProcessState {
    quantity: f64,
    pump_throughput: f64,
    vapor_throughput: f64,
}

/// The boiler vessel.
#[derive(Debug)]
pub struct Boiler {
    limits: ProcessLimits,
    state: Mutex<ProcessState>,
}

/// Non-finite inputs are treated as zero flow.
#[inline]
fn finite_or_zero(value: f64) -> f64 {
    if value.is_finite() { value } else { 0.0 }
}

impl Boiler {
    /// Create a boiler holding `initial_quantity`, clamped into `[0, capacity]`.
    pub fn new(limits: ProcessLimits, initial_quantity: f64) -> Self {
        Self {
            state: Mutex::new(ProcessState {
                quantity: limits.clamp_quantity(finite_or_zero(initial_quantity)),
                pump_throughput: 0.0,
                vapor_throughput: 0.0,
            }),
            limits,
        }
    }

    /// Fixed thresholds of this boiler.
    #[inline]
    pub fn limits(&self) -> &ProcessLimits {
        &self.limits
    }

    /// Record the aggregate pump inflow per step.
    pub fn set_pump_throughput(&self, throughput: f64) {
        self.state.lock().pump_throughput = finite_or_zero(throughput).max(0.0);
    }

    /// Set the vapor outflow per step, clamped into `[0, max_vapor_rate]`.
    pub fn set_vapor_throughput(&self, throughput: f64) {
        self.state.lock().vapor_throughput = self.limits.clamp_vapor(finite_or_zero(throughput));
    }

    /// Advance the process by one step.
    pub fn integrate_one_step(&self) -> ProcessSnapshot {
        let mut s = self.state.lock();
        let vapor_out = if s.quantity > 0.0 {
            s.vapor_throughput
        } else {
            0.0
        };
        s.quantity = self
            .limits
            .clamp_quantity(s.quantity + s.pump_throughput - vapor_out);
        ProcessSnapshot {
            quantity: s.quantity,
            pump_throughput: s.pump_throughput,
            vapor_throughput: s.vapor_throughput,
        }
    }

    /// Remove `amount` of water from outside the integration law (valve).
    /// Returns the new quantity.
    pub fn drain(&self, amount: f64) -> f64 {
        let mut s = self.state.lock();
        s.quantity = self
            .limits
            .clamp_quantity(s.quantity - finite_or_zero(amount));
        s.quantity
    }

    /// Current water quantity.
    pub fn quantity(&self) -> f64 {
        self.state.lock().quantity
    }

    /// Current pump inflow per step.
    pub fn pump_throughput(&self) -> f64 {
        self.state.lock().pump_throughput
    }

    /// Current vapor outflow setpoint per step.
    pub fn vapor_throughput(&self) -> f64 {
        self.state.lock().vapor_throughput
    }

    /// All three values under one lock.
    pub fn snapshot(&self) -> ProcessSnapshot {
        let s = self.state.lock();
        ProcessSnapshot {
            quantity: s.quantity,
            pump_throughput: s.pump_throughput,
            vapor_throughput: s.vapor_throughput,
        }
    }

    /// `q <= M1`.
    pub fn is_under_min(&self) -> bool {
        self.limits.is_under_min(self.quantity())
    }

    /// `q >= M2`.
    pub fn is_over_max(&self) -> bool {
        self.limits.is_over_max(self.quantity())
    }

    /// `N1 <= q <= N2`.
    pub fn is_in_normal_band(&self) -> bool {
        self.limits.is_in_normal_band(self.quantity())
    }
}
