//! The assembled plant.
//!
//! [`Plant`] bundles shared handles to every device. Cloning it clones the
//! handles, so the physics task, the controller and the fault injector all see
//! the same devices.

use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, info, warn};

use boiler_common::config::{BoilerConfig, PlantConfig, ProcessLimits};
use boiler_common::consts::PUMP_COUNT;

use crate::clock::Clock;
use crate::process::{Boiler, ProcessSnapshot};
use crate::pump::Pump;
use crate::sensor::Sensor;
use crate::valve::SafetyValve;

/// Outcome of one physics step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhysicsStep {
    /// Water removed by the open valve before integrating.
    pub drained: f64,
    /// Process state after integrating.
    pub snapshot: ProcessSnapshot,
    /// `q <= M1` after the step.
    pub under_min: bool,
    /// `q >= M2` after the step.
    pub over_max: bool,
}

/// Shared handles to every plant device.
#[derive(Debug, Clone)]
pub struct Plant {
    /// Water process.
    pub process: Arc<Boiler>,
    /// Feed pumps, `P1` then `P2`.
    pub pumps: [Arc<Pump>; PUMP_COUNT],
    /// Level sensor.
    pub level_sensor: Arc<Sensor>,
    /// Vapor sensor.
    pub vapor_sensor: Arc<Sensor>,
    /// Evacuation valve.
    pub valve: Arc<SafetyValve>,
    valve_drain_per_step: f64,
}

impl Plant {
    /// Build a plant with healthy devices, stopped pumps and a closed valve.
    ///
    /// `physics_period` is one process time unit; the pump ramp is counted in
    /// those units.
    pub fn new(
        limits: ProcessLimits,
        plant: &PlantConfig,
        physics_period: Duration,
        clock: Arc<dyn Clock>,
    ) -> Self {
        let process = Arc::new(Boiler::new(limits, plant.initial_quantity));
        let startup_delay = plant.pump_startup_delay(physics_period);
        let pump = |id: &str| {
            Arc::new(Pump::new(
                id,
                limits.pump_capacity,
                startup_delay,
                Arc::clone(&clock),
            ))
        };
        Self {
            pumps: [pump("P1"), pump("P2")],
            level_sensor: Arc::new(Sensor::level(Arc::clone(&process))),
            vapor_sensor: Arc::new(Sensor::vapor(Arc::clone(&process))),
            valve: Arc::new(SafetyValve::new()),
            valve_drain_per_step: plant.valve_drain_per_step,
            process,
        }
    }

    /// Build the plant described by a full configuration.
    pub fn from_config(config: &BoilerConfig, clock: Arc<dyn Clock>) -> Self {
        Self::new(
            config.limits,
            &config.plant,
            config.schedule.physics_period(),
            clock,
        )
    }

    /// Water removed per step while the valve is open.
    pub fn valve_drain_per_step(&self) -> f64 {
        self.valve_drain_per_step
    }

    /// Pumps that are physically healthy.
    pub fn healthy_pumps(&self) -> usize {
        self.pumps.iter().filter(|p| p.is_working()).count()
    }

    /// Sum of the delivered pump throughputs.
    pub fn total_pump_throughput(&self) -> f64 {
        self.pumps.iter().map(|p| p.throughput()).sum()
    }

    /// One physics activation: drain through the open valve, integrate,
    /// report threshold alerts.
    pub fn physics_step(&self) -> PhysicsStep {
        let drained = if self.valve.is_open() {
            let before = self.process.quantity();
            before - self.process.drain(self.valve_drain_per_step)
        } else {
            0.0
        };

        let snapshot = self.process.integrate_one_step();
        let limits = self.process.limits();
        let under_min = limits.is_under_min(snapshot.quantity);
        let over_max = limits.is_over_max(snapshot.quantity);

        debug!(
            q = snapshot.quantity,
            p = snapshot.pump_throughput,
            v = snapshot.vapor_throughput,
            drained,
            "[PHYSICS] step"
        );
        if under_min {
            warn!(q = snapshot.quantity, m1 = limits.min_safe, "[PHYSICS][ALERT] q <= M1");
        }
        if over_max {
            warn!(q = snapshot.quantity, m2 = limits.max_safe, "[PHYSICS][ALERT] q >= M2");
        }

        PhysicsStep {
            drained,
            snapshot,
            under_min,
            over_max,
        }
    }

    /// Stop both pumps, close the valve and zero the setpoints.
    pub fn force_safe_state(&self) {
        for pump in &self.pumps {
            pump.set_running(false);
        }
        self.valve.close();
        self.process.set_pump_throughput(0.0);
        self.process.set_vapor_throughput(0.0);
        info!(q = self.process.quantity(), "Plant forced into safe state");
    }
}
