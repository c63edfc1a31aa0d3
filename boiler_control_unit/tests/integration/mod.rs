//! Shared fixtures.

mod modes;
mod properties;
mod recovery;
mod salvage;
mod scheduler;

use std::sync::Arc;
use std::time::Duration;

use boiler_common::config::{BoilerConfig, PlantConfig};
use boiler_control_unit::{Controller, CycleReport};
use boiler_plant::{ManualClock, Plant};

/// Controller wired to a plant with a manual clock.
pub struct Rig {
    pub controller: Controller,
    pub plant: Plant,
    pub clock: Arc<ManualClock>,
}

impl Rig {
    pub fn new(config: &BoilerConfig) -> Self {
        let clock = Arc::new(ManualClock::new());
        let plant = Plant::from_config(config, clock.clone());
        let controller = Controller::from_config(plant.clone(), config);
        Self {
            controller,
            plant,
            clock,
        }
    }

    /// Reference boiler.
    pub fn reference() -> Self {
        Self::new(&BoilerConfig::default())
    }

    /// Reference boiler starting at `q0`.
    pub fn with_level(q0: f64) -> Self {
        Self::new(&BoilerConfig {
            plant: PlantConfig {
                initial_quantity: q0,
                ..PlantConfig::default()
            },
            ..BoilerConfig::default()
        })
    }

    pub fn cycle(&mut self) -> CycleReport {
        self.controller.control_cycle()
    }

    /// Reference boiler that has completed startup into NORMAL.
    pub fn settled() -> Self {
        let mut rig = Self::reference();
        rig.cycle();
        rig
    }

    /// Move the water level to `q` without running physics.
    pub fn set_level(&self, q: f64) {
        let current = self.plant.process.quantity();
        self.plant.process.drain(current - q);
    }

    /// Let the pump ramp elapse.
    pub fn finish_ramp(&self) {
        self.clock.advance(Duration::from_secs(2));
    }

    /// One control period of physics: five steps with the clock advancing.
    pub fn physics_period(&self) {
        for _ in 0..5 {
            self.clock.advance(Duration::from_secs(1));
            self.plant.physics_step();
        }
    }
}
