//! The boiler controller.
//!
//! One control cycle:
//!
//! 1. Sample both sensors and both pumps; push the aggregate pump throughput
//!    into the process.
//! 2. [`decide`]: violation detection, debounce, arbitration, per-mode law.
//! 3. Apply the commands to pumps and valve, push the vapor setpoint.
//! 4. Re-aggregate pump throughput into the process.
//!
//! Only steps 1, 3 and 4 touch the plant.

pub mod decide;
pub mod laws;
pub mod safety;

use std::sync::Arc;
use tracing::{debug, info, warn};

use boiler_common::config::BoilerConfig;
use boiler_common::mode::{Mode, ModeCell};
use boiler_plant::Plant;

pub use decide::{
    ControllerState, CycleInputs, Decision, DecisionParams, Transition, TransitionReason, decide,
};
pub use laws::{Commands, PumpCommand, ValveCommand};
pub use safety::Violation;

/// What one control cycle did.
#[derive(Debug, Clone, PartialEq)]
pub struct CycleReport {
    /// Cycle index, starting at 0.
    pub cycle: u64,
    /// Sampled inputs.
    pub inputs: CycleInputs,
    /// Mode at the start of the cycle.
    pub mode_before: Mode,
    /// Mode at the end of the cycle.
    pub mode: Mode,
    /// Violation detected, if any.
    pub violation: Option<Violation>,
    /// Mode changes during the cycle.
    pub transitions: Vec<Transition>,
    /// Commands applied.
    pub commands: Commands,
    /// Aggregate pump throughput pushed into the process at the end.
    pub pump_throughput: f64,
}

/// Owns the controller state and drives the plant.
#[derive(Debug)]
pub struct Controller {
    plant: Plant,
    params: DecisionParams,
    state: ControllerState,
    mode_cell: Arc<ModeCell>,
    cycles: u64,
}

fn fmt_reading(reading: Option<f64>) -> String {
    reading.map_or_else(|| "NULL".to_string(), |v| format!("{v:.2}"))
}

impl Controller {
    /// Controller in INITIALIZATION driving `plant`.
    pub fn new(plant: Plant, params: DecisionParams) -> Self {
        Self {
            plant,
            params,
            state: ControllerState::default(),
            mode_cell: Arc::new(ModeCell::default()),
            cycles: 0,
        }
    }

    /// Controller with the parameters of a validated configuration.
    pub fn from_config(plant: Plant, config: &BoilerConfig) -> Self {
        Self::new(plant, DecisionParams::from_config(config))
    }

    /// Current mode.
    #[inline]
    pub fn mode(&self) -> Mode {
        self.state.mode
    }

    /// State carried between cycles.
    #[inline]
    pub fn state(&self) -> &ControllerState {
        &self.state
    }

    /// Decision parameters.
    #[inline]
    pub fn params(&self) -> &DecisionParams {
        &self.params
    }

    /// Plant driven by this controller.
    #[inline]
    pub fn plant(&self) -> &Plant {
        &self.plant
    }

    /// Completed cycles.
    #[inline]
    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    /// Shared mirror of the mode, updated after every cycle.
    pub fn mode_cell(&self) -> Arc<ModeCell> {
        Arc::clone(&self.mode_cell)
    }

    /// Read sensors and pump status.
    pub fn sample(&self) -> CycleInputs {
        let [p1, p2] = &self.plant.pumps;
        CycleInputs {
            level: self.plant.level_sensor.read(),
            vapor: self.plant.vapor_sensor.read(),
            pumps: [p1.status(), p2.status()],
        }
    }

    /// Run one full control cycle.
    pub fn control_cycle(&mut self) -> CycleReport {
        let cycle = self.cycles;
        let inputs = self.sample();
        self.plant
            .process
            .set_pump_throughput(inputs.total_throughput());

        info!(
            cycle,
            mode = %self.state.mode,
            level = %fmt_reading(inputs.level),
            vapor = %fmt_reading(inputs.vapor),
            pumps_ok = inputs.healthy_pumps(),
            "[CONTROL] start"
        );

        let mode_before = self.state.mode;
        let decision = decide(&self.state, &inputs, &self.params);

        if let Some(v) = decision.violation {
            if mode_before == Mode::EmergencyStop {
                debug!(violation = %v, "[CONTROL] still unsafe");
            } else {
                warn!(violation = %v, "[ALERT] safety violation -> EMERGENCY_STOP");
            }
        }
        for t in &decision.transitions {
            info!(from = %t.from, to = %t.to, reason = %t.reason, "[MODE] transition");
        }
        if decision.estimate_seeded {
            info!(
                estimate = decision.state.estimated_level,
                "[SALVAMENTO] dead-reckoning seeded"
            );
        }
        if decision.state.mode == Mode::Salvage {
            debug!(estimate = decision.state.estimated_level, "[SALVAMENTO] estimate");
        }

        self.apply(&decision.commands);
        self.state = decision.state;
        self.mode_cell.store(self.state.mode);
        self.cycles += 1;

        let pump_throughput = self.plant.total_pump_throughput();
        self.plant.process.set_pump_throughput(pump_throughput);

        let [p1, p2] = &self.plant.pumps;
        info!(
            cycle,
            mode = %self.state.mode,
            p1_running = p1.is_running(),
            p2_running = p2.is_running(),
            throughput = pump_throughput,
            "[CONTROL] end"
        );

        CycleReport {
            cycle,
            inputs,
            mode_before,
            mode: self.state.mode,
            violation: decision.violation,
            transitions: decision.transitions,
            commands: decision.commands,
            pump_throughput,
        }
    }

    fn apply(&self, commands: &Commands) {
        for (pump, command) in self.plant.pumps.iter().zip(commands.pumps) {
            match command {
                PumpCommand::Run => pump.set_running(true),
                PumpCommand::Stop => pump.set_running(false),
                PumpCommand::Hold => {}
            }
        }
        match commands.valve {
            ValveCommand::Open => {
                self.plant.valve.open();
            }
            ValveCommand::Close => {
                self.plant.valve.close();
            }
            ValveCommand::Hold => {}
        }
        self.plant
            .process
            .set_vapor_throughput(commands.vapor_setpoint);
    }

    /// Force EMERGENCY_STOP outside the cycle schedule and put the plant in
    /// its safe state.
    pub fn force_emergency_stop(&mut self) -> Option<Transition> {
        let transition = (self.state.mode != Mode::EmergencyStop).then(|| Transition {
            from: self.state.mode,
            to: Mode::EmergencyStop,
            reason: TransitionReason::Shutdown,
        });
        if let Some(t) = &transition {
            info!(from = %t.from, to = %t.to, reason = %t.reason, "[MODE] transition");
        }
        self.state.mode = Mode::EmergencyStop;
        self.state.safe_cycles = 0;
        self.state.estimated_level = None;
        self.mode_cell.store(Mode::EmergencyStop);
        self.plant.force_safe_state();
        transition
    }
}
