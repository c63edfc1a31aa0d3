//! The per-cycle decision.
//!
//! [`decide`] is a pure function of the controller state and one cycle's
//! sampled inputs. It runs, in order: violation detection, the EMERGENCY_STOP
//! debounce, secondary arbitration (level sensor, pump health) and the
//! per-mode law. The caller applies the returned commands.

use std::fmt;

use boiler_common::config::{BoilerConfig, ProcessLimits};
use boiler_common::consts::PUMP_COUNT;
use boiler_common::mode::Mode;
use boiler_plant::PumpStatus;

use super::laws::{self, Commands};
use super::safety::{self, Debounce, SafeCycleCounter, Violation};

/// State owned by the controller, mutated only by a control cycle.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ControllerState {
    /// Active mode.
    pub mode: Mode,
    /// Consecutive clean cycles.
    pub safe_cycles: u32,
    /// Dead-reckoned level. `Some` only while in SALVAMENTO and seeded.
    pub estimated_level: Option<f64>,
    /// Most recent level reading.
    pub last_known_level: Option<f64>,
}

/// Readings sampled at the start of a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CycleInputs {
    /// Level reading; `None` while the level sensor is failed.
    pub level: Option<f64>,
    /// Vapor reading; `None` while the vapor sensor is failed.
    pub vapor: Option<f64>,
    /// Pump status, `P1` then `P2`.
    pub pumps: [PumpStatus; PUMP_COUNT],
}

impl CycleInputs {
    /// Physically healthy pumps.
    pub fn healthy_pumps(&self) -> usize {
        self.pumps.iter().filter(|p| p.working).count()
    }

    /// Sum of delivered pump throughput.
    pub fn total_throughput(&self) -> f64 {
        self.pumps.iter().map(|p| p.throughput).sum()
    }
}

/// Fixed parameters of the decision.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DecisionParams {
    /// Process thresholds.
    pub limits: ProcessLimits,
    /// Clean cycles required to leave EMERGENCY_STOP.
    pub safe_cycles_needed: u32,
    /// Vapor alarm multiplier on `V`.
    pub vapor_alarm_factor: f64,
    /// Control-cycle length in process time units.
    pub dead_reckoning_interval: f64,
}

impl DecisionParams {
    /// Parameters for a validated configuration.
    pub fn from_config(config: &BoilerConfig) -> Self {
        Self {
            limits: config.limits,
            safe_cycles_needed: config.controller.safe_cycles_needed,
            vapor_alarm_factor: config.controller.vapor_alarm_factor,
            dead_reckoning_interval: config.schedule.steps_per_control_cycle(),
        }
    }
}

impl Default for DecisionParams {
    fn default() -> Self {
        Self::from_config(&BoilerConfig::default())
    }
}

/// Why the mode changed.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum TransitionReason {
    /// A safety violation tripped EMERGENCY_STOP.
    Violation(Violation),
    /// Enough clean cycles with a trusted level.
    Recovered,
    /// Enough clean cycles, but the level sensor is still failed.
    RecoveredBlind,
    /// Level sensor failed.
    LevelSensorLost,
    /// Level sensor repaired.
    LevelSensorRestored,
    /// Fewer than two healthy pumps.
    PumpLost,
    /// Both pumps healthy again.
    PumpsRestored,
    /// Startup brought the level into the normal band.
    LevelSettled,
    /// Explicit shutdown.
    Shutdown,
}

impl fmt::Display for TransitionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Violation(v) => write!(f, "safety violation: {v}"),
            Self::Recovered => f.write_str("safety conditions restored"),
            Self::RecoveredBlind => f.write_str("safety restored with level sensor failed"),
            Self::LevelSensorLost => f.write_str("level sensor failed"),
            Self::LevelSensorRestored => f.write_str("level sensor repaired"),
            Self::PumpLost => f.write_str("pump failure"),
            Self::PumpsRestored => f.write_str("both pumps healthy"),
            Self::LevelSettled => f.write_str("level inside normal band"),
            Self::Shutdown => f.write_str("shutdown requested"),
        }
    }
}

/// One mode change.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transition {
    /// Mode before.
    pub from: Mode,
    /// Mode after.
    pub to: Mode,
    /// Cause.
    pub reason: TransitionReason,
}

impl fmt::Display for Transition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} -> {} ({})", self.from, self.to, self.reason)
    }
}

/// Output of [`decide`].
#[derive(Debug, Clone, PartialEq)]
pub struct Decision {
    /// Controller state after the cycle.
    pub state: ControllerState,
    /// Commands to apply.
    pub commands: Commands,
    /// Violation detected this cycle.
    pub violation: Option<Violation>,
    /// Debounce outcome.
    pub debounce: Debounce,
    /// Mode changes in the order they happened.
    pub transitions: Vec<Transition>,
    /// The dead-reckoning estimate was seeded this cycle.
    pub estimate_seeded: bool,
}

fn switch(
    state: &mut ControllerState,
    transitions: &mut Vec<Transition>,
    to: Mode,
    reason: TransitionReason,
) {
    if state.mode == to {
        return;
    }
    transitions.push(Transition {
        from: state.mode,
        to,
        reason,
    });
    state.mode = to;
    // The estimate only lives inside one SALVAMENTO episode.
    state.estimated_level = None;
}

/// Decide one control cycle.
pub fn decide(state: &ControllerState, inputs: &CycleInputs, params: &DecisionParams) -> Decision {
    let limits = &params.limits;
    let healthy = inputs.healthy_pumps();
    let mut next = *state;
    let mut transitions = Vec::new();

    if inputs.level.is_some() {
        next.last_known_level = inputs.level;
    }

    // Detection and debounce.
    let violation = safety::detect(state.mode, inputs, limits, params.vapor_alarm_factor);
    let mut counter = SafeCycleCounter::new(next.safe_cycles);
    let debounce = counter.step(
        state.mode == Mode::EmergencyStop,
        violation.is_some(),
        params.safe_cycles_needed,
    );
    next.safe_cycles = counter.count();

    match (debounce, violation) {
        (Debounce::Tripped, Some(v)) => {
            switch(&mut next, &mut transitions, Mode::EmergencyStop, TransitionReason::Violation(v));
        }
        (Debounce::Recovered, _) if inputs.level.is_some() => {
            let to = Mode::for_pump_health(healthy);
            switch(&mut next, &mut transitions, to, TransitionReason::Recovered);
        }
        (Debounce::Recovered, _) => {
            switch(&mut next, &mut transitions, Mode::Salvage, TransitionReason::RecoveredBlind);
        }
        _ => {}
    }

    // Secondary arbitration.
    if next.mode.is_operating() {
        if inputs.level.is_none() {
            switch(&mut next, &mut transitions, Mode::Salvage, TransitionReason::LevelSensorLost);
        } else if next.mode == Mode::Salvage {
            let to = Mode::for_pump_health(healthy);
            switch(&mut next, &mut transitions, to, TransitionReason::LevelSensorRestored);
        } else if healthy < PUMP_COUNT {
            switch(&mut next, &mut transitions, Mode::Degraded, TransitionReason::PumpLost);
        } else if next.mode == Mode::Degraded {
            switch(&mut next, &mut transitions, Mode::Normal, TransitionReason::PumpsRestored);
        }
    }

    // Per-mode law.
    let mut estimate_seeded = false;
    let commands = match next.mode {
        Mode::Initialization => {
            let startup = laws::initialization(inputs.level, limits);
            if startup.settled {
                let to = Mode::for_pump_health(healthy);
                switch(&mut next, &mut transitions, to, TransitionReason::LevelSettled);
            }
            startup.commands
        }
        Mode::EmergencyStop => laws::emergency_stop(),
        Mode::Normal => laws::normal(inputs.level, limits),
        Mode::Degraded => laws::degraded(inputs.level, &inputs.pumps, limits),
        Mode::Salvage => {
            let vapor = inputs.vapor.unwrap_or(limits.max_vapor_rate);
            let seed = match next.estimated_level {
                Some(estimate) => estimate,
                None => {
                    estimate_seeded = true;
                    next.last_known_level.unwrap_or_else(|| limits.normal_midpoint())
                }
            };
            let step = laws::salvage(
                seed,
                vapor,
                &inputs.pumps,
                limits,
                params.dead_reckoning_interval,
            );
            next.estimated_level = Some(step.estimate);
            step.commands
        }
    };

    Decision {
        state: next,
        commands,
        violation,
        debounce,
        transitions,
        estimate_seeded,
    }
}
