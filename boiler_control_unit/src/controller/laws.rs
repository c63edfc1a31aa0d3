//! Per-mode control laws.
//!
//! Each law maps the sampled readings to actuator commands. Laws never touch
//! the plant; [`Controller`](super::Controller) applies the commands.

use boiler_common::config::ProcessLimits;
use boiler_common::consts::PUMP_COUNT;
use boiler_plant::PumpStatus;

/// Command for one pump.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PumpCommand {
    /// Leave the pump as it is.
    #[default]
    Hold,
    /// Start (or keep running).
    Run,
    /// Stop.
    Stop,
}

/// Command for the evacuation valve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ValveCommand {
    /// Leave the valve as it is.
    #[default]
    Hold,
    /// Open.
    Open,
    /// Close.
    Close,
}

/// Everything the controller applies at the end of a cycle.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Commands {
    /// One command per pump, `P1` then `P2`.
    pub pumps: [PumpCommand; PUMP_COUNT],
    /// Valve command.
    pub valve: ValveCommand,
    /// Vapor outflow setpoint pushed into the process.
    pub vapor_setpoint: f64,
}

impl Commands {
    /// Touch nothing, set the vapor setpoint.
    pub const fn hold(vapor_setpoint: f64) -> Self {
        Self {
            pumps: [PumpCommand::Hold; PUMP_COUNT],
            valve: ValveCommand::Hold,
            vapor_setpoint,
        }
    }

    /// Pumps stopped, valve closed, no vapor.
    pub const fn safe_stop() -> Self {
        Self {
            pumps: [PumpCommand::Stop; PUMP_COUNT],
            valve: ValveCommand::Close,
            vapor_setpoint: 0.0,
        }
    }

    const fn all_pumps(command: PumpCommand, vapor_setpoint: f64) -> Self {
        Self {
            pumps: [command; PUMP_COUNT],
            valve: ValveCommand::Hold,
            vapor_setpoint,
        }
    }

    /// `selected` gets `command`, every other pump is stopped.
    fn single_pump(selected: Option<usize>, command: PumpCommand, vapor_setpoint: f64) -> Self {
        let mut pumps = [PumpCommand::Stop; PUMP_COUNT];
        if let Some(i) = selected {
            pumps[i] = command;
        }
        Self {
            pumps,
            valve: ValveCommand::Hold,
            vapor_setpoint,
        }
    }
}

/// Two-threshold law: run below `N1`, stop above `N2`, hold inside the band.
#[inline]
pub fn band_command(level: f64, limits: &ProcessLimits) -> PumpCommand {
    if level < limits.normal_low {
        PumpCommand::Run
    } else if level > limits.normal_high {
        PumpCommand::Stop
    } else {
        PumpCommand::Hold
    }
}

/// First healthy pump, if any.
#[inline]
pub fn select_pump(pumps: &[PumpStatus; PUMP_COUNT]) -> Option<usize> {
    pumps.iter().position(|p| p.working)
}

/// Startup law result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Startup {
    /// Commands for this cycle.
    pub commands: Commands,
    /// Level reached the normal band; startup is complete.
    pub settled: bool,
}

/// INITIALIZATION: fill below `N1`, evacuate above `N2`, settle inside the
/// band. No vapor is produced.
pub fn initialization(level: Option<f64>, limits: &ProcessLimits) -> Startup {
    let Some(level) = level else {
        return Startup {
            commands: Commands::hold(0.0),
            settled: false,
        };
    };
    if level < limits.normal_low {
        Startup {
            commands: Commands::all_pumps(PumpCommand::Run, 0.0),
            settled: false,
        }
    } else if level > limits.normal_high {
        Startup {
            commands: Commands {
                valve: ValveCommand::Open,
                ..Commands::hold(0.0)
            },
            settled: false,
        }
    } else {
        Startup {
            commands: Commands::safe_stop(),
            settled: true,
        }
    }
}

/// EMERGENCY_STOP.
pub const fn emergency_stop() -> Commands {
    Commands::safe_stop()
}

/// NORMAL: both pumps follow the two-threshold law.
pub fn normal(level: Option<f64>, limits: &ProcessLimits) -> Commands {
    match level {
        Some(level) => Commands::all_pumps(band_command(level, limits), limits.max_vapor_rate),
        None => Commands::hold(limits.max_vapor_rate),
    }
}

/// DEGRADED: the first healthy pump follows the two-threshold law, the other
/// pump is stopped. Without a healthy pump both are stopped.
pub fn degraded(
    level: Option<f64>,
    pumps: &[PumpStatus; PUMP_COUNT],
    limits: &ProcessLimits,
) -> Commands {
    let command = level.map_or(PumpCommand::Hold, |l| band_command(l, limits));
    Commands::single_pump(select_pump(pumps), command, limits.max_vapor_rate)
}

/// SALVAMENTO law result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SalvageStep {
    /// Dead-reckoned level after this cycle.
    pub estimate: f64,
    /// Throughput credited to the estimate.
    pub credited_throughput: f64,
    /// Commands for this cycle.
    pub commands: Commands,
}

/// SALVAMENTO: dead-reckon the level from the selected pump and the vapor
/// setpoint over one control interval, then apply the two-threshold law to
/// the estimate.
pub fn salvage(
    estimate: f64,
    vapor_setpoint: f64,
    pumps: &[PumpStatus; PUMP_COUNT],
    limits: &ProcessLimits,
    interval: f64,
) -> SalvageStep {
    let selected = select_pump(pumps);
    let credited_throughput = selected
        .map(|i| pumps[i])
        .filter(|p| p.running)
        .map_or(0.0, |p| p.throughput);
    let estimate = estimate + (credited_throughput - vapor_setpoint) * interval;
    SalvageStep {
        estimate,
        credited_throughput,
        commands: Commands::single_pump(
            selected,
            band_command(estimate, limits),
            vapor_setpoint,
        ),
    }
}
