//! Safety violation detection and the EMERGENCY_STOP debounce.
//!
//! Detection is evaluated once per cycle on the sampled readings. A violation
//! forces EMERGENCY_STOP and resets the clean-cycle counter; leaving
//! EMERGENCY_STOP requires `safe_cycles_needed` consecutive clean cycles.

use std::fmt;

use boiler_common::config::ProcessLimits;
use boiler_common::mode::Mode;

use super::decide::CycleInputs;

/// Reason a cycle is unsafe.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Violation {
    /// Level reading outside the exclusive safe band `(M1, M2)`.
    LevelOutOfBand {
        /// Offending reading.
        level: f64,
    },
    /// Neither sensor delivers a reading.
    BothSensorsLost,
    /// Vapor reading above `factor * V`.
    VaporTooHigh {
        /// Offending reading.
        vapor: f64,
    },
    /// Startup cannot proceed without a level reading.
    LevelMissingAtStartup,
    /// Vapor must not flow before startup completes.
    VaporBeforeStartup {
        /// Offending reading.
        vapor: f64,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LevelOutOfBand { level } => write!(f, "level {level:.2} outside safe band"),
            Self::BothSensorsLost => f.write_str("level and vapor sensors both lost"),
            Self::VaporTooHigh { vapor } => write!(f, "vapor {vapor:.2} above alarm limit"),
            Self::LevelMissingAtStartup => f.write_str("no level reading during initialization"),
            Self::VaporBeforeStartup { vapor } => {
                write!(f, "vapor {vapor:.2} flowing during initialization")
            }
        }
    }
}

/// Check one cycle's readings for a safety violation.
///
/// Outside INITIALIZATION the first matching rule wins in the order: level
/// out of band, both sensors lost, vapor too high.
pub fn detect(
    mode: Mode,
    inputs: &CycleInputs,
    limits: &ProcessLimits,
    vapor_alarm_factor: f64,
) -> Option<Violation> {
    if mode == Mode::Initialization {
        return match (inputs.level, inputs.vapor) {
            (None, _) => Some(Violation::LevelMissingAtStartup),
            (Some(_), Some(vapor)) if vapor > 0.0 => Some(Violation::VaporBeforeStartup { vapor }),
            _ => None,
        };
    }

    if let Some(level) = inputs.level {
        if !limits.is_in_safe_band(level) {
            return Some(Violation::LevelOutOfBand { level });
        }
    }
    match (inputs.level, inputs.vapor) {
        (None, None) => Some(Violation::BothSensorsLost),
        (_, Some(vapor)) if vapor > limits.max_vapor_rate * vapor_alarm_factor => {
            Some(Violation::VaporTooHigh { vapor })
        }
        _ => None,
    }
}

/// Outcome of the debounce step.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Debounce {
    /// A violation forced (or kept) EMERGENCY_STOP.
    Tripped,
    /// Still in EMERGENCY_STOP, counting clean cycles.
    Counting(u32),
    /// Enough clean cycles: leave EMERGENCY_STOP.
    Recovered,
    /// Not in EMERGENCY_STOP and no violation.
    Clear,
}

/// Clean-cycle counter guarding recovery from EMERGENCY_STOP.
///
/// The counter saturates at `needed` outside EMERGENCY_STOP and resets to 0
/// on every violation and on recovery.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SafeCycleCounter {
    count: u32,
}

impl SafeCycleCounter {
    /// Counter at `count`.
    pub const fn new(count: u32) -> Self {
        Self { count }
    }

    /// Current count.
    #[inline]
    pub const fn count(&self) -> u32 {
        self.count
    }

    /// Advance by one cycle.
    pub fn step(&mut self, in_emergency_stop: bool, violated: bool, needed: u32) -> Debounce {
        if violated {
            self.count = 0;
            return Debounce::Tripped;
        }
        if in_emergency_stop {
            self.count = self.count.saturating_add(1);
            if self.count >= needed {
                self.count = 0;
                Debounce::Recovered
            } else {
                Debounce::Counting(self.count)
            }
        } else {
            self.count = self.count.saturating_add(1).min(needed);
            Debounce::Clear
        }
    }
}
