//! Controller operating modes.
//!
//! `#[repr(u8)]` like the rest of the workspace's state enums so a mode can be
//! carried as a single byte in diagnostics.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU8, Ordering};

/// Operating mode of the boiler controller.
///
/// Exactly one mode is active at any time. There is no terminal mode:
/// `EmergencyStop` is left after enough consecutive clean cycles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[repr(u8)]
pub enum Mode {
    /// Startup: bring the level into the normal band before producing vapor.
    #[default]
    Initialization = 0,
    /// Both pumps healthy, level sensor trusted.
    Normal = 1,
    /// At least one pump failed; a single pump regulates the level.
    Degraded = 2,
    /// Level sensor untrusted (SALVAMENTO); the level is dead-reckoned.
    Salvage = 3,
    /// Safety lock: pumps stopped, valve closed, no vapor.
    EmergencyStop = 4,
}

impl Mode {
    /// Convert from raw `u8`. Returns `None` for invalid values.
    #[inline]
    pub const fn from_u8(value: u8) -> Option<Self> {
        match value {
            0 => Some(Self::Initialization),
            1 => Some(Self::Normal),
            2 => Some(Self::Degraded),
            3 => Some(Self::Salvage),
            4 => Some(Self::EmergencyStop),
            _ => None,
        }
    }

    /// Operating mode chosen from pump health once the level is trusted.
    #[inline]
    pub const fn for_pump_health(healthy_pumps: usize) -> Self {
        if healthy_pumps < 2 {
            Self::Degraded
        } else {
            Self::Normal
        }
    }

    /// Whether the controller is actively producing vapor in this mode.
    #[inline]
    pub const fn is_operating(self) -> bool {
        matches!(self, Self::Normal | Self::Degraded | Self::Salvage)
    }

    /// Log label.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Initialization => "INITIALIZATION",
            Self::Normal => "NORMAL",
            Self::Degraded => "DEGRADED",
            Self::Salvage => "SALVAMENTO",
            Self::EmergencyStop => "EMERGENCY_STOP",
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Lock-free mirror of the controller mode for observers on other threads.
///
/// Only the control task stores; anyone may load.
#[derive(Debug, Default)]
pub struct ModeCell(AtomicU8);

impl ModeCell {
    /// Cell holding `mode`.
    pub fn new(mode: Mode) -> Self {
        Self(AtomicU8::new(mode as u8))
    }

    #[inline]
    /// Last stored mode.
    pub fn load(&self) -> Mode {
        // Only valid discriminants are ever stored.
        Mode::from_u8(self.0.load(Ordering::Acquire)).unwrap_or(Mode::EmergencyStop)
    }

    #[inline]
    /// Publish `mode`.
    pub fn store(&self, mode: Mode) {
        self.0.store(mode as u8, Ordering::Release);
    }
}
