//! Prelude module for common re-exports.
//!
//! ```rust
//! use boiler_common::prelude::*;
//! ```

// ─── Configuration ──────────────────────────────────────────────────
pub use crate::config::{
    BoilerConfig, ConfigError, ConfigLoader, ControllerConfig, FaultConfig, FaultTarget,
    LogLevel, PlantConfig, ProcessLimits, ScheduleConfig, ScriptedFault,
};

// ─── Controller ─────────────────────────────────────────────────────
pub use crate::mode::{Mode, ModeCell};

// ─── System Constants ───────────────────────────────────────────────
pub use crate::consts::{CAPACITY, PUMP_COUNT, SAFE_CYCLES_NEEDED};

// ─── Messaging ──────────────────────────────────────────────────────
pub use crate::bus::{Message, MessageBus};
