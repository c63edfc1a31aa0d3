//! System-wide constants for the boiler workspace.
//!
//! Single source of truth for the reference boiler and the scheduler defaults.
//! Every configuration default points here.

// ─── Reference Boiler ───────────────────────────────────────────────

/// Vessel capacity (C).
pub const CAPACITY: f64 = 1000.0;

/// Lower safety limit (M1). `q <= M1` is a safety violation.
pub const MIN_SAFE: f64 = 150.0;

/// Upper safety limit (M2). `q >= M2` is a safety violation.
pub const MAX_SAFE: f64 = 850.0;

/// Lower bound of the normal band (N1).
pub const NORMAL_LOW: f64 = 400.0;

/// Upper bound of the normal band (N2).
pub const NORMAL_HIGH: f64 = 600.0;

/// Maximum vapor outflow per physics step (V).
pub const MAX_VAPOR_RATE: f64 = 10.0;

/// Rated throughput of one pump per physics step (P).
pub const PUMP_CAPACITY: f64 = 25.0;

/// Water quantity at startup.
pub const INITIAL_QUANTITY: f64 = 500.0;

/// Water removed per physics step while the evacuation valve is open.
pub const VALVE_DRAIN_PER_STEP: f64 = 10.0;

/// Pump ramp-up window after a start command, in physics steps.
pub const PUMP_STARTUP_DELAY_STEPS: u32 = 2;

// ─── Controller ─────────────────────────────────────────────────────

/// Consecutive clean cycles required before leaving EMERGENCY_STOP.
pub const SAFE_CYCLES_NEEDED: u32 = 3;

/// Vapor alarm threshold as a multiple of the maximum vapor rate.
pub const VAPOR_ALARM_FACTOR: f64 = 1.5;

/// Number of pumps feeding the boiler.
pub const PUMP_COUNT: usize = 2;

// ─── Scheduler ──────────────────────────────────────────────────────

/// Physics integration period [ms] (one process time unit).
pub const PHYSICS_PERIOD_MS: u64 = 1000;

/// Control cycle period [ms].
pub const CONTROL_PERIOD_MS: u64 = 5000;

/// Shortest random fault interval [s].
pub const FAULT_MIN_INTERVAL_SECS: u64 = 10;

/// Longest random fault interval [s].
pub const FAULT_MAX_INTERVAL_SECS: u64 = 60;
