//! Configuration loading traits and types.
//!
//! One TOML file describes the whole simulation. Every field has a default
//! equal to the reference boiler in [`crate::consts`], so an empty file (or no
//! file at all) yields the reference scenario.
//!
//! # TOML Example
//!
//! ```toml
//! log_level = "debug"
//!
//! [limits]
//! capacity = 1000.0
//! min_safe = 150.0
//! max_safe = 850.0
//! normal_low = 400.0
//! normal_high = 600.0
//! max_vapor_rate = 10.0
//! pump_capacity = 25.0
//!
//! [schedule]
//! physics_period_ms = 1000
//! control_period_ms = 5000
//!
//! [faults]
//! enabled = true
//! seed = 7
//!
//! [[faults.script]]
//! after_ms = 12000
//! target = "level_sensor"
//! ```
//!
//! Threshold ordering and period relationships are checked by
//! [`BoilerConfig::validate`]; a violation is fatal at startup.

use serde::{Deserialize, Serialize};
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

use crate::consts::{
    CAPACITY, CONTROL_PERIOD_MS, FAULT_MAX_INTERVAL_SECS, FAULT_MIN_INTERVAL_SECS,
    INITIAL_QUANTITY, MAX_SAFE, MAX_VAPOR_RATE, MIN_SAFE, NORMAL_HIGH, NORMAL_LOW,
    PHYSICS_PERIOD_MS, PUMP_CAPACITY, PUMP_STARTUP_DELAY_STEPS, SAFE_CYCLES_NEEDED,
    VALVE_DRAIN_PER_STEP, VAPOR_ALARM_FACTOR,
};

/// Error type for configuration loading operations.
#[derive(Debug, Clone, Error)]
pub enum ConfigError {
    /// Configuration file not found at specified path.
    #[error("Configuration file not found")]
    FileNotFound,

    /// TOML parsing failed.
    #[error("Failed to parse configuration: {0}")]
    ParseError(String),

    /// Semantic validation failed.
    #[error("Configuration validation failed: {0}")]
    ValidationError(String),
}

/// Log level for application logging.
///
/// Uses lowercase serde values for TOML compatibility.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Most verbose, every physics step.
    Trace,
    /// Per-step process values and controller detail.
    Debug,
    /// Cycle summaries, transitions and device events.
    #[default]
    Info,
    /// Safety alerts only.
    Warn,
    /// Errors only.
    Error,
}

impl LogLevel {
    /// Directive string understood by `tracing_subscriber::EnvFilter`.
    pub const fn as_directive(self) -> &'static str {
        match self {
            Self::Trace => "trace",
            Self::Debug => "debug",
            Self::Info => "info",
            Self::Warn => "warn",
            Self::Error => "error",
        }
    }
}

// ─── Process Limits ─────────────────────────────────────────────────

/// Fixed thresholds and rates of the physical process.
///
/// Invariant (checked by [`ProcessLimits::validate`]):
/// `0 <= min_safe < normal_low < normal_high < max_safe <= capacity`.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ProcessLimits {
    /// Vessel capacity (C).
    pub capacity: f64,
    /// Lower safety limit (M1).
    pub min_safe: f64,
    /// Upper safety limit (M2).
    pub max_safe: f64,
    /// Normal band lower bound (N1).
    pub normal_low: f64,
    /// Normal band upper bound (N2).
    pub normal_high: f64,
    /// Maximum vapor outflow per step (V).
    pub max_vapor_rate: f64,
    /// Rated pump throughput per step (P).
    pub pump_capacity: f64,
}

impl Default for ProcessLimits {
    fn default() -> Self {
        Self {
            capacity: CAPACITY,
            min_safe: MIN_SAFE,
            max_safe: MAX_SAFE,
            normal_low: NORMAL_LOW,
            normal_high: NORMAL_HIGH,
            max_vapor_rate: MAX_VAPOR_RATE,
            pump_capacity: PUMP_CAPACITY,
        }
    }
}

impl ProcessLimits {
    /// Validate threshold ordering and rate signs.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let values = [
            ("capacity", self.capacity),
            ("min_safe", self.min_safe),
            ("max_safe", self.max_safe),
            ("normal_low", self.normal_low),
            ("normal_high", self.normal_high),
            ("max_vapor_rate", self.max_vapor_rate),
            ("pump_capacity", self.pump_capacity),
        ];
        for (name, value) in values {
            if !value.is_finite() {
                return Err(ConfigError::ValidationError(format!(
                    "limits.{name} must be finite, got {value}"
                )));
            }
        }

        let ordered = 0.0 <= self.min_safe
            && self.min_safe < self.normal_low
            && self.normal_low < self.normal_high
            && self.normal_high < self.max_safe
            && self.max_safe <= self.capacity;
        if !ordered {
            return Err(ConfigError::ValidationError(format!(
                "thresholds out of order: require 0 <= min_safe ({}) < normal_low ({}) \
                 < normal_high ({}) < max_safe ({}) <= capacity ({})",
                self.min_safe, self.normal_low, self.normal_high, self.max_safe, self.capacity
            )));
        }
        if self.max_vapor_rate <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "limits.max_vapor_rate must be > 0, got {}",
                self.max_vapor_rate
            )));
        }
        if self.pump_capacity <= 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "limits.pump_capacity must be > 0, got {}",
                self.pump_capacity
            )));
        }
        Ok(())
    }

    /// `q <= M1`.
    #[inline]
    pub fn is_under_min(&self, quantity: f64) -> bool {
        quantity <= self.min_safe
    }

    /// `q >= M2`.
    #[inline]
    pub fn is_over_max(&self, quantity: f64) -> bool {
        quantity >= self.max_safe
    }

    /// `N1 <= q <= N2`.
    #[inline]
    pub fn is_in_normal_band(&self, quantity: f64) -> bool {
        quantity >= self.normal_low && quantity <= self.normal_high
    }

    /// `M1 < q < M2` (exclusive).
    #[inline]
    pub fn is_in_safe_band(&self, quantity: f64) -> bool {
        quantity > self.min_safe && quantity < self.max_safe
    }

    /// Midpoint of the normal band, the estimator seed without history.
    #[inline]
    pub fn normal_midpoint(&self) -> f64 {
        (self.normal_low + self.normal_high) / 2.0
    }

    /// Clamp a quantity into `[0, capacity]`.
    #[inline]
    pub fn clamp_quantity(&self, quantity: f64) -> f64 {
        quantity.clamp(0.0, self.capacity)
    }

    /// Clamp a vapor setpoint into `[0, max_vapor_rate]`.
    #[inline]
    pub fn clamp_vapor(&self, vapor: f64) -> f64 {
        vapor.clamp(0.0, self.max_vapor_rate)
    }
}

// ─── Plant ──────────────────────────────────────────────────────────

/// Initial state and actuator timing of the simulated plant.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PlantConfig {
    /// Water quantity at startup (clamped into `[0, capacity]`).
    pub initial_quantity: f64,
    /// Water removed per physics step while the valve is open.
    pub valve_drain_per_step: f64,
    /// Pump ramp-up window after a start command, in physics steps.
    pub pump_startup_delay_steps: u32,
}

impl Default for PlantConfig {
    fn default() -> Self {
        Self {
            initial_quantity: INITIAL_QUANTITY,
            valve_drain_per_step: VALVE_DRAIN_PER_STEP,
            pump_startup_delay_steps: PUMP_STARTUP_DELAY_STEPS,
        }
    }
}

impl PlantConfig {
    /// Pump ramp-up window for a given physics period.
    #[inline]
    pub fn pump_startup_delay(&self, physics_period: Duration) -> Duration {
        physics_period.saturating_mul(self.pump_startup_delay_steps)
    }

    /// Quantities must be finite and the drain non-negative.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !self.initial_quantity.is_finite() {
            return Err(ConfigError::ValidationError(format!(
                "plant.initial_quantity must be finite, got {}",
                self.initial_quantity
            )));
        }
        if !self.valve_drain_per_step.is_finite() || self.valve_drain_per_step < 0.0 {
            return Err(ConfigError::ValidationError(format!(
                "plant.valve_drain_per_step must be >= 0, got {}",
                self.valve_drain_per_step
            )));
        }
        Ok(())
    }
}

// ─── Controller ─────────────────────────────────────────────────────

/// Tunables of the controller state machine.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ControllerConfig {
    /// Consecutive clean cycles required to leave EMERGENCY_STOP.
    pub safe_cycles_needed: u32,
    /// Vapor reading above `factor * max_vapor_rate` is a violation.
    pub vapor_alarm_factor: f64,
}

impl Default for ControllerConfig {
    fn default() -> Self {
        Self {
            safe_cycles_needed: SAFE_CYCLES_NEEDED,
            vapor_alarm_factor: VAPOR_ALARM_FACTOR,
        }
    }
}

impl ControllerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.safe_cycles_needed == 0 {
            return Err(ConfigError::ValidationError(
                "controller.safe_cycles_needed must be >= 1".to_string(),
            ));
        }
        if !self.vapor_alarm_factor.is_finite() || self.vapor_alarm_factor < 1.0 {
            return Err(ConfigError::ValidationError(format!(
                "controller.vapor_alarm_factor must be >= 1.0, got {}",
                self.vapor_alarm_factor
            )));
        }
        Ok(())
    }
}

// ─── Schedule ───────────────────────────────────────────────────────

/// Periods of the physics and control tasks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct ScheduleConfig {
    /// Physics integration period [ms]. One period is one process time unit.
    pub physics_period_ms: u64,
    /// Control cycle period [ms]. Must be a multiple of the physics period.
    pub control_period_ms: u64,
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            physics_period_ms: PHYSICS_PERIOD_MS,
            control_period_ms: CONTROL_PERIOD_MS,
        }
    }
}

impl ScheduleConfig {
    /// Physics period as a `Duration`.
    #[inline]
    pub fn physics_period(&self) -> Duration {
        Duration::from_millis(self.physics_period_ms)
    }

    /// Control period as a `Duration`.
    #[inline]
    pub fn control_period(&self) -> Duration {
        Duration::from_millis(self.control_period_ms)
    }

    /// Control-cycle length expressed in physics steps (the dead-reckoning
    /// interval).
    #[inline]
    pub fn steps_per_control_cycle(&self) -> f64 {
        self.control_period_ms as f64 / self.physics_period_ms as f64
    }

    /// Periods must be positive, control a strict multiple of physics.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.physics_period_ms == 0 {
            return Err(ConfigError::ValidationError(
                "schedule.physics_period_ms must be > 0".to_string(),
            ));
        }
        if self.control_period_ms <= self.physics_period_ms {
            return Err(ConfigError::ValidationError(format!(
                "schedule.control_period_ms ({}) must exceed physics_period_ms ({})",
                self.control_period_ms, self.physics_period_ms
            )));
        }
        if self.control_period_ms % self.physics_period_ms != 0 {
            return Err(ConfigError::ValidationError(format!(
                "schedule.control_period_ms ({}) must be a multiple of physics_period_ms ({})",
                self.control_period_ms, self.physics_period_ms
            )));
        }
        Ok(())
    }
}

// ─── Faults ─────────────────────────────────────────────────────────

/// Device whose working status a fault activation toggles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FaultTarget {
    Pump1,
    Pump2,
    LevelSensor,
    VaporSensor,
}

impl FaultTarget {
    /// All targets, in the order the random schedule indexes them.
    pub const ALL: [Self; 4] = [
        Self::Pump1,
        Self::Pump2,
        Self::LevelSensor,
        Self::VaporSensor,
    ];

    /// Name used in TOML scripts and log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pump1 => "pump1",
            Self::Pump2 => "pump2",
            Self::LevelSensor => "level_sensor",
            Self::VaporSensor => "vapor_sensor",
        }
    }
}

impl std::fmt::Display for FaultTarget {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of a deterministic fault script.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ScriptedFault {
    /// Delay after the previous activation (or task start) [ms].
    pub after_ms: u64,
    /// Device to toggle.
    pub target: FaultTarget,
}

/// Fault injection schedule. A non-empty `script` takes precedence over the
/// random schedule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FaultConfig {
    /// Run the fault injection task at all.
    pub enabled: bool,
    /// Shortest random interval [s].
    pub min_interval_secs: u64,
    /// Longest random interval [s] (inclusive).
    pub max_interval_secs: u64,
    /// Seed for a reproducible random schedule.
    pub seed: Option<u64>,
    /// Deterministic sequence, replayed once.
    pub script: Vec<ScriptedFault>,
}

impl Default for FaultConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_interval_secs: FAULT_MIN_INTERVAL_SECS,
            max_interval_secs: FAULT_MAX_INTERVAL_SECS,
            seed: None,
            script: Vec::new(),
        }
    }
}

impl FaultConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.min_interval_secs > self.max_interval_secs {
            return Err(ConfigError::ValidationError(format!(
                "faults.min_interval_secs ({}) > max_interval_secs ({})",
                self.min_interval_secs, self.max_interval_secs
            )));
        }
        Ok(())
    }
}

// ─── Top-Level Config ───────────────────────────────────────────────

/// Complete simulation configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, Default)]
#[serde(default, deny_unknown_fields)]
pub struct BoilerConfig {
    /// Logging verbosity level.
    pub log_level: LogLevel,
    /// Process thresholds and rates.
    pub limits: ProcessLimits,
    pub plant: PlantConfig,
    pub controller: ControllerConfig,
    /// Task periods.
    pub schedule: ScheduleConfig,
    /// Fault injection.
    pub faults: FaultConfig,
}

impl BoilerConfig {
    /// Parse from a TOML string without validating.
    pub fn from_toml(content: &str) -> Result<Self, ConfigError> {
        toml::from_str(content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }

    /// Validate every section.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::ValidationError` for the first section that
    /// violates its invariants.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.limits.validate()?;
        self.plant.validate()?;
        self.controller.validate()?;
        self.schedule.validate()?;
        self.faults.validate()?;
        Ok(())
    }

    /// Load from a TOML file and validate.
    pub fn load_validated(path: &Path) -> Result<Self, ConfigError> {
        let config = <Self as ConfigLoader>::load(path)?;
        config.validate()?;
        Ok(config)
    }
}

/// Trait for loading configuration from TOML files.
///
/// # Contract
///
/// - Returns `ConfigError::FileNotFound` if the file does not exist
/// - Returns `ConfigError::ParseError` if TOML syntax is invalid
pub trait ConfigLoader: Sized + serde::de::DeserializeOwned {
    /// Load configuration from a TOML file.
    fn load(path: &Path) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                ConfigError::FileNotFound
            } else {
                ConfigError::ParseError(e.to_string())
            }
        })?;

        toml::from_str(&content).map_err(|e| ConfigError::ParseError(e.to_string()))
    }
}

// Blanket implementation for all types that implement DeserializeOwned.
impl<T: serde::de::DeserializeOwned> ConfigLoader for T {}
