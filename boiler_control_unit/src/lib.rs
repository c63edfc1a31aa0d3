//! # Boiler Control Unit Library
//!
//! Water-level controller for a dual-pump, dual-sensor boiler, plus the
//! periodic scheduler and fault injector that exercise it against the
//! simulated plant.
//!
//! ## Mode State Machine
//!
//! ```text
//!   INITIALIZATION ──level in band──► NORMAL ◄──pumps ok──► DEGRADED
//!         │                             │  ▲                   │  ▲
//!         │                  level lost │  │ level back        │  │
//!         │                             ▼  │                   ▼  │
//!         │                           SALVAMENTO ◄─────────────┘  │
//!         │                                                       │
//!         └──violation──► EMERGENCY_STOP ──3 clean cycles─────────┘
//! ```
//!
//! Every operating mode trips to EMERGENCY_STOP on a violation.
//!
//! ## Modules
//!
//! - [`controller`] - Pure per-cycle decision and its side-effecting driver
//! - [`cycle`] - Periodic loop, stop signal, timing statistics
//! - [`fault`] - Random and scripted fault schedules
//! - [`scheduler`] - Physics, control and fault tasks
//! - [`config`] - Config file plus command-line overrides
//! - [`error`] - Startup and shutdown errors

pub mod config;
pub mod controller;
pub mod cycle;
pub mod error;
pub mod fault;
pub mod scheduler;

pub use controller::{Controller, CycleReport, decide};
pub use error::SimulationError;
pub use scheduler::{Simulation, SimulationReport};
