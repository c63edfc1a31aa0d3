//! # Boiler Plant Library
//!
//! Simulated physical side of the boiler: the water process, two pumps, the
//! level and vapor sensors and the evacuation valve.
//!
//! Every device is its own lock-guarded (or atomic) cell shared through `Arc`,
//! so the physics task, the control task and the fault injector only contend
//! on the single device they touch.
//!
//! # Module Structure
//!
//! - [`clock`] - Monotonic time source injected into the pumps
//! - [`process`] - Water quantity and integration law
//! - [`pump`] - Feed pumps with startup ramp
//! - [`sensor`] - Level and vapor sensors
//! - [`valve`] - Evacuation valve
//! - [`plant`] - The assembled plant and its physics step
//!
//! # Architecture
//!
//! ```text
//!   Pump ×2 ──throughput──►┌────────────┐◄──read── Sensor (level, vapor)
//!                          │   Boiler   │
//!   SafetyValve ──drain───►└────────────┘
//! ```

#![deny(missing_docs)]

pub mod clock;
pub mod plant;
pub mod process;
pub mod pump;
pub mod sensor;
pub mod valve;

// Re-export key types for convenience
pub use crate::clock::{Clock, ManualClock, MonotonicClock};
pub use crate::plant::{PhysicsStep, Plant};
pub use crate::process::{Boiler, ProcessSnapshot};
pub use crate::pump::{Pump, PumpStatus};
pub use crate::sensor::{Sensor, SensorKind};
pub use crate::valve::SafetyValve;
