//! Level and vapor sensors.
//!
//! A sensor is a read-only view over the process. Failure is binary: a failed
//! sensor returns no reading at all.

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use tracing::{info, warn};

use crate::process::Boiler;

/// Which process variable a sensor observes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SensorKind {
    /// Water quantity.
    Level,
    /// Vapor outflow setpoint.
    Vapor,
}

impl SensorKind {
    /// Name used in log lines.
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Level => "level",
            Self::Vapor => "vapor",
        }
    }
}

impl fmt::Display for SensorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A sensor attached to the boiler.
#[derive(Debug)]
pub struct Sensor {
    kind: SensorKind,
    working: AtomicBool,
    process: Arc<Boiler>,
}

impl Sensor {
    /// Create a working sensor of `kind` over `process`.
    pub fn new(kind: SensorKind, process: Arc<Boiler>) -> Self {
        Self {
            kind,
            working: AtomicBool::new(true),
            process,
        }
    }

    /// Level sensor.
    pub fn level(process: Arc<Boiler>) -> Self {
        Self::new(SensorKind::Level, process)
    }

    /// Vapor sensor.
    pub fn vapor(process: Arc<Boiler>) -> Self {
        Self::new(SensorKind::Vapor, process)
    }

    /// Observed variable.
    pub fn kind(&self) -> SensorKind {
        self.kind
    }

    /// True value of the observed variable, or `None` while failed.
    pub fn read(&self) -> Option<f64> {
        if !self.is_working() {
            return None;
        }
        Some(match self.kind {
            SensorKind::Level => self.process.quantity(),
            SensorKind::Vapor => self.process.vapor_throughput(),
        })
    }

    /// Whether the sensor currently delivers readings.
    pub fn is_working(&self) -> bool {
        self.working.load(Ordering::Acquire)
    }

    /// Mark the sensor failed.
    pub fn fail(&self) {
        if self.working.swap(false, Ordering::AcqRel) {
            warn!(sensor = %self.kind, "[EVENT] sensor failed");
        }
    }

    /// Mark the sensor repaired.
    pub fn repair(&self) {
        if !self.working.swap(true, Ordering::AcqRel) {
            info!(sensor = %self.kind, "[EVENT] sensor repaired");
        }
    }
}
