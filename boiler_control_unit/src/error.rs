//! Simulation-level errors.
//!
//! Sensor loss, pump failure and safety violations are never errors: the
//! controller resolves them every cycle. Only startup and shutdown can fail.

use boiler_common::config::ConfigError;
use thiserror::Error;

/// Errors raised while starting or stopping a simulation.
#[derive(Debug, Error)]
pub enum SimulationError {
    /// Configuration could not be loaded or violates its invariants.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// A task thread could not be spawned.
    #[error("failed to spawn {task} task: {source}")]
    Spawn {
        task: &'static str,
        #[source]
        source: std::io::Error,
    },

    /// A task panicked; reported when it is joined.
    #[error("{0} task panicked")]
    TaskPanicked(&'static str),

    /// The Ctrl-C handler could not be installed.
    #[error("failed to install signal handler: {0}")]
    Signal(#[from] ctrlc::Error),
}
