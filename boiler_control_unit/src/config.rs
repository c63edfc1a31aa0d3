//! Configuration resolution for the control unit binary.
//!
//! The file is optional: without one the reference boiler is simulated.
//! Command-line overrides are applied before validation.

use std::path::Path;

use boiler_common::config::{BoilerConfig, ConfigError};

/// Command-line overrides on top of the file.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Overrides {
    /// Replace `faults.seed`.
    pub seed: Option<u64>,
    /// Force `faults.enabled = false`.
    pub disable_faults: bool,
}

/// Load `path` (or the defaults), apply `overrides`, validate.
///
/// # Errors
///
/// Any `ConfigError` from loading or validation. All of them are fatal.
pub fn resolve(path: Option<&Path>, overrides: Overrides) -> Result<BoilerConfig, ConfigError> {
    let mut config = match path {
        Some(path) => BoilerConfig::load_validated(path)?,
        None => BoilerConfig::default(),
    };

    if let Some(seed) = overrides.seed {
        config.faults.seed = Some(seed);
    }
    if overrides.disable_faults {
        config.faults.enabled = false;
    }

    config.validate()?;
    Ok(config)
}
