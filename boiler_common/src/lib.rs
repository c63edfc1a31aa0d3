//! Boiler Common Library
//!
//! Shared types for all boiler workspace crates: the controller [`mode::Mode`],
//! the process thresholds ([`config::ProcessLimits`]) and the TOML
//! configuration loaded at startup.
//!
//! # Module Structure
//!
//! - [`config`] - Configuration sections, validation and loading
//! - [`consts`] - Reference boiler constants and scheduler defaults
//! - [`mode`] - Controller operating modes
//! - [`bus`] - Message queue seam (not wired into the control path)
//! - [`prelude`] - Common re-exports for convenience
//!
//! # Usage
//!
//! ```rust
//! use boiler_common::prelude::*;
//!
//! let config = BoilerConfig::default();
//! assert!(config.validate().is_ok());
//! assert_eq!(config.limits.capacity, CAPACITY);
//! ```

pub mod bus;
pub mod config;
pub mod consts;
pub mod mode;
pub mod prelude;
