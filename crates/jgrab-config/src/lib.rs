//! Deployment configuration for JGRAB capture analysis.
//!
//! Every logger installation has its own sensor gains, sampling window and
//! mains characteristics. This crate keeps those constants in one TOML file
//! instead of scattering them through the analysis code.
//!
//! # Features
//!
//! - **Deployment file**: load and save [`DeploymentConfig`] as TOML
//! - **Validation**: reject unusable radix, timing, scales or fit budgets
//! - **Paths**: platform-specific location of the user configuration
//!
//! # Example
//!
//! ```rust
//! use jgrab_config::DeploymentConfig;
//!
//! let config = DeploymentConfig::from_toml(r#"
//! name = "substation-b"
//!
//! [fit]
//! amplitude = 325.0
//!
//! [report]
//! signal_threshold = 250.0
//! "#).unwrap();
//!
//! assert_eq!(config.fit.amplitude, 325.0);
//! assert_eq!(config.signal_gate().threshold, 250.0);
//! assert_eq!(config.parser.radix, 10); // default
//! ```

mod deployment;
mod error;

/// Platform-specific configuration paths.
pub mod paths;

/// Deployment validation.
pub mod validation;

pub use deployment::{
    DeploymentConfig, FitSection, ParserSection, ReportSection, ScaleSection, TimingSection,
};
pub use error::ConfigError;
pub use paths::{default_config_path, find_config, user_config_dir};
pub use validation::{ValidationError, ValidationResult};
