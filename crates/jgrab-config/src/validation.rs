//! Deployment validation.
//!
//! A deployment that parses as TOML can still hold values the analysis cannot
//! use: a radix `from_str_radix` rejects, a zero-length sampling window, a
//! NaN gain. [`validate_deployment`] collects every such problem so one edit
//! can fix them all.
//!
//! # Example
//!
//! ```rust
//! use jgrab_config::DeploymentConfig;
//! use jgrab_config::validation::ValidationError;
//!
//! let mut config = DeploymentConfig::default();
//! config.parser.radix = 40;
//! assert_eq!(config.validate(), Err(ValidationError::InvalidRadix(40)));
//! ```

use thiserror::Error;

use crate::deployment::DeploymentConfig;

/// Validation error types.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum ValidationError {
    /// Numeric base outside what integer parsing supports.
    #[error("parser.radix {0} is outside 2..=36")]
    InvalidRadix(u32),

    /// A parser marker that would match every line.
    #[error("parser.{field} must not be empty")]
    EmptyMarker {
        /// `sentinel` or `separator`.
        field: &'static str,
    },

    /// Timing value that is zero, negative or not finite.
    #[error("timing.{field} must be positive and finite, got {value}")]
    InvalidTiming {
        /// Name of the timing field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Gain that is NaN or infinite.
    #[error("scales.{field} must be finite, got {value}")]
    NonFiniteScale {
        /// Name of the scale field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// Initial guess with a NaN or infinite component.
    #[error("fit.{field} must be finite, got {value}")]
    NonFiniteGuess {
        /// Name of the guess field.
        field: &'static str,
        /// Rejected value.
        value: f64,
    },

    /// A fit with no iteration budget can never succeed.
    #[error("fit.max_iterations must be at least 1")]
    ZeroIterations,

    /// Goodness-of-fit floor outside `0..=1`.
    #[error("fit.min_r_squared must be within 0..=1, got {0}")]
    InvalidRSquared(f64),

    /// Signal threshold that is negative or not finite.
    #[error("report.signal_threshold must be non-negative and finite, got {0}")]
    InvalidThreshold(f64),

    /// Multiple validation errors.
    #[error("multiple validation errors: {}", join(.0))]
    Multiple(Vec<ValidationError>),
}

fn join(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Check every section of `config`.
///
/// Returns the single error when only one value is wrong and
/// [`ValidationError::Multiple`] otherwise.
pub fn validate_deployment(config: &DeploymentConfig) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if !(2..=36).contains(&config.parser.radix) {
        errors.push(ValidationError::InvalidRadix(config.parser.radix));
    }
    if config.parser.sentinel.is_empty() {
        errors.push(ValidationError::EmptyMarker { field: "sentinel" });
    }
    if config.parser.separator.is_empty() {
        errors.push(ValidationError::EmptyMarker { field: "separator" });
    }

    for (field, value) in [
        ("window_duration", config.timing.window_duration),
        ("samples_per_window", config.timing.samples_per_window),
    ] {
        if !(value.is_finite() && value > 0.0) {
            errors.push(ValidationError::InvalidTiming { field, value });
        }
    }

    let scales = &config.scales;
    for (field, value) in [
        ("dc_voltage", scales.dc_voltage),
        ("s_phase_current", scales.s_phase_current),
        ("r_phase_voltage", scales.r_phase_voltage),
        ("r_phase_current", scales.r_phase_current),
        ("s_phase_voltage", scales.s_phase_voltage),
    ] {
        if !value.is_finite() {
            errors.push(ValidationError::NonFiniteScale { field, value });
        }
    }

    let fit = &config.fit;
    for (field, value) in [
        ("amplitude", fit.amplitude),
        ("frequency", fit.frequency),
        ("phase", fit.phase),
    ] {
        if !value.is_finite() {
            errors.push(ValidationError::NonFiniteGuess { field, value });
        }
    }
    if fit.max_iterations == 0 {
        errors.push(ValidationError::ZeroIterations);
    }
    if !(0.0..=1.0).contains(&fit.min_r_squared) {
        errors.push(ValidationError::InvalidRSquared(fit.min_r_squared));
    }

    let threshold = config.report.signal_threshold;
    if !(threshold.is_finite() && threshold >= 0.0) {
        errors.push(ValidationError::InvalidThreshold(threshold));
    }

    match errors.len() {
        0 => Ok(()),
        1 => Err(errors.remove(0)),
        _ => Err(ValidationError::Multiple(errors)),
    }
}
