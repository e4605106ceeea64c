//! Deployment file format and operations.

use serde::{Deserialize, Serialize};
use std::path::Path;

use jgrab_analysis::{FitOptions, SignalGate, WaveformParameters};
use jgrab_core::{ParserOptions, SampleTiming, ScaleFactors};

use crate::error::ConfigError;
use crate::paths::default_config_path;
use crate::validation::{ValidationError, ValidationResult, validate_deployment};

/// Constants describing one logger installation.
///
/// Every section and field is optional in the file; missing values take the
/// defaults of a 50 Hz, 230 V installation.
///
/// # TOML Format
///
/// ```toml
/// name = "site-a"
///
/// [parser]
/// radix = 10
/// sentinel = "JGRAB"
/// separator = "%%"
///
/// [timing]
/// window_duration = 0.02
/// samples_per_window = 64.0
///
/// [scales]
/// dc_voltage = 0.0250819000819001
/// s_phase_current = 0.02289
/// r_phase_voltage = 0.0250819000819001
/// r_phase_current = 0.034335
/// s_phase_voltage = 0.0250819000819001
///
/// [fit]
/// amplitude = 350.0
/// frequency = 50.0
/// phase = 0.0
/// max_iterations = 200
/// spectral_fallback = true
/// min_r_squared = 0.9
///
/// [report]
/// signal_threshold = 300.0
/// ```
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct DeploymentConfig {
    /// Name of the installation.
    pub name: String,
    /// How capture text is tokenized.
    pub parser: ParserSection,
    /// Sampling geometry of a capture.
    pub timing: TimingSection,
    /// Sensor gains from raw counts to physical units.
    pub scales: ScaleSection,
    /// Starting point and budget of the sine fit.
    pub fit: FitSection,
    /// Report policy.
    pub report: ReportSection,
}

/// `[parser]` section.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ParserSection {
    /// Numeric base of sample tokens.
    pub radix: u32,
    /// Line prefix opening the data block.
    pub sentinel: String,
    /// Line prefix advancing to the next channel.
    pub separator: String,
}

impl Default for ParserSection {
    fn default() -> Self {
        Self {
            radix: 10,
            sentinel: ParserOptions::DEFAULT_SENTINEL.to_string(),
            separator: ParserOptions::DEFAULT_SEPARATOR.to_string(),
        }
    }
}

/// `[timing]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct TimingSection {
    /// Duration of one sample window in seconds.
    pub window_duration: f64,
    /// Samples per window.
    pub samples_per_window: f64,
}

impl Default for TimingSection {
    fn default() -> Self {
        let timing = SampleTiming::default();
        Self {
            window_duration: timing.window_duration,
            samples_per_window: timing.samples_per_window,
        }
    }
}

/// `[scales]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ScaleSection {
    /// DC bus voltage gain.
    pub dc_voltage: f64,
    /// S-phase current gain.
    pub s_phase_current: f64,
    /// R-phase voltage gain.
    pub r_phase_voltage: f64,
    /// R-phase current gain.
    pub r_phase_current: f64,
    /// S-phase voltage gain.
    pub s_phase_voltage: f64,
}

impl ScaleSection {
    pub(crate) fn as_array(&self) -> [f64; 5] {
        [
            self.dc_voltage,
            self.s_phase_current,
            self.r_phase_voltage,
            self.r_phase_current,
            self.s_phase_voltage,
        ]
    }
}

impl Default for ScaleSection {
    fn default() -> Self {
        Self {
            dc_voltage: ScaleFactors::VOLTAGE,
            s_phase_current: ScaleFactors::S_PHASE_CURRENT,
            r_phase_voltage: ScaleFactors::VOLTAGE,
            r_phase_current: ScaleFactors::R_PHASE_CURRENT,
            s_phase_voltage: ScaleFactors::VOLTAGE,
        }
    }
}

/// `[fit]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct FitSection {
    /// Initial amplitude guess (nominal peak voltage).
    pub amplitude: f64,
    /// Initial frequency guess in Hz.
    pub frequency: f64,
    /// Initial phase guess in radians.
    pub phase: f64,
    /// Iteration budget per fit.
    pub max_iterations: usize,
    /// Retry from a spectral estimate when the guess fails or fits poorly.
    pub spectral_fallback: bool,
    /// Fraction of the signal a fit must explain before the retry is skipped.
    pub min_r_squared: f64,
}

impl Default for FitSection {
    fn default() -> Self {
        let guess = WaveformParameters::MAINS_GUESS;
        let options = FitOptions::default();
        Self {
            amplitude: guess.amplitude,
            frequency: guess.frequency,
            phase: guess.phase,
            max_iterations: options.max_iterations,
            spectral_fallback: options.spectral_fallback,
            min_r_squared: options.min_r_squared,
        }
    }
}

/// `[report]` section.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct ReportSection {
    /// Fitted |amplitude| at or below which a channel reports 0 % THD+N.
    pub signal_threshold: f64,
}

impl Default for ReportSection {
    fn default() -> Self {
        Self {
            signal_threshold: SignalGate::DEFAULT_THRESHOLD,
        }
    }
}

impl Default for DeploymentConfig {
    fn default() -> Self {
        Self {
            name: "default".to_string(),
            parser: ParserSection::default(),
            timing: TimingSection::default(),
            scales: ScaleSection::default(),
            fit: FitSection::default(),
            report: ReportSection::default(),
        }
    }
}

impl DeploymentConfig {
    /// Create a default deployment with a name.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Load and validate a deployment from a TOML file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content =
            std::fs::read_to_string(path).map_err(|e| ConfigError::read_file(path, e))?;
        Self::from_toml(&content)
    }

    /// Load from `path` if given, else from the user config file if it
    /// exists, else fall back to defaults.
    pub fn load_or_default(path: Option<&Path>) -> Result<Self, ConfigError> {
        if let Some(path) = path {
            return Self::load(path);
        }
        let default_path = default_config_path();
        if default_path.is_file() {
            Self::load(default_path)
        } else {
            Ok(Self::default())
        }
    }

    /// Parse and validate a deployment from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, ConfigError> {
        let config: DeploymentConfig = toml::from_str(toml_str)?;
        config.validate()?;
        Ok(config)
    }

    /// Serialize to a TOML string.
    pub fn to_toml(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Save the deployment to a TOML file.
    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ConfigError> {
        let path = path.as_ref();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| ConfigError::create_dir(parent, e))?;
        }

        let content = self.to_toml()?;
        std::fs::write(path, content).map_err(|e| ConfigError::write_file(path, e))?;
        Ok(())
    }

    /// Check every section, reporting all problems at once.
    pub fn validate(&self) -> ValidationResult<()> {
        validate_deployment(self)
    }

    /// Parser options for this deployment.
    pub fn parser_options(&self) -> ValidationResult<ParserOptions> {
        Ok(ParserOptions::default()
            .with_radix(self.parser.radix)
            .map_err(|_| ValidationError::InvalidRadix(self.parser.radix))?
            .with_sentinel(self.parser.sentinel.as_str())
            .with_separator(self.parser.separator.as_str()))
    }

    /// Sampling geometry.
    pub fn sample_timing(&self) -> SampleTiming {
        SampleTiming::new(self.timing.window_duration, self.timing.samples_per_window)
    }

    /// Sensor gains in capture order.
    pub fn scale_factors(&self) -> ScaleFactors {
        ScaleFactors::new(self.scales.as_array())
    }

    /// Starting point of every sine fit.
    pub fn initial_guess(&self) -> WaveformParameters {
        WaveformParameters::new(self.fit.amplitude, self.fit.frequency, self.fit.phase)
    }

    /// Fitter tuning.
    pub fn fit_options(&self) -> FitOptions {
        FitOptions::default()
            .with_max_iterations(self.fit.max_iterations)
            .with_spectral_fallback(self.fit.spectral_fallback)
            .with_min_r_squared(self.fit.min_r_squared)
    }

    /// Idle-channel gate for THD+N reporting.
    pub fn signal_gate(&self) -> SignalGate {
        SignalGate::new(self.report.signal_threshold)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use jgrab_core::Channel;

    #[test]
    fn defaults_describe_50hz_installation() {
        let config = DeploymentConfig::default();
        assert_eq!(config.parser_options().unwrap(), ParserOptions::default());
        assert_eq!(config.sample_timing(), SampleTiming::default());
        assert_eq!(config.scale_factors(), ScaleFactors::default());
        assert_eq!(config.initial_guess(), WaveformParameters::MAINS_GUESS);
        assert_eq!(config.fit_options(), FitOptions::default());
        assert_eq!(config.signal_gate(), SignalGate::default());
        assert!(config.validate().is_ok());
    }

    #[test]
    fn partial_file_keeps_other_defaults() {
        let config = DeploymentConfig::from_toml(
            r#"
name = "hex-logger"

[parser]
radix = 16

[scales]
r_phase_current = 0.05
"#,
        )
        .unwrap();

        assert_eq!(config.name, "hex-logger");
        assert_eq!(config.parser_options().unwrap().radix(), 16);
        assert_eq!(config.parser.sentinel, "JGRAB");
        let scales = config.scale_factors();
        assert_eq!(scales.factor(Channel::RPhaseCurrent), 0.05);
        assert_eq!(scales.factor(Channel::SPhaseCurrent), ScaleFactors::S_PHASE_CURRENT);
        assert_eq!(config.timing, TimingSection::default());
    }

    #[test]
    fn empty_file_is_default() {
        let config = DeploymentConfig::from_toml("").unwrap();
        assert_eq!(config, DeploymentConfig::default());
    }

    #[test]
    fn invalid_values_are_rejected() {
        let err = DeploymentConfig::from_toml("[timing]\nwindow_duration = -1.0\n").unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)), "got {err:?}");
    }

    #[test]
    fn malformed_toml_is_a_parse_error() {
        let err = DeploymentConfig::from_toml("[fit\namplitude = ").unwrap_err();
        assert!(matches!(err, ConfigError::TomlParse(_)));
    }

    #[test]
    fn toml_roundtrip() {
        let mut original = DeploymentConfig::new("roundtrip");
        original.fit.frequency = 60.0;
        original.report.signal_threshold = 150.0;

        let parsed = DeploymentConfig::from_toml(&original.to_toml().unwrap()).unwrap();
        assert_eq!(parsed, original);
    }
}
