//! THD+N measurement against a fitted fundamental.
//!
//! The fundamental is the best-fit sinusoid of the channel. Everything the
//! sinusoid does not explain (harmonics, noise, DC) counts as distortion:
//!
//! ```text
//! noise  = y - fundamental(x)
//! THD+N  = rms(noise) / rms(fundamental) * 100 %
//! ```
//!
//! Unlike an FFT measurement this needs no window and works on captures of
//! only a couple of mains cycles.

use crate::dynamics::{EmptyInputError, rms};
use crate::fit::{CurveFitter, FitError, FitReport};
use crate::waveform::WaveformParameters;
use thiserror::Error;

/// Errors from THD+N analysis.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DistortionError {
    /// The fundamental could not be fitted.
    #[error(transparent)]
    Fit(#[from] FitError),

    /// A level was requested for an empty sequence.
    #[error(transparent)]
    EmptyInput(#[from] EmptyInputError),

    /// The fitted fundamental has (almost) no energy, so the ratio is undefined.
    #[error("fitted fundamental is degenerate (amplitude {amplitude})")]
    DegenerateFundamental {
        /// Fitted amplitude.
        amplitude: f64,
    },
}

/// THD+N of one channel and the fundamental it was measured against.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DistortionResult {
    /// THD+N as a percentage of the fundamental.
    pub thd_n_percent: f64,
    /// Fitted fundamental.
    pub fundamental: WaveformParameters,
    /// RMS of the fitted fundamental.
    pub fundamental_rms: f64,
    /// RMS of the residual after removing the fundamental.
    pub noise_rms: f64,
}

impl DistortionResult {
    /// Measure THD+N of `y` against an already fitted fundamental.
    ///
    /// `x` and `y` must have the same length.
    pub fn from_fundamental(
        x: &[f64],
        y: &[f64],
        fundamental: WaveformParameters,
    ) -> Result<Self, DistortionError> {
        if x.len() != y.len() {
            return Err(FitError::LengthMismatch {
                x_len: x.len(),
                y_len: y.len(),
            }
            .into());
        }

        let clean = fundamental.sample(x);
        let noise: Vec<f64> = y.iter().zip(&clean).map(|(v, f)| v - f).collect();

        let fundamental_rms = rms(&clean)?;
        let noise_rms = rms(&noise)?;
        let signal_rms = rms(y)?;

        if fundamental_rms == 0.0 || fundamental_rms <= f64::EPSILON * signal_rms {
            return Err(DistortionError::DegenerateFundamental {
                amplitude: fundamental.amplitude,
            });
        }

        Ok(Self {
            thd_n_percent: noise_rms / fundamental_rms * 100.0,
            fundamental,
            fundamental_rms,
            noise_rms,
        })
    }

    /// THD+N as a ratio.
    pub fn thd_n_ratio(&self) -> f64 {
        self.thd_n_percent / 100.0
    }

    /// THD+N in dB.
    pub fn thd_n_db(&self) -> f64 {
        20.0 * self.thd_n_ratio().max(1e-12).log10()
    }
}

/// Fit the fundamental of `(x, y)` from `initial_guess` and measure THD+N.
pub fn thd_n(
    x: &[f64],
    y: &[f64],
    initial_guess: WaveformParameters,
    fitter: &CurveFitter,
) -> Result<DistortionResult, DistortionError> {
    let FitReport { params, .. } = fitter.fit(x, y, initial_guess)?;
    DistortionResult::from_fundamental(x, y, params)
}

/// THD+N analyzer with a fixed fitter and starting point.
#[derive(Debug, Clone)]
pub struct ThdnAnalyzer {
    fitter: CurveFitter,
    initial_guess: WaveformParameters,
}

impl ThdnAnalyzer {
    /// Analyzer for 50 Hz mains with default fit options.
    pub fn new() -> Self {
        Self {
            fitter: CurveFitter::default(),
            initial_guess: WaveformParameters::MAINS_GUESS,
        }
    }

    /// Use a different fitter.
    pub fn with_fitter(mut self, fitter: CurveFitter) -> Self {
        self.fitter = fitter;
        self
    }

    /// Start fits from `guess`.
    pub fn with_initial_guess(mut self, guess: WaveformParameters) -> Self {
        self.initial_guess = guess;
        self
    }

    /// Starting point of each fit.
    pub fn initial_guess(&self) -> WaveformParameters {
        self.initial_guess
    }

    /// Fit the fundamental only.
    pub fn fit(&self, x: &[f64], y: &[f64]) -> Result<FitReport, FitError> {
        self.fitter.fit(x, y, self.initial_guess)
    }

    /// Fit the fundamental and measure THD+N.
    pub fn analyze(&self, x: &[f64], y: &[f64]) -> Result<DistortionResult, DistortionError> {
        thd_n(x, y, self.initial_guess, &self.fitter)
    }
}

impl Default for ThdnAnalyzer {
    fn default() -> Self {
        Self::new()
    }
}

/// Decides whether a fitted channel carries a real signal.
///
/// Below the threshold the channel is treated as idle and its THD+N is
/// reported as 0 % rather than as a ratio of noise to noise.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SignalGate {
    /// Minimum fitted |amplitude| that counts as signal (exclusive).
    pub threshold: f64,
}

impl SignalGate {
    /// Fitted-amplitude threshold used for 230 V mains channels.
    pub const DEFAULT_THRESHOLD: f64 = 300.0;

    /// Gate with a custom threshold.
    pub fn new(threshold: f64) -> Self {
        Self { threshold }
    }

    /// `true` when `|amplitude|` exceeds the threshold.
    pub fn is_signal(&self, params: &WaveformParameters) -> bool {
        params.peak() > self.threshold
    }

    /// THD+N percentage, or 0 when the fundamental is below the gate.
    pub fn gated_percent(&self, result: &DistortionResult) -> f64 {
        if self.is_signal(&result.fundamental) {
            result.thd_n_percent
        } else {
            0.0
        }
    }
}

impl Default for SignalGate {
    fn default() -> Self {
        Self::new(Self::DEFAULT_THRESHOLD)
    }
}
