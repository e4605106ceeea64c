//! JGRAB Analysis - fundamental fitting and distortion measurement
//!
//! Turns a channel's `(time, value)` samples into physically meaningful
//! numbers:
//!
//! - [`waveform`] - the sinusoid model `A * sin(2*pi*f*x + phase)`
//! - [`fit`] - Levenberg-Marquardt fit of the model to samples
//! - [`spectrum`] - FFT-based starting point for the fit
//! - [`dynamics`] - RMS and peak level
//! - [`distortion`] - THD+N against the fitted fundamental
//!
//! ## Example
//!
//! ```rust
//! use jgrab_analysis::{ThdnAnalyzer, WaveformParameters, sample_times, sine_wave};
//!
//! let x = sample_times(10_000.0, 10_000);
//! let fundamental = sine_wave(&x, 335.0, 50.0, 0.0);
//! let harmonic = sine_wave(&x, 20.0, 150.0, std::f64::consts::PI);
//! let y: Vec<f64> = fundamental.iter().zip(&harmonic).map(|(a, b)| a + b).collect();
//!
//! let result = ThdnAnalyzer::new().analyze(&x, &y)?;
//! assert!((result.thd_n_percent - 6.0).abs() < 0.06);
//! # Ok::<(), jgrab_analysis::DistortionError>(())
//! ```

pub mod distortion;
pub mod dynamics;
pub mod fit;
pub mod spectrum;
pub mod waveform;

pub use distortion::{DistortionError, DistortionResult, SignalGate, ThdnAnalyzer, thd_n};
pub use dynamics::{EmptyInputError, peak, rms};
pub use fit::{CurveFitter, FitError, FitOptions, FitReport};
pub use spectrum::spectral_guess;
pub use waveform::{WaveformParameters, sample_times, sine_wave};
