//! Sinusoid model used as both fit target and clean-fundamental reconstruction.
//!
//! The single parametrization used throughout is
//!
//! ```text
//! y(x) = amplitude * sin(2*pi*frequency*x + phase)
//! ```
//!
//! with `x` in seconds, `frequency` in Hz and `phase` in radians.

use std::f64::consts::{PI, TAU};

/// Amplitude, frequency and phase of a sinusoid.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct WaveformParameters {
    /// Peak amplitude (may be negative straight out of a fit).
    pub amplitude: f64,
    /// Frequency in Hz.
    pub frequency: f64,
    /// Phase offset in radians.
    pub phase: f64,
}

impl WaveformParameters {
    /// Starting point for 50 Hz mains analysis: a 350 V peak at zero phase.
    pub const MAINS_GUESS: WaveformParameters = WaveformParameters::new(350.0, 50.0, 0.0);

    /// Create a parameter set.
    pub const fn new(amplitude: f64, frequency: f64, phase: f64) -> Self {
        Self {
            amplitude,
            frequency,
            phase,
        }
    }

    /// Value of the sinusoid at `x`.
    #[inline]
    pub fn evaluate(&self, x: f64) -> f64 {
        self.amplitude * (TAU * self.frequency * x + self.phase).sin()
    }

    /// Evaluate the sinusoid at every point of `x`.
    pub fn sample(&self, x: &[f64]) -> Vec<f64> {
        sine_wave(x, self.amplitude, self.frequency, self.phase)
    }

    /// Magnitude of the amplitude.
    pub fn peak(&self) -> f64 {
        self.amplitude.abs()
    }

    /// Same waveform with a non-negative amplitude and phase in `(-pi, pi]`.
    ///
    /// A fit may converge to a negative amplitude with the phase shifted by
    /// pi; this folds that back into one representation.
    pub fn canonical(&self) -> Self {
        let (amplitude, phase) = if self.amplitude < 0.0 {
            (-self.amplitude, self.phase + PI)
        } else {
            (self.amplitude, self.phase)
        };
        let mut phase = phase.rem_euclid(TAU);
        if phase > PI {
            phase -= TAU;
        }
        Self::new(amplitude, self.frequency, phase)
    }

    /// `true` when every parameter is finite.
    pub fn is_finite(&self) -> bool {
        self.amplitude.is_finite() && self.frequency.is_finite() && self.phase.is_finite()
    }

    pub(crate) fn to_array(self) -> [f64; 3] {
        [self.amplitude, self.frequency, self.phase]
    }

    pub(crate) fn from_array([amplitude, frequency, phase]: [f64; 3]) -> Self {
        Self::new(amplitude, frequency, phase)
    }
}

/// Evaluate `amplitude * sin(2*pi*frequency*x + phase)` elementwise.
pub fn sine_wave(x: &[f64], amplitude: f64, frequency: f64, phase: f64) -> Vec<f64> {
    x.iter()
        .map(|&t| amplitude * (TAU * frequency * t + phase).sin())
        .collect()
}

/// `n` evenly spaced sample times starting at zero.
pub fn sample_times(sample_rate: f64, n: usize) -> Vec<f64> {
    (0..n).map(|i| i as f64 / sample_rate).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn samples_quarter_periods() {
        let y = sine_wave(&[0.0, 0.005, 0.01, 0.015], 335.0, 50.0, 0.0);
        let expected = [0.0, 335.0, 0.0, -335.0];
        for (got, want) in y.iter().zip(expected) {
            assert!((got - want).abs() < 1e-8, "got {got}, want {want}");
        }
    }

    #[test]
    fn phase_shifts_the_wave() {
        let params = WaveformParameters::new(2.0, 50.0, PI / 2.0);
        assert!((params.evaluate(0.0) - 2.0).abs() < 1e-12);
    }

    #[test]
    fn sample_matches_free_function() {
        let x = sample_times(3200.0, 64);
        let params = WaveformParameters::new(-12.5, 49.8, 0.3);
        assert_eq!(params.sample(&x), sine_wave(&x, -12.5, 49.8, 0.3));
    }

    #[test]
    fn canonical_folds_negative_amplitude() {
        let flipped = WaveformParameters::new(-335.0, 50.0, 0.25);
        let canonical = flipped.canonical();
        assert_eq!(canonical.amplitude, 335.0);
        assert!(canonical.phase > -PI && canonical.phase <= PI);

        let x = sample_times(3200.0, 128);
        for (a, b) in flipped.sample(&x).iter().zip(canonical.sample(&x)) {
            assert!((a - b).abs() < 1e-9);
        }
    }

    #[test]
    fn mains_guess() {
        assert_eq!(WaveformParameters::MAINS_GUESS.to_array(), [350.0, 50.0, 0.0]);
        assert!(WaveformParameters::MAINS_GUESS.is_finite());
        assert!(!WaveformParameters::new(f64::NAN, 50.0, 0.0).is_finite());
    }
}
