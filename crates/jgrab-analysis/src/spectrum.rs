//! Spectral starting point for the sine fit.
//!
//! Picks the strongest non-DC bin of the sample spectrum and reads amplitude,
//! frequency and phase off it. The estimate is only as fine as one FFT bin,
//! which is close enough for the fitter to refine.

use crate::waveform::WaveformParameters;
use rustfft::{FftPlanner, num_complex::Complex};
use std::f64::consts::{FRAC_PI_2, TAU};

/// Relative jitter tolerated in the sample spacing.
const SPACING_TOLERANCE: f64 = 1e-6;

/// Estimate the dominant sinusoid in `y` sampled at the times `x`.
///
/// Returns `None` when there are fewer than four samples, when the lengths
/// differ, when `x` is not evenly spaced, or when the signal has no AC content.
pub fn spectral_guess(x: &[f64], y: &[f64]) -> Option<WaveformParameters> {
    let n = y.len();
    if n < 4 || x.len() != n {
        return None;
    }

    let span = x[n - 1] - x[0];
    let period = span / (n - 1) as f64;
    if !(period.is_finite() && period > 0.0) {
        return None;
    }
    let uniform = x
        .windows(2)
        .all(|w| ((w[1] - w[0]) - period).abs() <= SPACING_TOLERANCE * period);
    if !uniform {
        return None;
    }

    let mean = y.iter().sum::<f64>() / n as f64;
    let mut buffer: Vec<Complex<f64>> = y.iter().map(|&v| Complex::new(v - mean, 0.0)).collect();
    FftPlanner::new().plan_fft_forward(n).process(&mut buffer);

    let (bin, peak) = buffer
        .iter()
        .enumerate()
        .take(n / 2 + 1)
        .skip(1)
        .max_by(|(_, a), (_, b)| a.norm().total_cmp(&b.norm()))?;

    let magnitude = peak.norm();
    if magnitude <= f64::EPSILON {
        return None;
    }

    // The Nyquist bin is not mirrored, so it carries the full amplitude.
    let scale = if 2 * bin == n { 1.0 } else { 2.0 };
    let amplitude = scale * magnitude / n as f64;
    let frequency = bin as f64 / (n as f64 * period);
    // sin(wt + phi) = cos(wt + phi - pi/2); the spectrum is referenced to x[0].
    let phase = peak.arg() + FRAC_PI_2 - TAU * frequency * x[0];

    Some(WaveformParameters::new(amplitude, frequency, phase).canonical())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{sample_times, sine_wave};

    #[test]
    fn recovers_bin_centred_sine() {
        let x = sample_times(3200.0, 128);
        let y = sine_wave(&x, 335.0, 50.0, 0.4);
        let guess = spectral_guess(&x, &y).unwrap();
        assert!((guess.amplitude - 335.0).abs() < 1e-6, "{guess:?}");
        assert!((guess.frequency - 50.0).abs() < 1e-9, "{guess:?}");
        assert!((guess.phase - 0.4).abs() < 1e-6, "{guess:?}");
    }

    #[test]
    fn accounts_for_time_offset() {
        let x: Vec<f64> = sample_times(3200.0, 128).iter().map(|t| t + 0.003).collect();
        let y = sine_wave(&x, 100.0, 50.0, -1.0);
        let guess = spectral_guess(&x, &y).unwrap();
        let rebuilt = guess.sample(&x);
        for (a, b) in rebuilt.iter().zip(&y) {
            assert!((a - b).abs() < 1e-6);
        }
    }

    #[test]
    fn ignores_dc_offset() {
        let x = sample_times(3200.0, 128);
        let y: Vec<f64> = sine_wave(&x, 10.0, 75.0, 0.0).iter().map(|v| v + 500.0).collect();
        let guess = spectral_guess(&x, &y).unwrap();
        assert!((guess.frequency - 75.0).abs() < 1e-9);
    }

    #[test]
    fn rejects_unusable_input() {
        let x = sample_times(3200.0, 128);
        assert!(spectral_guess(&x, &vec![1.0; 128]).is_none());
        assert!(spectral_guess(&x[..3], &[0.0, 1.0, 0.0]).is_none());
        assert!(spectral_guess(&[0.0, 0.1, 0.3, 0.4], &[0.0, 1.0, 0.0, -1.0]).is_none());
    }
}
