//! Level measurement for channel samples
//!
//! An empty sequence has no defined level, so these functions return
//! [`EmptyInputError`] instead of a silent 0 or NaN that would hide an empty
//! channel upstream.

use thiserror::Error;

/// A level was requested for a sequence with no samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
#[error("level is undefined for an empty sequence")]
pub struct EmptyInputError;

/// Root mean square: `sqrt(mean(x^2))`.
pub fn rms(signal: &[f64]) -> Result<f64, EmptyInputError> {
    if signal.is_empty() {
        return Err(EmptyInputError);
    }

    let sum_sq: f64 = signal.iter().map(|&x| x * x).sum();
    Ok((sum_sq / signal.len() as f64).sqrt())
}

/// Largest absolute value.
pub fn peak(signal: &[f64]) -> Result<f64, EmptyInputError> {
    signal
        .iter()
        .map(|x| x.abs())
        .reduce(f64::max)
        .ok_or(EmptyInputError)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::waveform::{sample_times, sine_wave};

    #[test]
    fn rms_of_dense_sine() {
        let x = sample_times(10_000.0, 10_000);
        let y = sine_wave(&x, 335.0, 50.0, 0.0);
        let level = rms(&y).unwrap();
        let expected = 335.0 / 2f64.sqrt();
        assert!(
            ((level - expected) / expected).abs() < 0.05,
            "rms {level}, expected {expected}"
        );
    }

    #[test]
    fn rms_of_constant() {
        assert_eq!(rms(&[-3.0, 3.0, -3.0, 3.0]), Ok(3.0));
    }

    #[test]
    fn empty_input_is_an_error() {
        assert_eq!(rms(&[]), Err(EmptyInputError));
        assert_eq!(peak(&[]), Err(EmptyInputError));
    }

    #[test]
    fn peak_ignores_sign() {
        assert_eq!(peak(&[1.0, -7.5, 3.0]), Ok(7.5));
    }
}
