//! Integration tests for jgrab-analysis.
//!
//! Exercises the waveform model, RMS, curve fitter and THD+N analyzer together
//! on synthetic mains signals with known distortion.

use std::f64::consts::PI;

use jgrab_analysis::{
    CurveFitter, DistortionError, EmptyInputError, FitError, FitOptions, SignalGate,
    ThdnAnalyzer, WaveformParameters, rms, sample_times, sine_wave, thd_n,
};

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

/// One second at 10 kHz.
fn dense_grid() -> Vec<f64> {
    sample_times(10_000.0, 10_000)
}

/// Two mains cycles on the logger's 64-per-cycle grid.
fn logger_grid() -> Vec<f64> {
    (0..128).map(|i| 0.02 * i as f64 / 64.0).collect()
}

/// Deterministic uniform noise in `[-amplitude, amplitude]`.
fn noise(len: usize, amplitude: f64) -> Vec<f64> {
    let mut state = 0x1234_5678u32;
    (0..len)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 17;
            state ^= state << 5;
            amplitude * (f64::from(state as i32) / f64::from(i32::MAX))
        })
        .collect()
}

fn add(a: &[f64], b: &[f64]) -> Vec<f64> {
    a.iter().zip(b).map(|(x, y)| x + y).collect()
}

// ===========================================================================
// 1. Waveform model and RMS
// ===========================================================================

#[test]
fn model_hits_quarter_period_values() {
    let y = sine_wave(&[0.0, 0.005, 0.01, 0.015], 335.0, 50.0, 0.0);
    for (got, want) in y.iter().zip([0.0, 335.0, 0.0, -335.0]) {
        assert!((got - want).abs() < 1e-8, "got {got}, want {want}");
    }
}

#[test]
fn rms_of_sine_is_peak_over_root_two() {
    let x = dense_grid();
    let level = rms(&sine_wave(&x, 335.0, 50.0, 0.0)).unwrap();
    assert!((level - 236.9).abs() / 236.9 < 0.05, "rms {level}");
}

#[test]
fn rms_of_empty_channel_is_an_error() {
    assert_eq!(rms(&[]), Err(EmptyInputError));
}

// ===========================================================================
// 2. THD+N
// ===========================================================================

#[test]
fn pure_sine_thd_is_zero() {
    let x = dense_grid();
    let y = sine_wave(&x, 335.0, 50.0, 0.0);
    let result = thd_n(&x, &y, WaveformParameters::MAINS_GUESS, &CurveFitter::default()).unwrap();
    assert!(result.thd_n_percent.abs() < 0.01, "{result:?}");
}

#[test]
fn third_harmonic_thd_is_six_percent() {
    let x = dense_grid();
    let y = add(
        &sine_wave(&x, 335.0, 50.0, 0.0),
        &sine_wave(&x, 20.0, 150.0, PI),
    );
    let result = ThdnAnalyzer::new().analyze(&x, &y).unwrap();
    assert!(
        ((result.thd_n_percent - 6.0) / 6.0).abs() < 0.01,
        "THD+N {}%",
        result.thd_n_percent
    );
}

#[test]
fn broadband_noise_thd_matches_noise_level() {
    let x = dense_grid();
    let hiss = noise(x.len(), 5.0);
    let y = add(&sine_wave(&x, 335.0, 50.0, 0.0), &hiss);

    let result = ThdnAnalyzer::new().analyze(&x, &y).unwrap();
    let expected = rms(&hiss).unwrap() / (335.0 / 2f64.sqrt()) * 100.0;
    assert!(
        ((result.thd_n_percent - expected) / expected).abs() < 0.05,
        "THD+N {}%, expected {}%",
        result.thd_n_percent,
        expected
    );
}

#[test]
fn logger_grid_fit_of_clean_capture() {
    let x = logger_grid();
    let y = sine_wave(&x, 331.2, 50.1, -2.0 * PI / 3.0);
    let result = ThdnAnalyzer::new().analyze(&x, &y).unwrap();
    let p = result.fundamental.canonical();
    assert!((p.amplitude - 331.2).abs() < 1e-6, "{p:?}");
    assert!((p.frequency - 50.1).abs() < 1e-6, "{p:?}");
    assert!(result.thd_n_percent < 1e-6);
}

#[test]
fn every_mains_phase_recovers_the_fundamental() {
    let x = logger_grid();
    for step in 0..36 {
        let phase = f64::from(step) * 10f64.to_radians();
        let y = sine_wave(&x, 335.0, 50.0, phase);
        let result = ThdnAnalyzer::new().analyze(&x, &y).unwrap();
        let p = result.fundamental.canonical();
        assert!((p.amplitude - 335.0).abs() < 1e-3, "phase {step}0 deg: {p:?}");
        assert!((p.frequency - 50.0).abs() < 1e-3, "phase {step}0 deg: {p:?}");
        assert!(result.thd_n_percent < 1e-3, "phase {step}0 deg: {result:?}");
    }
}

#[test]
fn flat_zero_channel_fits_zero_amplitude() {
    let x = logger_grid();
    let y = vec![0.0; x.len()];
    let report = ThdnAnalyzer::new().fit(&x, &y).unwrap();
    assert!(report.params.peak() < 1e-6, "{report:?}");
    assert!(!SignalGate::default().is_signal(&report.params));
}

#[test]
fn custom_initial_guess_for_sixty_hertz() {
    let x = dense_grid();
    let y = sine_wave(&x, 170.0, 60.0, 0.2);
    let analyzer = ThdnAnalyzer::new()
        .with_initial_guess(WaveformParameters::new(160.0, 60.0, 0.0))
        .with_fitter(CurveFitter::new(FitOptions::default().with_spectral_fallback(false)));
    let report = analyzer.fit(&x, &y).unwrap();
    assert!((report.params.frequency - 60.0).abs() < 1e-6);
    assert_eq!(analyzer.initial_guess(), WaveformParameters::new(160.0, 60.0, 0.0));
}

// ===========================================================================
// 3. Failure modes and gating
// ===========================================================================

#[test]
fn empty_channel_never_yields_a_fit() {
    let err = ThdnAnalyzer::new().analyze(&[], &[]).unwrap_err();
    assert_eq!(
        err,
        DistortionError::Fit(FitError::InsufficientData {
            required: 3,
            got: 0
        })
    );
}

#[test]
fn idle_channel_is_gated_to_zero() {
    let x = logger_grid();
    let y = add(&sine_wave(&x, 12.0, 50.0, 0.0), &noise(x.len(), 3.0));
    let result = ThdnAnalyzer::new().analyze(&x, &y).unwrap();
    let gate = SignalGate::default();
    assert!(!gate.is_signal(&result.fundamental));
    assert_eq!(gate.gated_percent(&result), 0.0);
}
