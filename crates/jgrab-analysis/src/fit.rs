//! Nonlinear least-squares sine fitting (Levenberg-Marquardt).
//!
//! Fits [`WaveformParameters`] to `(x, y)` samples by minimizing
//!
//! ```text
//! S(p) = sum_i (y_i - A sin(2*pi*f*x_i + phi))^2
//! ```
//!
//! # Algorithm
//!
//! Each iteration builds the normal equations from the analytic Jacobian
//!
//! ```text
//! dA   = sin(theta)
//! df   = 2*pi*x * A cos(theta)
//! dphi = A cos(theta)
//! ```
//!
//! and solves `(J^T J + lambda * diag(J^T J)) step = J^T r`. A step that lowers
//! `S` is accepted and `lambda` shrinks; otherwise `lambda` grows and the step
//! is retried. Iterations are capped, so every fit terminates.
//!
//! The fit is local. A poor starting point can settle on an aliased frequency
//! or a sign-flipped amplitude with the phase shifted by pi. When the
//! configured guess fails outright, or converges to a curve that explains
//! less of the signal than [`FitOptions::min_r_squared`], the fitter can retry
//! once from a spectral estimate (see [`spectral_guess`]) and keeps whichever
//! fit has the lower residual.
//!
//! A signal with no energy (an idle channel reading flat zero) drives the
//! amplitude toward zero until the Jacobian degenerates. Once the residual is
//! negligible against the starting residual this counts as convergence.
//!
//! Reference: Moré, "The Levenberg-Marquardt algorithm: implementation and
//! theory" (1978).

use crate::spectrum::spectral_guess;
use crate::waveform::WaveformParameters;
use std::f64::consts::TAU;
use thiserror::Error;

/// Fewest samples that can determine three parameters.
pub const MIN_SAMPLES: usize = 3;

const MIN_DAMPING: f64 = 1e-12;
const MAX_DAMPING: f64 = 1e16;

/// Errors from [`CurveFitter::fit`].
#[derive(Debug, Clone, PartialEq, Error)]
pub enum FitError {
    /// `x` and `y` have different lengths.
    #[error("length mismatch: x has {x_len} points, y has {y_len}")]
    LengthMismatch {
        /// Number of x values.
        x_len: usize,
        /// Number of y values.
        y_len: usize,
    },

    /// Not enough samples to fit three parameters.
    #[error("insufficient data: need at least {required} points, got {got}")]
    InsufficientData {
        /// Minimum number of samples.
        required: usize,
        /// Number of samples supplied.
        got: usize,
    },

    /// Samples or the initial guess contain NaN or infinity.
    #[error("samples or initial guess are not finite")]
    NonFinite,

    /// The iteration budget ran out before the fit settled.
    #[error("fit did not converge after {iterations} iterations")]
    DidNotConverge {
        /// Iterations performed.
        iterations: usize,
    },

    /// The normal equations could not be solved at the current parameters.
    #[error("fit did not converge: singular Jacobian")]
    SingularJacobian,
}

impl FitError {
    /// `true` for failures of the optimizer itself rather than of the input.
    pub fn is_convergence_failure(&self) -> bool {
        matches!(
            self,
            FitError::DidNotConverge { .. } | FitError::SingularJacobian
        )
    }
}

/// Tuning of the Levenberg-Marquardt iteration.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitOptions {
    /// Maximum number of accepted-or-rejected iterations.
    pub max_iterations: usize,
    /// Stop when the relative reduction of the residual sum is below this.
    pub ftol: f64,
    /// Stop when the step is this small relative to the parameters.
    pub xtol: f64,
    /// Starting value of the damping factor lambda.
    pub initial_damping: f64,
    /// Retry once from a spectral estimate when the given guess fails or
    /// fits poorly.
    pub spectral_fallback: bool,
    /// Fits explaining less than this fraction of the signal's sum of squares
    /// are retried from the spectral estimate.
    pub min_r_squared: f64,
}

impl FitOptions {
    /// Set the iteration budget.
    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Enable or disable the spectral retry.
    pub fn with_spectral_fallback(mut self, enabled: bool) -> Self {
        self.spectral_fallback = enabled;
        self
    }

    /// Set the goodness-of-fit floor below which the spectral retry runs.
    pub fn with_min_r_squared(mut self, min_r_squared: f64) -> Self {
        self.min_r_squared = min_r_squared;
        self
    }
}

impl Default for FitOptions {
    fn default() -> Self {
        Self {
            max_iterations: 200,
            ftol: 1.49012e-8,
            xtol: 1.49012e-8,
            initial_damping: 1e-3,
            spectral_fallback: true,
            min_r_squared: 0.9,
        }
    }
}

/// Outcome of a successful fit.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FitReport {
    /// Best-fit parameters.
    pub params: WaveformParameters,
    /// Iterations used.
    pub iterations: usize,
    /// Sum of squared residuals at `params`.
    pub residual_sum_squares: f64,
    /// Fraction of `sum(y^2)` explained by the fit, 1 for an all-zero signal.
    pub r_squared: f64,
    /// Starting point that led to `params`.
    pub initial_guess: WaveformParameters,
}

/// Sine fitter with fixed options.
#[derive(Debug, Clone, Default)]
pub struct CurveFitter {
    options: FitOptions,
}

impl CurveFitter {
    /// Create a fitter.
    pub fn new(options: FitOptions) -> Self {
        Self { options }
    }

    /// Options in use.
    pub fn options(&self) -> &FitOptions {
        &self.options
    }

    /// Fit the sine model to `(x, y)` starting from `initial_guess`.
    ///
    /// Returns a locally optimal fit, not necessarily the true fundamental.
    pub fn fit(
        &self,
        x: &[f64],
        y: &[f64],
        initial_guess: WaveformParameters,
    ) -> Result<FitReport, FitError> {
        validate(x, y, &initial_guess)?;

        let primary = self.levenberg_marquardt(x, y, initial_guess);
        if !self.options.spectral_fallback {
            return primary;
        }

        match primary {
            Ok(report) if report.r_squared >= self.options.min_r_squared => Ok(report),
            Ok(report) => match self.refit_from_spectrum(x, y, initial_guess, "poor fit") {
                Some(Ok(retry)) if retry.residual_sum_squares < report.residual_sum_squares => {
                    Ok(retry)
                }
                _ => Ok(report),
            },
            Err(err) if err.is_convergence_failure() => {
                match self.refit_from_spectrum(x, y, initial_guess, "no convergence") {
                    Some(Ok(retry)) => Ok(retry),
                    _ => Err(err),
                }
            }
            Err(err) => Err(err),
        }
    }

    /// Second attempt from the FFT estimate, `None` when there is no estimate
    /// or it equals the guess already tried.
    fn refit_from_spectrum(
        &self,
        x: &[f64],
        y: &[f64],
        initial_guess: WaveformParameters,
        reason: &'static str,
    ) -> Option<Result<FitReport, FitError>> {
        let guess = spectral_guess(x, y).filter(|g| *g != initial_guess)?;
        tracing::debug!(
            reason,
            amplitude = guess.amplitude,
            frequency = guess.frequency,
            phase = guess.phase,
            "retrying sine fit from spectral estimate"
        );
        Some(self.levenberg_marquardt(x, y, guess))
    }

    fn levenberg_marquardt(
        &self,
        x: &[f64],
        y: &[f64],
        initial_guess: WaveformParameters,
    ) -> Result<FitReport, FitError> {
        let FitOptions {
            max_iterations,
            ftol,
            xtol,
            initial_damping,
            ..
        } = self.options;

        let mut params = initial_guess.to_array();
        let mut cost = residual_sum_squares(x, y, &params);
        let mut damping = initial_damping;

        let signal_energy: f64 = y.iter().map(|v| v * v).sum();
        let negligible = f64::EPSILON * signal_energy.max(cost);

        let report = |params: [f64; 3], iterations: usize, cost: f64| {
            let params = WaveformParameters::from_array(params);
            tracing::debug!(
                iterations,
                amplitude = params.amplitude,
                frequency = params.frequency,
                phase = params.phase,
                residual = cost,
                "sine fit converged"
            );
            let r_squared = if signal_energy > 0.0 {
                1.0 - cost / signal_energy
            } else {
                1.0
            };
            FitReport {
                params,
                iterations,
                residual_sum_squares: cost,
                r_squared,
                initial_guess,
            }
        };

        for iteration in 1..=max_iterations {
            if cost == 0.0 {
                return Ok(report(params, iteration - 1, cost));
            }

            let (jtj, jtr) = normal_equations(x, y, &params);

            loop {
                let mut lhs = jtj;
                for i in 0..3 {
                    lhs[i][i] += damping * jtj[i][i];
                }
                let Some(step) = solve3(lhs, jtr) else {
                    if cost <= negligible {
                        return Ok(report(params, iteration, cost));
                    }
                    return Err(FitError::SingularJacobian);
                };

                let trial = [
                    params[0] + step[0],
                    params[1] + step[1],
                    params[2] + step[2],
                ];
                let trial_cost = residual_sum_squares(x, y, &trial);
                let small_step = norm(&step) <= xtol * (norm(&params) + xtol);

                if trial_cost < cost {
                    let converged = cost - trial_cost <= ftol * cost || small_step;
                    params = trial;
                    cost = trial_cost;
                    damping = (damping / 10.0).max(MIN_DAMPING);
                    if converged {
                        return Ok(report(params, iteration, cost));
                    }
                    break;
                }

                if small_step {
                    return Ok(report(params, iteration, cost));
                }

                damping *= 10.0;
                if damping > MAX_DAMPING {
                    return Err(FitError::DidNotConverge {
                        iterations: iteration,
                    });
                }
            }
        }

        Err(FitError::DidNotConverge {
            iterations: max_iterations,
        })
    }
}

fn validate(x: &[f64], y: &[f64], guess: &WaveformParameters) -> Result<(), FitError> {
    if x.len() != y.len() {
        return Err(FitError::LengthMismatch {
            x_len: x.len(),
            y_len: y.len(),
        });
    }
    if x.len() < MIN_SAMPLES {
        return Err(FitError::InsufficientData {
            required: MIN_SAMPLES,
            got: x.len(),
        });
    }
    if !guess.is_finite() || x.iter().chain(y).any(|v| !v.is_finite()) {
        return Err(FitError::NonFinite);
    }
    Ok(())
}

fn residual_sum_squares(x: &[f64], y: &[f64], [a, f, phi]: &[f64; 3]) -> f64 {
    x.iter()
        .zip(y)
        .map(|(&t, &v)| {
            let r = v - a * (TAU * f * t + phi).sin();
            r * r
        })
        .sum()
}

/// Accumulate `J^T J` and `J^T r` for the sine model at `p`.
fn normal_equations(x: &[f64], y: &[f64], [a, f, phi]: &[f64; 3]) -> ([[f64; 3]; 3], [f64; 3]) {
    let mut jtj = [[0.0; 3]; 3];
    let mut jtr = [0.0; 3];

    for (&t, &v) in x.iter().zip(y) {
        let theta = TAU * f * t + phi;
        let (sin, cos) = theta.sin_cos();
        let row = [sin, TAU * t * a * cos, a * cos];
        let r = v - a * sin;

        for i in 0..3 {
            jtr[i] += row[i] * r;
            for j in i..3 {
                jtj[i][j] += row[i] * row[j];
            }
        }
    }

    for i in 0..3 {
        for j in 0..i {
            jtj[i][j] = jtj[j][i];
        }
    }

    (jtj, jtr)
}

/// Solve a 3x3 system by Gaussian elimination with partial pivoting.
///
/// Returns `None` when a pivot vanishes relative to the matrix scale.
fn solve3(mut a: [[f64; 3]; 3], mut b: [f64; 3]) -> Option<[f64; 3]> {
    let scale = a.iter().flatten().fold(0.0f64, |m, v| m.max(v.abs()));
    if !(scale.is_finite() && scale > 0.0) {
        return None;
    }
    let threshold = f64::EPSILON * scale;

    for col in 0..3 {
        let pivot_row = (col..3).max_by(|&i, &j| a[i][col].abs().total_cmp(&a[j][col].abs()))?;
        if a[pivot_row][col].abs() <= threshold {
            return None;
        }
        a.swap(col, pivot_row);
        b.swap(col, pivot_row);

        for row in col + 1..3 {
            let factor = a[row][col] / a[col][col];
            for k in col..3 {
                a[row][k] -= factor * a[col][k];
            }
            b[row] -= factor * b[col];
        }
    }

    let mut out = [0.0; 3];
    for row in (0..3).rev() {
        let tail: f64 = (row + 1..3).map(|k| a[row][k] * out[k]).sum();
        out[row] = (b[row] - tail) / a[row][row];
    }
    Some(out)
}

fn norm(v: &[f64; 3]) -> f64 {
    v.iter().map(|x| x * x).sum::<f64>().sqrt()
}
