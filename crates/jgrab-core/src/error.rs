//! Error types for channel recovery and dataset construction.

use crate::channels::CHANNEL_COUNT;
use thiserror::Error;

/// Errors raised while turning parsed channels into a usable dataset.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum DataError {
    /// A channel, or the whole document, contained no samples.
    #[error("no samples recovered (channel lengths {lengths:?})")]
    EmptyData {
        /// Length of each channel in channel order.
        lengths: [usize; CHANNEL_COUNT],
    },

    /// The channels do not all have the same number of samples.
    #[error("channels contain values of varying length: {lengths:?}")]
    ShapeMismatch {
        /// Length of each channel in channel order.
        lengths: [usize; CHANNEL_COUNT],
    },

    /// The sampling window cannot produce a time axis.
    #[error("invalid sample timing: {window_duration} s over {samples_per_window} samples")]
    InvalidTiming {
        /// Window duration in seconds.
        window_duration: f64,
        /// Samples per window.
        samples_per_window: f64,
    },

    /// The requested numeric base cannot be used for integer tokens.
    #[error("unsupported numeric base {0} (expected 2..=36)")]
    InvalidRadix(u32),
}
