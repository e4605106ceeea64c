//! Labelled, time-indexed view over a parsed capture.
//!
//! Raw logger counts are converted to physical units with per-channel sensor
//! gains, and a `time` column is derived from the capture window.

use crate::channels::{CHANNEL_COUNT, Channel, RawChannelSet};
use crate::error::DataError;

/// Label of the derived time column.
pub const TIME_LABEL: &str = "time";

/// Sampling geometry of one capture window.
///
/// `time[i] = window_duration * i / samples_per_window`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SampleTiming {
    /// Duration of one sample window in seconds.
    pub window_duration: f64,
    /// Number of samples taken across one window.
    pub samples_per_window: f64,
}

impl SampleTiming {
    /// Create a timing description.
    pub fn new(window_duration: f64, samples_per_window: f64) -> Self {
        Self {
            window_duration,
            samples_per_window,
        }
    }

    /// Spacing between consecutive samples in seconds.
    pub fn sample_period(&self) -> f64 {
        self.window_duration / self.samples_per_window
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> f64 {
        self.samples_per_window / self.window_duration
    }

    /// Check that both values are positive and finite.
    pub fn validate(&self) -> Result<(), DataError> {
        let usable = |v: f64| v.is_finite() && v > 0.0;
        if usable(self.window_duration) && usable(self.samples_per_window) {
            Ok(())
        } else {
            Err(DataError::InvalidTiming {
                window_duration: self.window_duration,
                samples_per_window: self.samples_per_window,
            })
        }
    }

    /// Time stamp of sample `index`.
    pub fn time_at(&self, index: usize) -> f64 {
        self.window_duration * index as f64 / self.samples_per_window
    }
}

impl Default for SampleTiming {
    /// One 50 Hz mains cycle (20 ms) sampled 64 times.
    fn default() -> Self {
        Self::new(0.02, 64.0)
    }
}

/// Per-channel multipliers from raw counts to volts or amps.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScaleFactors {
    factors: [f64; CHANNEL_COUNT],
}

impl ScaleFactors {
    /// Calibrated gain of the voltage sense channels (V per count).
    pub const VOLTAGE: f64 = 0.0250819000819001;
    /// Calibrated gain of the S-phase current sensor (A per count).
    pub const S_PHASE_CURRENT: f64 = 0.02289;
    /// Calibrated gain of the R-phase current sensor (A per count).
    pub const R_PHASE_CURRENT: f64 = 0.034335;

    /// Scale factors in capture order.
    pub fn new(factors: [f64; CHANNEL_COUNT]) -> Self {
        Self { factors }
    }

    /// Leave raw counts untouched.
    pub fn unity() -> Self {
        Self::new([1.0; CHANNEL_COUNT])
    }

    /// Override the factor of one channel.
    pub fn with(mut self, channel: Channel, factor: f64) -> Self {
        self.factors[channel.index()] = factor;
        self
    }

    /// Factor applied to `channel`.
    pub fn factor(&self, channel: Channel) -> f64 {
        self.factors[channel.index()]
    }
}

impl Default for ScaleFactors {
    fn default() -> Self {
        Self::new([
            Self::VOLTAGE,
            Self::S_PHASE_CURRENT,
            Self::VOLTAGE,
            Self::R_PHASE_CURRENT,
            Self::VOLTAGE,
        ])
    }
}

/// Five scaled channels plus a time column, all of equal length.
#[derive(Debug, Clone, PartialEq)]
pub struct ChannelDataset {
    channels: [Vec<f64>; CHANNEL_COUNT],
    time: Vec<f64>,
}

impl ChannelDataset {
    /// Build a dataset from raw channels.
    ///
    /// Fails with [`DataError::InvalidTiming`] when the window cannot produce
    /// a time axis, with [`DataError::EmptyData`] when any channel holds no
    /// samples and with [`DataError::ShapeMismatch`] when channel lengths
    /// differ. Nothing is truncated or padded.
    pub fn from_raw(
        raw: &RawChannelSet,
        timing: &SampleTiming,
        scales: &ScaleFactors,
    ) -> Result<Self, DataError> {
        timing.validate()?;
        let lengths = raw.lengths();
        if lengths.contains(&0) {
            return Err(DataError::EmptyData { lengths });
        }
        let len = raw
            .common_len()
            .ok_or(DataError::ShapeMismatch { lengths })?;

        let channels = Channel::ALL.map(|channel| {
            let factor = scales.factor(channel);
            raw.channel(channel)
                .iter()
                .map(|&count| count as f64 * factor)
                .collect()
        });
        let time = (0..len).map(|i| timing.time_at(i)).collect();

        Ok(Self { channels, time })
    }

    /// Number of rows.
    pub fn len(&self) -> usize {
        self.time.len()
    }

    /// Always `false` for a constructed dataset; kept for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.time.is_empty()
    }

    /// Scaled samples of one channel.
    pub fn channel(&self, channel: Channel) -> &[f64] {
        &self.channels[channel.index()]
    }

    /// Time column in seconds.
    pub fn time(&self) -> &[f64] {
        &self.time
    }

    /// `(time, channel)` pair ready for fitting.
    pub fn series(&self, channel: Channel) -> (&[f64], &[f64]) {
        (&self.time, self.channel(channel))
    }

    /// Look up a column by label, including [`TIME_LABEL`].
    pub fn column(&self, label: &str) -> Option<&[f64]> {
        if label == TIME_LABEL {
            return Some(&self.time);
        }
        Channel::from_label(label).map(|channel| self.channel(channel))
    }

    /// Column labels: the five channels in capture order, then `time`.
    pub fn column_labels() -> [&'static str; CHANNEL_COUNT + 1] {
        [
            Channel::DcVoltage.label(),
            Channel::SPhaseCurrent.label(),
            Channel::RPhaseVoltage.label(),
            Channel::RPhaseCurrent.label(),
            Channel::SPhaseVoltage.label(),
            TIME_LABEL,
        ]
    }
}
