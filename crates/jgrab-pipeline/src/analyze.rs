//! Statistics for a single capture.
//!
//! Each capture yields one row: capture time, file name, then for the R and S
//! phases the gated THD+N, current RMS, fitted voltage amplitude and fitted
//! frequency.

use std::path::Path;

use jgrab_analysis::{
    CurveFitter, DistortionError, DistortionResult, SignalGate, ThdnAnalyzer, WaveformParameters,
    peak, rms,
};
use jgrab_config::DeploymentConfig;
use jgrab_core::{
    Channel, ChannelDataset, ParserOptions, RawChannelSet, SampleTiming, ScaleFactors, parse_str,
};

use crate::capture_time::CaptureTime;
use crate::error::PipelineError;
use crate::source::read_channels;

/// Voltage and current channels of one phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Phase {
    /// Channel holding the phase voltage.
    pub voltage: Channel,
    /// Channel holding the phase current.
    pub current: Channel,
}

impl Phase {
    /// R phase.
    pub const R: Phase = Phase {
        voltage: Channel::RPhaseVoltage,
        current: Channel::RPhaseCurrent,
    };

    /// S phase.
    pub const S: Phase = Phase {
        voltage: Channel::SPhaseVoltage,
        current: Channel::SPhaseCurrent,
    };
}

/// Measurements of one phase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PhaseStatistics {
    /// Fitted voltage fundamental.
    pub fundamental: WaveformParameters,
    /// THD+N of the voltage in percent, 0 when the gate is closed.
    pub thd_n_percent: f64,
    /// RMS of the phase current.
    pub current_rms: f64,
}

/// One report row.
#[derive(Debug, Clone, PartialEq)]
pub struct FileStatistics {
    /// When the capture was taken.
    pub time: CaptureTime,
    /// File name of the capture.
    pub file_name: String,
    /// R phase measurements.
    pub r: PhaseStatistics,
    /// S phase measurements.
    pub s: PhaseStatistics,
}

impl FileStatistics {
    /// Column headers matching [`fields`](Self::fields).
    pub const HEADER: [&'static str; 10] = [
        "Time", "Filename", "THD R", "THD S", "Irms R", "Irms S", "Vamp R", "Vamp S", "freq R",
        "freq S",
    ];

    /// Formatted report fields in [`HEADER`](Self::HEADER) order.
    pub fn fields(&self) -> [String; 10] {
        [
            self.time.to_string(),
            self.file_name.clone(),
            format!("{:.1}%", self.r.thd_n_percent),
            format!("{:.1}%", self.s.thd_n_percent),
            format!("{:.1}", self.r.current_rms),
            format!("{:.1}", self.s.current_rms),
            format!("{:.1}", self.r.fundamental.peak()),
            format!("{:.1}", self.s.fundamental.peak()),
            format!("{:.1}", self.r.fundamental.frequency),
            format!("{:.1}", self.s.fundamental.frequency),
        ]
    }

    /// Fields joined with `", "`.
    pub fn to_line(&self) -> String {
        self.fields().join(", ")
    }
}

/// Turns captures into [`FileStatistics`] using one deployment's constants.
#[derive(Debug, Clone)]
pub struct FileAnalyzer {
    parser: ParserOptions,
    timing: SampleTiming,
    scales: ScaleFactors,
    analyzer: ThdnAnalyzer,
    gate: SignalGate,
}

impl FileAnalyzer {
    /// Build an analyzer from a deployment.
    pub fn new(config: &DeploymentConfig) -> Result<Self, PipelineError> {
        config.validate()?;
        Ok(Self {
            parser: config.parser_options()?,
            timing: config.sample_timing(),
            scales: config.scale_factors(),
            analyzer: ThdnAnalyzer::new()
                .with_fitter(CurveFitter::new(config.fit_options()))
                .with_initial_guess(config.initial_guess()),
            gate: config.signal_gate(),
        })
    }

    /// Parser options used for every capture.
    pub fn parser_options(&self) -> &ParserOptions {
        &self.parser
    }

    /// Read and analyze a capture file.
    pub fn analyze_path(&self, path: impl AsRef<Path>) -> Result<FileStatistics, PipelineError> {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        let raw = read_channels(path, &self.parser)?;
        self.analyze_raw(path, &name, &raw)
    }

    /// Analyze capture text that was read elsewhere. `name` is the file name.
    pub fn analyze_text(&self, name: &str, text: &str) -> Result<FileStatistics, PipelineError> {
        let raw = parse_str(text, &self.parser);
        self.analyze_raw(Path::new(name), name, &raw)
    }

    /// Analyze already parsed channels.
    pub fn analyze_raw(
        &self,
        path: &Path,
        name: &str,
        raw: &RawChannelSet,
    ) -> Result<FileStatistics, PipelineError> {
        let time = CaptureTime::from_file_name(name)?;

        let dataset = ChannelDataset::from_raw(raw, &self.timing, &self.scales).map_err(|source| {
            tracing::debug!(file = name, lengths = ?raw.lengths(), "rejected channel shape");
            PipelineError::Data {
                path: path.to_path_buf(),
                source,
            }
        })?;

        let r = self.analyze_phase(path, &dataset, Phase::R)?;
        let s = self.analyze_phase(path, &dataset, Phase::S)?;

        tracing::info!(
            file = name,
            samples = dataset.len(),
            thd_r = r.thd_n_percent,
            thd_s = s.thd_n_percent,
            "analyzed capture"
        );

        Ok(FileStatistics {
            time,
            file_name: name.to_string(),
            r,
            s,
        })
    }

    fn analyze_phase(
        &self,
        path: &Path,
        dataset: &ChannelDataset,
        phase: Phase,
    ) -> Result<PhaseStatistics, PipelineError> {
        let analysis_error = |channel: Channel, source: DistortionError| PipelineError::Analysis {
            path: path.to_path_buf(),
            channel,
            source,
        };

        let (x, y) = dataset.series(phase.voltage);
        let fundamental = match self.analyzer.fit(x, y) {
            Ok(report) => report.params,
            // A channel whose samples never exceed the gate cannot pass it,
            // so a failed fit there is reported as an idle phase.
            Err(err) if peak(y).is_ok_and(|p| p <= self.gate.threshold) => {
                tracing::debug!(
                    channel = %phase.voltage,
                    error = %err,
                    "fit failed on idle channel"
                );
                let guess = self.analyzer.initial_guess();
                WaveformParameters::new(0.0, guess.frequency, 0.0)
            }
            Err(err) => return Err(analysis_error(phase.voltage, err.into())),
        };

        let thd_n_percent = if self.gate.is_signal(&fundamental) {
            DistortionResult::from_fundamental(x, y, fundamental)
                .map_err(|e| analysis_error(phase.voltage, e))?
                .thd_n_percent
        } else {
            tracing::debug!(
                channel = %phase.voltage,
                amplitude = fundamental.amplitude,
                "below signal gate"
            );
            0.0
        };

        let current_rms = rms(dataset.channel(phase.current))
            .map_err(|e| analysis_error(phase.current, e.into()))?;

        Ok(PhaseStatistics {
            fundamental,
            thd_n_percent,
            current_rms,
        })
    }
}
