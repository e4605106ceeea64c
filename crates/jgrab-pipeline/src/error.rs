//! Error types for file and batch processing.

use std::path::PathBuf;
use thiserror::Error;

use jgrab_analysis::DistortionError;
use jgrab_config::ValidationError;
use jgrab_core::{Channel, DataError};

/// Errors that abort the analysis of one capture file.
#[derive(Debug, Error)]
pub enum PipelineError {
    /// The capture could not be read.
    #[error("failed to read capture '{path}': {source}")]
    Io {
        /// Path of the capture.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// The parsed channels do not form a dataset.
    #[error("unusable capture '{path}': {source}")]
    Data {
        /// Path of the capture.
        path: PathBuf,
        /// Why the channels were rejected.
        #[source]
        source: DataError,
    },

    /// Fitting or measuring one channel failed.
    #[error("failed to analyze {channel} in '{path}': {source}")]
    Analysis {
        /// Path of the capture.
        path: PathBuf,
        /// Channel being analyzed.
        channel: Channel,
        /// Underlying analysis error.
        #[source]
        source: DistortionError,
    },

    /// The capture time could not be read from the file name.
    #[error("cannot read capture time from '{name}': {reason}")]
    FileName {
        /// File name that was examined.
        name: String,
        /// What was wrong with it.
        reason: String,
    },

    /// The deployment holds values the analyzer cannot use.
    #[error("invalid deployment: {0}")]
    Config(#[from] ValidationError),

    /// The dedicated worker pool could not be started.
    #[error("failed to build worker pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

impl PipelineError {
    /// Create an I/O error for `path`.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        PipelineError::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a file name error.
    pub fn file_name(name: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::FileName {
            name: name.into(),
            reason: reason.into(),
        }
    }
}
