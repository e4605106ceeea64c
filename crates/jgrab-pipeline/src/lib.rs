//! JGRAB Pipeline - capture files in, report rows out
//!
//! Ties the parser, dataset, fitter and distortion analyzer together under
//! one [`DeploymentConfig`](jgrab_config::DeploymentConfig):
//!
//! - [`source`] - read a capture file into raw channels
//! - [`capture_time`] - timestamp encoded in the file name
//! - [`analyze`] - per-file [`FileStatistics`]
//! - [`batch`] - parallel runs over many files
//! - [`report`] - row sinks
//!
//! ## Example
//!
//! ```rust,no_run
//! use jgrab_config::DeploymentConfig;
//! use jgrab_pipeline::{BatchRunner, FileAnalyzer, MemorySink};
//!
//! let analyzer = FileAnalyzer::new(&DeploymentConfig::default())?;
//! let report = BatchRunner::new(analyzer).run(&["2023-11-04__16_45-JGRAB.txt"]);
//!
//! let mut sink = MemorySink::new();
//! report.write_to(&mut sink).ok();
//! for line in sink.lines() {
//!     println!("{line}");
//! }
//! # Ok::<(), jgrab_pipeline::PipelineError>(())
//! ```

pub mod analyze;
pub mod batch;
pub mod capture_time;
mod error;
pub mod report;
pub mod source;

pub use analyze::{FileAnalyzer, FileStatistics, Phase, PhaseStatistics};
pub use batch::{BatchFailure, BatchReport, BatchRunner};
pub use capture_time::CaptureTime;
pub use error::PipelineError;
pub use report::{MemorySink, ReportSink};
pub use source::read_channels;
