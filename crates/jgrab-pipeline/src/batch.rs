//! Parallel processing of many captures.
//!
//! Files are independent, so each is analyzed on a rayon worker. Results come
//! back in the order the paths were given regardless of which worker finished
//! first, and a failing file never stops the others.

use std::path::{Path, PathBuf};

use rayon::prelude::*;

use crate::analyze::{FileAnalyzer, FileStatistics};
use crate::error::PipelineError;
use crate::report::ReportSink;

/// A capture that could not be analyzed.
#[derive(Debug)]
pub struct BatchFailure {
    /// Path of the capture.
    pub path: PathBuf,
    /// Why it was skipped.
    pub error: PipelineError,
}

/// Outcome of a batch run.
#[derive(Debug, Default)]
pub struct BatchReport {
    /// Rows for successful captures, in input order.
    pub rows: Vec<FileStatistics>,
    /// Skipped captures, in input order.
    pub failures: Vec<BatchFailure>,
}

impl BatchReport {
    /// Number of captures attempted.
    pub fn total(&self) -> usize {
        self.rows.len() + self.failures.len()
    }

    /// Send every row to `sink`, stopping at the first sink error.
    pub fn write_to<S: ReportSink>(&self, sink: &mut S) -> Result<(), S::Error> {
        self.rows.iter().try_for_each(|row| sink.write_row(row))
    }
}

/// Runs a [`FileAnalyzer`] over many captures.
#[derive(Debug)]
pub struct BatchRunner {
    analyzer: FileAnalyzer,
    pool: Option<rayon::ThreadPool>,
}

impl BatchRunner {
    /// Runner using the global rayon pool.
    pub fn new(analyzer: FileAnalyzer) -> Self {
        Self {
            analyzer,
            pool: None,
        }
    }

    /// Use a dedicated pool of `threads` workers.
    pub fn with_threads(mut self, threads: usize) -> Result<Self, PipelineError> {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(threads)
            .thread_name(|i| format!("jgrab-worker-{i}"))
            .build()?;
        self.pool = Some(pool);
        Ok(self)
    }

    /// Analyzer applied to each capture.
    pub fn analyzer(&self) -> &FileAnalyzer {
        &self.analyzer
    }

    /// Analyze every path.
    pub fn run<P>(&self, paths: &[P]) -> BatchReport
    where
        P: AsRef<Path> + Sync,
    {
        let analyze_all = || -> Vec<(PathBuf, Result<FileStatistics, PipelineError>)> {
            paths
                .par_iter()
                .map(|path| {
                    let path = path.as_ref();
                    (path.to_path_buf(), self.analyzer.analyze_path(path))
                })
                .collect()
        };

        let results = match &self.pool {
            Some(pool) => pool.install(analyze_all),
            None => analyze_all(),
        };

        let mut report = BatchReport::default();
        for (path, result) in results {
            match result {
                Ok(row) => report.rows.push(row),
                Err(error) => {
                    tracing::warn!(path = %path.display(), %error, "skipping capture");
                    report.failures.push(BatchFailure { path, error });
                }
            }
        }

        tracing::info!(
            total = report.total(),
            analyzed = report.rows.len(),
            skipped = report.failures.len(),
            "batch complete"
        );
        report
    }
}
