//! Destinations for report rows.

use std::convert::Infallible;

use crate::analyze::FileStatistics;

/// Receives report rows one at a time, in batch order.
pub trait ReportSink {
    /// Error raised when a row cannot be stored.
    type Error;

    /// Store one row.
    fn write_row(&mut self, row: &FileStatistics) -> Result<(), Self::Error>;
}

/// Keeps formatted rows in memory.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MemorySink {
    rows: Vec<[String; 10]>,
}

impl MemorySink {
    /// Create an empty sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored rows as formatted fields.
    pub fn rows(&self) -> &[[String; 10]] {
        &self.rows
    }

    /// Header line followed by one `", "`-joined line per row.
    pub fn lines(&self) -> Vec<String> {
        std::iter::once(FileStatistics::HEADER.join(", "))
            .chain(self.rows.iter().map(|fields| fields.join(", ")))
            .collect()
    }
}

impl ReportSink for MemorySink {
    type Error = Infallible;

    fn write_row(&mut self, row: &FileStatistics) -> Result<(), Self::Error> {
        self.rows.push(row.fields());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analyze::PhaseStatistics;
    use crate::capture_time::CaptureTime;
    use jgrab_analysis::WaveformParameters;

    fn row() -> FileStatistics {
        FileStatistics {
            time: CaptureTime {
                year: 2023,
                month: 7,
                day: 9,
                hour: 3,
                minute: 30,
            },
            file_name: "2023-07-09__03_30-JGRAB.txt".to_string(),
            r: PhaseStatistics {
                fundamental: WaveformParameters::new(-331.96, 49.98, 0.2),
                thd_n_percent: 2.345,
                current_rms: 11.04,
            },
            s: PhaseStatistics {
                fundamental: WaveformParameters::new(12.0, 50.01, 0.0),
                thd_n_percent: 0.0,
                current_rms: 0.26,
            },
        }
    }

    #[test]
    fn memory_sink_formats_rows() {
        let mut sink = MemorySink::new();
        sink.write_row(&row()).unwrap();

        let lines = sink.lines();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].starts_with("Time, Filename"));
        assert_eq!(
            lines[1],
            concat!(
                "2023-07-09 03:30:00, 2023-07-09__03_30-JGRAB.txt, ",
                "2.3%, 0.0%, 11.0, 0.3, 332.0, 12.0, 50.0, 50.0"
            )
        );
        assert_eq!(sink.rows()[0][6], "332.0");
    }
}
