//! Reading captures from disk.

use std::path::Path;

use jgrab_core::{ParserOptions, RawChannelSet, parse_str};

use crate::error::PipelineError;

/// Read a whole capture file and recover its five raw channels.
///
/// The file must be valid UTF-8; anything else is reported as an I/O error
/// carrying the path.
pub fn read_channels(
    path: impl AsRef<Path>,
    options: &ParserOptions,
) -> Result<RawChannelSet, PipelineError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| PipelineError::io(path, e))?;
    Ok(parse_str(&text, options))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn reads_and_parses_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("2024-01-01__00_00-JGRAB.txt");
        std::fs::write(&path, "JGRAB\n1\n%%\n2\n%%\n3\n%%\n4\n%%\n5\n%%\n").unwrap();

        let raw = read_channels(&path, &ParserOptions::default()).unwrap();
        assert_eq!(raw.lengths(), [1; 5]);
    }

    #[test]
    fn missing_file_is_io_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.txt");
        let err = read_channels(&path, &ParserOptions::default()).unwrap_err();
        assert!(matches!(err, PipelineError::Io { path: ref p, .. } if p == &path));
    }
}
