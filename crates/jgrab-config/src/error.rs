//! Errors from loading and saving deployments.

use std::path::{Path, PathBuf};
use thiserror::Error;

/// Why a deployment could not be loaded or stored.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The deployment file could not be opened or read.
    #[error("cannot read deployment {}: {source}", path.display())]
    ReadFile {
        /// Deployment file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The deployment file could not be written.
    #[error("cannot write deployment {}: {source}", path.display())]
    WriteFile {
        /// Deployment file.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The directory meant to hold a deployment could not be created.
    #[error("cannot create deployment directory {}: {source}", path.display())]
    CreateDir {
        /// Directory that was requested.
        path: PathBuf,
        /// I/O failure.
        #[source]
        source: std::io::Error,
    },

    /// The file is not a well-formed deployment document.
    #[error("malformed deployment TOML: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// The deployment could not be rendered as TOML.
    #[error("cannot render deployment as TOML: {0}")]
    TomlSerialize(#[from] toml::ser::Error),

    /// The deployment parsed but holds unusable values.
    #[error("validation failed: {0}")]
    Validation(#[from] crate::validation::ValidationError),
}

impl ConfigError {
    pub(crate) fn read_file(path: &Path, source: std::io::Error) -> Self {
        Self::ReadFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn write_file(path: &Path, source: std::io::Error) -> Self {
        Self::WriteFile {
            path: path.to_path_buf(),
            source,
        }
    }

    pub(crate) fn create_dir(path: &Path, source: std::io::Error) -> Self {
        Self::CreateDir {
            path: path.to_path_buf(),
            source,
        }
    }
}
