//! Preferences error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while reading or writing preferences.
#[derive(Debug, Error)]
pub enum PreferencesError {
    /// Failed to read the preferences file.
    #[error("Failed to read preferences {path}: {source}")]
    Read {
        /// Path to the file that couldn't be read.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// The preferences file is not valid TOML.
    #[error("Failed to parse preferences {path}: {source}")]
    Parse {
        /// Path to the file that couldn't be parsed.
        path: PathBuf,
        /// The underlying TOML parse error.
        source: toml::de::Error,
    },

    /// Failed to write the preferences file.
    #[error("Failed to write preferences {path}: {source}")]
    Write {
        /// Path to the file that couldn't be written.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Failed to serialize preferences.
    #[error("Failed to serialize preferences: {0}")]
    Serialize(#[from] toml::ser::Error),
}
