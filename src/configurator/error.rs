//! Configuration store error types.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised by client and server configuration stores.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Filesystem access failed.
    #[error("I/O error on {path}: {source}")]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// The underlying I/O error.
        source: std::io::Error,
    },

    /// Configuration text is not valid TOML.
    #[error("Invalid TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// Configuration parsed but is missing something required.
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    /// The referenced configuration does not exist.
    #[error("Configuration not found: {0}")]
    NotFound(PathBuf),
}
