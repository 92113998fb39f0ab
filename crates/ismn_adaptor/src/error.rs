//! Error types for the adaptor

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Adaptor error type.
///
/// Per-file format mismatches are not errors; they surface as
/// [`crate::SkipReason`] on a skipped outcome and the run continues.
#[derive(Error, Debug)]
pub enum AdaptorError {
    #[error("IO error: {0}")]
    Io(#[from] io::Error),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to write {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Failed to remove original {path}: {source}")]
    Remove {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Config error: {0}")]
    Config(String),
}

/// Result type alias
pub type Result<T> = std::result::Result<T, AdaptorError>;
