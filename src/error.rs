use std::io;
use std::path::PathBuf;

use thiserror::Error;

/// Failure to obtain a usable [`Theme`](crate::model::Theme).
#[derive(Debug, Error)]
pub enum ThemeError {
    #[error("failed to read theme file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("failed to parse theme: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid theme: {0}")]
    Invalid(String),
}

/// Failure surfaced by the turn loop. Simulation outcomes themselves are never
/// errors; only checkpoint I/O can fail.
#[derive(Debug, Error)]
pub enum SimError {
    #[error("failed to write checkpoint to {path}: {source}")]
    Checkpoint {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
}
