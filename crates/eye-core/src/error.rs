use std::path::PathBuf;

use thiserror::Error;

/// Errors surfaced while building the eye scene or its renderer.
///
/// Out-of-range parameter writes and overlapping restarts are not errors:
/// the writer clamps, and a restart supersedes whatever was in flight.
#[derive(Error, Debug)]
pub enum EyeError {
    /// The vertex/fragment program could not be found. Fatal at startup.
    #[error("missing shader source ({origin}): {reason}")]
    MissingShaderSource { origin: String, reason: String },

    #[error("invalid color literal: {0:?}")]
    InvalidColor(String),

    #[error("invalid easing name: {0:?}")]
    InvalidEasing(String),

    #[error("config error: {0}")]
    Config(#[from] serde_json::Error),

    #[error("failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

pub type Result<T> = std::result::Result<T, EyeError>;
