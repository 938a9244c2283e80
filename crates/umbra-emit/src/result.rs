//! Emission results and error types

use thiserror::Error;

/// Error type for artifact emission and dispatch conversion.
#[derive(Debug, Error)]
pub enum Error {
    /// Artifact holds no fragments, so no index range exists.
    #[error("artifact contains no fragments")]
    EmptyArtifact,

    /// File write or read failed.
    #[error("could not access '{path}': {source}")]
    Io {
        /// The file being accessed.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// Rendered dispatch text does not have the expected arm structure.
    #[error("malformed dispatch at line {line}: {msg}")]
    MalformedDispatch {
        /// One-based line number.
        line: usize,
        /// What was wrong.
        msg: String,
    },
}

/// Emission result type
pub type Result<T> = std::result::Result<T, Error>;
