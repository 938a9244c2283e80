//! Synthesis results and error types

use thiserror::Error;

/// Error type for the search engine and pipeline driver.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration or numeric model error.
    #[error("core error: {0}")]
    Core(#[from] umbra_core::Error),

    /// Artifact emission failed.
    #[error("emission error: {0}")]
    Emit(#[from] umbra_emit::Error),

    /// Solver reported `sat` without producing a model.
    #[error("SMT solver error: {0}")]
    Solver(String),
}

/// Synthesis result type
pub type Result<T> = std::result::Result<T, Error>;
