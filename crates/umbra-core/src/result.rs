//! Core results and error types

use thiserror::Error;

/// Core error type encompassing all core module errors.
#[derive(Debug, Error)]
pub enum Error {
    /// The operation catalog has no members.
    #[error("operation catalog is empty")]
    EmptyCatalog,

    /// Failed to parse a closed-form expression.
    #[error("expression parse error at offset {pos}: {msg} ⇒ `{raw}`")]
    ExpressionParse {
        /// Byte offset where parsing failed.
        pos: usize,
        /// Description of the parsing error.
        msg: String,
        /// The raw expression that failed to parse.
        raw: String,
    },

    /// Refinement iteration cap must be positive.
    #[error("invalid iteration cap: {0}")]
    InvalidIterationCap(usize),

    /// Operand limit is zero or exceeds `W/2`.
    #[error("invalid operand limit {limit} for width {width}")]
    InvalidOperandLimit {
        /// Requested limit.
        limit: u64,
        /// Configured word width.
        width: u32,
    },

    /// A branch label is not a usable identifier.
    #[error("invalid label '{0}'")]
    InvalidLabel(String),

    /// Chain length sweep is empty or starts at zero.
    #[error("invalid chain length range {min}..={max}")]
    InvalidLengthRange {
        /// Lower bound of the sweep.
        min: usize,
        /// Upper bound of the sweep.
        max: usize,
    },

    /// Output range is inverted.
    #[error("invalid output range [{lo}, {hi}]")]
    InvalidOutputRange {
        /// Lower bound.
        lo: u64,
        /// Upper bound.
        hi: u64,
    },

    /// Invalid hexadecimal in seed.
    #[error("invalid hexadecimal in seed")]
    InvalidSeedHex,

    /// Invalid seed length.
    #[error("invalid seed length: expected 64 hex chars, got {0}")]
    InvalidSeedLength(usize),

    /// Word width outside the supported set.
    #[error("unsupported word width {0}, expected one of 8, 16, 32, 64")]
    InvalidWidth(u32),

    /// File could not be read.
    #[error("could not read file '{path}': {source}")]
    FileRead {
        /// The path to the file that could not be read.
        path: String,
        /// The underlying IO error.
        #[source]
        source: std::io::Error,
    },

    /// JSON (de)serialization failed.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Operation name not present in the catalog.
    #[error("unknown operation '{0}'")]
    UnknownOperation(String),
}

/// Core result type
pub type Result<T> = std::result::Result<T, Error>;
