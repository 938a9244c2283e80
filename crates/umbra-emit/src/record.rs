//! Side records for predicates that were abandoned after a solver claim.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A solver claim the pipeline could not turn into a predicate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ErrorRecord {
    /// The model's value for the constant was not a finite numeral.
    Divergence { expression: String, raw: String },
    /// Brute-force evaluation disagreed with the proven constant.
    Mismatch {
        expression: String,
        expected: u64,
        input: u64,
        actual: u64,
    },
}

impl fmt::Display for ErrorRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorRecord::Divergence { expression, raw } => {
                let raw = raw.split_whitespace().collect::<Vec<_>>().join(" ");
                write!(f, "{expression} == {raw}")
            }
            ErrorRecord::Mismatch {
                expression,
                expected,
                input,
                actual,
            } => write!(
                f,
                "{expression} == {expected} (mismatch: x = {input:#x} gives {actual})"
            ),
        }
    }
}
