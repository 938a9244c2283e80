//! Brute-force numeric confirmation of solver-proven predicates.

use crate::config::ValidationConfig;
use crate::expr::parse_expr;
use crate::operation::word_mask;
use crate::result::Result;
use rand::Rng;
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use tracing::debug;

/// Outcome of re-evaluating a closed-form expression.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Validation {
    /// Every sampled input produced the expected constant.
    Confirmed { checked: u64 },
    /// First sampled input that disagreed.
    Mismatch { input: u64, actual: u64, expected: u64 },
}

impl Validation {
    pub fn is_confirmed(&self) -> bool {
        matches!(self, Validation::Confirmed { .. })
    }
}

/// Re-evaluates expression strings in plain `W`-bit modular arithmetic.
#[derive(Debug, Clone)]
pub struct NumericValidator {
    width: u32,
    config: ValidationConfig,
}

impl NumericValidator {
    /// Creates a validator for `width`-bit words with the given sample bounds.
    pub fn new(width: u32, config: ValidationConfig) -> Self {
        Self { width, config }
    }

    /// Word width in bits.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Checks that `expression` evaluates to `expected` for all-ones, zero, the
    /// consecutive run `0..samples` and `random_samples` draws from `rng`.
    ///
    /// The consecutive run is capped at `2^W`, so 8- and 16-bit words are checked
    /// exhaustively with the default sample bound.
    pub fn validate(&self, expression: &str, expected: u64, rng: &mut StdRng) -> Result<Validation> {
        let expr = parse_expr(expression)?;
        let mask = word_mask(self.width);
        let expected = expected & mask;
        let mut checked = 0u64;

        let mut check = |input: u64| -> Option<Validation> {
            checked += 1;
            let actual = expr.eval(input, self.width);
            (actual != expected).then_some(Validation::Mismatch {
                input,
                actual,
                expected,
            })
        };

        for boundary in [mask, 0] {
            if let Some(mismatch) = check(boundary) {
                return Ok(mismatch);
            }
        }

        let consecutive = if self.width >= 64 {
            self.config.samples
        } else {
            self.config.samples.min(1u64 << self.width)
        };
        for input in 0..consecutive {
            if let Some(mismatch) = check(input) {
                return Ok(mismatch);
            }
        }

        for _ in 0..self.config.random_samples {
            let input = rng.random::<u64>() & mask;
            if let Some(mismatch) = check(input) {
                return Ok(mismatch);
            }
        }

        debug!("Validated '{}' == {} over {} inputs", expression, expected, checked);
        Ok(Validation::Confirmed { checked })
    }
}
