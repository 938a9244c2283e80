//! Synthesis configuration.
//!
//! A [`SynthConfig`] can be built in code, deserialized from JSON, or assembled by the
//! CLI. Whatever the source, [`SynthConfig::validate`] runs before any solver work so a
//! malformed configuration fails fast.

use crate::operation::{OpKind, word_mask};
use crate::result::{Error, Result};
use crate::seed::Seed;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use std::path::Path;

/// Word widths the numeric model supports.
pub const SUPPORTED_WIDTHS: [u32; 4] = [8, 16, 32, 64];

/// Numeric validation sample bounds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ValidationConfig {
    /// Consecutive inputs `0..samples` checked after the boundary values.
    pub samples: u64,
    /// Additional pseudo-random inputs drawn from the run RNG.
    pub random_samples: u64,
}

impl Default for ValidationConfig {
    fn default() -> Self {
        Self {
            samples: 0x1337,
            random_samples: 1024,
        }
    }
}

/// Jump targets substituted into the terminal branch pair of every fragment.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Labels {
    /// Target of the conditional branch taken when the predicate holds.
    pub successor: String,
    /// Target of the unconditional fall-through jump.
    pub dead_branch: String,
}

impl Default for Labels {
    fn default() -> Self {
        Self {
            successor: "successor_label".to_string(),
            dead_branch: "dead_branch_label".to_string(),
        }
    }
}

/// Inclusive unsigned bound on the composed output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutputRange {
    pub lo: u64,
    pub hi: u64,
}

impl OutputRange {
    /// Clamps both ends to the word mask of `width`.
    pub fn clamped(&self, width: u32) -> (u64, u64) {
        let mask = word_mask(width);
        (self.lo.min(mask), self.hi.min(mask))
    }

    pub fn contains(&self, value: u64) -> bool {
        (self.lo..=self.hi).contains(&value)
    }
}

impl Default for OutputRange {
    fn default() -> Self {
        Self { lo: 0, hi: 40960 }
    }
}

/// Full configuration of one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SynthConfig {
    /// Machine word width `W` in bits.
    pub width: u32,
    /// Shortest chain length in the sweep.
    pub min_length: usize,
    /// Longest chain length in the sweep.
    pub max_length: usize,
    /// Refinement loop iteration cap per chain.
    pub max_iterations: usize,
    /// Tighter operand bound than the default `W/2`.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub operand_limit: Option<u64>,
    /// Bound on the composed output.
    pub output_range: OutputRange,
    /// Operations available to the composer.
    pub catalog: Vec<OpKind>,
    pub validation: ValidationConfig,
    pub labels: Labels,
    /// Run seed; generated at startup when absent.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub seed: Option<Seed>,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            width: 32,
            min_length: 2,
            max_length: 3,
            max_iterations: 500,
            operand_limit: None,
            output_range: OutputRange::default(),
            catalog: OpKind::default_catalog(),
            validation: ValidationConfig::default(),
            labels: Labels::default(),
            seed: None,
        }
    }
}

impl SynthConfig {
    /// Loads a JSON configuration file; absent fields take their defaults.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| Error::FileRead {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json(&text)
    }

    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    /// Inclusive chain length sweep.
    pub fn lengths(&self) -> RangeInclusive<usize> {
        self.min_length..=self.max_length
    }

    /// Largest admissible operand: `W/2` unless `operand_limit` is tighter.
    pub fn max_operand(&self) -> u64 {
        let half = u64::from(self.width / 2);
        self.operand_limit.map_or(half, |limit| limit.min(half))
    }

    /// Rejects configurations that cannot drive a meaningful search.
    pub fn validate(&self) -> Result<()> {
        if !SUPPORTED_WIDTHS.contains(&self.width) {
            return Err(Error::InvalidWidth(self.width));
        }
        if self.catalog.is_empty() {
            return Err(Error::EmptyCatalog);
        }
        if self.min_length == 0 || self.min_length > self.max_length {
            return Err(Error::InvalidLengthRange {
                min: self.min_length,
                max: self.max_length,
            });
        }
        if self.max_iterations == 0 {
            return Err(Error::InvalidIterationCap(self.max_iterations));
        }
        if let Some(limit) = self.operand_limit
            && (limit == 0 || limit > u64::from(self.width / 2))
        {
            return Err(Error::InvalidOperandLimit {
                limit,
                width: self.width,
            });
        }
        if self.output_range.lo > self.output_range.hi {
            return Err(Error::InvalidOutputRange {
                lo: self.output_range.lo,
                hi: self.output_range.hi,
            });
        }
        for label in [&self.labels.successor, &self.labels.dead_branch] {
            if !is_identifier(label) {
                return Err(Error::InvalidLabel(label.clone()));
            }
        }
        Ok(())
    }
}

fn is_identifier(s: &str) -> bool {
    let mut chars = s.chars();
    chars
        .next()
        .is_some_and(|c| c.is_ascii_alphabetic() || c == '_')
        && chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}
