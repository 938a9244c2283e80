//! Chain composition over the operation catalog.

use crate::operation::{OpKind, word_mask};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::RangeInclusive;

/// Ordered composition `f(x) = op_N(...op_1(x, r_1)..., r_N)`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Chain {
    pub ops: Vec<OpKind>,
}

impl Chain {
    /// Creates a chain applying `ops` in order.
    pub fn new(ops: Vec<OpKind>) -> Self {
        Self { ops }
    }

    /// Number of operations `N`.
    pub fn len(&self) -> usize {
        self.ops.len()
    }

    /// True for the zero-length chain.
    pub fn is_empty(&self) -> bool {
        self.ops.is_empty()
    }

    /// Evaluates the chain directly on `x` with concrete operands.
    ///
    /// # Panics
    /// Panics if `operands` and the chain differ in length.
    pub fn evaluate(&self, x: u64, operands: &[u64], width: u32) -> u64 {
        assert_eq!(self.ops.len(), operands.len(), "operand count mismatch");
        self.ops
            .iter()
            .zip(operands)
            .fold(x & word_mask(width), |acc, (op, &r)| op.apply(acc, r, width))
    }

    /// Closed-form expression string over the input symbol `x`.
    pub fn closed_form(&self, operands: &[u64]) -> String {
        self.ops
            .iter()
            .zip(operands)
            .fold("x".to_string(), |lhs, (op, &r)| op.render(&lhs, r))
    }

    /// One emission line per operation, operands substituted.
    pub fn emission_lines(&self, operands: &[u64]) -> Vec<String> {
        self.ops
            .iter()
            .zip(operands)
            .map(|(op, &r)| op.emit(r))
            .collect()
    }
}

impl fmt::Display for Chain {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let names: Vec<&str> = self.ops.iter().map(|op| op.name()).collect();
        write!(f, "[{}]", names.join(" -> "))
    }
}

/// Lazily enumerates `catalog^length` in lexicographic catalog order.
#[derive(Debug, Clone)]
pub struct ChainComposer {
    catalog: Vec<OpKind>,
    length: usize,
    /// Odometer of catalog indices; `None` once exhausted.
    cursor: Option<Vec<usize>>,
}

impl ChainComposer {
    /// Starts the enumeration at the all-first-entry chain.
    pub fn new(catalog: &[OpKind], length: usize) -> Self {
        let cursor = if catalog.is_empty() || length == 0 {
            None
        } else {
            Some(vec![0; length])
        };
        Self {
            catalog: catalog.to_vec(),
            length,
            cursor,
        }
    }

    /// Total number of chains for this length (`k^N`, saturating).
    pub fn total(&self) -> u64 {
        if self.catalog.is_empty() || self.length == 0 {
            return 0;
        }
        let k = self.catalog.len() as u64;
        (0..self.length).fold(1u64, |acc, _| acc.saturating_mul(k))
    }

    /// Chain length `N` this composer yields.
    pub fn length(&self) -> usize {
        self.length
    }
}

impl Iterator for ChainComposer {
    type Item = Chain;

    fn next(&mut self) -> Option<Chain> {
        let cursor = self.cursor.as_mut()?;
        let chain = Chain::new(cursor.iter().map(|&i| self.catalog[i]).collect());

        // advance rightmost digit first so position 0 varies slowest
        let mut done = true;
        for digit in cursor.iter_mut().rev() {
            *digit += 1;
            if *digit < self.catalog.len() {
                done = false;
                break;
            }
            *digit = 0;
        }
        if done {
            self.cursor = None;
        }
        Some(chain)
    }
}

/// Every chain length in the configured sweep, one composer per length.
pub fn sweep(
    catalog: &[OpKind],
    lengths: RangeInclusive<usize>,
) -> impl Iterator<Item = ChainComposer> + '_ {
    lengths.map(move |n| ChainComposer::new(catalog, n))
}
