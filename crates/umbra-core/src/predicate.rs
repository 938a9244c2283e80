//! Predicates that survived both verification stages.

use crate::chain::Chain;
use serde::{Deserialize, Serialize};

/// A chain instance proven constant by the solver and confirmed numerically.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifiedPredicate {
    pub chain: Chain,
    /// Concrete operand per chain position.
    pub operands: Vec<u64>,
    /// Value every input reduces to.
    pub constant: u64,
    /// Closed-form expression over `x`, without the comparison.
    pub expression: String,
    /// Number of inputs the numeric validator evaluated.
    pub samples_checked: u64,
}

impl VerifiedPredicate {
    /// `expr == constant`, the annotation carried by emitted fragments.
    pub fn annotation(&self) -> String {
        format!("{} == {}", self.expression, self.constant)
    }

    /// Emission lines for the chain, operands substituted.
    pub fn emission_lines(&self) -> Vec<String> {
        self.chain.emission_lines(&self.operands)
    }
}
