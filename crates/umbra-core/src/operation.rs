//! The closed operation catalog.
//!
//! Every operation carries two faces: a concrete one (modular arithmetic over the
//! configured word width, closed-form display and target emission templates) and a
//! symbolic one implemented in `umbra-synth` on top of the same enum.

use crate::result::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Bit-vector operation parameterized by a single immediate operand.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OpKind {
    /// Wrapping addition.
    Add,
    /// Logical shift left; amounts `>= W` produce zero.
    Shl,
    /// Logical shift right; amounts `>= W` produce zero.
    Shr,
    /// Bitwise AND.
    And,
    /// Bitwise OR.
    Or,
    /// Rotate left by `operand mod W`.
    Rotl,
    /// Rotate right by `operand mod W`.
    Rotr,
    /// Bitwise XOR.
    Xor,
    /// Wrapping subtraction.
    Sub,
}

impl OpKind {
    /// Every operation, in catalog order.
    pub const ALL: [OpKind; 9] = [
        OpKind::Add,
        OpKind::Shl,
        OpKind::Shr,
        OpKind::And,
        OpKind::Or,
        OpKind::Rotl,
        OpKind::Rotr,
        OpKind::Xor,
        OpKind::Sub,
    ];

    /// Curated default catalog: every operation except `Or`.
    pub fn default_catalog() -> Vec<OpKind> {
        Self::ALL
            .iter()
            .copied()
            .filter(|op| *op != OpKind::Or)
            .collect()
    }

    /// Short lowercase name used in configuration files and on the command line.
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Shl => "shl",
            Self::Shr => "shr",
            Self::And => "and",
            Self::Or => "or",
            Self::Rotl => "rotl",
            Self::Rotr => "rotr",
            Self::Xor => "xor",
            Self::Sub => "sub",
        }
    }

    /// Closed-form template with `{lhs}` and `{rhs}` placeholders.
    pub const fn display_template(self) -> &'static str {
        match self {
            Self::Add => "({lhs} + {rhs})",
            Self::Shl => "({lhs} << {rhs})",
            Self::Shr => "({lhs} >> {rhs})",
            Self::And => "({lhs} & {rhs})",
            Self::Or => "({lhs} | {rhs})",
            Self::Rotl => "rotl({lhs}, {rhs})",
            Self::Rotr => "rotr({lhs}, {rhs})",
            Self::Xor => "({lhs} ^ {rhs})",
            Self::Sub => "({lhs} - {rhs})",
        }
    }

    /// Target-assembler template with a `{rhs}` placeholder for the immediate.
    pub const fn emission_template(self) -> &'static str {
        match self {
            Self::Add => "as->add(x, zasm::Imm({rhs}))",
            Self::Shl => "as->shl(x, zasm::Imm({rhs}))",
            Self::Shr => "as->shr(x, zasm::Imm({rhs}))",
            Self::And => "as->and_(x, zasm::Imm({rhs}))",
            Self::Or => "as->or_(x, zasm::Imm({rhs}))",
            Self::Rotl => "as->rol(x, zasm::Imm({rhs}))",
            Self::Rotr => "as->ror(x, zasm::Imm({rhs}))",
            Self::Xor => "as->xor_(x, zasm::Imm({rhs}))",
            Self::Sub => "as->sub(x, zasm::Imm({rhs}))",
        }
    }

    /// Substitutes `lhs` and the operand into the display template.
    pub fn render(self, lhs: &str, operand: u64) -> String {
        self.display_template()
            .replace("{lhs}", lhs)
            .replace("{rhs}", &operand.to_string())
    }

    /// Produces the emission line for a concrete operand.
    pub fn emit(self, operand: u64) -> String {
        self.emission_template()
            .replace("{rhs}", &operand.to_string())
    }

    /// Applies the operation in `width`-bit modular arithmetic.
    pub fn apply(self, value: u64, operand: u64, width: u32) -> u64 {
        let mask = word_mask(width);
        let value = value & mask;
        let operand = operand & mask;
        let out = match self {
            Self::Add => value.wrapping_add(operand),
            Self::Sub => value.wrapping_sub(operand),
            Self::And => value & operand,
            Self::Or => value | operand,
            Self::Xor => value ^ operand,
            Self::Shl => {
                if operand >= u64::from(width) {
                    0
                } else {
                    value << operand
                }
            }
            Self::Shr => {
                if operand >= u64::from(width) {
                    0
                } else {
                    value >> operand
                }
            }
            Self::Rotl => rotate_left(value, operand, width),
            Self::Rotr => rotate_left(value, u64::from(width) - operand % u64::from(width), width),
        };
        out & mask
    }
}

impl fmt::Display for OpKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for OpKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let needle = s.trim().to_ascii_lowercase();
        Self::ALL
            .iter()
            .copied()
            .find(|op| op.name() == needle)
            .ok_or_else(|| Error::UnknownOperation(s.trim().to_string()))
    }
}

/// Parses a comma-separated catalog such as `add,shl,xor`.
pub fn parse_catalog(list: &str) -> Result<Vec<OpKind>> {
    let ops = list
        .split(',')
        .filter(|s| !s.trim().is_empty())
        .map(OpKind::from_str)
        .collect::<Result<Vec<_>>>()?;
    if ops.is_empty() {
        return Err(Error::EmptyCatalog);
    }
    Ok(ops)
}

/// All-ones value for a `width`-bit word.
#[inline]
pub fn word_mask(width: u32) -> u64 {
    if width >= 64 {
        u64::MAX
    } else {
        (1u64 << width) - 1
    }
}

/// Rotates the low `width` bits of `value` left by `amount mod width`.
pub fn rotate_left(value: u64, amount: u64, width: u32) -> u64 {
    let mask = word_mask(width);
    let value = value & mask;
    let amount = (amount % u64::from(width)) as u32;
    if amount == 0 {
        return value;
    }
    ((value << amount) | (value >> (width - amount))) & mask
}
