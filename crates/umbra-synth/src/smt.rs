//! Bit-vector encoding of operation chains.

use umbra_core::{Chain, OpKind, SymbolNames};
use z3::Context;
use z3::ast::{Ast, BV, Bool};

/// Symbolic face of the operation catalog.
pub trait SymbolicApply {
    /// Applies the operation in bit-vector theory.
    fn apply_bv<'ctx>(&self, value: &BV<'ctx>, operand: &BV<'ctx>) -> BV<'ctx>;
}

impl SymbolicApply for OpKind {
    fn apply_bv<'ctx>(&self, value: &BV<'ctx>, operand: &BV<'ctx>) -> BV<'ctx> {
        match self {
            OpKind::Add => value.bvadd(operand),
            OpKind::Sub => value.bvsub(operand),
            OpKind::Shl => value.bvshl(operand),
            OpKind::Shr => value.bvlshr(operand),
            OpKind::And => value.bvand(operand),
            OpKind::Or => value.bvor(operand),
            OpKind::Xor => value.bvxor(operand),
            OpKind::Rotl => value.bvrotl(operand),
            OpKind::Rotr => value.bvrotr(operand),
        }
    }
}

/// A chain instantiated over fresh solver constants.
///
/// `output` is the composed function applied to `anchor`; other inputs are obtained by
/// substitution so every instantiation shares the same operand constants.
#[derive(Debug)]
pub struct SymbolicChain<'ctx> {
    pub chain: Chain,
    pub width: u32,
    pub anchor: BV<'ctx>,
    pub operands: Vec<BV<'ctx>>,
    pub output: BV<'ctx>,
}

impl<'ctx> SymbolicChain<'ctx> {
    pub fn instantiate(
        ctx: &'ctx Context,
        chain: &Chain,
        width: u32,
        names: &mut SymbolNames,
    ) -> Self {
        let anchor = BV::new_const(ctx, names.fresh("x"), width);
        let operands: Vec<BV<'ctx>> = chain
            .ops
            .iter()
            .map(|_| BV::new_const(ctx, names.fresh("v"), width))
            .collect();
        let output = chain
            .ops
            .iter()
            .zip(&operands)
            .fold(anchor.clone(), |acc, (op, r)| op.apply_bv(&acc, r));
        Self {
            chain: chain.clone(),
            width,
            anchor,
            operands,
            output,
        }
    }

    /// The composed function applied to `input`.
    pub fn output_at(&self, input: &BV<'ctx>) -> BV<'ctx> {
        self.output.substitute(&[(&self.anchor, input)])
    }

    /// `1 <= r_i <= max_operand` for every operand.
    pub fn operand_bounds(&self, ctx: &'ctx Context, max_operand: u64) -> Vec<Bool<'ctx>> {
        let one = BV::from_u64(ctx, 1, self.width);
        let max = BV::from_u64(ctx, max_operand, self.width);
        self.operands
            .iter()
            .flat_map(|r| [r.bvuge(&one), r.bvule(&max)])
            .collect()
    }

    /// `lo <= f(anchor) <= hi`, unsigned.
    pub fn output_bounds(&self, ctx: &'ctx Context, lo: u64, hi: u64) -> [Bool<'ctx>; 2] {
        let lo = BV::from_u64(ctx, lo, self.width);
        let hi = BV::from_u64(ctx, hi, self.width);
        [self.output.bvuge(&lo), self.output.bvule(&hi)]
    }

    /// Conjunction fixing every operand to `values`.
    pub fn operands_equal(&self, ctx: &'ctx Context, values: &[u64]) -> Bool<'ctx> {
        let eqs: Vec<Bool<'ctx>> = self
            .operands
            .iter()
            .zip(values)
            .map(|(r, &v)| r._eq(&BV::from_u64(ctx, v, self.width)))
            .collect();
        let refs: Vec<&Bool<'ctx>> = eqs.iter().collect();
        Bool::and(ctx, &refs)
    }
}
