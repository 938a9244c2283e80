//! Counterexample-guided invariance search.
//!
//! For one chain `f` the engine looks for operands under which `f` maps every input to
//! the same value:
//!
//! 1. **Quick reject.** With operands symbolic and `x1 != x2`, `f(x1) == f(x2)` must be
//!    satisfiable. If it is not, `f` is injective for every admissible operand
//!    assignment and no constant instance exists.
//! 2. **Refinement.** Ask for operands witnessing a collision, pin them, and ask
//!    whether two fresh inputs can still be told apart. `unsat` proves the pinned
//!    instance constant; otherwise the candidate is excluded with a negated-model
//!    clause and the loop continues, up to the iteration cap.
//!
//! The first proven candidate wins.

use crate::result::{Error, Result};
use crate::smt::SymbolicChain;
use serde::{Deserialize, Serialize};
use tracing::debug;
use umbra_core::{Chain, SymbolNames, SynthConfig};
use z3::ast::{Ast, BV};
use z3::{Context, Model, Params, SatResult, Solver};

/// Constant instance found for a chain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Witness {
    pub operands: Vec<u64>,
    pub constant: u64,
    /// Closed-form expression with operands substituted.
    pub expression: String,
}

/// Solver answer that could not be read back as a finite numeral.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Divergence {
    pub expression: String,
    pub raw: String,
}

/// Terminal state of one chain's search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum SearchOutcome {
    /// Quick reject: no operand assignment can make two inputs collide.
    Injective,
    Hit(Witness),
    /// No further candidate exists after `iterations` rejected proposals.
    Exhausted { iterations: usize },
    /// Cap hit with candidates possibly remaining.
    IterationCapReached { iterations: usize },
    Diverged(Divergence),
}

/// Outcome plus the trail of candidate models that led to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchReport {
    pub outcome: SearchOutcome,
    /// Operand models proposed by the refinement loop, in order.
    pub proposals: Vec<Vec<u64>>,
    /// True when the quick-reject gate let the chain through.
    pub quick_reject_passed: bool,
}

impl SearchReport {
    fn rejected() -> Self {
        Self {
            outcome: SearchOutcome::Injective,
            proposals: Vec::new(),
            quick_reject_passed: false,
        }
    }
}

/// Search bounds derived from the run configuration.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SearchParams {
    pub width: u32,
    pub max_operand: u64,
    pub output_lo: u64,
    pub output_hi: u64,
    pub max_iterations: usize,
    /// Value for the solver's `random_seed` parameter.
    pub solver_seed: Option<u32>,
}

impl SearchParams {
    /// Derives the bounds from `config`, clamping the output range to the word width.
    pub fn from_config(config: &SynthConfig, solver_seed: Option<u32>) -> Self {
        let (output_lo, output_hi) = config.output_range.clamped(config.width);
        Self {
            width: config.width,
            max_operand: config.max_operand(),
            output_lo,
            output_hi,
            max_iterations: config.max_iterations,
            solver_seed,
        }
    }
}

/// Runs the search for chains within one solver context.
pub struct InvarianceSearch<'ctx> {
    ctx: &'ctx Context,
    params: SearchParams,
}

impl<'ctx> InvarianceSearch<'ctx> {
    /// Creates a search bound to `ctx`.
    pub fn new(ctx: &'ctx Context, params: SearchParams) -> Self {
        Self { ctx, params }
    }

    /// Bounds every search in this context runs under.
    pub fn params(&self) -> &SearchParams {
        &self.params
    }

    /// Searches one chain to a terminal outcome.
    pub fn search(&self, chain: &Chain, names: &mut SymbolNames) -> Result<SearchReport> {
        let ctx = self.ctx;
        let width = self.params.width;
        let sym = SymbolicChain::instantiate(ctx, chain, width, names);
        let solver = self.constrained_solver(&sym);

        let x1 = BV::new_const(ctx, names.fresh("x"), width);
        let x2 = BV::new_const(ctx, names.fresh("x"), width);
        solver.assert(&x1._eq(&x2).not());
        let collide = sym.output_at(&x1)._eq(&sym.output_at(&x2));

        if solver.check_assumptions(&[collide.clone()]) == SatResult::Unsat {
            debug!("{} is injective, skipping", chain);
            return Ok(SearchReport::rejected());
        }

        let x3 = BV::new_const(ctx, names.fresh("x"), width);
        let x4 = BV::new_const(ctx, names.fresh("x"), width);
        let distinguishable = sym.output_at(&x3)._eq(&sym.output_at(&x4)).not();

        let mut proposals: Vec<Vec<u64>> = Vec::new();
        for iteration in 1..=self.params.max_iterations {
            if solver.check_assumptions(&[collide.clone()]) != SatResult::Sat {
                debug!("{} exhausted after {} candidates", chain, proposals.len());
                return Ok(SearchReport {
                    outcome: SearchOutcome::Exhausted {
                        iterations: iteration - 1,
                    },
                    proposals,
                    quick_reject_passed: true,
                });
            }
            let model = solver
                .get_model()
                .ok_or_else(|| Error::Solver(format!("no model for satisfiable {chain}")))?;

            let Some(values) = read_operands(&model, &sym) else {
                return Ok(SearchReport {
                    outcome: SearchOutcome::Diverged(Divergence {
                        expression: chain.to_string(),
                        raw: operand_terms(&model, &sym),
                    }),
                    proposals,
                    quick_reject_passed: true,
                });
            };
            proposals.push(values.clone());
            let pinned = sym.operands_equal(ctx, &values);

            solver.push();
            solver.assert(&pinned);
            let verdict = solver.check_assumptions(&[distinguishable.clone()]);
            solver.pop(1);

            if verdict == SatResult::Unsat {
                let expression = chain.closed_form(&values);
                let evaluated = model.eval(&sym.output, true);
                let outcome = match evaluated.as_ref().and_then(BV::as_u64) {
                    Some(constant) => {
                        debug!(
                            "{} proven constant after {} candidates: {} == {}",
                            chain, iteration, expression, constant
                        );
                        SearchOutcome::Hit(Witness {
                            operands: values,
                            constant,
                            expression,
                        })
                    }
                    None => SearchOutcome::Diverged(Divergence {
                        expression,
                        raw: evaluated.map_or_else(
                            || "<no value>".to_string(),
                            |v| single_line(&v.to_string()),
                        ),
                    }),
                };
                return Ok(SearchReport {
                    outcome,
                    proposals,
                    quick_reject_passed: true,
                });
            }

            debug!("{} candidate {:?} rejected", chain, values);
            solver.assert(&pinned.not());
        }

        Ok(SearchReport {
            outcome: SearchOutcome::IterationCapReached {
                iterations: self.params.max_iterations,
            },
            proposals,
            quick_reject_passed: true,
        })
    }

    /// Fresh solver holding the chain's constraint set.
    fn constrained_solver(&self, sym: &SymbolicChain<'ctx>) -> Solver<'ctx> {
        let solver = Solver::new(self.ctx);
        if let Some(seed) = self.params.solver_seed {
            let mut params = Params::new(self.ctx);
            params.set_u32("random_seed", seed);
            solver.set_params(&params);
        }
        for bound in sym.operand_bounds(self.ctx, self.params.max_operand) {
            solver.assert(&bound);
        }
        for bound in sym.output_bounds(self.ctx, self.params.output_lo, self.params.output_hi) {
            solver.assert(&bound);
        }
        solver
    }
}

fn read_operands<'ctx>(model: &Model<'ctx>, sym: &SymbolicChain<'ctx>) -> Option<Vec<u64>> {
    sym.operands
        .iter()
        .map(|r| model.eval(r, true).and_then(|v| v.as_u64()))
        .collect()
}

/// `name = value` for every operand, as far as the model can evaluate them.
fn operand_terms<'ctx>(model: &Model<'ctx>, sym: &SymbolicChain<'ctx>) -> String {
    sym.operands
        .iter()
        .map(|r| match model.eval(r, true) {
            Some(v) => format!("{r} = {}", single_line(&v.to_string())),
            None => format!("{r} = <no value>"),
        })
        .collect::<Vec<_>>()
        .join(", ")
}

/// Collapses solver pretty-printing onto one line.
pub(crate) fn single_line(term: &str) -> String {
    term.split_whitespace().collect::<Vec<_>>().join(" ")
}
