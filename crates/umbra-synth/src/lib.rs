//! Umbra synthesis: z3 encoding of operation chains, the counterexample-guided
//! invariance search and the pipeline that drives a whole sweep.

pub mod pipeline;
pub mod result;
pub mod search;
pub mod smt;

pub use pipeline::{LengthReport, Pipeline, RunReport, Tally};
pub use result::{Error, Result};
pub use search::{
    Divergence, InvarianceSearch, SearchOutcome, SearchParams, SearchReport, Witness,
};
pub use smt::{SymbolicApply, SymbolicChain};
