//! Umbra core: the operation catalog, chain composition, configuration and the
//! numeric half of predicate verification.
//!
//! Nothing in this crate talks to an SMT solver. The symbolic face of the catalog
//! lives in `umbra-synth`.

pub mod chain;
pub mod config;
pub mod expr;
pub mod names;
pub mod operation;
pub mod predicate;
pub mod result;
pub mod seed;
pub mod validator;

pub use chain::{Chain, ChainComposer};
pub use config::{Labels, OutputRange, SynthConfig, ValidationConfig};
pub use names::SymbolNames;
pub use operation::OpKind;
pub use predicate::VerifiedPredicate;
pub use result::{Error, Result};
pub use seed::Seed;
pub use validator::{NumericValidator, Validation};
