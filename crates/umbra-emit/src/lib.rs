//! Artifact emission and dispatch conversion.
//!
//! The artifact is a plain text file of blank-line-separated fragments, one per
//! verified predicate. It is only ever appended to; [`convert`] turns a finished
//! artifact into a single randomized-index dispatch block for the host obfuscator.

pub mod convert;
pub mod fragment;
pub mod record;
pub mod result;
pub mod sink;

pub use convert::{ConverterConfig, DispatchArm, DispatchBlock, DispatchConverter};
pub use fragment::{Fragment, parse_artifact};
pub use record::ErrorRecord;
pub use result::{Error, Result};
pub use sink::{ArtifactSink, MemorySink, PredicateSink};
