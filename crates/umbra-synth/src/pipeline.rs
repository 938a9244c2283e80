//! Synthesis pipeline driver.
//!
//! Sweeps every configured chain length, searches each chain, confirms hits
//! numerically and hands confirmed predicates to a [`PredicateSink`]. Only malformed
//! configuration aborts a run; everything else degrades to fewer predicates and is
//! counted in the [`RunReport`].

use crate::result::Result;
use crate::search::{InvarianceSearch, SearchOutcome, SearchParams, Witness};
use rand::rngs::StdRng;
use serde::{Deserialize, Serialize};
use std::time::Instant;
use tracing::{debug, info, warn};
use umbra_core::chain::sweep;
use umbra_core::{
    Chain, NumericValidator, Seed, SymbolNames, SynthConfig, Validation, VerifiedPredicate,
};
use umbra_emit::{ErrorRecord, PredicateSink};
use z3::{Config, Context};

/// Outcome counters for one chain length, or for a whole run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tally {
    pub chains: u64,
    pub injective: u64,
    pub exhausted: u64,
    pub iteration_cap: u64,
    pub diverged: u64,
    /// Solver-proven constants the numeric validator refuted.
    pub numeric_mismatches: u64,
    /// Closed forms the validator could not parse.
    pub unparseable: u64,
    /// Chains abandoned on a solver error.
    pub solver_errors: u64,
    pub emitted: u64,
    /// Sink writes that failed; the predicate is lost but the run continues.
    pub write_failures: u64,
}

impl Tally {
    fn absorb(&mut self, other: &Tally) {
        self.chains += other.chains;
        self.injective += other.injective;
        self.exhausted += other.exhausted;
        self.iteration_cap += other.iteration_cap;
        self.diverged += other.diverged;
        self.numeric_mismatches += other.numeric_mismatches;
        self.unparseable += other.unparseable;
        self.solver_errors += other.solver_errors;
        self.emitted += other.emitted;
        self.write_failures += other.write_failures;
    }
}

/// Counters for one swept chain length.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LengthReport {
    pub length: usize,
    #[serde(flatten)]
    pub tally: Tally,
}

/// Summary of a finished run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    /// Run seed as `0x`-prefixed hex; rerunning with it reproduces the run.
    pub seed: String,
    pub width: u32,
    pub totals: Tally,
    pub lengths: Vec<LengthReport>,
    pub elapsed_ms: u64,
}

impl RunReport {
    fn new(seed: &Seed, width: u32) -> Self {
        Self {
            seed: seed.to_hex(),
            width,
            totals: Tally::default(),
            lengths: Vec::new(),
            elapsed_ms: 0,
        }
    }

    fn push_length(&mut self, length: usize, tally: Tally) {
        self.totals.absorb(&tally);
        self.lengths.push(LengthReport { length, tally });
    }
}

/// A validated configuration bound to a run seed.
#[derive(Debug, Clone)]
pub struct Pipeline {
    config: SynthConfig,
    seed: Seed,
}

impl Pipeline {
    /// Validates `config` and fixes the run seed, generating one if none is set.
    pub fn new(config: SynthConfig) -> Result<Self> {
        config.validate()?;
        let seed = config.seed.clone().unwrap_or_else(Seed::generate);
        Ok(Self { config, seed })
    }

    /// The validated configuration.
    pub fn config(&self) -> &SynthConfig {
        &self.config
    }

    /// Seed of this run, generated or configured.
    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    /// Runs the full sweep, feeding `sink` in chain order.
    pub fn run<S: PredicateSink>(&self, sink: &mut S) -> Result<RunReport> {
        let started = Instant::now();
        let width = self.config.width;
        info!(
            "Starting synthesis: W={}, lengths {}..={}, catalog [{}], seed {}",
            width,
            self.config.min_length,
            self.config.max_length,
            self.config
                .catalog
                .iter()
                .map(|op| op.name())
                .collect::<Vec<_>>()
                .join(", "),
            self.seed.to_hex()
        );

        let z3_config = Config::new();
        let ctx = Context::new(&z3_config);
        let search = InvarianceSearch::new(
            &ctx,
            SearchParams::from_config(&self.config, Some(self.seed.solver_seed())),
        );
        let validator = NumericValidator::new(width, self.config.validation);
        let mut rng = self.seed.create_deterministic_rng();
        let mut names = SymbolNames::new();
        let mut report = RunReport::new(&self.seed, width);

        for composer in sweep(&self.config.catalog, self.config.lengths()) {
            let length = composer.length();
            info!("Sweeping {} chains of length {}", composer.total(), length);
            let mut tally = Tally::default();

            for chain in composer {
                tally.chains += 1;
                let searched = match search.search(&chain, &mut names) {
                    Ok(searched) => searched,
                    Err(e) => {
                        warn!("Abandoning {}: {}", chain, e);
                        tally.solver_errors += 1;
                        continue;
                    }
                };
                match searched.outcome {
                    SearchOutcome::Injective => tally.injective += 1,
                    SearchOutcome::Exhausted { .. } => tally.exhausted += 1,
                    SearchOutcome::IterationCapReached { iterations } => {
                        debug!("{} hit the cap of {} iterations", chain, iterations);
                        tally.iteration_cap += 1;
                    }
                    SearchOutcome::Diverged(divergence) => {
                        warn!(
                            "Solver value for {} is not a finite numeral: {}",
                            divergence.expression, divergence.raw
                        );
                        tally.diverged += 1;
                        let record = ErrorRecord::Divergence {
                            expression: divergence.expression,
                            raw: divergence.raw,
                        };
                        self.record(sink, &record, &mut tally);
                    }
                    SearchOutcome::Hit(witness) => {
                        self.confirm(&chain, witness, &validator, &mut rng, sink, &mut tally);
                    }
                }
            }

            info!(
                "Length {}: {} chains, {} emitted, {} injective, {} exhausted",
                length, tally.chains, tally.emitted, tally.injective, tally.exhausted
            );
            report.push_length(length, tally);
        }

        report.elapsed_ms = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        info!(
            "Synthesis finished: {} predicates from {} chains in {} ms",
            report.totals.emitted, report.totals.chains, report.elapsed_ms
        );
        Ok(report)
    }

    /// Numerically confirms a solver hit and emits it.
    fn confirm<S: PredicateSink>(
        &self,
        chain: &Chain,
        witness: Witness,
        validator: &NumericValidator,
        rng: &mut StdRng,
        sink: &mut S,
        tally: &mut Tally,
    ) {
        let checked = match validator.validate(&witness.expression, witness.constant, rng) {
            Ok(Validation::Confirmed { checked }) => checked,
            Ok(Validation::Mismatch {
                input,
                actual,
                expected,
            }) => {
                warn!(
                    "Discarding {} == {}: x = {:#x} evaluates to {}",
                    witness.expression, expected, input, actual
                );
                tally.numeric_mismatches += 1;
                let record = ErrorRecord::Mismatch {
                    expression: witness.expression,
                    expected,
                    input,
                    actual,
                };
                self.record(sink, &record, tally);
                return;
            }
            Err(e) => {
                warn!("Discarding {}: {}", witness.expression, e);
                tally.unparseable += 1;
                return;
            }
        };

        let predicate = VerifiedPredicate {
            chain: chain.clone(),
            operands: witness.operands,
            constant: witness.constant,
            expression: witness.expression,
            samples_checked: checked,
        };
        match sink.accept(&predicate, &self.config.labels) {
            Ok(_) => {
                tally.emitted += 1;
                info!("Found predicate {}", predicate.annotation());
            }
            Err(e) => {
                warn!("Failed to emit {}: {}", predicate.annotation(), e);
                tally.write_failures += 1;
            }
        }
    }

    fn record<S: PredicateSink>(&self, sink: &mut S, record: &ErrorRecord, tally: &mut Tally) {
        if let Err(e) = sink.reject(record) {
            warn!("Failed to write error record: {}", e);
            tally.write_failures += 1;
        }
    }
}
