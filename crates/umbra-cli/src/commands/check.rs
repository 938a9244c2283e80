//! Module for the `check` subcommand, which re-validates the annotation of every
//! fragment in an existing artifact.

use crate::commands::CliError;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::fs;
use tracing::warn;
use umbra_core::expr::ClosedForm;
use umbra_core::{NumericValidator, Seed, Validation, ValidationConfig};
use umbra_emit::parse_artifact;

/// Arguments for the `check` subcommand.
#[derive(Args)]
pub struct CheckArgs {
    /// Artifact file produced by `generate`.
    #[arg(default_value = "zasm_generated.cpp")]
    pub input: String,
    /// Word width the artifact was generated for.
    #[arg(long, default_value_t = 32)]
    width: u32,
    /// Consecutive inputs checked per fragment.
    #[arg(long, default_value_t = 0x1337)]
    samples: u64,
    /// Pseudo-random inputs checked per fragment.
    #[arg(long, default_value_t = 1024)]
    random_samples: u64,
    /// Seed for the random inputs
    #[arg(long)]
    seed: Option<String>,
}

/// Executes the `check` subcommand.
#[async_trait]
impl super::Command for CheckArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let seed = match &self.seed {
            Some(hex) => Seed::from_hex(hex).map_err(|e| format!("Invalid seed hex: {e}"))?,
            None => Seed::generate(),
        };
        let mut rng = seed.create_deterministic_rng();
        let validator = NumericValidator::new(
            self.width,
            ValidationConfig {
                samples: self.samples,
                random_samples: self.random_samples,
            },
        );

        let artifact = fs::read_to_string(&self.input)?;
        let fragments = parse_artifact(&artifact);
        if fragments.is_empty() {
            return Err(CliError::NoFragments(self.input.clone()).into());
        }

        let mut failed = 0usize;
        for (i, fragment) in fragments.iter().enumerate() {
            let closed = match ClosedForm::parse(&fragment.guard) {
                Ok(closed) => closed,
                Err(e) => {
                    warn!("Fragment {}: unreadable annotation '{}': {}", i, fragment.guard, e);
                    failed += 1;
                    continue;
                }
            };
            let expected = closed.expected.eval(0, self.width);
            match validator.validate(&closed.expr.to_string(), expected, &mut rng)? {
                Validation::Confirmed { checked } => {
                    println!("ok   #{i} {} == {expected} ({checked} inputs)", closed.expr);
                }
                Validation::Mismatch { input, actual, .. } => {
                    println!(
                        "FAIL #{i} {} == {expected}: x = {input:#x} gives {actual}",
                        closed.expr
                    );
                    failed += 1;
                }
            }
        }

        if failed > 0 {
            return Err(CliError::CheckFailed {
                failed,
                total: fragments.len(),
            }
            .into());
        }
        println!("All {} fragments confirmed", fragments.len());
        Ok(())
    }
}
