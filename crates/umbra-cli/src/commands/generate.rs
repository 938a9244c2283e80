//! Module for the `generate` subcommand, which runs the synthesis sweep.
//!
//! Configuration is read from an optional JSON file and then overridden by flags.
//! Verified predicates are appended to the artifact as they are found; the dispatch
//! block and the JSON run report are written once the sweep completes.

use crate::commands::CliError;
use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::fs;
use tracing::info;
use umbra_core::operation::parse_catalog;
use umbra_core::{Seed, SynthConfig};
use umbra_emit::{ArtifactSink, DispatchConverter};
use umbra_synth::Pipeline;

/// Arguments for the `generate` subcommand.
#[derive(Args)]
pub struct GenerateArgs {
    /// JSON configuration file; flags below override its fields.
    #[arg(long, value_name = "PATH")]
    config: Option<String>,
    /// Word width in bits (8, 16, 32 or 64).
    #[arg(long)]
    width: Option<u32>,
    /// Shortest chain length to sweep.
    #[arg(long)]
    min_length: Option<usize>,
    /// Longest chain length to sweep.
    #[arg(long)]
    max_length: Option<usize>,
    /// Comma-separated operation catalog, e.g. `add,shl,and,xor`.
    #[arg(long)]
    catalog: Option<String>,
    /// Refinement iteration cap per chain.
    #[arg(long)]
    iterations: Option<usize>,
    /// Upper operand bound, at most W/2.
    #[arg(long)]
    operand_limit: Option<u64>,
    /// Consecutive inputs checked by the numeric validator.
    #[arg(long)]
    samples: Option<u64>,
    /// Cryptographic seed for a reproducible run
    #[arg(long)]
    seed: Option<String>,
    /// Label the conditional branch jumps to.
    #[arg(long)]
    successor: Option<String>,
    /// Label of the unreachable fall-through.
    #[arg(long)]
    dead_branch: Option<String>,
    /// Artifact file fragments are appended to.
    #[arg(long, short, default_value = "zasm_generated.cpp")]
    output: String,
    /// File receiving one `expr == const` line per predicate.
    #[arg(long, value_name = "PATH")]
    expressions: Option<String>,
    /// File receiving divergence and mismatch records.
    #[arg(long, value_name = "PATH", default_value = "errors.txt")]
    errors: String,
    /// Convert the artifact into a dispatch block written to this path.
    #[arg(long, value_name = "PATH")]
    convert: Option<String>,
    /// Path to emit the run report as JSON (optional).
    #[arg(long, value_name = "PATH")]
    emit: Option<String>,
}

impl GenerateArgs {
    /// Merges the config file and flag overrides.
    fn build_config(&self) -> Result<SynthConfig, Box<dyn Error>> {
        let mut config = match &self.config {
            Some(path) => SynthConfig::from_json_file(path)?,
            None => SynthConfig::default(),
        };
        if let Some(width) = self.width {
            config.width = width;
        }
        if let Some(min) = self.min_length {
            config.min_length = min;
        }
        if let Some(max) = self.max_length {
            config.max_length = max;
        }
        if let Some(list) = &self.catalog {
            config.catalog = parse_catalog(list)?;
        }
        if let Some(iterations) = self.iterations {
            config.max_iterations = iterations;
        }
        if let Some(limit) = self.operand_limit {
            config.operand_limit = Some(limit);
        }
        if let Some(samples) = self.samples {
            config.validation.samples = samples;
        }
        if let Some(seed_hex) = &self.seed {
            let seed = Seed::from_hex(seed_hex).map_err(|e| format!("Invalid seed hex: {e}"))?;
            config.seed = Some(seed);
        }
        if let Some(label) = &self.successor {
            config.labels.successor = label.clone();
        }
        if let Some(label) = &self.dead_branch {
            config.labels.dead_branch = label.clone();
        }
        Ok(config)
    }
}

/// Executes the `generate` subcommand.
#[async_trait]
impl super::Command for GenerateArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let pipeline = Pipeline::new(self.build_config()?)?;
        println!("Seed: {}", pipeline.seed().to_hex());

        let mut sink = ArtifactSink::new(&self.output).with_error_log(&self.errors);
        if let Some(path) = &self.expressions {
            sink = sink.with_expressions(path);
        }

        // Solver calls block; keep them off the async workers
        let (report, sink) = tokio::task::spawn_blocking(move || {
            let report = pipeline.run(&mut sink);
            (report, sink)
        })
        .await
        .map_err(CliError::from)?;
        let report = report?;

        println!(
            "Emitted {} predicates from {} chains ({} injective, {} exhausted, {} capped, {} mismatched) in {} ms",
            report.totals.emitted,
            report.totals.chains,
            report.totals.injective,
            report.totals.exhausted,
            report.totals.iteration_cap,
            report.totals.numeric_mismatches,
            report.elapsed_ms
        );

        if let Some(path) = &self.emit {
            fs::write(path, serde_json::to_string_pretty(&report)?)?;
            println!("Wrote run report to {}", path);
        }

        if let Some(path) = &self.convert {
            let artifact_path = sink.artifact_path().display().to_string();
            if !sink.artifact_path().exists() {
                return Err(CliError::NoFragments(artifact_path).into());
            }
            let artifact = fs::read_to_string(sink.artifact_path())?;
            let dispatch = DispatchConverter::default().convert_and_render(&artifact)?;
            fs::write(path, dispatch)?;
            info!("Converted {} into {}", artifact_path, path);
            println!("Wrote dispatch block to {}", path);
        }

        Ok(())
    }
}
