//! Module for the `convert` subcommand, which turns an artifact into one randomized
//! dispatch block.

use async_trait::async_trait;
use clap::Args;
use std::error::Error;
use std::fs;
use umbra_emit::{ConverterConfig, DispatchConverter};

/// Arguments for the `convert` subcommand.
#[derive(Args)]
pub struct ConvertArgs {
    /// Artifact file produced by `generate`.
    #[arg(default_value = "zasm_generated.cpp")]
    pub input: String,
    /// Write the dispatch block here instead of stdout.
    #[arg(long, short, value_name = "PATH")]
    output: Option<String>,
    /// Index selector expression; `{max}` is replaced with the last arm index.
    #[arg(long)]
    selector: Option<String>,
    /// Do not insert the cleanup line after compare instructions.
    #[arg(long)]
    no_cleanup: bool,
}

/// Executes the `convert` subcommand.
#[async_trait]
impl super::Command for ConvertArgs {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        let mut config = ConverterConfig::default();
        if let Some(selector) = self.selector {
            config.selector = selector;
        }
        if self.no_cleanup {
            config.cleanup = None;
        }

        let artifact = fs::read_to_string(&self.input)?;
        let converter = DispatchConverter::new(config);
        let block = converter.convert_text(&artifact)?;
        let dispatch = converter.render(&block)?;

        match &self.output {
            Some(path) => {
                fs::write(path, dispatch)?;
                println!("Wrote {} dispatch arms to {}", block.len(), path);
            }
            None => print!("{dispatch}"),
        }
        Ok(())
    }
}
