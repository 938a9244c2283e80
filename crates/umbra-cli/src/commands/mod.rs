use async_trait::async_trait;
use clap::Subcommand;
use std::error::Error;

pub mod check;
pub mod convert;
pub mod generate;

use thiserror::Error;

/// Errors raised by the command layer itself.
#[derive(Debug, Error)]
pub enum CliError {
    /// File read/write error.
    #[error("file error: {0}")]
    File(#[from] std::io::Error),
    /// The blocking synthesis task panicked or was cancelled.
    #[error("synthesis task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    /// Some artifact fragments did not survive re-validation.
    #[error("{failed} of {total} fragments failed numeric validation")]
    CheckFailed { failed: usize, total: usize },
    /// The artifact holds no fragments to work on.
    #[error("no fragments in {0}")]
    NoFragments(String),
}

/// CLI subcommands for Umbra.
#[derive(Subcommand)]
pub enum Cmd {
    /// Run the synthesis sweep and append verified predicates to the artifact.
    Generate(generate::GenerateArgs),
    /// Convert an artifact into a randomized dispatch block.
    Convert(convert::ConvertArgs),
    /// Re-validate every annotation of an existing artifact numerically.
    Check(check::CheckArgs),
}

/// Trait for executing CLI subcommands.
#[async_trait]
pub trait Command {
    /// Executes the subcommand.
    ///
    /// # Returns
    /// A `Result` indicating success or an error if execution fails.
    async fn execute(self) -> Result<(), Box<dyn Error>>;
}

#[async_trait]
impl Command for Cmd {
    async fn execute(self) -> Result<(), Box<dyn Error>> {
        match self {
            Cmd::Generate(args) => args.execute().await,
            Cmd::Convert(args) => args.execute().await,
            Cmd::Check(args) => args.execute().await,
        }
    }
}
