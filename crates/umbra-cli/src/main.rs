use clap::Parser;
use umbra_cli::commands::{Cmd, Command};

/// Umbra CLI
///
/// Umbra synthesizes opaque predicates: operation chains over a hidden input that are
/// proven constant by an SMT solver, confirmed numerically, and packaged as a
/// randomized dispatch block for an obfuscating assembler
#[derive(Parser)]
#[command(name = "umbra")]
#[command(about = "Umbra: opaque predicate synthesizer")]
struct Cli {
    /// Log every chain and refinement step.
    #[arg(short, long, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Cmd,
}

/// Runs the Umbra CLI with the provided arguments.
#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();
    let level = if cli.verbose {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_ansi(false)
        .without_time()
        .with_writer(std::io::stderr)
        .init();

    cli.command.execute().await
}
