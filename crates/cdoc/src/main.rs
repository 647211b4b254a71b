//! cdoc CLI - component-doc tag rewriter.
//!
//! Provides commands for:
//! - `rewrite`: Rewrite doc tags in files and directories
//! - `check`: Report which files contain doc tags and whether they rewrite cleanly

mod commands;
mod error;
mod output;

use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use commands::{CheckArgs, RewriteArgs};
use output::Output;

/// cdoc - component-doc tag rewriter.
#[derive(Parser)]
#[command(name = "cdoc", version, about)]
struct Cli {
    /// Enable info-level logging (otherwise RUST_LOG applies).
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Rewrite doc tags into demo components.
    Rewrite(RewriteArgs),
    /// Report doc tag occurrences without writing anything.
    Check(CheckArgs),
}

fn main() {
    let cli = Cli::parse();
    let output = Output::new();

    // --verbose enables INFO level, otherwise RUST_LOG applies (ERROR when unset)
    let filter = if cli.verbose {
        EnvFilter::new("info")
    } else {
        EnvFilter::from_default_env()
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let result = match cli.command {
        Commands::Rewrite(args) => args.execute(),
        Commands::Check(args) => args.execute(),
    };

    if let Err(err) = result {
        output.error(&format!("Error: {err}"));
        std::process::exit(1);
    }
}
