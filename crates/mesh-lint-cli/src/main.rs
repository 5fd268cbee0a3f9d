//! mesh-lint CLI tool.
//!
//! Usage:
//! ```bash
//! mesh-lint analyze [OPTIONS] [FILES]...
//! mesh-lint list-analyzers
//! mesh-lint init
//! ```

use anyhow::Result;
use clap::{Parser, Subcommand};
use mesh_lint_core::Level;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

mod commands;
mod config_resolver;

/// Static analyzer for service-mesh routing configuration
#[derive(Parser)]
#[command(name = "mesh-lint")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "MESH_LINT_CONFIG")]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Analyze configuration files
    Analyze(commands::analyze::AnalyzeArgs),

    /// List available analyzers
    ListAnalyzers,

    /// Initialize configuration file
    Init {
        /// Overwrite existing config
        #[arg(long)]
        force: bool,
    },
}

/// Output format for analysis results.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    /// One rendered line per message.
    #[default]
    Text,
    /// JSON array of structured messages.
    Json,
    /// YAML list of structured messages.
    Yaml,
}

/// Parses a `--output-threshold` value.
fn parse_level(s: &str) -> Result<Level, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Analyze(args) => {
            let config = config_resolver::load(&args.files, cli.config.as_deref())?;
            let has_errors = commands::analyze::run(&args, config)?;
            if has_errors {
                std::process::exit(1);
            }
            Ok(())
        }
        Commands::ListAnalyzers => {
            commands::list_analyzers::run();
            Ok(())
        }
        Commands::Init { force } => commands::init::run(force),
    }
}
