//! Analyze command implementation.

use anyhow::{Context, Result};
use clap::Args;
use mesh_lint_analyzers::{all_analyzers, by_names};
use mesh_lint_core::loader::{discover_files, Loader};
use mesh_lint_core::{Config, Driver, Level};
use std::path::PathBuf;

use crate::OutputFormat;

/// Arguments of `mesh-lint analyze`.
#[derive(Debug, Args)]
pub struct AnalyzeArgs {
    /// Files or directories to analyze; `-` reads standard input
    #[arg(default_value = ".")]
    pub files: Vec<PathBuf>,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Lowest message level to report (Error, Warning, Info)
    #[arg(long, value_parser = crate::parse_level)]
    pub output_threshold: Option<Level>,

    /// Namespace for resources that do not declare one
    #[arg(short, long)]
    pub namespace: Option<String>,

    /// Tag appended to documentation links as `?ref=<tag>`
    #[arg(long)]
    pub doc_ref: Option<String>,

    /// Only run specific analyzers (comma-separated)
    #[arg(long, value_delimiter = ',')]
    pub analyzers: Vec<String>,

    /// Exclude patterns (can be specified multiple times)
    #[arg(short, long)]
    pub exclude: Vec<String>,

    /// Include the originating resource in structured output
    #[arg(long)]
    pub list_origin: bool,
}

/// Applies command-line overrides on top of the file configuration.
fn apply_overrides(config: &mut Config, args: &AnalyzeArgs) {
    if let Some(level) = args.output_threshold {
        config.output_threshold = Some(level);
    }
    if let Some(tag) = &args.doc_ref {
        config.doc_ref = Some(tag.clone());
    }
    if let Some(ns) = &args.namespace {
        config.analyzer.default_namespace.clone_from(ns);
    }
    config.analyzer.exclude.extend(args.exclude.iter().cloned());
}

/// Runs the analyze command on top of the file configuration.
///
/// Returns true when error-level messages remain.
pub fn run(args: &AnalyzeArgs, mut config: Config) -> Result<bool> {
    apply_overrides(&mut config, args);

    let catalog = config
        .build_catalog()
        .context("Invalid [messages] configuration")?;

    let files = discover_files(
        &args.files,
        &config.analyzer.exclude,
        config.analyzer.respect_gitignore,
    )
    .context("Failed to discover input files")?;
    let outcome = Loader::new(&catalog, config.analyzer.default_namespace.clone())
        .load_files(&files)
        .context("Failed to load input files")?;

    let analyzers = if args.analyzers.is_empty() {
        all_analyzers()
    } else {
        by_names(&args.analyzers)?
    };

    let mut builder = Driver::builder().config(config).catalog(catalog);
    for analyzer in analyzers {
        builder = builder.analyzer_box(analyzer);
    }
    let driver = builder.build().context("Failed to build driver")?;

    tracing::info!(
        "Analyzing {} file(s) with {} analyzers",
        files.len(),
        driver.analyzer_count()
    );

    let result = driver.analyze_with(&outcome.snapshot, outcome.messages);
    super::output::print(&result, args.format, args.list_origin, outcome.files_read)?;

    Ok(result.has_errors())
}
