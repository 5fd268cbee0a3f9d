//! Shared output formatting for analysis results.

use anyhow::Result;
use mesh_lint_core::{AnalysisResult, StructuredMessage};

use crate::OutputFormat;

/// Print analysis results in the specified format.
///
/// Messages go to stdout; the text summary goes to stderr.
pub fn print(
    result: &AnalysisResult,
    format: OutputFormat,
    include_origin: bool,
    files_read: usize,
) -> Result<()> {
    match format {
        OutputFormat::Text => print_text(result, files_read),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&structured(result, include_origin))?),
        OutputFormat::Yaml => print!("{}", serde_yaml::to_string(&structured(result, include_origin))?),
    }
    Ok(())
}

fn structured(result: &AnalysisResult, include_origin: bool) -> Vec<StructuredMessage> {
    result
        .messages
        .iter()
        .map(|m| m.to_structured(include_origin))
        .collect()
}

fn print_text(result: &AnalysisResult, files_read: usize) {
    for message in &result.messages {
        println!("{message}");
    }

    let (errors, warnings, infos) = result.count_by_level();
    if errors + warnings + infos == 0 {
        eprintln!("\x1b[32m✔ No validation issues found when analyzing {files_read} file(s).\x1b[0m");
        return;
    }

    let summary_color = if errors > 0 { "\x1b[31m" } else { "\x1b[33m" };
    eprintln!(
        "{summary_color}Found {errors} error(s), {warnings} warning(s), {infos} info(s) in {files_read} file(s)\x1b[0m"
    );
}
