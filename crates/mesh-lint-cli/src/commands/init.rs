//! Init command implementation.

use anyhow::{bail, Result};
use std::path::Path;

const DEFAULT_CONFIG: &str = r#"# mesh-lint configuration

# Lowest level to report: "Error", "Warning" or "Info"
output_threshold = "Info"

# Tag appended to documentation links as ?ref=<tag>
# doc_ref = "ci"

[analyzer]
# Namespace for resources that do not declare one
default_namespace = "default"

# Glob patterns to exclude when discovering input files
exclude = [
    "**/charts/**",
    "**/testdata/**",
]

# Respect .gitignore files
respect_gitignore = true

# Number of analyzers to run in parallel
# parallelism = 4

# Analyzer configurations

[analyzers."virtualservice.GatewayAnalyzer"]
enabled = true

[analyzers."virtualservice.RegexAnalyzer"]
enabled = true

# Message level overrides, keyed by message name
# [messages.InvalidRegexp]
# level = "Error"

# [catalog]
# doc_prefix = "https://istio.io/latest/docs/reference/config/analysis"
"#;

/// Runs the init command.
pub fn run(force: bool) -> Result<()> {
    write_config(Path::new(crate::config_resolver::PROJECT_CONFIG_NAMES[0]), force)?;

    println!("Created mesh-lint.toml");
    println!("\nNext steps:");
    println!("  1. Edit mesh-lint.toml to configure analyzers");
    println!("  2. Run: mesh-lint analyze ./manifests");

    Ok(())
}

fn write_config(config_path: &Path, force: bool) -> Result<()> {
    if config_path.exists() && !force {
        bail!(
            "Configuration file already exists at {}. Use --force to overwrite.",
            config_path.display()
        );
    }
    std::fs::write(config_path, DEFAULT_CONFIG)?;
    Ok(())
}
