//! Locates and loads the configuration for an analysis run.
//!
//! Lookup order:
//!
//! 1. `--config` (must exist)
//! 2. `mesh-lint.toml` or `.mesh-lint.toml` in the directory of the first
//!    analyzed input, then in each of its ancestors; the nearest wins
//! 3. `$MESH_LINT_CONFIG_DIR/config.toml`, else `~/.mesh-lint/config.toml`
//! 4. defaults
//!
//! Standard input has no directory, so a run that only reads `-` starts the
//! project lookup from the working directory.

use anyhow::{Context, Result};
use mesh_lint_core::loader::STDIN;
use mesh_lint_core::Config;
use std::path::{Path, PathBuf};

/// Project-level config file names, checked in order within each directory.
pub const PROJECT_CONFIG_NAMES: &[&str] = &["mesh-lint.toml", ".mesh-lint.toml"];

const GLOBAL_CONFIG_NAME: &str = "config.toml";

/// Loads the configuration that applies to `inputs`.
pub fn load(inputs: &[PathBuf], explicit: Option<&Path>) -> Result<Config> {
    load_with(inputs, explicit, global_config_dir())
}

fn load_with(inputs: &[PathBuf], explicit: Option<&Path>, global_dir: Option<PathBuf>) -> Result<Config> {
    let path = match explicit {
        Some(p) => p.to_path_buf(),
        None => match project_config(inputs) {
            Some(p) => p,
            None => match global_dir.map(|d| d.join(GLOBAL_CONFIG_NAME)).filter(|p| p.is_file()) {
                Some(p) => {
                    tracing::info!("Using global config: {}", p.display());
                    p
                }
                None => {
                    tracing::debug!("No config file found, using defaults");
                    return Ok(Config::default());
                }
            },
        },
    };
    tracing::debug!("Loading config from {}", path.display());
    Config::from_file(&path).with_context(|| format!("Failed to load config: {}", path.display()))
}

/// Searches the first input's directory and its ancestors.
fn project_config(inputs: &[PathBuf]) -> Option<PathBuf> {
    let start = lookup_root(inputs)?;
    start
        .ancestors()
        .flat_map(|dir| PROJECT_CONFIG_NAMES.iter().map(move |name| dir.join(name)))
        .find(|candidate| candidate.is_file())
}

fn lookup_root(inputs: &[PathBuf]) -> Option<PathBuf> {
    let Some(first) = inputs.iter().find(|p| p.as_os_str() != STDIN) else {
        return std::env::current_dir().ok();
    };
    let dir = if first.is_dir() {
        first.as_path()
    } else {
        first.parent().unwrap_or(Path::new(""))
    };
    let dir = if dir.as_os_str().is_empty() { Path::new(".") } else { dir };
    dir.canonicalize().ok()
}

/// Returns the global config directory: `$MESH_LINT_CONFIG_DIR`, else
/// `~/.mesh-lint/`.
#[must_use]
pub fn global_config_dir() -> Option<PathBuf> {
    if let Ok(dir) = std::env::var("MESH_LINT_CONFIG_DIR") {
        return Some(PathBuf::from(dir));
    }
    home::home_dir().map(|h| h.join(".mesh-lint"))
}
