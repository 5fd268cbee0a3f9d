//! Analyzer presets.

use crate::{GatewayAnalyzer, RegexAnalyzer};
use mesh_lint_core::AnalyzerBox;
use thiserror::Error;

/// A requested analyzer name is not registered.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown analyzer `{name}` (available: {available})")]
pub struct UnknownAnalyzer {
    /// The requested name.
    pub name: String,
    /// Comma-separated list of registered names.
    pub available: String,
}

/// Returns every built-in analyzer.
#[must_use]
pub fn all_analyzers() -> Vec<AnalyzerBox> {
    vec![Box::new(GatewayAnalyzer::new()), Box::new(RegexAnalyzer::new())]
}

/// Returns the built-in analyzers named in `names`, in the order given.
///
/// # Errors
///
/// Returns an error for the first name that is not registered.
pub fn by_names<S: AsRef<str>>(names: &[S]) -> Result<Vec<AnalyzerBox>, UnknownAnalyzer> {
    let mut registry = all_analyzers();
    let mut selected = Vec::with_capacity(names.len());
    for name in names {
        let name = name.as_ref();
        let Some(pos) = registry.iter().position(|a| a.name() == name) else {
            if selected.iter().any(|a: &AnalyzerBox| a.name() == name) {
                continue;
            }
            return Err(UnknownAnalyzer {
                name: name.to_string(),
                available: all_analyzers()
                    .iter()
                    .map(|a| a.name())
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        };
        selected.push(registry.remove(pos));
    }
    Ok(selected)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_analyzers_have_unique_names() {
        let names: Vec<_> = all_analyzers().iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            ["virtualservice.GatewayAnalyzer", "virtualservice.RegexAnalyzer"]
        );
    }

    #[test]
    fn test_by_names_keeps_order_and_skips_repeats() {
        let selected = by_names(&[
            "virtualservice.RegexAnalyzer",
            "virtualservice.GatewayAnalyzer",
            "virtualservice.RegexAnalyzer",
        ])
        .expect("names are registered");
        let names: Vec<_> = selected.iter().map(|a| a.name()).collect();
        assert_eq!(
            names,
            ["virtualservice.RegexAnalyzer", "virtualservice.GatewayAnalyzer"]
        );
    }

    #[test]
    fn test_unknown_name_lists_available() {
        let err = by_names(&["nope"]).err().expect("unknown name");
        assert_eq!(err.name, "nope");
        assert!(err.to_string().contains("virtualservice.GatewayAnalyzer"));
    }
}
