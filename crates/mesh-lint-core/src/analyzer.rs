//! Analyzer trait and the driver that runs analyzers over a snapshot.

use crate::config::Config;
use crate::context::{Context, SnapshotContext};
use crate::diag::{CatalogError, MessageCatalog, Messages};
use crate::msg;
use crate::position::resolve_lines;
use crate::resource::CollectionName;
use crate::snapshot::Snapshot;

use rayon::prelude::*;
use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use thiserror::Error;
use tracing::{debug, info, warn};

/// Describes an analyzer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Metadata {
    /// Unique analyzer name, e.g. `virtualservice.GatewayAnalyzer`.
    pub name: String,
    /// What the analyzer checks.
    pub description: String,
    /// Collections the analyzer reads.
    pub inputs: Vec<CollectionName>,
}

/// A check that runs once per snapshot and reports findings.
///
/// # Example
///
/// ```ignore
/// use mesh_lint_core::{Analyzer, CollectionName, Context};
///
/// pub struct NoEmptyHosts;
///
/// impl Analyzer for NoEmptyHosts {
///     fn name(&self) -> &'static str { "virtualservice.NoEmptyHosts" }
///     fn inputs(&self) -> Vec<CollectionName> { vec![CollectionName::VIRTUAL_SERVICES] }
///
///     fn analyze(&self, ctx: &dyn Context) {
///         ctx.for_each(&CollectionName::VIRTUAL_SERVICES, &mut |r| {
///             // inspect r, ctx.report(..)
///             true
///         });
///     }
/// }
/// ```
pub trait Analyzer: Send + Sync {
    /// Returns the unique name of this analyzer.
    fn name(&self) -> &'static str;

    /// Returns a brief description of what this analyzer checks.
    fn description(&self) -> &'static str {
        ""
    }

    /// Returns the collections this analyzer reads.
    fn inputs(&self) -> Vec<CollectionName>;

    /// Inspects the snapshot behind `ctx` and reports findings to it.
    fn analyze(&self, ctx: &dyn Context);

    /// Returns name, description and inputs together.
    fn metadata(&self) -> Metadata {
        Metadata {
            name: self.name().to_string(),
            description: self.description().to_string(),
            inputs: self.inputs(),
        }
    }
}

/// Type alias for boxed Analyzer trait objects.
pub type AnalyzerBox = Box<dyn Analyzer>;

/// Errors that can occur while setting up a run.
#[derive(Debug, Error)]
pub enum DriverError {
    /// The configured message overrides are invalid.
    #[error("Catalog error: {0}")]
    Catalog(#[from] CatalogError),

    /// The worker pool could not be created.
    #[error("Failed to build thread pool: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

/// Outcome of one run.
#[derive(Debug, Default)]
pub struct AnalysisResult {
    /// Sorted, deduplicated and filtered messages.
    pub messages: Messages,
    /// Names of the analyzers that ran.
    pub analyzers_run: Vec<String>,
    /// Names of the analyzers that were skipped.
    pub analyzers_skipped: Vec<String>,
}

impl AnalysisResult {
    /// Returns true if any reported message is an error.
    #[must_use]
    pub fn has_errors(&self) -> bool {
        self.messages.has_errors()
    }

    /// Counts messages as (errors, warnings, infos).
    #[must_use]
    pub fn count_by_level(&self) -> (usize, usize, usize) {
        self.messages.count_by_level()
    }
}

/// Builder for configuring a [`Driver`].
#[derive(Default)]
pub struct DriverBuilder {
    analyzers: Vec<AnalyzerBox>,
    config: Option<Config>,
    catalog: Option<MessageCatalog>,
    parallelism: Option<usize>,
}

impl DriverBuilder {
    /// Creates a new builder with default settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers an analyzer.
    #[must_use]
    pub fn analyzer<A: Analyzer + 'static>(mut self, analyzer: A) -> Self {
        self.analyzers.push(Box::new(analyzer));
        self
    }

    /// Registers a boxed analyzer.
    #[must_use]
    pub fn analyzer_box(mut self, analyzer: AnalyzerBox) -> Self {
        self.analyzers.push(analyzer);
        self
    }

    /// Sets the configuration.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Sets the message catalog, bypassing the configured overrides.
    #[must_use]
    pub fn catalog(mut self, catalog: MessageCatalog) -> Self {
        self.catalog = Some(catalog);
        self
    }

    /// Sets how many analyzers may run at once.
    #[must_use]
    pub fn parallelism(mut self, threads: usize) -> Self {
        self.parallelism = Some(threads);
        self
    }

    /// Builds the driver.
    ///
    /// # Errors
    ///
    /// Returns an error if the configured catalog overrides are invalid or
    /// the worker pool cannot be created.
    pub fn build(self) -> Result<Driver, DriverError> {
        let config = self.config.unwrap_or_default();
        let catalog = match self.catalog {
            Some(catalog) => catalog,
            None => config.build_catalog()?,
        };

        let threads = self
            .parallelism
            .or(config.analyzer.parallelism)
            .unwrap_or(1);
        let pool = if threads > 1 {
            Some(
                rayon::ThreadPoolBuilder::new()
                    .num_threads(threads)
                    .thread_name(|i| format!("mesh-lint-{i}"))
                    .build()?,
            )
        } else {
            None
        };

        Ok(Driver {
            analyzers: self.analyzers,
            config,
            catalog,
            pool,
        })
    }
}

/// Runs analyzers over a snapshot and post-processes their findings.
///
/// Use [`Driver::builder()`] to construct an instance.
pub struct Driver {
    analyzers: Vec<AnalyzerBox>,
    config: Config,
    catalog: MessageCatalog,
    pool: Option<rayon::ThreadPool>,
}

impl Driver {
    /// Creates a new builder for configuring a driver.
    #[must_use]
    pub fn builder() -> DriverBuilder {
        DriverBuilder::new()
    }

    /// Returns the number of registered analyzers.
    #[must_use]
    pub fn analyzer_count(&self) -> usize {
        self.analyzers.len()
    }

    /// Returns the metadata of every registered analyzer.
    #[must_use]
    pub fn metadata(&self) -> Vec<Metadata> {
        self.analyzers.iter().map(|a| a.metadata()).collect()
    }

    /// Returns the catalog used for this driver's runs.
    #[must_use]
    pub fn catalog(&self) -> &MessageCatalog {
        &self.catalog
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Runs every enabled analyzer over `snapshot`.
    #[must_use]
    pub fn analyze(&self, snapshot: &Snapshot) -> AnalysisResult {
        self.analyze_with(snapshot, Messages::new())
    }

    /// Runs every enabled analyzer and merges `extra` (e.g. loader findings)
    /// into the result before post-processing.
    #[must_use]
    pub fn analyze_with(&self, snapshot: &Snapshot, extra: Messages) -> AnalysisResult {
        info!(
            "Starting analysis of {} resources with {} analyzers",
            snapshot.len(),
            self.analyzers.len()
        );

        let mut selected: Vec<&dyn Analyzer> = Vec::new();
        let mut skipped = Vec::new();
        for analyzer in &self.analyzers {
            let name = analyzer.name();
            if !self.config.is_analyzer_enabled(name) {
                debug!("Skipping disabled analyzer: {}", name);
                skipped.push(name.to_string());
                continue;
            }
            if let Some(missing) = analyzer
                .inputs()
                .into_iter()
                .find(|c| !snapshot.has_collection(c))
            {
                debug!("Skipping analyzer {}: input {} is not present", name, missing);
                skipped.push(name.to_string());
                continue;
            }
            selected.push(&**analyzer);
        }

        let outputs: Vec<Messages> = match &self.pool {
            Some(pool) => pool.install(|| {
                selected
                    .par_iter()
                    .map(|a| self.run_one(*a, snapshot))
                    .collect()
            }),
            None => selected
                .iter()
                .map(|a| self.run_one(*a, snapshot))
                .collect(),
        };

        let mut merged = extra;
        for output in outputs {
            merged.extend(output);
        }
        resolve_lines(&mut merged);

        let threshold = self.config.threshold();
        let mut messages = merged
            .sorted_deduped_copy()
            .filter_out_lower_than(threshold);
        if let Some(tag) = self.config.doc_ref.as_deref() {
            messages.set_doc_ref(tag);
        }

        let (errors, warnings, infos) = messages.count_by_level();
        info!(
            "Analysis complete: {} error(s), {} warning(s), {} info(s) at threshold {}",
            errors, warnings, infos, threshold
        );

        AnalysisResult {
            messages,
            analyzers_run: selected.iter().map(|a| a.name().to_string()).collect(),
            analyzers_skipped: skipped,
        }
    }

    fn run_one(&self, analyzer: &dyn Analyzer, snapshot: &Snapshot) -> Messages {
        debug!("Running analyzer: {}", analyzer.name());
        let ctx = SnapshotContext::new(snapshot, &self.catalog);
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| analyzer.analyze(&ctx)));
        let mut messages = ctx.into_messages();
        if let Err(payload) = outcome {
            let detail = format!(
                "analyzer {} panicked: {}",
                analyzer.name(),
                panic_detail(payload.as_ref())
            );
            warn!("{}", detail);
            messages.add(msg::internal_error(&self.catalog, None, &detail));
        }
        messages
    }
}

fn panic_detail(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Gateway;
    use crate::resource::{FullName, Payload, Resource};

    struct Reporter {
        name: &'static str,
        count: usize,
    }

    impl Analyzer for Reporter {
        fn name(&self) -> &'static str {
            self.name
        }

        fn inputs(&self) -> Vec<CollectionName> {
            vec![CollectionName::GATEWAYS]
        }

        fn analyze(&self, ctx: &dyn Context) {
            ctx.for_each(&CollectionName::GATEWAYS, &mut |r| {
                for i in 0..self.count {
                    ctx.report(msg::schema_warning(
                        ctx.catalog(),
                        Some(r),
                        &format!("{} #{i}", self.name),
                    ));
                }
                true
            });
        }
    }

    struct Panics;

    impl Analyzer for Panics {
        fn name(&self) -> &'static str {
            "test.Panics"
        }

        fn inputs(&self) -> Vec<CollectionName> {
            Vec::new()
        }

        fn analyze(&self, _ctx: &dyn Context) {
            panic!("boom");
        }
    }

    struct NeedsVirtualServices;

    impl Analyzer for NeedsVirtualServices {
        fn name(&self) -> &'static str {
            "test.NeedsVirtualServices"
        }

        fn description(&self) -> &'static str {
            "Reads virtual services"
        }

        fn inputs(&self) -> Vec<CollectionName> {
            vec![CollectionName::VIRTUAL_SERVICES]
        }

        fn analyze(&self, _ctx: &dyn Context) {}
    }

    fn snapshot() -> Snapshot {
        let mut snapshot = Snapshot::new();
        snapshot.insert(Resource::new(
            FullName::new("ns", "gw"),
            Payload::Gateway(Gateway::default()),
        ));
        snapshot
    }

    #[test]
    fn test_builder() {
        let driver = Driver::builder()
            .analyzer(Reporter { name: "a", count: 1 })
            .analyzer(NeedsVirtualServices)
            .build()
            .expect("Failed to build driver");

        assert_eq!(driver.analyzer_count(), 2);
        assert_eq!(driver.metadata()[1].description, "Reads virtual services");
    }

    #[test]
    fn test_skips_analyzers_with_missing_inputs() {
        let driver = Driver::builder()
            .analyzer(Reporter { name: "a", count: 1 })
            .analyzer(NeedsVirtualServices)
            .build()
            .expect("Failed to build driver");

        let result = driver.analyze(&snapshot());
        assert_eq!(result.analyzers_run, ["a"]);
        assert_eq!(result.analyzers_skipped, ["test.NeedsVirtualServices"]);
        assert_eq!(result.messages.len(), 1);
    }

    #[test]
    fn test_skips_disabled_analyzers() {
        let config = Config::parse("[analyzers.a]\nenabled = false\n").expect("parse");
        let driver = Driver::builder()
            .analyzer(Reporter { name: "a", count: 1 })
            .config(config)
            .build()
            .expect("Failed to build driver");

        let result = driver.analyze(&snapshot());
        assert!(result.analyzers_run.is_empty());
        assert!(result.messages.is_empty());
    }

    #[test]
    fn test_panic_becomes_internal_error() {
        let driver = Driver::builder()
            .analyzer(Panics)
            .analyzer(Reporter { name: "a", count: 1 })
            .build()
            .expect("Failed to build driver");

        let result = driver.analyze(&snapshot());
        let codes: Vec<_> = result.messages.iter().map(|m| m.code().to_string()).collect();
        assert_eq!(codes, ["IST0001", "IST0133"]);
        assert!(result.messages.iter().next().is_some_and(|m| m
            .render()
            .contains("analyzer test.Panics panicked: boom")));
        assert!(result.has_errors());
    }

    #[test]
    fn test_parallel_run_matches_sequential() {
        let build = |threads| {
            Driver::builder()
                .analyzer(Reporter { name: "a", count: 3 })
                .analyzer(Reporter { name: "b", count: 2 })
                .analyzer(Reporter { name: "c", count: 1 })
                .parallelism(threads)
                .build()
                .expect("Failed to build driver")
        };
        let render = |r: AnalysisResult| -> Vec<String> {
            r.messages.iter().map(|m| m.render()).collect()
        };

        let sequential = render(build(1).analyze(&snapshot()));
        let parallel = render(build(4).analyze(&snapshot()));
        assert_eq!(sequential.len(), 6);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn test_threshold_and_doc_ref_are_applied() {
        let config =
            Config::parse("output_threshold = \"error\"\ndoc_ref = \"ci\"\n").expect("parse");
        let driver = Driver::builder()
            .analyzer(Panics)
            .analyzer(Reporter { name: "a", count: 1 })
            .config(config)
            .build()
            .expect("Failed to build driver");

        let result = driver.analyze(&snapshot());
        assert_eq!(result.messages.len(), 1);
        let message = result.messages.iter().next().expect("one message");
        assert!(message.documentation_url().ends_with("/ist0001/?ref=ci"));
    }
}
