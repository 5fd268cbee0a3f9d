//! # mesh-lint-core
//!
//! Core framework for analyzing service-mesh configuration.
//!
//! This crate provides the foundational types for building configuration
//! analyzers. It includes:
//!
//! - [`Snapshot`] and [`Resource`] for loaded configuration
//! - [`Analyzer`] trait and [`Driver`] for orchestrating analysis
//! - [`Message`] and [`Messages`] for diagnostics
//! - [`position`] for mapping field paths back to YAML source lines
//!
//! ## Example
//!
//! ```ignore
//! use mesh_lint_core::{loader::Loader, Driver, MessageCatalog};
//!
//! let catalog = MessageCatalog::builtin();
//! let outcome = Loader::new(&catalog, "default").load_files(&paths)?;
//!
//! let driver = Driver::builder().analyzer(MyAnalyzer).build()?;
//! let result = driver.analyze_with(&outcome.snapshot, outcome.messages);
//! for message in &result.messages {
//!     println!("{message}");
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod analyzer;
mod config;
mod context;
mod resource;
mod snapshot;

pub mod diag;
pub mod host;
pub mod loader;
pub mod model;
pub mod msg;
pub mod position;

pub use analyzer::{
    AnalysisResult, Analyzer, AnalyzerBox, Driver, DriverBuilder, DriverError, Metadata,
};
pub use config::{AnalyzerConfig, AnalyzerSettings, CatalogConfig, Config, ConfigError, MessageSettings};
pub use context::{Context, SnapshotContext};
pub use diag::{Level, Message, MessageCatalog, Messages, StructuredMessage};
pub use resource::{CollectionName, FullName, Namespace, Origin, Payload, Reference, Resource};
pub use snapshot::Snapshot;
