//! # mesh-lint-analyzers
//!
//! Built-in analyzers for mesh-lint.
//!
//! ## Available Analyzers
//!
//! | Name | Reports | Description |
//! |------|---------|-------------|
//! | `virtualservice.GatewayAnalyzer` | IST0101, IST0132 | Dangling gateway references and hosts no gateway serves |
//! | `virtualservice.RegexAnalyzer` | IST0122 | Regex-typed matches that do not compile |
//!
//! ## Usage
//!
//! ```ignore
//! use mesh_lint_analyzers::{GatewayAnalyzer, RegexAnalyzer};
//! use mesh_lint_core::Driver;
//!
//! let driver = Driver::builder()
//!     .analyzer(GatewayAnalyzer::new())
//!     .analyzer(RegexAnalyzer::new())
//!     .build()?;
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod gateways;
mod presets;
mod regexes;
mod util;

pub use gateways::GatewayAnalyzer;
pub use presets::{all_analyzers, by_names, UnknownAnalyzer};
pub use regexes::RegexAnalyzer;
pub use util::MESH_GATEWAY;

/// Re-export core types for convenience.
pub use mesh_lint_core::{Analyzer, Context, Message};
