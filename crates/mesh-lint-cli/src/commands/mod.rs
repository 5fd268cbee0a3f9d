//! Subcommand implementations.

pub mod analyze;
pub mod init;
pub mod list_analyzers;
pub mod output;
