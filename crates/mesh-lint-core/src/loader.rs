//! Loading YAML resource files into a [`Snapshot`].
//!
//! Each file is split into documents at `---` lines. Documents of a known
//! kind are decoded into typed resources that keep their chunk text so line
//! numbers can be recovered later. Undecodable documents become
//! `SchemaValidationError` messages rather than load failures.

use crate::diag::{MessageCatalog, Messages};
use crate::model::{Gateway, VirtualService};
use crate::msg;
use crate::resource::{CollectionName, FullName, Namespace, Payload, Reference, Resource};
use crate::snapshot::Snapshot;

use serde::Deserialize;
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, info};

/// Identifier used for standard input.
pub const STDIN: &str = "-";

const NETWORKING_GROUP: &str = "networking.istio.io/";

/// Errors that abort loading.
#[derive(Debug, Error)]
pub enum LoadError {
    /// A file could not be read.
    #[error("Failed to read {path}: {source}")]
    Io {
        /// Path that failed to read.
        path: PathBuf,
        /// Underlying IO error.
        source: std::io::Error,
    },

    /// An exclude pattern is invalid.
    #[error("Invalid glob pattern: {0}")]
    Glob(#[from] glob::PatternError),

    /// Directory traversal failed.
    #[error("Failed to walk directory: {0}")]
    Walk(#[from] ignore::Error),
}

/// Resources and loader findings.
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Loaded resources.
    pub snapshot: Snapshot,
    /// Schema findings produced while loading.
    pub messages: Messages,
    /// Number of inputs read.
    pub files_read: usize,
}

/// A document of a multi-document YAML stream.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 1-based line of the chunk's first line within the stream.
    pub start_line: usize,
    /// Raw chunk text.
    pub text: String,
}

/// Splits `content` at `---` separator lines.
///
/// Chunks with no content besides blank lines and comments are dropped.
#[must_use]
pub fn split_documents(content: &str) -> Vec<Chunk> {
    let mut chunks = Vec::new();
    let mut start_line = 1;
    let mut lines: Vec<&str> = Vec::new();

    for (idx, line) in content.lines().enumerate() {
        if line.trim_end() == "---" {
            push_chunk(&mut chunks, start_line, &lines);
            lines.clear();
            start_line = idx + 2;
            continue;
        }
        lines.push(line);
    }
    push_chunk(&mut chunks, start_line, &lines);
    chunks
}

fn push_chunk(chunks: &mut Vec<Chunk>, start_line: usize, lines: &[&str]) {
    let has_content = lines.iter().any(|l| {
        let t = l.trim();
        !t.is_empty() && !t.starts_with('#')
    });
    if has_content {
        chunks.push(Chunk {
            start_line,
            text: lines.join("\n"),
        });
    }
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
struct RawDocument {
    api_version: String,
    kind: String,
    metadata: RawMetadata,
    spec: serde_yaml::Value,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
struct RawMetadata {
    name: String,
    namespace: Option<String>,
}

/// Reads YAML resources into a snapshot.
#[derive(Debug)]
pub struct Loader<'a> {
    catalog: &'a MessageCatalog,
    default_namespace: Namespace,
}

impl<'a> Loader<'a> {
    /// Creates a loader that places namespace-less resources in `default_namespace`.
    #[must_use]
    pub fn new(catalog: &'a MessageCatalog, default_namespace: impl Into<String>) -> Self {
        Self {
            catalog,
            default_namespace: Namespace::new(default_namespace),
        }
    }

    /// Returns an empty outcome whose snapshot declares every known collection.
    #[must_use]
    pub fn empty_outcome() -> LoadOutcome {
        let mut outcome = LoadOutcome::default();
        outcome.snapshot.declare(CollectionName::VIRTUAL_SERVICES);
        outcome.snapshot.declare(CollectionName::GATEWAYS);
        outcome
    }

    /// Loads every path; `-` reads standard input.
    ///
    /// # Errors
    ///
    /// Returns an error if an input cannot be read.
    pub fn load_files(&self, paths: &[PathBuf]) -> Result<LoadOutcome, LoadError> {
        let mut outcome = Self::empty_outcome();
        for path in paths {
            let content = read_input(path)?;
            self.load_str(&path.to_string_lossy(), &content, &mut outcome);
            outcome.files_read += 1;
        }
        info!(
            "Loaded {} resources from {} input(s)",
            outcome.snapshot.len(),
            outcome.files_read
        );
        Ok(outcome)
    }

    /// Loads the documents of one stream named `file`.
    pub fn load_str(&self, file: &str, content: &str, outcome: &mut LoadOutcome) {
        for chunk in split_documents(content) {
            self.load_chunk(file, chunk, outcome);
        }
    }

    fn load_chunk(&self, file: &str, chunk: Chunk, outcome: &mut LoadOutcome) {
        let location = format!("{file}:{}", chunk.start_line);
        let raw: RawDocument = match serde_yaml::from_str(&chunk.text) {
            Ok(raw) => raw,
            Err(e) => {
                outcome.messages.add(msg::schema_validation_error(
                    self.catalog,
                    None,
                    &format!("{location}: {e}"),
                ));
                return;
            }
        };

        if !raw.api_version.starts_with(NETWORKING_GROUP)
            || !matches!(raw.kind.as_str(), "VirtualService" | "Gateway")
        {
            debug!("Skipping {} {} at {}", raw.api_version, raw.kind, location);
            return;
        }
        if raw.metadata.name.is_empty() {
            outcome.messages.add(msg::schema_validation_error(
                self.catalog,
                None,
                &format!("{location}: {} is missing metadata.name", raw.kind),
            ));
            return;
        }

        let namespace = raw
            .metadata
            .namespace
            .filter(|ns| !ns.is_empty())
            .map_or_else(|| self.default_namespace.clone(), Namespace::new);
        let full_name = FullName {
            namespace,
            name: raw.metadata.name,
        };
        let reference = Reference::new(file, chunk.start_line).with_source(chunk.text);

        let payload = match decode_payload(&raw.kind, raw.spec) {
            Ok(payload) => payload,
            Err((placeholder, e)) => {
                let resource = Arc::new(Resource::new(full_name, placeholder).with_reference(reference));
                outcome.messages.add(msg::schema_validation_error(
                    self.catalog,
                    Some(&resource),
                    &e.to_string(),
                ));
                return;
            }
        };

        let resource = Resource::new(full_name, payload).with_reference(reference);
        let collection = resource.payload().collection();
        if outcome
            .snapshot
            .find(&collection, resource.full_name())
            .is_some()
        {
            let detail = format!(
                "duplicate {} {}; the first definition is used",
                resource.origin().kind(),
                resource.full_name()
            );
            outcome.messages.add(msg::schema_warning(
                self.catalog,
                Some(&Arc::new(resource)),
                &detail,
            ));
            return;
        }
        outcome.snapshot.insert(resource);
    }
}

/// Decodes a `spec` block; on failure returns an empty payload of the same
/// kind so the error can still name the resource.
fn decode_payload(kind: &str, spec: serde_yaml::Value) -> Result<Payload, (Payload, serde_yaml::Error)> {
    let spec = if spec.is_null() {
        serde_yaml::Value::Mapping(serde_yaml::Mapping::new())
    } else {
        spec
    };
    if kind == "Gateway" {
        serde_yaml::from_value::<Gateway>(spec)
            .map(Payload::Gateway)
            .map_err(|e| (Payload::Gateway(Gateway::default()), e))
    } else {
        serde_yaml::from_value::<VirtualService>(spec)
            .map(Payload::VirtualService)
            .map_err(|e| (Payload::VirtualService(VirtualService::default()), e))
    }
}

fn read_input(path: &Path) -> Result<String, LoadError> {
    let io_err = |source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    };
    if path.as_os_str() == STDIN {
        let mut content = String::new();
        std::io::stdin()
            .read_to_string(&mut content)
            .map_err(io_err)?;
        return Ok(content);
    }
    std::fs::read_to_string(path).map_err(io_err)
}

/// Expands directories into the YAML and JSON files beneath them.
///
/// Files and `-` given directly are kept as-is. Paths matching an `exclude`
/// glob are dropped.
///
/// # Errors
///
/// Returns an error if a pattern is invalid or a directory cannot be walked.
pub fn discover_files(
    roots: &[PathBuf],
    exclude: &[String],
    respect_gitignore: bool,
) -> Result<Vec<PathBuf>, LoadError> {
    let patterns = exclude
        .iter()
        .map(|p| glob::Pattern::new(p))
        .collect::<Result<Vec<_>, _>>()?;
    let excluded = |path: &Path| patterns.iter().any(|p| p.matches_path(path));

    let mut files = Vec::new();
    for root in roots {
        if root.as_os_str() == STDIN || !root.is_dir() {
            files.push(root.clone());
            continue;
        }

        let mut builder = ignore::WalkBuilder::new(root);
        builder.hidden(false).git_ignore(respect_gitignore);

        let mut found = Vec::new();
        for entry in builder.build() {
            let entry = entry?;
            let path = entry.path();
            if !path.is_file() || !is_config_file(path) {
                continue;
            }
            if excluded(path) {
                debug!("Excluding: {}", path.display());
                continue;
            }
            found.push(path.to_path_buf());
        }
        found.sort();
        files.extend(found);
    }
    Ok(files)
}

fn is_config_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| matches!(e.to_ascii_lowercase().as_str(), "yaml" | "yml" | "json"))
}
