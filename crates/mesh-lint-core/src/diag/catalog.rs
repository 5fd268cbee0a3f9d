//! The table of diagnostic kinds.
//!
//! A [`MessageCatalog`] is built once per run and handed to analyzers through
//! their context. Overriding a level or the documentation prefix builds a new
//! catalog; existing [`MessageBase`] values are never mutated.

use super::level::Level;
use std::collections::BTreeMap;
use std::sync::Arc;
use thiserror::Error;

/// Documentation prefix used when none is configured.
pub const DEFAULT_DOC_PREFIX: &str = "https://istio.io/latest/docs/reference/config/analysis";

/// A static catalog entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MessageDefinition {
    /// Message name, e.g. `InvalidRegexp`.
    pub name: &'static str,
    /// Stable short code, e.g. `IST0122`.
    pub code: &'static str,
    /// Default level.
    pub level: Level,
    /// Human-readable description of the message kind.
    pub description: &'static str,
    /// printf-style template for the message text.
    pub template: &'static str,
}

/// Name of the internal-error message kind.
pub const INTERNAL_ERROR: &str = "InternalError";
/// Name of the dangling-reference message kind.
pub const REFERENCED_RESOURCE_NOT_FOUND: &str = "ReferencedResourceNotFound";
/// Name of the schema-error message kind.
pub const SCHEMA_VALIDATION_ERROR: &str = "SchemaValidationError";
/// Name of the invalid-regex message kind.
pub const INVALID_REGEXP: &str = "InvalidRegexp";
/// Name of the gateway host mismatch message kind.
pub const VIRTUAL_SERVICE_HOST_NOT_FOUND_IN_GATEWAY: &str = "VirtualServiceHostNotFoundInGateway";
/// Name of the schema-warning message kind.
pub const SCHEMA_WARNING: &str = "SchemaWarning";

/// The built-in message kinds.
pub const BUILTIN_MESSAGES: &[MessageDefinition] = &[
    MessageDefinition {
        name: INTERNAL_ERROR,
        code: "IST0001",
        level: Level::Error,
        description: "There was an internal error in the toolchain. This is almost always a bug in the implementation.",
        template: "Internal error: %v",
    },
    MessageDefinition {
        name: REFERENCED_RESOURCE_NOT_FOUND,
        code: "IST0101",
        level: Level::Error,
        description: "A resource being referenced does not exist.",
        template: "Referenced %s not found: %q",
    },
    MessageDefinition {
        name: SCHEMA_VALIDATION_ERROR,
        code: "IST0106",
        level: Level::Error,
        description: "The resource has a schema validation error.",
        template: "Schema validation error: %v",
    },
    MessageDefinition {
        name: INVALID_REGEXP,
        code: "IST0122",
        level: Level::Warning,
        description: "Invalid Regex",
        template: "Field %q regular expression invalid: %q (%s)",
    },
    MessageDefinition {
        name: VIRTUAL_SERVICE_HOST_NOT_FOUND_IN_GATEWAY,
        code: "IST0132",
        level: Level::Warning,
        description: "Host defined in VirtualService not found in Gateway.",
        template: "one or more host %v defined in VirtualService %s not found in Gateway %s.",
    },
    MessageDefinition {
        name: SCHEMA_WARNING,
        code: "IST0133",
        level: Level::Warning,
        description: "The resource has a schema validation warning.",
        template: "Schema validation warning: %v",
    },
];

/// An immutable diagnostic kind.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageBase {
    level: Level,
    name: String,
    code: String,
    description: String,
    template: String,
    doc_url: String,
}

impl MessageBase {
    /// Creates a message kind whose documentation lives under `doc_prefix`.
    #[must_use]
    pub fn new(definition: &MessageDefinition, level: Level, doc_prefix: &str) -> Self {
        Self {
            level,
            name: definition.name.to_string(),
            code: definition.code.to_string(),
            description: definition.description.to_string(),
            template: definition.template.to_string(),
            doc_url: format!(
                "{}/{}/",
                doc_prefix.trim_end_matches('/'),
                definition.code.to_lowercase()
            ),
        }
    }

    /// Returns the level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.level
    }

    /// Returns the message name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the stable short code.
    #[must_use]
    pub fn code(&self) -> &str {
        &self.code
    }

    /// Returns the description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the printf-style template.
    #[must_use]
    pub fn template(&self) -> &str {
        &self.template
    }

    /// Returns the documentation URL, without any `?ref=` tag.
    #[must_use]
    pub fn doc_url(&self) -> &str {
        &self.doc_url
    }
}

/// Errors building a catalog.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CatalogError {
    /// A level override names a message kind that does not exist.
    #[error("unknown message `{0}` in level overrides")]
    UnknownMessage(String),
}

/// Read-only table of message kinds keyed by name.
#[derive(Debug, Clone)]
pub struct MessageCatalog {
    entries: BTreeMap<String, Arc<MessageBase>>,
    internal: Arc<MessageBase>,
}

impl MessageCatalog {
    /// Builds the catalog from [`BUILTIN_MESSAGES`] with default levels.
    #[must_use]
    pub fn builtin() -> Self {
        Self::build(DEFAULT_DOC_PREFIX, |_| None)
    }

    /// Builds the catalog with a documentation prefix and level overrides.
    ///
    /// # Errors
    ///
    /// Returns [`CatalogError::UnknownMessage`] if an override names a
    /// message kind that is not in the catalog.
    pub fn with_settings(
        doc_prefix: Option<&str>,
        levels: &BTreeMap<String, Level>,
    ) -> Result<Self, CatalogError> {
        if let Some(unknown) = levels
            .keys()
            .find(|name| !BUILTIN_MESSAGES.iter().any(|d| d.name == name.as_str()))
        {
            return Err(CatalogError::UnknownMessage(unknown.clone()));
        }
        let prefix = doc_prefix.unwrap_or(DEFAULT_DOC_PREFIX);
        Ok(Self::build(prefix, |name| levels.get(name).copied()))
    }

    fn build(doc_prefix: &str, level_override: impl Fn(&str) -> Option<Level>) -> Self {
        let entries: BTreeMap<_, _> = BUILTIN_MESSAGES
            .iter()
            .map(|def| {
                let level = level_override(def.name).unwrap_or(def.level);
                (
                    def.name.to_string(),
                    Arc::new(MessageBase::new(def, level, doc_prefix)),
                )
            })
            .collect();
        let internal = entries.get(INTERNAL_ERROR).cloned().unwrap_or_else(|| {
            Arc::new(MessageBase::new(&BUILTIN_MESSAGES[0], Level::Error, doc_prefix))
        });
        Self { entries, internal }
    }

    /// Looks up a message kind by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<Arc<MessageBase>> {
        self.entries.get(name).cloned()
    }

    /// Looks up a message kind, falling back to the internal-error kind.
    #[must_use]
    pub fn get_or_internal(&self, name: &str) -> Arc<MessageBase> {
        self.get(name).unwrap_or_else(|| Arc::clone(&self.internal))
    }

    /// Returns the internal-error kind.
    #[must_use]
    pub fn internal(&self) -> Arc<MessageBase> {
        Arc::clone(&self.internal)
    }

    /// Iterates over all message kinds, ordered by name.
    pub fn iter(&self) -> impl Iterator<Item = &MessageBase> {
        self.entries.values().map(AsRef::as_ref)
    }
}

impl Default for MessageCatalog {
    fn default() -> Self {
        Self::builtin()
    }
}
