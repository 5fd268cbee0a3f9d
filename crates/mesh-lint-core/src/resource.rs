//! Resource instances and their provenance.

use crate::model::{Gateway, VirtualService};
use std::borrow::Cow;
use std::fmt;
use std::path::Path;
use std::sync::Arc;

/// A resource namespace. The empty namespace denotes a cluster-scoped resource.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Namespace(String);

impl Namespace {
    /// Creates a namespace.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Returns the namespace as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true for the cluster-scoped (empty) namespace.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for Namespace {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A namespace-qualified resource name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FullName {
    /// Namespace of the resource.
    pub namespace: Namespace,
    /// Name of the resource within its namespace.
    pub name: String,
}

impl FullName {
    /// Creates a full name from its parts.
    #[must_use]
    pub fn new(namespace: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            namespace: Namespace::new(namespace),
            name: name.into(),
        }
    }

    /// Resolves a reference that is either a bare `name` (looked up in
    /// `default_namespace`) or an explicit `namespace/name`.
    #[must_use]
    pub fn short_or_full(default_namespace: &Namespace, reference: &str) -> Self {
        match reference.split_once('/') {
            Some((namespace, name)) => Self::new(namespace, name),
            None => Self {
                namespace: default_namespace.clone(),
                name: reference.to_string(),
            },
        }
    }
}

impl fmt::Display for FullName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.namespace.is_empty() {
            f.write_str(&self.name)
        } else {
            write!(f, "{}/{}", self.namespace, self.name)
        }
    }
}

/// Name of a typed collection of resources.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CollectionName(Cow<'static, str>);

impl CollectionName {
    /// Collection holding `VirtualService` resources.
    pub const VIRTUAL_SERVICES: Self = Self(Cow::Borrowed("istio/networking/v1alpha3/virtualservices"));

    /// Collection holding `Gateway` resources.
    pub const GATEWAYS: Self = Self(Cow::Borrowed("istio/networking/v1alpha3/gateways"));

    /// Creates a collection name.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(Cow::Owned(name.into()))
    }

    /// Returns the collection name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CollectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Textual source location of a resource.
///
/// Carries the stream identifier, the 1-based line at which the resource's
/// chunk starts, and optionally the raw chunk text so line numbers of nested
/// fields can be recovered later.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    file: String,
    line: usize,
    source: Option<Arc<str>>,
}

impl Reference {
    /// Creates a reference to `file` starting at `line`.
    #[must_use]
    pub fn new(file: impl Into<String>, line: usize) -> Self {
        Self {
            file: file.into(),
            line,
            source: None,
        }
    }

    /// Attaches the raw text of the resource's chunk.
    #[must_use]
    pub fn with_source(mut self, source: impl Into<Arc<str>>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// Returns the file or stream identifier.
    #[must_use]
    pub fn file(&self) -> &str {
        &self.file
    }

    /// Returns the starting line of the resource's chunk.
    #[must_use]
    pub fn line(&self) -> usize {
        self.line
    }

    /// Returns the raw chunk text, if it was retained.
    #[must_use]
    pub fn source(&self) -> Option<&str> {
        self.source.as_deref()
    }

    /// Returns true when the reference can carry line numbers.
    ///
    /// JSON sources never do.
    #[must_use]
    pub fn supports_lines(&self) -> bool {
        self.line > 0
            && !self.file.is_empty()
            && Path::new(&self.file)
                .extension()
                .map_or(true, |ext| !ext.eq_ignore_ascii_case("json"))
    }

    /// Renders the reference, substituting `resolved_line` for the chunk
    /// start line when one is given and nonzero.
    #[must_use]
    pub fn display(&self, resolved_line: Option<usize>) -> String {
        if !self.supports_lines() {
            return self.file.clone();
        }
        let line = resolved_line.filter(|l| *l > 0).unwrap_or(self.line);
        format!("{}:{line}", self.file)
    }
}

impl fmt::Display for Reference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.display(None))
    }
}

/// Where a resource came from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Origin {
    collection: CollectionName,
    kind: String,
    full_name: FullName,
    reference: Option<Reference>,
}

impl Origin {
    /// Creates an origin without a textual reference.
    #[must_use]
    pub fn new(collection: CollectionName, kind: impl Into<String>, full_name: FullName) -> Self {
        Self {
            collection,
            kind: kind.into(),
            full_name,
            reference: None,
        }
    }

    /// Attaches a textual reference.
    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.reference = Some(reference);
        self
    }

    /// Returns the collection the resource belongs to.
    #[must_use]
    pub fn collection(&self) -> &CollectionName {
        &self.collection
    }

    /// Returns the resource kind label, e.g. `VirtualService`.
    #[must_use]
    pub fn kind(&self) -> &str {
        &self.kind
    }

    /// Returns the textual reference, if any.
    #[must_use]
    pub fn reference(&self) -> Option<&Reference> {
        self.reference.as_ref()
    }

    /// Returns `<Kind> <name>.<namespace>`, or `<Kind> <name>` for
    /// cluster-scoped resources.
    #[must_use]
    pub fn friendly_name(&self) -> String {
        if self.full_name.namespace.is_empty() {
            format!("{} {}", self.kind, self.full_name.name)
        } else {
            format!(
                "{} {}.{}",
                self.kind, self.full_name.name, self.full_name.namespace
            )
        }
    }

    /// Returns the key used to order messages by origin.
    #[must_use]
    pub fn comparator(&self) -> String {
        format!("{}/{}", self.kind, self.full_name)
    }
}

/// Typed payload of a resource.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Payload {
    /// A `VirtualService` routing configuration.
    VirtualService(VirtualService),
    /// A `Gateway` ingress/egress entry point.
    Gateway(Gateway),
}

impl Payload {
    /// Returns the kind label of this payload.
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::VirtualService(_) => "VirtualService",
            Self::Gateway(_) => "Gateway",
        }
    }

    /// Returns the collection this payload belongs in.
    #[must_use]
    pub fn collection(&self) -> CollectionName {
        match self {
            Self::VirtualService(_) => CollectionName::VIRTUAL_SERVICES,
            Self::Gateway(_) => CollectionName::GATEWAYS,
        }
    }

    /// Returns the virtual service, if this is one.
    #[must_use]
    pub fn as_virtual_service(&self) -> Option<&VirtualService> {
        match self {
            Self::VirtualService(vs) => Some(vs),
            Self::Gateway(_) => None,
        }
    }

    /// Returns the gateway, if this is one.
    #[must_use]
    pub fn as_gateway(&self) -> Option<&Gateway> {
        match self {
            Self::Gateway(gw) => Some(gw),
            Self::VirtualService(_) => None,
        }
    }
}

/// A resource instance in a snapshot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Resource {
    full_name: FullName,
    origin: Origin,
    payload: Payload,
}

impl Resource {
    /// Creates a resource whose origin is derived from the payload kind.
    #[must_use]
    pub fn new(full_name: FullName, payload: Payload) -> Self {
        let origin = Origin::new(payload.collection(), payload.kind(), full_name.clone());
        Self {
            full_name,
            origin,
            payload,
        }
    }

    /// Attaches a textual reference to the resource's origin.
    #[must_use]
    pub fn with_reference(mut self, reference: Reference) -> Self {
        self.origin = self.origin.with_reference(reference);
        self
    }

    /// Replaces the origin.
    #[must_use]
    pub fn with_origin(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    /// Returns the namespace-qualified name.
    #[must_use]
    pub fn full_name(&self) -> &FullName {
        &self.full_name
    }

    /// Returns the namespace.
    #[must_use]
    pub fn namespace(&self) -> &Namespace {
        &self.full_name.namespace
    }

    /// Returns the provenance of the resource.
    #[must_use]
    pub fn origin(&self) -> &Origin {
        &self.origin
    }

    /// Returns the typed payload.
    #[must_use]
    pub fn payload(&self) -> &Payload {
        &self.payload
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_name_resolves_in_default_namespace() {
        let ns = Namespace::new("a");
        assert_eq!(FullName::short_or_full(&ns, "gw"), FullName::new("a", "gw"));
        assert_eq!(
            FullName::short_or_full(&ns, "b/gw"),
            FullName::new("b", "gw")
        );
    }

    #[test]
    fn full_name_display() {
        assert_eq!(FullName::new("ns", "name").to_string(), "ns/name");
        assert_eq!(FullName::new("", "name").to_string(), "name");
    }

    #[test]
    fn reference_display() {
        let cases = [
            ("test.yaml", 1, "test.yaml:1"),
            ("test.yaml", 0, "test.yaml"),
            ("test.json", 1, "test.json"),
            ("-", 1, "-:1"),
            ("", 1, ""),
        ];
        for (file, line, expected) in cases {
            assert_eq!(Reference::new(file, line).display(None), expected, "{file}:{line}");
        }
    }

    #[test]
    fn reference_display_prefers_resolved_line() {
        let reference = Reference::new("vs.yaml", 3);
        assert_eq!(reference.display(Some(12)), "vs.yaml:12");
        assert_eq!(reference.display(Some(0)), "vs.yaml:3");
        assert_eq!(Reference::new("vs.json", 3).display(Some(12)), "vs.json");
    }

    #[test]
    fn origin_names() {
        let origin = Origin::new(
            CollectionName::GATEWAYS,
            "Gateway",
            FullName::new("istio-system", "ingress"),
        );
        assert_eq!(origin.friendly_name(), "Gateway ingress.istio-system");
        assert_eq!(origin.comparator(), "Gateway/istio-system/ingress");
    }

    #[test]
    fn payload_accessors() {
        let payload = Payload::Gateway(Gateway::default());
        assert!(payload.as_gateway().is_some());
        assert!(payload.as_virtual_service().is_none());
        assert_eq!(payload.collection(), CollectionName::GATEWAYS);
    }
}
