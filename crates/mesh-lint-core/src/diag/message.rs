//! A single reported finding.

use super::catalog::MessageBase;
use super::level::Level;
use super::template::{self, Param};
use crate::resource::Resource;
use serde::{Serialize, Serializer};
use std::fmt;
use std::sync::Arc;

/// A diagnostic produced by an analyzer.
///
/// Messages are immutable once reported, apart from one line-number update
/// through [`Message::set_line`] and the run-wide documentation tag.
#[derive(Debug, Clone)]
pub struct Message {
    base: Arc<MessageBase>,
    params: Vec<Param>,
    resource: Option<Arc<Resource>>,
    line: Option<usize>,
    doc_ref: Option<String>,
}

impl Message {
    /// Creates a message of kind `base` about `resource`.
    #[must_use]
    pub fn new(base: Arc<MessageBase>, resource: Option<Arc<Resource>>, params: Vec<Param>) -> Self {
        Self {
            base,
            params,
            resource,
            line: None,
            doc_ref: None,
        }
    }

    /// Returns the message kind.
    #[must_use]
    pub fn base(&self) -> &MessageBase {
        &self.base
    }

    /// Returns the level.
    #[must_use]
    pub fn level(&self) -> Level {
        self.base.level()
    }

    /// Returns the stable short code.
    #[must_use]
    pub fn code(&self) -> &str {
        self.base.code()
    }

    /// Returns the template parameters.
    #[must_use]
    pub fn params(&self) -> &[Param] {
        &self.params
    }

    /// Returns the resource the message is about.
    #[must_use]
    pub fn resource(&self) -> Option<&Arc<Resource>> {
        self.resource.as_ref()
    }

    /// Returns the resolved line number, if any.
    #[must_use]
    pub fn line(&self) -> Option<usize> {
        self.line
    }

    /// Records the resolved line number.
    ///
    /// Only the first nonzero update takes effect; returns whether it did.
    pub fn set_line(&mut self, line: usize) -> bool {
        if self.line.is_some() || line == 0 {
            return false;
        }
        self.line = Some(line);
        true
    }

    /// Builder form of [`Message::set_line`] for an optional line.
    #[must_use]
    pub fn with_line(mut self, line: Option<usize>) -> Self {
        if let Some(line) = line {
            self.set_line(line);
        }
        self
    }

    /// Returns the documentation reference tag.
    #[must_use]
    pub fn doc_ref(&self) -> Option<&str> {
        self.doc_ref.as_deref()
    }

    /// Sets the documentation reference tag, replacing any earlier one.
    pub fn set_doc_ref(&mut self, tag: impl Into<String>) {
        self.doc_ref = Some(tag.into());
    }

    /// Returns the expanded template.
    #[must_use]
    pub fn text(&self) -> String {
        template::render(self.base.template(), &self.params)
    }

    /// Returns the documentation URL including the `?ref=` tag, if set.
    #[must_use]
    pub fn documentation_url(&self) -> String {
        match self.doc_ref.as_deref() {
            Some(tag) if !tag.is_empty() => format!("{}?ref={tag}", self.base.doc_url()),
            _ => self.base.doc_url().to_string(),
        }
    }

    /// Returns the origin's reference text, with the resolved line when known.
    #[must_use]
    pub fn reference_text(&self) -> Option<String> {
        let reference = self.resource.as_ref()?.origin().reference()?;
        Some(reference.display(self.line))
    }

    /// Renders `<Level> [<code>] (<origin> <reference>) <text>`.
    #[must_use]
    pub fn render(&self) -> String {
        self.to_string()
    }

    /// Returns the structured form. Origin fields are included only when
    /// requested and a resource is attached.
    #[must_use]
    pub fn to_structured(&self, include_origin: bool) -> StructuredMessage {
        let origin = self
            .resource
            .as_ref()
            .filter(|_| include_origin)
            .map(|r| r.origin().friendly_name());
        let reference = if include_origin {
            self.reference_text()
        } else {
            None
        };
        StructuredMessage {
            code: self.code().to_string(),
            documentation_url: self.documentation_url(),
            level: self.level(),
            message: self.text(),
            origin,
            reference,
        }
    }
}

impl fmt::Display for Message {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} [{}]", self.level(), self.code())?;
        if let Some(resource) = &self.resource {
            write!(f, " ({}", resource.origin().friendly_name())?;
            if let Some(reference) = self.reference_text() {
                write!(f, " {reference}")?;
            }
            f.write_str(")")?;
        }
        write!(f, " {}", self.text())
    }
}

impl Serialize for Message {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_structured(true).serialize(serializer)
    }
}

/// Serializable record form of a [`Message`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StructuredMessage {
    /// Stable short code.
    pub code: String,
    /// Documentation link.
    pub documentation_url: String,
    /// Level name.
    pub level: Level,
    /// Expanded template.
    pub message: String,
    /// Friendly name of the originating resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub origin: Option<String>,
    /// Textual reference of the originating resource.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::catalog::{MessageCatalog, REFERENCED_RESOURCE_NOT_FOUND};
    use crate::model::VirtualService;
    use crate::resource::{FullName, Payload, Reference};

    fn vs(reference: Option<Reference>) -> Arc<Resource> {
        let r = Resource::new(
            FullName::new("default", "reviews"),
            Payload::VirtualService(VirtualService::default()),
        );
        Arc::new(match reference {
            Some(reference) => r.with_reference(reference),
            None => r,
        })
    }

    fn not_found(resource: Option<Arc<Resource>>) -> Message {
        let base = MessageCatalog::builtin()
            .get(REFERENCED_RESOURCE_NOT_FOUND)
            .unwrap();
        Message::new(base, resource, vec!["gateway".into(), "ghost".into()])
    }

    #[test]
    fn renders_without_resource() {
        insta::assert_snapshot!(not_found(None).render(), @r#"Error [IST0101] Referenced gateway not found: "ghost""#);
    }

    #[test]
    fn renders_origin_and_resolved_line() {
        let mut m = not_found(Some(vs(Some(Reference::new("vs.yaml", 1)))));
        assert_eq!(
            m.render(),
            r#"Error [IST0101] (VirtualService reviews.default vs.yaml:1) Referenced gateway not found: "ghost""#
        );
        assert!(m.set_line(9));
        assert!(!m.set_line(12));
        assert_eq!(m.line(), Some(9));
        insta::assert_snapshot!(m.render(), @r#"Error [IST0101] (VirtualService reviews.default vs.yaml:9) Referenced gateway not found: "ghost""#);
    }

    #[test]
    fn renders_origin_without_reference() {
        let m = not_found(Some(vs(None)));
        assert_eq!(
            m.render(),
            r#"Error [IST0101] (VirtualService reviews.default) Referenced gateway not found: "ghost""#
        );
    }

    #[test]
    fn structured_form_includes_doc_ref() {
        let mut m = not_found(Some(vs(Some(Reference::new("vs.yaml", 4)))));
        m.set_doc_ref("ci");
        let s = m.to_structured(true);
        assert_eq!(
            s.documentation_url,
            "https://istio.io/latest/docs/reference/config/analysis/ist0101/?ref=ci"
        );
        assert_eq!(s.origin.as_deref(), Some("VirtualService reviews.default"));
        assert_eq!(s.reference.as_deref(), Some("vs.yaml:4"));

        let bare = m.to_structured(false);
        assert!(bare.origin.is_none());
        assert!(bare.reference.is_none());
    }

    #[test]
    fn serializes_fields_in_order() {
        let m = not_found(None);
        let json = serde_json::to_string(&m).unwrap();
        assert_eq!(
            json,
            r#"{"code":"IST0101","documentation_url":"https://istio.io/latest/docs/reference/config/analysis/ist0101/","level":"Error","message":"Referenced gateway not found: \"ghost\""}"#
        );
    }
}
