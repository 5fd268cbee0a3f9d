//! Attaching recovered line numbers to resources and messages.

use super::lookup::LookupTable;
use super::path::FieldPath;
use super::tree::PositionTree;
use crate::diag::catalog::{INVALID_REGEXP, REFERENCED_RESOURCE_NOT_FOUND};
use crate::diag::{Message, Messages};
use crate::resource::{Reference, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::debug;

fn tree_for(resource: &Resource) -> Option<PositionTree> {
    let reference = resource.origin().reference()?;
    if !reference.supports_lines() {
        return None;
    }
    let source = reference.source()?;
    Some(PositionTree::parse(source, reference.line()))
}

/// Returns the line of `path` inside `resource`'s source text.
///
/// With a `(field, value)` fallback, the path only counts when it ends on a
/// scalar equal to `value`; otherwise the first leaf under a `field` key
/// whose value equals `value` is used. Returns `None` when the resource has
/// no reference, no retained source, or a JSON source.
#[must_use]
pub fn line_for(resource: &Resource, path: &FieldPath, fallback: Option<(&str, &str)>) -> Option<usize> {
    let tree = tree_for(resource)?;
    let Some((field, value)) = fallback else {
        return tree.line_at(path);
    };
    if let Some(leaf) = tree.leaf_at(path).filter(|leaf| leaf.value == value) {
        return Some(leaf.line);
    }
    debug!("{} does not hold {:?}, searching {} keys", path, value, field);
    let mut table = LookupTable::new();
    table.insert(field, value, "");
    tree.find(&table).first().map(|m| m.line)
}

/// Returns the `(field, value)` pair to search for a message's line, based
/// on its kind and parameters.
#[must_use]
pub fn search_word(message: &Message) -> Option<(String, String)> {
    let params: Vec<String> = message.params().iter().map(ToString::to_string).collect();
    match message.base().name() {
        REFERENCED_RESOURCE_NOT_FOUND => {
            let [reftype, refval, ..] = params.as_slice() else {
                return None;
            };
            let pair = match reftype.as_str() {
                "gateway" => ("gateways".to_string(), refval.clone()),
                "selector" => {
                    let (k, v) = refval.split_once('=')?;
                    (k.to_string(), v.to_string())
                }
                "host+subset in destinationrule" => {
                    let (_, subset) = refval.split_once('+')?;
                    ("subset".to_string(), subset.to_string())
                }
                "host:port" => {
                    let (_, port) = refval.split_once(':')?;
                    ("port".to_string(), port.to_string())
                }
                _ => (reftype.clone(), refval.clone()),
            };
            Some(pair)
        }
        INVALID_REGEXP => {
            let [field, pattern, ..] = params.as_slice() else {
                return None;
            };
            let field = if field == "corsPolicy.allowOrigins" {
                "allowOrigins"
            } else {
                field.as_str()
            };
            Some((field.to_string(), pattern.clone()))
        }
        _ => None,
    }
}

fn message_key(reference: &Reference, message: &Message) -> String {
    let mut key = reference.display(None);
    key.push_str(message.code());
    for param in message.params() {
        key.push_str(&param.to_string());
    }
    key
}

/// Fills in lines for messages that do not have one yet.
///
/// Each referenced resource is parsed once. Messages that already carry a
/// line, have no resource, or whose kind has no search word are untouched.
pub fn resolve_lines(messages: &mut Messages) {
    let mut tables: BTreeMap<String, (Arc<Resource>, LookupTable)> = BTreeMap::new();
    let mut keys: Vec<Option<String>> = Vec::with_capacity(messages.len());

    for message in messages.iter() {
        let key = pending_key(message, &mut tables);
        keys.push(key);
    }
    if tables.is_empty() {
        return;
    }

    let mut lines: BTreeMap<String, usize> = BTreeMap::new();
    for (resource, table) in tables.values() {
        if let Some(tree) = tree_for(resource) {
            lines.extend(tree.find(table).into_iter().map(|m| (m.key, m.line)));
        }
    }

    let mut resolved = 0usize;
    for (message, key) in messages.iter_mut().zip(keys) {
        if let Some(line) = key.and_then(|k| lines.get(&k).copied()) {
            if message.set_line(line) {
                resolved += 1;
            }
        }
    }
    debug!("Resolved lines for {} messages", resolved);
}

fn pending_key(
    message: &Message,
    tables: &mut BTreeMap<String, (Arc<Resource>, LookupTable)>,
) -> Option<String> {
    if message.line().is_some() {
        return None;
    }
    let resource = message.resource()?;
    let reference = resource.origin().reference()?;
    if !reference.supports_lines() || reference.source().is_none() {
        return None;
    }
    let (field, value) = search_word(message)?;
    let key = message_key(reference, message);
    let (_, table) = tables
        .entry(reference.display(None))
        .or_insert_with(|| (Arc::clone(resource), LookupTable::new()));
    table.insert(field, value, key.clone());
    Some(key)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diag::catalog::SCHEMA_WARNING;
    use crate::diag::MessageCatalog;
    use crate::model::VirtualService;
    use crate::resource::{FullName, Payload};

    const TEXT: &str = "\
apiVersion: networking.istio.io/v1alpha3
kind: VirtualService
metadata:
  name: vs
spec:
  gateways:
  - ghost
  http:
  - corsPolicy:
      allowOrigins:
      - regex: (bad
";

    fn resource(file: &str) -> Arc<Resource> {
        Arc::new(
            Resource::new(
                FullName::new("default", "vs"),
                Payload::VirtualService(VirtualService::default()),
            )
            .with_reference(Reference::new(file, 3).with_source(TEXT)),
        )
    }

    fn message(name: &str, r: Arc<Resource>, params: &[&str]) -> Message {
        let base = MessageCatalog::builtin().get(name).unwrap();
        Message::new(base, Some(r), params.iter().map(|p| (*p).into()).collect())
    }

    #[test]
    fn search_words_by_kind() {
        let r = resource("vs.yaml");
        let cases = [
            (REFERENCED_RESOURCE_NOT_FOUND, vec!["gateway", "ghost"], Some(("gateways", "ghost"))),
            (REFERENCED_RESOURCE_NOT_FOUND, vec!["selector", "app=web"], Some(("app", "web"))),
            (
                REFERENCED_RESOURCE_NOT_FOUND,
                vec!["host+subset in destinationrule", "reviews+v2"],
                Some(("subset", "v2")),
            ),
            (REFERENCED_RESOURCE_NOT_FOUND, vec!["host:port", "reviews:9080"], Some(("port", "9080"))),
            (REFERENCED_RESOURCE_NOT_FOUND, vec!["service", "reviews"], Some(("service", "reviews"))),
            (INVALID_REGEXP, vec!["corsPolicy.allowOrigins", "(bad", "x"], Some(("allowOrigins", "(bad"))),
            (INVALID_REGEXP, vec!["uri", "(bad", "x"], Some(("uri", "(bad"))),
            (SCHEMA_WARNING, vec!["oops"], None),
        ];
        for (name, params, expected) in cases {
            let m = message(name, Arc::clone(&r), &params);
            let expected = expected.map(|(a, b): (&str, &str)| (a.to_string(), b.to_string()));
            assert_eq!(search_word(&m), expected, "{name} {params:?}");
        }
    }

    #[test]
    fn resolves_unset_lines_once() {
        let r = resource("vs.yaml");
        let mut ms = Messages::new();
        ms.add(message(REFERENCED_RESOURCE_NOT_FOUND, Arc::clone(&r), &["gateway", "ghost"]));
        ms.add(message(
            INVALID_REGEXP,
            Arc::clone(&r),
            &["corsPolicy.allowOrigins", "(bad", "missing )"],
        ));
        let mut preset = message(REFERENCED_RESOURCE_NOT_FOUND, r, &["gateway", "other"]);
        preset.set_line(99);
        ms.add(preset);

        resolve_lines(&mut ms);
        let lines: Vec<_> = ms.iter().map(Message::line).collect();
        assert_eq!(lines, [Some(9), Some(13), Some(99)]);
    }

    #[test]
    fn json_sources_are_never_resolved() {
        let mut ms = Messages::new();
        ms.add(message(
            REFERENCED_RESOURCE_NOT_FOUND,
            resource("vs.json"),
            &["gateway", "ghost"],
        ));
        resolve_lines(&mut ms);
        assert_eq!(ms.iter().next().and_then(Message::line), None);
    }

    #[test]
    fn line_for_prefers_path_then_fallback() {
        let r = resource("vs.yaml");
        let path: FieldPath = "spec.gateways[0]".parse().unwrap();
        assert_eq!(line_for(&r, &path, None), Some(9));

        let missing: FieldPath = "spec.gateways[4]".parse().unwrap();
        assert_eq!(line_for(&r, &missing, Some(("gateways", "ghost"))), Some(9));
        assert_eq!(line_for(&r, &missing, None), None);
        assert_eq!(line_for(&resource("vs.json"), &path, None), None);
    }

    #[test]
    fn line_for_rejects_path_holding_another_value() {
        let r = resource("vs.yaml");
        let path: FieldPath = "spec.gateways[0]".parse().unwrap();
        assert_eq!(line_for(&r, &path, Some(("gateways", "ghost"))), Some(9));
        assert_eq!(line_for(&r, &path, Some(("gateways", "other"))), None);

        let container: FieldPath = "spec.http.corsPolicy".parse().unwrap();
        assert_eq!(line_for(&r, &container, None), Some(13));
        assert_eq!(line_for(&r, &container, Some(("allowOrigins", "(bad"))), Some(13));
    }
}
