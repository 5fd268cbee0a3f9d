//! Checks regex syntax in virtual service HTTP matches.
//!
//! Validated fields: `uri`, `scheme`, `method`, `authority`, every
//! `headers` and `queryParams` entry, and `corsPolicy.allowOrigins`.
//! `withoutHeaders` is not validated.

use crate::util::error_line;
use mesh_lint_core::model::StringMatch;
use mesh_lint_core::position::FieldPath;
use mesh_lint_core::{msg, Analyzer, CollectionName, Context, Resource};
use std::collections::BTreeMap;
use std::sync::Arc;

/// Analyzer name.
pub const NAME: &str = "virtualservice.RegexAnalyzer";

/// Reports regex-typed string matches that do not compile.
#[derive(Debug, Clone, Copy, Default)]
pub struct RegexAnalyzer;

impl RegexAnalyzer {
    /// Creates the analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn analyze_virtual_service(ctx: &dyn Context, r: &Arc<Resource>) {
        let Some(vs) = r.payload().as_virtual_service() else {
            return;
        };

        for (i, route) in vs.http.iter().enumerate() {
            for (j, m) in route.matches.iter().enumerate() {
                let fields = [
                    ("uri", &m.uri),
                    ("scheme", &m.scheme),
                    ("method", &m.method),
                    ("authority", &m.authority),
                ];
                for (field, string_match) in fields {
                    let Some(string_match) = string_match else {
                        continue;
                    };
                    let path = match_path(i).key(field).index(j).key("regex");
                    validate(ctx, r, field, string_match, &path);
                }
                validate_keyed(ctx, r, "headers", &m.headers, i, j);
                validate_keyed(ctx, r, "queryParams", &m.query_params, i, j);
            }

            let Some(cors) = &route.cors_policy else {
                continue;
            };
            for (k, origin) in cors.allow_origins.iter().enumerate() {
                let path = FieldPath::new()
                    .key("spec")
                    .key("http")
                    .key("corsPolicy")
                    .index(i)
                    .key("allowOrigins")
                    .key("regex")
                    .index(k);
                validate(ctx, r, "corsPolicy.allowOrigins", origin, &path);
            }
        }
    }
}

/// Returns `spec.http.match[route]`.
fn match_path(route: usize) -> FieldPath {
    FieldPath::new().key("spec").key("http").key("match").index(route)
}

fn validate_keyed(
    ctx: &dyn Context,
    r: &Arc<Resource>,
    field: &str,
    matches: &BTreeMap<String, StringMatch>,
    route: usize,
    index: usize,
) {
    for (key, string_match) in matches {
        let path = match_path(route)
            .key(field)
            .index(index)
            .key(key.as_str())
            .key("regex");
        validate(ctx, r, field, string_match, &path);
    }
}

fn validate(ctx: &dyn Context, r: &Arc<Resource>, field: &str, string_match: &StringMatch, path: &FieldPath) {
    let Some(pattern) = string_match.regex_pattern() else {
        return;
    };
    let Err(e) = regex::Regex::new(pattern) else {
        return;
    };
    let search_field = field.rsplit('.').next().unwrap_or(field);
    let line = error_line(r, path, search_field, pattern);
    ctx.report(
        msg::invalid_regexp(ctx.catalog(), Some(r), field, pattern, &problem(&e)).with_line(line),
    );
}

/// Extracts the one-line cause from a regex compile error.
fn problem(e: &regex::Error) -> String {
    let text = e.to_string();
    text.lines()
        .rev()
        .find_map(|l| l.trim().strip_prefix("error: "))
        .map_or_else(|| text.trim().to_string(), ToString::to_string)
}

impl Analyzer for RegexAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks regex syntax"
    }

    fn inputs(&self) -> Vec<CollectionName> {
        vec![CollectionName::VIRTUAL_SERVICES]
    }

    fn analyze(&self, ctx: &dyn Context) {
        ctx.for_each(&CollectionName::VIRTUAL_SERVICES, &mut |r| {
            Self::analyze_virtual_service(ctx, r);
            true
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mesh_lint_core::model::VirtualService;
    use mesh_lint_core::{FullName, MessageCatalog, Messages, Payload, Reference, Snapshot, SnapshotContext};

    fn check_yaml(spec: &str, source: Option<(&str, usize)>) -> Messages {
        let vs: VirtualService = serde_yaml::from_str(spec).expect("spec should decode");
        let mut resource = Resource::new(FullName::new("default", "vs"), Payload::VirtualService(vs));
        if let Some((text, start)) = source {
            resource = resource.with_reference(Reference::new("vs.yaml", start).with_source(text));
        }
        let mut snapshot = Snapshot::new();
        snapshot.insert(resource);
        let catalog = MessageCatalog::builtin();
        let ctx = SnapshotContext::new(&snapshot, &catalog);
        RegexAnalyzer::new().analyze(&ctx);
        ctx.into_messages()
    }

    fn wheres(messages: &Messages) -> Vec<String> {
        messages
            .iter()
            .map(|m| m.params()[0].to_string())
            .collect()
    }

    #[test]
    fn unterminated_group_in_uri() {
        let messages = check_yaml(
            "http:\n- match:\n  - uri:\n      regex: (unterminated\n",
            None,
        );
        assert_eq!(wheres(&messages), ["uri"]);
        let m = messages.iter().next().expect("one message");
        assert_eq!(m.code(), "IST0122");
        assert_eq!(m.params()[1].to_string(), "(unterminated");
        assert_eq!(m.params()[2].to_string(), "unclosed group");
    }

    #[test]
    fn valid_exact_and_empty_patterns_are_skipped() {
        let messages = check_yaml(
            "\
http:
- match:
  - uri:
      regex: ^/api/v[0-9]+
    method:
      exact: GET
    authority:
      regex: ''
    withoutHeaders:
      x-debug:
        regex: (ignored
",
            None,
        );
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn every_field_kind_is_validated() {
        let messages = check_yaml(
            "\
http:
- match:
  - scheme:
      regex: '*'
    headers:
      x-user:
        regex: '[a-'
    queryParams:
      id:
        regex: '(?P<'
  corsPolicy:
    allowOrigins:
    - exact: https://example.com
    - regex: '+bad'
",
            None,
        );
        assert_eq!(
            wheres(&messages),
            ["scheme", "headers", "queryParams", "corsPolicy.allowOrigins"]
        );
    }

    #[test]
    fn lines_follow_route_and_match_indices() {
        let text = "\
apiVersion: networking.istio.io/v1alpha3
kind: VirtualService
metadata:
  name: vs
spec:
  hosts:
  - web
  http:
  - match:
    - uri:
        prefix: /ok
  - match:
    - uri:
        prefix: /fine
    - uri:
        regex: (bad
      headers:
        x-user:
          regex: '[a-'
";
        let spec = "\
http:
- match:
  - uri:
      prefix: /ok
- match:
  - uri:
      prefix: /fine
  - uri:
      regex: (bad
    headers:
      x-user:
        regex: '[a-'
";
        let messages = check_yaml(spec, Some((text, 1)));
        let lines: Vec<_> = messages.iter().map(|m| (m.params()[0].to_string(), m.line())).collect();
        assert_eq!(
            lines,
            [("uri".to_string(), Some(16)), ("headers".to_string(), Some(19))]
        );
    }

    #[test]
    fn route_without_match_does_not_shift_lines() {
        let text = "\
apiVersion: networking.istio.io/v1alpha3
kind: VirtualService
metadata:
  name: vs
spec:
  http:
  - route:
    - destination:
        host: web
  - match:
    - uri:
        regex: (bad
  - match:
    - uri:
        regex: ok.*
";
        let spec = "\
http:
- route:
  - destination:
      host: web
- match:
  - uri:
      regex: (bad
- match:
  - uri:
      regex: ok.*
";
        let messages = check_yaml(spec, Some((text, 1)));
        assert_eq!(messages.len(), 1);
        let m = messages.iter().next().expect("one message");
        assert_eq!(m.params()[1].to_string(), "(bad");
        assert_eq!(m.line(), Some(12));
    }

    #[test]
    fn route_without_cors_does_not_shift_lines() {
        let text = "\
spec:
  http:
  - route:
    - destination:
        host: web
  - corsPolicy:
      allowOrigins:
      - regex: (bad
  - corsPolicy:
      allowOrigins:
      - regex: ok.*
";
        let spec = "\
http:
- route:
  - destination:
      host: web
- corsPolicy:
    allowOrigins:
    - regex: (bad
- corsPolicy:
    allowOrigins:
    - regex: ok.*
";
        let messages = check_yaml(spec, Some((text, 1)));
        assert_eq!(messages.len(), 1);
        assert_eq!(messages.iter().next().and_then(|m| m.line()), Some(8));
    }

    #[test]
    fn cors_origin_lines_resolve() {
        let text = "\
spec:
  http:
  - corsPolicy:
      allowOrigins:
      - regex: ok.*
      - regex: (bad
";
        let spec = "\
http:
- corsPolicy:
    allowOrigins:
    - regex: ok.*
    - regex: (bad
";
        let messages = check_yaml(spec, Some((text, 3)));
        let m = messages.iter().next().expect("one message");
        assert_eq!(m.line(), Some(8));
        insta::assert_snapshot!(
            m.render(),
            @r#"Warning [IST0122] (VirtualService vs.default vs.yaml:8) Field "corsPolicy.allowOrigins" regular expression invalid: "(bad" (unclosed group)"#
        );
    }
}
