//! Typed networking resources decoded from YAML `spec` blocks.
//!
//! Only the fields the analyzers read are modeled; unknown fields are ignored
//! during decoding.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Routing rules applied to traffic addressed to a set of hosts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct VirtualService {
    /// Destination hosts the rules apply to.
    pub hosts: Vec<String>,
    /// Gateways (and the reserved `mesh`) the rules are attached to.
    pub gateways: Vec<String>,
    /// Ordered HTTP route rules.
    pub http: Vec<HttpRoute>,
}

/// One HTTP route rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpRoute {
    /// Optional route name.
    pub name: Option<String>,
    /// Match conditions; any one matching selects the route.
    #[serde(rename = "match")]
    pub matches: Vec<HttpMatchRequest>,
    /// Cross-origin resource sharing policy.
    pub cors_policy: Option<CorsPolicy>,
}

/// Conditions an HTTP request must satisfy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct HttpMatchRequest {
    /// Match name.
    pub name: Option<String>,
    /// URI match.
    pub uri: Option<StringMatch>,
    /// URI scheme match.
    pub scheme: Option<StringMatch>,
    /// HTTP method match.
    pub method: Option<StringMatch>,
    /// Authority (host header) match.
    pub authority: Option<StringMatch>,
    /// Header matches keyed by header name.
    pub headers: BTreeMap<String, StringMatch>,
    /// Query parameter matches keyed by parameter name.
    pub query_params: BTreeMap<String, StringMatch>,
    /// Negative header matches. Never validated.
    pub without_headers: BTreeMap<String, StringMatch>,
}

/// A string matcher; at most one variant is expected to be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct StringMatch {
    /// Exact string match.
    pub exact: Option<String>,
    /// Prefix match.
    pub prefix: Option<String>,
    /// Regular expression match.
    pub regex: Option<String>,
}

impl StringMatch {
    /// Creates a regex-typed matcher.
    #[must_use]
    pub fn regex(pattern: impl Into<String>) -> Self {
        Self {
            regex: Some(pattern.into()),
            ..Self::default()
        }
    }

    /// Returns the regex pattern when this matcher is regex-typed and non-empty.
    #[must_use]
    pub fn regex_pattern(&self) -> Option<&str> {
        self.regex.as_deref().filter(|p| !p.is_empty())
    }
}

/// Cross-origin resource sharing policy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CorsPolicy {
    /// Origins allowed to make requests.
    pub allow_origins: Vec<StringMatch>,
}

/// A load balancer at the edge of the mesh.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Gateway {
    /// Workload labels selecting the gateway pods.
    pub selector: BTreeMap<String, String>,
    /// Server blocks exposed by the gateway.
    pub servers: Vec<Server>,
}

impl Gateway {
    /// Iterates over every host of every server block.
    pub fn hosts(&self) -> impl Iterator<Item = &str> {
        self.servers
            .iter()
            .flat_map(|s| s.hosts.iter().map(String::as_str))
    }
}

/// One server block of a gateway.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Server {
    /// Hosts exposed by this server.
    pub hosts: Vec<String>,
    /// Listening port.
    pub port: Option<Port>,
    /// Optional server name.
    pub name: Option<String>,
}

/// A gateway listening port.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Port {
    /// Port number.
    pub number: u32,
    /// Protocol exposed on the port.
    pub protocol: String,
    /// Port label.
    pub name: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn decodes_virtual_service_spec() {
        let yaml = r#"
hosts: [reviews]
gateways: [bookinfo-gateway, mesh]
http:
  - match:
      - uri:
          regex: "^/api"
        headers:
          x-user:
            regex: "ja.*"
        queryParams:
          q:
            exact: "1"
    corsPolicy:
      allowOrigins:
        - regex: ".*\\.example\\.com"
"#;
        let vs: VirtualService = serde_yaml::from_str(yaml).unwrap();
        assert_eq!(vs.gateways, ["bookinfo-gateway", "mesh"]);
        let route = &vs.http[0];
        let m = &route.matches[0];
        assert_eq!(m.uri.as_ref().and_then(StringMatch::regex_pattern), Some("^/api"));
        assert_eq!(m.headers["x-user"].regex_pattern(), Some("ja.*"));
        assert_eq!(m.query_params["q"].regex_pattern(), None);
        let cors = route.cors_policy.as_ref().unwrap();
        assert_eq!(cors.allow_origins[0].regex_pattern(), Some(r".*\.example\.com"));
    }

    #[test]
    fn empty_regex_is_not_a_pattern() {
        assert_eq!(StringMatch::regex("").regex_pattern(), None);
        assert_eq!(StringMatch::default().regex_pattern(), None);
    }

    #[test]
    fn gateway_hosts_span_servers() {
        let yaml = r#"
selector:
  istio: ingressgateway
servers:
  - port: {number: 80, name: http, protocol: HTTP}
    hosts: ["a.example.com"]
  - hosts: ["b.example.com", "c.example.com"]
"#;
        let gw: Gateway = serde_yaml::from_str(yaml).unwrap();
        let hosts: Vec<_> = gw.hosts().collect();
        assert_eq!(hosts, ["a.example.com", "b.example.com", "c.example.com"]);
        assert_eq!(gw.servers[0].port.as_ref().map(|p| p.number), Some(80));
    }
}
