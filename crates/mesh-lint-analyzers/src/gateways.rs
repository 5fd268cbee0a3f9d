//! Checks the gateways referenced by each virtual service.
//!
//! # Checks
//!
//! - Every entry of `spec.gateways` other than `mesh` must name an existing
//!   gateway (IST0101). Bare names resolve in the virtual service's
//!   namespace.
//! - When the gateway exists, at least one virtual service host must be
//!   served by one of its server blocks (IST0132).

use crate::util::{error_line, gateway_path, MESH_GATEWAY};
use mesh_lint_core::host::{any_host_matches, sanitize_host_namespace};
use mesh_lint_core::{msg, Analyzer, CollectionName, Context, FullName, Resource};
use std::sync::Arc;
use tracing::trace;

/// Analyzer name.
pub const NAME: &str = "virtualservice.GatewayAnalyzer";

/// Validates gateway references and host coverage of virtual services.
#[derive(Debug, Clone, Copy, Default)]
pub struct GatewayAnalyzer;

impl GatewayAnalyzer {
    /// Creates the analyzer.
    #[must_use]
    pub fn new() -> Self {
        Self
    }

    fn analyze_virtual_service(ctx: &dyn Context, r: &Arc<Resource>) {
        let Some(vs) = r.payload().as_virtual_service() else {
            return;
        };

        for (i, gw) in vs.gateways.iter().enumerate() {
            if gw == MESH_GATEWAY {
                continue;
            }

            let gw_name = FullName::short_or_full(r.namespace(), gw);
            let line = || error_line(r, &gateway_path(i), "gateways", gw);

            let Some(gateway) = ctx.find(&CollectionName::GATEWAYS, &gw_name) else {
                ctx.report(
                    msg::referenced_resource_not_found(ctx.catalog(), Some(r), "gateway", gw)
                        .with_line(line()),
                );
                continue;
            };

            let Some(gateway_spec) = gateway.payload().as_gateway() else {
                continue;
            };
            let gw_hosts: Vec<&str> = gateway_spec.hosts().collect();
            let gw_hosts = sanitize_host_namespace(&gw_hosts, gateway.namespace().as_str());
            let vs_hosts = sanitize_host_namespace(&vs.hosts, r.namespace().as_str());
            trace!(
                "{} hosts {:?}, gateway {} hosts {:?}",
                r.full_name(),
                vs_hosts,
                gw_name,
                gw_hosts
            );

            if !any_host_matches(&vs_hosts, &gw_hosts) {
                ctx.report(
                    msg::virtual_service_host_not_found_in_gateway(
                        ctx.catalog(),
                        Some(r),
                        &vs.hosts,
                        &r.full_name().to_string(),
                        &gw_name.to_string(),
                    )
                    .with_line(line()),
                );
            }
        }
    }
}

impl Analyzer for GatewayAnalyzer {
    fn name(&self) -> &'static str {
        NAME
    }

    fn description(&self) -> &'static str {
        "Checks the gateways associated with each virtual service"
    }

    fn inputs(&self) -> Vec<CollectionName> {
        vec![CollectionName::GATEWAYS, CollectionName::VIRTUAL_SERVICES]
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
    use mesh_lint_core::model::{Gateway, Server, VirtualService};
    use mesh_lint_core::{Payload, Reference, Snapshot, SnapshotContext};
    use mesh_lint_core::{MessageCatalog, Messages};

    fn gateway(ns: &str, name: &str, hosts: &[&str]) -> Resource {
        let spec = Gateway {
            servers: vec![Server {
                hosts: hosts.iter().map(ToString::to_string).collect(),
                ..Server::default()
            }],
            ..Gateway::default()
        };
        Resource::new(FullName::new(ns, name), Payload::Gateway(spec))
    }

    fn virtual_service(ns: &str, name: &str, hosts: &[&str], gateways: &[&str]) -> Resource {
        let spec = VirtualService {
            hosts: hosts.iter().map(ToString::to_string).collect(),
            gateways: gateways.iter().map(ToString::to_string).collect(),
            ..VirtualService::default()
        };
        Resource::new(FullName::new(ns, name), Payload::VirtualService(spec))
    }

    fn check(resources: Vec<Resource>) -> Messages {
        let mut snapshot = Snapshot::new();
        for r in resources {
            snapshot.insert(r);
        }
        let catalog = MessageCatalog::builtin();
        let ctx = SnapshotContext::new(&snapshot, &catalog);
        GatewayAnalyzer::new().analyze(&ctx);
        ctx.into_messages()
    }

    #[test]
    fn wildcard_gateway_host_covers_service_host() {
        let messages = check(vec![
            gateway("a", "gw", &["*.svc.cluster.local"]),
            virtual_service("a", "vs", &["svc.a.svc.cluster.local"], &["gw"]),
        ]);
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn missing_gateway_is_reported_once() {
        let messages = check(vec![virtual_service("a", "vs", &["web.example.com"], &["ghost"])]);
        assert_eq!(messages.len(), 1);
        let m = messages.iter().next().unwrap();
        assert_eq!(m.code(), "IST0101");
        let params: Vec<_> = m.params().iter().map(ToString::to_string).collect();
        assert_eq!(params, ["gateway", "ghost"]);
    }

    #[test]
    fn mesh_gateway_is_always_accepted() {
        let messages = check(vec![virtual_service("a", "vs", &["web"], &["mesh"])]);
        assert!(messages.is_empty());
    }

    #[test]
    fn explicit_namespace_reference_resolves_across_namespaces() {
        let messages = check(vec![
            gateway("istio-system", "ingress", &["*/*"]),
            virtual_service("a", "vs", &["web.example.com"], &["istio-system/ingress"]),
        ]);
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn unserved_hosts_are_reported_with_raw_host_list() {
        let messages = check(vec![
            gateway("a", "gw", &["*.example.com"]),
            virtual_service("a", "vs", &["web.example.org", "api.example.org"], &["gw"]),
        ]);
        insta::assert_snapshot!(
            messages.iter().next().unwrap().render(),
            @"Warning [IST0132] (VirtualService vs.a) one or more host [web.example.org api.example.org] defined in VirtualService a/vs not found in Gateway a/gw."
        );
    }

    #[test]
    fn gateway_hosts_in_another_namespace_do_not_match_by_default() {
        let messages = check(vec![
            gateway("b", "gw", &["web.example.com"]),
            virtual_service("a", "vs", &["web.example.com"], &["b/gw"]),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages.iter().next().unwrap().code(), "IST0132");
    }

    #[test]
    fn namespace_qualified_gateway_hosts_are_ignored() {
        let messages = check(vec![
            gateway("istio-system", "ingress", &["shop/web.example.com"]),
            virtual_service("shop", "vs", &["web.example.com"], &["istio-system/ingress"]),
        ]);
        assert_eq!(messages.len(), 1);
        assert_eq!(messages.iter().next().unwrap().code(), "IST0132");
    }

    #[test]
    fn namespace_wildcard_on_service_host_matches() {
        let messages = check(vec![
            gateway("b", "gw", &["web.example.com"]),
            virtual_service("a", "vs", &["*/web.example.com"], &["b/gw"]),
        ]);
        assert!(messages.is_empty(), "{messages:?}");
    }

    #[test]
    fn lines_point_at_the_gateway_entry() {
        let text = "\
apiVersion: networking.istio.io/v1alpha3
kind: VirtualService
metadata:
  name: vs
spec:
  hosts:
  - web.example.com
  gateways:
  - mesh
  - ghost
";
        let vs = virtual_service("a", "vs", &["web.example.com"], &["mesh", "ghost"])
            .with_reference(Reference::new("vs.yaml", 11).with_source(text));
        let messages = check(vec![vs]);
        let m = messages.iter().next().unwrap();
        assert_eq!(m.line(), Some(20));
        assert!(m.render().contains("vs.yaml:20"), "{}", m.render());
    }
}
