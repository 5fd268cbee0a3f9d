//! Host string normalization and wildcard matching.

/// Normalizes raw host strings relative to `namespace`.
///
/// - `host` and `./host` become `<namespace>/host`
/// - `*/host` becomes `host`
/// - `*/*` discards everything accumulated so far and yields `["*"]`
/// - any other `ns/host` is dropped
#[must_use]
pub fn sanitize_host_namespace<S: AsRef<str>>(hosts: &[S], namespace: &str) -> Vec<String> {
    let mut sanitized = Vec::with_capacity(hosts.len());
    for host in hosts {
        let host = host.as_ref();
        match host.split_once('/') {
            None => sanitized.push(format!("{namespace}/{host}")),
            Some((".", name)) => sanitized.push(format!("{namespace}/{name}")),
            Some(("*", "*")) => return vec!["*".to_string()],
            Some(("*", name)) => sanitized.push(name.to_string()),
            Some(_) => {}
        }
    }
    sanitized
}

/// Returns true when two sanitized hosts overlap.
///
/// `*` matches anything. When both hosts are namespace-qualified the
/// namespaces must be equal. Host parts match exactly, or by suffix when
/// either side starts with `*`.
#[must_use]
pub fn host_matches(a: &str, b: &str) -> bool {
    if a == "*" || b == "*" {
        return true;
    }
    let (a_ns, a_host) = split_namespace(a);
    let (b_ns, b_host) = split_namespace(b);
    if let (Some(a_ns), Some(b_ns)) = (a_ns, b_ns) {
        if a_ns != b_ns {
            return false;
        }
    }
    name_matches(a_host, b_host)
}

/// Returns true when any host in `left` matches any host in `right`.
#[must_use]
pub fn any_host_matches<A: AsRef<str>, B: AsRef<str>>(left: &[A], right: &[B]) -> bool {
    left.iter()
        .any(|l| right.iter().any(|r| host_matches(l.as_ref(), r.as_ref())))
}

fn split_namespace(host: &str) -> (Option<&str>, &str) {
    match host.split_once('/') {
        Some((ns, name)) => (Some(ns), name),
        None => (None, host),
    }
}

fn name_matches(n: &str, o: &str) -> bool {
    match (n.strip_prefix('*'), o.strip_prefix('*')) {
        (Some(n_suffix), Some(o_suffix)) => {
            if n_suffix.len() > o_suffix.len() {
                n_suffix.ends_with(o_suffix)
            } else {
                o_suffix.ends_with(n_suffix)
            }
        }
        (Some(n_suffix), None) => o.ends_with(n_suffix),
        (None, Some(o_suffix)) => n.ends_with(o_suffix),
        (None, None) => n == o,
    }
}
