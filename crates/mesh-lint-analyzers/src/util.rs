//! Helpers shared by the virtual service analyzers.

use mesh_lint_core::position::{line_for, FieldPath};
use mesh_lint_core::Resource;

/// Gateway name that stands for the sidecars of the mesh itself.
pub const MESH_GATEWAY: &str = "mesh";

/// Returns `spec.gateways[index]`.
pub(crate) fn gateway_path(index: usize) -> FieldPath {
    FieldPath::new().key("spec").key("gateways").index(index)
}

/// Returns the line of `path`, or of the first `field: value` leaf when the
/// path cannot be followed.
pub(crate) fn error_line(resource: &Resource, path: &FieldPath, field: &str, value: &str) -> Option<usize> {
    line_for(resource, path, Some((field, value)))
}
