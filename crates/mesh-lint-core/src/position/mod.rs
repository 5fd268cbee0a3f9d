//! Source position engine.
//!
//! Recovers line numbers of nested fields by re-reading a resource's raw
//! YAML text. Results are best-effort: callers must treat "no line" as a
//! normal outcome.

mod lookup;
mod path;
mod resolve;
mod tree;

pub use lookup::{unzip, LineMatch, LookupTable};
pub use path::{FieldPath, ParsePathError, Segment};
pub use resolve::{line_for, resolve_lines, search_word};
pub use tree::{Leaf, PositionMap, PositionTree, PositionValue};
