//! Key-name lookup over a position tree.

use super::tree::{Leaf, PositionMap, PositionTree, PositionValue};
use std::collections::{BTreeMap, HashSet, VecDeque};

/// Associates `field -> value -> message key`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LookupTable {
    fields: BTreeMap<String, BTreeMap<String, String>>,
}

impl LookupTable {
    /// Creates an empty table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Records that a leaf `value` under `field` belongs to `message_key`.
    pub fn insert(
        &mut self,
        field: impl Into<String>,
        value: impl Into<String>,
        message_key: impl Into<String>,
    ) {
        self.fields
            .entry(field.into())
            .or_default()
            .insert(value.into(), message_key.into());
    }

    /// Returns true when nothing has been recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    fn values(&self, field: &str) -> Option<&BTreeMap<String, String>> {
        self.fields.get(field)
    }
}

/// A message key and the line it was attributed to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineMatch {
    /// Message key from the [`LookupTable`].
    pub key: String,
    /// 1-based line.
    pub line: usize,
}

/// Splits matches into parallel `(keys, lines)` vectors.
#[must_use]
pub fn unzip(matches: Vec<LineMatch>) -> (Vec<String>, Vec<usize>) {
    matches.into_iter().map(|m| (m.key, m.line)).unzip()
}

impl PositionTree {
    /// Walks the tree breadth-first and attributes lines to message keys.
    ///
    /// At every map, each key present in `table` contributes the leaves
    /// beneath it whose value is listed for that key. A message key is
    /// reported at most once; the first occurrence in traversal order wins,
    /// even when the same field name appears in another branch.
    #[must_use]
    pub fn find(&self, table: &LookupTable) -> Vec<LineMatch> {
        let mut found = Vec::new();
        if table.is_empty() {
            return found;
        }
        let mut seen = HashSet::new();
        let mut queue: VecDeque<&PositionMap> = VecDeque::from([self.root()]);

        while let Some(map) = queue.pop_front() {
            for (key, value) in map.iter() {
                if let Some(values) = table.values(key) {
                    let mut leaves = Vec::new();
                    collect_leaves(value, &mut leaves);
                    for leaf in leaves {
                        let Some(message_key) = values.get(&leaf.value) else {
                            continue;
                        };
                        if seen.insert(message_key.as_str()) {
                            found.push(LineMatch {
                                key: message_key.clone(),
                                line: leaf.line,
                            });
                        }
                    }
                }
                match value {
                    PositionValue::Map(child) => queue.push_back(child),
                    PositionValue::Repeated(values) => {
                        for v in values {
                            if let PositionValue::Map(child) = v {
                                queue.push_back(child);
                            }
                        }
                    }
                    PositionValue::Scalar(_) | PositionValue::Items(_) => {}
                }
            }
        }
        found
    }
}

fn collect_leaves<'a>(value: &'a PositionValue, out: &mut Vec<&'a Leaf>) {
    match value {
        PositionValue::Scalar(leaf) => out.push(leaf),
        PositionValue::Items(items) => out.extend(items),
        PositionValue::Map(map) => {
            for (_, v) in map.iter() {
                collect_leaves(v, out);
            }
        }
        PositionValue::Repeated(values) => {
            for v in values {
                collect_leaves(v, out);
            }
        }
    }
}
