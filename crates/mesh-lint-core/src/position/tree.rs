//! Indentation-driven line recovery for YAML resource text.
//!
//! The decoded resource model carries no positions, so the raw text of each
//! resource is re-read here line by line. The parser is deliberately
//! shallow: it understands `key: value` pairs, key-only lines that open a
//! nested block, and `- ` list markers. Flow collections, block scalars and
//! anchors are not interpreted; their lines are recorded as plain values or
//! skipped.
//!
//! List items that are maps are folded into a single map per nesting level,
//! so a key that appears once per item ends up as a [`PositionValue::Repeated`]
//! list in item order.

use super::path::{FieldPath, Segment};

/// A scalar value and the absolute line it appeared on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Leaf {
    /// Unquoted scalar text.
    pub value: String,
    /// 1-based line in the enclosing stream.
    pub line: usize,
}

/// A node of the position tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PositionValue {
    /// `key: value`.
    Scalar(Leaf),
    /// A key followed by a block of `- item` scalars.
    Items(Vec<Leaf>),
    /// A key followed by a nested block of keys.
    Map(PositionMap),
    /// A key seen more than once at the same level, in encounter order.
    Repeated(Vec<PositionValue>),
}

impl PositionValue {
    /// Returns the line of the first leaf under this node.
    #[must_use]
    pub fn first_line(&self) -> Option<usize> {
        match self {
            Self::Scalar(leaf) => Some(leaf.line),
            Self::Items(items) => items.first().map(|l| l.line),
            Self::Map(map) => map.first_line(),
            Self::Repeated(values) => values.first().and_then(Self::first_line),
        }
    }
}

/// An insertion-ordered map of keys to position nodes.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionMap {
    entries: Vec<(String, PositionValue)>,
}

impl PositionMap {
    /// Returns the node recorded for `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&PositionValue> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    /// Iterates over entries in the order they were first seen.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &PositionValue)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    /// Returns the number of distinct keys.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Returns true when no key was recorded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the line of the first entry.
    #[must_use]
    pub fn first_line(&self) -> Option<usize> {
        self.entries.first().and_then(|(_, v)| v.first_line())
    }

    fn insert(&mut self, key: String, value: PositionValue) {
        let Some(slot) = self.entries.iter_mut().find(|(k, _)| *k == key).map(|(_, v)| v) else {
            self.entries.push((key, value));
            return;
        };
        match slot {
            PositionValue::Repeated(values) => values.push(value),
            other => {
                let first = std::mem::replace(other, PositionValue::Repeated(Vec::new()));
                *other = PositionValue::Repeated(vec![first, value]);
            }
        }
    }
}

/// Parsed positions of one resource.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PositionTree {
    root: PositionMap,
}

impl PositionTree {
    /// Parses `text`, numbering its first line `start_line`.
    #[must_use]
    pub fn parse(text: &str, start_line: usize) -> Self {
        let lines: Vec<Line> = text
            .lines()
            .enumerate()
            .filter_map(|(idx, raw)| Line::classify(raw, idx + start_line))
            .collect();
        let mut pos = 0;
        let root = parse_map(&lines, &mut pos, 0);
        Self { root }
    }

    /// Returns the top-level map.
    #[must_use]
    pub fn root(&self) -> &PositionMap {
        &self.root
    }

    /// Follows `path` and returns the first line under the node it reaches.
    ///
    /// An index selects an element of a repeated key or scalar list. Index 0
    /// also selects a node that occurs only once.
    ///
    /// For a map or list node this is the line of its first leaf, not the
    /// line of the node's own `key:`. Repeated keys are counted per
    /// occurrence across all list items of the enclosing block, so an index
    /// is not an item index when some items lack the key.
    #[must_use]
    pub fn line_at(&self, path: &FieldPath) -> Option<usize> {
        self.node_at(path)?.first_line()
    }

    /// Follows `path` and returns the scalar it ends on.
    #[must_use]
    pub fn leaf_at(&self, path: &FieldPath) -> Option<&Leaf> {
        match self.node_at(path)? {
            Node::Leaf(leaf) | Node::Value(PositionValue::Scalar(leaf)) => Some(leaf),
            Node::Map(_) | Node::Value(_) => None,
        }
    }

    fn node_at(&self, path: &FieldPath) -> Option<Node<'_>> {
        let mut node = Node::Map(&self.root);
        for segment in path.segments() {
            node = node.step(segment)?;
        }
        Some(node)
    }
}

#[derive(Clone, Copy)]
enum Node<'a> {
    Map(&'a PositionMap),
    Value(&'a PositionValue),
    Leaf(&'a Leaf),
}

impl<'a> Node<'a> {
    fn step(self, segment: &Segment) -> Option<Self> {
        match (self, segment) {
            (Self::Map(map) | Self::Value(PositionValue::Map(map)), Segment::Key(key)) => {
                map.get(key).map(Self::Value)
            }
            (Self::Value(PositionValue::Repeated(values)), Segment::Index(i)) => {
                values.get(*i).map(Self::Value)
            }
            (Self::Value(PositionValue::Items(items)), Segment::Index(i)) => {
                items.get(*i).map(Self::Leaf)
            }
            (node, Segment::Index(0)) => Some(node),
            _ => None,
        }
    }

    fn first_line(self) -> Option<usize> {
        match self {
            Self::Map(map) => map.first_line(),
            Self::Value(value) => value.first_line(),
            Self::Leaf(leaf) => Some(leaf.line),
        }
    }
}

/// A classified content line.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Line {
    line: usize,
    indent: usize,
    key: Option<String>,
    value: String,
}

impl Line {
    fn classify(raw: &str, line: usize) -> Option<Self> {
        let trimmed = raw.trim_start();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let mut indent = raw.len() - trimmed.len();
        let mut content = trimmed;
        if let Some(rest) = content.strip_prefix("- ") {
            let item = rest.trim_start();
            indent += content.len() - item.len();
            content = item;
        } else if content == "-" {
            return None;
        }
        let content = strip_comment(content).trim_end();
        if content.is_empty() {
            return None;
        }

        let (key, value) = match split_key(content) {
            Some((key, value)) => (Some(unquote(key).to_string()), unquote(value).to_string()),
            None => (None, unquote(content).to_string()),
        };
        Some(Self {
            line,
            indent,
            key,
            value,
        })
    }

    fn leaf(&self) -> Leaf {
        Leaf {
            value: self.value.clone(),
            line: self.line,
        }
    }
}

fn parse_map(lines: &[Line], pos: &mut usize, floor: usize) -> PositionMap {
    let mut map = PositionMap::default();
    while let Some(line) = lines.get(*pos) {
        if line.indent < floor {
            break;
        }
        *pos += 1;
        let Some(key) = &line.key else {
            continue;
        };
        if !line.value.is_empty() {
            map.insert(key.clone(), PositionValue::Scalar(line.leaf()));
            continue;
        }

        let Some(next) = lines.get(*pos) else {
            break;
        };
        if next.indent <= line.indent {
            continue;
        }
        if next.key.is_none() {
            let mut items = Vec::new();
            while let Some(item) = lines.get(*pos) {
                if item.indent <= line.indent || item.key.is_some() {
                    break;
                }
                items.push(item.leaf());
                *pos += 1;
            }
            map.insert(key.clone(), PositionValue::Items(items));
        } else {
            let child = parse_map(lines, pos, next.indent);
            map.insert(key.clone(), PositionValue::Map(child));
        }
    }
    map
}

/// Cuts a trailing ` # comment`.
fn strip_comment(s: &str) -> &str {
    s.find(" #").map_or(s, |i| &s[..i])
}

/// Splits at the first `:` followed by whitespace or end of line.
fn split_key(s: &str) -> Option<(&str, &str)> {
    let bytes = s.as_bytes();
    let idx = bytes.iter().enumerate().position(|(i, b)| {
        *b == b':' && bytes.get(i + 1).map_or(true, u8::is_ascii_whitespace)
    })?;
    Some((s[..idx].trim(), s[idx + 1..].trim()))
}

fn unquote(s: &str) -> &str {
    let s = s.trim();
    for quote in ['"', '\''] {
        if let Some(inner) = s.strip_prefix(quote).and_then(|r| r.strip_suffix(quote)) {
            return inner;
        }
    }
    s
}
