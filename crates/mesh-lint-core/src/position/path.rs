//! Field paths into a position tree.

use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One step of a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Segment {
    /// Descend into a map entry.
    Key(String),
    /// Select an element of a repeated key or a scalar list.
    Index(usize),
}

/// A path such as `spec.http.match[0].uri[1].regex`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct FieldPath {
    segments: Vec<Segment>,
}

impl FieldPath {
    /// Creates an empty path.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a key segment.
    #[must_use]
    pub fn key(mut self, key: impl Into<String>) -> Self {
        self.segments.push(Segment::Key(key.into()));
        self
    }

    /// Appends an index segment.
    #[must_use]
    pub fn index(mut self, index: usize) -> Self {
        self.segments.push(Segment::Index(index));
        self
    }

    /// Returns the segments.
    #[must_use]
    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }
}

impl fmt::Display for FieldPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, segment) in self.segments.iter().enumerate() {
            match segment {
                Segment::Key(key) if i == 0 => f.write_str(key)?,
                Segment::Key(key) => write!(f, ".{key}")?,
                Segment::Index(index) => write!(f, "[{index}]")?,
            }
        }
        Ok(())
    }
}

/// Error parsing a [`FieldPath`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid field path `{path}`: {reason}")]
pub struct ParsePathError {
    path: String,
    reason: &'static str,
}

impl FromStr for FieldPath {
    type Err = ParsePathError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = |reason| ParsePathError {
            path: s.to_string(),
            reason,
        };
        let mut path = Self::new();
        for part in s.split('.') {
            let (name, mut rest) = part.split_once('[').unwrap_or((part, ""));
            if name.is_empty() {
                return Err(err("empty key"));
            }
            path = path.key(name);
            if rest.is_empty() {
                continue;
            }
            loop {
                let (digits, after) = rest.split_once(']').ok_or_else(|| err("unclosed `[`"))?;
                let index = digits.parse().map_err(|_| err("index is not a number"))?;
                path = path.index(index);
                if after.is_empty() {
                    break;
                }
                rest = after.strip_prefix('[').ok_or_else(|| err("unexpected text after `]`"))?;
            }
        }
        Ok(path)
    }
}
