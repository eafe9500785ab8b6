//! Structured document paths.
//!
//! A [`JsonPath`] is the sequence of object keys and array indices leading
//! from the document root to a node. Keys may contain `.`, so paths are kept
//! structured everywhere and only joined into a display string when a
//! message is presented.

use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One step of a path: an object key or an array index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Segment {
    Index(usize),
    Key(String),
}

impl Segment {
    /// Returns the key if this segment is an object key.
    pub fn as_key(&self) -> Option<&str> {
        match self {
            Segment::Key(key) => Some(key),
            Segment::Index(_) => None,
        }
    }

    /// Returns true if this segment is the object key `key`.
    pub fn is_key(&self, key: &str) -> bool {
        self.as_key() == Some(key)
    }

    pub fn is_index(&self) -> bool {
        matches!(self, Segment::Index(_))
    }
}

impl From<&str> for Segment {
    fn from(key: &str) -> Self {
        Segment::Key(key.to_string())
    }
}

impl From<String> for Segment {
    fn from(key: String) -> Self {
        Segment::Key(key)
    }
}

impl From<&String> for Segment {
    fn from(key: &String) -> Self {
        Segment::Key(key.clone())
    }
}

impl From<usize> for Segment {
    fn from(index: usize) -> Self {
        Segment::Index(index)
    }
}

impl fmt::Display for Segment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Segment::Key(key) => f.write_str(key),
            Segment::Index(index) => write!(f, "{}", index),
        }
    }
}

/// Location of a node inside a document.
///
/// Serializes as an array of strings and numbers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct JsonPath(Vec<Segment>);

impl JsonPath {
    /// The empty path, addressing the document root.
    pub fn root() -> Self {
        Self(Vec::new())
    }

    pub fn new(segments: Vec<Segment>) -> Self {
        Self(segments)
    }

    /// Returns a new path with `segment` appended.
    ///
    /// The receiver is left untouched, so sibling branches of a traversal
    /// can each extend the same parent path.
    pub fn concat(&self, segment: impl Into<Segment>) -> Self {
        let mut segments = Vec::with_capacity(self.0.len() + 1);
        segments.extend_from_slice(&self.0);
        segments.push(segment.into());
        Self(segments)
    }

    pub fn segments(&self) -> &[Segment] {
        &self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn last(&self) -> Option<&Segment> {
        self.0.last()
    }

    /// Key `n` positions from the end (1 = last segment).
    ///
    /// Returns `None` if the path is shorter or the segment is an index.
    pub fn key_from_end(&self, n: usize) -> Option<&str> {
        if n == 0 || n > self.0.len() {
            return None;
        }
        self.0[self.0.len() - n].as_key()
    }

    /// The path of the parent node, or `None` for the root.
    pub fn parent(&self) -> Option<JsonPath> {
        if self.0.is_empty() {
            None
        } else {
            Some(Self(self.0[..self.0.len() - 1].to_vec()))
        }
    }

    /// Join segments with `.` for presentation.
    ///
    /// The result is for display only; never split it back to make
    /// decisions.
    pub fn to_display_string(&self) -> String {
        self.0
            .iter()
            .map(Segment::to_string)
            .collect::<Vec<_>>()
            .join(".")
    }

    /// Build a path from a `.`-joined display string.
    ///
    /// Lossy for keys containing `.`. Every part becomes a key segment;
    /// [`JsonPath::lookup`] lets numeric keys address array elements.
    pub fn from_display(s: &str) -> Self {
        if s.is_empty() {
            return Self::root();
        }
        Self(s.split('.').map(Segment::from).collect())
    }

    /// Find the node this path addresses inside `document`.
    pub fn lookup<'a>(&self, document: &'a Value) -> Option<&'a Value> {
        let mut current = document;
        for segment in &self.0 {
            current = match (segment, current) {
                (Segment::Key(key), Value::Object(map)) => map.get(key)?,
                (Segment::Key(key), Value::Array(items)) => items.get(key.parse::<usize>().ok()?)?,
                (Segment::Index(index), Value::Array(items)) => items.get(*index)?,
                (Segment::Index(index), Value::Object(map)) => map.get(&index.to_string())?,
                _ => return None,
            };
        }
        Some(current)
    }
}

impl fmt::Display for JsonPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

impl From<Vec<Segment>> for JsonPath {
    fn from(segments: Vec<Segment>) -> Self {
        Self(segments)
    }
}

impl From<&JsonPath> for JsonPath {
    fn from(path: &JsonPath) -> Self {
        path.clone()
    }
}

impl From<&str> for JsonPath {
    fn from(s: &str) -> Self {
        Self::from_display(s)
    }
}

impl From<&[&str]> for JsonPath {
    fn from(keys: &[&str]) -> Self {
        Self(keys.iter().map(|k| Segment::from(*k)).collect())
    }
}

impl<const N: usize> From<[&str; N]> for JsonPath {
    fn from(keys: [&str; N]) -> Self {
        Self(keys.iter().map(|k| Segment::from(*k)).collect())
    }
}
