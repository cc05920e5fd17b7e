// SPDX-License-Identifier: MIT OR Apache-2.0
// Copyright (c) 2025 fpga-intent contributors

//! Generic document tree
//!
//! Raw YAML is decoded into a closed set of node variants before any schema
//! rule is applied. Mappings keep their key order so diagnostics and stage
//! declaration order follow the source text.

use serde_yaml::Value;
use std::fmt;

use crate::errors::{ErrorKind, LoadError, Location};

/// Scalar leaf value
#[derive(Debug, Clone, PartialEq)]
pub enum Scalar {
    Null,
    Bool(bool),
    /// Any YAML integer, including those beyond `i64`
    Int(i128),
    Float(f64),
    Str(String),
}

/// Key-ordered mapping
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Mapping {
    entries: Vec<(String, Node)>,
}

impl Mapping {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append an entry; the decoder has already rejected duplicate keys
    pub fn push(&mut self, key: impl Into<String>, value: Node) {
        self.entries.push((key.into(), value));
    }

    pub fn get(&self, key: &str) -> Option<&Node> {
        self.entries.iter().find(|(k, _)| k == key).map(|(_, v)| v)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.get(key).is_some()
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// A node of the decoded document
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Scalar(Scalar),
    Sequence(Vec<Node>),
    Mapping(Mapping),
}

impl Node {
    /// Decode YAML text into a tree
    ///
    /// Only the first irrecoverable problem is reported.
    pub fn from_yaml(text: &str) -> Result<Self, LoadError> {
        let value: Value = serde_yaml::from_str(text).map_err(|e| {
            let mut message = e.to_string();
            let location = e.location().map(|loc| {
                // The location is reported separately
                let suffix = format!(" at line {} column {}", loc.line(), loc.column());
                message = message.replacen(&suffix, "", 1);
                Location::Source {
                    offset: loc.index(),
                    line: loc.line(),
                    column: loc.column(),
                }
            });
            LoadError::new(ErrorKind::SyntaxError, message, location)
        })?;

        Self::from_value(value, "")
    }

    fn from_value(value: Value, path: &str) -> Result<Self, LoadError> {
        let node = match value {
            Value::Null => Node::Scalar(Scalar::Null),
            Value::Bool(b) => Node::Scalar(Scalar::Bool(b)),
            Value::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Node::Scalar(Scalar::Int(i.into())),
                (None, Some(u)) => Node::Scalar(Scalar::Int(u.into())),
                (None, None) => Node::Scalar(Scalar::Float(n.as_f64().unwrap_or(f64::NAN))),
            },
            Value::String(s) => Node::Scalar(Scalar::Str(s)),
            Value::Sequence(items) => {
                let mut nodes = Vec::with_capacity(items.len());
                for (i, item) in items.into_iter().enumerate() {
                    nodes.push(Self::from_value(item, &index_path(path, i))?);
                }
                Node::Sequence(nodes)
            }
            Value::Mapping(map) => {
                let mut mapping = Mapping::new();
                for (key, item) in map {
                    let key = scalar_key(&key).ok_or_else(|| {
                        LoadError::new(
                            ErrorKind::SyntaxError,
                            "mapping keys must be scalars",
                            Some(Location::path(display_path(path))),
                        )
                    })?;
                    let child = Self::from_value(item, &key_path(path, &key))?;
                    mapping.push(key, child);
                }
                Node::Mapping(mapping)
            }
            Value::Tagged(tagged) => Self::from_value(tagged.value, path)?,
        };

        Ok(node)
    }

    /// Human-readable name of the node's type, for diagnostics
    pub fn type_name(&self) -> &'static str {
        match self {
            Node::Scalar(Scalar::Null) => "null",
            Node::Scalar(Scalar::Bool(_)) => "boolean",
            Node::Scalar(Scalar::Int(_)) => "integer",
            Node::Scalar(Scalar::Float(_)) => "float",
            Node::Scalar(Scalar::Str(_)) => "string",
            Node::Sequence(_) => "sequence",
            Node::Mapping(_) => "mapping",
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Node::Scalar(Scalar::Str(s)) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Node::Scalar(Scalar::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Integer value of any magnitude
    pub fn as_int(&self) -> Option<i128> {
        match self {
            Node::Scalar(Scalar::Int(i)) => Some(*i),
            _ => None,
        }
    }

    pub fn as_i64(&self) -> Option<i64> {
        self.as_int().and_then(|i| i64::try_from(i).ok())
    }

    pub fn as_scalar(&self) -> Option<&Scalar> {
        match self {
            Node::Scalar(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_sequence(&self) -> Option<&[Node]> {
        match self {
            Node::Sequence(items) => Some(items),
            _ => None,
        }
    }

    pub fn as_mapping(&self) -> Option<&Mapping> {
        match self {
            Node::Mapping(m) => Some(m),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Node::Scalar(Scalar::Null))
    }
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Scalar::Null => f.write_str("null"),
            Scalar::Bool(b) => write!(f, "{}", b),
            Scalar::Int(i) => write!(f, "{}", i),
            Scalar::Float(x) => write!(f, "{}", x),
            Scalar::Str(s) => f.write_str(s),
        }
    }
}

fn scalar_key(key: &Value) -> Option<String> {
    match key {
        Value::String(s) => Some(s.clone()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Number(n) => Some(n.to_string()),
        Value::Null => Some("null".to_string()),
        Value::Tagged(tagged) => scalar_key(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// `parent.key`, or `key` at the document root
pub(crate) fn key_path(parent: &str, key: &str) -> String {
    if parent.is_empty() {
        key.to_string()
    } else {
        format!("{}.{}", parent, key)
    }
}

/// `parent[i]`
pub(crate) fn index_path(parent: &str, index: usize) -> String {
    format!("{}[{}]", parent, index)
}

/// Document path as shown to users; the root is `<root>`
pub(crate) fn display_path(path: &str) -> &str {
    if path.is_empty() {
        "<root>"
    } else {
        path
    }
}
