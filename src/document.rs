//! An immutable, arena backed view of a parsed JSON document.
//!
//! Nodes are addressed through [`NodeId`] handles so an evaluation can move its cursor around the
//! document without borrowing into it.
//!
//! ```rust
//! use jpath::document::{Document, NodeKind};
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let doc: Document = r#"{"user":{"name":"Ana"}}"#.parse()?;
//!     let user = doc.find_field(doc.root(), "user").unwrap();
//!     assert_eq!(NodeKind::Object, doc.kind(user));
//!     assert_eq!(r#"{"name":"Ana"}"#, doc.serialize(user));
//!     Ok(())
//! }
//! ```

use log::debug;
use serde_json::{Map, Number, Value};
use std::fmt::{Display, Formatter};
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;

/// Handle to a node within the `Document` that produced it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct NodeId(usize);

/// A single node of the document. Children are referenced by `NodeId`.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    Null,
    Bool(bool),
    Number(Number),
    String(String),
    Array(Vec<NodeId>),
    Object(Vec<(String, NodeId)>),
}

/// The JSON type of a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NodeKind {
    Object,
    Array,
    String,
    Number,
    Boolean,
    Null,
}

impl Display for NodeKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            NodeKind::Object => "object",
            NodeKind::Array => "array",
            NodeKind::String => "string",
            NodeKind::Number => "number",
            NodeKind::Boolean => "boolean",
            NodeKind::Null => "null",
        };
        f.write_str(name)
    }
}

impl Node {
    /// Returns the JSON type of this node.
    #[must_use]
    pub fn kind(&self) -> NodeKind {
        match self {
            Node::Null => NodeKind::Null,
            Node::Bool(_) => NodeKind::Boolean,
            Node::Number(_) => NodeKind::Number,
            Node::String(_) => NodeKind::String,
            Node::Array(_) => NodeKind::Array,
            Node::Object(_) => NodeKind::Object,
        }
    }
}

/// A parsed JSON document.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    nodes: Vec<Node>,
    root: NodeId,
}

impl Document {
    /// Loads and parses the JSON file at `path`.
    ///
    /// # Errors
    ///
    /// Will return `Err` if the file cannot be read or does not contain valid JSON.
    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        debug!("loading document from {}", path.display());
        Self::from_reader(BufReader::new(File::open(path)?))
    }

    /// Parses a document from any reader.
    ///
    /// # Errors
    ///
    /// Will return `Err` if reading fails or the data is not valid JSON.
    pub fn from_reader<R: Read>(reader: R) -> Result<Self> {
        let value: Value = serde_json::from_reader(reader).map_err(|e| {
            if e.is_io() {
                Error::Io(e.into())
            } else {
                Error::Parse(e)
            }
        })?;
        Ok(value.into())
    }

    /// The root node of the document.
    #[inline]
    #[must_use]
    pub fn root(&self) -> NodeId {
        self.root
    }

    /// Number of nodes in the document.
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// Always `false`, a document holds at least its root.
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Returns the node behind `id`.
    ///
    /// # Panics
    ///
    /// Panics if `id` was handed out by a different document.
    #[inline]
    #[must_use]
    pub fn node(&self, id: NodeId) -> &Node {
        &self.nodes[id.0]
    }

    #[inline]
    #[must_use]
    pub fn kind(&self, id: NodeId) -> NodeKind {
        self.node(id).kind()
    }

    /// Looks up a field of an object node. Returns `None` for missing fields and non objects.
    #[must_use]
    pub fn find_field(&self, id: NodeId, name: &str) -> Option<NodeId> {
        match self.node(id) {
            Node::Object(fields) => fields
                .iter()
                .find(|(key, _)| key == name)
                .map(|(_, child)| *child),
            _ => None,
        }
    }

    /// The elements of an array node, `None` for anything else.
    #[must_use]
    pub fn elements(&self, id: NodeId) -> Option<&[NodeId]> {
        match self.node(id) {
            Node::Array(items) => Some(items.as_slice()),
            _ => None,
        }
    }

    /// Rebuilds the subtree at `id` as a `serde_json::Value`.
    #[must_use]
    pub fn to_value(&self, id: NodeId) -> Value {
        match self.node(id) {
            Node::Null => Value::Null,
            Node::Bool(b) => Value::Bool(*b),
            Node::Number(n) => Value::Number(n.clone()),
            Node::String(s) => Value::String(s.clone()),
            Node::Array(items) => Value::Array(items.iter().map(|i| self.to_value(*i)).collect()),
            Node::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(k, v)| (k.clone(), self.to_value(*v)))
                    .collect::<Map<String, Value>>(),
            ),
        }
    }

    /// Renders the subtree at `id` as compact JSON text, keeping the source key order.
    #[must_use]
    pub fn serialize(&self, id: NodeId) -> String {
        self.to_value(id).to_string()
    }

    fn insert(&mut self, value: Value) -> NodeId {
        let node = match value {
            Value::Null => Node::Null,
            Value::Bool(b) => Node::Bool(b),
            Value::Number(n) => Node::Number(n),
            Value::String(s) => Node::String(s),
            Value::Array(items) => {
                Node::Array(items.into_iter().map(|v| self.insert(v)).collect())
            }
            Value::Object(fields) => Node::Object(
                fields
                    .into_iter()
                    .map(|(k, v)| (k, self.insert(v)))
                    .collect(),
            ),
        };
        let id = NodeId(self.nodes.len());
        self.nodes.push(node);
        id
    }
}

impl From<Value> for Document {
    fn from(value: Value) -> Self {
        let mut doc = Document {
            nodes: Vec::new(),
            root: NodeId(0),
        };
        doc.root = doc.insert(value);
        debug!("built document with {} nodes", doc.nodes.len());
        doc
    }
}

impl FromStr for Document {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Ok(serde_json::from_str::<Value>(s)?.into())
    }
}

/// Result type for loading a document.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for loading a document.
#[derive(Error, Debug)]
pub enum Error {
    #[error("failed to read document: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse document: {0}")]
    Parse(#[from] serde_json::Error),
}
