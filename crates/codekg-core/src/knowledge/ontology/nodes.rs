//! Node types for the knowledge graph.
//!
//! Nodes represent entities in the codebase:
//!
//! - **File**: a parsed source file
//! - **Class**: a class definition declared in a file
//! - **Function**: a function or method declared in a file

use serde::{Deserialize, Serialize};

use super::{entity_id, Properties};

/// Discriminates what kind of code entity a node represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum NodeType {
    File,
    Class,
    Function,
}

impl std::fmt::Display for NodeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::File => write!(f, "File"),
            Self::Class => write!(f, "Class"),
            Self::Function => write!(f, "Function"),
        }
    }
}

/// A typed vertex of the code graph.
///
/// Nodes are immutable values: the builder methods consume `self` and return
/// a new node rather than mutating a shared one.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphNode {
    id: String,
    #[serde(rename = "type")]
    node_type: NodeType,
    #[serde(default)]
    properties: Properties,
}

impl GraphNode {
    /// Create a node with no properties.
    pub fn new(id: impl Into<String>, node_type: NodeType) -> Self {
        Self {
            id: id.into(),
            node_type,
            properties: Properties::new(),
        }
    }

    /// File node: the id is the path itself.
    pub fn file(path: &str, language: &str) -> Self {
        Self::new(path, NodeType::File)
            .with_property("path", path)
            .with_property("language", language)
    }

    /// Class node declared in `file_id`.
    pub fn class(file_id: &str, name: &str) -> Self {
        Self::new(entity_id(file_id, name), NodeType::Class).with_property("name", name)
    }

    /// Function or method node declared in `file_id`.
    pub fn function(file_id: &str, name: &str) -> Self {
        Self::new(entity_id(file_id, name), NodeType::Function).with_property("name", name)
    }

    /// Return a copy of this node with `key` set to `value`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    /// Attach the 1-based line span of the definition.
    pub fn with_span(self, start_line: u32, end_line: u32) -> Self {
        self.with_property("start_line", start_line)
            .with_property("end_line", end_line)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn node_type(&self) -> NodeType {
        self.node_type
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Declared name for classes and functions, path for files.
    pub fn name(&self) -> Option<&str> {
        let key = match self.node_type {
            NodeType::File => "path",
            NodeType::Class | NodeType::Function => "name",
        };
        self.properties.get(key).and_then(|v| v.as_str())
    }

    /// Merge `other`'s properties into a copy of this node.
    ///
    /// Keys present in both take `other`'s value; the id and type are kept.
    pub fn merged_with(&self, other: &GraphNode) -> Self {
        let mut merged = self.clone();
        merged
            .properties
            .extend(other.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}
