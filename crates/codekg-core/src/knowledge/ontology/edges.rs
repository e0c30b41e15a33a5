//! Edge types (relationships) for the knowledge graph.
//!
//! - **Contains**: a file contains a class or function, a class contains a method
//! - **Imports**: a file references an external module by name
//! - **Calls**: code in one scope invokes a function defined in the same file

use serde::{Deserialize, Serialize};

use super::Properties;

/// What kind of relationship an edge represents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum EdgeType {
    Contains,
    Imports,
    Calls,
}

impl EdgeType {
    /// Relationship name in the style of graph query languages.
    pub fn relation_name(&self) -> &'static str {
        match self {
            Self::Contains => "CONTAINS",
            Self::Imports => "IMPORTS",
            Self::Calls => "CALLS",
        }
    }
}

impl std::fmt::Display for EdgeType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Contains => write!(f, "Contains"),
            Self::Imports => write!(f, "Imports"),
            Self::Calls => write!(f, "Calls"),
        }
    }
}

/// A directed, typed edge of the code graph.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GraphEdge {
    source_id: String,
    target_id: String,
    #[serde(rename = "type")]
    edge_type: EdgeType,
    #[serde(default)]
    properties: Properties,
}

impl GraphEdge {
    pub fn new(source_id: impl Into<String>, target_id: impl Into<String>, edge_type: EdgeType) -> Self {
        Self {
            source_id: source_id.into(),
            target_id: target_id.into(),
            edge_type,
            properties: Properties::new(),
        }
    }

    /// Parent CONTAINS child.
    pub fn contains(parent: impl Into<String>, child: impl Into<String>) -> Self {
        Self::new(parent, child, EdgeType::Contains)
    }

    /// File IMPORTS module. The module name is not resolved to a node.
    pub fn imports(file_id: impl Into<String>, module: impl Into<String>) -> Self {
        Self::new(file_id, module, EdgeType::Imports)
    }

    /// Caller scope CALLS callee.
    pub fn calls(caller: impl Into<String>, callee: impl Into<String>) -> Self {
        Self::new(caller, callee, EdgeType::Calls)
    }

    /// Return a copy of this edge with `key` set to `value`.
    pub fn with_property(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.properties.insert(key.into(), value.into());
        self
    }

    pub fn source_id(&self) -> &str {
        &self.source_id
    }

    pub fn target_id(&self) -> &str {
        &self.target_id
    }

    pub fn edge_type(&self) -> EdgeType {
        self.edge_type
    }

    pub fn properties(&self) -> &Properties {
        &self.properties
    }

    /// Identity used by stores for upserts: both endpoints plus the type.
    pub fn key(&self) -> EdgeKey {
        (self.source_id.clone(), self.target_id.clone(), self.edge_type)
    }

    /// Merge `other`'s properties into a copy of this edge.
    pub fn merged_with(&self, other: &GraphEdge) -> Self {
        let mut merged = self.clone();
        merged
            .properties
            .extend(other.properties.iter().map(|(k, v)| (k.clone(), v.clone())));
        merged
    }
}

/// `(source_id, target_id, type)`.
pub type EdgeKey = (String, String, EdgeType);
