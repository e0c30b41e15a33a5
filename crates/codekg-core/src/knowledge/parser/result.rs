//! Extraction result for one source file.

use serde::{Deserialize, Serialize};

use crate::knowledge::ontology::{EdgeType, GraphEdge, GraphNode, NodeType};

/// Nodes and edges extracted from a single file.
///
/// Nodes are ordered File, classes, functions and edges Contains, Imports,
/// Calls, each group in document order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParsedData {
    file_path: String,
    nodes: Vec<GraphNode>,
    edges: Vec<GraphEdge>,
}

impl ParsedData {
    pub fn new(file_path: impl Into<String>, nodes: Vec<GraphNode>, edges: Vec<GraphEdge>) -> Self {
        Self {
            file_path: file_path.into(),
            nodes,
            edges,
        }
    }

    pub fn file_path(&self) -> &str {
        &self.file_path
    }

    pub fn nodes(&self) -> &[GraphNode] {
        &self.nodes
    }

    pub fn edges(&self) -> &[GraphEdge] {
        &self.edges
    }

    /// Find a node by id.
    pub fn node(&self, id: &str) -> Option<&GraphNode> {
        self.nodes.iter().find(|n| n.id() == id)
    }

    pub fn nodes_of_type(&self, node_type: NodeType) -> impl Iterator<Item = &GraphNode> {
        self.nodes.iter().filter(move |n| n.node_type() == node_type)
    }

    pub fn edges_of_type(&self, edge_type: EdgeType) -> impl Iterator<Item = &GraphEdge> {
        self.edges.iter().filter(move |e| e.edge_type() == edge_type)
    }

    /// Take ownership of `(file_path, nodes, edges)`.
    pub fn into_parts(self) -> (String, Vec<GraphNode>, Vec<GraphEdge>) {
        (self.file_path, self.nodes, self.edges)
    }

    /// Count nodes and edges by type.
    pub fn stats(&self) -> ParseStats {
        let mut stats = ParseStats::default();

        for node in &self.nodes {
            match node.node_type() {
                NodeType::File => stats.files += 1,
                NodeType::Class => stats.classes += 1,
                NodeType::Function => stats.functions += 1,
            }
        }

        for edge in &self.edges {
            match edge.edge_type() {
                EdgeType::Contains => stats.contains += 1,
                EdgeType::Imports => stats.imports += 1,
                EdgeType::Calls => stats.calls += 1,
            }
        }

        stats
    }
}

/// Statistics about a parse result.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ParseStats {
    pub files: usize,
    pub classes: usize,
    pub functions: usize,
    pub contains: usize,
    pub imports: usize,
    pub calls: usize,
}

impl ParseStats {
    pub fn nodes(&self) -> usize {
        self.files + self.classes + self.functions
    }

    pub fn edges(&self) -> usize {
        self.contains + self.imports + self.calls
    }
}

impl std::fmt::Display for ParseStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "Nodes:")?;
        writeln!(f, "  Files:     {}", self.files)?;
        writeln!(f, "  Classes:   {}", self.classes)?;
        writeln!(f, "  Functions: {}", self.functions)?;
        writeln!(f, "Edges:")?;
        writeln!(f, "  Contains:  {}", self.contains)?;
        writeln!(f, "  Imports:   {}", self.imports)?;
        writeln!(f, "  Calls:     {}", self.calls)?;
        Ok(())
    }
}
