//! Graph storage for extracted code graphs.
//!
//! A store receives one [`ParsedData`] per file and keeps the union of them.
//! Nodes are upserted by id and edges by `(source, target, type)`, so merging
//! the same result twice leaves the store unchanged. Imports targets are
//! module names and are stored without a matching node.

use async_trait::async_trait;
use std::collections::{BTreeMap, BTreeSet};
use tokio::sync::RwLock;

use super::error::KnowledgeError;
use super::ontology::{EdgeKey, EdgeType, GraphEdge, GraphNode, NodeType};
use super::parser::ParsedData;

/// Destination for per-file extraction results.
#[async_trait]
pub trait GraphStore: Send + Sync {
    /// Upsert every node and edge of `data`.
    async fn merge(&self, data: &ParsedData) -> Result<MergeStats, KnowledgeError>;

    /// Drop everything previously merged for `path`.
    async fn remove_file(&self, path: &str) -> Result<(), KnowledgeError>;

    /// Counts over the whole store.
    async fn stats(&self) -> Result<GraphStats, KnowledgeError>;
}

/// What a single merge changed.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MergeStats {
    pub nodes_added: usize,
    pub nodes_updated: usize,
    pub edges_added: usize,
    pub edges_updated: usize,
}

/// Node and edge counts by type.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct GraphStats {
    pub files: usize,
    pub classes: usize,
    pub functions: usize,
    pub contains: usize,
    pub imports: usize,
    pub calls: usize,
}

impl std::fmt::Display for GraphStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} files, {} classes, {} functions; {} contains, {} imports, {} calls",
            self.files, self.classes, self.functions, self.contains, self.imports, self.calls
        )
    }
}

#[derive(Default)]
struct FileEntries {
    nodes: BTreeSet<String>,
    edges: BTreeSet<EdgeKey>,
}

#[derive(Default)]
struct GraphState {
    nodes: BTreeMap<String, GraphNode>,
    edges: BTreeMap<EdgeKey, GraphEdge>,
    files: BTreeMap<String, FileEntries>,
}

/// In-process graph store.
///
/// Keeps everything in ordered maps behind a `tokio` read-write lock, so
/// snapshots come back in a stable order.
#[derive(Default)]
pub struct MemoryGraphStore {
    state: RwLock<GraphState>,
}

impl MemoryGraphStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Find a node by id.
    pub async fn node(&self, id: &str) -> Option<GraphNode> {
        self.state.read().await.nodes.get(id).cloned()
    }

    /// All nodes, ordered by id.
    pub async fn nodes(&self) -> Vec<GraphNode> {
        self.state.read().await.nodes.values().cloned().collect()
    }

    /// All edges, ordered by `(source, target, type)`.
    pub async fn edges(&self) -> Vec<GraphEdge> {
        self.state.read().await.edges.values().cloned().collect()
    }

    /// Nodes whose code calls a function with the given name.
    ///
    /// The caller may be a function, a class body or a whole file.
    pub async fn callers_of(&self, function_name: &str) -> Vec<GraphNode> {
        let state = self.state.read().await;
        let callers: BTreeSet<&str> = state
            .edges
            .values()
            .filter(|e| e.edge_type() == EdgeType::Calls)
            .filter(|e| {
                state
                    .nodes
                    .get(e.target_id())
                    .and_then(|n| n.name())
                    .is_some_and(|name| name == function_name)
            })
            .map(|e| e.source_id())
            .collect();

        callers
            .into_iter()
            .filter_map(|id| state.nodes.get(id).cloned())
            .collect()
    }

    /// Methods declared directly in classes with the given name.
    pub async fn methods_of(&self, class_name: &str) -> Vec<GraphNode> {
        let state = self.state.read().await;
        state
            .edges
            .values()
            .filter(|e| e.edge_type() == EdgeType::Contains)
            .filter(|e| {
                state.nodes.get(e.source_id()).is_some_and(|n| {
                    n.node_type() == NodeType::Class && n.name() == Some(class_name)
                })
            })
            .filter_map(|e| state.nodes.get(e.target_id()).cloned())
            .filter(|n| n.node_type() == NodeType::Function)
            .collect()
    }

    /// Files that import the given module.
    pub async fn importers_of(&self, module: &str) -> Vec<String> {
        let state = self.state.read().await;
        let files: BTreeSet<&str> = state
            .edges
            .values()
            .filter(|e| e.edge_type() == EdgeType::Imports && e.target_id() == module)
            .map(|e| e.source_id())
            .collect();
        files.into_iter().map(str::to_string).collect()
    }
}

/// Contains and Calls edges must join nodes that exist once `data` is merged.
fn check_integrity(state: &GraphState, data: &ParsedData) -> Result<(), KnowledgeError> {
    let incoming: BTreeSet<&str> = data.nodes().iter().map(|n| n.id()).collect();
    let exists = |id: &str| incoming.contains(id) || state.nodes.contains_key(id);

    for edge in data.edges() {
        if edge.edge_type() == EdgeType::Imports {
            continue;
        }
        for endpoint in [edge.source_id(), edge.target_id()] {
            if !exists(endpoint) {
                return Err(KnowledgeError::Store(format!(
                    "{} edge {} -> {} references unknown node {}",
                    edge.edge_type(),
                    edge.source_id(),
                    edge.target_id(),
                    endpoint
                )));
            }
        }
    }
    Ok(())
}

#[async_trait]
impl GraphStore for MemoryGraphStore {
    async fn merge(&self, data: &ParsedData) -> Result<MergeStats, KnowledgeError> {
        let mut state = self.state.write().await;
        check_integrity(&state, data)?;

        let mut stats = MergeStats::default();
        let GraphState { nodes, edges, files } = &mut *state;
        let entries = files.entry(data.file_path().to_string()).or_default();

        for node in data.nodes() {
            entries.nodes.insert(node.id().to_string());
            match nodes.get_mut(node.id()) {
                Some(existing) => {
                    *existing = existing.merged_with(node);
                    stats.nodes_updated += 1;
                }
                None => {
                    nodes.insert(node.id().to_string(), node.clone());
                    stats.nodes_added += 1;
                }
            }
        }

        for edge in data.edges() {
            let key = edge.key();
            entries.edges.insert(key.clone());
            match edges.get_mut(&key) {
                Some(existing) => {
                    *existing = existing.merged_with(edge);
                    stats.edges_updated += 1;
                }
                None => {
                    edges.insert(key, edge.clone());
                    stats.edges_added += 1;
                }
            }
        }

        tracing::debug!(
            file = data.file_path(),
            nodes_added = stats.nodes_added,
            edges_added = stats.edges_added,
            "merged file graph"
        );
        Ok(stats)
    }

    async fn remove_file(&self, path: &str) -> Result<(), KnowledgeError> {
        let mut state = self.state.write().await;
        let Some(entries) = state.files.remove(path) else {
            return Ok(());
        };

        for id in &entries.nodes {
            state.nodes.remove(id);
        }
        for key in &entries.edges {
            state.edges.remove(key);
        }
        state
            .edges
            .retain(|_, e| !entries.nodes.contains(e.source_id()) && !entries.nodes.contains(e.target_id()));

        Ok(())
    }

    async fn stats(&self) -> Result<GraphStats, KnowledgeError> {
        let state = self.state.read().await;
        let mut stats = GraphStats::default();

        for node in state.nodes.values() {
            match node.node_type() {
                NodeType::File => stats.files += 1,
                NodeType::Class => stats.classes += 1,
                NodeType::Function => stats.functions += 1,
            }
        }
        for edge in state.edges.values() {
            match edge.edge_type() {
                EdgeType::Contains => stats.contains += 1,
                EdgeType::Imports => stats.imports += 1,
                EdgeType::Calls => stats.calls += 1,
            }
        }

        Ok(stats)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn file_with_function(path: &str, function: &str) -> ParsedData {
        ParsedData::new(
            path,
            vec![
                GraphNode::file(path, "python"),
                GraphNode::function(path, function),
            ],
            vec![GraphEdge::contains(path, format!("{}::{}", path, function))],
        )
    }

    #[tokio::test]
    async fn test_merge_counts() {
        let store = MemoryGraphStore::new();
        let stats = store.merge(&file_with_function("a.py", "run")).await.unwrap();
        assert_eq!(stats.nodes_added, 2);
        assert_eq!(stats.edges_added, 1);
        assert_eq!(stats.nodes_updated, 0);
    }

    #[tokio::test]
    async fn test_dangling_contains_is_rejected() {
        let store = MemoryGraphStore::new();
        let data = ParsedData::new(
            "a.py",
            vec![GraphNode::file("a.py", "python")],
            vec![GraphEdge::contains("a.py", "a.py::ghost")],
        );
        let err = store.merge(&data).await.err().unwrap();
        assert!(matches!(err, KnowledgeError::Store(_)));
        assert!(store.nodes().await.is_empty());
    }

    #[tokio::test]
    async fn test_dangling_import_is_accepted() {
        let store = MemoryGraphStore::new();
        let data = ParsedData::new(
            "a.py",
            vec![GraphNode::file("a.py", "python")],
            vec![GraphEdge::imports("a.py", "requests")],
        );
        store.merge(&data).await.unwrap();
        assert_eq!(store.importers_of("requests").await, vec!["a.py"]);
    }

    #[tokio::test]
    async fn test_remove_file_keeps_other_files() {
        let store = MemoryGraphStore::new();
        store.merge(&file_with_function("a.py", "run")).await.unwrap();
        store.merge(&file_with_function("b.py", "run")).await.unwrap();

        store.remove_file("a.py").await.unwrap();

        let ids: Vec<String> = store.nodes().await.iter().map(|n| n.id().to_string()).collect();
        assert_eq!(ids, vec!["b.py", "b.py::run"]);
        assert_eq!(store.edges().await.len(), 1);
        store.remove_file("missing.py").await.unwrap();
    }
}
