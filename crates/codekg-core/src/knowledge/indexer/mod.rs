//! Repository indexing into a graph store.

mod discovery;
mod repository;

pub use discovery::{discover_files, file_id};
pub use repository::RepositoryIndexer;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::Path;

use super::error::KnowledgeError;
use super::parser::ParsedData;

/// Trait for indexing code into the knowledge graph.
#[async_trait]
pub trait Indexer: Send + Sync {
    /// Index a directory recursively.
    async fn index_directory(&self, path: &Path) -> Result<IndexStats, KnowledgeError>;

    /// Index a single file, replacing anything stored for it before.
    async fn index_file(&self, path: &str, content: &str) -> Result<ParsedData, KnowledgeError>;
}

/// Statistics about an indexing run.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of indexed files.
    pub files: usize,
    /// Files skipped because they could not be read, were not UTF-8 or
    /// failed to merge.
    pub skipped: usize,
    /// Files skipped because parsing exceeded the deadline.
    pub timed_out: usize,
    /// Number of extracted nodes, File nodes included.
    pub nodes: usize,
    /// Number of extracted edges.
    pub edges: usize,
    /// Number of indexed classes.
    pub classes: usize,
    /// Number of indexed functions and methods.
    pub functions: usize,
    /// Total size of indexed files in bytes.
    pub total_size: u64,
    /// Last update time.
    pub last_updated: Option<chrono::DateTime<chrono::Utc>>,
}
