//! Structural knowledge graph of a codebase.
//!
//! This module turns source files into a typed graph:
//! - **Nodes**: File, Class, Function
//! - **Edges**: Contains, Imports, Calls
//!
//! # Components
//!
//! - [`CodeGraphParser`] - Extracts the graph of a single file
//! - [`GraphStore`] - Destination for per-file results, with [`MemoryGraphStore`]
//! - [`indexer::RepositoryIndexer`] - Walks a directory and feeds a store
//!
//! # Example
//!
//! ```ignore
//! use codekg_core::knowledge::{CodeGraphParser, MemoryGraphStore, GraphStore};
//!
//! let parser = CodeGraphParser::new("python")?;
//! let data = parser.parse("app/main.py", &source);
//!
//! let store = MemoryGraphStore::new();
//! store.merge(&data).await?;
//! let callers = store.callers_of("handle_request").await;
//! ```

mod error;
pub mod indexer;
pub mod ontology;
pub mod parser;
mod store;

pub use error::KnowledgeError;
pub use indexer::{IndexStats, Indexer, RepositoryIndexer};
pub use ontology::{EdgeType, GraphEdge, GraphNode, NodeType};
pub use parser::{CodeGraphParser, Grammar, GrammarRegistry, ParseStats, ParsedData, PythonGrammar};
pub use store::{GraphStats, GraphStore, MemoryGraphStore, MergeStats};
