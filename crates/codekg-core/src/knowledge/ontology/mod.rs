//! Knowledge Graph Ontology
//!
//! Defines the schema for the structural code graph: three node types
//! (File, Class, Function) and three edge types (Contains, Imports, Calls).
//!
//! ## Identifiers
//!
//! - A File node's id is its path, verbatim.
//! - A Class or Function node's id is `<file_path>::<name>`.
//!
//! Ids depend only on the path and the declared name, never on content, so the
//! same file always yields the same ids and a store can merge results by key.

pub mod edges;
pub mod nodes;

pub use edges::*;
pub use nodes::*;

/// Open-ended property map attached to nodes and edges.
///
/// A `BTreeMap` keeps serialization order stable between runs.
pub type Properties = std::collections::BTreeMap<String, serde_json::Value>;

/// Separator between a file path and a declared name in entity ids.
pub const ID_SEPARATOR: &str = "::";

/// Build the id of an entity declared in `file_id`.
pub fn entity_id(file_id: &str, name: &str) -> String {
    format!("{}{}{}", file_id, ID_SEPARATOR, name)
}
