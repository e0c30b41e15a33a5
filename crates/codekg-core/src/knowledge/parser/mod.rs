//! Structural extraction from source code.
//!
//! Turns one source file into File, Class and Function nodes connected by
//! Contains, Imports and Calls edges. Parsing uses tree-sitter; everything
//! language-specific lives behind the [`Grammar`] trait.
//!
//! ## Components
//!
//! - `Grammar` trait - Query sources, scope kinds and name decoders per language
//! - `GrammarRegistry` - Resolves a grammar by name or file extension
//! - `PatternSet` - Compiled queries returning typed `Capture`s
//! - `EntityExtractor` / `RelationExtractor` - Nodes and edges from captures
//! - `CodeGraphParser` - Runs the whole pipeline for one file
//! - `ParsedData` - The extracted nodes and edges
//!
//! ## Supported Languages
//!
//! - Python (tree-sitter)

mod assembler;
mod entities;
mod python;
mod query;
mod registry;
mod relations;
mod result;
mod scope;
mod traits;
mod treesitter;

pub use assembler::CodeGraphParser;
pub use entities::{EntityExtractor, ExtractedFunctions, ScopeIndex};
pub use python::PythonGrammar;
pub use query::{Capture, PatternSet, QueryFamily, QuerySources};
pub use registry::GrammarRegistry;
pub use relations::RelationExtractor;
pub use result::{ParseStats, ParsedData};
pub use scope::ScopeResolver;
pub use traits::Grammar;
pub use treesitter::TreeSitterParser;
