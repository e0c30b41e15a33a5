pub mod config;
pub mod knowledge;

pub use config::Config;
pub use knowledge::{CodeGraphParser, GraphStore, KnowledgeError, MemoryGraphStore, ParsedData};
