//! Knowledge graph error types.

use std::path::PathBuf;
use thiserror::Error;

use crate::config::ConfigError;

/// Errors that can occur while building the knowledge graph.
///
/// Unbounded extraction never fails: every variant here is raised while
/// constructing an engine, by a bounded parse that runs out of time, or by
/// the I/O and storage layers around it.
#[derive(Debug, Error)]
pub enum KnowledgeError {
    /// No grammar is registered for the requested selector.
    #[error("Unsupported grammar: {0}")]
    UnsupportedGrammar(String),

    /// The grammar is registered but could not be loaded into a parser.
    #[error("Failed to load grammar {grammar}: {message}")]
    GrammarLoad { grammar: String, message: String },

    /// A structural query failed to compile or lacks a required capture.
    #[error("Invalid {family} query: {message}")]
    QueryCompile { family: String, message: String },

    /// IO error.
    #[error("IO error at {}: {source}", path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// A bounded parse was abandoned at its deadline.
    #[error("Parse of {path} exceeded {timeout_ms} ms")]
    ParseTimeout { path: String, timeout_ms: u64 },

    /// A blocking parse task panicked or was cancelled.
    #[error("Parse task failed for {path}: {message}")]
    Task { path: String, message: String },

    /// Graph store rejected an operation.
    #[error("Store error: {0}")]
    Store(String),
}

impl KnowledgeError {
    /// Attach a path to an IO error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        KnowledgeError::Io {
            path: path.into(),
            source,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_io_error_names_its_path() {
        let err = KnowledgeError::io("src/app.py", std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        assert_eq!(err.to_string(), "IO error at src/app.py: gone");
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_parse_timeout_message() {
        let err = KnowledgeError::ParseTimeout {
            path: "big.py".into(),
            timeout_ms: 5,
        };
        assert_eq!(err.to_string(), "Parse of big.py exceeded 5 ms");
    }
}
