//! Tree-sitter based parsing utilities shared across grammars.

use std::time::Duration;

use tree_sitter::{Language, Node, Parser as TSParser, Tree};

use crate::knowledge::error::KnowledgeError;

/// Base tree-sitter parser with shared functionality.
///
/// Holds only the grammar handle. A fresh `tree_sitter::Parser` is created for
/// every parse so one instance can serve many threads.
pub struct TreeSitterParser {
    language: Language,
    language_name: &'static str,
}

impl TreeSitterParser {
    pub fn new(language: Language, language_name: &'static str) -> Self {
        Self { language, language_name }
    }

    /// Verify the grammar loads into a parser.
    pub fn check_language(&self) -> Result<(), KnowledgeError> {
        self.new_parser().map(|_| ())
    }

    fn new_parser(&self) -> Result<TSParser, KnowledgeError> {
        let mut parser = TSParser::new();
        parser
            .set_language(&self.language)
            .map_err(|e| KnowledgeError::GrammarLoad {
                grammar: self.language_name.to_string(),
                message: e.to_string(),
            })?;
        Ok(parser)
    }

    /// Parse source code into a tree-sitter tree.
    ///
    /// Tree-sitter recovers from syntax errors by inserting `ERROR` and
    /// `MISSING` nodes, so malformed input still yields a tree. `None` is only
    /// returned when the parser itself cannot run.
    pub fn parse_tree(&self, content: &str) -> Option<Tree> {
        self.parse_tree_within(content, None)
    }

    /// Parse with an upper bound on parsing time.
    ///
    /// Returns `None` when the parser gives up after `timeout`.
    pub fn parse_tree_within(&self, content: &str, timeout: Option<Duration>) -> Option<Tree> {
        let mut parser = match self.new_parser() {
            Ok(parser) => parser,
            Err(e) => {
                tracing::warn!(error = %e, "parser unavailable");
                return None;
            }
        };
        if let Some(timeout) = timeout {
            // Zero means "no limit" to tree-sitter.
            parser.set_timeout_micros((timeout.as_micros() as u64).max(1));
        }
        parser.parse(content, None)
    }

    /// Get the non-empty UTF-8 text of a node.
    pub fn node_text<'a>(node: &Node<'_>, source: &'a [u8]) -> Option<&'a str> {
        node.utf8_text(source).ok().filter(|text| !text.is_empty())
    }

    /// Get line number (1-based) for a node.
    pub fn node_line(node: &Node<'_>) -> u32 {
        node.start_position().row as u32 + 1
    }

    /// Get end line number (1-based) for a node.
    pub fn node_end_line(node: &Node<'_>) -> u32 {
        node.end_position().row as u32 + 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn python() -> TreeSitterParser {
        TreeSitterParser::new(tree_sitter_python::LANGUAGE.into(), "Python")
    }

    #[test]
    fn test_check_language() {
        assert!(python().check_language().is_ok());
    }

    #[test]
    fn test_malformed_input_still_parses() {
        let tree = python().parse_tree("def broken(:\n    return (\n").unwrap();
        assert!(tree.root_node().has_error());
    }

    #[test]
    fn test_generous_timeout_still_parses() {
        let tree = python().parse_tree_within("x = 1\n", Some(Duration::from_secs(30)));
        assert!(tree.is_some());
    }

    #[test]
    fn test_node_text_and_lines() {
        let source = "\n\nx = 1\n";
        let tree = python().parse_tree(source).unwrap();
        let root = tree.root_node();
        let stmt = root.child(0).unwrap();
        assert_eq!(TreeSitterParser::node_text(&stmt, source.as_bytes()), Some("x = 1"));
        assert_eq!(TreeSitterParser::node_line(&stmt), 3);
        assert_eq!(TreeSitterParser::node_end_line(&stmt), 3);
    }
}
