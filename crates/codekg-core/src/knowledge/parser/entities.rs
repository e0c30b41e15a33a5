//! Class and function extraction.

use std::collections::{HashMap, HashSet};
use std::time::Instant;

use tree_sitter::Node;

use super::query::{Capture, PatternSet, QueryFamily};
use super::traits::Grammar;
use super::treesitter::TreeSitterParser;
use crate::knowledge::ontology::GraphNode;

/// Function id to its definition node. Lives only as long as the tree.
pub type ScopeIndex<'tree> = HashMap<String, Node<'tree>>;

/// Function nodes plus the definitions they came from.
pub struct ExtractedFunctions<'tree> {
    pub nodes: Vec<GraphNode>,
    pub scope_index: ScopeIndex<'tree>,
}

/// Turns class and function matches into graph nodes.
pub struct EntityExtractor<'a> {
    grammar: &'a dyn Grammar,
    patterns: &'a PatternSet,
    file_id: &'a str,
    source: &'a [u8],
    deadline: Option<Instant>,
}

impl<'a> EntityExtractor<'a> {
    pub fn new(grammar: &'a dyn Grammar, patterns: &'a PatternSet, file_id: &'a str, source: &'a [u8]) -> Self {
        Self {
            grammar,
            patterns,
            file_id,
            source,
            deadline: None,
        }
    }

    /// Stop matching once `deadline` passes. Results are then incomplete and
    /// the caller is expected to discard them.
    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    fn captures<'tree>(&self, family: QueryFamily, root: Node<'tree>) -> Vec<Capture<'tree>> {
        self.patterns
            .captures_until(family, root, self.source, self.deadline)
            .unwrap_or_default()
    }

    /// One Class node per distinct class id, in match order.
    pub fn extract_classes(&self, root: Node<'_>) -> Vec<GraphNode> {
        self.definitions(QueryFamily::Class, root)
            .into_iter()
            .map(|(name, definition)| {
                GraphNode::class(self.file_id, &name).with_span(
                    TreeSitterParser::node_line(&definition),
                    TreeSitterParser::node_end_line(&definition),
                )
            })
            .collect()
    }

    /// One Function node per distinct function id, in match order, along
    /// with each function's definition node for scope resolution.
    pub fn extract_functions<'tree>(&self, root: Node<'tree>) -> ExtractedFunctions<'tree> {
        let mut nodes = Vec::new();
        let mut scope_index = ScopeIndex::new();

        for (name, definition) in self.definitions(QueryFamily::Function, root) {
            let node = GraphNode::function(self.file_id, &name).with_span(
                TreeSitterParser::node_line(&definition),
                TreeSitterParser::node_end_line(&definition),
            );
            scope_index.insert(node.id().to_string(), definition);
            nodes.push(node);
        }

        ExtractedFunctions { nodes, scope_index }
    }

    /// Decoded `(name, definition)` pairs, first occurrence of each name only.
    ///
    /// Decorated definitions match twice (bare and wrapped); both resolve to
    /// the same unwrapped definition, so keeping the first is enough.
    fn definitions<'tree>(&self, family: QueryFamily, root: Node<'tree>) -> Vec<(String, Node<'tree>)> {
        let mut seen = HashSet::new();
        let mut definitions = Vec::new();

        for capture in self.captures(family, root) {
            let (name, matched) = match capture {
                Capture::Class { name, definition } | Capture::Function { name, definition } => (name, definition),
                _ => continue,
            };
            let Some(name) = TreeSitterParser::node_text(&name, self.source) else {
                tracing::trace!(%family, line = TreeSitterParser::node_line(&matched), "undecodable name");
                continue;
            };
            if seen.insert(name.to_string()) {
                definitions.push((name.to_string(), self.grammar.definition_node(matched)));
            }
        }

        definitions
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::parser::python::PythonGrammar;

    fn with_extractor<R>(source: &str, f: impl FnOnce(&EntityExtractor<'_>, Node<'_>) -> R) -> R {
        let grammar = PythonGrammar::new();
        let patterns = PatternSet::compile(&grammar.language(), &grammar.query_sources()).unwrap();
        let base = TreeSitterParser::new(grammar.language(), "Python");
        let tree = base.parse_tree(source).unwrap();
        let extractor = EntityExtractor::new(&grammar, &patterns, "m.py", source.as_bytes());
        f(&extractor, tree.root_node())
    }

    #[test]
    fn test_classes_with_spans() {
        let source = "class A:\n    pass\n\n\nclass B(A):\n    x = 1\n    y = 2\n";
        let classes = with_extractor(source, |e, root| e.extract_classes(root));
        let ids: Vec<&str> = classes.iter().map(|n| n.id()).collect();
        assert_eq!(ids, vec!["m.py::A", "m.py::B"]);
        assert_eq!(classes[1].properties()["start_line"], 5);
        assert_eq!(classes[1].properties()["end_line"], 7);
    }

    #[test]
    fn test_decorated_class_appears_once() {
        let source = "@dataclass\nclass Point:\n    x: int\n";
        let classes = with_extractor(source, |e, root| e.extract_classes(root));
        assert_eq!(classes.len(), 1);
        assert_eq!(classes[0].properties()["start_line"], 2);
    }

    #[test]
    fn test_duplicate_function_names_keep_first() {
        let source = "def f():\n    pass\n\ndef f():\n    return 1\n";
        let (ids, first_line) = with_extractor(source, |e, root| {
            let extracted = e.extract_functions(root);
            let ids: Vec<String> = extracted.nodes.iter().map(|n| n.id().to_string()).collect();
            let line = TreeSitterParser::node_line(&extracted.scope_index["m.py::f"]);
            (ids, line)
        });
        assert_eq!(ids, vec!["m.py::f"]);
        assert_eq!(first_line, 1);
    }

    #[test]
    fn test_scope_index_holds_unwrapped_definitions() {
        let source = "@staticmethod\nasync def fetch():\n    pass\n";
        let kind = with_extractor(source, |e, root| {
            let extracted = e.extract_functions(root);
            assert_eq!(extracted.nodes.len(), 1);
            extracted.scope_index["m.py::fetch"].kind()
        });
        assert_eq!(kind, "function_definition");
    }
}
