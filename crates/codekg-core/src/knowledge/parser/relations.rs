//! Import and call extraction.

use std::collections::HashSet;
use std::time::Instant;

use tree_sitter::Node;

use super::query::{Capture, PatternSet, QueryFamily};
use super::scope::ScopeResolver;
use super::traits::Grammar;
use super::treesitter::TreeSitterParser;
use crate::knowledge::ontology::{entity_id, GraphEdge};

/// Turns import and call matches into graph edges.
pub struct RelationExtractor<'a> {
    grammar: &'a dyn Grammar,
    patterns: &'a PatternSet,
    file_id: &'a str,
    source: &'a [u8],
    deadline: Option<Instant>,
}

impl<'a> RelationExtractor<'a> {
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

    /// One Imports edge per import statement, file to module name.
    ///
    /// Module names stay unresolved, so targets are usually not node ids.
    /// A module imported twice yields two edges.
    pub fn extract_imports(&self, root: Node<'_>) -> Vec<GraphEdge> {
        let mut edges = Vec::new();
        for capture in self.captures(QueryFamily::Import, root) {
            let Capture::Import { statement } = capture else {
                continue;
            };
            match self.grammar.imported_module(&statement, self.source) {
                Some(module) => edges.push(
                    GraphEdge::imports(self.file_id, module)
                        .with_property("line", TreeSitterParser::node_line(&statement)),
                ),
                None => tracing::trace!(
                    line = TreeSitterParser::node_line(&statement),
                    "import without module name"
                ),
            }
        }
        edges
    }

    /// Calls edges from the enclosing scope to same-file functions.
    ///
    /// A call is kept only when its callee id is in `known_ids`, the callee
    /// name is not one of `class_names` (constructor calls), the edge is not
    /// a self-loop, and the `(caller, callee)` pair has not been seen.
    pub fn extract_calls(
        &self,
        root: Node<'_>,
        known_ids: &HashSet<String>,
        class_names: &HashSet<String>,
    ) -> Vec<GraphEdge> {
        let scopes = ScopeResolver::new(self.grammar, self.file_id, self.source);
        let mut seen: HashSet<(String, String)> = HashSet::new();
        let mut edges = Vec::new();

        for capture in self.captures(QueryFamily::Call, root) {
            let Capture::Call { expression, .. } = capture else {
                continue;
            };
            let Some(callee) = self.grammar.callee_name(&expression, self.source) else {
                continue;
            };
            if class_names.contains(&callee) {
                continue;
            }

            let target = entity_id(self.file_id, &callee);
            if !known_ids.contains(&target) {
                continue;
            }

            let caller = scopes.enclosing_scope(&expression);
            if caller == target {
                continue;
            }
            if seen.insert((caller.clone(), target.clone())) {
                edges.push(GraphEdge::calls(caller, target));
            }
        }

        edges
    }
}
