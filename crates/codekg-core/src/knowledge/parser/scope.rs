//! Enclosing-scope resolution.

use tree_sitter::Node;

use super::traits::Grammar;
use super::treesitter::TreeSitterParser;
use crate::knowledge::ontology::entity_id;

/// Finds the id of the innermost named scope around a node.
pub struct ScopeResolver<'a> {
    grammar: &'a dyn Grammar,
    file_id: &'a str,
    source: &'a [u8],
}

impl<'a> ScopeResolver<'a> {
    pub fn new(grammar: &'a dyn Grammar, file_id: &'a str, source: &'a [u8]) -> Self {
        Self {
            grammar,
            file_id,
            source,
        }
    }

    /// Walk up from `node`'s parent to the nearest function or class
    /// definition whose name can be read, and return that entity's id.
    ///
    /// A definition whose name cannot be read (typically inside an error
    /// region) is passed over and the walk continues. Reaching the root
    /// yields the file id.
    pub fn enclosing_scope(&self, node: &Node<'_>) -> String {
        let mut current = node.parent();
        while let Some(ancestor) = current {
            if self.grammar.is_scope(&ancestor) {
                let name = self
                    .grammar
                    .scope_name(&ancestor)
                    .and_then(|n| TreeSitterParser::node_text(&n, self.source));
                if let Some(name) = name {
                    return entity_id(self.file_id, name);
                }
            }
            current = ancestor.parent();
        }
        self.file_id.to_string()
    }
}
