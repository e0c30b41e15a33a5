//! Grammar strategy trait for language-specific extraction rules.

use tree_sitter::{Language, Node};

use super::query::QuerySources;

/// Language-specific rules the extraction engine is parameterized by.
///
/// The engine itself knows nothing about any one language. A grammar supplies:
///
/// 1. **Grammar**: the tree-sitter language handle
/// 2. **Queries**: one pattern per family (imports, classes, functions, calls)
/// 3. **Scope rules**: which node kinds open a named scope
/// 4. **Decoders**: how to read a callee name and an imported module name
///
/// # Example Implementation
///
/// ```ignore
/// impl Grammar for PythonGrammar {
///     fn language_name(&self) -> &'static str { "Python" }
///     fn language(&self) -> Language { tree_sitter_python::LANGUAGE.into() }
///     fn supported_extensions(&self) -> &[&'static str] { &["py", "pyi"] }
///     // queries and decoders...
/// }
/// ```
pub trait Grammar: Send + Sync {
    /// Human-readable language name.
    fn language_name(&self) -> &'static str;

    /// Tree-sitter grammar handle.
    fn language(&self) -> Language;

    /// File extensions this grammar handles.
    fn supported_extensions(&self) -> &[&'static str];

    /// Check if this grammar can handle the given file extension.
    fn can_parse(&self, extension: &str) -> bool {
        self.supported_extensions()
            .iter()
            .any(|ext| ext.eq_ignore_ascii_case(extension))
    }

    /// Query source for each family.
    fn query_sources(&self) -> QuerySources;

    /// Whether `node` opens a named scope (function or class definition).
    fn is_scope(&self, node: &Node<'_>) -> bool;

    /// The name token of a scope node, if it has one.
    fn scope_name<'tree>(&self, node: &Node<'tree>) -> Option<Node<'tree>> {
        node.child_by_field_name("name")
    }

    /// Strip wrappers (such as decorators) from a matched definition,
    /// returning the definition node proper.
    fn definition_node<'tree>(&self, matched: Node<'tree>) -> Node<'tree> {
        matched
    }

    /// Decode the called name from a call expression.
    fn callee_name(&self, call: &Node<'_>, source: &[u8]) -> Option<String>;

    /// Decode the module name from an import statement.
    fn imported_module(&self, statement: &Node<'_>, source: &[u8]) -> Option<String>;
}
