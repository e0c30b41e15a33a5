//! Python grammar using tree-sitter.

use tree_sitter::{Language, Node};

use super::query::QuerySources;
use super::traits::Grammar;
use super::treesitter::TreeSitterParser;

const IMPORT_QUERY: &str = r#"
(import_statement) @import.statement
(import_from_statement) @import.statement
"#;

const CLASS_QUERY: &str = r#"
(class_definition
  name: (identifier) @class.name) @class.definition

(decorated_definition
  definition: (class_definition
    name: (identifier) @class.name)) @class.definition
"#;

// `async def` parses as a function_definition with an `async` token, so one
// pattern covers both.
const FUNCTION_QUERY: &str = r#"
(function_definition
  name: (identifier) @function.name) @function.definition

(decorated_definition
  definition: (function_definition
    name: (identifier) @function.name)) @function.definition
"#;

const CALL_QUERY: &str = r#"
(call
  function: [
    (identifier) @call.name
    (attribute
      attribute: (identifier) @call.name)
  ]) @call.expression
"#;

/// Python grammar using tree-sitter.
#[derive(Debug, Default, Clone, Copy)]
pub struct PythonGrammar;

impl PythonGrammar {
    pub fn new() -> Self {
        Self
    }

    /// Module of `from X import ...`, read from the `module_name` field.
    ///
    /// Relative imports keep their dots (`from . import x` gives `.`).
    fn from_import_module(statement: &Node<'_>, source: &[u8]) -> Option<String> {
        let module = statement.child_by_field_name("module_name")?;
        TreeSitterParser::node_text(&module, source).map(str::to_string)
    }

    /// First module of `import X, Y as Z`, with any alias dropped.
    fn plain_import_module(statement: &Node<'_>, source: &[u8]) -> Option<String> {
        let first = statement.child_by_field_name("name")?;
        let dotted = if first.kind() == "aliased_import" {
            first.child_by_field_name("name")?
        } else {
            first
        };
        TreeSitterParser::node_text(&dotted, source).map(str::to_string)
    }
}

/// Read the module name straight from the statement text.
///
/// Used when the tree around an import is damaged and its fields are missing.
fn module_from_text(text: &str) -> Option<String> {
    let text = text.trim();
    let after_keyword = |keyword: &str| {
        text.strip_prefix(keyword)
            .filter(|rest| rest.starts_with(char::is_whitespace))
            .map(str::trim_start)
    };

    let module = if let Some(rest) = after_keyword("from") {
        rest.split_whitespace().next()?
    } else if let Some(rest) = after_keyword("import") {
        let first = rest.split(',').next()?;
        first.split_whitespace().next()?
    } else {
        return None;
    };

    (!module.is_empty()).then(|| module.to_string())
}

impl Grammar for PythonGrammar {
    fn language_name(&self) -> &'static str {
        "Python"
    }

    fn language(&self) -> Language {
        tree_sitter_python::LANGUAGE.into()
    }

    fn supported_extensions(&self) -> &[&'static str] {
        &["py", "pyi"]
    }

    fn query_sources(&self) -> QuerySources {
        QuerySources {
            imports: IMPORT_QUERY,
            classes: CLASS_QUERY,
            functions: FUNCTION_QUERY,
            calls: CALL_QUERY,
        }
    }

    fn is_scope(&self, node: &Node<'_>) -> bool {
        matches!(node.kind(), "function_definition" | "class_definition")
    }

    fn definition_node<'tree>(&self, matched: Node<'tree>) -> Node<'tree> {
        if matched.kind() == "decorated_definition" {
            matched.child_by_field_name("definition").unwrap_or(matched)
        } else {
            matched
        }
    }

    fn callee_name(&self, call: &Node<'_>, source: &[u8]) -> Option<String> {
        let function = call.child_by_field_name("function")?;
        let name = match function.kind() {
            "identifier" => function,
            "attribute" => function.child_by_field_name("attribute")?,
            _ => return None,
        };
        TreeSitterParser::node_text(&name, source).map(str::to_string)
    }

    fn imported_module(&self, statement: &Node<'_>, source: &[u8]) -> Option<String> {
        let from_fields = match statement.kind() {
            "import_from_statement" => Self::from_import_module(statement, source),
            "import_statement" => Self::plain_import_module(statement, source),
            _ => None,
        };

        from_fields.or_else(|| {
            let text = TreeSitterParser::node_text(statement, source)?;
            module_from_text(text)
        })
    }
}
