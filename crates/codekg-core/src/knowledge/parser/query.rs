//! Structural pattern matching over syntax trees.
//!
//! Each grammar supplies four tree-sitter queries (imports, classes,
//! functions, calls). They are compiled once per engine into a [`PatternSet`]
//! and run against every tree that engine parses. Matches come back as typed
//! [`Capture`] values instead of string-keyed capture maps.

use std::time::Instant;

use streaming_iterator::StreamingIterator;
use tree_sitter::{Language, Node, Query, QueryCursor, QueryMatch};

use crate::knowledge::error::KnowledgeError;

/// Capture carrying a whole import statement.
pub const IMPORT_STATEMENT: &str = "import.statement";
/// Capture carrying a class name token.
pub const CLASS_NAME: &str = "class.name";
/// Capture carrying a class definition (possibly decorated).
pub const CLASS_DEFINITION: &str = "class.definition";
/// Capture carrying a function name token.
pub const FUNCTION_NAME: &str = "function.name";
/// Capture carrying a function definition (possibly decorated).
pub const FUNCTION_DEFINITION: &str = "function.definition";
/// Capture carrying the resolved callee name token.
pub const CALL_NAME: &str = "call.name";
/// Capture carrying the whole call expression.
pub const CALL_EXPRESSION: &str = "call.expression";

/// The four query families every grammar provides.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryFamily {
    Import,
    Class,
    Function,
    Call,
}

impl QueryFamily {
    /// Capture names a query of this family must define: the primary capture
    /// and, for definitions and calls, the enclosing node.
    fn capture_names(&self) -> (&'static str, Option<&'static str>) {
        match self {
            Self::Import => (IMPORT_STATEMENT, None),
            Self::Class => (CLASS_NAME, Some(CLASS_DEFINITION)),
            Self::Function => (FUNCTION_NAME, Some(FUNCTION_DEFINITION)),
            Self::Call => (CALL_NAME, Some(CALL_EXPRESSION)),
        }
    }
}

impl std::fmt::Display for QueryFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Import => write!(f, "import"),
            Self::Class => write!(f, "class"),
            Self::Function => write!(f, "function"),
            Self::Call => write!(f, "call"),
        }
    }
}

/// Query source text for each family, in tree-sitter S-expression syntax.
#[derive(Debug, Clone, Copy)]
pub struct QuerySources {
    pub imports: &'static str,
    pub classes: &'static str,
    pub functions: &'static str,
    pub calls: &'static str,
}

/// One structural match, tagged by the family that produced it.
#[derive(Debug, Clone, Copy)]
pub enum Capture<'tree> {
    /// A plain or from-style import statement.
    Import { statement: Node<'tree> },
    /// A class name token and the node that matched around it.
    Class { name: Node<'tree>, definition: Node<'tree> },
    /// A function name token and the node that matched around it.
    Function { name: Node<'tree>, definition: Node<'tree> },
    /// The callee name token and the call expression.
    Call { name: Node<'tree>, expression: Node<'tree> },
}

struct CompiledQuery {
    family: QueryFamily,
    query: Query,
    primary: u32,
    secondary: Option<u32>,
}

impl CompiledQuery {
    fn compile(language: &Language, family: QueryFamily, source: &str) -> Result<Self, KnowledgeError> {
        let query = Query::new(language, source).map_err(|e| KnowledgeError::QueryCompile {
            family: family.to_string(),
            message: e.to_string(),
        })?;

        let (primary_name, secondary_name) = family.capture_names();
        let index_of = |name: &str| {
            query
                .capture_index_for_name(name)
                .ok_or_else(|| KnowledgeError::QueryCompile {
                    family: family.to_string(),
                    message: format!("missing @{} capture", name),
                })
        };
        let primary = index_of(primary_name)?;
        let secondary = secondary_name.map(index_of).transpose()?;

        Ok(Self {
            family,
            query,
            primary,
            secondary,
        })
    }

    fn to_capture<'tree>(&self, m: &QueryMatch<'_, 'tree>) -> Option<Capture<'tree>> {
        let find = |index: u32| m.captures.iter().find(|c| c.index == index).map(|c| c.node);

        let primary = find(self.primary)?;
        let secondary = match self.secondary {
            Some(index) => Some(find(index)?),
            None => None,
        };

        match (self.family, secondary) {
            (QueryFamily::Import, _) => Some(Capture::Import { statement: primary }),
            (QueryFamily::Class, Some(definition)) => Some(Capture::Class {
                name: primary,
                definition,
            }),
            (QueryFamily::Function, Some(definition)) => Some(Capture::Function {
                name: primary,
                definition,
            }),
            (QueryFamily::Call, Some(expression)) => Some(Capture::Call {
                name: primary,
                expression,
            }),
            _ => None,
        }
    }
}

/// Compiled queries for one grammar.
pub struct PatternSet {
    imports: CompiledQuery,
    classes: CompiledQuery,
    functions: CompiledQuery,
    calls: CompiledQuery,
}

impl PatternSet {
    /// Compile all four families.
    ///
    /// A query that fails to compile, or lacks one of its family's capture
    /// names, is a programming error in the grammar and is reported here
    /// rather than during extraction.
    pub fn compile(language: &Language, sources: &QuerySources) -> Result<Self, KnowledgeError> {
        Ok(Self {
            imports: CompiledQuery::compile(language, QueryFamily::Import, sources.imports)?,
            classes: CompiledQuery::compile(language, QueryFamily::Class, sources.classes)?,
            functions: CompiledQuery::compile(language, QueryFamily::Function, sources.functions)?,
            calls: CompiledQuery::compile(language, QueryFamily::Call, sources.calls)?,
        })
    }

    fn compiled(&self, family: QueryFamily) -> &CompiledQuery {
        match family {
            QueryFamily::Import => &self.imports,
            QueryFamily::Class => &self.classes,
            QueryFamily::Function => &self.functions,
            QueryFamily::Call => &self.calls,
        }
    }

    /// Run one family's query under `root`, in match order.
    ///
    /// The tree is only read. A tree with no matches yields an empty vector.
    pub fn captures<'tree>(&self, family: QueryFamily, root: Node<'tree>, source: &[u8]) -> Vec<Capture<'tree>> {
        self.captures_until(family, root, source, None).unwrap_or_default()
    }

    /// Like [`captures`](Self::captures), but stops matching once `deadline`
    /// has passed and returns `None` instead of a partial result.
    pub fn captures_until<'tree>(
        &self,
        family: QueryFamily,
        root: Node<'tree>,
        source: &[u8],
        deadline: Option<Instant>,
    ) -> Option<Vec<Capture<'tree>>> {
        let compiled = self.compiled(family);
        let mut cursor = QueryCursor::new();
        let mut matches = cursor.matches(&compiled.query, root, source);

        let mut captures = Vec::new();
        while let Some(m) = matches.next() {
            if deadline.is_some_and(|d| Instant::now() >= d) {
                tracing::debug!(%family, "deadline passed while matching");
                return None;
            }
            match compiled.to_capture(m) {
                Some(capture) => captures.push(capture),
                None => tracing::trace!(%family, pattern = m.pattern_index, "incomplete match skipped"),
            }
        }
        Some(captures)
    }
}
