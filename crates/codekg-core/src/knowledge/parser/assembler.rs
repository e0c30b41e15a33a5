//! Per-file graph assembly.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::{Duration, Instant};

use tracing::{debug, warn};

use super::entities::EntityExtractor;
use super::query::PatternSet;
use super::registry::GrammarRegistry;
use super::relations::RelationExtractor;
use super::result::ParsedData;
use super::scope::ScopeResolver;
use super::traits::Grammar;
use super::treesitter::TreeSitterParser;
use crate::config::ExtractionConfig;
use crate::knowledge::error::KnowledgeError;
use crate::knowledge::ontology::{GraphEdge, GraphNode, NodeType};

/// Extracts a code graph from one source file at a time.
///
/// Holds the grammar and its compiled queries and nothing else, so a single
/// instance can be shared across threads and reused for any number of files.
pub struct CodeGraphParser {
    grammar: Arc<dyn Grammar>,
    base: TreeSitterParser,
    patterns: PatternSet,
}

impl CodeGraphParser {
    /// Build a parser for a grammar selected by name or extension.
    pub fn new(selector: &str) -> Result<Self, KnowledgeError> {
        let grammar = GrammarRegistry::new().grammar(selector)?;
        Self::with_grammar(grammar)
    }

    /// Build a parser around an explicit grammar.
    pub fn with_grammar(grammar: Arc<dyn Grammar>) -> Result<Self, KnowledgeError> {
        let language = grammar.language();
        let base = TreeSitterParser::new(language.clone(), grammar.language_name());
        base.check_language()?;
        let patterns = PatternSet::compile(&language, &grammar.query_sources())?;

        Ok(Self {
            grammar,
            base,
            patterns,
        })
    }

    /// Build a parser from the `[extraction]` config section.
    pub fn from_config(config: &ExtractionConfig) -> Result<Self, KnowledgeError> {
        Self::new(&config.grammar)
    }

    pub fn grammar(&self) -> &dyn Grammar {
        self.grammar.as_ref()
    }

    /// Extract the graph of one file.
    ///
    /// Never fails: syntax errors only reduce what is found, and if the
    /// parser cannot run at all the result holds just the File node.
    pub fn parse(&self, file_path: &str, content: &str) -> ParsedData {
        let language_tag = self.grammar.language_name().to_lowercase();
        self.extract(file_path, content, None).unwrap_or_else(|| {
            warn!(file = file_path, "parser produced no tree, emitting file node only");
            let mut graph = GraphBuilder::new();
            graph.add_node(GraphNode::file(file_path, &language_tag));
            graph.finish(file_path)
        })
    }

    /// Like [`parse`](Self::parse), but gives up once `timeout` has elapsed.
    ///
    /// The budget covers tree construction and every query pass. `None`
    /// means the work was abandoned; no partial graph is returned.
    pub fn parse_with_deadline(&self, file_path: &str, content: &str, timeout: Duration) -> Option<ParsedData> {
        let deadline = Instant::now() + timeout;
        let data = self.extract(file_path, content, Some(deadline));
        if data.is_none() {
            debug!(file = file_path, timeout_ms = timeout.as_millis() as u64, "parse abandoned");
        }
        data
    }

    /// `None` when no tree could be built or `deadline` passed mid-way.
    fn extract(&self, file_path: &str, content: &str, deadline: Option<Instant>) -> Option<ParsedData> {
        let expired = || deadline.is_some_and(|d| Instant::now() >= d);
        let language_tag = self.grammar.language_name().to_lowercase();
        let mut graph = GraphBuilder::new();
        graph.add_node(GraphNode::file(file_path, &language_tag));

        let budget = deadline.map(|d| d.saturating_duration_since(Instant::now()));
        let tree = self.base.parse_tree_within(content, budget)?;
        let root = tree.root_node();
        let source = content.as_bytes();
        let grammar = self.grammar.as_ref();

        let mut entities = EntityExtractor::new(grammar, &self.patterns, file_path, source);
        let mut relations = RelationExtractor::new(grammar, &self.patterns, file_path, source);
        if let Some(deadline) = deadline {
            entities = entities.with_deadline(deadline);
            relations = relations.with_deadline(deadline);
        }
        let scopes = ScopeResolver::new(grammar, file_path, source);

        let mut class_names = HashSet::new();
        for class in entities.extract_classes(root) {
            if let Some(name) = class.name() {
                class_names.insert(name.to_string());
            }
            let class_id = class.id().to_string();
            if graph.add_node(class) {
                graph.add_edge(GraphEdge::contains(file_path, class_id));
            }
        }
        if expired() {
            return None;
        }

        let functions = entities.extract_functions(root);
        for function in functions.nodes {
            let function_id = function.id().to_string();
            let parent = functions
                .scope_index
                .get(&function_id)
                .map(|definition| scopes.enclosing_scope(definition))
                .filter(|scope| graph.is_class(scope))
                .unwrap_or_else(|| file_path.to_string());

            if graph.add_node(function) {
                graph.add_edge(GraphEdge::contains(parent, function_id));
            } else {
                tracing::trace!(id = %function_id, "function shadowed by an earlier node");
            }
        }
        if expired() {
            return None;
        }

        for edge in relations.extract_imports(root) {
            graph.add_edge(edge);
        }
        if expired() {
            return None;
        }

        let known_ids = graph.ids();
        for edge in relations.extract_calls(root, &known_ids, &class_names) {
            graph.add_edge(edge);
        }
        if expired() {
            return None;
        }

        let data = graph.finish(file_path);
        let stats = data.stats();
        debug!(
            file = file_path,
            nodes = stats.nodes(),
            edges = stats.edges(),
            syntax_errors = root.has_error(),
            "parsed file"
        );
        Some(data)
    }
}

/// Accumulates nodes and edges for one file, keeping the first node per id.
struct GraphBuilder {
    nodes: Vec<GraphNode>,
    types: HashMap<String, NodeType>,
    edges: Vec<GraphEdge>,
}

impl GraphBuilder {
    fn new() -> Self {
        Self {
            nodes: Vec::new(),
            types: HashMap::new(),
            edges: Vec::new(),
        }
    }

    /// Returns `false` if a node with this id already exists.
    fn add_node(&mut self, node: GraphNode) -> bool {
        if self.types.contains_key(node.id()) {
            return false;
        }
        self.types.insert(node.id().to_string(), node.node_type());
        self.nodes.push(node);
        true
    }

    fn add_edge(&mut self, edge: GraphEdge) {
        self.edges.push(edge);
    }

    fn is_class(&self, id: &str) -> bool {
        self.types.get(id) == Some(&NodeType::Class)
    }

    fn ids(&self) -> HashSet<String> {
        self.types.keys().cloned().collect()
    }

    fn finish(self, file_path: &str) -> ParsedData {
        ParsedData::new(file_path, self.nodes, self.edges)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::knowledge::ontology::EdgeType;

    fn parser() -> CodeGraphParser {
        CodeGraphParser::new("python").unwrap()
    }

    fn contains_pairs(data: &ParsedData) -> Vec<(&str, &str)> {
        data.edges_of_type(EdgeType::Contains)
            .map(|e| (e.source_id(), e.target_id()))
            .collect()
    }

    #[test]
    fn test_empty_file_is_file_node_only() {
        let data = parser().parse("empty.py", "");
        assert_eq!(data.nodes().len(), 1);
        assert_eq!(data.nodes()[0].id(), "empty.py");
        assert_eq!(data.nodes()[0].properties()["language"], "python");
        assert!(data.edges().is_empty());
    }

    #[test]
    fn test_nested_function_belongs_to_file() {
        let source = "def outer():\n    def inner():\n        pass\n    return inner\n";
        let data = parser().parse("n.py", source);
        assert_eq!(
            contains_pairs(&data),
            vec![("n.py", "n.py::outer"), ("n.py", "n.py::inner")]
        );
    }

    #[test]
    fn test_function_inside_method_belongs_to_file() {
        let source = "class A:\n    def m(self):\n        def helper():\n            pass\n";
        let data = parser().parse("n.py", source);
        assert_eq!(
            contains_pairs(&data),
            vec![("n.py", "n.py::A"), ("n.py::A", "n.py::m"), ("n.py", "n.py::helper")]
        );
    }

    #[test]
    fn test_function_named_like_class_is_dropped() {
        let source = "class Thing:\n    pass\n\ndef Thing():\n    pass\n";
        let data = parser().parse("c.py", source);
        assert_eq!(data.nodes().len(), 2);
        assert_eq!(data.node("c.py::Thing").map(|n| n.node_type()), Some(NodeType::Class));
        assert_eq!(contains_pairs(&data), vec![("c.py", "c.py::Thing")]);
    }

    #[test]
    fn test_from_config() {
        let config = ExtractionConfig { grammar: "PY".into() };
        let parser = CodeGraphParser::from_config(&config).unwrap();
        assert_eq!(parser.grammar().language_name(), "Python");
    }

    #[test]
    fn test_unsupported_selector() {
        let err = CodeGraphParser::new("haskell").err().unwrap();
        assert!(matches!(err, KnowledgeError::UnsupportedGrammar(_)));
    }

    #[test]
    fn test_generous_deadline_matches_plain_parse() {
        let source = "import os\n\nclass A:\n    def m(self):\n        helper()\n\ndef helper():\n    pass\n";
        let parser = parser();
        let plain = parser.parse("g.py", source);
        let bounded = parser
            .parse_with_deadline("g.py", source, Duration::from_secs(30))
            .unwrap();
        assert_eq!(bounded, plain);
    }

    #[test]
    fn test_exhausted_deadline_abandons_parse() {
        let source: String = (0..200).map(|i| format!("def f{}():\n    f{}()\n", i, i + 1)).collect();
        let data = parser().parse_with_deadline("slow.py", &source, Duration::ZERO);
        assert!(data.is_none());
    }

    #[test]
    fn test_parser_is_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<CodeGraphParser>();
    }
}
