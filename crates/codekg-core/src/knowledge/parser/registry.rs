//! Grammar registry for selecting language-specific extraction rules.

use std::collections::HashMap;
use std::sync::Arc;

use super::python::PythonGrammar;
use super::traits::Grammar;
use crate::knowledge::error::KnowledgeError;

/// Registry of grammars.
///
/// Maps both language names and file extensions to their grammar.
/// Automatically registers all built-in grammars on creation.
pub struct GrammarRegistry {
    /// Lowercased language name to grammar.
    by_name: HashMap<String, Arc<dyn Grammar>>,
    /// Lowercased extension to grammar.
    by_extension: HashMap<String, Arc<dyn Grammar>>,
}

impl GrammarRegistry {
    /// Create a new registry with all built-in grammars.
    pub fn new() -> Self {
        let mut registry = Self {
            by_name: HashMap::new(),
            by_extension: HashMap::new(),
        };

        registry.register(Arc::new(PythonGrammar::new()));

        registry
    }

    /// Register a grammar under its name and supported extensions.
    pub fn register(&mut self, grammar: Arc<dyn Grammar>) {
        for ext in grammar.supported_extensions() {
            self.by_extension.insert(ext.to_lowercase(), Arc::clone(&grammar));
        }
        self.by_name
            .insert(grammar.language_name().to_lowercase(), grammar);
    }

    /// Look up a grammar by language name or file extension.
    pub fn grammar(&self, selector: &str) -> Result<Arc<dyn Grammar>, KnowledgeError> {
        let key = selector.trim().trim_start_matches('.').to_lowercase();
        self.by_name
            .get(&key)
            .or_else(|| self.by_extension.get(&key))
            .cloned()
            .ok_or_else(|| KnowledgeError::UnsupportedGrammar(selector.to_string()))
    }

    /// Get a grammar for the given file extension.
    pub fn grammar_for_extension(&self, extension: &str) -> Option<Arc<dyn Grammar>> {
        self.by_extension.get(&extension.to_lowercase()).cloned()
    }

    /// Get a grammar for the given file path.
    pub fn grammar_for_path(&self, path: &str) -> Option<Arc<dyn Grammar>> {
        std::path::Path::new(path)
            .extension()
            .and_then(|e| e.to_str())
            .and_then(|ext| self.grammar_for_extension(ext))
    }

    /// Check if any grammar can handle the given extension.
    pub fn can_parse(&self, extension: &str) -> bool {
        self.by_extension.contains_key(&extension.to_lowercase())
    }

    /// List all supported extensions, sorted.
    pub fn supported_extensions(&self) -> Vec<&str> {
        let mut extensions: Vec<&str> = self.by_extension.keys().map(|s| s.as_str()).collect();
        extensions.sort_unstable();
        extensions
    }

    /// List all registered grammars with their extensions.
    pub fn list_grammars(&self) -> Vec<(&str, &[&'static str])> {
        let mut grammars: Vec<_> = self
            .by_name
            .values()
            .map(|g| (g.language_name(), g.supported_extensions()))
            .collect();
        grammars.sort_by_key(|(name, _)| *name);
        grammars
    }
}

impl Default for GrammarRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_registry_has_python_grammar() {
        let registry = GrammarRegistry::new();
        assert!(registry.can_parse("py"));
        assert!(registry.can_parse("pyi"));
        assert!(registry.grammar_for_extension("py").is_some());
    }

    #[test]
    fn test_lookup_by_name_or_extension() {
        let registry = GrammarRegistry::new();
        assert_eq!(registry.grammar("python").unwrap().language_name(), "Python");
        assert_eq!(registry.grammar("Python").unwrap().language_name(), "Python");
        assert_eq!(registry.grammar("py").unwrap().language_name(), "Python");
        assert_eq!(registry.grammar(".py").unwrap().language_name(), "Python");
    }

    #[test]
    fn test_unknown_grammar_is_error() {
        let registry = GrammarRegistry::new();
        let err = registry.grammar("cobol").err().unwrap();
        assert!(matches!(err, KnowledgeError::UnsupportedGrammar(ref s) if s == "cobol"));
    }

    #[test]
    fn test_grammar_for_path() {
        let registry = GrammarRegistry::new();
        assert!(registry.grammar_for_path("src/main.py").is_some());
        assert!(registry.grammar_for_path("stubs/os.pyi").is_some());
        assert!(registry.grammar_for_path("src/lib.rs").is_none());
        assert!(registry.grammar_for_path("Makefile").is_none());
    }

    #[test]
    fn test_case_insensitive() {
        let registry = GrammarRegistry::new();
        assert!(registry.can_parse("PY"));
        assert!(registry.can_parse("Py"));
    }

    #[test]
    fn test_list_grammars() {
        let registry = GrammarRegistry::new();
        let grammars = registry.list_grammars();
        assert_eq!(grammars.len(), 1);
        assert_eq!(grammars[0].0, "Python");
        assert_eq!(registry.supported_extensions(), vec!["py", "pyi"]);
    }
}
