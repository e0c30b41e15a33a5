use codekg_core::config::{
    ConfigError, DEFAULT_EXCLUDE_DIRS, DEFAULT_GRAMMAR, DEFAULT_MAX_CONCURRENCY, DEFAULT_MAX_FILE_SIZE,
    DEFAULT_PARSE_TIMEOUT_MS,
};
use codekg_core::knowledge::CodeGraphParser;
use codekg_core::Config;
use tempfile::TempDir;

#[test]
fn test_default_config() {
    let config = Config::default();
    assert_eq!(config.extraction.grammar, DEFAULT_GRAMMAR);
    assert_eq!(config.indexer.max_file_size, DEFAULT_MAX_FILE_SIZE);
    assert_eq!(config.indexer.max_concurrency, DEFAULT_MAX_CONCURRENCY);
    assert_eq!(config.indexer.parse_timeout_ms, DEFAULT_PARSE_TIMEOUT_MS);
    assert_eq!(config.indexer.exclude_dirs.len(), DEFAULT_EXCLUDE_DIRS.len());
}

#[test]
fn test_default_config_string_round_trips() {
    let toml_str = Config::default_config_string();
    let config: Config = toml::from_str(&toml_str).unwrap();
    assert_eq!(config.extraction.grammar, DEFAULT_GRAMMAR);
    assert_eq!(config.indexer.include_extensions, vec!["py", "pyi"]);
}

#[test]
fn test_from_file() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("codekg.toml");
    std::fs::write(
        &path,
        r#"
[extraction]
grammar = "pyi"

[indexer]
max_file_size = 4096
respect_gitignore = false
"#,
    )
    .unwrap();

    let config = Config::from_file(&path).unwrap();
    assert_eq!(config.indexer.max_file_size, 4096);
    assert!(!config.indexer.respect_gitignore);
    assert_eq!(config.indexer.max_concurrency, DEFAULT_MAX_CONCURRENCY);

    let parser = CodeGraphParser::from_config(&config.extraction).unwrap();
    assert_eq!(parser.grammar().language_name(), "Python");
}

#[test]
fn test_from_file_rejects_invalid_values() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("codekg.toml");
    std::fs::write(&path, "[indexer]\ninclude_extensions = []\n").unwrap();

    assert!(matches!(Config::from_file(&path), Err(ConfigError::Invalid(_))));
}

#[test]
fn test_from_file_reports_syntax_errors() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("codekg.toml");
    std::fs::write(&path, "[indexer\nmax_file_size = ").unwrap();

    assert!(matches!(Config::from_file(&path), Err(ConfigError::ParseError(_))));
}

#[test]
fn test_missing_file() {
    let temp = TempDir::new().unwrap();
    let result = Config::from_file(temp.path().join("absent.toml"));
    assert!(matches!(result, Err(ConfigError::ReadError(_))));
}
