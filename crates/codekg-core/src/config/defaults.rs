//! Default values for codekg configuration.
//!
//! All hardcoded defaults are centralized here for easy maintenance.

// ============================================================================
// Extraction Defaults
// ============================================================================

/// Grammar selected when none is configured.
pub const DEFAULT_GRAMMAR: &str = "python";

// ============================================================================
// Indexer Defaults
// ============================================================================

/// Maximum size of a single file to parse (1 MB).
pub const DEFAULT_MAX_FILE_SIZE: u64 = 1024 * 1024;

/// Upper bound on parses running at once.
pub const DEFAULT_MAX_CONCURRENCY: usize = 8;

/// Deadline for one file's parse, in milliseconds.
pub const DEFAULT_PARSE_TIMEOUT_MS: u64 = 10_000;

/// Default file extensions to index.
pub const DEFAULT_EXTENSIONS: &[&str] = &["py", "pyi"];

/// Default directories to exclude from indexing.
pub const DEFAULT_EXCLUDE_DIRS: &[&str] = &[
    // Version control
    ".git",
    ".svn",
    ".hg",
    // Dependencies
    "node_modules",
    "venv",
    ".venv",
    "__pycache__",
    ".pytest_cache",
    ".mypy_cache",
    ".tox",
    // Build outputs
    "build",
    "dist",
    "target",
    // Local vector store data
    ".chroma",
];

/// Default file patterns to exclude (glob syntax).
pub const DEFAULT_EXCLUDE_PATTERNS: &[&str] = &["**/*.pyc", "**/*.pyo", "**/*_pb2.py"];

/// Project-local configuration file name.
pub const CONFIG_FILE_NAME: &str = "codekg.toml";

/// Directory under the user config dir holding `config.toml`.
pub const USER_CONFIG_DIR: &str = "codekg";
