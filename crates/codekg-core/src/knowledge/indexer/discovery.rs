//! Source file discovery.

use globset::{Glob, GlobSet, GlobSetBuilder};
use ignore::WalkBuilder;
use std::path::{Component, Path, PathBuf};

use crate::config::IndexerConfig;

/// Walk `root` and return the files the indexer should parse, sorted.
///
/// Hidden entries are skipped, `.gitignore` files are honoured when
/// `respect_gitignore` is set (inside a git checkout or not), and files are
/// filtered by extension, excluded directory name, exclude glob and size.
pub fn discover_files(root: &Path, config: &IndexerConfig) -> Vec<PathBuf> {
    let excludes = build_exclude_glob_set(&config.exclude_patterns);
    let exclude_dirs = config.exclude_dirs.clone();

    let walker = WalkBuilder::new(root)
        .follow_links(false)
        .hidden(true)
        .git_ignore(config.respect_gitignore)
        .git_global(config.respect_gitignore)
        .git_exclude(config.respect_gitignore)
        .require_git(false)
        .filter_entry(move |entry| {
            let is_dir = entry.file_type().is_some_and(|t| t.is_dir());
            let name = entry.file_name().to_string_lossy();
            !(is_dir && entry.depth() > 0 && exclude_dirs.iter().any(|d| d.as_str() == name.as_ref()))
        })
        .build();

    let mut files = Vec::new();
    for entry in walker {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                tracing::warn!(error = %e, "skipping unreadable entry");
                continue;
            }
        };

        if !entry.file_type().is_some_and(|t| t.is_file()) {
            continue;
        }

        let path = entry.path();
        if !has_extension(path, &config.include_extensions) {
            continue;
        }

        let relative = file_id(root, path);
        if excludes.is_match(&relative) {
            tracing::trace!(file = %relative, "excluded by pattern");
            continue;
        }

        match entry.metadata() {
            Ok(meta) if meta.len() > config.max_file_size => {
                tracing::debug!(file = %relative, size = meta.len(), "skipping large file");
                continue;
            }
            Ok(_) => {}
            Err(e) => {
                tracing::warn!(file = %relative, error = %e, "failed to stat file");
                continue;
            }
        }

        files.push(path.to_path_buf());
    }

    files.sort();
    files
}

/// Id of a discovered file: its path relative to `root`, `/`-separated.
pub fn file_id(root: &Path, path: &Path) -> String {
    let relative = path.strip_prefix(root).unwrap_or(path);
    relative
        .components()
        .filter_map(|c| match c {
            Component::Normal(part) => Some(part.to_string_lossy()),
            _ => None,
        })
        .collect::<Vec<_>>()
        .join("/")
}

fn has_extension(path: &Path, extensions: &[String]) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|ext| extensions.iter().any(|e| e.eq_ignore_ascii_case(ext)))
        .unwrap_or(false)
}

fn build_exclude_glob_set(patterns: &[String]) -> GlobSet {
    let mut builder = GlobSetBuilder::new();
    for pattern in patterns {
        match Glob::new(pattern) {
            Ok(glob) => {
                builder.add(glob);
            }
            Err(e) => tracing::warn!(pattern = %pattern, error = %e, "ignoring invalid exclude pattern"),
        }
    }
    builder.build().unwrap_or_else(|_| GlobSet::empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_file_id_is_relative_and_slash_separated() {
        let root = Path::new("/repo");
        assert_eq!(file_id(root, &root.join("pkg").join("mod.py")), "pkg/mod.py");
        assert_eq!(file_id(root, &root.join("main.py")), "main.py");
    }

    #[test]
    fn test_has_extension() {
        let exts = vec!["py".to_string(), "pyi".to_string()];
        assert!(has_extension(Path::new("a/b.py"), &exts));
        assert!(has_extension(Path::new("a/b.PYI"), &exts));
        assert!(!has_extension(Path::new("a/b.rs"), &exts));
        assert!(!has_extension(Path::new("Makefile"), &exts));
    }

    #[test]
    fn test_invalid_glob_is_ignored() {
        let set = build_exclude_glob_set(&["[".to_string(), "**/*_pb2.py".to_string()]);
        assert!(set.is_match("proto/msg_pb2.py"));
        assert!(!set.is_match("proto/msg.py"));
    }
}
