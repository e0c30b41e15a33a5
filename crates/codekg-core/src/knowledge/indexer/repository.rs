//! Concurrent repository indexer.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{OwnedSemaphorePermit, Semaphore};
use tokio::task::JoinSet;
use tracing::{debug, info, warn};

use super::discovery::{discover_files, file_id};
use super::{IndexStats, Indexer};
use crate::config::{Config, IndexerConfig};
use crate::knowledge::error::KnowledgeError;
use crate::knowledge::parser::{CodeGraphParser, ParseStats, ParsedData};
use crate::knowledge::store::GraphStore;

/// Indexes every matching file under a directory into a [`GraphStore`].
///
/// Files are read with tokio and parsed on the blocking pool with at most
/// `max_concurrency` parses in flight. Each parse carries its own deadline
/// and is abandoned when it passes, so a permit is only returned once the
/// blocking work has actually stopped. A file that misses its deadline is
/// counted as timed out and skipped.
pub struct RepositoryIndexer {
    parser: Arc<CodeGraphParser>,
    store: Arc<dyn GraphStore>,
    config: IndexerConfig,
    semaphore: Arc<Semaphore>,
}

/// What happened to one file.
enum FileOutcome {
    Indexed { stats: ParseStats, size: u64 },
    Skipped,
    TimedOut,
}

impl RepositoryIndexer {
    pub fn new(parser: CodeGraphParser, store: Arc<dyn GraphStore>, config: IndexerConfig) -> Self {
        let permits = config.max_concurrency.max(1);
        Self {
            parser: Arc::new(parser),
            store,
            config,
            semaphore: Arc::new(Semaphore::new(permits)),
        }
    }

    /// Build the parser and indexer from a validated [`Config`].
    pub fn from_config(config: &Config, store: Arc<dyn GraphStore>) -> Result<Self, KnowledgeError> {
        config.validate()?;
        let parser = CodeGraphParser::from_config(&config.extraction)?;
        Ok(Self::new(parser, store, config.indexer.clone()))
    }

    pub fn store(&self) -> &Arc<dyn GraphStore> {
        &self.store
    }

    /// Replace whatever the store holds for `data`'s file with `data`.
    async fn replace(store: &dyn GraphStore, data: &ParsedData) -> Result<(), KnowledgeError> {
        store.remove_file(data.file_path()).await?;
        store.merge(data).await?;
        Ok(())
    }

    /// Parse `content` on the blocking pool under `timeout`.
    ///
    /// `permit` moves into the blocking task and is released when the parse
    /// returns or gives up.
    async fn parse_blocking(
        parser: Arc<CodeGraphParser>,
        id: String,
        content: String,
        timeout: Duration,
        permit: OwnedSemaphorePermit,
    ) -> Result<ParsedData, KnowledgeError> {
        let job_id = id.clone();
        let job = tokio::task::spawn_blocking(move || {
            let _permit = permit;
            parser.parse_with_deadline(&job_id, &content, timeout)
        });

        match job.await {
            Ok(Some(data)) => Ok(data),
            Ok(None) => Err(KnowledgeError::ParseTimeout {
                path: id,
                timeout_ms: timeout.as_millis() as u64,
            }),
            Err(e) => Err(KnowledgeError::Task {
                path: id,
                message: e.to_string(),
            }),
        }
    }

    async fn index_one(
        parser: Arc<CodeGraphParser>,
        store: Arc<dyn GraphStore>,
        path: PathBuf,
        id: String,
        timeout: Duration,
        permit: OwnedSemaphorePermit,
    ) -> FileOutcome {
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) => {
                warn!(file = %id, error = %e, "failed to read file");
                return FileOutcome::Skipped;
            }
        };
        let size = bytes.len() as u64;
        let content = match String::from_utf8(bytes) {
            Ok(content) => content,
            Err(_) => {
                warn!(file = %id, "skipping non-UTF-8 file");
                return FileOutcome::Skipped;
            }
        };

        let data = match Self::parse_blocking(parser, id.clone(), content, timeout, permit).await {
            Ok(data) => data,
            Err(e @ KnowledgeError::ParseTimeout { .. }) => {
                warn!(file = %id, error = %e, "parse timed out, skipping file");
                return FileOutcome::TimedOut;
            }
            Err(e) => {
                warn!(file = %id, error = %e, "parse task failed");
                return FileOutcome::Skipped;
            }
        };

        if let Err(e) = Self::replace(store.as_ref(), &data).await {
            warn!(file = %id, error = %e, "failed to store file graph");
            return FileOutcome::Skipped;
        }

        FileOutcome::Indexed {
            stats: data.stats(),
            size,
        }
    }

    async fn acquire(&self, path: &str) -> Result<OwnedSemaphorePermit, KnowledgeError> {
        Arc::clone(&self.semaphore)
            .acquire_owned()
            .await
            .map_err(|e| KnowledgeError::Task {
                path: path.to_string(),
                message: e.to_string(),
            })
    }
}

#[async_trait]
impl Indexer for RepositoryIndexer {
    async fn index_directory(&self, path: &Path) -> Result<IndexStats, KnowledgeError> {
        if !path.is_dir() {
            return Err(KnowledgeError::io(
                path,
                std::io::Error::new(std::io::ErrorKind::NotFound, "not a directory"),
            ));
        }

        let files = discover_files(path, &self.config);
        debug!(root = %path.display(), files = files.len(), "discovered files");

        let timeout = self.config.parse_timeout();
        let mut tasks = JoinSet::new();
        for file in files {
            let id = file_id(path, &file);
            let parser = Arc::clone(&self.parser);
            let store = Arc::clone(&self.store);
            let semaphore = Arc::clone(&self.semaphore);

            tasks.spawn(async move {
                let Ok(permit) = semaphore.acquire_owned().await else {
                    return FileOutcome::Skipped;
                };
                Self::index_one(parser, store, file, id, timeout, permit).await
            });
        }

        let mut stats = IndexStats::default();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok(FileOutcome::Indexed { stats: parsed, size }) => {
                    stats.files += 1;
                    stats.total_size += size;
                    stats.nodes += parsed.nodes();
                    stats.edges += parsed.edges();
                    stats.classes += parsed.classes;
                    stats.functions += parsed.functions;
                }
                Ok(FileOutcome::Skipped) => stats.skipped += 1,
                Ok(FileOutcome::TimedOut) => stats.timed_out += 1,
                Err(e) => {
                    warn!(error = %e, "indexing task failed");
                    stats.skipped += 1;
                }
            }
        }

        stats.last_updated = Some(chrono::Utc::now());
        info!(
            root = %path.display(),
            files = stats.files,
            skipped = stats.skipped,
            timed_out = stats.timed_out,
            nodes = stats.nodes,
            edges = stats.edges,
            "indexed directory"
        );

        Ok(stats)
    }

    async fn index_file(&self, path: &str, content: &str) -> Result<ParsedData, KnowledgeError> {
        let permit = self.acquire(path).await?;
        let data = Self::parse_blocking(
            Arc::clone(&self.parser),
            path.to_string(),
            content.to_string(),
            self.config.parse_timeout(),
            permit,
        )
        .await?;
        Self::replace(self.store.as_ref(), &data).await?;
        Ok(data)
    }
}
