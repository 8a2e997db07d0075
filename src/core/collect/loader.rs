//! Concurrent file loading with a deterministic sort barrier.
//!
//! Reads run on the tokio runtime, bounded by a semaphore with one permit
//! per worker. Results are gathered in full and then sorted by
//! `(-priority, path)` so downstream output never depends on completion
//! order.

use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task;

use crate::core::collect::priority::PriorityScorer;
use crate::core::error::{KomodoError, Result};
use crate::core::types::FileRecord;

/// Default number of concurrent reads
pub const DEFAULT_WORKERS: usize = 4;

/// Records that loaded plus the number of paths dropped
#[derive(Debug, Default)]
pub struct LoadOutcome {
    /// Sorted by `(-priority, path)`
    pub records: Vec<FileRecord>,

    /// Paths dropped because they could not be read
    pub failed: usize,
}

/// Reads candidate files with a bounded worker pool
#[derive(Debug, Clone)]
pub struct ConcurrentLoader {
    scorer: Arc<PriorityScorer>,
    workers: usize,
}

impl ConcurrentLoader {
    /// Create a loader. A worker count of 0 is treated as 1.
    pub fn new(scorer: PriorityScorer, workers: usize) -> Self {
        Self {
            scorer: Arc::new(scorer),
            workers: workers.max(1),
        }
    }

    pub fn workers(&self) -> usize {
        self.workers
    }

    /// Read every path, score it and return the sorted records.
    ///
    /// A path that cannot be read is logged and dropped; it never fails
    /// the whole load.
    pub async fn load(&self, paths: Vec<PathBuf>) -> LoadOutcome {
        let semaphore = Arc::new(Semaphore::new(self.workers));
        let mut tasks = Vec::with_capacity(paths.len());

        for path in paths {
            let semaphore = semaphore.clone();
            let scorer = self.scorer.clone();

            tasks.push(task::spawn(async move {
                let _permit = semaphore.acquire_owned().await.map_err(|e| {
                    KomodoError::ReadFailed {
                        path: path.clone(),
                        source: std::io::Error::other(e),
                    }
                })?;
                read_record(path, &scorer).await
            }));
        }

        let mut outcome = LoadOutcome::default();
        for task in tasks {
            match task.await {
                Ok(Ok(record)) => outcome.records.push(record),
                Ok(Err(e)) => {
                    tracing::warn!("{}", e);
                    outcome.failed += 1;
                }
                Err(e) => {
                    tracing::warn!("Read task failed: {}", e);
                    outcome.failed += 1;
                }
            }
        }

        sort_records(&mut outcome.records);
        tracing::debug!(
            "Loaded {} files ({} failed) with {} workers",
            outcome.records.len(),
            outcome.failed,
            self.workers
        );
        outcome
    }
}

async fn read_record(path: PathBuf, scorer: &PriorityScorer) -> Result<FileRecord> {
    let content = tokio::fs::read(&path)
        .await
        .map_err(|source| KomodoError::ReadFailed {
            path: path.clone(),
            source,
        })?;
    let priority = scorer.score(&path);
    Ok(FileRecord::new(path, content, priority))
}

/// Processing order: descending priority, then ascending path bytes
pub fn processing_order(a: (i64, &Path), b: (i64, &Path)) -> Ordering {
    b.0.cmp(&a.0).then_with(|| a.1.as_os_str().cmp(b.1.as_os_str()))
}

pub fn sort_records(records: &mut [FileRecord]) {
    records.sort_by(|a, b| {
        processing_order((a.priority, a.path.as_path()), (b.priority, b.path.as_path()))
    });
}
