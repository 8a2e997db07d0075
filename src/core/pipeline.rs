//! Chunking pipeline orchestration.
//!
//! Coordinates the end-to-end workflow:
//! 1. Collect candidate paths from every root
//! 2. Load them concurrently and sort by `(-priority, path)`
//! 3. Assemble framed chunks in the active mode
//! 4. Optionally run the enhancement stage
//! 5. Write chunks to the output sink in index order

use std::path::PathBuf;
use std::time::Instant;

use serde::Serialize;

use crate::core::chunk::ChunkAssembler;
use crate::core::collect::loader::processing_order;
use crate::core::collect::{ConcurrentLoader, PathCollector, PriorityScorer};
use crate::core::config::Config;
use crate::core::enhance::ChunkEnhancer;
use crate::core::error::Result;
use crate::core::filter::{BinaryClassifier, RuleSet};
use crate::core::sink::{write_chunks, OutputSink, OutputTarget, WriteFailurePolicy};
use crate::core::types::{Chunk, RunStats};

/// A file a run would process, in processing order
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedFile {
    pub path: PathBuf,
    pub priority: i64,
}

/// Orchestrates one chunking run
#[derive(Debug)]
pub struct ChunkingPipeline {
    roots: Vec<PathBuf>,
    collector: PathCollector,
    scorer: PriorityScorer,
    loader: ConcurrentLoader,
    assembler: ChunkAssembler,
    enhancer: Option<ChunkEnhancer>,
    target: OutputTarget,
    policy: WriteFailurePolicy,
}

impl ChunkingPipeline {
    /// Build a pipeline from a validated configuration
    ///
    /// # Errors
    ///
    /// Configuration errors (no or several chunking modes, malformed
    /// priority rules) are returned before anything touches the disk.
    pub fn from_config(config: &Config, roots: Vec<PathBuf>) -> Result<Self> {
        config.validate()?;

        let mode = config.chunking_mode()?;
        let scorer = PriorityScorer::new(&config.priority_rules()?);
        let target = config.output_target();

        let rules = RuleSet::new(&config.filter.ignore, &config.filter.unignore);
        let classifier = BinaryClassifier::new(&config.filter.binary_extensions);
        let mut collector = PathCollector::new(rules, classifier)
            .with_file_type(config.filter.file_type.as_deref());
        if let Some(dir) = target.output_dir() {
            collector = collector.with_output_dir(dir);
        }

        Ok(Self {
            roots,
            collector,
            loader: ConcurrentLoader::new(scorer.clone(), config.loader.workers),
            scorer,
            assembler: ChunkAssembler::new(mode),
            enhancer: config.enhance_options().map(ChunkEnhancer::new),
            target,
            policy: config.output.on_write_error,
        })
    }

    /// Replace the assembler (e.g. to inject a paged document reader)
    pub fn with_assembler(mut self, assembler: ChunkAssembler) -> Self {
        self.assembler = assembler;
        self
    }

    pub fn target(&self) -> &OutputTarget {
        &self.target
    }

    /// Collect, load and assemble without writing anything
    pub async fn build_chunks(&self) -> Result<(Vec<Chunk>, RunStats)> {
        let start = Instant::now();

        tracing::info!("Starting file collection from {} roots", self.roots.len());
        let paths = self.collector.collect(&self.roots)?;
        let files_collected = paths.len();
        tracing::info!("Found {} files to chunk", files_collected);

        let outcome = self.loader.load(paths).await;
        let bytes_loaded = outcome
            .records
            .iter()
            .map(|r| r.content.len() as u64)
            .sum();

        let mut chunks = self.assembler.assemble(&outcome.records);
        if let Some(enhancer) = &self.enhancer {
            chunks = enhancer.enhance(chunks);
        }

        let stats = RunStats {
            files_collected,
            files_loaded: outcome.records.len(),
            files_failed: outcome.failed,
            chunks_emitted: chunks.len(),
            write_failures: 0,
            bytes_loaded,
            duration_ms: start.elapsed().as_millis() as u64,
        };

        Ok((chunks, stats))
    }

    /// Run against the configured output target
    pub async fn run(&self) -> Result<RunStats> {
        let mut sink = self.target.open();
        self.run_with_sink(sink.as_mut()).await
    }

    /// Run against an explicit sink
    pub async fn run_with_sink(&self, sink: &mut dyn OutputSink) -> Result<RunStats> {
        let start = Instant::now();
        let (chunks, mut stats) = self.build_chunks().await?;

        let report = write_chunks(sink, &chunks, self.policy)?;
        stats.write_failures = report.failed;
        stats.duration_ms = start.elapsed().as_millis() as u64;

        tracing::info!(
            "Chunking complete: {} files loaded, {} failed, \
             {} chunks written to {} in {}ms",
            stats.files_loaded,
            stats.files_failed,
            report.written,
            sink.describe(),
            stats.duration_ms
        );

        Ok(stats)
    }

    /// Files that would be processed, in final order, without reading them
    pub fn dry_run(&self) -> Result<Vec<PlannedFile>> {
        let mut planned: Vec<PlannedFile> = self
            .collector
            .collect(&self.roots)?
            .into_iter()
            .map(|path| PlannedFile {
                priority: self.scorer.score(&path),
                path,
            })
            .collect();

        planned.sort_by(|a, b| {
            processing_order((a.priority, a.path.as_path()), (b.priority, b.path.as_path()))
        });

        Ok(planned)
    }
}
