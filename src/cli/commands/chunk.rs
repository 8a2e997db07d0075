//! Chunk command - chunk one or more directories

use crate::cli::output::{colors, format_bytes, format_duration, print_warning, write_json};
use crate::cli::OutputFormat;
use crate::core::config::{ChunkingConfig, Config};
use crate::core::error::Result as CoreResult;
use crate::core::pipeline::{ChunkingPipeline, PlannedFile};
use crate::core::sink::WriteFailurePolicy;
use crate::core::types::RunStats;
use clap::Args;
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;

/// Arguments for the chunk command
#[derive(Args, Debug, Default)]
pub struct ChunkArgs {
    /// Directories to chunk
    #[arg(required = true, num_args = 1..)]
    pub dirs: Vec<PathBuf>,

    /// Bound each chunk to this many bytes
    #[arg(long, help_heading = "Chunking mode")]
    pub max_bytes: Option<usize>,

    /// Bound each chunk to this many whitespace-delimited tokens
    #[arg(long, help_heading = "Chunking mode")]
    pub max_tokens: Option<usize>,

    /// Produce exactly this many chunks of near-equal size
    #[arg(long, help_heading = "Chunking mode")]
    pub equal_chunks: Option<usize>,

    /// Cut source at declaration boundaries, packing up to this many lines
    #[arg(long, help_heading = "Chunking mode")]
    pub semantic_lines: Option<usize>,

    /// Glob patterns to ignore (can be specified multiple times)
    #[arg(long, short = 'i')]
    pub ignore: Vec<String>,

    /// Glob patterns that override every ignore rule
    #[arg(long, short = 'u')]
    pub unignore: Vec<String>,

    /// Priority rule as 'pattern,score' (can be specified multiple times)
    #[arg(long, short = 'p')]
    pub priority: Vec<String>,

    /// Extra extensions to treat as binary
    #[arg(long)]
    pub binary_ext: Vec<String>,

    /// Only chunk files with this extension
    #[arg(long, short = 't')]
    pub file_type: Option<String>,

    /// Concurrent file reads
    #[arg(long, short = 'w')]
    pub workers: Option<usize>,

    /// Directory for chunk files
    #[arg(long, short = 'o', help_heading = "Output")]
    pub output_dir: Option<PathBuf>,

    /// Write raw chunks to stdout instead of files
    #[arg(long, help_heading = "Output")]
    pub stream: bool,

    /// Concatenate all chunks into a single file
    #[arg(long, help_heading = "Output")]
    pub aggregate: bool,

    /// What to do when a chunk write fails: continue or fail
    #[arg(long, help_heading = "Output")]
    pub on_write_error: Option<String>,

    /// List the files that would be chunked, in order, and exit
    #[arg(long)]
    pub dry_run: bool,

    /// Score, deduplicate and annotate chunks
    #[arg(long, help_heading = "Enhancement")]
    pub enhance: bool,

    /// Drop enhanced chunks scoring below this (0-1)
    #[arg(long, help_heading = "Enhancement")]
    pub min_relevance: Option<f64>,

    /// Replace lines that look like they carry API keys
    #[arg(long, help_heading = "Enhancement")]
    pub redact_secrets: bool,

    /// Keep chunks that duplicate earlier ones
    #[arg(long, help_heading = "Enhancement")]
    pub keep_redundant: bool,
}

impl ChunkArgs {
    /// Layer command-line values over a loaded configuration.
    ///
    /// A chunking mode given here replaces the one from the config file;
    /// list options extend the configured lists.
    pub fn apply(&self, config: &mut Config) -> CoreResult<()> {
        let chunking = ChunkingConfig {
            max_bytes: self.max_bytes,
            max_tokens: self.max_tokens,
            equal_chunks: self.equal_chunks,
            semantic_lines: self.semantic_lines,
        };
        if chunking.selected() > 0 {
            config.chunking = chunking;
        }

        config.filter.ignore.extend(self.ignore.iter().cloned());
        config.filter.unignore.extend(self.unignore.iter().cloned());
        config.filter.priority_rules.extend(self.priority.iter().cloned());
        for ext in &self.binary_ext {
            let ext = ext.trim_start_matches('.').to_lowercase();
            if !config.filter.binary_extensions.contains(&ext) {
                config.filter.binary_extensions.push(ext);
            }
        }
        if self.file_type.is_some() {
            config.filter.file_type = self.file_type.clone();
        }

        if let Some(workers) = self.workers {
            config.loader.workers = workers;
        }

        if let Some(dir) = &self.output_dir {
            config.output.dir = dir.clone();
        }
        config.output.stream |= self.stream;
        config.output.aggregate |= self.aggregate;
        if let Some(policy) = &self.on_write_error {
            config.output.on_write_error = policy.parse::<WriteFailurePolicy>()?;
        }

        config.enhance.enabled |= self.enhance;
        if let Some(min) = self.min_relevance {
            config.enhance.min_relevance = min;
        }
        config.enhance.redact_secrets |= self.redact_secrets;
        if self.keep_redundant {
            config.enhance.remove_redundancy = false;
        }

        config.validate()
    }
}

/// Chunking result response
#[derive(Debug, Serialize)]
pub struct ChunkResponse {
    pub mode: String,
    pub output: String,
    #[serde(flatten)]
    pub stats: RunStats,
}

/// Dry-run response
#[derive(Debug, Serialize)]
pub struct DryRunResponse {
    pub mode: String,
    pub files: Vec<PlannedFile>,
}

/// Execute the chunk command
pub async fn execute(
    args: ChunkArgs,
    mut config: Config,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    args.apply(&mut config)?;
    config.log_config();

    let mode = config.chunking_mode()?.to_string();
    let pipeline = ChunkingPipeline::from_config(&config, args.dirs.clone())?;

    if args.dry_run {
        let response = DryRunResponse {
            mode,
            files: pipeline.dry_run()?,
        };
        return print_dry_run(&response, format);
    }

    let stats = pipeline.run().await?;
    if stats.write_failures > 0 {
        print_warning(&format!(
            "{} of {} chunk writes failed",
            stats.write_failures, stats.chunks_emitted
        ));
    }

    let response = ChunkResponse {
        mode,
        output: pipeline.target().to_string(),
        stats,
    };

    // Streamed chunks own stdout, so the summary goes to stderr
    if config.output.stream {
        print_summary(&mut io::stderr(), &response, format)
    } else {
        print_summary(&mut io::stdout(), &response, format)
    }
}

fn print_summary(
    out: &mut dyn Write,
    response: &ChunkResponse,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Human => {
            let stats = &response.stats;
            writeln!(
                out,
                "{} {} files ({}) into {} chunks in {}",
                colors::success("Chunked"),
                colors::number(&stats.files_loaded.to_string()),
                colors::number(&format_bytes(stats.bytes_loaded)),
                colors::number(&stats.chunks_emitted.to_string()),
                colors::number(&format_duration(stats.duration_ms as f64 / 1000.0))
            )?;
            writeln!(
                out,
                "Mode: {}  Output: {}",
                response.mode,
                colors::file_path(&response.output)
            )?;
            if stats.files_failed > 0 {
                writeln!(
                    out,
                    "{}",
                    colors::dim(&format!("{} files could not be read", stats.files_failed))
                )?;
            }
        }
        OutputFormat::Json => write_json(out, response)?,
    }
    Ok(())
}

fn print_dry_run(
    response: &DryRunResponse,
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut out = io::stdout();
    match format {
        OutputFormat::Human => {
            for file in &response.files {
                writeln!(
                    out,
                    "{:>6}  {}",
                    colors::priority(&file.priority.to_string()),
                    colors::file_path(&file.path.display().to_string())
                )?;
            }
            writeln!(
                out,
                "{} files would be chunked ({})",
                colors::number(&response.files.len().to_string()),
                response.mode
            )?;
        }
        OutputFormat::Json => write_json(&mut out, response)?,
    }
    Ok(())
}
