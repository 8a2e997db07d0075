//! Configuration management for the Komodo chunking engine.
//!
//! This module handles loading configuration from TOML files and
//! environment variables, with sensible defaults for all settings.
//! The command line applies its own overrides on top before
//! [`Config::validate`] runs.

use crate::core::enhance::EnhanceOptions;
use crate::core::error::{KomodoError, Result};
use crate::core::sink::{OutputTarget, WriteFailurePolicy};
use crate::core::types::{ChunkingMode, PriorityRule};
use crate::core::xdg::XdgDirs;
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

/// Legacy config file looked up in the working directory
const LOCAL_CONFIG_FILE: &str = "komodo.toml";

/// Main configuration structure
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub filter: FilterConfig,
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub loader: LoaderConfig,
    #[serde(default)]
    pub output: OutputConfig,
    #[serde(default)]
    pub enhance: EnhanceConfig,
}

/// File selection and ordering
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct FilterConfig {
    /// Extra ignore patterns (glob syntax), added to the built-ins
    #[serde(default)]
    pub ignore: Vec<String>,

    /// Patterns that override every ignore rule
    #[serde(default)]
    pub unignore: Vec<String>,

    /// Extensions always treated as binary (no leading dot)
    #[serde(default = "default_binary_extensions")]
    pub binary_extensions: Vec<String>,

    /// Priority rules written as `pattern,score`
    #[serde(default)]
    pub priority_rules: Vec<String>,

    /// Restrict the walk to one extension
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_type: Option<String>,
}

/// Chunking mode selection. At most one may be set.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct ChunkingConfig {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_bytes: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub equal_chunks: Option<usize>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub semantic_lines: Option<usize>,
}

/// Concurrent file loading
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct LoaderConfig {
    /// Maximum in-flight file reads
    #[serde(default = "default_workers")]
    pub workers: usize,
}

/// Where chunks go
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct OutputConfig {
    /// Output directory for chunk files
    #[serde(default = "default_output_dir")]
    pub dir: PathBuf,

    /// Write raw chunk bytes to stdout instead of files
    #[serde(default)]
    pub stream: bool,

    /// Concatenate all chunks into a single file
    #[serde(default)]
    pub aggregate: bool,

    /// Behaviour after a chunk write fails
    #[serde(default)]
    pub on_write_error: WriteFailurePolicy,
}

/// Optional post-processing of the chunk stream
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct EnhanceConfig {
    #[serde(default)]
    pub enabled: bool,

    #[serde(default = "default_true")]
    pub extract_metadata: bool,

    /// Chunks scoring below this are dropped
    #[serde(default = "default_min_relevance")]
    pub min_relevance: f64,

    #[serde(default = "default_true")]
    pub remove_redundancy: bool,

    #[serde(default)]
    pub redact_secrets: bool,
}

// Default value functions
fn default_binary_extensions() -> Vec<String> {
    crate::core::filter::binary::default_binary_extensions()
}

fn default_workers() -> usize {
    crate::core::collect::loader::DEFAULT_WORKERS
}

fn default_output_dir() -> PathBuf {
    PathBuf::from("chunks")
}

fn default_true() -> bool {
    true
}

fn default_min_relevance() -> f64 {
    EnhanceOptions::default().min_relevance
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            ignore: Vec::new(),
            unignore: Vec::new(),
            binary_extensions: default_binary_extensions(),
            priority_rules: Vec::new(),
            file_type: None,
        }
    }
}

impl Default for LoaderConfig {
    fn default() -> Self {
        Self {
            workers: default_workers(),
        }
    }
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            dir: default_output_dir(),
            stream: false,
            aggregate: false,
            on_write_error: WriteFailurePolicy::default(),
        }
    }
}

impl Default for EnhanceConfig {
    fn default() -> Self {
        Self {
            enabled: false,
            extract_metadata: default_true(),
            min_relevance: default_min_relevance(),
            remove_redundancy: default_true(),
            redact_secrets: false,
        }
    }
}

impl ChunkingConfig {
    /// Number of modes set
    pub fn selected(&self) -> usize {
        [
            self.max_bytes,
            self.max_tokens,
            self.equal_chunks,
            self.semantic_lines,
        ]
        .iter()
        .filter(|v| v.is_some())
        .count()
    }

    /// Replace whatever was selected with a single mode
    pub fn select(&mut self, mode: ChunkingMode) {
        *self = Self::default();
        match mode {
            ChunkingMode::ByteBound { max_bytes } => self.max_bytes = Some(max_bytes),
            ChunkingMode::TokenBound { max_tokens } => self.max_tokens = Some(max_tokens),
            ChunkingMode::EqualWeight { n_chunks } => self.equal_chunks = Some(n_chunks),
            ChunkingMode::Semantic { max_units } => self.semantic_lines = Some(max_units),
        }
    }
}

impl Config {
    /// Load configuration from TOML file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read_to_string(path).map_err(|e| {
            KomodoError::ConfigError(format!("Failed to read config file {path:?}: {e}"))
        })?;

        let config: Config = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Load config with priority: env vars > TOML > defaults
    pub fn load() -> Result<Self> {
        let xdg = XdgDirs::new();
        Self::load_with_xdg(&xdg)
    }

    /// Load config with explicit XDG directories
    ///
    /// Priority order:
    /// 1. KOMODO_CONFIG env var
    /// 2. XDG config file (~/.config/komodo/config.toml)
    /// 3. ./komodo.toml
    /// 4. Defaults
    ///
    /// Only the file itself is checked here. A chunking mode is not
    /// required yet because the command line may still supply it.
    pub fn load_with_xdg(xdg: &XdgDirs) -> Result<Self> {
        let mut config = if let Ok(config_path) = env::var("KOMODO_CONFIG") {
            Self::from_file(config_path)?
        } else {
            let xdg_config = xdg.config_file();
            if xdg_config.exists() {
                Self::from_file(xdg_config)?
            } else if Path::new(LOCAL_CONFIG_FILE).exists() {
                Self::from_file(LOCAL_CONFIG_FILE)?
            } else {
                Self::default()
            }
        };

        if config.chunking.selected() > 1 {
            return Err(KomodoError::ConfigError(
                "Config file sets more than one chunking mode".to_string(),
            ));
        }

        config.merge_env();

        Ok(config)
    }

    /// Merge configuration with environment variables
    pub fn merge_env(&mut self) {
        if let Ok(workers) = env::var("KOMODO_WORKERS") {
            if let Ok(w) = workers.parse() {
                self.loader.workers = w;
            }
        }

        if let Ok(dir) = env::var("KOMODO_OUTPUT_DIR") {
            self.output.dir = PathBuf::from(dir);
        }

        // A mode from the environment replaces the one from the file
        if let Ok(max_bytes) = env::var("KOMODO_MAX_BYTES") {
            if let Ok(max_bytes) = max_bytes.parse() {
                self.chunking.select(ChunkingMode::ByteBound { max_bytes });
            }
        }
        if let Ok(max_tokens) = env::var("KOMODO_MAX_TOKENS") {
            if let Ok(max_tokens) = max_tokens.parse() {
                self.chunking.select(ChunkingMode::TokenBound { max_tokens });
            }
        }
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<()> {
        self.chunking_mode()?;
        self.priority_rules()?;

        if self.loader.workers == 0 {
            return Err(KomodoError::ConfigError(
                "Worker count must be non-zero".to_string(),
            ));
        }

        if self.output.stream && self.output.aggregate {
            return Err(KomodoError::ConfigError(
                "Stream and aggregate output cannot be combined".to_string(),
            ));
        }

        if !(0.0..=1.0).contains(&self.enhance.min_relevance) {
            return Err(KomodoError::ConfigError(format!(
                "min_relevance must be between 0 and 1, got {}",
                self.enhance.min_relevance
            )));
        }

        if let Some(ext) = &self.filter.file_type {
            if ext.trim_start_matches('.').is_empty() {
                return Err(KomodoError::ConfigError(
                    "file_type must name an extension".to_string(),
                ));
            }
        }

        Ok(())
    }

    /// The single active chunking mode
    pub fn chunking_mode(&self) -> Result<ChunkingMode> {
        ChunkingMode::from_options(
            self.chunking.max_bytes,
            self.chunking.max_tokens,
            self.chunking.equal_chunks,
            self.chunking.semantic_lines,
        )
    }

    /// Parsed priority rules
    pub fn priority_rules(&self) -> Result<Vec<PriorityRule>> {
        self.filter
            .priority_rules
            .iter()
            .map(|rule| PriorityRule::parse(rule))
            .collect()
    }

    pub fn output_target(&self) -> OutputTarget {
        if self.output.stream {
            OutputTarget::Stream
        } else if self.output.aggregate {
            OutputTarget::Aggregate(self.output.dir.clone())
        } else {
            OutputTarget::Directory(self.output.dir.clone())
        }
    }

    /// Enhancement options, or `None` when the stage is disabled
    pub fn enhance_options(&self) -> Option<EnhanceOptions> {
        self.enhance.enabled.then(|| EnhanceOptions {
            extract_metadata: self.enhance.extract_metadata,
            min_relevance: self.enhance.min_relevance,
            remove_redundancy: self.enhance.remove_redundancy,
            redact_secrets: self.enhance.redact_secrets,
        })
    }

    /// Log configuration
    pub fn log_config(&self) {
        tracing::info!("Configuration loaded:");
        match self.chunking_mode() {
            Ok(mode) => tracing::info!("  Chunking mode: {}", mode),
            Err(_) => tracing::info!("  Chunking mode: <unset>"),
        }
        tracing::info!("  Ignore patterns: {} patterns", self.filter.ignore.len());
        tracing::info!(
            "  Unignore patterns: {} patterns",
            self.filter.unignore.len()
        );
        tracing::info!(
            "  Binary extensions: {}",
            self.filter.binary_extensions.join(", ")
        );
        tracing::info!(
            "  Priority rules: {} rules",
            self.filter.priority_rules.len()
        );
        if let Some(ext) = &self.filter.file_type {
            tracing::info!("  File type: {}", ext);
        }
        tracing::info!("  Workers: {}", self.loader.workers);
        tracing::info!("  Output: {}", self.output_target());
        tracing::info!("  On write error: {:?}", self.output.on_write_error);
        tracing::info!("  Enhance: {}", self.enhance.enabled);
    }
}
