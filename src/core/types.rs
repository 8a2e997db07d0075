//! Core data types for the Komodo chunking engine.
//!
//! Rules that select and order files, the loaded file records, the
//! chunking mode and the chunks the assembler emits.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

use crate::core::error::{KomodoError, Result};

/// Where an ignore or unignore rule came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RuleOrigin {
    /// Compiled into the engine
    Builtin,
    /// Supplied on the command line or in the config file
    User,
    /// Read from a root-local exclusion file
    File,
}

/// A glob pattern that excludes (or re-includes) matching paths
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct IgnoreRule {
    pub pattern: String,
    pub origin: RuleOrigin,
}

impl IgnoreRule {
    pub fn new(pattern: impl Into<String>, origin: RuleOrigin) -> Self {
        Self {
            pattern: pattern.into(),
            origin,
        }
    }

    pub fn builtin(pattern: impl Into<String>) -> Self {
        Self::new(pattern, RuleOrigin::Builtin)
    }

    pub fn user(pattern: impl Into<String>) -> Self {
        Self::new(pattern, RuleOrigin::User)
    }
}

/// Unignore rules share the shape of ignore rules
pub type UnignoreRule = IgnoreRule;

/// A basename glob with the score it assigns
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriorityRule {
    pub pattern: String,
    pub score: i64,
}

impl PriorityRule {
    pub fn new(pattern: impl Into<String>, score: i64) -> Self {
        Self {
            pattern: pattern.into(),
            score,
        }
    }

    /// Parse a rule written as `pattern,score`.
    ///
    /// The score is taken after the last comma so patterns may contain
    /// commas themselves.
    ///
    /// # Example
    ///
    /// ```
    /// use komodo::core::types::PriorityRule;
    ///
    /// let rule = PriorityRule::parse("*.py, 10").unwrap();
    /// assert_eq!(rule.pattern, "*.py");
    /// assert_eq!(rule.score, 10);
    /// ```
    pub fn parse(rule: &str) -> Result<Self> {
        let (pattern, score) = rule.rsplit_once(',').ok_or_else(|| {
            KomodoError::ConfigError(format!(
                "Priority rule must be in 'pattern,score' format: '{rule}'"
            ))
        })?;

        let pattern = pattern.trim();
        if pattern.is_empty() {
            return Err(KomodoError::ConfigError(format!(
                "Priority rule has an empty pattern: '{rule}'"
            )));
        }

        let score = score.trim().parse::<i64>().map_err(|_| {
            KomodoError::ConfigError(format!("Score must be an integer in rule: '{rule}'"))
        })?;

        Ok(Self::new(pattern, score))
    }
}

/// A file loaded from disk, immutable once created
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Path as produced by the walk (root joined with the relative path)
    pub path: PathBuf,

    /// Raw file bytes
    pub content: Vec<u8>,

    /// Highest matching priority score (0 if no rule matched)
    pub priority: i64,
}

impl FileRecord {
    pub fn new(path: impl Into<PathBuf>, content: impl Into<Vec<u8>>, priority: i64) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            priority,
        }
    }

    /// Content decoded as UTF-8, replacing invalid sequences
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    /// Path rendered for chunk headers
    pub fn display_path(&self) -> String {
        self.path.to_string_lossy().into_owned()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// How the assembler partitions content. Exactly one is active per run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "mode")]
pub enum ChunkingMode {
    /// Running buffer bounded in bytes
    ByteBound { max_bytes: usize },

    /// Running buffer bounded in whitespace-delimited tokens
    TokenBound { max_tokens: usize },

    /// Exactly `n_chunks` outputs of near-equal size
    EqualWeight { n_chunks: usize },

    /// Declaration-aligned chunks bounded in lines
    Semantic { max_units: usize },
}

impl ChunkingMode {
    /// Build the mode from the four mutually exclusive options.
    ///
    /// Selecting none or more than one is a configuration error, as is a
    /// zero budget.
    pub fn from_options(
        max_bytes: Option<usize>,
        max_tokens: Option<usize>,
        equal_chunks: Option<usize>,
        semantic_lines: Option<usize>,
    ) -> Result<Self> {
        let selected: Vec<ChunkingMode> = [
            max_bytes.map(|max_bytes| ChunkingMode::ByteBound { max_bytes }),
            max_tokens.map(|max_tokens| ChunkingMode::TokenBound { max_tokens }),
            equal_chunks.map(|n_chunks| ChunkingMode::EqualWeight { n_chunks }),
            semantic_lines.map(|max_units| ChunkingMode::Semantic { max_units }),
        ]
        .into_iter()
        .flatten()
        .collect();

        match selected.as_slice() {
            [] => Err(KomodoError::ConfigError(
                "No chunking mode selected: set one of max_bytes, max_tokens, \
                 equal_chunks or semantic_lines"
                    .to_string(),
            )),
            [mode] => {
                if mode.budget() == 0 {
                    return Err(KomodoError::ConfigError(format!(
                        "{} requires a value greater than zero",
                        mode.name()
                    )));
                }
                Ok(*mode)
            }
            many => Err(KomodoError::ConfigError(format!(
                "Only one chunking mode may be selected, got {}: {}",
                many.len(),
                many.iter()
                    .map(|m| m.name())
                    .collect::<Vec<_>>()
                    .join(", ")
            ))),
        }
    }

    /// The numeric parameter of the mode
    pub fn budget(&self) -> usize {
        match *self {
            ChunkingMode::ByteBound { max_bytes } => max_bytes,
            ChunkingMode::TokenBound { max_tokens } => max_tokens,
            ChunkingMode::EqualWeight { n_chunks } => n_chunks,
            ChunkingMode::Semantic { max_units } => max_units,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChunkingMode::ByteBound { .. } => "byte-bound",
            ChunkingMode::TokenBound { .. } => "token-bound",
            ChunkingMode::EqualWeight { .. } => "equal-weight",
            ChunkingMode::Semantic { .. } => "semantic",
        }
    }
}

impl fmt::Display for ChunkingMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkingMode::ByteBound { max_bytes } => write!(f, "byte-bound ({max_bytes} bytes)"),
            ChunkingMode::TokenBound { max_tokens } => {
                write!(f, "token-bound ({max_tokens} tokens)")
            }
            ChunkingMode::EqualWeight { n_chunks } => write!(f, "equal-weight ({n_chunks} chunks)"),
            ChunkingMode::Semantic { max_units } => write!(f, "semantic ({max_units} lines)"),
        }
    }
}

/// One bounded, framed output unit
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// 0-based, contiguous across a run
    pub index: usize,

    /// Framed payload
    pub content: Vec<u8>,
}

impl Chunk {
    pub fn new(index: usize, content: impl Into<Vec<u8>>) -> Self {
        Self {
            index,
            content: content.into(),
        }
    }

    /// Payload decoded for inspection
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.content).into_owned()
    }

    pub fn len(&self) -> usize {
        self.content.len()
    }

    pub fn is_empty(&self) -> bool {
        self.content.is_empty()
    }
}

/// Statistics from a chunking run
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RunStats {
    /// Files that passed path collection
    pub files_collected: usize,

    /// Files read successfully
    pub files_loaded: usize,

    /// Files dropped because they could not be read
    pub files_failed: usize,

    /// Chunks handed to the sink
    pub chunks_emitted: usize,

    /// Chunks the sink failed to persist
    pub write_failures: usize,

    /// Total content bytes loaded
    pub bytes_loaded: u64,

    /// Run duration in milliseconds
    pub duration_ms: u64,
}
