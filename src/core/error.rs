//! Error types and error handling for the Komodo chunking engine.
//!
//! Only configuration errors are fatal before work begins. Everything
//! else (read, parse, document and write failures) is reported for a
//! single file or chunk and the run carries on.

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for Komodo operations
pub type Result<T> = std::result::Result<T, KomodoError>;

/// Main error type for the chunking engine
#[derive(Error, Debug)]
pub enum KomodoError {
    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("Invalid path: {0}")]
    InvalidPath(String),

    #[error("Failed to read {path:?}: {source}")]
    ReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Parse failed: {0}")]
    ParseFailed(String),

    #[error("Document extraction failed for {path:?}: {message}")]
    DocumentFailed { path: PathBuf, message: String },

    #[error("Failed to write chunk {index}: {source}")]
    WriteFailed {
        index: usize,
        #[source]
        source: std::io::Error,
    },

    #[error("{failed} of {total} chunk writes failed")]
    PartialWrite { failed: usize, total: usize },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerdeError(#[from] serde_json::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),
}

impl KomodoError {
    /// Get user-friendly error message
    pub fn message(&self) -> String {
        self.to_string()
    }

    /// Check if this error was caused by invalid configuration
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            KomodoError::ConfigError(_) | KomodoError::TomlError(_)
        )
    }

    /// Check if this error must abort the whole run.
    ///
    /// Per-file and per-chunk failures are recoverable and are only
    /// surfaced through logs and run statistics.
    pub fn is_fatal(&self) -> bool {
        match self {
            KomodoError::ConfigError(_)
            | KomodoError::TomlError(_)
            | KomodoError::InvalidPath(_)
            | KomodoError::PartialWrite { .. } => true,
            KomodoError::ReadFailed { .. }
            | KomodoError::ParseFailed(_)
            | KomodoError::DocumentFailed { .. }
            | KomodoError::WriteFailed { .. }
            | KomodoError::IoError(_)
            | KomodoError::SerdeError(_) => false,
        }
    }

    /// Exit status the CLI reports for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            KomodoError::ConfigError(_) | KomodoError::TomlError(_) => 2,
            KomodoError::PartialWrite { .. } => 3,
            _ => 1,
        }
    }
}
