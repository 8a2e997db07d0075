//! Core domain logic (front-end agnostic)
//!
//! Everything that does not depend on the command line lives here.
//!
//! # Architecture
//!
//! - **config**: Configuration loading (TOML + environment)
//! - **error**: Error types and Result alias
//! - **types**: Domain data structures
//! - **xdg**: XDG directory handling
//! - **filter**: Glob matching, ignore rules, binary detection
//! - **collect**: Directory walking, priority scoring, concurrent loading
//! - **chunk**: Chunk assembly strategies and framing
//! - **paged**: Paged document text extraction
//! - **sink**: Chunk output targets
//! - **enhance**: Optional post-processing of the chunk stream
//! - **pipeline**: End-to-end run orchestration

pub mod chunk;
pub mod collect;
pub mod config;
pub mod enhance;
pub mod error;
pub mod filter;
pub mod paged;
pub mod pipeline;
pub mod sink;
pub mod types;
pub mod xdg;

// Re-export key types for convenience
pub use config::Config;
pub use error::{KomodoError, Result};
pub use pipeline::ChunkingPipeline;
