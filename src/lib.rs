//! Komodo - priority-ordered chunking of directory trees
//!
//! Turns one or more directory trees into a deterministic sequence of
//! bounded, framed text chunks for readers with a limited context.
//!
//! # Architecture
//!
//! The codebase is organized into two modules:
//!
//! - **core**: Domain logic
//!   - config, error, types, xdg
//!   - filter (glob rules, binary detection)
//!   - collect (walking, priority scoring, concurrent loading)
//!   - chunk (byte, token, equal-weight and semantic assembly)
//!   - paged, sink, enhance, pipeline
//!
//! - **cli**: Command line adapter (depends on core)
//!
//! # Key Features
//!
//! - Byte-identical output regardless of worker count
//! - Exactly one chunking mode per run
//! - Unignore rules always override ignore rules
//! - Declaration-aligned chunks via tree-sitter
//! - Per-file failures never abort a run

// Core domain logic
pub mod core;

// Command line adapter
pub mod cli;

// Re-export commonly used types for convenience
pub use core::config::Config;
pub use core::error::{KomodoError, Result};
pub use core::pipeline::{ChunkingPipeline, PlannedFile};
pub use core::types::*;
