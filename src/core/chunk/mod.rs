//! Chunk assembly.
//!
//! The [`ChunkAssembler`] consumes the sorted file records and dispatches
//! to one strategy per [`ChunkingMode`]:
//!
//! - **size**: byte-bound and token-bound packing
//! - **equal**: exactly N near-equal outputs
//! - **semantic**: declaration-aligned blocks (**source** parses them)
//! - **document**: paragraph packing for paged documents
//!
//! Assembly is single-threaded and deterministic; indices are allocated
//! by the [`frame::Framer`] and are contiguous from 0.

pub mod document;
pub mod equal;
pub mod frame;
pub mod semantic;
pub mod size;
pub mod source;

use std::sync::Arc;

use crate::core::paged::{PagedDocumentReader, PdfReader};
use crate::core::types::{Chunk, ChunkingMode, FileRecord};

pub use frame::Framer;
pub use size::Measure;
pub use source::SourceLanguage;

/// Partitions loaded files into framed chunks
#[derive(Clone)]
pub struct ChunkAssembler {
    mode: ChunkingMode,
    reader: Arc<dyn PagedDocumentReader>,
}

impl ChunkAssembler {
    /// Create an assembler that reads paged documents as PDF
    pub fn new(mode: ChunkingMode) -> Self {
        Self {
            mode,
            reader: Arc::new(PdfReader),
        }
    }

    /// Replace the paged document reader
    pub fn with_reader(mut self, reader: Arc<dyn PagedDocumentReader>) -> Self {
        self.reader = reader;
        self
    }

    pub fn mode(&self) -> ChunkingMode {
        self.mode
    }

    /// Assemble chunks from records already in `(-priority, path)` order
    pub fn assemble(&self, files: &[FileRecord]) -> Vec<Chunk> {
        let mut framer = Framer::new();
        let reader = self.reader.as_ref();

        match self.mode {
            ChunkingMode::ByteBound { max_bytes } => {
                size::chunk_by_bytes(files, max_bytes, reader, &mut framer)
            }
            ChunkingMode::TokenBound { max_tokens } => {
                size::chunk_by_tokens(files, max_tokens, reader, &mut framer)
            }
            ChunkingMode::EqualWeight { n_chunks } => {
                equal::chunk_equal(files, n_chunks, reader, &mut framer)
            }
            ChunkingMode::Semantic { max_units } => {
                semantic::chunk_semantic(files, max_units, reader, &mut framer)
            }
        }

        tracing::debug!(
            "Assembled {} chunks from {} files ({})",
            framer.len(),
            files.len(),
            self.mode
        );
        framer.into_chunks()
    }
}

impl std::fmt::Debug for ChunkAssembler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkAssembler")
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}
