//! Chunk framing.
//!
//! Every chunk starts with a banner:
//!
//! ```text
//! ================================================================================
//! CHUNK 3
//! ================================================================================
//!
//! ```
//!
//! followed by one section per contained file:
//!
//! ```text
//! ========================================
//! File: src/lib.rs
//! ========================================
//!
//! <content>
//! ```
//!
//! Banner numbers are 1-based; chunk indices are 0-based.

use crate::core::types::Chunk;

/// Width of the chunk banner rule
pub const CHUNK_RULE_WIDTH: usize = 80;

/// Width of the file header rule
pub const FILE_RULE_WIDTH: usize = 40;

/// Placeholder content for zero-byte files
pub const EMPTY_FILE_MARKER: &str = "[Empty File]";

pub fn chunk_banner(number: usize) -> String {
    let rule = "=".repeat(CHUNK_RULE_WIDTH);
    format!("{rule}\nCHUNK {number}\n{rule}\n\n")
}

pub fn chunk_banner_of(number: usize, total: usize) -> String {
    let rule = "=".repeat(CHUNK_RULE_WIDTH);
    format!("{rule}\nCHUNK {number} OF {total}\n{rule}\n\n")
}

pub fn file_header(path: &str) -> String {
    let rule = "=".repeat(FILE_RULE_WIDTH);
    format!("{rule}\nFile: {path}\n{rule}\n\n")
}

/// Header, content, trailing newline
pub fn file_section(path: &str, content: &[u8]) -> Vec<u8> {
    let header = file_header(path);
    let mut section = Vec::with_capacity(header.len() + content.len() + 1);
    section.extend_from_slice(header.as_bytes());
    section.extend_from_slice(content);
    section.push(b'\n');
    section
}

/// Placeholder for a document that could not be extracted
pub fn document_error_marker(message: &str) -> String {
    format!("[Error processing document: {message}]")
}

/// Allocates contiguous chunk indices and prepends banners
#[derive(Debug, Default)]
pub struct Framer {
    chunks: Vec<Chunk>,
}

impl Framer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Index the next emitted chunk will get
    pub fn next_index(&self) -> usize {
        self.chunks.len()
    }

    /// Byte length of the banner the next chunk will carry
    pub fn next_banner_len(&self) -> usize {
        chunk_banner(self.next_index() + 1).len()
    }

    /// Emit a chunk made of already-framed file sections
    pub fn emit(&mut self, sections: &[u8]) {
        let banner = chunk_banner(self.next_index() + 1);
        self.push(banner, sections);
    }

    /// Emit a chunk whose banner states the total chunk count
    pub fn emit_of(&mut self, sections: &[u8], total: usize) {
        let banner = chunk_banner_of(self.next_index() + 1, total);
        self.push(banner, sections);
    }

    /// Emit a chunk holding a single file section
    pub fn emit_file(&mut self, path: &str, content: &[u8]) {
        self.emit(&file_section(path, content));
    }

    pub fn len(&self) -> usize {
        self.chunks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.chunks.is_empty()
    }

    pub fn into_chunks(self) -> Vec<Chunk> {
        self.chunks
    }

    fn push(&mut self, banner: String, sections: &[u8]) {
        let mut content = banner.into_bytes();
        content.extend_from_slice(sections);
        self.chunks.push(Chunk::new(self.chunks.len(), content));
    }
}
