//! Byte- and token-bounded chunking.
//!
//! Files are packed whole into a running chunk while they fit. A file
//! that does not fit closes the current chunk; if it would not fit an
//! empty chunk either, its content is cut into budget-sized slices, each
//! framed with the same file header and emitted alone.

use crate::core::chunk::document;
use crate::core::chunk::frame::{file_section, Framer, EMPTY_FILE_MARKER};
use crate::core::paged::PagedDocumentReader;
use crate::core::types::FileRecord;

/// Unit in which a budget is counted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Measure {
    Bytes,
    /// Whitespace-delimited tokens
    Tokens,
    Lines,
}

impl Measure {
    pub fn of(&self, text: &str) -> usize {
        match self {
            Measure::Bytes => text.len(),
            Measure::Tokens => text.split_whitespace().count(),
            Measure::Lines => text.lines().count(),
        }
    }
}

/// Running chunk: framed sections plus the budget they consume
#[derive(Debug, Default)]
struct Pending {
    sections: Vec<u8>,
    used: usize,
}

impl Pending {
    fn push(&mut self, section: Vec<u8>, cost: usize) {
        self.sections.extend_from_slice(&section);
        self.used += cost;
    }

    fn flush(&mut self, framer: &mut Framer) {
        if !self.sections.is_empty() {
            framer.emit(&self.sections);
        }
        self.sections.clear();
        self.used = 0;
    }
}

/// Budget counts banner, file headers and content bytes
pub fn chunk_by_bytes(
    files: &[FileRecord],
    max_bytes: usize,
    reader: &dyn PagedDocumentReader,
    framer: &mut Framer,
) {
    let mut pending = Pending::default();

    for record in files {
        let path = record.display_path();

        if reader.supports(&record.path) {
            pending.flush(framer);
            document::chunk_document(framer, reader, record, Measure::Bytes, max_bytes);
            continue;
        }

        if record.is_empty() {
            pending.flush(framer);
            framer.emit_file(&path, EMPTY_FILE_MARKER.as_bytes());
            continue;
        }

        let section = file_section(&path, &record.content);
        if framer.next_banner_len() + pending.used + section.len() <= max_bytes {
            let cost = section.len();
            pending.push(section, cost);
            continue;
        }

        pending.flush(framer);

        if framer.next_banner_len() + section.len() <= max_bytes {
            let cost = section.len();
            pending.push(section, cost);
            continue;
        }

        let slices = byte_slices(&record.content, max_bytes);
        tracing::debug!("Splitting {} into {} byte slices", path, slices.len());
        for slice in slices {
            framer.emit_file(&path, slice);
        }
    }

    pending.flush(framer);
}

/// Budget counts content tokens only
pub fn chunk_by_tokens(
    files: &[FileRecord],
    max_tokens: usize,
    reader: &dyn PagedDocumentReader,
    framer: &mut Framer,
) {
    let mut pending = Pending::default();

    for record in files {
        let path = record.display_path();

        if reader.supports(&record.path) {
            pending.flush(framer);
            document::chunk_document(framer, reader, record, Measure::Tokens, max_tokens);
            continue;
        }

        if record.is_empty() {
            pending.flush(framer);
            framer.emit_file(&path, EMPTY_FILE_MARKER.as_bytes());
            continue;
        }

        let text = record.text();
        let tokens: Vec<&str> = text.split_whitespace().collect();

        if pending.used + tokens.len() <= max_tokens {
            pending.push(file_section(&path, text.as_bytes()), tokens.len());
            continue;
        }

        pending.flush(framer);

        if tokens.len() <= max_tokens {
            pending.push(file_section(&path, text.as_bytes()), tokens.len());
            continue;
        }

        tracing::debug!(
            "Splitting {} ({} tokens) into slices of {}",
            path,
            tokens.len(),
            max_tokens
        );
        for slice in tokens.chunks(max_tokens) {
            framer.emit_file(&path, slice.join(" ").as_bytes());
        }
    }

    pending.flush(framer);
}

/// Cut content into slices of at most `max_bytes`.
///
/// For valid UTF-8 the cut is moved back to the previous character
/// boundary (at most 3 bytes). A budget smaller than one character still
/// takes that whole character.
pub fn byte_slices(content: &[u8], max_bytes: usize) -> Vec<&[u8]> {
    let max_bytes = max_bytes.max(1);
    let text = std::str::from_utf8(content).ok();
    let mut slices = Vec::with_capacity(content.len() / max_bytes + 1);
    let mut start = 0;

    while start < content.len() {
        let mut end = (start + max_bytes).min(content.len());

        if let Some(text) = text {
            while end > start && !text.is_char_boundary(end) {
                end -= 1;
            }
            if end == start {
                end = start + 1;
                while end < content.len() && !text.is_char_boundary(end) {
                    end += 1;
                }
            }
        }

        slices.push(&content[start..end]);
        start = end;
    }

    slices
}
