//! Paragraph-aware chunking for paged documents.
//!
//! The document's rendered text is split into paragraphs on blank lines
//! and paragraphs are packed into chunks under the active mode's budget.
//! A paragraph larger than the budget goes out alone.

use crate::core::chunk::frame::{
    document_error_marker, file_header, file_section, Framer, EMPTY_FILE_MARKER,
};
use crate::core::chunk::size::Measure;
use crate::core::paged::{split_paragraphs, PagedDocumentReader};
use crate::core::types::FileRecord;

const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Emit the chunks for one paged document
pub fn chunk_document(
    framer: &mut Framer,
    reader: &dyn PagedDocumentReader,
    record: &FileRecord,
    measure: Measure,
    budget: usize,
) {
    let path = record.display_path();

    let text = match reader.document_text(&record.path) {
        Ok(text) => text,
        Err(e) => {
            tracing::warn!("{}", e);
            framer.emit_file(&path, document_error_marker(&e.message()).as_bytes());
            return;
        }
    };

    let paragraphs = split_paragraphs(&text);
    if paragraphs.is_empty() {
        framer.emit_file(&path, EMPTY_FILE_MARKER.as_bytes());
        return;
    }

    // Byte budgets cover the whole chunk: banner, file header, separators
    // and the section's trailing newline
    let (section_overhead, separator) = match measure {
        Measure::Bytes => (file_header(&path).len() + 1, PARAGRAPH_SEPARATOR.len()),
        _ => (0, 0),
    };

    let mut group: Vec<&str> = Vec::new();
    let mut used = 0;
    let mut emitted = 0;

    for paragraph in &paragraphs {
        let size = measure.of(paragraph);
        if !group.is_empty() {
            let banner = match measure {
                Measure::Bytes => framer.next_banner_len(),
                _ => 0,
            };
            if banner + section_overhead + used + separator + size > budget {
                framer.emit(&file_section(&path, group.join(PARAGRAPH_SEPARATOR).as_bytes()));
                emitted += 1;
                group.clear();
                used = 0;
            }
        }
        if !group.is_empty() {
            used += separator;
        }
        group.push(paragraph);
        used += size;
    }

    if !group.is_empty() {
        framer.emit(&file_section(&path, group.join(PARAGRAPH_SEPARATOR).as_bytes()));
        emitted += 1;
    }

    tracing::debug!(
        "Document {} produced {} chunks from {} paragraphs",
        path,
        emitted,
        paragraphs.len()
    );
}

/// Whole-document content used as a single unit (equal-weight mode)
pub fn document_unit(reader: &dyn PagedDocumentReader, record: &FileRecord) -> Vec<u8> {
    match reader.document_text(&record.path) {
        Ok(text) if text.trim().is_empty() => EMPTY_FILE_MARKER.as_bytes().to_vec(),
        Ok(text) => text.into_bytes(),
        Err(e) => {
            tracing::warn!("{}", e);
            document_error_marker(&e.message()).into_bytes()
        }
    }
}
