//! Equal-weight chunking.
//!
//! Exactly `n_chunks` outputs. Files are taken in priority order and each
//! goes whole into the bin with the smallest running byte total (lowest
//! index on ties). Bins that receive nothing are still emitted.

use crate::core::chunk::document::document_unit;
use crate::core::chunk::frame::{file_section, Framer, EMPTY_FILE_MARKER};
use crate::core::paged::PagedDocumentReader;
use crate::core::types::FileRecord;

#[derive(Debug, Default, Clone)]
struct Bin {
    sections: Vec<u8>,
    size: usize,
    files: usize,
}

pub fn chunk_equal(
    files: &[FileRecord],
    n_chunks: usize,
    reader: &dyn PagedDocumentReader,
    framer: &mut Framer,
) {
    let mut bins = vec![Bin::default(); n_chunks.max(1)];

    for record in files {
        let unit = if reader.supports(&record.path) {
            document_unit(reader, record)
        } else if record.is_empty() {
            EMPTY_FILE_MARKER.as_bytes().to_vec()
        } else {
            record.content.clone()
        };

        let target = least_loaded(&bins);
        let bin = &mut bins[target];
        bin.sections
            .extend_from_slice(&file_section(&record.display_path(), &unit));
        bin.size += unit.len();
        bin.files += 1;
    }

    let total = bins.len();
    for (i, bin) in bins.iter().enumerate() {
        tracing::debug!(
            "Equal chunk {}/{}: {} files, {} bytes",
            i + 1,
            total,
            bin.files,
            bin.size
        );
        framer.emit_of(&bin.sections, total);
    }
}

/// First bin with the smallest total
fn least_loaded(bins: &[Bin]) -> usize {
    bins.iter()
        .enumerate()
        .min_by_key(|(_, bin)| bin.size)
        .map(|(i, _)| i)
        .unwrap_or(0)
}
