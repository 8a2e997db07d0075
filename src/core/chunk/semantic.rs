//! Declaration-aligned chunking.
//!
//! Source files are cut into labeled blocks, one per top-level
//! declaration plus `GLOBAL CODE` blocks for the lines between them, and
//! blocks are packed per file while their source line count stays within
//! budget. A block larger than the budget is emitted on its own; blocks
//! are never split. Files that fail to parse become one whole-file chunk.
//! Other text files are cut every `max_units` lines.

use crate::core::chunk::document;
use crate::core::chunk::frame::{file_section, Framer, EMPTY_FILE_MARKER};
use crate::core::chunk::size::Measure;
use crate::core::chunk::source::{parse_declarations, Declaration, SourceLanguage};
use crate::core::paged::PagedDocumentReader;
use crate::core::types::FileRecord;

/// Label for lines outside any declaration
pub const GLOBAL_CODE_LABEL: &str = "GLOBAL CODE";

const BLOCK_SEPARATOR: &str = "\n";

/// A labeled, 1-based inclusive line range
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub label: String,
    pub start_line: usize,
    pub end_line: usize,
}

impl Block {
    fn new(label: impl Into<String>, start_line: usize, end_line: usize) -> Self {
        Self {
            label: label.into(),
            start_line,
            end_line,
        }
    }

    /// Source lines covered; the label line is not counted
    pub fn line_count(&self) -> usize {
        self.end_line + 1 - self.start_line
    }

    pub fn render(&self, lines: &[&str]) -> String {
        format!(
            "{} (lines {}-{})\n{}",
            self.label,
            self.start_line,
            self.end_line,
            lines[self.start_line - 1..self.end_line].concat()
        )
    }
}

pub fn chunk_semantic(
    files: &[FileRecord],
    max_units: usize,
    reader: &dyn PagedDocumentReader,
    framer: &mut Framer,
) {
    for record in files {
        let path = record.display_path();

        if reader.supports(&record.path) {
            document::chunk_document(framer, reader, record, Measure::Lines, max_units);
            continue;
        }

        if record.is_empty() {
            framer.emit_file(&path, EMPTY_FILE_MARKER.as_bytes());
            continue;
        }

        let Some(language) = SourceLanguage::from_path(&record.path) else {
            chunk_lines(framer, &path, &record.text(), max_units);
            continue;
        };

        let text = record.text();
        match parse_declarations(&text, language) {
            Ok(declarations) => {
                let lines: Vec<&str> = text.split_inclusive('\n').collect();
                let blocks = build_blocks(&declarations, lines.len());
                emit_blocks(framer, &path, &lines, &blocks, max_units);
            }
            Err(e) => {
                tracing::warn!("{}: {}, emitting whole file", path, e);
                framer.emit_file(&path, &record.content);
            }
        }
    }
}

/// Cover lines `1..=total` with declaration and global-code blocks.
///
/// Declarations starting on a line already covered extend the previous
/// block instead of overlapping it.
pub fn build_blocks(declarations: &[Declaration], total: usize) -> Vec<Block> {
    let mut blocks: Vec<Block> = Vec::new();
    let mut next = 1;

    for decl in declarations {
        let end = decl.end_line.min(total);
        if decl.start_line > total {
            break;
        }

        if decl.start_line < next {
            if let Some(last) = blocks.last_mut() {
                last.end_line = last.end_line.max(end);
                next = last.end_line + 1;
            }
            continue;
        }

        if decl.start_line > next {
            blocks.push(Block::new(GLOBAL_CODE_LABEL, next, decl.start_line - 1));
        }
        blocks.push(Block::new(decl.label(), decl.start_line, end));
        next = end + 1;
    }

    if next <= total {
        blocks.push(Block::new(GLOBAL_CODE_LABEL, next, total));
    }

    blocks
}

fn emit_blocks(framer: &mut Framer, path: &str, lines: &[&str], blocks: &[Block], budget: usize) {
    let mut group: Vec<String> = Vec::new();
    let mut used = 0;

    for block in blocks {
        let size = block.line_count();

        if size > budget {
            flush(framer, path, &mut group);
            used = 0;
            tracing::debug!(
                "{}: {} spans {} lines, over budget of {}",
                path,
                block.label,
                size,
                budget
            );
            framer.emit(&file_section(path, block.render(lines).as_bytes()));
            continue;
        }

        if used + size > budget {
            flush(framer, path, &mut group);
            used = 0;
        }
        group.push(block.render(lines));
        used += size;
    }

    flush(framer, path, &mut group);
}

fn flush(framer: &mut Framer, path: &str, group: &mut Vec<String>) {
    if group.is_empty() {
        return;
    }
    framer.emit(&file_section(path, group.join(BLOCK_SEPARATOR).as_bytes()));
    group.clear();
}

/// Line-bounded fallback for files without a declaration grammar
fn chunk_lines(framer: &mut Framer, path: &str, text: &str, max_lines: usize) {
    let lines: Vec<&str> = text.split_inclusive('\n').collect();
    if lines.is_empty() {
        framer.emit_file(path, text.as_bytes());
        return;
    }

    for group in lines.chunks(max_lines.max(1)) {
        framer.emit_file(path, group.concat().as_bytes());
    }
}
