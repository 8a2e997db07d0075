//! Paged document text extraction.
//!
//! A [`PagedDocumentReader`] yields per-page text at up to three
//! fidelities. The most structured one available is used for each page:
//!
//! 1. layout blocks (one paragraph per block)
//! 2. markup with `<p>` elements, tags and entities stripped
//! 3. plain text with short lines merged heuristically
//!
//! Pages are joined with `--- Page N ---` markers and split into
//! paragraphs on blank lines.

use once_cell::sync::Lazy;
use regex::Regex;
use std::path::Path;

use crate::core::error::{KomodoError, Result};
use crate::core::filter::binary::extension_of;

static PARAGRAPH_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<p[^>]*>(.*?)</p>").unwrap());
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?s)<.*?>").unwrap());
static ENTITY: Lazy<Regex> = Lazy::new(|| Regex::new(r"&[a-zA-Z]+;").unwrap());
static WHITESPACE: Lazy<Regex> = Lazy::new(|| Regex::new(r"\s+").unwrap());

/// One page as returned by a reader
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PageText {
    /// 1-based page number
    pub number: usize,

    /// Layout blocks in reading order, when the reader has layout data
    pub blocks: Option<Vec<String>>,

    /// HTML-like markup, when the reader can render it
    pub markup: Option<String>,

    /// Plain text, always present (may be empty)
    pub text: String,
}

impl PageText {
    pub fn plain(number: usize, text: impl Into<String>) -> Self {
        Self {
            number,
            text: text.into(),
            ..Default::default()
        }
    }
}

/// Narrow interface to a page-structured document format
pub trait PagedDocumentReader: Send + Sync {
    /// Whether this reader handles the file
    fn supports(&self, path: &Path) -> bool {
        extension_of(path).as_deref() == Some("pdf")
    }

    /// Extract every page. Errors describe why the document is unreadable.
    fn pages(&self, path: &Path) -> Result<Vec<PageText>>;

    /// Whole-document text with page markers, failing loudly
    fn document_text(&self, path: &Path) -> Result<String> {
        Ok(render_document(&self.pages(path)?))
    }

    /// Whole-document text, empty when the document cannot be read
    fn extract_text(&self, path: &Path) -> String {
        match self.document_text(path) {
            Ok(text) => text,
            Err(e) => {
                tracing::warn!("{}", e);
                String::new()
            }
        }
    }

    /// Paragraph view of the document, empty when it cannot be read
    fn extract_paragraphs(&self, path: &Path) -> Vec<String> {
        split_paragraphs(&self.extract_text(path))
    }
}

/// PDF reader backed by `pdf-extract`.
///
/// pdf-extract yields only a text stream per page, with no layout blocks
/// or markup, so real PDFs always take the short-line merge path in
/// [`page_paragraphs`].
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfReader;

impl PagedDocumentReader for PdfReader {
    fn pages(&self, path: &Path) -> Result<Vec<PageText>> {
        if !path.is_file() {
            return Err(KomodoError::DocumentFailed {
                path: path.to_path_buf(),
                message: "file not found".to_string(),
            });
        }

        // pdf-extract panics on some malformed input
        let extracted = std::panic::catch_unwind(|| pdf_extract::extract_text_by_pages(path))
            .map_err(|_| KomodoError::DocumentFailed {
                path: path.to_path_buf(),
                message: "document parser panicked".to_string(),
            })?
            .map_err(|e| KomodoError::DocumentFailed {
                path: path.to_path_buf(),
                message: e.to_string(),
            })?;

        Ok(plain_pages(extracted))
    }
}

fn plain_pages(extracted: Vec<String>) -> Vec<PageText> {
    extracted
        .into_iter()
        .enumerate()
        .map(|(i, text)| PageText::plain(i + 1, text))
        .collect()
}

/// Paragraphs of one page at the best available fidelity
pub fn page_paragraphs(page: &PageText) -> Vec<String> {
    if let Some(blocks) = &page.blocks {
        let blocks: Vec<String> = blocks
            .iter()
            .map(|b| collapse_whitespace(b))
            .filter(|b| !b.is_empty())
            .collect();
        if !blocks.is_empty() {
            return blocks;
        }
    }

    if let Some(markup) = &page.markup {
        let paragraphs = strip_markup(markup);
        if !paragraphs.is_empty() {
            return paragraphs;
        }
    }

    merge_short_lines(&page.text)
}

/// Extract `<p>` element contents with tags and entities removed
pub fn strip_markup(markup: &str) -> Vec<String> {
    PARAGRAPH_TAG
        .captures_iter(markup)
        .filter_map(|cap| cap.get(1))
        .map(|inner| {
            let without_tags = ANY_TAG.replace_all(inner.as_str(), " ");
            let without_entities = ENTITY.replace_all(&without_tags, " ");
            collapse_whitespace(&without_entities)
        })
        .filter(|p| !p.is_empty())
        .collect()
}

/// Merge runs of short fragments into paragraphs.
///
/// A line of at most two words that does not end in `.` or `:` is treated
/// as a fragment and joined with its neighbours; any other non-empty line
/// stands as its own paragraph.
pub fn merge_short_lines(text: &str) -> Vec<String> {
    let mut paragraphs = Vec::new();
    let mut fragment: Vec<&str> = Vec::new();

    for line in text.lines().map(str::trim) {
        let is_fragment =
            line.split_whitespace().count() <= 2 && !line.ends_with('.') && !line.ends_with(':');

        if is_fragment {
            if !line.is_empty() {
                fragment.push(line);
            }
            continue;
        }

        if !fragment.is_empty() {
            paragraphs.push(fragment.join(" "));
            fragment.clear();
        }
        paragraphs.push(line.to_string());
    }

    if !fragment.is_empty() {
        paragraphs.push(fragment.join(" "));
    }
    paragraphs
}

/// Render pages with markers, paragraphs separated by blank lines
pub fn render_document(pages: &[PageText]) -> String {
    pages
        .iter()
        .map(|page| {
            format!(
                "--- Page {} ---\n\n{}",
                page.number,
                page_paragraphs(page).join("\n\n")
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n")
}

/// Split rendered text on blank lines, dropping empty paragraphs
pub fn split_paragraphs(text: &str) -> Vec<String> {
    text.split("\n\n")
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string)
        .collect()
}

fn collapse_whitespace(s: &str) -> String {
    WHITESPACE.replace_all(s, " ").trim().to_string()
}
