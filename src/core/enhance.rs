//! Optional post-processing of the assembled chunk stream.
//!
//! [`ChunkEnhancer`] wraps the output of the assembler without the
//! assembler knowing about it. In order, per chunk:
//!
//! 1. secret redaction (lines carrying a long quoted key-like run)
//! 2. relevance scoring, dropping chunks under the threshold
//! 3. redundancy removal against earlier chunks
//! 4. a `RELEVANCE_SCORE` / `METADATA` preamble
//!
//! Survivors are re-indexed from 0 and their banners renumbered.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use crate::core::chunk::frame::CHUNK_RULE_WIDTH;
use crate::core::types::Chunk;

static API_KEY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"['"].*[a-zA-Z0-9_-]{20,}.*['"]"#).unwrap());

static BANNER_NUMBER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"^(={{{CHUNK_RULE_WIDTH}}}\nCHUNK )\d+( OF \d+)?")).unwrap()
});

/// Replacement for a line that looks like it carries a secret
pub const REDACTED_LINE: &str = "[API_KEY_REDACTED]";

const FUNCTION_PREFIXES: &[&str] = &["def ", "async def ", "fn ", "pub fn ", "function "];
const CLASS_PREFIXES: &[&str] = &["class ", "struct ", "pub struct ", "interface "];
const IMPORT_PREFIXES: &[&str] = &["import ", "from ", "use "];
const COMMENT_PREFIXES: &[&str] = &["#", "//"];

/// Which enhancement steps run
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnhanceOptions {
    pub extract_metadata: bool,
    pub min_relevance: f64,
    pub remove_redundancy: bool,
    pub redact_secrets: bool,
}

impl Default for EnhanceOptions {
    fn default() -> Self {
        Self {
            extract_metadata: true,
            min_relevance: 0.3,
            remove_redundancy: true,
            redact_secrets: false,
        }
    }
}

/// Names found in a chunk by line heuristics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChunkMetadata {
    pub functions: Vec<String>,
    pub classes: Vec<String>,
    pub imports: Vec<String>,
}

impl ChunkMetadata {
    pub fn is_empty(&self) -> bool {
        self.functions.is_empty() && self.classes.is_empty() && self.imports.is_empty()
    }

    fn render(&self) -> String {
        let mut out = String::from("METADATA:\n");
        for (key, values) in [
            ("FUNCTIONS", &self.functions),
            ("CLASSES", &self.classes),
            ("IMPORTS", &self.imports),
        ] {
            if !values.is_empty() {
                out.push_str(&format!("{key}: {}\n", values.join(", ")));
            }
        }
        out
    }
}

/// Decorator stage over an assembled chunk sequence
#[derive(Debug, Clone, Default)]
pub struct ChunkEnhancer {
    options: EnhanceOptions,
}

impl ChunkEnhancer {
    pub fn new(options: EnhanceOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &EnhanceOptions {
        &self.options
    }

    pub fn enhance(&self, chunks: Vec<Chunk>) -> Vec<Chunk> {
        let input = chunks.len();
        let mut seen = HashSet::new();
        let mut kept: Vec<(String, f64)> = Vec::new();

        for chunk in chunks {
            let mut text = chunk.text();
            if self.options.redact_secrets {
                text = redact_secrets(&text);
            }

            let score = relevance(&text);
            if score < self.options.min_relevance {
                tracing::debug!("Dropping chunk {} (relevance {:.2})", chunk.index, score);
                continue;
            }

            if self.options.remove_redundancy && !seen.insert(normalize(&text)) {
                tracing::debug!("Dropping chunk {} (duplicate content)", chunk.index);
                continue;
            }

            kept.push((text, score));
        }

        let total = kept.len();
        let enhanced: Vec<Chunk> = kept
            .into_iter()
            .enumerate()
            .map(|(index, (text, score))| {
                let body = renumber_banner(&text, index + 1, total);
                let mut content = format!("RELEVANCE_SCORE: {score:.2}\n");
                if self.options.extract_metadata {
                    let metadata = extract_metadata(&body);
                    if !metadata.is_empty() {
                        content.push_str(&metadata.render());
                    }
                }
                content.push_str(&body);
                Chunk::new(index, content)
            })
            .collect();

        tracing::info!("Enhancement kept {} of {} chunks", enhanced.len(), input);
        enhanced
    }
}

/// Collect function, class and import names from content lines
pub fn extract_metadata(text: &str) -> ChunkMetadata {
    let mut metadata = ChunkMetadata::default();

    for line in body_lines(text) {
        let line = line.trim();
        if let Some(rest) = strip_any_prefix(line, FUNCTION_PREFIXES) {
            push_unique(&mut metadata.functions, identifier(rest));
        } else if let Some(rest) = strip_any_prefix(line, CLASS_PREFIXES) {
            push_unique(&mut metadata.classes, identifier(rest));
        } else if strip_any_prefix(line, IMPORT_PREFIXES).is_some() {
            push_unique(&mut metadata.imports, line.trim_end_matches(';').to_string());
        }
    }

    metadata
}

/// Relevance in `[0, 1]`.
///
/// Starts at 1.0; a comment-heavy (> 0.7 comments per code line) or
/// comment-starved (< 0.1) chunk is discounted, declarations and
/// docstrings boost it, and the result is capped at 1.0.
pub fn relevance(text: &str) -> f64 {
    let mut code_lines = 0usize;
    let mut comment_lines = 0usize;
    for line in body_lines(text).map(str::trim).filter(|l| !l.is_empty()) {
        if is_comment(line) {
            comment_lines += 1;
        } else {
            code_lines += 1;
        }
    }

    let mut score: f64 = 1.0;
    if code_lines > 0 {
        let ratio = comment_lines as f64 / code_lines as f64;
        if ratio > 0.7 {
            score *= 0.8;
        } else if ratio < 0.1 {
            score *= 0.9;
        }
    }

    let metadata = extract_metadata(text);
    if !metadata.functions.is_empty() || !metadata.classes.is_empty() {
        score *= 1.2;
    }
    if text.contains("\"\"\"") || text.contains("///") {
        score *= 1.1;
    }

    score.min(1.0)
}

/// Content used for duplicate detection: no blank, comment or banner lines
pub fn normalize(text: &str) -> String {
    body_lines(text)
        .map(str::trim)
        .filter(|l| !l.is_empty() && !is_comment(l))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Replace every line that looks like it embeds an API key
pub fn redact_secrets(text: &str) -> String {
    let mut out: Vec<&str> = text
        .lines()
        .map(|line| {
            if API_KEY.is_match(line) {
                REDACTED_LINE
            } else {
                line
            }
        })
        .collect();
    if text.ends_with('\n') {
        out.push("");
    }
    out.join("\n")
}

fn renumber_banner(text: &str, number: usize, total: usize) -> String {
    BANNER_NUMBER
        .replace(text, |caps: &regex::Captures| {
            let of = if caps.get(2).is_some() {
                format!(" OF {total}")
            } else {
                String::new()
            };
            format!("{}{number}{of}", &caps[1])
        })
        .into_owned()
}

/// Lines outside the chunk banner and rule lines
fn body_lines(text: &str) -> impl Iterator<Item = &str> {
    text.lines().filter(|line| {
        let trimmed = line.trim();
        !(trimmed.starts_with("CHUNK ")
            || (!trimmed.is_empty() && trimmed.chars().all(|c| c == '=')))
    })
}

fn is_comment(line: &str) -> bool {
    COMMENT_PREFIXES.iter().any(|p| line.starts_with(p))
}

fn strip_any_prefix<'a>(line: &'a str, prefixes: &[&str]) -> Option<&'a str> {
    prefixes.iter().find_map(|p| line.strip_prefix(p))
}

fn identifier(rest: &str) -> String {
    rest.chars()
        .take_while(|c| c.is_alphanumeric() || *c == '_')
        .collect()
}

fn push_unique(values: &mut Vec<String>, value: String) {
    if !value.is_empty() && !values.contains(&value) {
        values.push(value);
    }
}
