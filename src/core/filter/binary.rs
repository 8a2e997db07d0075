//! Binary file detection.
//!
//! Classification order: known text/document extensions are never
//! binary, configured binary extensions always are, and everything else
//! is sniffed for a NUL byte in its first 8 KiB. A probe that cannot
//! read the file classifies it as binary so it is excluded.

use std::collections::HashSet;
use std::fs::File;
use std::io::Read;
use std::path::Path;

/// Bytes read when sniffing for NUL
pub const PROBE_BYTES: u64 = 8 * 1024;

/// Extensions that are never treated as binary, whatever their bytes
pub const TEXT_EXTENSIONS: &[&str] = &[
    "py", "pyi", "rs", "js", "mjs", "cjs", "jsx", "ts", "tsx", "go", "java", "kt", "c", "h",
    "cc", "cpp", "hpp", "cs", "rb", "php", "swift", "scala", "sh", "md", "rst", "txt", "toml",
    "yaml", "yml", "json", "html", "css", "sql",
];

/// Paged documents are read through the document reader, not as text
pub const DOCUMENT_EXTENSIONS: &[&str] = &["pdf"];

/// Default extensions treated as binary
pub fn default_binary_extensions() -> Vec<String> {
    vec!["exe".to_string(), "dll".to_string(), "so".to_string()]
}

/// Decides whether a file is binary
#[derive(Debug, Clone)]
pub struct BinaryClassifier {
    binary_extensions: HashSet<String>,
}

impl BinaryClassifier {
    /// Create a classifier; extensions are compared case-insensitively and
    /// may be given with or without a leading dot.
    pub fn new(binary_extensions: &[String]) -> Self {
        Self {
            binary_extensions: binary_extensions
                .iter()
                .map(|e| e.trim_start_matches('.').to_lowercase())
                .collect(),
        }
    }

    pub fn is_binary(&self, path: &Path) -> bool {
        if let Some(ext) = extension_of(path) {
            if TEXT_EXTENSIONS.contains(&ext.as_str()) || DOCUMENT_EXTENSIONS.contains(&ext.as_str())
            {
                return false;
            }
            if self.binary_extensions.contains(&ext) {
                return true;
            }
        }

        match probe_for_nul(path) {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!("Probe failed for {:?}, treating as binary: {}", path, e);
                true
            }
        }
    }
}

impl Default for BinaryClassifier {
    fn default() -> Self {
        Self::new(&default_binary_extensions())
    }
}

/// Lowercased extension without the dot
pub fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_lowercase())
}

fn probe_for_nul(path: &Path) -> std::io::Result<bool> {
    let mut head = Vec::with_capacity(PROBE_BYTES as usize);
    File::open(path)?.take(PROBE_BYTES).read_to_end(&mut head)?;
    Ok(head.contains(&0))
}
