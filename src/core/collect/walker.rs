//! Directory walker producing the candidate file list.
//!
//! Traverses each root with `walkdir`, pruning fixed dependency and
//! metadata directories before descending. Files are then checked in
//! order: output directory, file type, ignore rules, binary content.
//! Walk errors (permission denied, etc.) are logged and skipped.

use std::path::{Path, PathBuf};
use walkdir::{DirEntry, WalkDir};

use crate::core::error::{KomodoError, Result};
use crate::core::filter::binary::extension_of;
use crate::core::filter::rules::is_pruned_dir;
use crate::core::filter::{BinaryClassifier, RuleSet};

/// Collects candidate files from one or more roots
#[derive(Debug, Clone)]
pub struct PathCollector {
    rules: RuleSet,
    classifier: BinaryClassifier,

    /// Absolute output directory whose contents are never collected
    output_dir: Option<PathBuf>,

    /// Lowercased extension (without dot) files must carry
    file_type: Option<String>,
}

impl PathCollector {
    pub fn new(rules: RuleSet, classifier: BinaryClassifier) -> Self {
        Self {
            rules,
            classifier,
            output_dir: None,
            file_type: None,
        }
    }

    /// Exclude everything under `dir`
    pub fn with_output_dir(mut self, dir: &Path) -> Self {
        self.output_dir = Some(absolute(dir));
        self
    }

    /// Restrict collection to files with this extension (`"py"` or `".py"`)
    pub fn with_file_type(mut self, file_type: Option<&str>) -> Self {
        self.file_type = file_type
            .map(|t| t.trim_start_matches('.').to_lowercase())
            .filter(|t| !t.is_empty());
        self
    }

    /// Collect candidate files from every root.
    ///
    /// Exclusion files of all roots are read before any walking, so their
    /// rules apply to the whole run. Paths are returned in walk order; the
    /// loader imposes the final ordering.
    ///
    /// # Errors
    ///
    /// `InvalidPath` if a root does not exist or is not a directory.
    pub fn collect(&self, roots: &[PathBuf]) -> Result<Vec<PathBuf>> {
        for root in roots {
            if !root.is_dir() {
                return Err(KomodoError::InvalidPath(format!(
                    "{} is not a directory",
                    root.display()
                )));
            }
        }

        let mut rules = self.rules.clone();
        for root in roots {
            rules.load_exclusion_file(root);
        }

        let mut files = Vec::new();
        for root in roots {
            let before = files.len();
            self.walk_root(root, &rules, &mut files);
            tracing::debug!(
                "Collected {} files from {:?}",
                files.len() - before,
                root
            );
        }

        Ok(files)
    }

    fn walk_root(&self, root: &Path, rules: &RuleSet, files: &mut Vec<PathBuf>) {
        for entry in WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_entry(|e| should_descend(e, root))
        {
            match entry {
                Ok(entry) => {
                    if !entry.file_type().is_file() {
                        continue;
                    }
                    if self.accepts(entry.path(), root, rules) {
                        files.push(entry.into_path());
                    }
                }
                Err(e) => {
                    tracing::warn!("Walk error: {}", e);
                }
            }
        }
    }

    fn accepts(&self, path: &Path, root: &Path, rules: &RuleSet) -> bool {
        let abs_path = absolute(path);

        if let Some(output_dir) = &self.output_dir {
            if abs_path.starts_with(output_dir) {
                tracing::debug!("Skipping output file: {:?}", path);
                return false;
            }
        }

        if let Some(file_type) = &self.file_type {
            if extension_of(path).as_deref() != Some(file_type.as_str()) {
                return false;
            }
        }

        let rel_path = relative_path(path, root);
        if rules.is_ignored(&slashed(&abs_path), &rel_path) {
            tracing::debug!("Ignored: {}", rel_path);
            return false;
        }

        if self.classifier.is_binary(path) {
            tracing::debug!("Skipping binary file: {}", rel_path);
            return false;
        }

        true
    }
}

/// Prune fixed directory names without descending. The root itself is
/// never pruned.
fn should_descend(entry: &DirEntry, root: &Path) -> bool {
    if entry.depth() == 0 || entry.path() == root {
        return true;
    }

    if entry.file_type().is_dir() {
        if let Some(name) = entry.file_name().to_str() {
            if is_pruned_dir(name) {
                tracing::debug!("Pruned directory: {:?}", entry.path());
                return false;
            }
        }
    }

    true
}

/// Path relative to the walk root, `/`-separated
fn relative_path(path: &Path, root: &Path) -> String {
    let rel = path.strip_prefix(root).unwrap_or(path);
    slashed(rel)
}

fn slashed(path: &Path) -> String {
    path.components()
        .map(|c| c.as_os_str().to_string_lossy())
        .collect::<Vec<_>>()
        .join("/")
        .replace("//", "/")
}

fn absolute(path: &Path) -> PathBuf {
    std::path::absolute(path).unwrap_or_else(|_| path.to_path_buf())
}
