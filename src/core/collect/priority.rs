//! Priority scoring against basename globs.

use std::path::Path;

use crate::core::filter::GlobPattern;
use crate::core::types::PriorityRule;

/// Scores files by the highest matching priority rule
#[derive(Debug, Clone, Default)]
pub struct PriorityScorer {
    rules: Vec<(GlobPattern, i64)>,
}

impl PriorityScorer {
    pub fn new(rules: &[PriorityRule]) -> Self {
        Self {
            rules: rules
                .iter()
                .map(|r| (GlobPattern::new(&r.pattern), r.score))
                .collect(),
        }
    }

    /// Maximum score among rules matching the basename, or 0
    pub fn score(&self, path: &Path) -> i64 {
        let Some(basename) = path.file_name().map(|n| n.to_string_lossy()) else {
            return 0;
        };

        self.rules
            .iter()
            .filter(|(glob, _)| glob.matches_basename(&basename))
            .map(|(_, score)| *score)
            .max()
            .unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}
