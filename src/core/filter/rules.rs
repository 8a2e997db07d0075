//! Ignore and unignore rule evaluation.
//!
//! A [`RuleSet`] is built once per run from the built-in rules, the
//! user's rules and any root-local exclusion files, then shared
//! read-only by the path collector. Unignore rules always win over
//! ignore rules, regardless of their order.

use std::fs;
use std::path::Path;

use crate::core::error::Result;
use crate::core::filter::pattern::GlobPattern;
use crate::core::types::{IgnoreRule, RuleOrigin, UnignoreRule};

/// Patterns ignored on every run
pub const BUILTIN_IGNORES: &[&str] = &[
    // Version control and editor metadata
    "**/.git/**",
    "**/.svn/**",
    "**/.hg/**",
    "**/.idea/**",
    "**/.vscode/**",
    // Caches and test tooling
    "**/__pycache__/**",
    "**/*.pyc",
    "**/*.pyo",
    "**/.pytest_cache/**",
    "**/.coverage",
    "**/.tox/**",
    "**/.eggs/**",
    "**/Cython/Debugger/**",
    "**/*.egg-info/**",
    // Build output
    "**/build/**",
    "**/dist/**",
    "**/target/**",
    // Virtual environments and dependency trees
    "**/venv/**",
    "**/.venv/**",
    "**/env/**",
    "**/ENV/**",
    "**/virtualenv/**",
    "**/site-packages/**",
    "**/pip/**",
    "**/node_modules/**",
    // OS litter and secrets
    "**/.DS_Store",
    "**/Thumbs.db",
    "**/*.env",
    "**/.env",
    // Media
    "**/*.png",
    "**/*.jpg",
    "**/*.jpeg",
    "**/*.gif",
    "**/*.webp",
    "**/*.bmp",
    "**/*.mp3",
    "**/*.mp4",
    // Temp and test-data conventions
    "**/tmp/**",
    "**/temp/**",
    "**/var/folders/**",
    "**/test/data/**",
    "**/tests/data/**",
    "**/test_data/**",
    "**/tests_data/**",
    "__pycache__",
    "*.pyc",
    "*.pyo",
    "target",
    "venv",
];

/// Directory names pruned before descending, whatever the rules say
pub const PRUNED_DIR_NAMES: &[&str] = &[
    "venv",
    ".venv",
    "env",
    "node_modules",
    ".git",
    ".svn",
    ".hg",
    "__pycache__",
    ".pytest_cache",
    ".tox",
    ".eggs",
    "build",
    "dist",
];

/// Root-local exclusion files, in lookup order. Only the first one found
/// is read.
pub const EXCLUSION_FILE_NAMES: &[&str] = &[".komodo-ignore", ".gitignore"];

/// Source files unignored unless the caller already addresses
/// dependency directories in their own unignore rules
const DEFAULT_UNIGNORE: &str = "*.py";

#[derive(Debug, Clone)]
struct CompiledRule {
    rule: IgnoreRule,
    glob: GlobPattern,
}

impl CompiledRule {
    fn new(rule: IgnoreRule) -> Self {
        let glob = GlobPattern::new(&rule.pattern);
        Self { rule, glob }
    }
}

/// Immutable-after-construction set of ignore and unignore rules
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    ignore: Vec<CompiledRule>,
    unignore: Vec<CompiledRule>,
}

impl RuleSet {
    /// Built-in rules only, no unignore rules
    pub fn builtin() -> Self {
        Self {
            ignore: BUILTIN_IGNORES
                .iter()
                .map(|p| CompiledRule::new(IgnoreRule::builtin(*p)))
                .collect(),
            unignore: Vec::new(),
        }
    }

    /// Built-in rules plus the user's ignore and unignore patterns.
    ///
    /// `*.py` is unignored by default unless one of the user's unignore
    /// patterns mentions `site-packages` or `venv`.
    pub fn new(user_ignore: &[String], user_unignore: &[String]) -> Self {
        let mut rules = Self::builtin();
        rules.extend_ignore(user_ignore.iter().map(IgnoreRule::user));

        let addresses_dependencies = user_unignore
            .iter()
            .any(|p| p.contains("site-packages") || p.contains("venv"));

        let mut unignore: Vec<UnignoreRule> =
            user_unignore.iter().map(IgnoreRule::user).collect();
        if !addresses_dependencies {
            unignore.push(IgnoreRule::builtin(DEFAULT_UNIGNORE));
        }
        rules.unignore = unignore.into_iter().map(CompiledRule::new).collect();

        rules
    }

    /// Append ignore rules (user rules, exclusion-file rules)
    pub fn extend_ignore(&mut self, rules: impl IntoIterator<Item = IgnoreRule>) {
        self.ignore
            .extend(rules.into_iter().map(CompiledRule::new));
    }

    /// Read the first exclusion file found in `root` and append its rules.
    ///
    /// Returns the number of rules added. A missing file adds nothing; an
    /// unreadable one is logged and skipped.
    pub fn load_exclusion_file(&mut self, root: &Path) -> usize {
        let Some(path) = EXCLUSION_FILE_NAMES
            .iter()
            .map(|name| root.join(name))
            .find(|p| p.is_file())
        else {
            return 0;
        };

        match read_exclusion_file(&path) {
            Ok(rules) => {
                let count = rules.len();
                tracing::debug!("Loaded {} exclusion rules from {:?}", count, path);
                self.extend_ignore(rules);
                count
            }
            Err(e) => {
                tracing::warn!("Failed to read exclusion file {:?}: {}", path, e);
                0
            }
        }
    }

    /// Whether a file should be skipped.
    ///
    /// Unignore rules are evaluated first; any match vetoes every ignore
    /// rule.
    pub fn is_ignored(&self, abs_path: &str, rel_path: &str) -> bool {
        if self
            .unignore
            .iter()
            .any(|r| r.glob.matches_target(abs_path, rel_path))
        {
            return false;
        }

        match self
            .ignore
            .iter()
            .find(|r| r.glob.matches_target(abs_path, rel_path))
        {
            Some(hit) => {
                tracing::trace!(
                    "{} ignored by {:?} rule '{}'",
                    rel_path,
                    hit.rule.origin,
                    hit.rule.pattern
                );
                true
            }
            None => false,
        }
    }

    pub fn ignore_rules(&self) -> impl Iterator<Item = &IgnoreRule> {
        self.ignore.iter().map(|r| &r.rule)
    }

    pub fn unignore_rules(&self) -> impl Iterator<Item = &UnignoreRule> {
        self.unignore.iter().map(|r| &r.rule)
    }
}

/// Whether a directory name is on the fixed prune list
pub fn is_pruned_dir(name: &str) -> bool {
    PRUNED_DIR_NAMES.contains(&name)
}

fn read_exclusion_file(path: &Path) -> Result<Vec<IgnoreRule>> {
    let contents = fs::read_to_string(path)?;
    Ok(parse_exclusion_rules(&contents)
        .into_iter()
        .map(|p| IgnoreRule::new(p, RuleOrigin::File))
        .collect())
}

/// Parse exclusion-file contents into ignore patterns.
///
/// Blank lines and `#` comments are skipped. Lines without `**` are
/// normalized: a leading `/` anchors the pattern at the root, otherwise
/// it may match at any depth (`**/` prefix); a trailing `/` marks a
/// directory whose whole subtree is ignored (`/**` suffix).
pub fn parse_exclusion_rules(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(normalize_exclusion_line)
        .collect()
}

fn normalize_exclusion_line(line: &str) -> String {
    if line.contains("**") {
        return line.to_string();
    }

    let mut pattern = match line.strip_prefix('/') {
        Some(anchored) => anchored.to_string(),
        None => format!("**/{line}"),
    };
    if pattern.ends_with('/') {
        pattern.push_str("**");
    }
    pattern
}
