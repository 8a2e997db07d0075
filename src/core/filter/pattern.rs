//! Segment-wise glob matching with recursive `**` support.
//!
//! Paths and patterns are split on `/`. Each ordinary pattern segment
//! must match exactly one path segment using shell-glob rules (via
//! `glob::Pattern`), while a `**` segment may consume zero or more
//! path segments. Matching runs as an iterative two-pointer scan that
//! remembers only the most recent `**`, so deep paths never recurse.
//!
//! # Example
//!
//! ```
//! use komodo::core::filter::GlobPattern;
//!
//! let pattern = GlobPattern::new("**/build/**");
//! assert!(pattern.matches("crates/app/build/out.o"));
//! assert!(!pattern.matches("crates/app/src/main.rs"));
//!
//! // Bare patterns also match the basename at any depth
//! assert!(GlobPattern::new("*.log").matches("var/log/app.log"));
//! ```

use glob::Pattern;
use once_cell::sync::Lazy;
use regex::Regex;

/// Drive-letter prefix such as `C:\` or `C:/`
static DRIVE_PREFIX: Lazy<Regex> = Lazy::new(|| Regex::new(r"^[a-zA-Z]:[\\/]").unwrap());

/// Legacy rule: any pattern naming this directory matches paths through it
const NODE_MODULES: &str = "node_modules";

#[derive(Debug, Clone)]
enum Segment {
    /// `**`: zero or more whole path segments
    AnyDepth,
    /// Shell glob matching exactly one path segment
    Glob(Pattern),
}

impl Segment {
    fn compile(raw: &str) -> Self {
        if raw == "**" {
            return Segment::AnyDepth;
        }

        // Inside a single segment `**` means the same as `*`
        let mut collapsed = String::with_capacity(raw.len());
        for c in raw.chars() {
            if c == '*' && collapsed.ends_with('*') {
                continue;
            }
            collapsed.push(c);
        }

        match Pattern::new(&collapsed) {
            Ok(pattern) => Segment::Glob(pattern),
            Err(e) => {
                tracing::debug!("Treating glob segment '{}' literally: {}", raw, e);
                Segment::Glob(
                    Pattern::new(&Pattern::escape(raw)).unwrap_or_else(|_| Pattern::default()),
                )
            }
        }
    }

    fn matches(&self, segment: &str) -> bool {
        match self {
            Segment::AnyDepth => true,
            Segment::Glob(pattern) => pattern.matches(segment),
        }
    }
}

/// A compiled ignore/unignore/priority pattern
#[derive(Debug, Clone)]
pub struct GlobPattern {
    raw: String,
    segments: Vec<Segment>,
    absolute: bool,
    basename_fallback: bool,
    names_node_modules: bool,
}

impl GlobPattern {
    /// Compile a pattern. Invalid glob syntax degrades to literal
    /// comparison for the offending segment rather than failing.
    pub fn new(pattern: &str) -> Self {
        let normalized = normalize(pattern);
        let segments = normalized.split('/').map(Segment::compile).collect();

        Self {
            raw: pattern.to_string(),
            absolute: is_absolute_pattern(pattern),
            basename_fallback: !normalized.contains('/'),
            names_node_modules: pattern.contains(NODE_MODULES),
            segments,
        }
    }

    /// The pattern as written
    pub fn as_str(&self) -> &str {
        &self.raw
    }

    /// Whether the pattern should be matched against absolute paths
    pub fn is_absolute(&self) -> bool {
        self.absolute
    }

    /// Match a single path (absolute or relative, `/` or `\` separated).
    pub fn matches(&self, path: &str) -> bool {
        let path = normalize(path);
        let parts: Vec<&str> = path.split('/').collect();

        if self.names_node_modules && parts.iter().any(|p| *p == NODE_MODULES) {
            return true;
        }

        if match_segments(&parts, &self.segments) {
            return true;
        }

        self.basename_fallback && self.matches_basename_of(&parts)
    }

    /// Match against the form of the path this pattern targets: the
    /// absolute path for absolute patterns, otherwise the path relative to
    /// the walk root.
    pub fn matches_target(&self, abs_path: &str, rel_path: &str) -> bool {
        if self.absolute {
            self.matches(abs_path)
        } else {
            self.matches(rel_path)
        }
    }

    /// Match only the final path segment (used by priority scoring)
    pub fn matches_basename(&self, path: &str) -> bool {
        let path = normalize(path);
        let parts: Vec<&str> = path.split('/').collect();
        self.matches_basename_of(&parts)
    }

    fn matches_basename_of(&self, parts: &[&str]) -> bool {
        let Some(basename) = parts.last() else {
            return false;
        };
        match self.segments.as_slice() {
            [segment] => segment.matches(basename),
            _ => false,
        }
    }
}

/// Convenience wrapper: compile `pattern` and match it against `path`.
pub fn matches(path: &str, pattern: &str) -> bool {
    GlobPattern::new(pattern).matches(path)
}

/// Absolute patterns start with `/` or a drive letter
pub fn is_absolute_pattern(pattern: &str) -> bool {
    pattern.starts_with('/') || DRIVE_PREFIX.is_match(pattern)
}

fn normalize(s: &str) -> String {
    s.replace('\\', "/")
}

/// Two-pointer segment matcher.
///
/// `star` remembers the last `**` seen and the path position it was
/// tried at. On a mismatch the `**` absorbs one more path segment and the
/// scan resumes right after it.
fn match_segments(path: &[&str], pattern: &[Segment]) -> bool {
    let mut pi = 0;
    let mut si = 0;
    let mut star: Option<(usize, usize)> = None;

    while pi < path.len() {
        if si < pattern.len() {
            match &pattern[si] {
                Segment::AnyDepth => {
                    star = Some((si, pi));
                    si += 1;
                    continue;
                }
                segment if segment.matches(path[pi]) => {
                    pi += 1;
                    si += 1;
                    continue;
                }
                _ => {}
            }
        }

        match star {
            Some((star_si, star_pi)) => {
                star = Some((star_si, star_pi + 1));
                si = star_si + 1;
                pi = star_pi + 1;
            }
            None => return false,
        }
    }

    pattern[si..]
        .iter()
        .all(|segment| matches!(segment, Segment::AnyDepth))
}
