//! Path filtering.
//!
//! - **pattern**: segment-wise glob matching with `**`
//! - **rules**: ignore/unignore rule sets, built-ins, exclusion files
//! - **binary**: extension lists and NUL sniffing

pub mod binary;
pub mod pattern;
pub mod rules;

pub use binary::BinaryClassifier;
pub use pattern::GlobPattern;
pub use rules::RuleSet;
