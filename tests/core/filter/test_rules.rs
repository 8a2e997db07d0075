//! Ignore rule tests

use komodo::core::filter::rules::{parse_exclusion_rules, EXCLUSION_FILE_NAMES};
use komodo::core::filter::{BinaryClassifier, RuleSet};
use komodo::core::types::{IgnoreRule, RuleOrigin};

use crate::common::TestRepo;

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

#[test]
fn test_builtin_rules_ignore_metadata() {
    let rules = RuleSet::builtin();
    assert!(rules.is_ignored("/r/.git/HEAD", ".git/HEAD"));
    assert!(rules.is_ignored("/r/app/__pycache__/x.pyc", "app/__pycache__/x.pyc"));
    assert!(rules.is_ignored("/r/logo.png", "logo.png"));
    assert!(!rules.is_ignored("/r/src/lib.rs", "src/lib.rs"));
    assert!(rules.ignore_rules().all(|r| r.origin == RuleOrigin::Builtin));
}

#[test]
fn test_unignore_always_wins() {
    let rules = RuleSet::new(&strings(&["*.txt"]), &strings(&["keep.txt"]));
    assert!(rules.is_ignored("/r/drop.txt", "drop.txt"));
    assert!(!rules.is_ignored("/r/keep.txt", "keep.txt"));
}

#[test]
fn test_python_unignored_by_default() {
    let rules = RuleSet::new(&strings(&["scripts/**"]), &[]);
    assert!(!rules.is_ignored("/r/scripts/run.py", "scripts/run.py"));
    assert!(rules.is_ignored("/r/scripts/run.sh", "scripts/run.sh"));
}

#[test]
fn test_dependency_unignore_drops_python_default() {
    let rules = RuleSet::new(&strings(&["scripts/**"]), &strings(&["**/site-packages/mylib/**"]));
    assert!(rules.is_ignored("/r/scripts/run.py", "scripts/run.py"));
    assert!(!rules.is_ignored(
        "/r/venv/lib/site-packages/mylib/core.py",
        "venv/lib/site-packages/mylib/core.py"
    ));
}

#[test]
fn test_exclusion_file_normalization() {
    let rules = parse_exclusion_rules("# comment\n\ngenerated/\n/local.cfg\n*.log\n**/keep/**\n");
    assert_eq!(rules.len(), 4);
    assert_eq!(rules[3], "**/keep/**");

    let mut set = RuleSet::builtin();
    set.extend_ignore(rules.into_iter().map(IgnoreRule::user));
    assert!(set.is_ignored("/r/a/generated/out.rs", "a/generated/out.rs"));
    assert!(set.is_ignored("/r/local.cfg", "local.cfg"));
    assert!(set.is_ignored("/r/deep/run.log", "deep/run.log"));
}

#[test]
fn test_first_exclusion_file_wins() {
    let repo = TestRepo::with_files(&[
        (EXCLUSION_FILE_NAMES[0], "*.md\n"),
        (EXCLUSION_FILE_NAMES[1], "*.txt\n"),
    ]);

    let mut rules = RuleSet::builtin();
    assert_eq!(rules.load_exclusion_file(repo.path()), 1);
    assert!(rules.is_ignored("/r/README.md", "README.md"));
    assert!(!rules.is_ignored("/r/notes.txt", "notes.txt"));
}

#[test]
fn test_binary_classification() {
    let repo = TestRepo::with_files(&[("script.py", "print('x')\n"), ("data.txt", "text\n")]);
    let blob = repo.write_bytes("blob.dat", b"abc\x00def");
    let nul_python = repo.write_bytes("odd.py", b"x = 1\x00");
    let exe = repo.write_bytes("tool.exe", b"MZ but no nul");

    let classifier = BinaryClassifier::default();
    assert!(!classifier.is_binary(&repo.path().join("script.py")));
    assert!(!classifier.is_binary(&repo.path().join("data.txt")));
    assert!(classifier.is_binary(&blob));
    assert!(!classifier.is_binary(&nul_python));
    assert!(classifier.is_binary(&exe));
    assert!(classifier.is_binary(&repo.path().join("missing.dat")));
}
