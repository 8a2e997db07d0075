//! Tests for the chunk CLI command
//!
//! Tests the chunk command handler:
//! - Directory output with human and JSON summaries
//! - Dry runs leave the filesystem untouched
//! - Argument parsing and layering over the config
//! - Exit codes for configuration and write failures

use clap::Parser;
use komodo::cli::commands::chunk::{execute, ChunkArgs};
use komodo::cli::{exit_code, Cli, Commands, OutputFormat};
use komodo::core::sink::chunk_file_name;
use komodo::core::types::ChunkingMode;
use komodo::{Config, KomodoError};
use std::fs;
use tempfile::TempDir;

use crate::common::TestRepo;

fn args_for(repo: &TestRepo, out: &TempDir) -> ChunkArgs {
    ChunkArgs {
        dirs: repo.roots(),
        output_dir: Some(out.path().join("chunks")),
        ..Default::default()
    }
}

/// Test chunking into a directory (human format)
#[tokio::test]
async fn test_chunk_to_directory_human() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let args = ChunkArgs {
        max_bytes: Some(10_000),
        ..args_for(&repo, &out)
    };

    let result = execute(args, Config::default(), OutputFormat::Human).await;
    assert!(result.is_ok(), "Chunk should succeed: {:?}", result.err());

    let chunk = fs::read_to_string(out.path().join("chunks").join(chunk_file_name(0))).unwrap();
    assert!(chunk.starts_with(&"=".repeat(80)));
    assert!(chunk.contains("keep.py"));
}

/// Test chunking into a directory (JSON format)
#[tokio::test]
async fn test_chunk_to_directory_json() {
    let repo = TestRepo::modules(5);
    let out = TempDir::new().unwrap();
    let args = ChunkArgs {
        equal_chunks: Some(2),
        ..args_for(&repo, &out)
    };

    let result = execute(args, Config::default(), OutputFormat::Json).await;
    assert!(result.is_ok(), "Chunk (JSON) should succeed");
    assert!(out.path().join("chunks").join(chunk_file_name(1)).exists());
    assert!(!out.path().join("chunks").join(chunk_file_name(2)).exists());
}

/// Test aggregate output flag
#[tokio::test]
async fn test_chunk_aggregate() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let args = ChunkArgs {
        semantic_lines: Some(20),
        aggregate: true,
        ..args_for(&repo, &out)
    };

    execute(args, Config::default(), OutputFormat::Json)
        .await
        .unwrap();

    let whole = out.path().join("chunks").join("whole-chunk-output.txt");
    assert!(fs::read_to_string(whole).unwrap().contains("CHUNK 1"));
}

/// Test dry run writes nothing
#[tokio::test]
async fn test_chunk_dry_run() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let args = ChunkArgs {
        max_tokens: Some(100),
        dry_run: true,
        ..args_for(&repo, &out)
    };

    let result = execute(args, Config::default(), OutputFormat::Json).await;
    assert!(result.is_ok());
    assert!(!out.path().join("chunks").exists());
}

/// Test that a missing chunking mode is a configuration error
#[tokio::test]
async fn test_chunk_without_mode_fails() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();

    let err = execute(args_for(&repo, &out), Config::default(), OutputFormat::Human)
        .await
        .unwrap_err();
    assert_eq!(exit_code(err.as_ref()), 2);
}

/// Test that a blocked output directory exits with the partial-write status
#[tokio::test]
async fn test_chunk_write_failure_exit_code() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let blocked = out.path().join("blocked");
    fs::write(&blocked, "file, not dir").unwrap();

    let args = ChunkArgs {
        dirs: repo.roots(),
        max_bytes: Some(4096),
        output_dir: Some(blocked),
        on_write_error: Some("fail".to_string()),
        ..Default::default()
    };

    let err = execute(args, Config::default(), OutputFormat::Human)
        .await
        .unwrap_err();
    assert_eq!(exit_code(err.as_ref()), 3);
}

/// Test that the config file's mode yields to the command line
#[test]
fn test_apply_cli_mode_over_file_mode() {
    let mut config = Config::default();
    config.chunking.select(ChunkingMode::EqualWeight { n_chunks: 4 });
    config.output.stream = true;

    let args = ChunkArgs {
        max_tokens: Some(256),
        ignore: vec!["*.lock".to_string()],
        binary_ext: vec![".PSD".to_string(), "exe".to_string()],
        ..Default::default()
    };
    args.apply(&mut config).unwrap();

    assert_eq!(
        config.chunking_mode().unwrap(),
        ChunkingMode::TokenBound { max_tokens: 256 }
    );
    assert!(config.filter.ignore.contains(&"*.lock".to_string()));
    assert!(config.filter.binary_extensions.contains(&"psd".to_string()));
    assert_eq!(
        config
            .filter
            .binary_extensions
            .iter()
            .filter(|e| *e == "exe")
            .count(),
        1
    );
}

/// Test argument parsing through clap
#[test]
fn test_parse_chunk_command() {
    let cli = Cli::try_parse_from([
        "komodo",
        "--format",
        "json",
        "chunk",
        "src",
        "docs",
        "--max-bytes",
        "2048",
        "-p",
        "*.rs,10",
        "-i",
        "*.lock",
        "--stream",
    ])
    .unwrap();

    assert_eq!(cli.format, OutputFormat::Json);
    let Commands::Chunk(args) = cli.command else {
        panic!("expected chunk command");
    };
    assert_eq!(args.dirs.len(), 2);
    assert_eq!(args.max_bytes, Some(2048));
    assert_eq!(args.priority, vec!["*.rs,10"]);
    assert_eq!(args.ignore, vec!["*.lock"]);
    assert!(args.stream);
}

/// Test that the chunk command requires at least one directory
#[test]
fn test_parse_chunk_requires_dirs() {
    assert!(Cli::try_parse_from(["komodo", "chunk", "--max-bytes", "10"]).is_err());
}

/// Test exit code mapping for non-Komodo errors
#[test]
fn test_exit_code_for_foreign_error() {
    let io: Box<dyn std::error::Error> = Box::new(std::io::Error::other("boom"));
    assert_eq!(exit_code(io.as_ref()), 1);

    let config: Box<dyn std::error::Error> =
        Box::new(KomodoError::ConfigError("bad".to_string()));
    assert_eq!(exit_code(config.as_ref()), 2);
}
