//! Tests for CLI output formatting helpers
//!
//! Tests the output formatting utilities:
//! - Byte formatting (KB, MB, GB)
//! - Duration formatting (ms, s, m)
//! - JSON writing to an arbitrary writer

use komodo::cli::output::{format_bytes, format_duration, write_json};
use komodo::core::types::RunStats;

// =============================================================================
// format_bytes tests
// =============================================================================

/// Test byte formatting with various sizes
#[test]
fn test_format_bytes_various_sizes() {
    assert_eq!(format_bytes(0), "0 B");
    assert_eq!(format_bytes(1023), "1023 B");
    assert_eq!(format_bytes(1024), "1.0 KB");
    assert_eq!(format_bytes(1536), "1.5 KB");
    assert_eq!(format_bytes(1048576), "1.0 MB");
    assert_eq!(format_bytes(1610612736), "1.5 GB");
}

// =============================================================================
// format_duration tests
// =============================================================================

/// Test duration formatting across units
#[test]
fn test_format_duration_units() {
    assert_eq!(format_duration(0.0), "0ms");
    assert_eq!(format_duration(0.25), "250ms");
    assert_eq!(format_duration(1.5), "1.50s");
    assert_eq!(format_duration(59.99), "59.99s");
    assert_eq!(format_duration(90.0), "1m 30.0s");
}

// =============================================================================
// write_json tests
// =============================================================================

/// Test JSON output of run statistics
#[test]
fn test_write_json_run_stats() {
    let stats = RunStats {
        files_collected: 3,
        files_loaded: 2,
        files_failed: 1,
        chunks_emitted: 4,
        write_failures: 0,
        bytes_loaded: 2048,
        duration_ms: 12,
    };

    let mut out = Vec::new();
    write_json(&mut out, &stats).unwrap();

    let value: serde_json::Value = serde_json::from_slice(&out).unwrap();
    assert_eq!(value["files_loaded"], 2);
    assert_eq!(value["chunks_emitted"], 4);
    assert_eq!(value["bytes_loaded"], 2048);
    assert!(out.ends_with(b"\n"));
}
