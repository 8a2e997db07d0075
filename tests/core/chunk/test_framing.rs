//! Framing format tests

use komodo::core::chunk::ChunkAssembler;
use komodo::core::types::{ChunkingMode, FileRecord};

fn rule(width: usize) -> String {
    "=".repeat(width)
}

#[test]
fn test_byte_bound_framing_exact() {
    let files = vec![
        FileRecord::new("a.txt", "alpha", 0),
        FileRecord::new("b.txt", "beta", 0),
    ];
    let chunks = ChunkAssembler::new(ChunkingMode::ByteBound { max_bytes: 10_000 }).assemble(&files);

    let expected = format!(
        "{r80}\nCHUNK 1\n{r80}\n\n\
         {r40}\nFile: a.txt\n{r40}\n\nalpha\n\
         {r40}\nFile: b.txt\n{r40}\n\nbeta\n",
        r80 = rule(80),
        r40 = rule(40)
    );
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].text(), expected);
}

#[test]
fn test_equal_weight_banner_carries_total() {
    let files = vec![FileRecord::new("a.txt", "alpha", 0)];
    let chunks = ChunkAssembler::new(ChunkingMode::EqualWeight { n_chunks: 3 }).assemble(&files);

    assert_eq!(chunks.len(), 3);
    for (i, chunk) in chunks.iter().enumerate() {
        let banner = format!("{}\nCHUNK {} OF 3\n{}\n\n", rule(80), i + 1, rule(80));
        assert!(chunk.text().starts_with(&banner));
    }
}

#[test]
fn test_empty_file_marker() {
    let files = vec![FileRecord::new("empty.txt", "", 0)];
    let chunks = ChunkAssembler::new(ChunkingMode::TokenBound { max_tokens: 50 }).assemble(&files);

    assert_eq!(chunks.len(), 1);
    assert!(chunks[0]
        .text()
        .ends_with("File: empty.txt\n========================================\n\n[Empty File]\n"));
}

#[test]
fn test_invalid_utf8_replaced_in_token_mode() {
    let files = vec![FileRecord::new("latin1.txt", b"caf\xe9 ok".to_vec(), 0)];
    let chunks = ChunkAssembler::new(ChunkingMode::TokenBound { max_tokens: 50 }).assemble(&files);

    assert!(chunks[0].text().contains("caf\u{fffd} ok"));
}
