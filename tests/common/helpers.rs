// Test helper functions

use komodo::core::chunk::frame::FILE_RULE_WIDTH;
use komodo::core::config::Config;
use komodo::core::pipeline::ChunkingPipeline;
use komodo::core::sink::StreamSink;
use komodo::core::types::{Chunk, ChunkingMode, RunStats};
use std::collections::BTreeMap;
use std::path::PathBuf;

/// Stream-mode configuration with a single chunking mode
#[allow(dead_code)] // Used in integration tests
pub fn chunking_config(mode: ChunkingMode) -> Config {
    let mut config = Config::default();
    config.chunking.select(mode);
    config.output.stream = true;
    config
}

/// Run a pipeline into memory and return the raw output
#[allow(dead_code)] // Used in integration tests
pub async fn run_to_buffer(config: &Config, roots: Vec<PathBuf>) -> (Vec<u8>, RunStats) {
    let pipeline = ChunkingPipeline::from_config(config, roots).unwrap();
    let mut sink = StreamSink::new(Vec::new());
    let stats = pipeline.run_with_sink(&mut sink).await.unwrap();
    (sink.into_inner(), stats)
}

/// Assemble chunks without writing them
#[allow(dead_code)] // Used in integration tests
pub async fn build_chunks(config: &Config, roots: Vec<PathBuf>) -> (Vec<Chunk>, RunStats) {
    let pipeline = ChunkingPipeline::from_config(config, roots).unwrap();
    pipeline.build_chunks().await.unwrap()
}

/// Chunk text without its banner
#[allow(dead_code)] // Used in integration tests
pub fn strip_banner(chunk: &Chunk) -> String {
    let text = chunk.text();
    let banner_end = text
        .match_indices("\n\n")
        .next()
        .map(|(i, _)| i + 2)
        .unwrap_or(0);
    text[banner_end..].to_string()
}

/// Content per file path, concatenated across chunks in order.
///
/// Assumes file contents never contain a file header rule.
#[allow(dead_code)] // Used in integration tests
pub fn file_contents(chunks: &[Chunk]) -> BTreeMap<String, String> {
    let rule = "=".repeat(FILE_RULE_WIDTH);
    let header_start = format!("{rule}\nFile: ");
    let mut files: BTreeMap<String, String> = BTreeMap::new();

    for chunk in chunks {
        let body = strip_banner(chunk);
        for section in body.split(&header_start).filter(|s| !s.is_empty()) {
            let (path, rest) = section.split_once('\n').unwrap();
            let content = rest
                .strip_prefix(&format!("{rule}\n\n"))
                .unwrap()
                .strip_suffix('\n')
                .unwrap();
            files.entry(path.to_string()).or_default().push_str(content);
        }
    }

    files
}
