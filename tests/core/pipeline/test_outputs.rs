//! Sink output and write failure handling

use komodo::core::config::Config;
use komodo::core::sink::{chunk_file_name, WriteFailurePolicy, AGGREGATE_FILE_NAME};
use komodo::core::types::ChunkingMode;
use komodo::{ChunkingPipeline, KomodoError};
use std::fs;
use std::path::Path;
use tempfile::TempDir;

use crate::common::{chunking_config, run_to_buffer, TestRepo};

fn file_config(out: &Path) -> Config {
    let mut config = chunking_config(ChunkingMode::ByteBound { max_bytes: 300 });
    config.output.stream = false;
    config.output.dir = out.to_path_buf();
    config
}

#[tokio::test]
async fn test_directory_sink_matches_stream() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let config = file_config(&out.path().join("chunks"));

    let stats = ChunkingPipeline::from_config(&config, repo.roots())
        .unwrap()
        .run()
        .await
        .unwrap();
    assert!(stats.chunks_emitted > 1);

    let mut joined = Vec::new();
    for index in 0..stats.chunks_emitted {
        let path = out.path().join("chunks").join(chunk_file_name(index));
        joined.extend(fs::read(&path).unwrap());
    }
    assert!(!out
        .path()
        .join("chunks")
        .join(chunk_file_name(stats.chunks_emitted))
        .exists());

    let stream_config = chunking_config(config.chunking_mode().unwrap());
    let (streamed, _) = run_to_buffer(&stream_config, repo.roots()).await;
    assert_eq!(joined, streamed);
}

#[tokio::test]
async fn test_aggregate_sink_matches_stream() {
    let repo = TestRepo::small();
    let out = TempDir::new().unwrap();
    let mut config = file_config(out.path());
    config.output.aggregate = true;

    ChunkingPipeline::from_config(&config, repo.roots())
        .unwrap()
        .run()
        .await
        .unwrap();

    let aggregated = fs::read(out.path().join(AGGREGATE_FILE_NAME)).unwrap();
    let stream_config = chunking_config(config.chunking_mode().unwrap());
    let (streamed, _) = run_to_buffer(&stream_config, repo.roots()).await;
    assert_eq!(aggregated, streamed);
}

#[tokio::test]
async fn test_output_inside_root_not_rechunked() {
    let repo = TestRepo::with_files(&[("a.txt", "first run input\n")]);
    let config = file_config(&repo.path().join("chunks"));
    let pipeline = ChunkingPipeline::from_config(&config, repo.roots()).unwrap();

    let first = pipeline.run().await.unwrap();
    let second = pipeline.run().await.unwrap();

    assert_eq!(first.files_collected, 1);
    assert_eq!(second.files_collected, 1);
    let chunk = fs::read_to_string(repo.path().join("chunks").join(chunk_file_name(0))).unwrap();
    assert!(!chunk.contains("chunk-0.txt"));
}

#[tokio::test]
async fn test_write_failures_with_fail_policy() {
    let repo = TestRepo::small();
    let blocker = TempDir::new().unwrap();
    let out = blocker.path().join("not-a-dir");
    fs::write(&out, "occupied").unwrap();

    let mut config = file_config(&out);
    config.output.on_write_error = WriteFailurePolicy::Fail;

    let err = ChunkingPipeline::from_config(&config, repo.roots())
        .unwrap()
        .run()
        .await
        .unwrap_err();

    match err {
        KomodoError::PartialWrite { failed, total } => {
            assert!(total > 0);
            assert_eq!(failed, total);
        }
        other => panic!("expected PartialWrite, got {other}"),
    }
    assert_eq!(
        KomodoError::PartialWrite {
            failed: 1,
            total: 1
        }
        .exit_code(),
        3
    );
}

#[tokio::test]
async fn test_write_failures_with_continue_policy() {
    let repo = TestRepo::small();
    let blocker = TempDir::new().unwrap();
    let out = blocker.path().join("not-a-dir");
    fs::write(&out, "occupied").unwrap();

    let mut config = file_config(&out);
    config.output.on_write_error = WriteFailurePolicy::Continue;

    let stats = ChunkingPipeline::from_config(&config, repo.roots())
        .unwrap()
        .run()
        .await
        .unwrap();

    assert!(stats.chunks_emitted > 0);
    assert_eq!(stats.write_failures, stats.chunks_emitted);
    assert_eq!(fs::read_to_string(&out).unwrap(), "occupied");
}
