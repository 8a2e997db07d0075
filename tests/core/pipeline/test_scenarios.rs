//! Whole-run behaviour of each chunking mode

use komodo::core::types::ChunkingMode;

use crate::common::{build_chunks, chunking_config, file_contents, run_to_buffer, TestRepo};

#[tokio::test]
async fn test_priority_files_first_and_ignored_files_absent() {
    let repo = TestRepo::small();
    let mut config = chunking_config(ChunkingMode::ByteBound { max_bytes: 10_000 });
    config.filter.priority_rules = vec!["*.py,10".to_string()];

    let (output, stats) = run_to_buffer(&config, repo.roots()).await;
    let output = String::from_utf8(output).unwrap();

    assert_eq!(stats.files_loaded, 4);
    assert_eq!(stats.files_failed, 0);
    assert!(output.find("return 'kept'").unwrap() < output.find("Plain notes").unwrap());
    assert!(!output.contains("repositoryformatversion"));
    assert!(!output.contains("module.exports"));
    assert!(!output.contains("ignored.bin"));
}

#[tokio::test]
async fn test_large_file_split_into_byte_slices() {
    let body = "abcdefg\n".repeat(448);
    assert_eq!(body.len(), 3584);
    let repo = TestRepo::with_files(&[("big.txt", body.as_str())]);
    let config = chunking_config(ChunkingMode::ByteBound { max_bytes: 1024 });

    let (chunks, stats) = build_chunks(&config, repo.roots()).await;

    assert_eq!(stats.chunks_emitted, 4);
    assert_eq!(chunks.len(), 4);
    let contents = file_contents(&chunks);
    assert_eq!(contents.len(), 1);
    assert_eq!(contents.values().next().unwrap(), &body);
}

#[tokio::test]
async fn test_equal_weight_balances_by_size() {
    let repo = TestRepo::with_files(&[
        ("a.txt", "a".repeat(100).as_str()),
        ("b.txt", "b".repeat(100).as_str()),
        ("c.txt", "c".repeat(100).as_str()),
    ]);
    let config = chunking_config(ChunkingMode::EqualWeight { n_chunks: 2 });

    let (chunks, _) = build_chunks(&config, repo.roots()).await;

    assert_eq!(chunks.len(), 2);
    let first = chunks[0].text();
    let second = chunks[1].text();
    assert!(first.contains("a.txt") && first.contains("c.txt"));
    assert!(second.contains("b.txt") && !second.contains("a.txt"));
}

#[tokio::test]
async fn test_semantic_functions_over_budget_stand_alone() {
    let code = "def first(x):\n    a = x\n    b = a + 1\n    c = b + 1\n    d = c + 1\n    return d\n\
                def second(y):\n    a = y\n    b = a * 2\n    c = b * 2\n    d = c * 2\n    return d\n";
    let repo = TestRepo::with_files(&[("funcs.py", code)]);
    let config = chunking_config(ChunkingMode::Semantic { max_units: 5 });

    let (chunks, _) = build_chunks(&config, repo.roots()).await;

    assert_eq!(chunks.len(), 2);
    assert!(chunks[0].text().contains("Function: first (lines 1-6)"));
    assert!(chunks[1].text().contains("Function: second (lines 7-12)"));
}

#[tokio::test]
async fn test_semantic_unparseable_source_emitted_whole() {
    let code = "def broken(:\n    pass\n";
    let repo = TestRepo::with_files(&[("broken.py", code)]);
    let config = chunking_config(ChunkingMode::Semantic { max_units: 50 });

    let (chunks, _) = build_chunks(&config, repo.roots()).await;

    assert_eq!(chunks.len(), 1);
    let text = chunks[0].text();
    assert!(text.contains(code));
    assert!(!text.contains("Function:"));
    assert!(!text.contains("GLOBAL CODE"));
}

#[tokio::test]
async fn test_output_independent_of_worker_count() {
    let repo = TestRepo::modules(40);
    let mut outputs = Vec::new();

    for workers in [1, 16] {
        let mut config = chunking_config(ChunkingMode::TokenBound { max_tokens: 40 });
        config.filter.priority_rules = vec!["module_02*,5".to_string()];
        config.loader.workers = workers;
        outputs.push(run_to_buffer(&config, repo.roots()).await.0);
    }

    assert!(!outputs[0].is_empty());
    assert_eq!(outputs[0], outputs[1]);
}

#[tokio::test]
async fn test_broken_pdf_does_not_stop_run() {
    let repo = TestRepo::with_files(&[
        ("broken.pdf", "definitely not a pdf"),
        ("z.txt", "after"),
    ]);
    let config = chunking_config(ChunkingMode::ByteBound { max_bytes: 4096 });

    let (chunks, stats) = build_chunks(&config, repo.roots()).await;

    assert_eq!(stats.files_loaded, 2);
    let all: String = chunks.iter().map(|c| c.text()).collect();
    assert!(all.contains("[Error processing document:"));
    assert!(all.contains("after"));
}

#[tokio::test]
async fn test_empty_tree_equal_weight_still_emits_n() {
    let repo = TestRepo::with_files(&[]);
    let config = chunking_config(ChunkingMode::EqualWeight { n_chunks: 3 });

    let (chunks, stats) = build_chunks(&config, repo.roots()).await;

    assert_eq!(stats.files_collected, 0);
    assert_eq!(chunks.len(), 3);
    assert!(chunks[2].text().contains("CHUNK 3 OF 3"));
}

#[tokio::test]
async fn test_enhancer_drops_duplicate_chunks() {
    let repo = TestRepo::with_files(&[("a.py", "def a():\n    return 1\n")]);
    let mut config = chunking_config(ChunkingMode::EqualWeight { n_chunks: 2 });
    config.enhance.enabled = true;

    // The same root twice yields the same file in both bins
    let roots = vec![repo.path().to_path_buf(), repo.path().to_path_buf()];
    let (chunks, stats) = build_chunks(&config, roots).await;

    assert_eq!(stats.files_loaded, 2);
    assert_eq!(chunks.len(), 1);
    let text = chunks[0].text();
    assert!(text.starts_with("RELEVANCE_SCORE: "));
    assert!(text.contains("CHUNK 1 OF 1"));
}

#[test]
fn test_dry_run_lists_files_without_chunking() {
    let repo = TestRepo::small();
    let mut config = chunking_config(ChunkingMode::ByteBound { max_bytes: 100 });
    config.filter.priority_rules = vec!["lib.*,3".to_string(), "*.py,10".to_string()];

    let pipeline = komodo::ChunkingPipeline::from_config(&config, repo.roots()).unwrap();
    let planned = pipeline.dry_run().unwrap();

    let names: Vec<String> = planned
        .iter()
        .map(|p| {
            p.path
                .strip_prefix(repo.path())
                .unwrap()
                .to_string_lossy()
                .replace('\\', "/")
        })
        .collect();
    assert_eq!(names, vec!["keep.py", "src/lib.rs", "README.md", "notes.txt"]);
}
