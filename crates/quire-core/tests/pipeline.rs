//! End-to-end pipeline over a filesystem workspace:
//! chapter files → index → retrieve → pack → compress → prompt

use std::fs;
use std::path::Path;

use quire_core::assembler::ContextAssembler;
use quire_core::compression::TieredCompressor;
use quire_core::config::{CompressionConfig, CompressionStrategy, IndexConfig, QuireConfig};
use quire_core::generation::{render_prompt, ModelBackend};
use quire_core::index::{ChunkIndex, ChunkPosition};
use quire_core::store::{ProjectSource, ProjectStore};
use tempfile::TempDir;

fn write(path: &Path, content: &str) {
    fs::create_dir_all(path.parent().unwrap()).unwrap();
    fs::write(path, content).unwrap();
}

fn workspace() -> (TempDir, ProjectStore) {
    let dir = TempDir::new().unwrap();
    let store = ProjectStore::open(dir.path());
    let project = store.project_dir("novel");

    write(&project.join("project.md"), "# 港口\n目标：完成初稿\n闲谈\n");
    write(&project.join("glossary.md"), "码头：石砌的岸边\n");
    write(&project.join("outline.md"), "一、到达\n二、风暴\n");

    let mut body = String::from("# 到达\n\n");
    for i in 0..80 {
        body.push_str(&format!("第{i}段。渡轮又一次晚点了，港口的预算越来越紧张。\n\n"));
    }
    body.push_str("因此，港口必须改变。\n");
    write(&store.chapters_dir("novel").join("01.md"), &body);
    write(
        &store.chapters_dir("novel").join("02.md"),
        "---\nid: storm\n---\n# Storm\n\nThe storm broke over the quay.",
    );

    (dir, store)
}

fn small_index() -> IndexConfig {
    IndexConfig {
        chunk_size: 200,
        chunk_overlap: 20,
    }
}

#[test]
fn test_rebuild_and_retrieve_from_files() {
    let (_dir, store) = workspace();
    let mut index = ChunkIndex::new(&store, store.index_dir(), small_index());

    assert_eq!(index.rebuild_project_index("novel"), 2);

    let results = index.retrieve_scored("novel", "01", "预算", 5);
    assert_eq!(results.len(), 5);
    assert!(results.iter().all(|r| r.chunk.chapter_id == "01"));
    assert!(results[0].score >= results[4].score);
    assert!(results[0].chunk.content.contains("预算"));

    let storm = index.retrieve("novel", "storm", "", 10);
    assert_eq!(storm.len(), 1);
    assert_eq!(storm[0].chapter_title, "Storm");
    assert_eq!(storm[0].position, ChunkPosition::Start);
}

#[test]
fn test_persisted_index_round_trips() {
    let (_dir, store) = workspace();
    let mut first = ChunkIndex::new(&store, store.index_dir(), small_index());
    first.rebuild_project_index("novel");
    let before = first.chapter_chunks("novel", "01");

    let mut second = ChunkIndex::new(&store, store.index_dir(), small_index());
    let after = second.chapter_chunks("novel", "01");

    assert!(before.len() > 2);
    assert_eq!(before, after);
    assert_eq!(before.first().unwrap().position, ChunkPosition::Start);
    assert_eq!(before.last().unwrap().position, ChunkPosition::End);
}

#[test]
fn test_chunks_reconstruct_chapter() {
    let (_dir, store) = workspace();
    let chapter = store.chapter("novel", "01").unwrap().unwrap();
    let config = small_index();
    let chunks = quire_core::index::split_into_chunks(&chapter.body, &config);

    let mut rebuilt: Vec<char> = chunks[0].chars().collect();
    for chunk in &chunks[1..] {
        let chars: Vec<char> = chunk.chars().collect();
        assert!(chars.len() <= config.chunk_size);
        rebuilt.extend_from_slice(&chars[config.chunk_overlap..]);
    }
    assert_eq!(rebuilt.into_iter().collect::<String>(), chapter.body);
}

#[test]
fn test_pack_compress_and_prompt() {
    let (_dir, store) = workspace();
    let index = ChunkIndex::new(&store, store.index_dir(), small_index());
    let mut assembler = ContextAssembler::new(&store, index);

    let pack = assembler.pack_context("novel", "01");
    assert_eq!(pack.project_context, "# 港口\n目标：完成初稿");
    assert_eq!(pack.related_chapters.len(), 10);
    assert_eq!(pack.sources.len(), 1);
    assert_eq!(pack.sources[0].chunk_ids.len(), 10);

    let compressor = TieredCompressor::new(CompressionConfig {
        token_budget: 100,
        ..Default::default()
    });
    let assembled = assembler.assemble("novel", "01", &compressor);
    assert_ne!(assembled.compressed.strategy, CompressionStrategy::Slice);
    assert!(assembled.compressed.compression_ratio < 1.0);

    let prompt = render_prompt(&assembled.compressed, "续写第三章");
    assert!(prompt.contains("# Project\n# 港口"));
    assert!(prompt.ends_with("# Instruction\n续写第三章"));

    let backend = ModelBackend::from_config(QuireConfig::default().model);
    let output = backend.generate(&prompt).unwrap();
    assert!(output.ends_with("续写第三章"));
}

#[test]
fn test_tier_monotonicity_on_real_bundle() {
    let (_dir, store) = workspace();
    let index = ChunkIndex::new(&store, store.index_dir(), small_index());
    let mut assembler = ContextAssembler::new(&store, index);
    let pack = assembler.pack_context("novel", "01");
    let bundle = assembler.to_bundle("novel", &pack);

    let compressor = TieredCompressor::new(CompressionConfig {
        max_chapter_chars: 120,
        ..Default::default()
    });
    let slice = compressor.compress_at(&bundle, CompressionStrategy::Slice);
    let summary = compressor.compress_at(&bundle, CompressionStrategy::Summary);
    let core = compressor.compress_at(&bundle, CompressionStrategy::Core);

    assert!(core.estimated_tokens <= summary.estimated_tokens);
    assert!(summary.estimated_tokens <= slice.estimated_tokens);
    assert!(core.chapters.len() <= 3);
}

#[test]
fn test_config_file_drives_pipeline() {
    let (dir, store) = workspace();
    write(
        &dir.path().join(".quire/config.toml"),
        "[index]\nchunk_size = 500\nchunk_overlap = 50\n\n[compression]\ntoken_budget = 1\n",
    );
    let config = store.load_config().unwrap();
    assert_eq!(config.index.chunk_size, 500);
    assert_eq!(config.compression.max_chapter_chars, 4000);

    let index = ChunkIndex::new(&store, store.index_dir(), config.index);
    let mut assembler = ContextAssembler::new(&store, index);
    let compressor = TieredCompressor::new(config.compression);

    let assembled = assembler.assemble("novel", "01", &compressor);
    assert_eq!(assembled.compressed.strategy, CompressionStrategy::Core);
}
