//! `quire pack` and `quire compress` - assemble context for a chapter

use crate::cli::{ChapterArgs, Cli, CompressArgs, OutputFormat};
use quire_core::assembler::ContextAssembler;
use quire_core::compression::{CompressionResult, TieredCompressor};
use quire_core::config::QuireConfig;
use quire_core::error::Result;
use quire_core::index::ChunkIndex;
use quire_core::store::ProjectStore;
use quire_core::text::char_len;

pub fn open_assembler<'a>(store: &'a ProjectStore, config: &QuireConfig) -> ContextAssembler<'a> {
    let index = ChunkIndex::new(store, store.index_dir(), config.index);
    ContextAssembler::new(store, index)
}

pub fn execute_pack(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &ChapterArgs,
) -> Result<()> {
    let mut assembler = open_assembler(store, config);
    let pack = assembler.pack_context(&args.project, &args.chapter);

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&pack)?);
        }
        OutputFormat::Human => {
            println!("Context pack for {}/{}", args.project, args.chapter);
            println!("  project context: {} chars", char_len(&pack.project_context));
            println!("  glossary: {} chars", char_len(&pack.glossary));
            println!("  outline: {} chars", char_len(&pack.outline));
            println!("  related chunks: {}", pack.related_chapters.len());
            for source in &pack.sources {
                println!("    {}: {}", source.chapter_id, source.chunk_ids.join(", "));
            }
            if cli.verbose {
                println!("  generated at: {}", pack.generated_at.to_rfc3339());
            }
        }
    }
    Ok(())
}

pub fn execute_compress(
    cli: &Cli,
    store: &ProjectStore,
    mut config: QuireConfig,
    args: &CompressArgs,
) -> Result<()> {
    if let Some(budget) = args.token_budget {
        config.compression.token_budget = budget;
    }
    if let Some(max_chars) = args.max_chapter_chars {
        config.compression.max_chapter_chars = max_chars;
    }
    if let Some(strategy) = args.strategy {
        config.compression.compression_strategy = strategy;
    }

    let compressor = TieredCompressor::new(config.compression);
    let mut assembler = open_assembler(store, &config);
    let assembled = assembler.assemble(&args.project, &args.chapter, &compressor);

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&assembled.compressed)?);
        }
        OutputFormat::Human => {
            print_compression_human(cli, &assembled.compressed, config.compression.token_budget);
        }
    }
    Ok(())
}

fn print_compression_human(cli: &Cli, result: &CompressionResult, budget: usize) {
    println!("Strategy: {}", result.strategy);
    println!(
        "Estimated tokens: {} (budget {})",
        result.estimated_tokens, budget
    );
    println!("Total chars: {}", result.total_chars);
    println!("Compression ratio: {:.2}", result.compression_ratio);

    for chapter in &result.chapters {
        println!(
            "  {} ({}): {} -> {} chars",
            chapter.id,
            chapter.chapter_title,
            chapter.original_word_count,
            chapter.compressed_word_count
        );
        if cli.verbose {
            for line in chapter.content.lines() {
                println!("    {}", line);
            }
        }
    }
}
