//! `quire index`, `remove`, `stats` and `clear` - maintain the chunk index
//!
//! - `quire index <project>` - rebuild from every chapter source
//! - `quire index <project> --chapter <id>` - re-index one chapter

use crate::cli::{ChapterArgs, Cli, IndexArgs, OutputFormat, ProjectArgs};
use quire_core::config::QuireConfig;
use quire_core::error::{QuireError, Result};
use quire_core::index::ChunkIndex;
use quire_core::store::{ProjectSource, ProjectStore};

fn open_index<'a>(store: &'a ProjectStore, config: &QuireConfig) -> ChunkIndex<'a> {
    ChunkIndex::new(store, store.index_dir(), config.index)
}

pub fn execute_index(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &IndexArgs,
) -> Result<()> {
    let mut index = open_index(store, config);

    let Some(chapter_id) = &args.chapter else {
        let chapters = index.rebuild_project_index(&args.project);
        let stats = index.stats(&args.project);
        match cli.format {
            OutputFormat::Json => {
                let output = serde_json::json!({
                    "status": "ok",
                    "project": args.project,
                    "chapters_indexed": chapters,
                    "total_chunks": stats.total_chunks,
                });
                println!("{}", serde_json::to_string_pretty(&output)?);
            }
            OutputFormat::Human => {
                if !cli.quiet {
                    println!(
                        "Indexed {} chapters ({} chunks) in {}",
                        chapters, stats.total_chunks, args.project
                    );
                }
            }
        }
        return Ok(());
    };

    let chapter = store
        .chapter(&args.project, chapter_id)?
        .ok_or_else(|| QuireError::not_found("chapter", chapter_id))?;
    let chunks = index.index_chapter(&args.project, &chapter.id, &chapter.body, &chapter.title);

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "status": "ok",
                "project": args.project,
                "chapter": chapter.id,
                "chunks": chunks,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Indexed chapter {} ({} chunks)", chapter.id, chunks);
            }
        }
    }
    Ok(())
}

pub fn execute_remove(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &ChapterArgs,
) -> Result<()> {
    let mut index = open_index(store, config);
    let removed = index.remove_chapter_index(&args.project, &args.chapter);

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({
                "project": args.project,
                "chapter": args.chapter,
                "removed": removed,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                if removed {
                    println!("Removed chapter {} from the index", args.chapter);
                } else {
                    println!("Chapter {} was not indexed", args.chapter);
                }
            }
        }
    }
    Ok(())
}

pub fn execute_stats(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &ProjectArgs,
) -> Result<()> {
    let mut index = open_index(store, config);
    let stats = index.stats(&args.project);

    match cli.format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string_pretty(&stats)?);
        }
        OutputFormat::Human => {
            println!("Project: {}", args.project);
            println!("Indexed chapters: {}", stats.indexed_chapters);
            println!("Total chunks: {}", stats.total_chunks);
        }
    }
    Ok(())
}

pub fn execute_clear(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &ProjectArgs,
) -> Result<()> {
    let mut index = open_index(store, config);
    index.clear(&args.project);

    match cli.format {
        OutputFormat::Json => {
            let output = serde_json::json!({ "status": "ok", "project": args.project });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if !cli.quiet {
                println!("Cleared index for {}", args.project);
            }
        }
    }
    Ok(())
}
