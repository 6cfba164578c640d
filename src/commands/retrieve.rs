//! `quire retrieve` - scored chunks of one chapter

use crate::cli::{Cli, OutputFormat, RetrieveArgs};
use quire_core::config::QuireConfig;
use quire_core::error::Result;
use quire_core::index::ChunkIndex;
use quire_core::store::ProjectStore;
use quire_core::text::truncate_chars;

/// Characters of chunk content shown per line in human output
const PREVIEW_CHARS: usize = 72;

pub fn execute(
    cli: &Cli,
    store: &ProjectStore,
    config: &QuireConfig,
    args: &RetrieveArgs,
) -> Result<()> {
    let mut index = ChunkIndex::new(store, store.index_dir(), config.index);
    let results = index.retrieve_scored(&args.project, &args.chapter, &args.query, args.limit);

    match cli.format {
        OutputFormat::Json => {
            let output: Vec<serde_json::Value> = results
                .iter()
                .map(|scored| -> Result<serde_json::Value> {
                    let mut value = serde_json::to_value(&scored.chunk)?;
                    value["score"] = serde_json::json!(scored.score);
                    Ok(value)
                })
                .collect::<Result<_>>()?;
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Human => {
            if results.is_empty() {
                if !cli.quiet {
                    println!("No chunks for chapter {}", args.chapter);
                }
                return Ok(());
            }
            for scored in &results {
                let chunk = &scored.chunk;
                println!("{} [{}] score={}", chunk.id, chunk.position, scored.score);
                let preview = chunk.content.replace('\n', " ");
                println!("  {}", truncate_chars(preview.trim(), PREVIEW_CHARS));
                if cli.verbose && !chunk.keywords.is_empty() {
                    println!("  keywords: {}", chunk.keywords.join(", "));
                }
            }
        }
    }
    Ok(())
}
