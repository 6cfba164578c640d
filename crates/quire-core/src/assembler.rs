//! Context pack assembly
//!
//! Combines project artifacts with a chapter's retrieved chunks into a
//! [`ContextPack`], and turns a pack into the [`ContextBundle`] the
//! compressor consumes. Unreadable artifacts degrade to empty text.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::compression::clip::{contains_marker, filter_lines, is_heading};
use crate::compression::{CompressionResult, ContextBundle, RelatedChapter, TieredCompressor};
use crate::error::Result;
use crate::index::{Chunk, ChunkIndex};
use crate::store::{ChapterSource, ProjectSource};

/// Chunks pulled into a pack
pub const PACK_CHUNK_LIMIT: usize = 10;

/// Placeholder relevance attached to packed chunks; no scoring happens at
/// this stage
pub const DEFAULT_RELEVANCE: f64 = 0.8;

/// Project-metadata lines kept in a pack besides headings
const METADATA_MARKERS: &[&str] = &[
    "目标", "读者", "规模", "target", "goal", "reader", "audience", "scale",
];

/// A retrieved chunk with its relevance in `[0, 1]`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextChunk {
    #[serde(flatten)]
    pub chunk: Chunk,
    pub relevance: f64,
}

/// Chunk ids contributed by one chapter
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChunkSource {
    pub chapter_id: String,
    pub chunk_ids: Vec<String>,
}

/// Raw context for one target chapter
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextPack {
    pub project_context: String,
    pub related_chapters: Vec<ContextChunk>,
    pub glossary: String,
    pub outline: String,
    pub sources: Vec<ChunkSource>,
    pub generated_at: DateTime<Utc>,
}

/// A pack together with its compressed form
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct AssembledContext {
    pub pack: ContextPack,
    pub compressed: CompressionResult,
}

pub struct ContextAssembler<'a> {
    source: &'a dyn ProjectSource,
    index: ChunkIndex<'a>,
}

impl<'a> ContextAssembler<'a> {
    pub fn new(source: &'a dyn ProjectSource, index: ChunkIndex<'a>) -> Self {
        ContextAssembler { source, index }
    }

    pub fn index(&self) -> &ChunkIndex<'a> {
        &self.index
    }

    pub fn index_mut(&mut self) -> &mut ChunkIndex<'a> {
        &mut self.index
    }

    /// Build the raw context pack for `chapter_id`.
    ///
    /// Related chunks come from the target chapter alone, retrieved with an
    /// empty query, so they keep their chapter order.
    #[tracing::instrument(skip(self))]
    pub fn pack_context(&mut self, project_id: &str, chapter_id: &str) -> ContextPack {
        let metadata = read_or_empty("project metadata", self.source.project_metadata(project_id));
        let project_context = filter_lines(&metadata, |line| {
            is_heading(line) || contains_marker(line, METADATA_MARKERS)
        });
        let glossary = read_or_empty("glossary", self.source.glossary(project_id));
        let outline = read_or_empty("outline", self.source.outline(project_id));

        let related_chapters: Vec<ContextChunk> = self
            .index
            .retrieve(project_id, chapter_id, "", PACK_CHUNK_LIMIT)
            .into_iter()
            .map(|chunk| ContextChunk {
                chunk,
                relevance: DEFAULT_RELEVANCE,
            })
            .collect();
        let sources = group_sources(&related_chapters);

        tracing::debug!(chunks = related_chapters.len(), "packed context");

        ContextPack {
            project_context,
            related_chapters,
            glossary,
            outline,
            sources,
            generated_at: Utc::now(),
        }
    }

    /// Compressor input for a pack: one related entry per chunk. The owning
    /// chapter's authored summary goes on its first chunk only, and its word
    /// count only on a chunk that holds the whole chapter body.
    pub fn to_bundle(&self, project_id: &str, pack: &ContextPack) -> ContextBundle {
        let mut chapters: HashMap<&str, Option<ChapterSource>> = HashMap::new();
        let mut summarized: HashSet<&str> = HashSet::new();

        let related_chapters = pack
            .related_chapters
            .iter()
            .map(|ctx| {
                let chunk = &ctx.chunk;
                let chapter = chapters
                    .entry(chunk.chapter_id.as_str())
                    .or_insert_with(|| self.lookup_chapter(project_id, &chunk.chapter_id))
                    .as_ref();
                let summary = if summarized.insert(chunk.chapter_id.as_str()) {
                    chapter.and_then(|c| c.summary.clone())
                } else {
                    None
                };
                let word_count = chapter
                    .filter(|c| c.body == chunk.content)
                    .and_then(|c| c.word_count);
                RelatedChapter {
                    id: chunk.id.clone(),
                    chapter_id: chunk.chapter_id.clone(),
                    chapter_title: chunk.chapter_title.clone(),
                    content: chunk.content.clone(),
                    summary,
                    word_count,
                }
            })
            .collect();

        ContextBundle {
            project_context: pack.project_context.clone(),
            related_chapters,
            glossary: pack.glossary.clone(),
            outline: pack.outline.clone(),
        }
    }

    /// Pack, then compress with `compressor`'s current configuration
    pub fn assemble(
        &mut self,
        project_id: &str,
        chapter_id: &str,
        compressor: &TieredCompressor,
    ) -> AssembledContext {
        let pack = self.pack_context(project_id, chapter_id);
        let bundle = self.to_bundle(project_id, &pack);
        let compressed = compressor.compress_for_token_budget(&bundle);
        tracing::debug!(
            strategy = %compressed.strategy,
            estimated_tokens = compressed.estimated_tokens,
            "assembled context"
        );
        AssembledContext { pack, compressed }
    }

    fn lookup_chapter(&self, project_id: &str, chapter_id: &str) -> Option<ChapterSource> {
        self.source
            .chapter(project_id, chapter_id)
            .unwrap_or_else(|e| {
                tracing::warn!(chapter = chapter_id, error = %e, "failed to read chapter source");
                None
            })
    }
}

fn read_or_empty(what: &str, result: Result<String>) -> String {
    result.unwrap_or_else(|e| {
        tracing::warn!(artifact = what, error = %e, "failed to read artifact, using empty text");
        String::new()
    })
}

/// Group chunk ids by chapter, in first-seen chapter order
fn group_sources(chunks: &[ContextChunk]) -> Vec<ChunkSource> {
    let mut sources: Vec<ChunkSource> = Vec::new();
    for ctx in chunks {
        let chunk = &ctx.chunk;
        match sources.iter_mut().find(|s| s.chapter_id == chunk.chapter_id) {
            Some(source) => source.chunk_ids.push(chunk.id.clone()),
            None => sources.push(ChunkSource {
                chapter_id: chunk.chapter_id.clone(),
                chunk_ids: vec![chunk.id.clone()],
            }),
        }
    }
    sources
}
