//! Chapter chunk index
//!
//! Chapters are split into overlapping chunks with extracted keywords. Each
//! project's chunks live in memory and are mirrored to one snapshot file per
//! project after every mutation. Persistence and source-read failures never
//! surface as errors: they are logged and the index degrades to empty.

pub mod cache;
pub mod chunker;
pub mod types;

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Instant;

use crate::config::IndexConfig;
use crate::store::ProjectSource;
use crate::text::extract_keywords;
use crate::trace_time;

pub use cache::SnapshotStore;
pub use chunker::{build_chunks, split_into_chunks};
pub use types::{ChapterChunks, Chunk, ChunkPosition, IndexStats, ScoredChunk};

const TITLE_WEIGHT: u32 = 10;
const KEYWORD_WEIGHT: u32 = 5;
const CONTENT_WEIGHT: u32 = 1;

/// In-memory chunk index scoped to one workspace.
///
/// Mutations take `&mut self`, so concurrent writers must go through a single
/// owner (or a mutex around it).
pub struct ChunkIndex<'a> {
    source: &'a dyn ProjectSource,
    snapshots: SnapshotStore,
    config: IndexConfig,
    projects: HashMap<String, ChapterChunks>,
}

impl<'a> ChunkIndex<'a> {
    pub fn new(
        source: &'a dyn ProjectSource,
        index_dir: impl Into<PathBuf>,
        config: IndexConfig,
    ) -> Self {
        ChunkIndex {
            source,
            snapshots: SnapshotStore::new(index_dir),
            config,
            projects: HashMap::new(),
        }
    }

    pub fn config(&self) -> &IndexConfig {
        &self.config
    }

    /// Replace a chapter's chunks with a fresh segmentation of `content`.
    /// Returns the number of chunks produced.
    #[tracing::instrument(skip(self, content), fields(chars = content.chars().count()))]
    pub fn index_chapter(
        &mut self,
        project_id: &str,
        chapter_id: &str,
        content: &str,
        title: &str,
    ) -> usize {
        let chunks = build_chunks(chapter_id, title, content, &self.config);
        let count = chunks.len();
        self.loaded_or_empty(project_id)
            .insert(chapter_id.to_string(), chunks);
        self.persist(project_id);
        tracing::debug!(chunks = count, "indexed chapter");
        count
    }

    /// Drop a chapter's chunks. Returns whether the chapter was indexed.
    pub fn remove_chapter_index(&mut self, project_id: &str, chapter_id: &str) -> bool {
        let removed = self
            .loaded_or_empty(project_id)
            .remove(chapter_id)
            .is_some();
        if removed {
            self.persist(project_id);
        }
        removed
    }

    /// Top `limit` chunks of one chapter for `query`
    pub fn retrieve(
        &mut self,
        project_id: &str,
        chapter_id: &str,
        query: &str,
        limit: usize,
    ) -> Vec<Chunk> {
        self.retrieve_scored(project_id, chapter_id, query, limit)
            .into_iter()
            .map(|scored| scored.chunk)
            .collect()
    }

    /// Score every chunk of `chapter_id` and return the best `limit`, highest
    /// score first. Equal scores keep chunk order.
    #[tracing::instrument(skip(self))]
    pub fn retrieve_scored(
        &mut self,
        project_id: &str,
        chapter_id: &str,
        query: &str,
        limit: usize,
    ) -> Vec<ScoredChunk> {
        self.ensure_loaded(project_id);

        let Some(chunks) = self
            .projects
            .get(project_id)
            .and_then(|chapters| chapters.get(chapter_id))
        else {
            tracing::debug!("chapter not indexed");
            return Vec::new();
        };

        let query_keywords = extract_keywords(query);
        let mut scored: Vec<ScoredChunk> = chunks
            .iter()
            .map(|chunk| ScoredChunk {
                score: score_chunk(chunk, query, &query_keywords),
                chunk: chunk.clone(),
            })
            .collect();

        // sort_by is stable, so ties keep their original order
        scored.sort_by(|a, b| b.score.cmp(&a.score));
        scored.truncate(limit);
        scored
    }

    /// Re-index every chapter source of the project, discarding the previous
    /// in-memory state. Returns the number of chapters indexed.
    #[tracing::instrument(skip(self))]
    pub fn rebuild_project_index(&mut self, project_id: &str) -> usize {
        let start = Instant::now();
        let chapters = self.source.list_chapters(project_id).unwrap_or_else(|e| {
            tracing::warn!(error = %e, "failed to list chapters, rebuilding empty index");
            Vec::new()
        });

        let mut rebuilt = ChapterChunks::new();
        for chapter in &chapters {
            let chunks = build_chunks(&chapter.id, &chapter.title, &chapter.body, &self.config);
            rebuilt.insert(chapter.id.clone(), chunks);
        }
        let count = rebuilt.len();

        self.projects.insert(project_id.to_string(), rebuilt);
        self.persist(project_id);
        trace_time!(start, "rebuild_project_index", chapters = count);
        count
    }

    /// Chunk and chapter counts for a project
    pub fn stats(&mut self, project_id: &str) -> IndexStats {
        let chapters = self.loaded_or_empty(project_id);
        IndexStats {
            total_chunks: chapters.values().map(Vec::len).sum(),
            indexed_chapters: chapters.len(),
        }
    }

    /// Empty a project's index and persist the empty snapshot
    pub fn clear(&mut self, project_id: &str) {
        self.projects
            .insert(project_id.to_string(), ChapterChunks::new());
        self.persist(project_id);
    }

    /// Chunks currently held for a chapter, loading the snapshot if needed
    pub fn chapter_chunks(&mut self, project_id: &str, chapter_id: &str) -> Vec<Chunk> {
        self.loaded_or_empty(project_id)
            .get(chapter_id)
            .cloned()
            .unwrap_or_default()
    }

    /// Make the project available for retrieval: load its snapshot, or
    /// rebuild from sources when the snapshot is missing or unreadable.
    fn ensure_loaded(&mut self, project_id: &str) {
        if self.projects.contains_key(project_id) {
            return;
        }
        match self.snapshots.load(project_id) {
            Ok(Some(chapters)) => {
                self.projects.insert(project_id.to_string(), chapters);
            }
            Ok(None) => {
                tracing::debug!(project = project_id, "no snapshot, rebuilding");
                self.rebuild_project_index(project_id);
            }
            Err(e) => {
                tracing::warn!(project = project_id, error = %e, "unreadable snapshot, rebuilding");
                self.rebuild_project_index(project_id);
            }
        }
    }

    /// Project map for mutation. Loads an existing snapshot so earlier
    /// chapters are kept, but never triggers a rebuild.
    fn loaded_or_empty(&mut self, project_id: &str) -> &mut ChapterChunks {
        if !self.projects.contains_key(project_id) {
            let chapters = match self.snapshots.load(project_id) {
                Ok(Some(chapters)) => chapters,
                Ok(None) => ChapterChunks::new(),
                Err(e) => {
                    tracing::warn!(project = project_id, error = %e, "unreadable snapshot, starting empty");
                    ChapterChunks::new()
                }
            };
            self.projects.insert(project_id.to_string(), chapters);
        }
        self.projects.entry(project_id.to_string()).or_default()
    }

    fn persist(&self, project_id: &str) {
        let Some(chapters) = self.projects.get(project_id) else {
            return;
        };
        if let Err(e) = self.snapshots.save(project_id, chapters) {
            tracing::warn!(project = project_id, error = %e, "failed to persist index snapshot");
        }
    }
}

/// Title match (10), plus per query keyword: in chunk keywords (5) and
/// present in chunk content (1).
///
/// The title matches when it contains the whole query or the query contains
/// the title; an empty query scores 0 on every chunk.
fn score_chunk(chunk: &Chunk, query: &str, query_keywords: &[String]) -> u32 {
    let title = chunk.chapter_title.as_str();
    let title_hit = (!query.is_empty() && title.contains(query))
        || (!title.is_empty() && query.contains(title));

    let mut score = if title_hit { TITLE_WEIGHT } else { 0 };
    for keyword in query_keywords {
        if chunk.has_keyword(keyword) {
            score += KEYWORD_WEIGHT;
        }
        if chunk.content.contains(keyword.as_str()) {
            score += CONTENT_WEIGHT;
        }
    }
    score
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::{QuireError, Result};
    use crate::store::ChapterSource;
    use std::cell::Cell;
    use std::fs;
    use tempfile::tempdir;

    /// In-memory source that counts chapter listings
    #[derive(Default)]
    struct FakeSource {
        chapters: Vec<ChapterSource>,
        listings: Cell<usize>,
        fail: bool,
    }

    impl FakeSource {
        fn with(chapters: &[(&str, &str, &str)]) -> Self {
            FakeSource {
                chapters: chapters
                    .iter()
                    .map(|(id, title, body)| ChapterSource {
                        id: id.to_string(),
                        title: title.to_string(),
                        body: body.to_string(),
                        summary: None,
                        word_count: None,
                    })
                    .collect(),
                ..Default::default()
            }
        }
    }

    impl ProjectSource for FakeSource {
        fn project_metadata(&self, _: &str) -> Result<String> {
            Ok(String::new())
        }
        fn glossary(&self, _: &str) -> Result<String> {
            Ok(String::new())
        }
        fn outline(&self, _: &str) -> Result<String> {
            Ok(String::new())
        }
        fn list_chapters(&self, _: &str) -> Result<Vec<ChapterSource>> {
            self.listings.set(self.listings.get() + 1);
            if self.fail {
                return Err(QuireError::Other("disk gone".into()));
            }
            Ok(self.chapters.clone())
        }
    }

    fn small_config() -> IndexConfig {
        IndexConfig {
            chunk_size: 100,
            chunk_overlap: 20,
        }
    }

    #[test]
    fn test_scoring_scenario() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());
        index.index_chapter("p", "ch1", "We discussed the budget today.", "Intro");

        let results = index.retrieve_scored("p", "ch1", "budget, Intro", 5);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].score, 16);
    }

    #[test]
    fn test_empty_query_scores_zero_and_keeps_order() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), small_config());
        let content: String = ('a'..='z').cycle().take(400).collect();
        index.index_chapter("p", "ch1", &content, "Intro");

        let results = index.retrieve_scored("p", "ch1", "", 10);
        assert!(results.iter().all(|r| r.score == 0));
        let ids: Vec<_> = results.iter().map(|r| r.chunk.id.clone()).collect();
        let expected: Vec<_> = (0..ids.len()).map(|i| format!("ch1-chunk-{i}")).collect();
        assert_eq!(ids, expected);
    }

    #[test]
    fn test_retrieve_ranks_and_limits() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), small_config());
        let mut content = "x".repeat(150);
        content.push_str(" lighthouse keeper ");
        content.push_str(&"y".repeat(150));
        index.index_chapter("p", "ch1", &content, "Sea");

        let results = index.retrieve("p", "ch1", "lighthouse", 1);
        assert_eq!(results.len(), 1);
        assert!(results[0].content.contains("lighthouse"));
    }

    #[test]
    fn test_retrieve_is_stable() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), small_config());
        let content = "storm harbor quay. ".repeat(40);
        index.index_chapter("p", "ch1", &content, "Storm");

        let first = index.retrieve("p", "ch1", "harbor storm", 10);
        let second = index.retrieve("p", "ch1", "harbor storm", 10);
        assert_eq!(first, second);
    }

    #[test]
    fn test_retrieve_scoped_to_chapter() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());
        index.index_chapter("p", "ch1", "budget", "One");
        index.index_chapter("p", "ch2", "budget", "Two");

        let results = index.retrieve("p", "ch1", "budget", 10);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].chapter_id, "ch1");
        assert!(index.retrieve("p", "missing", "budget", 10).is_empty());
    }

    #[test]
    fn test_reindex_replaces_chunks() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), small_config());
        index.index_chapter("p", "ch1", &"a".repeat(400), "T");
        index.index_chapter("p", "ch1", "short now", "T");

        let chunks = index.chapter_chunks("p", "ch1");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].content, "short now");
        assert_eq!(index.stats("p").indexed_chapters, 1);
    }

    #[test]
    fn test_remove_and_clear() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());
        index.index_chapter("p", "ch1", "one", "A");
        index.index_chapter("p", "ch2", "two", "B");

        assert!(index.remove_chapter_index("p", "ch1"));
        assert!(!index.remove_chapter_index("p", "ch1"));
        assert_eq!(
            index.stats("p"),
            IndexStats {
                total_chunks: 1,
                indexed_chapters: 1
            }
        );

        index.clear("p");
        assert_eq!(index.stats("p"), IndexStats::default());
    }

    #[test]
    fn test_mutations_persist_and_reload() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        {
            let mut index = ChunkIndex::new(&source, dir.path(), small_config());
            index.index_chapter("p", "ch1", &"river bend. ".repeat(30), "River");
        }

        let mut reloaded = ChunkIndex::new(&source, dir.path(), small_config());
        let chunks = reloaded.retrieve("p", "ch1", "", 100);
        assert!(chunks.len() > 1);
        // Loaded from the snapshot, not rebuilt from the (empty) source
        assert_eq!(source.listings.get(), 0);
    }

    #[test]
    fn test_index_chapter_keeps_persisted_chapters() {
        let dir = tempdir().unwrap();
        let source = FakeSource::default();
        {
            let mut index = ChunkIndex::new(&source, dir.path(), small_config());
            index.index_chapter("p", "ch1", "first", "A");
        }
        let mut index = ChunkIndex::new(&source, dir.path(), small_config());
        index.index_chapter("p", "ch2", "second", "B");

        assert_eq!(index.stats("p").indexed_chapters, 2);
    }

    #[test]
    fn test_missing_snapshot_triggers_rebuild() {
        let dir = tempdir().unwrap();
        let source = FakeSource::with(&[("ch1", "Dawn", "Light over the ridge.")]);
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());

        let chunks = index.retrieve("p", "ch1", "", 10);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].chapter_title, "Dawn");
        assert_eq!(source.listings.get(), 1);
        assert!(dir.path().join("p.json").exists());

        // Loaded now; no second rebuild
        index.retrieve("p", "ch1", "", 10);
        assert_eq!(source.listings.get(), 1);
    }

    #[test]
    fn test_corrupt_snapshot_triggers_rebuild() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("p.json"), "[[[").unwrap();
        let source = FakeSource::with(&[("ch1", "Dawn", "Light.")]);
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());

        assert_eq!(index.retrieve("p", "ch1", "", 10).len(), 1);
        assert_eq!(source.listings.get(), 1);
    }

    #[test]
    fn test_failing_source_degrades_to_empty() {
        let dir = tempdir().unwrap();
        let source = FakeSource {
            fail: true,
            ..Default::default()
        };
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());

        assert!(index.retrieve("p", "ch1", "anything", 10).is_empty());
        assert_eq!(index.stats("p"), IndexStats::default());
    }

    #[test]
    fn test_rebuild_discards_previous_state() {
        let dir = tempdir().unwrap();
        let source = FakeSource::with(&[("ch2", "Two", "Second chapter.")]);
        let mut index = ChunkIndex::new(&source, dir.path(), IndexConfig::default());
        index.index_chapter("p", "stale", "old text", "Old");

        assert_eq!(index.rebuild_project_index("p"), 1);
        assert!(index.chapter_chunks("p", "stale").is_empty());
        assert_eq!(index.chapter_chunks("p", "ch2").len(), 1);
    }

    #[test]
    fn test_unwritable_snapshot_dir_is_not_fatal() {
        let dir = tempdir().unwrap();
        let blocker = dir.path().join("blocked");
        fs::write(&blocker, "a file, not a directory").unwrap();
        let source = FakeSource::default();
        let mut index = ChunkIndex::new(&source, &blocker, IndexConfig::default());

        assert_eq!(index.index_chapter("p", "ch1", "text", "T"), 1);
        assert_eq!(index.stats("p").total_chunks, 1);
    }
}
