use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Where a chunk sits inside its chapter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChunkPosition {
    Start,
    Middle,
    End,
}

impl ChunkPosition {
    /// Label for chunk `ordinal` out of `total`. The first chunk is always
    /// `Start`, including the only chunk of a one-chunk chapter.
    pub fn for_ordinal(ordinal: usize, total: usize) -> Self {
        if ordinal == 0 {
            ChunkPosition::Start
        } else if ordinal + 1 == total {
            ChunkPosition::End
        } else {
            ChunkPosition::Middle
        }
    }
}

impl fmt::Display for ChunkPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ChunkPosition::Start => write!(f, "start"),
            ChunkPosition::Middle => write!(f, "middle"),
            ChunkPosition::End => write!(f, "end"),
        }
    }
}

/// A bounded slice of chapter text with its keywords
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Chunk {
    /// `<chapterId>-chunk-<ordinal>`
    pub id: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub content: String,
    /// Insertion-ordered, duplicate-free
    pub keywords: Vec<String>,
    pub position: ChunkPosition,
}

impl Chunk {
    pub fn make_id(chapter_id: &str, ordinal: usize) -> String {
        format!("{chapter_id}-chunk-{ordinal}")
    }

    pub fn has_keyword(&self, keyword: &str) -> bool {
        self.keywords.iter().any(|k| k == keyword)
    }
}

/// One project's chunk sequences, keyed by chapter id. This is also the
/// persisted snapshot shape.
pub type ChapterChunks = BTreeMap<String, Vec<Chunk>>;

/// A retrieved chunk with its relevance score
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ScoredChunk {
    pub chunk: Chunk,
    pub score: u32,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexStats {
    pub total_chunks: usize,
    pub indexed_chapters: usize,
}
