use serde::{Deserialize, Serialize};

use crate::config::CompressionStrategy;
use crate::store::StructuredSummary;

/// Raw, uncompressed context handed to the compressor
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContextBundle {
    pub project_context: String,
    pub related_chapters: Vec<RelatedChapter>,
    pub glossary: String,
    pub outline: String,
}

/// One related-chapter excerpt in a [`ContextBundle`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelatedChapter {
    pub id: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub content: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<StructuredSummary>,
    /// Authored length of the full chapter, when known
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub word_count: Option<usize>,
}

impl RelatedChapter {
    /// Length the compression ratio is measured against
    pub fn original_word_count(&self) -> usize {
        self.word_count
            .unwrap_or_else(|| crate::text::char_len(&self.content))
    }

    /// Authored summary, if it carries any text
    pub fn structured_summary(&self) -> Option<&StructuredSummary> {
        self.summary.as_ref().filter(|s| !s.is_empty())
    }
}

/// A related chapter after one compression tier
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressedChapter {
    pub id: String,
    pub chapter_id: String,
    pub chapter_title: String,
    pub content: String,
    pub original_word_count: usize,
    pub compressed_word_count: usize,
    pub compression_ratio: f64,
}

/// Output of a single compression call
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompressionResult {
    pub project_context: String,
    pub glossary: String,
    pub outline: String,
    pub chapters: Vec<CompressedChapter>,
    pub strategy: CompressionStrategy,
    pub total_chars: usize,
    pub estimated_tokens: usize,
    /// Compressed chapter chars over original chapter chars, 1 when there
    /// was no chapter content
    pub compression_ratio: f64,
}
