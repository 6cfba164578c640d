//! Configuration type definitions

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::QuireError;

/// Top-level configuration, stored in `.quire/config.toml`
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct QuireConfig {
    /// Chapter chunking parameters
    #[serde(default)]
    pub index: IndexConfig,

    /// Context compression parameters
    #[serde(default)]
    pub compression: CompressionConfig,

    /// Model backend selection
    #[serde(default)]
    pub model: ModelConfig,
}

/// Chunking parameters for the chapter index
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Window size in characters
    #[serde(default = "default_chunk_size")]
    pub chunk_size: usize,

    /// Characters shared between consecutive chunks
    #[serde(default = "default_chunk_overlap")]
    pub chunk_overlap: usize,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            chunk_size: default_chunk_size(),
            chunk_overlap: default_chunk_overlap(),
        }
    }
}

/// Compression tier, ordered from least to most lossy
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompressionStrategy {
    /// Keep whole paragraphs up to the per-chapter cap
    #[default]
    Slice,
    /// Authored or synthesized chapter summaries
    Summary,
    /// A single core fact per chapter, at most three chapters
    Core,
}

impl CompressionStrategy {
    /// All tiers in ladder order
    pub const LADDER: [CompressionStrategy; 3] = [
        CompressionStrategy::Slice,
        CompressionStrategy::Summary,
        CompressionStrategy::Core,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CompressionStrategy::Slice => "slice",
            CompressionStrategy::Summary => "summary",
            CompressionStrategy::Core => "core",
        }
    }
}

impl fmt::Display for CompressionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CompressionStrategy {
    type Err = QuireError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "slice" => Ok(CompressionStrategy::Slice),
            "summary" => Ok(CompressionStrategy::Summary),
            "core" => Ok(CompressionStrategy::Core),
            other => Err(QuireError::invalid_value(
                "compression strategy",
                format!("{other} (expected: slice, summary, or core)"),
            )),
        }
    }
}

/// Size caps and token budget for the tiered compressor
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompressionConfig {
    #[serde(default = "default_max_project_context_chars")]
    pub max_project_context_chars: usize,

    /// Related chapters beyond this count are dropped before any tier runs
    #[serde(default = "default_max_related_chapters")]
    pub max_related_chapters: usize,

    #[serde(default = "default_max_glossary_chars")]
    pub max_glossary_chars: usize,

    #[serde(default = "default_max_chapter_chars")]
    pub max_chapter_chars: usize,

    /// First tier the ladder is allowed to return
    #[serde(default)]
    pub compression_strategy: CompressionStrategy,

    /// Upper bound on the estimated token count of the compressed bundle
    #[serde(default = "default_token_budget")]
    pub token_budget: usize,
}

impl Default for CompressionConfig {
    fn default() -> Self {
        Self {
            max_project_context_chars: default_max_project_context_chars(),
            max_related_chapters: default_max_related_chapters(),
            max_glossary_chars: default_max_glossary_chars(),
            max_chapter_chars: default_max_chapter_chars(),
            compression_strategy: CompressionStrategy::default(),
            token_budget: default_token_budget(),
        }
    }
}

/// Which model backend to construct
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BackendKind {
    /// Deterministic offline backend
    #[default]
    Mock,
    /// OpenAI-compatible chat completions endpoint
    Http,
}

/// Model backend configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelConfig {
    #[serde(default)]
    pub backend: BackendKind,

    /// Base URL, e.g. `http://localhost:11434/v1`
    #[serde(default = "default_endpoint")]
    pub endpoint: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_timeout_seconds")]
    pub timeout_seconds: u64,

    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

impl Default for ModelConfig {
    fn default() -> Self {
        Self {
            backend: BackendKind::default(),
            endpoint: default_endpoint(),
            model: default_model(),
            timeout_seconds: default_timeout_seconds(),
            temperature: default_temperature(),
        }
    }
}

fn default_chunk_size() -> usize {
    2000
}

fn default_chunk_overlap() -> usize {
    200
}

fn default_max_project_context_chars() -> usize {
    3000
}

fn default_max_related_chapters() -> usize {
    5
}

fn default_max_glossary_chars() -> usize {
    2000
}

fn default_max_chapter_chars() -> usize {
    4000
}

fn default_token_budget() -> usize {
    8000
}

fn default_endpoint() -> String {
    "http://localhost:11434/v1".to_string()
}

fn default_model() -> String {
    "qwen2.5:7b".to_string()
}

fn default_timeout_seconds() -> u64 {
    60
}

fn default_temperature() -> f32 {
    0.7
}
