//! Tiered context compression
//!
//! A bundle under its token budget passes through with only the project
//! context and glossary clipped to their caps. Otherwise the ladder
//! slice → summary → core runs until a tier fits. Core is returned
//! unconditionally, even when it is still over budget.

pub mod clip;
pub mod tiers;
pub mod types;

use std::time::Instant;

use crate::config::{CompressionConfig, CompressionStrategy};
use crate::text::char_len;
use crate::trace_time;

pub use clip::{clip_glossary, clip_project_context};
pub use types::{CompressedChapter, CompressionResult, ContextBundle, RelatedChapter};

/// At most this many chapters survive the core tier
const CORE_MAX_CHAPTERS: usize = 3;

/// Size estimate: one token per two characters, rounded up
pub fn estimate_tokens(chars: usize) -> usize {
    chars.div_ceil(2)
}

/// Compressor holding a mutable configuration.
///
/// The configuration applies to every later call on this instance. Callers
/// that share an instance across threads wrap it in a mutex; callers that
/// don't need shared state use [`compress_for_token_budget`] directly.
#[derive(Debug, Clone, Default)]
pub struct TieredCompressor {
    config: CompressionConfig,
}

impl TieredCompressor {
    pub fn new(config: CompressionConfig) -> Self {
        TieredCompressor { config }
    }

    pub fn config(&self) -> &CompressionConfig {
        &self.config
    }

    pub fn config_mut(&mut self) -> &mut CompressionConfig {
        &mut self.config
    }

    pub fn set_config(&mut self, config: CompressionConfig) {
        self.config = config;
    }

    pub fn compress_for_token_budget(&self, bundle: &ContextBundle) -> CompressionResult {
        compress_for_token_budget(bundle, &self.config)
    }

    /// Run exactly one tier, skipping the budget checks
    pub fn compress_at(
        &self,
        bundle: &ContextBundle,
        strategy: CompressionStrategy,
    ) -> CompressionResult {
        let chapters = capped_chapters(bundle, &self.config);
        run_tier(bundle, chapters, &self.config, strategy)
    }
}

/// Fit `bundle` into `config.token_budget`, trying progressively lossier
/// tiers from `config.compression_strategy` onward.
#[tracing::instrument(skip_all, fields(budget = config.token_budget))]
pub fn compress_for_token_budget(
    bundle: &ContextBundle,
    config: &CompressionConfig,
) -> CompressionResult {
    let start = Instant::now();
    let chapters = capped_chapters(bundle, config);
    if chapters.len() < bundle.related_chapters.len() {
        tracing::debug!(
            dropped = bundle.related_chapters.len() - chapters.len(),
            "related chapters over cap"
        );
    }

    let raw_chars = char_len(&bundle.project_context)
        + char_len(&bundle.glossary)
        + char_len(&bundle.outline)
        + chapters.iter().map(|c| char_len(&c.content)).sum::<usize>();
    let raw_tokens = estimate_tokens(raw_chars);

    if raw_tokens <= config.token_budget {
        tracing::debug!(raw_tokens, "under budget");
        return pass_through(bundle, chapters, config);
    }

    for strategy in [CompressionStrategy::Slice, CompressionStrategy::Summary] {
        if strategy < config.compression_strategy {
            continue;
        }
        let result = run_tier(bundle, chapters, config, strategy);
        if result.estimated_tokens <= config.token_budget {
            trace_time!(start, "compress", strategy = strategy.as_str());
            return result;
        }
        tracing::debug!(
            %strategy,
            estimated_tokens = result.estimated_tokens,
            "tier over budget"
        );
    }

    let result = run_tier(bundle, chapters, config, CompressionStrategy::Core);
    if result.estimated_tokens > config.token_budget {
        tracing::debug!(
            estimated_tokens = result.estimated_tokens,
            "core tier still over budget"
        );
    }
    trace_time!(start, "compress", strategy = "core");
    result
}

fn capped_chapters<'b>(
    bundle: &'b ContextBundle,
    config: &CompressionConfig,
) -> &'b [RelatedChapter] {
    let cap = config.max_related_chapters.min(bundle.related_chapters.len());
    &bundle.related_chapters[..cap]
}

fn pass_through(
    bundle: &ContextBundle,
    chapters: &[RelatedChapter],
    config: &CompressionConfig,
) -> CompressionResult {
    let compressed = chapters
        .iter()
        .map(|chapter| {
            let len = char_len(&chapter.content);
            CompressedChapter {
                id: chapter.id.clone(),
                chapter_id: chapter.chapter_id.clone(),
                chapter_title: chapter.chapter_title.clone(),
                content: chapter.content.clone(),
                original_word_count: chapter.original_word_count(),
                compressed_word_count: len,
                compression_ratio: 1.0,
            }
        })
        .collect();

    let mut result = assemble_result(
        bundle,
        chapters,
        compressed,
        config,
        CompressionStrategy::Slice,
    );
    result.compression_ratio = 1.0;
    result
}

fn run_tier(
    bundle: &ContextBundle,
    chapters: &[RelatedChapter],
    config: &CompressionConfig,
    strategy: CompressionStrategy,
) -> CompressionResult {
    let selected = match strategy {
        CompressionStrategy::Core => {
            let keep = CORE_MAX_CHAPTERS.min(config.max_related_chapters);
            &chapters[..keep.min(chapters.len())]
        }
        _ => chapters,
    };

    let compressed = selected
        .iter()
        .map(|chapter| {
            let content = tiers::reduce_chapter(chapter, strategy, config.max_chapter_chars);
            compressed_chapter(chapter, content)
        })
        .collect();

    assemble_result(bundle, chapters, compressed, config, strategy)
}

fn compressed_chapter(chapter: &RelatedChapter, content: String) -> CompressedChapter {
    let original = chapter.original_word_count();
    let compressed = char_len(&content);
    CompressedChapter {
        id: chapter.id.clone(),
        chapter_id: chapter.chapter_id.clone(),
        chapter_title: chapter.chapter_title.clone(),
        content,
        original_word_count: original,
        compressed_word_count: compressed,
        compression_ratio: ratio(compressed, original),
    }
}

/// Totals over the compressed output. The aggregate ratio is measured
/// against every chapter under the cap, including ones a tier dropped.
fn assemble_result(
    bundle: &ContextBundle,
    considered: &[RelatedChapter],
    chapters: Vec<CompressedChapter>,
    config: &CompressionConfig,
    strategy: CompressionStrategy,
) -> CompressionResult {
    let project_context =
        clip_project_context(&bundle.project_context, config.max_project_context_chars);
    let glossary = clip_glossary(&bundle.glossary, config.max_glossary_chars);
    let outline = bundle.outline.clone();

    let chapter_chars: usize = chapters.iter().map(|c| char_len(&c.content)).sum();
    let total_chars =
        char_len(&project_context) + char_len(&glossary) + char_len(&outline) + chapter_chars;

    let original_total: usize = considered
        .iter()
        .map(RelatedChapter::original_word_count)
        .sum();
    let compressed_total: usize = chapters.iter().map(|c| c.compressed_word_count).sum();

    CompressionResult {
        project_context,
        glossary,
        outline,
        chapters,
        strategy,
        total_chars,
        estimated_tokens: estimate_tokens(total_chars),
        compression_ratio: ratio(compressed_total, original_total),
    }
}

fn ratio(compressed: usize, original: usize) -> f64 {
    if original == 0 {
        1.0
    } else {
        compressed as f64 / original as f64
    }
}
