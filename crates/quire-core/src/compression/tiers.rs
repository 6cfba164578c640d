//! Per-chapter reduction for each compression tier

use super::types::RelatedChapter;
use crate::config::CompressionStrategy;
use crate::store::StructuredSummary;
use crate::text::{char_len, first_sentence, split_paragraphs, truncate_chars};

pub const PARAGRAPH_SEPARATOR: &str = "\n\n";

/// Paragraphs whose presence marks a conclusion or key claim
const CORE_KEYWORDS: &[&str] = &["因此", "所以", "证明", "结论", "关键", "重要", "核心"];

/// Extra keyword paragraphs kept after the first in the core tier
const CORE_EXTRA_PARAGRAPHS: usize = 2;

/// Paragraphs synthesized summaries draw from
const SUMMARY_PARAGRAPHS: usize = 3;

/// Oversized paragraphs up to this share of the cap are skipped, larger
/// ones end accumulation
const SKIPPABLE_SHARE_PERCENT: usize = 30;

/// Chapter text for `strategy`. Each tier is capped at the length of the
/// tier before it, so lossier tiers never return more text. The cap drops
/// trailing parts whole and only cuts into the first part when it alone is
/// over.
pub fn reduce_chapter(
    chapter: &RelatedChapter,
    strategy: CompressionStrategy,
    max_chapter_chars: usize,
) -> String {
    let slice = slice_chapter(&chapter.content, max_chapter_chars);
    if strategy == CompressionStrategy::Slice {
        return slice;
    }
    let (parts, separator) = summary_parts(chapter);
    let summary = fit_parts(&parts, separator, char_len(&slice));
    if strategy == CompressionStrategy::Summary {
        return summary;
    }
    fit_parts(&core_parts(chapter), PARAGRAPH_SEPARATOR, char_len(&summary))
}

/// Longest prefix of `parts` whose join fits `max_chars`
fn fit_parts(parts: &[String], separator: &str, max_chars: usize) -> String {
    let mut kept = parts.len();
    while kept > 1 && char_len(&parts[..kept].join(separator)) > max_chars {
        kept -= 1;
    }
    truncate_chars(&parts[..kept].join(separator), max_chars)
}

/// Whole paragraphs in order while the running length (separators
/// included) stays within `max_chars`. Falls back to a hard truncation when
/// no paragraph fits.
pub fn slice_chapter(content: &str, max_chars: usize) -> String {
    let mut kept: Vec<&str> = Vec::new();
    let mut running = 0;

    for paragraph in split_paragraphs(content) {
        let len = char_len(paragraph);
        let added = if kept.is_empty() {
            len
        } else {
            len + PARAGRAPH_SEPARATOR.len()
        };

        if running + added <= max_chars {
            kept.push(paragraph);
            running += added;
        } else if len * 100 <= max_chars * SKIPPABLE_SHARE_PERCENT {
            continue;
        } else {
            break;
        }
    }

    if kept.is_empty() {
        return truncate_chars(content, max_chars);
    }
    kept.join(PARAGRAPH_SEPARATOR)
}

/// Authored summary when present, otherwise one synthesized from the
/// chapter's opening sentences
pub fn summarize_chapter(chapter: &RelatedChapter) -> String {
    let (parts, separator) = summary_parts(chapter);
    parts.join(separator)
}

fn summary_parts(chapter: &RelatedChapter) -> (Vec<String>, &'static str) {
    match chapter.structured_summary() {
        Some(summary) => (structured_summary_lines(summary), "\n"),
        None => (synthesized_sentences(&chapter.content), "。"),
    }
}

pub fn render_structured_summary(summary: &StructuredSummary) -> String {
    structured_summary_lines(summary).join("\n")
}

fn structured_summary_lines(summary: &StructuredSummary) -> Vec<String> {
    let mut lines = Vec::new();
    if let Some(main_point) = summary.main_point() {
        lines.push(format!("核心观点: {main_point}"));
    }
    let key_points: Vec<&str> = summary
        .key_points
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .collect();
    if !key_points.is_empty() {
        lines.push(format!("关键要点: {}", key_points.join("；")));
    }
    if let Some(conclusion) = summary.conclusion() {
        lines.push(format!("小结: {conclusion}"));
    }
    lines
}

/// First sentence of each of the first three paragraphs, joined with `。`
pub fn synthesize_summary(content: &str) -> String {
    synthesized_sentences(content).join("。")
}

fn synthesized_sentences(content: &str) -> Vec<String> {
    split_paragraphs(content)
        .into_iter()
        .take(SUMMARY_PARAGRAPHS)
        .map(first_sentence)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect()
}

/// The authored main point, or the first paragraph plus up to two later
/// paragraphs carrying a core keyword
pub fn core_chapter(chapter: &RelatedChapter) -> String {
    core_parts(chapter).join(PARAGRAPH_SEPARATOR)
}

fn core_parts(chapter: &RelatedChapter) -> Vec<String> {
    if let Some(main_point) = chapter.summary.as_ref().and_then(|s| s.main_point()) {
        return vec![main_point.to_string()];
    }

    let paragraphs = split_paragraphs(&chapter.content);
    let Some((first, rest)) = paragraphs.split_first() else {
        return Vec::new();
    };

    std::iter::once(*first)
        .chain(
            rest.iter()
                .copied()
                .filter(|p| CORE_KEYWORDS.iter().any(|k| p.contains(k)))
                .take(CORE_EXTRA_PARAGRAPHS),
        )
        .map(str::to_string)
        .collect()
}
