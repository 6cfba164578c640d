//! Text processing utilities for keyword extraction and segmentation
//!
//! All lengths in this crate are counted in Unicode scalar values (chars),
//! so CJK and Latin text are measured the same way.

use regex::Regex;
use std::collections::HashSet;
use std::sync::OnceLock;
use tracing::warn;

/// Maximum keywords kept per text
pub const MAX_KEYWORDS: usize = 20;

/// Runs of 2-6 CJK ideographs
static CJK_RUN: OnceLock<Option<Regex>> = OnceLock::new();

/// Runs of 3 or more Latin letters
static LATIN_RUN: OnceLock<Option<Regex>> = OnceLock::new();

/// Blank-line paragraph boundary
static PARAGRAPH_BREAK: OnceLock<Option<Regex>> = OnceLock::new();

fn compile(name: &str, pattern: &str) -> Option<Regex> {
    match Regex::new(pattern) {
        Ok(re) => Some(re),
        Err(e) => {
            warn!(error = %e, regex = name, "Failed to compile regex");
            None
        }
    }
}

fn cjk_run() -> Option<&'static Regex> {
    CJK_RUN
        .get_or_init(|| compile("cjk", r"[\x{4e00}-\x{9fa5}]{2,6}"))
        .as_ref()
}

fn latin_run() -> Option<&'static Regex> {
    LATIN_RUN
        .get_or_init(|| compile("latin", r"[a-zA-Z]{3,}"))
        .as_ref()
}

fn paragraph_break() -> Option<&'static Regex> {
    PARAGRAPH_BREAK
        .get_or_init(|| compile("paragraph", r"\n\s*\n"))
        .as_ref()
}

/// Extract keywords: CJK runs first, then Latin words, deduplicated in
/// first-seen order and capped at [`MAX_KEYWORDS`].
pub fn extract_keywords(text: &str) -> Vec<String> {
    let mut seen = HashSet::new();
    let cjk = cjk_run().into_iter().flat_map(|re| re.find_iter(text));
    let latin = latin_run().into_iter().flat_map(|re| re.find_iter(text));
    cjk.chain(latin)
        .map(|m| m.as_str())
        .filter(|word| seen.insert(*word))
        .take(MAX_KEYWORDS)
        .map(str::to_string)
        .collect()
}

/// Sentence-ending punctuation, ASCII and full-width
pub fn is_sentence_terminal(c: char) -> bool {
    matches!(c, '.' | '!' | '?' | '。' | '！' | '？')
}

/// Split on blank lines; paragraphs are trimmed and empty ones dropped
pub fn split_paragraphs(text: &str) -> Vec<&str> {
    let Some(re) = paragraph_break() else {
        return Some(text.trim()).filter(|p| !p.is_empty()).into_iter().collect();
    };
    re.split(text)
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .collect()
}

/// Text before the first sentence terminal, trimmed
pub fn first_sentence(paragraph: &str) -> &str {
    match paragraph.find(is_sentence_terminal) {
        Some(pos) => paragraph[..pos].trim(),
        None => paragraph.trim(),
    }
}

pub fn char_len(text: &str) -> usize {
    text.chars().count()
}

/// Keep at most `max_chars` characters
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((byte_pos, _)) => text[..byte_pos].to_string(),
        None => text.to_string(),
    }
}
