//! Sliding-window chapter segmentation

use super::types::{Chunk, ChunkPosition};
use crate::config::IndexConfig;
use crate::text::{extract_keywords, is_sentence_terminal};

/// A cut point must sit at least this far before the raw window end
const BOUNDARY_MARGIN: usize = 10;

/// Split `content` into overlapping windows of at most `chunk_size` chars.
///
/// A window that does not reach the end of the text is shortened to end just
/// after its last sentence terminal, provided that terminal lies strictly
/// inside `(start, start + chunk_size - 10)` and past the overlap region, so
/// every window advances. The next window starts `chunk_overlap` chars before
/// the previous cut.
pub fn split_into_chunks(content: &str, config: &IndexConfig) -> Vec<String> {
    let chars: Vec<char> = content.chars().collect();
    let len = chars.len();
    let chunk_size = config.chunk_size.max(1);

    if len <= chunk_size {
        return vec![content.to_string()];
    }

    let mut pieces = Vec::new();
    let mut start = 0;

    while start < len {
        let end = (start + chunk_size).min(len);
        let cut = if end < len {
            sentence_cut(&chars[start..end], chunk_size, config.chunk_overlap)
                .map_or(end, |rel| start + rel)
        } else {
            end
        };

        pieces.push(chars[start..cut].iter().collect());

        if cut >= len {
            break;
        }

        let actual_len = cut - start;
        start = if actual_len > config.chunk_overlap {
            cut - config.chunk_overlap
        } else {
            cut
        };
    }

    pieces
}

/// Relative cut position just past the last usable sentence terminal
fn sentence_cut(window: &[char], chunk_size: usize, overlap: usize) -> Option<usize> {
    let limit = chunk_size.saturating_sub(BOUNDARY_MARGIN);
    window
        .iter()
        .enumerate()
        .rev()
        .find(|&(i, &c)| i > 0 && i >= overlap && i < limit && is_sentence_terminal(c))
        .map(|(i, _)| i + 1)
}

/// Segment a chapter into chunks with ids, keywords and position labels
pub fn build_chunks(
    chapter_id: &str,
    title: &str,
    content: &str,
    config: &IndexConfig,
) -> Vec<Chunk> {
    let pieces = split_into_chunks(content, config);
    let total = pieces.len();

    pieces
        .into_iter()
        .enumerate()
        .map(|(ordinal, text)| Chunk {
            id: Chunk::make_id(chapter_id, ordinal),
            chapter_id: chapter_id.to_string(),
            chapter_title: title.to_string(),
            keywords: extract_keywords(&text),
            content: text,
            position: ChunkPosition::for_ordinal(ordinal, total),
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(chunk_size: usize, chunk_overlap: usize) -> IndexConfig {
        IndexConfig {
            chunk_size,
            chunk_overlap,
        }
    }

    /// Rebuild text from chunks, dropping the overlap each later chunk
    /// shares with the text rebuilt so far
    fn reassemble(pieces: &[String], overlap: usize) -> String {
        let mut out: Vec<char> = Vec::new();
        for (i, piece) in pieces.iter().enumerate() {
            let chars: Vec<char> = piece.chars().collect();
            if i == 0 {
                out.extend_from_slice(&chars);
                continue;
            }
            assert_eq!(out[out.len() - overlap..], chars[..overlap]);
            out.extend_from_slice(&chars[overlap..]);
        }
        out.into_iter().collect()
    }

    #[test]
    fn test_short_content_single_chunk() {
        let chunks = build_chunks("ch1", "Intro", "A short chapter.", &IndexConfig::default());
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].position, ChunkPosition::Start);
        assert_eq!(chunks[0].id, "ch1-chunk-0");
        assert_eq!(chunks[0].content, "A short chapter.");
    }

    #[test]
    fn test_exactly_chunk_size_is_single_chunk() {
        let content = "x".repeat(50);
        assert_eq!(split_into_chunks(&content, &config(50, 10)).len(), 1);
    }

    #[test]
    fn test_raw_windows_without_terminals() {
        let content: String = ('a'..='z').cycle().take(250).collect();
        let pieces = split_into_chunks(&content, &config(100, 20));

        // Windows start at 0, 80, 160 and the last reaches the end
        assert_eq!(pieces.len(), 3);
        assert_eq!(pieces[0].chars().count(), 100);
        assert_eq!(pieces[1].chars().count(), 100);
        assert_eq!(pieces[2].chars().count(), 90);
        assert!(pieces[1].starts_with(&pieces[0][80..]));
        assert_eq!(reassemble(&pieces, 20), content);
    }

    #[test]
    fn test_cuts_at_last_sentence_terminal() {
        // Terminal at index 49 inside a 100-char window
        let mut content = "a".repeat(49);
        content.push('.');
        content.push_str(&"b".repeat(120));

        let pieces = split_into_chunks(&content, &config(100, 20));
        assert_eq!(pieces[0].chars().count(), 50);
        assert!(pieces[0].ends_with('.'));
        // The terminal reappears inside the overlap and is not reused as a cut
        assert_eq!(pieces[1].chars().count(), 100);
        assert!(pieces[1].starts_with(&"a".repeat(19)));
        assert_eq!(reassemble(&pieces, 20), content);
    }

    #[test]
    fn test_terminal_in_margin_is_ignored() {
        // Terminal at index 95, inside the last 10 chars of the window
        let mut content = "a".repeat(95);
        content.push('.');
        content.push_str(&"b".repeat(100));

        let pieces = split_into_chunks(&content, &config(100, 20));
        assert_eq!(pieces[0].chars().count(), 100);
    }

    #[test]
    fn test_full_width_terminals() {
        let mut content = "字".repeat(30);
        content.push('。');
        content.push_str(&"文".repeat(100));

        let pieces = split_into_chunks(&content, &config(100, 10));
        assert_eq!(pieces[0].chars().count(), 31);
        assert!(pieces[0].ends_with('。'));
        assert_eq!(reassemble(&pieces, 10), content);
    }

    #[test]
    fn test_chunks_bounded_and_cover_content() {
        let sentence = "The tide rose over the old quay. Nobody expected it! Why now? ";
        let content = sentence.repeat(120);
        let cfg = config(500, 50);
        let pieces = split_into_chunks(&content, &cfg);

        assert!(pieces.len() > 1);
        for piece in &pieces {
            assert!(piece.chars().count() <= cfg.chunk_size);
        }
        assert_eq!(reassemble(&pieces, cfg.chunk_overlap), content);
    }

    #[test]
    fn test_position_labels() {
        let content: String = ('a'..='z').cycle().take(400).collect();
        let chunks = build_chunks("ch", "T", &content, &config(100, 20));

        assert!(chunks.len() > 2);
        assert_eq!(chunks[0].position, ChunkPosition::Start);
        assert_eq!(chunks.last().unwrap().position, ChunkPosition::End);
        for chunk in &chunks[1..chunks.len() - 1] {
            assert_eq!(chunk.position, ChunkPosition::Middle);
        }
    }

    #[test]
    fn test_two_chunks_start_end() {
        let content = "z".repeat(150);
        let chunks = build_chunks("ch", "T", &content, &config(100, 20));
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].position, ChunkPosition::Start);
        assert_eq!(chunks[1].position, ChunkPosition::End);
        assert_eq!(chunks[1].id, "ch-chunk-1");
    }

    #[test]
    fn test_chunk_keywords() {
        let chunks = build_chunks("ch", "T", "预算 budget plan ok", &IndexConfig::default());
        assert_eq!(chunks[0].keywords, vec!["预算", "budget", "plan"]);
    }
}
