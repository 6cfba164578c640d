//! Character-cap clipping for project context and glossary
//!
//! Over-cap text is first reduced to its structurally useful lines, then
//! hard-truncated. If the filter keeps nothing, the original text is
//! truncated instead.

use crate::text::{char_len, truncate_chars};

/// Project-context lines worth keeping besides headings
const PROJECT_MARKERS: &[&str] = &[
    "目标",
    "背景",
    "约束",
    "读者",
    "target",
    "objective",
    "goal",
    "background",
    "constraint",
    "reader",
];

pub fn clip_project_context(text: &str, max_chars: usize) -> String {
    clip(text, max_chars, |line| {
        is_heading(line) || contains_marker(line, PROJECT_MARKERS)
    })
}

/// Glossary entries are `term: definition` lines, ASCII or full-width colon
pub fn clip_glossary(text: &str, max_chars: usize) -> String {
    clip(text, max_chars, |line| line.contains([':', '：']))
}

fn clip(text: &str, max_chars: usize, keep: impl Fn(&str) -> bool) -> String {
    if char_len(text) <= max_chars {
        return text.to_string();
    }
    let filtered = filter_lines(text, keep);
    let source = if filtered.trim().is_empty() {
        text
    } else {
        filtered.as_str()
    };
    truncate_chars(source, max_chars)
}

/// Keep lines matching `keep`, joined by newlines
pub fn filter_lines(text: &str, keep: impl Fn(&str) -> bool) -> String {
    text.lines()
        .filter(|line| keep(line))
        .collect::<Vec<_>>()
        .join("\n")
}

/// Markdown heading line
pub fn is_heading(line: &str) -> bool {
    line.trim_start().starts_with('#')
}

/// Case-insensitive marker match
pub fn contains_marker(line: &str, markers: &[&str]) -> bool {
    let lower = line.to_lowercase();
    markers.iter().any(|m| lower.contains(m))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_within_cap_unchanged() {
        let text = "Anything at all\nwith lines";
        assert_eq!(clip_project_context(text, 100), text);
        assert_eq!(clip_glossary(text, 100), text);
    }

    #[test]
    fn test_project_context_keeps_headings_and_markers() {
        let text = "# Novel\nrandom chatter here\nGoal: finish draft\n背景：海港小镇\nmore chatter";
        let clipped = clip_project_context(text, 50);
        assert_eq!(clipped, "# Novel\nGoal: finish draft\n背景：海港小镇");
    }

    #[test]
    fn test_filtered_text_is_still_truncated() {
        let text = format!("# {}\nfiller", "H".repeat(40));
        let clipped = clip_project_context(&text, 10);
        assert_eq!(clipped.chars().count(), 10);
        assert!(clipped.starts_with("# HHH"));
    }

    #[test]
    fn test_empty_filter_falls_back_to_original() {
        let text = "x".repeat(30);
        assert_eq!(clip_glossary(&text, 12), "x".repeat(12));
    }

    #[test]
    fn test_glossary_keeps_definitions() {
        let text = "Harbor: the old port\nsee also\n灯塔：海边的塔\nmisc notes go here";
        let clipped = clip_glossary(text, 40);
        assert_eq!(clipped, "Harbor: the old port\n灯塔：海边的塔");
    }
}
