//! Chapter source parsing
//!
//! A chapter file is plain text with an optional front-matter block. The block
//! opens with a line that is exactly `---` and closes at the next such line.
//! The body is everything after the block; the first body line starting with
//! `# ` is the chapter title.

use serde::{Deserialize, Serialize};
use std::path::Path;

/// Authored chapter summary, carried in front-matter
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuredSummary {
    #[serde(default, alias = "main_point", skip_serializing_if = "Option::is_none")]
    pub main_point: Option<String>,

    #[serde(default, alias = "key_points", skip_serializing_if = "Vec::is_empty")]
    pub key_points: Vec<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub conclusion: Option<String>,
}

impl StructuredSummary {
    /// True when no field carries text
    pub fn is_empty(&self) -> bool {
        self.main_point().is_none()
            && self.key_points.iter().all(|p| p.trim().is_empty())
            && self.conclusion().is_none()
    }

    /// Main point, ignoring blank values
    pub fn main_point(&self) -> Option<&str> {
        non_blank(self.main_point.as_deref())
    }

    pub fn conclusion(&self) -> Option<&str> {
        non_blank(self.conclusion.as_deref())
    }
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

/// Chapter front-matter; every field is optional
#[derive(Debug, Clone, Default, Deserialize)]
struct ChapterFrontmatter {
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    title: Option<String>,
    #[serde(default)]
    summary: Option<StructuredSummary>,
    #[serde(default, alias = "wordCount")]
    word_count: Option<usize>,
}

/// A parsed chapter source file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChapterSource {
    pub id: String,
    pub title: String,
    pub body: String,
    pub summary: Option<StructuredSummary>,
    pub word_count: Option<usize>,
}

impl ChapterSource {
    /// Parse a chapter file. `fallback_id` names the chapter when the
    /// front-matter does not; malformed front-matter is logged and ignored.
    pub fn parse(content: &str, fallback_id: &str) -> Self {
        let (frontmatter_text, body) = split_frontmatter(content);

        let frontmatter = match frontmatter_text {
            Some(yaml) if !yaml.trim().is_empty() => {
                serde_yaml::from_str::<ChapterFrontmatter>(yaml).unwrap_or_else(|e| {
                    tracing::warn!(chapter = fallback_id, error = %e, "ignoring malformed front-matter");
                    ChapterFrontmatter::default()
                })
            }
            _ => ChapterFrontmatter::default(),
        };

        let id = frontmatter
            .id
            .filter(|id| !id.trim().is_empty())
            .unwrap_or_else(|| fallback_id.to_string());

        let title = extract_title(body)
            .or(frontmatter.title.filter(|t| !t.trim().is_empty()))
            .unwrap_or_else(|| id.clone());

        ChapterSource {
            id,
            title,
            body: body.to_string(),
            summary: frontmatter.summary.filter(|s| !s.is_empty()),
            word_count: frontmatter.word_count,
        }
    }

    /// Parse using the file stem as the fallback id
    pub fn parse_file(content: &str, path: &Path) -> Self {
        let stem = path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_default();
        Self::parse(content, &stem)
    }
}

/// Split into (front-matter, body). Without a complete block the whole
/// content is the body.
pub fn split_frontmatter(content: &str) -> (Option<&str>, &str) {
    let trimmed = content.trim_start_matches(['\n', '\r', ' ', '\t']);
    let Some(after_open) = strip_delimiter_line(trimmed) else {
        return (None, content);
    };

    let mut offset = 0;
    for line in after_open.split_inclusive('\n') {
        if line.trim_end_matches(['\n', '\r']) == "---" {
            let frontmatter = &after_open[..offset];
            let body = after_open[offset + line.len()..].trim_start_matches(['\n', '\r']);
            return (Some(frontmatter), body);
        }
        offset += line.len();
    }

    (None, content)
}

fn strip_delimiter_line(text: &str) -> Option<&str> {
    let (first, rest) = match text.find('\n') {
        Some(pos) => (&text[..pos], &text[pos + 1..]),
        None => (text, ""),
    };
    (first.trim_end_matches('\r') == "---").then_some(rest)
}

/// First line starting with `# `, without the marker
pub fn extract_title(body: &str) -> Option<String> {
    body.lines()
        .find_map(|line| line.strip_prefix("# "))
        .map(|t| t.trim().to_string())
        .filter(|t| !t.is_empty())
}
