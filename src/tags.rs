//! Tag extraction from note content and date-tag filtering.
//!
//! Tags are the tokens wrapped in double brackets (`[[cs]]`). A labelled tag
//! line of the form `***Tags:** [[cs]] [[networking]]` takes priority over
//! bracketed tokens found anywhere else in the document.

use crate::config::compile_regex;
use crate::error::ConfigError;
use regex::Regex;
use std::sync::OnceLock;

/// Matches the labelled tag line and captures everything from the first
/// bracketed token up to the end of that line.
fn tag_block_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| {
        Regex::new(r"(?s)\*\*\*Tags:\*\*\s*(\[\[.*?\]\].*?)(?:\n|$)")
            .expect("valid tag block regex")
    })
}

fn bracket_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"\[\[(.*?)\]\]").expect("valid bracket regex"))
}

/// Where the tags of a document were found.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TagSource {
    /// The labelled `***Tags:**` line.
    TagBlock,
    /// Bracketed tokens anywhere in the document.
    Inline,
}

/// Tags pulled out of one document, in file order with duplicates kept.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractedTags {
    pub tags: Vec<String>,
    pub source: TagSource,
}

/// Extract tags from document content.
///
/// When a `***Tags:**` line is present it alone decides: if its first `[[`
/// only closes on a later line, the line yields no tokens and the document
/// has no tags, even when bracketed tokens appear elsewhere. Otherwise every
/// bracketed token in the document counts. Returns `None` when no tags are
/// found. Unterminated brackets are never matched.
pub fn extract_tags(content: &str) -> Option<ExtractedTags> {
    let (tags, source) = match tag_block_regex().captures(content) {
        Some(block) => (bracketed(&block[1]), TagSource::TagBlock),
        None => (bracketed(content), TagSource::Inline),
    };

    if tags.is_empty() {
        None
    } else {
        Some(ExtractedTags { tags, source })
    }
}

fn bracketed(text: &str) -> Vec<String> {
    bracket_regex()
        .captures_iter(text)
        .map(|cap| cap[1].to_string())
        .collect()
}

/// Drops tags whose full text looks like a date.
#[derive(Debug, Clone)]
pub struct DateTagFilter {
    patterns: Vec<Regex>,
}

impl DateTagFilter {
    /// Compile a filter from regex sources. Patterns always match the whole
    /// tag, anchored or not.
    pub fn new<S: AsRef<str>>(patterns: &[S]) -> Result<Self, ConfigError> {
        let patterns = patterns
            .iter()
            .map(|p| compile_regex(&format!("^(?:{})$", p.as_ref())))
            .collect::<Result<Vec<_>, _>>()?;
        Ok(Self { patterns })
    }

    pub fn is_date(&self, tag: &str) -> bool {
        self.patterns.iter().any(|re| re.is_match(tag))
    }

    /// Split tags into (kept, ignored), preserving order in both.
    pub fn partition(&self, tags: &[String]) -> (Vec<String>, Vec<String>) {
        tags.iter().cloned().partition(|tag| !self.is_date(tag))
    }

    pub fn filter(&self, tags: &[String]) -> Vec<String> {
        self.partition(tags).0
    }
}

impl Default for DateTagFilter {
    fn default() -> Self {
        Self::new(&crate::config::DEFAULT_DATE_PATTERNS).expect("default date patterns compile")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tags(list: &[&str]) -> Vec<String> {
        list.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_tag_block_preferred_over_inline() {
        let content =
            "# Title\nSee [[other note]].\n***Tags:** [[cs]] [[2024-01-01]]\nMore [[noise]]\n";
        let extracted = extract_tags(content).unwrap();
        assert_eq!(extracted.source, TagSource::TagBlock);
        assert_eq!(extracted.tags, tags(&["cs", "2024-01-01"]));
    }

    #[test]
    fn test_tag_block_at_end_of_file() {
        let extracted = extract_tags("***Tags:** [[os]] [[linux]]").unwrap();
        assert_eq!(extracted.tags, tags(&["os", "linux"]));
    }

    #[test]
    fn test_tag_block_on_following_line() {
        let extracted = extract_tags("***Tags:**\n[[networking]] [[tcp]]\n").unwrap();
        assert_eq!(extracted.source, TagSource::TagBlock);
        assert_eq!(extracted.tags, tags(&["networking", "tcp"]));
    }

    #[test]
    fn test_tag_block_split_across_lines_has_no_tags() {
        let content = "***Tags:** [[cs\nnetworking]]\nSee [[tcp]] for more.\n";
        assert_eq!(extract_tags(content), None);
    }

    #[test]
    fn test_tag_block_keeps_duplicates() {
        let extracted = extract_tags("***Tags:** [[cs]] [[cs]]\n").unwrap();
        assert_eq!(extracted.tags, tags(&["cs", "cs"]));
    }

    #[test]
    fn test_tag_marker_is_case_sensitive() {
        let extracted = extract_tags("***tags:** [[cs]]\n").unwrap();
        assert_eq!(extracted.source, TagSource::Inline);
    }

    #[test]
    fn test_inline_fallback_in_file_order() {
        let content = "Links to [[rust]] and\nalso [[ownership]] then [[rust]].";
        let extracted = extract_tags(content).unwrap();
        assert_eq!(extracted.source, TagSource::Inline);
        assert_eq!(extracted.tags, tags(&["rust", "ownership", "rust"]));
    }

    #[test]
    fn test_no_tags() {
        assert_eq!(extract_tags("plain text, no markers"), None);
        assert_eq!(extract_tags(""), None);
    }

    #[test]
    fn test_unterminated_markers_ignored() {
        assert_eq!(extract_tags("broken [[tag and [single]"), None);
        let extracted = extract_tags("broken [[tag\nfine [[ok]]").unwrap();
        assert_eq!(extracted.tags, tags(&["ok"]));
    }

    #[test]
    fn test_date_filter_recognizes_four_shapes() {
        let filter = DateTagFilter::default();
        assert!(filter.is_date("2024-01-31"));
        assert!(filter.is_date("2024-01"));
        assert!(filter.is_date("31-01-2024"));
        assert!(filter.is_date("31-01-24"));

        assert!(!filter.is_date("2024"));
        assert!(!filter.is_date("2024-1-31"));
        assert!(!filter.is_date("2024/01/31"));
        assert!(!filter.is_date("notes-2024-01-31"));
        assert!(!filter.is_date("cs"));
    }

    #[test]
    fn test_date_only_tags_filter_to_empty() {
        let filter = DateTagFilter::default();
        let only_dates = tags(&["2024-01-01", "2023-12", "01-02-2024", "01-02-24"]);
        assert!(filter.filter(&only_dates).is_empty());
    }

    #[test]
    fn test_filter_preserves_order() {
        let filter = DateTagFilter::default();
        let (kept, ignored) = filter.partition(&tags(&["b", "2024-01-01", "a", "c"]));
        assert_eq!(kept, tags(&["b", "a", "c"]));
        assert_eq!(ignored, tags(&["2024-01-01"]));
    }

    #[test]
    fn test_unanchored_patterns_match_whole_tag() {
        let filter = DateTagFilter::new(&[r"\d{4}"]).unwrap();
        assert!(filter.is_date("2024"));
        assert!(!filter.is_date("x2024"));
    }

    #[test]
    fn test_invalid_date_pattern() {
        assert!(DateTagFilter::new(&["(unclosed"]).is_err());
    }
}
