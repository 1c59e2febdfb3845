use super::outline::{classify_heading, lines_with_offsets, strip_line_ending};
use crate::config::FilterConfig;
use regex::Regex;
use serde::Serialize;
use std::borrow::Cow;
use std::collections::HashSet;
use tracing::warn;

/// Longest heading title checked against the section markers
const MAX_MARKER_CHARS: usize = 60;

/// A span cut from the caller's text by trailing-matter filtering
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RemovedSection {
    /// Heading line that opened the section
    pub heading: String,
    /// Byte offset in the caller's original text
    pub start: usize,
    /// Exclusive byte offset in the caller's original text
    pub end: usize,
}

/// Text after trailing-matter filtering plus what was taken out
#[derive(Debug, Clone)]
pub struct FilteredText<'a> {
    pub text: Cow<'a, str>,
    pub removed: Vec<RemovedSection>,
}

impl FilteredText<'_> {
    pub fn removed_bytes(&self) -> usize {
        self.removed.iter().map(|r| r.end - r.start).sum()
    }
}

/// Detects index, appendix and bibliography material.
///
/// Works at two levels: whole sections keyed by their heading, and single
/// chunks whose vocabulary is dominated by reference keywords.
#[derive(Debug, Clone)]
pub struct TrailingMatterFilter {
    markers: Option<Regex>,
    keywords: HashSet<String>,
    density_threshold: f64,
    min_density_words: usize,
    count_numeric_tokens: bool,
}

impl TrailingMatterFilter {
    pub fn new(config: &FilterConfig) -> Self {
        Self {
            markers: build_marker_regex(&config.section_markers),
            keywords: config
                .density_keywords
                .iter()
                .map(|k| k.trim().to_lowercase())
                .filter(|k| !k.is_empty())
                .collect(),
            density_threshold: config.density_threshold,
            min_density_words: config.min_density_words,
            count_numeric_tokens: config.count_numeric_tokens,
        }
    }

    /// Level of the trailing-matter section this line opens, if any.
    ///
    /// Markdown headings keep their level; any other marker line opens a
    /// top-level section.
    fn marker_level(&self, line: &str) -> Option<u8> {
        let markers = self.markers.as_ref()?;
        let (level, title) = match classify_heading(line) {
            Some((level, title)) if line.trim_start().starts_with('#') => (level, title),
            _ => (1, line.trim()),
        };
        let title = title.trim();
        (!title.is_empty() && title.len() <= MAX_MARKER_CHARS && markers.is_match(title))
            .then_some(level)
    }

    /// Remove sections opened by a marker heading.
    ///
    /// A section runs until the next non-marker heading of equal or higher
    /// level, or the end of the text. Filtering already-filtered text
    /// removes nothing.
    ///
    /// A bare marker line (`References` on its own) opens a level-1
    /// section, so without a later chapter or `#` heading everything after
    /// it is removed, including lower-level CAPS headings.
    pub fn strip<'a>(&self, text: &'a str) -> FilteredText<'a> {
        let mut kept = String::new();
        let mut removed: Vec<RemovedSection> = Vec::new();
        let mut skip_level: Option<u8> = None;

        for (offset, line) in lines_with_offsets(text) {
            let content = strip_line_ending(line);

            if let Some(level) = self.marker_level(content) {
                if skip_level.is_none() {
                    removed.push(RemovedSection {
                        heading: content.trim().to_string(),
                        start: offset,
                        end: text.len(),
                    });
                }
                skip_level = Some(skip_level.map_or(level, |current| current.min(level)));
                continue;
            }

            if let Some(current) = skip_level {
                match classify_heading(content) {
                    Some((level, _)) if level <= current => {
                        if let Some(section) = removed.last_mut() {
                            section.end = offset;
                        }
                        skip_level = None;
                    }
                    _ => continue,
                }
            }

            kept.push_str(line);
        }

        if removed.is_empty() {
            return FilteredText {
                text: Cow::Borrowed(text),
                removed,
            };
        }

        FilteredText {
            text: Cow::Owned(kept),
            removed,
        }
    }

    /// Share of words in `text` that look like reference material
    pub fn reference_density(&self, text: &str) -> (usize, f64) {
        let mut total = 0usize;
        let mut hits = 0usize;

        for word in text.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            total += 1;
            let numeric = self.count_numeric_tokens && word.chars().all(|c| c.is_ascii_digit());
            if numeric || self.keywords.contains(&word.to_lowercase()) {
                hits += 1;
            }
        }

        if total == 0 {
            return (0, 0.0);
        }
        (total, hits as f64 / total as f64)
    }

    /// Whether a chunk is mostly index or bibliography vocabulary
    pub fn is_reference_dense(&self, text: &str) -> bool {
        let (words, density) = self.reference_density(text);
        words >= self.min_density_words && words > 0 && density >= self.density_threshold
    }
}

fn build_marker_regex(markers: &[String]) -> Option<Regex> {
    let alternatives: Vec<String> = markers
        .iter()
        .map(|m| m.trim())
        .filter(|m| !m.is_empty())
        .map(|m| {
            m.split_whitespace()
                .map(regex::escape)
                .collect::<Vec<_>>()
                .join(r"\s+")
        })
        .collect();

    if alternatives.is_empty() {
        return None;
    }

    // Optional leading number ("7.1"), optional identifier ("B", "IV"),
    // optional subtitle after a colon or dash
    let pattern = format!(
        r"(?i)^(?:\d+(?:\.\d+)*\.?\s+)?(?:{})(?:\s+[a-z0-9]{{1,4}})?\.?(?:\s*[:\-–—]\s*.*)?$",
        alternatives.join("|")
    );

    match Regex::new(&pattern) {
        Ok(regex) => Some(regex),
        Err(e) => {
            warn!(error = %e, "Section marker pattern rejected, trailing-matter filtering disabled");
            None
        }
    }
}
