use once_cell::sync::Lazy;
use regex::Regex;

static MARKDOWN_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^\s{0,3}(#{1,6})\s+(.+?)\s*#*\s*$").expect("Invalid markdown heading regex")
});

static CHAPTER_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:CHAPTER|Chapter)\s+\S+|(?:PART|Part|BOOK|Book)\s+(?:\d+|[IVXLCDM]+)\b)")
        .expect("Invalid chapter heading regex")
});

static SECTION_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"^(?:(?:SECTION|Section)\s+[0-9IVX]+(?:\.\d+)*\b|(\d+(?:\.\d+)+)\.?\s+\S)")
        .expect("Invalid section heading regex")
});

static CAPS_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Z][A-Z0-9 ,:'&\-]{3,79}$").expect("Invalid caps heading regex"));

/// Longest line still considered a heading
const MAX_HEADING_CHARS: usize = 80;
const MAX_HEADING_WORDS: usize = 12;

/// A heading line found in the working text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Heading {
    /// Byte offset of the start of the heading line
    pub offset: usize,
    /// 1 for chapters, 2+ for sections
    pub level: u8,
    pub title: String,
}

impl Heading {
    pub fn is_chapter(&self) -> bool {
        self.level <= 1
    }
}

/// Classify one line (without its line ending) as a heading.
///
/// Returns the level and the heading title.
pub fn classify_heading(line: &str) -> Option<(u8, &str)> {
    if let Some(caps) = MARKDOWN_HEADING.captures(line) {
        let level = caps.get(1).map_or(1, |m| m.as_str().len()) as u8;
        let title = caps.get(2).map_or("", |m| m.as_str());
        return Some((level, title));
    }

    let trimmed = line.trim();
    if trimmed.is_empty()
        || trimmed.len() > MAX_HEADING_CHARS
        || trimmed.split_whitespace().count() > MAX_HEADING_WORDS
        || trimmed.ends_with(',')
        || trimmed.ends_with(';')
    {
        return None;
    }

    if CHAPTER_HEADING.is_match(trimmed) {
        return Some((1, trimmed));
    }
    if let Some(caps) = SECTION_HEADING.captures(trimmed) {
        // "1.2.3 Title" nests one level per component
        let level = caps
            .get(1)
            .map_or(2, |m| m.as_str().split('.').count().clamp(2, 6));
        return Some((level as u8, trimmed));
    }
    if CAPS_HEADING.is_match(trimmed) && trimmed.chars().filter(|c| c.is_alphabetic()).count() >= 4 {
        return Some((2, trimmed));
    }
    None
}

/// Iterate `(offset, line)` pairs; `line` keeps its `\n`
pub fn lines_with_offsets(text: &str) -> impl Iterator<Item = (usize, &str)> + '_ {
    text.split_inclusive('\n').scan(0usize, |offset, line| {
        let start = *offset;
        *offset += line.len();
        Some((start, line))
    })
}

pub fn strip_line_ending(line: &str) -> &str {
    line.trim_end_matches(['\n', '\r'])
}

/// Chapter and section headings of a document, in offset order
#[derive(Debug, Clone, Default)]
pub struct Outline {
    headings: Vec<Heading>,
}

impl Outline {
    pub fn parse(text: &str) -> Self {
        let headings = lines_with_offsets(text)
            .filter_map(|(offset, line)| {
                classify_heading(strip_line_ending(line)).map(|(level, title)| Heading {
                    offset,
                    level,
                    title: title.trim().to_string(),
                })
            })
            .collect();
        Self { headings }
    }

    pub fn headings(&self) -> &[Heading] {
        &self.headings
    }

    /// Last heading in `(lower, upper]` accepted by `filter`
    pub fn last_heading_in(
        &self,
        lower: usize,
        upper: usize,
        filter: impl Fn(&Heading) -> bool,
    ) -> Option<&Heading> {
        let end = self.headings.partition_point(|h| h.offset <= upper);
        self.headings[..end]
            .iter()
            .rev()
            .take_while(|h| h.offset > lower)
            .find(|h| filter(*h))
    }

    /// Chapter and section headings that frame the span `[start, end)`.
    ///
    /// A heading in effect at `start` wins; otherwise the first one inside
    /// the span is used.
    pub fn context_for(&self, start: usize, end: usize) -> (Option<&Heading>, Option<&Heading>) {
        let split = self.headings.partition_point(|h| h.offset <= start);
        let (before, after) = self.headings.split_at(split);
        let inside = || after.iter().take_while(|h| h.offset < end);

        let chapter = before
            .iter()
            .rev()
            .find(|h| h.is_chapter())
            .or_else(|| inside().find(|h| h.is_chapter()));

        let chapter_offset = chapter.map_or(0, |h| h.offset);
        let section = before
            .iter()
            .rev()
            .take_while(|h| h.offset >= chapter_offset)
            .find(|h| !h.is_chapter())
            .or_else(|| inside().find(|h| !h.is_chapter()));

        (chapter, section)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify_markdown_levels() {
        assert_eq!(classify_heading("# Intro"), Some((1, "Intro")));
        assert_eq!(classify_heading("### Deep dive ###"), Some((3, "Deep dive")));
        assert_eq!(classify_heading("#hashtag"), None);
    }

    #[test]
    fn test_classify_chapters_and_sections() {
        assert_eq!(classify_heading("Chapter 3: Cells"), Some((1, "Chapter 3: Cells")));
        assert_eq!(classify_heading("PART IV"), Some((1, "PART IV")));
        assert_eq!(classify_heading("Section 2.1 Methods"), Some((2, "Section 2.1 Methods")));
        assert_eq!(classify_heading("1.2.3 Enzymes"), Some((3, "1.2.3 Enzymes")));
        assert_eq!(classify_heading("INTRODUCTION"), Some((2, "INTRODUCTION")));
    }

    #[test]
    fn test_prose_is_not_a_heading() {
        assert_eq!(classify_heading("Part of the problem is scale."), None);
        assert_eq!(classify_heading("The cell membrane regulates transport."), None);
        assert_eq!(classify_heading(""), None);
        assert_eq!(classify_heading("OK"), None);
    }

    #[test]
    fn test_outline_offsets() {
        let text = "# One\nbody\n## Two\nmore\n# Three\n";
        let outline = Outline::parse(text);
        let offsets: Vec<usize> = outline.headings().iter().map(|h| h.offset).collect();
        assert_eq!(offsets, vec![0, 11, 23]);
        assert_eq!(outline.headings()[1].level, 2);
    }

    #[test]
    fn test_last_heading_in_window() {
        let text = "# One\nbody\n## Two\nmore\n# Three\n";
        let outline = Outline::parse(text);
        let chapter = outline.last_heading_in(0, 30, Heading::is_chapter).unwrap();
        assert_eq!(chapter.title, "Three");
        // lower bound is exclusive
        assert!(outline.last_heading_in(23, 30, Heading::is_chapter).is_none());
        let section = outline.last_heading_in(0, 30, |h| !h.is_chapter()).unwrap();
        assert_eq!(section.title, "Two");
    }

    #[test]
    fn test_context_for_span() {
        let text = "# One\nbody\n## Two\nmore\n# Three\ntail\n";
        let outline = Outline::parse(text);

        let (chapter, section) = outline.context_for(18, 23);
        assert_eq!(chapter.unwrap().title, "One");
        assert_eq!(section.unwrap().title, "Two");

        // Section from the previous chapter does not leak into the next one
        let (chapter, section) = outline.context_for(23, text.len());
        assert_eq!(chapter.unwrap().title, "Three");
        assert!(section.is_none());
    }
}
