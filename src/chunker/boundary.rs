use super::chunk::BoundaryKind;
use super::outline::{Heading, Outline};
use crate::text::last_word_boundary;
use once_cell::sync::Lazy;
use regex::Regex;

static PARAGRAPH_BREAK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\n[ \t\r]*\n").expect("Invalid paragraph break regex"));

/// Best semantic split point in `(lower, upper]`.
///
/// Boundary kinds are tried in order (chapter, section, paragraph, word) and
/// the first kind present wins, taking its occurrence nearest to `upper`.
/// Both bounds must be char boundaries of `text`.
pub fn find_semantic_boundary(
    text: &str,
    outline: &Outline,
    lower: usize,
    upper: usize,
) -> Option<(usize, BoundaryKind)> {
    if lower >= upper {
        return None;
    }

    if let Some(heading) = outline.last_heading_in(lower, upper, Heading::is_chapter) {
        return Some((heading.offset, BoundaryKind::Chapter));
    }
    if let Some(heading) = outline.last_heading_in(lower, upper, |h| !h.is_chapter()) {
        return Some((heading.offset, BoundaryKind::Section));
    }

    let window = &text[lower..upper];
    if let Some(m) = PARAGRAPH_BREAK.find_iter(window).last() {
        return Some((lower + m.end(), BoundaryKind::Paragraph));
    }
    if let Some(boundary) = last_word_boundary(window) {
        return Some((lower + boundary, BoundaryKind::Word));
    }
    None
}
