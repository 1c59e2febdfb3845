use crate::text::{floor_char_boundary, last_word_boundary};

/// Words (lowercase, without the period) that end in `.` mid-sentence
const ABBREVIATIONS: &[&str] = &[
    "mr", "mrs", "ms", "dr", "prof", "sr", "jr", "st", "mt", "rev", "hon", "gen", "gov", "sen",
    "rep", "capt", "lt", "col", "sgt", "vs", "etc", "inc", "ltd", "corp", "dept", "approx", "fig",
    "vol", "pp", "cf", "jan", "feb", "mar", "apr", "jun", "jul", "aug", "sep", "sept", "oct",
    "nov", "dec", "ave", "blvd",
];

/// Trailing words that suggest the text was cut mid-thought
const INCOMPLETE_SENTENCE_INDICATORS: &[&str] = &[
    "a", "an", "the", "and", "or", "but", "nor", "so", "yet", "of", "to", "in", "on", "at", "by",
    "for", "from", "with", "into", "about", "than", "as", "that", "which", "who", "whom", "whose",
    "because", "if", "when", "while", "although", "is", "are", "was", "were",
];

const CLOSING_PUNCTUATION: &[char] = &['"', '\'', ')', ']', '}', '\u{201D}', '\u{2019}'];
const OPENING_PUNCTUATION: &[char] = &['"', '\'', '(', '[', '{', '\u{201C}', '\u{2018}'];

/// Offset just past the last real sentence terminator in `text`.
///
/// Periods after abbreviations (`Mr.`, `p.m.`), inside decimals (`3.50`) and
/// inside ellipses (`...`) are not terminators.
pub fn find_last_sentence_end(text: &str) -> Option<usize> {
    last_sentence_end_within(text, text.len())
}

/// Like [`find_last_sentence_end`] but only considers ends `<= limit`.
///
/// The character after each terminator is still read from the full text, so
/// a cut at `limit` cannot turn `3.` of `3.50` into a sentence end.
fn last_sentence_end_within(text: &str, limit: usize) -> Option<usize> {
    let limit = limit.min(text.len());
    (0..limit)
        .rev()
        .find(|&i| is_sentence_terminator(text, i))
        .map(|i| i + 1)
}

/// Best place to cut `text` so the left part is at most `max_length` bytes.
///
/// Prefers a sentence end, then a word boundary, then the raw limit.
pub fn find_best_split_point(text: &str, max_length: usize) -> usize {
    if text.len() <= max_length {
        return text.len();
    }

    let limit = floor_char_boundary(text, max_length);
    if let Some(end) = last_sentence_end_within(text, limit) {
        return end;
    }
    if let Some(boundary) = last_word_boundary(&text[..limit]) {
        return boundary;
    }
    limit
}

/// Whether `text` ends on a linguistically complete unit.
///
/// Empty and whitespace-terminated text count as complete, as does text
/// ending on `.`, `!` or `?`. Otherwise the trailing word decides.
pub fn is_valid_chunk(text: &str) -> bool {
    let Some(last) = text.chars().last() else {
        return true;
    };
    if last.is_whitespace() || matches!(last, '.' | '!' | '?') {
        return true;
    }

    let trailing = text
        .split_whitespace()
        .last()
        .unwrap_or("")
        .trim_matches(|c: char| !c.is_alphanumeric())
        .to_lowercase();

    !INCOMPLETE_SENTENCE_INDICATORS.contains(&trailing.as_str())
}

fn is_sentence_terminator(text: &str, i: usize) -> bool {
    let bytes = text.as_bytes();
    match bytes[i] {
        b'!' | b'?' => followed_by_break(text, i + 1),
        b'.' => {
            followed_by_break(text, i + 1)
                && !is_ellipsis(bytes, i)
                && !is_decimal_point(bytes, i)
                && !follows_abbreviation(text, i)
        }
        _ => false,
    }
}

fn followed_by_break(text: &str, next: usize) -> bool {
    match text[next..].chars().next() {
        None => true,
        Some(c) => c.is_whitespace() || CLOSING_PUNCTUATION.contains(&c),
    }
}

fn is_ellipsis(bytes: &[u8], i: usize) -> bool {
    (i > 0 && bytes[i - 1] == b'.') || bytes.get(i + 1) == Some(&b'.')
}

fn is_decimal_point(bytes: &[u8], i: usize) -> bool {
    i > 0
        && bytes[i - 1].is_ascii_digit()
        && bytes.get(i + 1).map_or(false, |b| b.is_ascii_digit())
}

fn follows_abbreviation(text: &str, period: usize) -> bool {
    let before = &text[..period];
    let word_start = last_word_boundary(before).unwrap_or(0);
    let word = before[word_start..].trim_start_matches(OPENING_PUNCTUATION);

    if word.is_empty() {
        return false;
    }

    // e.g / p.m / U.S
    if word.contains('.') {
        return true;
    }

    let mut chars = word.chars();
    if let (Some(c), None) = (chars.next(), chars.next()) {
        // Initials such as "J." in "J. Smith"
        return c.is_alphabetic();
    }

    // Capitalized two-letter forms such as "Co." or "No."
    let mut chars = word.chars();
    if let (Some(first), Some(second), None) = (chars.next(), chars.next(), chars.next()) {
        if first.is_uppercase() && second.is_alphabetic() {
            return true;
        }
    }

    ABBREVIATIONS.contains(&word.to_lowercase().as_str())
}
