use crate::text::{ceil_char_boundary, floor_char_boundary};

/// Fixed-size `(start, end)` spans covering all of `text`.
///
/// No semantic search. Overlap is capped at half the window so every step
/// advances by at least half a window (and always by at least one char).
pub fn emergency_spans(text: &str, window: usize, overlap: usize) -> Vec<(usize, usize)> {
    let len = text.len();
    if len == 0 {
        return vec![(0, 0)];
    }

    let window = window.max(1);
    let overlap = overlap.min(window / 2);
    let mut spans = Vec::with_capacity(len / (window - overlap) + 1);
    let mut start: usize = 0;

    loop {
        let mut end = floor_char_boundary(text, start.saturating_add(window));
        if end <= start {
            end = ceil_char_boundary(text, start + 1);
        }
        spans.push((start, end));

        if end >= len {
            break;
        }

        let mut next = floor_char_boundary(text, end.saturating_sub(overlap));
        if next <= start {
            next = ceil_char_boundary(text, start + 1);
        }
        start = next;
    }

    spans
}
