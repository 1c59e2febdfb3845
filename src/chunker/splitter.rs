use super::boundary::find_semantic_boundary;
use super::chunk::{BoundaryKind, Chunk, ChunkMetadata, ChunkingOutcome, ChunkingStatus};
use super::emergency::emergency_spans;
use super::filter::{FilteredText, RemovedSection, TrailingMatterFilter};
use super::outline::Outline;
use super::progress::{Progress, ProgressTracker, StallReason};
use super::{AGGRESSIVE_WINDOW_PERCENT, MAX_TITLE_CHARS};
use crate::config::ChunkingConfig;
use crate::estimator::{HeuristicEstimator, TokenEstimator};
use crate::sentence::{find_best_split_point, is_valid_chunk};
use crate::text::{ceil_char_boundary, floor_char_boundary};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

/// Byte range chosen for a chunk before its text is materialized
#[derive(Debug, Clone, Copy)]
struct Span {
    start: usize,
    end: usize,
    boundary: BoundaryKind,
}

enum SemanticPass {
    Finished(Vec<Span>),
    Stalled { spans: Vec<Span>, reason: StallReason },
}

/// Splits normalized documents into overlapping, token-budgeted chunks.
///
/// Holds only read-only configuration, so one instance can serve many
/// threads at once. Never fails: stalls degrade to emergency chunking or a
/// partial result, reported through [`ChunkingOutcome::status`].
pub struct DocumentChunker {
    config: ChunkingConfig,
    estimator: Arc<dyn TokenEstimator>,
    filter: TrailingMatterFilter,
}

impl DocumentChunker {
    pub fn new(config: ChunkingConfig, estimator: Arc<dyn TokenEstimator>) -> Self {
        let filter = TrailingMatterFilter::new(&config.filter);
        Self {
            config,
            estimator,
            filter,
        }
    }

    /// Default config with the character-ratio estimator
    pub fn with_defaults() -> Self {
        Self::new(
            ChunkingConfig::default(),
            Arc::new(HeuristicEstimator::default()),
        )
    }

    pub fn config(&self) -> &ChunkingConfig {
        &self.config
    }

    /// Characters per chunk window
    pub fn window_chars(&self) -> usize {
        let base = self
            .estimator
            .configured_safe_chunk_size()
            .min(self.config.max_single_chunk_chars);
        let window = if self.config.aggressive_chunking {
            base.saturating_mul(AGGRESSIVE_WINDOW_PERCENT) / 100
        } else {
            base
        };
        window.max(1)
    }

    /// Run only the trailing-matter filter
    pub fn filter_trailing_matter<'a>(&self, text: &'a str) -> FilteredText<'a> {
        self.filter.strip(text)
    }

    /// Chunk `text`; offsets refer to the filtered working text
    pub fn chunk_document(&self, text: &str, document_id: &str) -> Vec<Chunk> {
        self.chunk_with_outcome(text, document_id).chunks
    }

    /// Chunk `text` and report how the run went
    pub fn chunk_with_outcome(&self, text: &str, document_id: &str) -> ChunkingOutcome {
        if text.is_empty() {
            debug!(document_id, "Empty document, returning a single empty chunk");
            return self.single_chunk_outcome("", document_id, Vec::new());
        }

        let filtered = self.filter.strip(text);
        if !filtered.removed.is_empty() {
            info!(
                document_id,
                sections = filtered.removed.len(),
                bytes = filtered.removed_bytes(),
                "Removed trailing matter before chunking"
            );
        }
        let FilteredText {
            text: working,
            removed,
        } = filtered;
        let working: &str = &working;

        if working.is_empty() {
            warn!(document_id, "Nothing left to chunk after trailing-matter filtering");
            return self.single_chunk_outcome("", document_id, removed);
        }

        if !self
            .estimator
            .exceeds_token_limit(working, self.config.max_single_chunk_tokens)
        {
            debug!(document_id, chars = working.len(), "Document fits in a single chunk");
            return self.single_chunk_outcome(working, document_id, removed);
        }

        if working.len() > self.config.max_single_chunk_chars.saturating_mul(2) {
            warn!(
                document_id,
                chars = working.len(),
                max_single_chunk_chars = self.config.max_single_chunk_chars,
                "Document is much larger than a single chunk"
            );
        }

        let outline = Outline::parse(working);
        let window = self.window_chars();
        let overlap = self
            .estimator
            .estimate_max_chars_for_tokens(self.config.overlap_tokens);
        debug!(
            document_id,
            window,
            overlap,
            headings = outline.headings().len(),
            "Starting semantic chunking"
        );

        let (spans, status) = match self.semantic_spans(working, &outline, window, overlap) {
            SemanticPass::Finished(spans) if spans.len() == 1 => {
                if self.config.enable_emergency_chunking {
                    warn!(
                        document_id,
                        chars = working.len(),
                        "Oversized document produced one chunk, re-running with emergency chunking"
                    );
                    (
                        self.emergency(working, window, overlap),
                        ChunkingStatus::DegradedEmergency,
                    )
                } else {
                    error!(
                        document_id,
                        chars = working.len(),
                        "Oversized document left as a single chunk, emergency chunking disabled"
                    );
                    (spans, ChunkingStatus::DegradedSingleChunk)
                }
            }
            SemanticPass::Finished(spans) => (spans, ChunkingStatus::Complete),
            SemanticPass::Stalled { mut spans, reason } => {
                if self.config.enable_emergency_chunking {
                    warn!(
                        document_id,
                        ?reason,
                        produced = spans.len(),
                        "Semantic chunking stalled, falling back to emergency chunking"
                    );
                    (
                        self.emergency(working, window, overlap),
                        ChunkingStatus::DegradedEmergency,
                    )
                } else {
                    error!(
                        document_id,
                        ?reason,
                        produced = spans.len(),
                        "Semantic chunking stalled and emergency chunking is disabled, returning partial result"
                    );
                    if spans.is_empty() {
                        spans.push(Span {
                            start: 0,
                            end: working.len(),
                            boundary: BoundaryKind::Forced,
                        });
                    }
                    (spans, ChunkingStatus::DegradedStalled)
                }
            }
        };

        let (chunks, skipped) = self.build_chunks(working, &outline, &spans, document_id);
        info!(
            document_id,
            chunks = chunks.len(),
            skipped,
            status = ?status,
            "Chunking finished"
        );

        ChunkingOutcome {
            chunks,
            status,
            working_len: working.len(),
            removed_sections: removed,
            skipped_chunks: skipped,
        }
    }

    fn semantic_spans(
        &self,
        text: &str,
        outline: &Outline,
        window: usize,
        overlap: usize,
    ) -> SemanticPass {
        let len = text.len();
        let mut tracker = ProgressTracker::new(ProgressTracker::ceiling_for(len, window, overlap));
        let mut spans = Vec::new();
        let mut start = 0;

        loop {
            if let Progress::Emergency(reason) = tracker.begin_iteration() {
                return SemanticPass::Stalled { spans, reason };
            }

            let (end, boundary) = self.choose_end(text, outline, start, window, overlap);
            tracker.record_boundary(boundary == BoundaryKind::Forced);
            spans.push(Span {
                start,
                end,
                boundary,
            });

            if end >= len {
                debug!(iterations = tracker.iterations(), "Semantic pass reached the end");
                return SemanticPass::Finished(spans);
            }

            let proposed = floor_char_boundary(text, end.saturating_sub(overlap));
            let forced = proposed <= start;
            let next = if forced {
                ceil_char_boundary(text, start + 1)
            } else {
                proposed
            };

            if let Progress::Emergency(reason) = tracker.record_overlap(forced) {
                return SemanticPass::Stalled { spans, reason };
            }
            if tracker.state() == Progress::StalledOverlap {
                debug!(start, next, "Overlap did not advance, forcing the next start forward");
            }
            start = next;
        }
    }

    /// End offset for the chunk starting at `start`.
    ///
    /// Boundaries are only searched past `max(window / 2, overlap + 1)` so
    /// every semantic chunk also moves the next start forward.
    fn choose_end(
        &self,
        text: &str,
        outline: &Outline,
        start: usize,
        window: usize,
        overlap: usize,
    ) -> (usize, BoundaryKind) {
        let len = text.len();
        let mut candidate = floor_char_boundary(text, start.saturating_add(window));
        if candidate <= start {
            candidate = ceil_char_boundary(text, start + 1);
        }
        if candidate >= len {
            return (len, BoundaryKind::DocumentEnd);
        }

        let min_span = (window / 2).max(overlap.saturating_add(1));
        let lower = floor_char_boundary(text, start.saturating_add(min_span));
        find_semantic_boundary(text, outline, lower, candidate)
            .unwrap_or((candidate, BoundaryKind::Forced))
    }

    fn emergency(&self, text: &str, window: usize, overlap: usize) -> Vec<Span> {
        let budget = self
            .estimator
            .estimate_max_chars_for_tokens(self.config.max_single_chunk_tokens)
            .max(1);
        let mut window = window.min(budget);
        // Must yield at least two chunks for an oversized text
        if window >= text.len() {
            window = (text.len() + 1) / 2;
        }

        emergency_spans(text, window, overlap)
            .into_iter()
            .map(|(start, end)| Span {
                start,
                end,
                boundary: BoundaryKind::Emergency,
            })
            .collect()
    }

    fn build_chunks(
        &self,
        text: &str,
        outline: &Outline,
        spans: &[Span],
        document_id: &str,
    ) -> (Vec<Chunk>, usize) {
        let mut kept: Vec<Span> = Vec::with_capacity(spans.len());
        let mut skipped = 0;

        for span in spans {
            if self.filter.is_reference_dense(&text[span.start..span.end]) {
                warn!(
                    document_id,
                    start = span.start,
                    end = span.end,
                    "Skipping chunk dominated by index or reference vocabulary"
                );
                skipped += 1;
            } else {
                kept.push(*span);
            }
        }

        if kept.is_empty() {
            warn!(
                document_id,
                skipped, "Every chunk looked like reference material, keeping them all"
            );
            kept = spans.to_vec();
            skipped = 0;
        }

        let chunks = kept
            .iter()
            .enumerate()
            .map(|(index, span)| self.make_chunk(text, outline, *span, index, document_id))
            .collect();
        (chunks, skipped)
    }

    fn single_chunk_outcome(
        &self,
        text: &str,
        document_id: &str,
        removed: Vec<RemovedSection>,
    ) -> ChunkingOutcome {
        let outline = Outline::parse(text);
        let span = Span {
            start: 0,
            end: text.len(),
            boundary: BoundaryKind::Whole,
        };
        ChunkingOutcome {
            chunks: vec![self.make_chunk(text, &outline, span, 0, document_id)],
            status: ChunkingStatus::SingleChunk,
            working_len: text.len(),
            removed_sections: removed,
            skipped_chunks: 0,
        }
    }

    fn make_chunk(
        &self,
        text: &str,
        outline: &Outline,
        span: Span,
        index: usize,
        document_id: &str,
    ) -> Chunk {
        let slice = &text[span.start..span.end];
        let (chapter, section) = outline.context_for(span.start, span.end);
        let chapter_title = chapter.map(|h| h.title.clone());
        let section_title = section.map(|h| h.title.clone());
        let title = section_title
            .clone()
            .or_else(|| chapter_title.clone())
            .unwrap_or_else(|| leading_title(slice, index));

        Chunk {
            text: slice.to_string(),
            start_offset: span.start,
            end_offset: span.end,
            chunk_index: index,
            metadata: ChunkMetadata {
                document_id: document_id.to_string(),
                token_count: self.estimator.estimate_tokens(slice),
                word_count: slice.split_whitespace().count(),
                boundary: span.boundary,
                title,
                chapter_title,
                section_title,
                ends_cleanly: is_valid_chunk(slice),
            },
        }
    }
}

impl Default for DocumentChunker {
    fn default() -> Self {
        Self::with_defaults()
    }
}

/// First sentence of the first non-blank line, clipped for display
fn leading_title(text: &str, index: usize) -> String {
    let line = text
        .lines()
        .map(str::trim)
        .find(|l| !l.is_empty())
        .unwrap_or("");
    let cut = find_best_split_point(line, MAX_TITLE_CHARS);
    let title = line[..cut].trim();
    if title.is_empty() {
        format!("Chunk {}", index + 1)
    } else {
        title.to_string()
    }
}
