use super::filter::RemovedSection;
use serde::{Deserialize, Serialize};

/// A slice of the working text ready for the generation pipeline.
///
/// Offsets are UTF-8 byte offsets into the *working* text, i.e. the input
/// after trailing-matter filtering. Callers that need positions in their
/// original document must map back through
/// [`ChunkingOutcome::removed_sections`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Chunk {
    pub text: String,
    /// Inclusive start offset
    pub start_offset: usize,
    /// Exclusive end offset; `end_offset - start_offset == text.len()`
    pub end_offset: usize,
    /// Zero-based position in the run
    pub chunk_index: usize,
    pub metadata: ChunkMetadata,
}

/// Descriptive data computed for each chunk
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkMetadata {
    /// Caller-supplied correlation id
    pub document_id: String,
    /// Estimated token count
    pub token_count: usize,
    pub word_count: usize,
    /// How the end of this chunk was chosen
    pub boundary: BoundaryKind,
    /// Nearest heading, or the chunk's leading sentence
    pub title: String,
    pub chapter_title: Option<String>,
    pub section_title: Option<String>,
    /// Chunk does not stop mid-thought
    pub ends_cleanly: bool,
}

/// Kind of split point that ended a chunk
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BoundaryKind {
    /// Before a chapter heading
    Chapter,
    /// Before a section heading
    Section,
    /// After a blank line
    Paragraph,
    /// After whitespace
    Word,
    /// No boundary in the search window; cut at the window end
    Forced,
    /// Reached the end of the text
    DocumentEnd,
    /// Fixed-size emergency slice
    Emergency,
    /// The whole document fit in one chunk
    Whole,
}

/// How a chunking run ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ChunkingStatus {
    /// Semantic chunking produced several chunks
    Complete,
    /// Document fit the token budget (or was empty)
    SingleChunk,
    /// Semantic chunking stalled and fixed-size slicing took over
    DegradedEmergency,
    /// Oversized document left as one chunk; emergency chunking disabled
    DegradedSingleChunk,
    /// Semantic chunking stalled; partial result returned
    DegradedStalled,
}

impl ChunkingStatus {
    pub fn is_degraded(&self) -> bool {
        matches!(
            self,
            Self::DegradedEmergency | Self::DegradedSingleChunk | Self::DegradedStalled
        )
    }
}

/// Chunks plus the diagnostics of the run that produced them
#[derive(Debug, Clone, Serialize)]
pub struct ChunkingOutcome {
    pub chunks: Vec<Chunk>,
    pub status: ChunkingStatus,
    /// Length of the working text the offsets refer to
    pub working_len: usize,
    /// Sections cut by trailing-matter filtering, in original offsets
    pub removed_sections: Vec<RemovedSection>,
    /// Chunks dropped for reference-keyword density
    pub skipped_chunks: usize,
}
