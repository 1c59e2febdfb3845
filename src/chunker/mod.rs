mod boundary;
mod chunk;
mod emergency;
mod filter;
mod outline;
mod progress;
mod splitter;


pub use chunk::{BoundaryKind, Chunk, ChunkMetadata, ChunkingOutcome, ChunkingStatus};
pub use filter::{FilteredText, RemovedSection, TrailingMatterFilter};
pub use outline::{Heading, Outline};
pub use splitter::DocumentChunker;

/// Window size under `aggressive_chunking`, as a percentage of the normal one
pub const AGGRESSIVE_WINDOW_PERCENT: usize = 75;

/// Longest title derived from a chunk's leading sentence
pub const MAX_TITLE_CHARS: usize = 80;
