// Public API exports
pub mod chunker;
pub mod config;
pub mod error;
pub mod estimator;
pub mod sentence;

mod text;

// Re-export main types for convenience
pub use chunker::{
    BoundaryKind, Chunk, ChunkMetadata, ChunkingOutcome, ChunkingStatus, DocumentChunker,
    RemovedSection,
};

pub use config::{ChunkingConfig, FilterConfig, Settings};
pub use error::ConfigError;

pub use estimator::{EstimatorConfig, HeuristicEstimator, TokenEstimator};

pub use sentence::{find_best_split_point, find_last_sentence_end, is_valid_chunk};
