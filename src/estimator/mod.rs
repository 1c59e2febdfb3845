mod heuristic;


pub use heuristic::{EstimatorConfig, HeuristicEstimator};

/// Approximate token accounting used for every budget decision.
///
/// Implementations only need to be roughly right: the chunker assumes the
/// numbers can be off in either direction and guards progress on its own.
pub trait TokenEstimator: Send + Sync {
    /// Estimated token count for `text`
    fn estimate_tokens(&self, text: &str) -> usize;

    /// Whether `text` is estimated to exceed `limit` tokens
    fn exceeds_token_limit(&self, text: &str, limit: usize) -> bool {
        self.estimate_tokens(text) > limit
    }

    /// Largest character span expected to fit in `tokens`
    fn estimate_max_chars_for_tokens(&self, tokens: usize) -> usize;

    /// Character size of a chunk that comfortably fits the model budget
    fn configured_safe_chunk_size(&self) -> usize;
}
