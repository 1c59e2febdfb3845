use super::TokenEstimator;
use crate::error::ConfigError;
use serde::{Deserialize, Serialize};

/// Ratio-based estimator settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EstimatorConfig {
    /// Average characters per token (~4 for English prose)
    #[serde(default = "default_chars_per_token")]
    pub chars_per_token: f64,
    /// Token size of a safe chunk before the margin is applied
    #[serde(default = "default_safe_chunk_tokens")]
    pub safe_chunk_tokens: usize,
    /// Fraction of the safe size actually used, in (0, 1]
    #[serde(default = "default_safety_margin")]
    pub safety_margin: f64,
}

fn default_chars_per_token() -> f64 {
    4.0
}

fn default_safe_chunk_tokens() -> usize {
    6_000
}

fn default_safety_margin() -> f64 {
    0.9
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            chars_per_token: default_chars_per_token(),
            safe_chunk_tokens: default_safe_chunk_tokens(),
            safety_margin: default_safety_margin(),
        }
    }
}

impl EstimatorConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.chars_per_token > 0.0) {
            return Err(ConfigError::InvalidValue {
                field: "estimator.chars_per_token",
                reason: format!("{} is not positive", self.chars_per_token),
            });
        }
        if !(self.safety_margin > 0.0 && self.safety_margin <= 1.0) {
            return Err(ConfigError::InvalidValue {
                field: "estimator.safety_margin",
                reason: format!("{} is outside (0, 1]", self.safety_margin),
            });
        }
        Ok(())
    }
}

/// Estimates tokens from character counts.
///
/// Cheap and deterministic; no tokenizer model is loaded.
#[derive(Debug, Clone, Default)]
pub struct HeuristicEstimator {
    config: EstimatorConfig,
}

impl HeuristicEstimator {
    pub fn new(config: EstimatorConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    // Guards against a hand-built config with a non-positive ratio
    fn ratio(&self) -> f64 {
        if self.config.chars_per_token > 0.0 {
            self.config.chars_per_token
        } else {
            default_chars_per_token()
        }
    }
}

impl TokenEstimator for HeuristicEstimator {
    fn estimate_tokens(&self, text: &str) -> usize {
        if text.is_empty() {
            return 0;
        }
        let chars = text.chars().count() as f64;
        (chars / self.ratio()).ceil() as usize
    }

    fn estimate_max_chars_for_tokens(&self, tokens: usize) -> usize {
        (tokens as f64 * self.ratio()).floor() as usize
    }

    fn configured_safe_chunk_size(&self) -> usize {
        let margin = self.config.safety_margin.clamp(0.0, 1.0);
        let chars = self.estimate_max_chars_for_tokens(self.config.safe_chunk_tokens) as f64;
        ((chars * margin).floor() as usize).max(1)
    }
}
