use crate::error::ConfigError;
use crate::estimator::EstimatorConfig;
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Everything a config file can carry: chunking rules plus estimator tuning.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default)]
    pub chunking: ChunkingConfig,
    #[serde(default)]
    pub estimator: EstimatorConfig,
}

impl Settings {
    /// Parse a JSON document; missing fields take their defaults
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.chunking.validate()?;
        settings.estimator.validate()?;
        Ok(settings)
    }

    /// Load and validate a JSON config file
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.display().to_string(),
            source,
        })?;
        Self::from_json_str(&json)
    }
}

/// Per-run chunking settings. Read-only while a document is being chunked.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Token budget under which a document is returned as a single chunk
    #[serde(default = "default_max_single_chunk_tokens")]
    pub max_single_chunk_tokens: usize,
    /// Character cap for one chunk window
    #[serde(default = "default_max_single_chunk_chars")]
    pub max_single_chunk_chars: usize,
    /// Tokens shared between neighbouring chunks
    #[serde(default = "default_overlap_tokens")]
    pub overlap_tokens: usize,
    /// Shrink the chunk window for more headroom against estimation error
    #[serde(default)]
    pub aggressive_chunking: bool,
    /// Allow fixed-size slicing when semantic chunking stalls
    #[serde(default = "default_true")]
    pub enable_emergency_chunking: bool,
    #[serde(default)]
    pub filter: FilterConfig,
}

/// Settings for trailing-matter removal and keyword-density skipping.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Heading titles (case-insensitive) that open a non-substantive section.
    /// `appendix` also matches a trailing identifier such as `Appendix B`.
    #[serde(default = "default_section_markers")]
    pub section_markers: Vec<String>,
    /// Vocabulary that marks a chunk as index or reference material
    #[serde(default = "default_density_keywords")]
    pub density_keywords: Vec<String>,
    /// Fraction of reference-like words at which a chunk is skipped
    #[serde(default = "default_density_threshold")]
    pub density_threshold: f64,
    /// Chunks with fewer words are never skipped
    #[serde(default = "default_min_density_words")]
    pub min_density_words: usize,
    /// Count bare numbers and page ranges as reference vocabulary
    #[serde(default = "default_true")]
    pub count_numeric_tokens: bool,
}

fn default_max_single_chunk_tokens() -> usize {
    8_000
}

fn default_max_single_chunk_chars() -> usize {
    30_000
}

fn default_overlap_tokens() -> usize {
    200
}

fn default_true() -> bool {
    true
}

fn default_section_markers() -> Vec<String> {
    [
        "index",
        "appendix",
        "appendices",
        "bibliography",
        "references",
        "works cited",
        "further reading",
        "endnotes",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_density_keywords() -> Vec<String> {
    [
        "index",
        "appendix",
        "bibliography",
        "references",
        "see",
        "also",
        "ibid",
        "op",
        "cit",
        "et",
        "al",
        "p",
        "pp",
        "vol",
        "ed",
        "eds",
        "isbn",
        "doi",
        "press",
        "journal",
        "retrieved",
        "edition",
    ]
    .iter()
    .map(|s| s.to_string())
    .collect()
}

fn default_density_threshold() -> f64 {
    0.6
}

fn default_min_density_words() -> usize {
    20
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_single_chunk_tokens: default_max_single_chunk_tokens(),
            max_single_chunk_chars: default_max_single_chunk_chars(),
            overlap_tokens: default_overlap_tokens(),
            aggressive_chunking: false,
            enable_emergency_chunking: true,
            filter: FilterConfig::default(),
        }
    }
}

impl Default for FilterConfig {
    fn default() -> Self {
        Self {
            section_markers: default_section_markers(),
            density_keywords: default_density_keywords(),
            density_threshold: default_density_threshold(),
            min_density_words: default_min_density_words(),
            count_numeric_tokens: true,
        }
    }
}

impl ChunkingConfig {
    /// Reject values that make the budget meaningless.
    ///
    /// Overlap larger than the window is accepted: the chunker's
    /// forced-advancement valves handle it.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_single_chunk_tokens == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_single_chunk_tokens",
                reason: "must be greater than zero".to_string(),
            });
        }
        if self.max_single_chunk_chars == 0 {
            return Err(ConfigError::InvalidValue {
                field: "max_single_chunk_chars",
                reason: "must be greater than zero".to_string(),
            });
        }
        let threshold = self.filter.density_threshold;
        if !(0.0..=1.0).contains(&threshold) {
            return Err(ConfigError::InvalidValue {
                field: "filter.density_threshold",
                reason: format!("{} is outside [0, 1]", threshold),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_json() {
        let settings = Settings::from_json_str("{}").unwrap();
        assert_eq!(settings, Settings::default());
        assert!(settings.chunking.enable_emergency_chunking);
        assert!(!settings.chunking.aggressive_chunking);
        assert_eq!(settings.estimator.chars_per_token, 4.0);
    }

    #[test]
    fn test_partial_json_overrides() {
        let settings = Settings::from_json_str(
            r#"{
                "chunking": {
                    "overlap_tokens": 50,
                    "aggressive_chunking": true,
                    "filter": {"density_threshold": 0.9}
                },
                "estimator": {"safe_chunk_tokens": 1000}
            }"#,
        )
        .unwrap();
        let config = &settings.chunking;
        assert_eq!(config.overlap_tokens, 50);
        assert!(config.aggressive_chunking);
        assert_eq!(config.filter.density_threshold, 0.9);
        assert_eq!(config.filter.min_density_words, 20);
        assert!(config.filter.section_markers.contains(&"index".to_string()));
        assert_eq!(settings.estimator.safe_chunk_tokens, 1000);
        assert_eq!(settings.estimator.safety_margin, 0.9);
    }

    #[test]
    fn test_rejects_zero_token_budget() {
        let err = Settings::from_json_str(r#"{"chunking": {"max_single_chunk_tokens": 0}}"#)
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                field: "max_single_chunk_tokens",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_out_of_range_threshold() {
        let err = Settings::from_json_str(r#"{"chunking": {"filter": {"density_threshold": 1.5}}}"#)
            .unwrap_err();
        assert!(err.to_string().contains("filter.density_threshold"));
    }

    #[test]
    fn test_rejects_bad_estimator_margin() {
        let err = Settings::from_json_str(r#"{"estimator": {"safety_margin": 0.0}}"#).unwrap_err();
        assert!(err.to_string().contains("estimator.safety_margin"));
    }

    #[test]
    fn test_overlap_larger_than_window_is_accepted() {
        let config = ChunkingConfig {
            overlap_tokens: 1_000_000,
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_malformed_json() {
        let err = Settings::from_json_str("{not json").unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file() {
        let err = Settings::from_json_file("/nonexistent/chunking.json").unwrap_err();
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
