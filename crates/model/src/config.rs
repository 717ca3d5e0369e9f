//! Caller-owned classifier configuration.

use crate::Category;
use serde::{Deserialize, Serialize};
use std::ops::RangeInclusive;
use thiserror::Error;

/// Nominal range for each category weight.
pub const WEIGHT_RANGE: RangeInclusive<f32> = 0.05..=0.4;

/// Accepted range for the confidence threshold.
pub const THRESHOLD_RANGE: RangeInclusive<f32> = 0.5..=0.95;

#[derive(Debug, Error, PartialEq)]
pub enum ConfigError {
    #[error("Weight for {category} is {value}, expected 0.05 - 0.4")]
    WeightOutOfRange { category: Category, value: f32 },
    #[error("Confidence threshold {0} is outside 0.5 - 0.95")]
    ThresholdOutOfRange(f32),
    #[error("Invalid file size range: min {min} MB, max {max} MB")]
    InvalidSizeRange { min: f64, max: f64 },
}

/// Weights of the five scoring categories.
///
/// Callers are expected to keep the five weights summing to about 1. Scores are
/// normalized by the actual sum, so inconsistent weights are silently rescaled.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CategoryWeights {
    pub metadata: f32,
    pub content: f32,
    pub structure: f32,
    pub security: f32,
    pub required_features: f32,
}

impl Default for CategoryWeights {
    fn default() -> Self {
        Self {
            metadata: 0.25,
            content: 0.25,
            structure: 0.15,
            security: 0.15,
            required_features: 0.2,
        }
    }
}

impl CategoryWeights {
    pub fn get(&self, category: Category) -> f32 {
        match category {
            Category::Metadata => self.metadata,
            Category::Content => self.content,
            Category::Structure => self.structure,
            Category::Security => self.security,
            Category::RequiredFeatures => self.required_features,
        }
    }

    pub fn total(&self) -> f32 {
        Category::ALL.iter().map(|c| self.get(*c)).sum()
    }
}

/// Classifier settings, passed in on every classification.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClassifierConfig {
    pub weights: CategoryWeights,

    /// Decision boundary for the validity score. Also shown to users as the
    /// configured confidence level.
    pub confidence_threshold: f32,

    /// Smallest acceptable file size
    pub min_file_size_mb: f64,

    /// Largest acceptable file size
    pub max_file_size_mb: f64,
}

impl Default for ClassifierConfig {
    fn default() -> Self {
        Self {
            weights: CategoryWeights::default(),
            confidence_threshold: 0.70,
            min_file_size_mb: 0.01,
            max_file_size_mb: 5.0,
        }
    }
}

impl ClassifierConfig {
    pub fn with_threshold(mut self, threshold: f32) -> Self {
        self.confidence_threshold = threshold;
        self
    }

    pub fn with_weights(mut self, weights: CategoryWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Check every value against its nominal range.
    ///
    /// Classification does not require a valid config; this is for callers that
    /// want to reject bad settings up front.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for category in Category::ALL {
            let value = self.weights.get(category);
            if !WEIGHT_RANGE.contains(&value) {
                return Err(ConfigError::WeightOutOfRange { category, value });
            }
        }

        if !THRESHOLD_RANGE.contains(&self.confidence_threshold) {
            return Err(ConfigError::ThresholdOutOfRange(self.confidence_threshold));
        }

        if self.min_file_size_mb < 0.0 || self.min_file_size_mb >= self.max_file_size_mb {
            return Err(ConfigError::InvalidSizeRange {
                min: self.min_file_size_mb,
                max: self.max_file_size_mb,
            });
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        let config = ClassifierConfig::default();
        assert_eq!(config.validate(), Ok(()));
        assert!((config.weights.total() - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let config = ClassifierConfig::default().with_threshold(0.99);
        assert_eq!(config.validate(), Err(ConfigError::ThresholdOutOfRange(0.99)));

        let mut config = ClassifierConfig::default();
        config.weights.security = 0.5;
        assert!(matches!(
            config.validate(),
            Err(ConfigError::WeightOutOfRange { category: Category::Security, .. })
        ));

        let mut config = ClassifierConfig::default();
        config.min_file_size_mb = 10.0;
        assert!(matches!(config.validate(), Err(ConfigError::InvalidSizeRange { .. })));
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: ClassifierConfig =
            serde_json::from_str(r#"{"confidence_threshold": 0.8, "weights": {"content": 0.3}}"#).unwrap();
        assert_eq!(config.confidence_threshold, 0.8);
        assert_eq!(config.weights.content, 0.3);
        assert_eq!(config.weights.metadata, 0.25);
        assert_eq!(config.max_file_size_mb, 5.0);
    }
}
