//! Training pattern summaries.

use crate::{BooleanFeature, Label, SizeCategory};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A value with the number of training records it was observed in.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedValue<T> {
    pub value: T,
    pub count: usize,
}

/// Descriptive statistics over the training records of one label.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSummary {
    pub sample_count: usize,
    pub mean_size_mb: f64,

    /// Most common first; ties keep first-seen order
    pub extensions: Vec<RankedValue<String>>,

    /// Most common first; ties keep first-seen order
    pub size_categories: Vec<RankedValue<SizeCategory>>,

    /// Fraction of applicable records exhibiting each boolean feature
    pub feature_rates: BTreeMap<BooleanFeature, f32>,

    /// Mean over text records only
    pub mean_word_count: f64,

    /// Mean over image records only
    pub mean_quality: f32,

    pub mean_integrity: f32,
}

impl PatternSummary {
    pub fn is_empty(&self) -> bool {
        self.sample_count == 0
    }

    pub fn most_common_extension(&self) -> Option<&str> {
        self.extensions.first().map(|r| r.value.as_str())
    }

    pub fn most_common_size_category(&self) -> Option<SizeCategory> {
        self.size_categories.first().map(|r| r.value)
    }

    pub fn has_extension(&self, extension: &str) -> bool {
        self.extensions.iter().any(|r| r.value == extension)
    }

    pub fn rate(&self, feature: BooleanFeature) -> Option<f32> {
        self.feature_rates.get(&feature).copied()
    }
}

/// Summaries for both labels, produced together by one training pass.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PatternSummaries {
    pub valid: PatternSummary,
    pub invalid: PatternSummary,
}

impl PatternSummaries {
    pub fn for_label(&self, label: Label) -> &PatternSummary {
        match label {
            Label::Valid => &self.valid,
            Label::Invalid => &self.invalid,
        }
    }

    /// Both labels have at least one training example.
    pub fn is_trained(&self) -> bool {
        !self.valid.is_empty() && !self.invalid.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_untrained() {
        let summaries = PatternSummaries::default();
        assert!(!summaries.is_trained());
        assert_eq!(summaries.valid.most_common_extension(), None);
        assert_eq!(summaries.invalid.rate(BooleanFeature::PdfSignature), None);
    }

    #[test]
    fn test_summary_json_keys() {
        let mut summary = PatternSummary {
            sample_count: 2,
            ..Default::default()
        };
        summary.feature_rates.insert(BooleanFeature::PdfSignature, 0.5);
        let json = serde_json::to_value(&summary).unwrap();
        assert_eq!(json["feature_rates"]["pdf_signature"], 0.5);
    }
}
