//! Training for docval: labeled examples in, pattern summaries out.
//!
//! "Training" is descriptive statistics over labeled feature records:
//! - `TrainingSet`: append-only labeled examples, safe to share between threads
//! - `aggregate` / `summarize`: per-label pattern summaries
//! - `estimate`: readiness metrics from class counts
//! - `train`: one full pass producing a `TrainedModel`

mod aggregate;
mod log;
mod metrics;

use chrono::{DateTime, Utc};
use docval_model::{FeatureRecord, Label, ModelMetrics, PatternSummaries};
use serde::{Deserialize, Serialize};

pub use aggregate::{aggregate, summarize};
pub use log::AppendLog;
pub use metrics::estimate;

/// A labeled feature record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainingExample {
    pub features: FeatureRecord,
    pub label: Label,
    pub added_at: DateTime<Utc>,
}

/// Labeled examples, one append-only log per label.
#[derive(Debug, Default)]
pub struct TrainingSet {
    valid: AppendLog<TrainingExample>,
    invalid: AppendLog<TrainingExample>,
}

impl TrainingSet {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self, label: Label) -> &AppendLog<TrainingExample> {
        match label {
            Label::Valid => &self.valid,
            Label::Invalid => &self.invalid,
        }
    }

    pub fn add(&self, label: Label, features: FeatureRecord) {
        self.log(label).push(TrainingExample {
            features,
            label,
            added_at: Utc::now(),
        });
    }

    /// Add several records under one label, keeping their order.
    pub fn add_all(&self, label: Label, records: impl IntoIterator<Item = FeatureRecord>) {
        let added_at = Utc::now();
        self.log(label).extend(records.into_iter().map(|features| TrainingExample {
            features,
            label,
            added_at,
        }));
    }

    pub fn count(&self, label: Label) -> usize {
        self.log(label).len()
    }

    pub fn len(&self) -> usize {
        self.valid.len() + self.invalid.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn examples(&self, label: Label) -> Vec<TrainingExample> {
        self.log(label).snapshot()
    }

    /// All examples, valid first, each label in insertion order.
    pub fn labeled_records(&self) -> Vec<(FeatureRecord, Label)> {
        Label::ALL
            .iter()
            .flat_map(|label| self.examples(*label))
            .map(|example| (example.features, example.label))
            .collect()
    }
}

/// Output of one training pass. Superseded, never merged, by the next pass.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TrainedModel {
    pub patterns: PatternSummaries,
    pub metrics: ModelMetrics,
    pub trained_at: DateTime<Utc>,
}

impl TrainedModel {
    /// Classification needs at least one example of each label.
    pub fn is_ready(&self) -> bool {
        self.patterns.is_trained()
    }
}

/// Summarize the current training set from scratch.
///
/// Accepts any number of examples; small sets are reported through the metrics
/// rather than rejected.
pub fn train(set: &TrainingSet) -> TrainedModel {
    let records = set.labeled_records();
    let patterns = aggregate(&records);
    let metrics = estimate(patterns.valid.sample_count, patterns.invalid.sample_count);

    tracing::info!(
        valid = metrics.valid_count,
        invalid = metrics.invalid_count,
        balance = metrics.balance_ratio,
        tier = %metrics.confidence,
        "trained pattern summaries"
    );

    TrainedModel {
        patterns,
        metrics,
        trained_at: Utc::now(),
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_support::pdf_record;
    use docval_model::ConfidenceTier;

    #[test]
    fn test_train_requires_both_labels_for_readiness() {
        let set = TrainingSet::new();
        set.add_all(
            Label::Valid,
            (0..3).map(|i| pdf_record(&format!("v{i}.pdf"), 1.5, true, true)),
        );

        let model = train(&set);
        assert!(!model.is_ready());
        assert_eq!(model.metrics.balance_ratio, 0.0);
        assert_eq!(model.metrics.confidence, ConfidenceTier::Low);

        set.add(Label::Invalid, pdf_record("x.pdf", 1.5, false, false));
        let model = train(&set);
        assert!(model.is_ready());
        assert_eq!(model.patterns.invalid.sample_count, 1);
    }

    #[test]
    fn test_empty_training_set() {
        let model = train(&TrainingSet::new());
        assert!(!model.is_ready());
        assert_eq!(model.metrics.training_size, 0);
    }

    #[test]
    fn test_labeled_records_order() {
        let set = TrainingSet::new();
        set.add(Label::Invalid, pdf_record("i1.pdf", 1.0, false, false));
        set.add(Label::Valid, pdf_record("v1.pdf", 1.0, true, true));
        set.add(Label::Valid, pdf_record("v2.pdf", 1.0, true, true));

        let names: Vec<_> = set
            .labeled_records()
            .iter()
            .map(|(r, l)| format!("{}:{}", l, r.file_name()))
            .collect();
        assert_eq!(names, vec!["valid:v1.pdf", "valid:v2.pdf", "invalid:i1.pdf"]);
        assert_eq!(set.count(Label::Valid), 2);
        assert_eq!(set.len(), 3);
    }
}
