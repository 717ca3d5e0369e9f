//! Training readiness metrics computed from class counts.

use docval_model::{ConfidenceTier, ModelMetrics};

/// Below this many documents the model is not considered usable.
const MIN_DOCS: usize = 6;
/// From this many documents the model is considered well supported.
const HIGH_CONFIDENCE_DOCS: usize = 10;
/// Below this many documents more examples still improve precision.
const PRECISION_DOCS: usize = 15;
const MIN_BALANCE: f32 = 0.5;
const MAX_ESTIMATED_ACCURACY: f32 = 98.0;

fn balance_ratio(valid: usize, invalid: usize) -> f32 {
    let max = valid.max(invalid).max(1);
    valid.min(invalid) as f32 / max as f32
}

fn recommendation(total: usize, balance: f32) -> &'static str {
    if total < MIN_DOCS {
        "Add more training examples: at least 6 documents are needed for reliable results."
    } else if balance < MIN_BALANCE {
        "Rebalance classes: add more examples of the under-represented label."
    } else if total < PRECISION_DOCS {
        "Add more examples for precision."
    } else {
        "Model is well trained."
    }
}

/// Estimate model quality from the number of examples per label.
///
/// The accuracy figure is a heuristic for display only; nothing is measured.
pub fn estimate(valid: usize, invalid: usize) -> ModelMetrics {
    let total = valid + invalid;
    let balance = balance_ratio(valid, invalid);

    let bonus = if total > HIGH_CONFIDENCE_DOCS { 5.0 } else { 0.0 };
    let estimated_accuracy = (85.0 + balance * 10.0 + bonus).min(MAX_ESTIMATED_ACCURACY);

    let confidence = if total >= HIGH_CONFIDENCE_DOCS {
        ConfidenceTier::High
    } else if total >= MIN_DOCS {
        ConfidenceTier::Medium
    } else {
        ConfidenceTier::Low
    };

    ModelMetrics {
        training_size: total,
        valid_count: valid,
        invalid_count: invalid,
        balance_ratio: balance,
        estimated_accuracy,
        confidence,
        recommendation: recommendation(total, balance).to_string(),
    }
}
