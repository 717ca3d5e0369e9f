//! Weighted multi-criteria classification of documents.
//!
//! Scores a `FeatureRecord` against the trained pattern summaries with the
//! rubric table, combines the five category sub-scores with the configured
//! weights, and attaches reasons generated from the same rubric outcomes.

mod rubric;

use chrono::{DateTime, Utc};
use docval_explain::explain_lines;
use docval_model::{
    Category, CategoryScores, CheckOutcome, ClassificationResult, ClassifierConfig,
    FeatureRecord, PatternSummaries,
};
use thiserror::Error;

pub use rubric::{evaluate, RubricInput, RubricItem, Scope, CATEGORY_BASELINE, RUBRIC};

/// Allowed drift of the weight sum from 1.0 before a warning is logged.
const WEIGHT_SUM_TOLERANCE: f32 = 0.05;

#[derive(Debug, Error, PartialEq)]
pub enum ClassifyError {
    /// Training has not produced a summary for both labels yet.
    #[error("Model not trained: need at least one valid and one invalid example")]
    ModelNotTrained,

    #[error("No documents supplied")]
    EmptyBatch,
}

/// Sub-score of one category, `CATEGORY_BASELINE` - 1.0.
fn category_score(outcomes: &[CheckOutcome], category: Category) -> f32 {
    outcomes
        .iter()
        .filter(|o| o.passed && o.check.category() == category)
        .fold(CATEGORY_BASELINE, |score, o| score + o.weight)
        .min(1.0)
}

fn percent(score: f32) -> f32 {
    (score * 100.0).clamp(0.0, 100.0)
}

/// Score a record without checking training readiness or attaching reasons.
pub fn score(
    record: &FeatureRecord,
    patterns: &PatternSummaries,
    config: &ClassifierConfig,
    at: DateTime<Utc>,
) -> ClassificationResult {
    let checks = evaluate(&RubricInput {
        record,
        patterns,
        config,
    });

    let total_weight = config.weights.total();
    if (total_weight - 1.0).abs() > WEIGHT_SUM_TOLERANCE {
        tracing::warn!(total_weight, "category weights do not sum to 1; scores are rescaled");
    }

    let mut category_scores = CategoryScores::default();
    let mut weighted = 0.0f32;
    for category in Category::ALL {
        let sub = category_score(&checks, category);
        weighted += sub * config.weights.get(category);
        category_scores.set(category, percent(sub));
    }

    let validity = if total_weight > 0.0 {
        (weighted / total_weight).clamp(0.0, 1.0)
    } else {
        0.5
    };
    let invalidity = 1.0 - validity;
    let confidence = (validity - 0.5).abs() * 2.0;
    let is_valid = validity > config.confidence_threshold;

    tracing::debug!(
        name = record.file_name(),
        validity,
        confidence,
        is_valid,
        "scored document"
    );

    ClassificationResult {
        document_name: record.file_name().to_string(),
        is_valid,
        confidence: percent(confidence),
        validity_score: percent(validity),
        invalidity_score: percent(invalidity),
        category_scores,
        checks,
        reasons: Vec::new(),
        confidence_threshold: config.confidence_threshold,
        classified_at: at,
    }
}

pub fn classify(
    record: &FeatureRecord,
    patterns: &PatternSummaries,
    config: &ClassifierConfig,
) -> Result<ClassificationResult, ClassifyError> {
    classify_at(record, patterns, config, Utc::now())
}

/// Classify a record and attach its reasons.
pub fn classify_at(
    record: &FeatureRecord,
    patterns: &PatternSummaries,
    config: &ClassifierConfig,
    at: DateTime<Utc>,
) -> Result<ClassificationResult, ClassifyError> {
    if !patterns.is_trained() {
        return Err(ClassifyError::ModelNotTrained);
    }

    let mut result = score(record, patterns, config, at);
    result.reasons = explain_lines(record, &result);
    Ok(result)
}

/// Classify several records against one config snapshot, in input order.
pub fn classify_batch(
    records: &[FeatureRecord],
    patterns: &PatternSummaries,
    config: &ClassifierConfig,
) -> Result<Vec<ClassificationResult>, ClassifyError> {
    if records.is_empty() {
        return Err(ClassifyError::EmptyBatch);
    }
    if !patterns.is_trained() {
        return Err(ClassifyError::ModelNotTrained);
    }

    let at = Utc::now();
    let results = records
        .iter()
        .map(|record| classify_at(record, patterns, config, at))
        .collect::<Result<Vec<_>, _>>()?;

    let admitted = results.iter().filter(|r| r.is_valid).count();
    tracing::info!(total = results.len(), admitted, "classified batch");
    Ok(results)
}
