//! Core domain model for docval document classification.
//!
//! This crate defines the value types shared by every stage of the engine:
//! - `RawDocument`: a captured upload (metadata plus a bounded content sample)
//! - `FeatureRecord`: the structured description derived from a document
//! - `PatternSummary`: descriptive statistics over one labeled class
//! - `ClassifierConfig`: caller-owned category weights and threshold
//! - `ClassificationResult` / `ModelMetrics`: engine outputs for rendering

mod config;
mod document;
mod features;
mod outcome;
mod patterns;

use serde::{Deserialize, Serialize};
use std::fmt;

pub use config::{
    CategoryWeights, ClassifierConfig, ConfigError, THRESHOLD_RANGE, WEIGHT_RANGE,
};
pub use document::{RawDocument, DEFAULT_SAMPLE_BYTES};
pub use features::{
    BooleanFeature, ContentFeatures, ContentKind, FeatureRecord, ImageFeatures,
    MetadataFeatures, NameStructure, PdfFeatures, ResolutionTier, SizeCategory, TextFeatures,
};
pub use outcome::{
    Category, CategoryScores, CheckOutcome, ClassificationResult, ConfidenceTier, ModelMetrics,
    RubricCheck,
};
pub use patterns::{PatternSummaries, PatternSummary, RankedValue};

/// Training label attached to a document by the back-office operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Label {
    /// Admissible example
    Valid,
    /// Rejected example
    Invalid,
}

impl Label {
    pub const ALL: [Label; 2] = [Label::Valid, Label::Invalid];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Valid => "valid",
            Self::Invalid => "invalid",
        }
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
