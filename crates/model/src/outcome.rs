//! Classification outputs: categories, rubric checks, results and metrics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Scoring categories, in the fixed order used for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Metadata,
    Content,
    Structure,
    Security,
    RequiredFeatures,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::Metadata,
        Category::Content,
        Category::Structure,
        Category::Security,
        Category::RequiredFeatures,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            Self::Metadata => "Metadata",
            Self::Content => "Content",
            Self::Structure => "Structure",
            Self::Security => "Security",
            Self::RequiredFeatures => "Required features",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// One item of the scoring rubric.
///
/// The classifier records the outcome of every applicable check, and reasons
/// are generated from those outcomes only.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RubricCheck {
    // Metadata
    ValidExtension,
    ValidMimeType,
    SizeInRange,
    SizeNearValidMean,
    NameHasKeyword,

    // Content
    PatternAffinity,
    ImageQuality,
    ImageHasText,
    ImageResolution,
    ImageColorDepth,
    PdfSearchable,
    PdfSignature,
    PdfMetadata,
    PdfHasPages,
    TextWordCount,
    TextParagraphs,
    TextLanguageConsistency,
    TextInformationDensity,

    // Structure
    NameHasDate,
    NameHasVersion,
    NameWithoutSpecialChars,
    NameSegments,
    NameLength,
    SizeCategoryMatchesValid,

    // Security
    ExtensionMatchesMime,
    SingleExtension,
    IntegrityHigh,
    ExtensionSeenInValid,

    // Required features
    RequiredFieldsPresent,
    SignaturePresent,
    DateValid,
    ReadableText,
}

impl RubricCheck {
    pub fn category(&self) -> Category {
        use RubricCheck::*;
        match self {
            ValidExtension | ValidMimeType | SizeInRange | SizeNearValidMean | NameHasKeyword => {
                Category::Metadata
            }
            PatternAffinity | ImageQuality | ImageHasText | ImageResolution | ImageColorDepth
            | PdfSearchable | PdfSignature | PdfMetadata | PdfHasPages | TextWordCount
            | TextParagraphs | TextLanguageConsistency | TextInformationDensity => {
                Category::Content
            }
            NameHasDate | NameHasVersion | NameWithoutSpecialChars | NameSegments | NameLength
            | SizeCategoryMatchesValid => Category::Structure,
            ExtensionMatchesMime | SingleExtension | IntegrityHigh | ExtensionSeenInValid => {
                Category::Security
            }
            RequiredFieldsPresent | SignaturePresent | DateValid | ReadableText => {
                Category::RequiredFeatures
            }
        }
    }
}

/// Result of evaluating one rubric check against a document.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CheckOutcome {
    pub check: RubricCheck,
    pub passed: bool,
    /// Contribution to the category sub-score when passed
    pub weight: f32,
}

/// Per-category sub-scores, each 0 - 100.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CategoryScores {
    pub metadata: f32,
    pub content: f32,
    pub structure: f32,
    pub security: f32,
    pub required_features: f32,
}

impl CategoryScores {
    pub fn get(&self, category: Category) -> f32 {
        match category {
            Category::Metadata => self.metadata,
            Category::Content => self.content,
            Category::Structure => self.structure,
            Category::Security => self.security,
            Category::RequiredFeatures => self.required_features,
        }
    }

    pub fn set(&mut self, category: Category, value: f32) {
        let slot = match category {
            Category::Metadata => &mut self.metadata,
            Category::Content => &mut self.content,
            Category::Structure => &mut self.structure,
            Category::Security => &mut self.security,
            Category::RequiredFeatures => &mut self.required_features,
        };
        *slot = value;
    }
}

/// Outcome of classifying one document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationResult {
    pub document_name: String,

    /// Admissible when true
    pub is_valid: bool,

    /// Distance of the validity score from the midline, 0 - 100
    pub confidence: f32,

    /// Weighted validity score, 0 - 100
    pub validity_score: f32,

    /// Weighted complement of the validity score, 0 - 100
    pub invalidity_score: f32,

    pub category_scores: CategoryScores,

    /// Every applicable rubric check, in rubric order
    pub checks: Vec<CheckOutcome>,

    /// Human-readable justifications, in category order
    #[serde(default)]
    pub reasons: Vec<String>,

    /// The configured threshold the verdict was taken against
    pub confidence_threshold: f32,

    pub classified_at: DateTime<Utc>,
}

impl ClassificationResult {
    /// Outcomes of the checks belonging to one category.
    pub fn checks_for(&self, category: Category) -> impl Iterator<Item = &CheckOutcome> {
        self.checks.iter().filter(move |o| o.check.category() == category)
    }

    pub fn failed_checks(&self, category: Category) -> impl Iterator<Item = &CheckOutcome> {
        self.checks_for(category).filter(|o| !o.passed)
    }

    pub fn passed(&self, check: RubricCheck) -> Option<bool> {
        self.checks.iter().find(|o| o.check == check).map(|o| o.passed)
    }
}

/// Qualitative readiness of the trained model.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ConfidenceTier {
    Low,
    Medium,
    High,
}

impl fmt::Display for ConfidenceTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Low => "Low",
            Self::Medium => "Medium",
            Self::High => "High",
        };
        f.write_str(s)
    }
}

/// Coarse training quality metrics.
///
/// `estimated_accuracy` is a heuristic display number derived from counts; it
/// is not measured against held-out data.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelMetrics {
    pub training_size: usize,
    pub valid_count: usize,
    pub invalid_count: usize,
    /// min(valid, invalid) / max(valid, invalid), 0 when a class is empty
    pub balance_ratio: f32,
    pub estimated_accuracy: f32,
    pub confidence: ConfidenceTier,
    pub recommendation: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_category_has_checks() {
        use RubricCheck::*;
        let checks = [
            ValidExtension,
            PatternAffinity,
            NameHasDate,
            ExtensionMatchesMime,
            RequiredFieldsPresent,
        ];
        let categories: Vec<_> = checks.iter().map(|c| c.category()).collect();
        assert_eq!(categories, Category::ALL.to_vec());
    }

    #[test]
    fn test_category_scores_get_set() {
        let mut scores = CategoryScores::default();
        for (i, category) in Category::ALL.into_iter().enumerate() {
            scores.set(category, i as f32 * 10.0);
        }
        assert_eq!(scores.get(Category::Metadata), 0.0);
        assert_eq!(scores.get(Category::RequiredFeatures), 40.0);
    }
}
