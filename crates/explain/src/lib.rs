//! Reason generation for classification results.
//!
//! Converts the rubric outcomes recorded in a `ClassificationResult` into
//! human-readable justifications. Reasons are derived only from those outcomes,
//! so they always name the checks that actually drove the score.

use docval_model::{Category, ClassificationResult, ContentFeatures, FeatureRecord, RubricCheck};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Category sub-scores (0 - 100) below this get negative reasons.
pub const REASON_THRESHOLD: f32 = 60.0;

/// One justification line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Reason {
    pub category: Category,

    /// True for a category summary, false for a failed check
    pub positive: bool,

    /// The failed check, for negative reasons
    #[serde(skip_serializing_if = "Option::is_none")]
    pub check: Option<RubricCheck>,

    pub text: String,
}

impl fmt::Display for Reason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mark = if self.positive { '✓' } else { '✗' };
        write!(f, "{} {}: {}", mark, self.category, self.text)
    }
}

fn positive_summary(category: Category) -> &'static str {
    match category {
        Category::Metadata => "file format, declared type and size meet the admission criteria",
        Category::Content => "content matches admissible documents",
        Category::Structure => "file name is well structured",
        Category::Security => "no integrity or disguise concerns",
        Category::RequiredFeatures => "signature, date and required fields are present",
    }
}

/// Text for a failed check, with detail from the record where it helps.
pub fn failure_reason(check: RubricCheck, record: &FeatureRecord) -> String {
    let meta = &record.metadata;
    let extension = meta.extension.as_deref().unwrap_or("none");

    match check {
        RubricCheck::ValidExtension => format!(
            "extension '{}' is not an accepted format (pdf, jpg, jpeg, png, doc, docx)",
            extension
        ),
        RubricCheck::ValidMimeType => {
            format!("declared type '{}' is not an accepted document type", meta.mime_type)
        }
        RubricCheck::SizeInRange => {
            format!("file size {:.2} MB is outside the accepted range", meta.size_mb)
        }
        RubricCheck::SizeNearValidMean => format!(
            "file size {:.2} MB differs from typical admissible documents",
            meta.size_mb
        ),
        RubricCheck::NameHasKeyword => "file name does not identify the document type".to_string(),

        RubricCheck::PatternAffinity => {
            "features resemble rejected training examples more than admissible ones".to_string()
        }
        RubricCheck::ImageQuality => match &record.content {
            ContentFeatures::Image(img) => {
                format!("image quality is low ({:.0}%)", img.quality * 100.0)
            }
            _ => "image quality is low".to_string(),
        },
        RubricCheck::ImageHasText => "no readable text detected in the image".to_string(),
        RubricCheck::ImageResolution => "image resolution is too low".to_string(),
        RubricCheck::ImageColorDepth => match &record.content {
            ContentFeatures::Image(img) => {
                format!("color depth of {} bits is below 24", img.color_depth)
            }
            _ => "color depth is below 24 bits".to_string(),
        },
        RubricCheck::PdfSearchable => "PDF has no searchable text".to_string(),
        RubricCheck::PdfSignature => "PDF has no digital signature".to_string(),
        RubricCheck::PdfMetadata => "PDF has no document metadata".to_string(),
        RubricCheck::PdfHasPages => "no pages detected in the PDF".to_string(),
        RubricCheck::TextWordCount => match &record.content {
            ContentFeatures::Text(text) => format!("text is too short ({} words)", text.word_count),
            _ => "text is too short".to_string(),
        },
        RubricCheck::TextParagraphs => "text has no paragraph structure".to_string(),
        RubricCheck::TextLanguageConsistency => "text language is inconsistent".to_string(),
        RubricCheck::TextInformationDensity => {
            "text density is unusual for a document".to_string()
        }

        RubricCheck::NameHasDate => "file name carries no date".to_string(),
        RubricCheck::NameHasVersion => "file name carries no version marker".to_string(),
        RubricCheck::NameWithoutSpecialChars => {
            "file name contains special characters".to_string()
        }
        RubricCheck::NameSegments => format!(
            "file name structure is unusual ({} segments)",
            meta.name.segment_count
        ),
        RubricCheck::NameLength => {
            format!("file name length is unusual ({} characters)", meta.name.length)
        }
        RubricCheck::SizeCategoryMatchesValid => format!(
            "size category '{:?}' is not typical of admissible documents",
            meta.size_category
        ),

        RubricCheck::ExtensionMatchesMime => format!(
            "extension '{}' does not match declared type '{}'",
            extension, meta.mime_type
        ),
        RubricCheck::SingleExtension => "file name contains multiple extensions".to_string(),
        RubricCheck::IntegrityHigh => format!(
            "file integrity is low ({:.0}%)",
            record.integrity_score * 100.0
        ),
        RubricCheck::ExtensionSeenInValid => format!(
            "extension '{}' never appears in admissible examples",
            extension
        ),

        RubricCheck::RequiredFieldsPresent => "required fields are missing".to_string(),
        RubricCheck::SignaturePresent => "signature or seal is missing".to_string(),
        RubricCheck::DateValid => "no valid or recent date found".to_string(),
        RubricCheck::ReadableText => "no readable text found".to_string(),
    }
}

/// Explain a scored result, category by category in fixed order.
///
/// A category at or above `REASON_THRESHOLD` gets one positive summary; below
/// it, one negative reason per failed check.
pub fn explain(record: &FeatureRecord, result: &ClassificationResult) -> Vec<Reason> {
    let mut reasons = Vec::new();

    for category in Category::ALL {
        if result.category_scores.get(category) >= REASON_THRESHOLD {
            reasons.push(Reason {
                category,
                positive: true,
                check: None,
                text: positive_summary(category).to_string(),
            });
            continue;
        }

        let before = reasons.len();
        reasons.extend(result.failed_checks(category).map(|outcome| Reason {
            category,
            positive: false,
            check: Some(outcome.check),
            text: failure_reason(outcome.check, record),
        }));

        if reasons.len() == before {
            reasons.push(Reason {
                category,
                positive: false,
                check: None,
                text: "not enough evidence to assess this category".to_string(),
            });
        }
    }

    reasons
}

/// `explain` rendered as display strings.
pub fn explain_lines(record: &FeatureRecord, result: &ClassificationResult) -> Vec<String> {
    explain(record, result).iter().map(|r| r.to_string()).collect()
}

/// One-line verdict for a result.
pub fn summarize(result: &ClassificationResult) -> String {
    let verdict = if result.is_valid { "ADMISSIBLE" } else { "REJECTED" };
    let concerns = result.reasons.iter().filter(|r| r.starts_with('✗')).count();

    let mut line = format!(
        "{} (validity {:.1}%, confidence {:.1}%, threshold {:.0}%)",
        verdict,
        result.validity_score,
        result.confidence,
        result.confidence_threshold * 100.0
    );
    if concerns > 0 {
        line.push_str(&format!(": {} concern(s)", concerns));
    }
    line
}
