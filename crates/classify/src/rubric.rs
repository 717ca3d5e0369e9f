//! The scoring rubric as a declarative table.
//!
//! Each item names a check, its weight inside its category, the content kinds
//! it applies to, and the predicate. Every category starts at
//! `CATEGORY_BASELINE`; a passing check adds its weight, a failing one adds
//! nothing. Weights of the items applicable to any one content kind sum to
//! `1.0 - CATEGORY_BASELINE` per category.

use docval_features::{extension_like_segments, extension_matches_mime};
use docval_model::{
    CheckOutcome, ClassifierConfig, ContentFeatures, ContentKind, FeatureRecord,
    MetadataFeatures, PatternSummaries, ResolutionTier, RubricCheck,
};

/// Everything a rubric predicate may look at.
pub struct RubricInput<'a> {
    pub record: &'a FeatureRecord,
    pub patterns: &'a PatternSummaries,
    pub config: &'a ClassifierConfig,
}

impl RubricInput<'_> {
    fn meta(&self) -> &MetadataFeatures {
        &self.record.metadata
    }

    fn content(&self) -> &ContentFeatures {
        &self.record.content
    }
}

/// Content kinds a rubric item applies to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Scope {
    Any,
    Only(ContentKind),
}

impl Scope {
    pub fn applies_to(&self, kind: ContentKind) -> bool {
        match self {
            Scope::Any => true,
            Scope::Only(k) => *k == kind,
        }
    }
}

pub struct RubricItem {
    pub check: RubricCheck,
    pub weight: f32,
    pub scope: Scope,
    pub test: fn(&RubricInput) -> bool,
}

/// Sub-score of a category in which every check failed.
pub const CATEGORY_BASELINE: f32 = 0.5;

const MIN_WORDS: f64 = 50.0;
const MIN_IMAGE_QUALITY: f32 = 0.6;
const MIN_LANGUAGE_CONSISTENCY: f32 = 0.2;
const MIN_INTEGRITY: f32 = 0.7;

/// The document's boolean features sit closer to the valid class rates than
/// to the invalid ones.
fn pattern_affinity(input: &RubricInput) -> bool {
    let (mut to_valid, mut to_invalid) = (0.0f32, 0.0f32);
    for (feature, present) in input.record.boolean_features() {
        let valid = input.patterns.valid.rate(feature);
        let invalid = input.patterns.invalid.rate(feature);
        if let (Some(valid), Some(invalid)) = (valid, invalid) {
            let x = if present { 1.0 } else { 0.0 };
            to_valid += (x - valid).abs();
            to_invalid += (x - invalid).abs();
        }
    }
    to_valid < to_invalid
}

fn size_near_valid_mean(input: &RubricInput) -> bool {
    let mean = input.patterns.valid.mean_size_mb;
    mean > 0.0 && (input.meta().size_mb - mean).abs() <= mean * 0.5
}

/// Half the valid class's mean word count, capped at `MIN_WORDS`.
fn enough_words(input: &RubricInput, word_count: usize) -> bool {
    let mean = input.patterns.valid.mean_word_count;
    let target = if mean > 0.0 { (mean * 0.5).min(MIN_WORDS) } else { MIN_WORDS };
    word_count as f64 >= target
}

fn required_fields(input: &RubricInput) -> bool {
    input.meta().name.has_keyword
        || match input.content() {
            ContentFeatures::Pdf(pdf) => pdf.contains_forms,
            ContentFeatures::Image(img) => img.has_text,
            ContentFeatures::Text(text) => text.has_long_numeric_token,
        }
}

fn signature_present(input: &RubricInput) -> bool {
    match input.content() {
        ContentFeatures::Pdf(pdf) => pdf.has_digital_signature,
        ContentFeatures::Image(img) => img.has_watermark,
        ContentFeatures::Text(_) => false,
    }
}

fn readable_text(input: &RubricInput) -> bool {
    match input.content() {
        ContentFeatures::Pdf(pdf) => pdf.is_searchable,
        ContentFeatures::Image(img) => img.has_text,
        ContentFeatures::Text(text) => text.word_count > 0,
    }
}

pub static RUBRIC: &[RubricItem] = &[
    // Metadata
    RubricItem {
        check: RubricCheck::ValidExtension,
        weight: 0.125,
        scope: Scope::Any,
        test: |i| i.meta().has_valid_extension,
    },
    RubricItem {
        check: RubricCheck::ValidMimeType,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| i.meta().has_valid_mime,
    },
    RubricItem {
        check: RubricCheck::SizeInRange,
        weight: 0.125,
        scope: Scope::Any,
        test: |i| {
            let size = i.meta().size_mb;
            size >= i.config.min_file_size_mb && size <= i.config.max_file_size_mb
        },
    },
    RubricItem {
        check: RubricCheck::SizeNearValidMean,
        weight: 0.075,
        scope: Scope::Any,
        test: size_near_valid_mean,
    },
    RubricItem {
        check: RubricCheck::NameHasKeyword,
        weight: 0.075,
        scope: Scope::Any,
        test: |i| i.meta().name.has_keyword,
    },
    // Content
    RubricItem {
        check: RubricCheck::PatternAffinity,
        weight: 0.10,
        scope: Scope::Any,
        test: pattern_affinity,
    },
    RubricItem {
        check: RubricCheck::ImageQuality,
        weight: 0.15,
        scope: Scope::Only(ContentKind::Image),
        test: |i| i.content().image().is_some_and(|img| img.quality >= MIN_IMAGE_QUALITY),
    },
    RubricItem {
        check: RubricCheck::ImageHasText,
        weight: 0.10,
        scope: Scope::Only(ContentKind::Image),
        test: |i| i.content().image().is_some_and(|img| img.has_text),
    },
    RubricItem {
        check: RubricCheck::ImageResolution,
        weight: 0.075,
        scope: Scope::Only(ContentKind::Image),
        test: |i| {
            i.content()
                .image()
                .is_some_and(|img| img.resolution != ResolutionTier::Low)
        },
    },
    RubricItem {
        check: RubricCheck::ImageColorDepth,
        weight: 0.075,
        scope: Scope::Only(ContentKind::Image),
        test: |i| i.content().image().is_some_and(|img| img.color_depth >= 24),
    },
    RubricItem {
        check: RubricCheck::PdfSearchable,
        weight: 0.125,
        scope: Scope::Only(ContentKind::Pdf),
        test: |i| i.content().pdf().is_some_and(|pdf| pdf.is_searchable),
    },
    RubricItem {
        check: RubricCheck::PdfSignature,
        weight: 0.125,
        scope: Scope::Only(ContentKind::Pdf),
        test: |i| i.content().pdf().is_some_and(|pdf| pdf.has_digital_signature),
    },
    RubricItem {
        check: RubricCheck::PdfMetadata,
        weight: 0.075,
        scope: Scope::Only(ContentKind::Pdf),
        test: |i| i.content().pdf().is_some_and(|pdf| pdf.has_metadata),
    },
    RubricItem {
        check: RubricCheck::PdfHasPages,
        weight: 0.075,
        scope: Scope::Only(ContentKind::Pdf),
        test: |i| i.content().pdf().is_some_and(|pdf| pdf.page_count > 0),
    },
    RubricItem {
        check: RubricCheck::TextWordCount,
        weight: 0.125,
        scope: Scope::Only(ContentKind::Text),
        test: |i| i.content().text().is_some_and(|t| enough_words(i, t.word_count)),
    },
    RubricItem {
        check: RubricCheck::TextParagraphs,
        weight: 0.075,
        scope: Scope::Only(ContentKind::Text),
        test: |i| i.content().text().is_some_and(|t| t.has_paragraph_breaks),
    },
    RubricItem {
        check: RubricCheck::TextLanguageConsistency,
        weight: 0.10,
        scope: Scope::Only(ContentKind::Text),
        test: |i| {
            i.content()
                .text()
                .is_some_and(|t| t.language_consistency >= MIN_LANGUAGE_CONSISTENCY)
        },
    },
    RubricItem {
        check: RubricCheck::TextInformationDensity,
        weight: 0.10,
        scope: Scope::Only(ContentKind::Text),
        test: |i| {
            i.content()
                .text()
                .is_some_and(|t| (0.05..=0.35).contains(&t.information_density))
        },
    },
    // Structure
    RubricItem {
        check: RubricCheck::NameHasDate,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| i.meta().name.has_date,
    },
    RubricItem {
        check: RubricCheck::NameHasVersion,
        weight: 0.05,
        scope: Scope::Any,
        test: |i| i.meta().name.has_version,
    },
    RubricItem {
        check: RubricCheck::NameWithoutSpecialChars,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| !i.meta().name.has_special_chars,
    },
    RubricItem {
        check: RubricCheck::NameSegments,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| (2..=8).contains(&i.meta().name.segment_count),
    },
    RubricItem {
        check: RubricCheck::NameLength,
        weight: 0.075,
        scope: Scope::Any,
        test: |i| (5..=100).contains(&i.meta().name.length),
    },
    RubricItem {
        check: RubricCheck::SizeCategoryMatchesValid,
        weight: 0.075,
        scope: Scope::Any,
        test: |i| i.patterns.valid.most_common_size_category() == Some(i.meta().size_category),
    },
    // Security
    RubricItem {
        check: RubricCheck::ExtensionMatchesMime,
        weight: 0.15,
        scope: Scope::Any,
        test: |i| extension_matches_mime(i.meta().extension.as_deref(), &i.meta().mime_type),
    },
    RubricItem {
        check: RubricCheck::SingleExtension,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| extension_like_segments(&i.meta().file_name) <= 1,
    },
    RubricItem {
        check: RubricCheck::IntegrityHigh,
        weight: 0.15,
        scope: Scope::Any,
        test: |i| i.record.integrity_score >= MIN_INTEGRITY,
    },
    RubricItem {
        check: RubricCheck::ExtensionSeenInValid,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| {
            i.meta()
                .extension
                .as_deref()
                .is_some_and(|ext| i.patterns.valid.has_extension(ext))
        },
    },
    // Required features
    RubricItem {
        check: RubricCheck::RequiredFieldsPresent,
        weight: 0.15,
        scope: Scope::Any,
        test: required_fields,
    },
    RubricItem {
        check: RubricCheck::SignaturePresent,
        weight: 0.15,
        scope: Scope::Any,
        test: signature_present,
    },
    RubricItem {
        check: RubricCheck::DateValid,
        weight: 0.10,
        scope: Scope::Any,
        test: |i| i.meta().name.has_date || i.meta().is_recent,
    },
    RubricItem {
        check: RubricCheck::ReadableText,
        weight: 0.10,
        scope: Scope::Any,
        test: readable_text,
    },
];

/// Run every rubric item applicable to the record, in table order.
pub fn evaluate(input: &RubricInput) -> Vec<CheckOutcome> {
    let kind = input.record.content.kind();
    RUBRIC
        .iter()
        .filter(|item| item.scope.applies_to(kind))
        .map(|item| CheckOutcome {
            check: item.check,
            passed: (item.test)(input),
            weight: item.weight,
        })
        .collect()
}
