//! Feature record produced by extraction and consumed by scoring.

use serde::{Deserialize, Serialize};

/// Coarse size bucket of a file.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SizeCategory {
    /// Under 0.1 MB
    Tiny,
    /// Under 1 MB
    Small,
    /// Under 5 MB
    Medium,
    /// Under 20 MB
    Large,
    /// 20 MB and above
    Huge,
}

impl SizeCategory {
    pub fn from_mb(size_mb: f64) -> Self {
        if size_mb < 0.1 {
            Self::Tiny
        } else if size_mb < 1.0 {
            Self::Small
        } else if size_mb < 5.0 {
            Self::Medium
        } else if size_mb < 20.0 {
            Self::Large
        } else {
            Self::Huge
        }
    }
}

impl Default for SizeCategory {
    fn default() -> Self {
        Self::Tiny
    }
}

/// Patterns observed in the file name.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct NameStructure {
    pub has_date: bool,
    pub has_version: bool,
    /// Contains a document-type term such as "certificate" or "invoice"
    pub has_keyword: bool,
    /// Contains characters outside `[A-Za-z0-9._-]`
    pub has_special_chars: bool,
    pub segment_count: usize,
    /// Length in characters
    pub length: usize,
}

/// Features derived from the document metadata alone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataFeatures {
    pub file_name: String,

    /// Lower-cased extension, if any
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,

    pub size_bytes: u64,
    pub size_mb: f64,

    /// Declared MIME type, as supplied
    pub mime_type: String,

    pub has_valid_extension: bool,
    pub has_valid_mime: bool,
    pub size_category: SizeCategory,
    pub name: NameStructure,

    /// Modified within the last year
    pub is_recent: bool,
}

/// Which content analyzer applies to a document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContentKind {
    Image,
    Pdf,
    Text,
}

impl ContentKind {
    /// Select the content variant from a declared MIME type.
    ///
    /// Anything that is neither an image nor a PDF is analyzed as text; Word
    /// formats and undeclared binaries go through their printable runs.
    pub fn for_mime(mime_type: &str) -> Self {
        let mime = mime_type.trim().to_ascii_lowercase();
        if mime.starts_with("image/") {
            Self::Image
        } else if mime == "application/pdf" {
            Self::Pdf
        } else {
            Self::Text
        }
    }
}

/// Image resolution bucket.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionTier {
    #[default]
    Low,
    Medium,
    High,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ImageFeatures {
    /// 0.0 - 1.0
    pub quality: f32,
    pub has_text: bool,
    pub is_scanned: bool,
    pub resolution: ResolutionTier,
    pub has_watermark: bool,
    /// Bits per pixel
    pub color_depth: u8,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct PdfFeatures {
    pub has_metadata: bool,
    pub is_searchable: bool,
    pub page_count: u32,
    pub has_digital_signature: bool,
    /// 0.0 - 1.0
    pub compression_ratio: f32,
    pub contains_forms: bool,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TextFeatures {
    pub word_count: usize,
    pub has_paragraph_breaks: bool,
    /// A run of six or more digits (ID, reference or account number)
    pub has_long_numeric_token: bool,
    pub has_uppercase_run: bool,
    /// Share of tokens found in the stop-word list, 0.0 - 1.0
    pub language_consistency: f32,
    /// Tokens per character of content, 0.0 - 1.0
    pub information_density: f32,
}

/// Content-tier features; exactly one variant per document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum ContentFeatures {
    Image(ImageFeatures),
    Pdf(PdfFeatures),
    Text(TextFeatures),
}

impl ContentFeatures {
    /// Empty features for a variant, used when content cannot be analyzed.
    pub fn empty(kind: ContentKind) -> Self {
        match kind {
            ContentKind::Image => Self::Image(ImageFeatures::default()),
            ContentKind::Pdf => Self::Pdf(PdfFeatures::default()),
            ContentKind::Text => Self::Text(TextFeatures::default()),
        }
    }

    pub fn kind(&self) -> ContentKind {
        match self {
            Self::Image(_) => ContentKind::Image,
            Self::Pdf(_) => ContentKind::Pdf,
            Self::Text(_) => ContentKind::Text,
        }
    }

    pub fn image(&self) -> Option<&ImageFeatures> {
        match self {
            Self::Image(f) => Some(f),
            _ => None,
        }
    }

    pub fn pdf(&self) -> Option<&PdfFeatures> {
        match self {
            Self::Pdf(f) => Some(f),
            _ => None,
        }
    }

    pub fn text(&self) -> Option<&TextFeatures> {
        match self {
            Self::Text(f) => Some(f),
            _ => None,
        }
    }
}

/// Boolean features tracked by training pattern summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BooleanFeature {
    ValidExtension,
    ValidMime,
    NameHasDate,
    NameHasVersion,
    NameHasKeyword,
    NameHasSpecialChars,
    Recent,
    ImageHasText,
    ImageScanned,
    ImageWatermark,
    PdfMetadata,
    PdfSearchable,
    PdfSignature,
    PdfForms,
    TextParagraphs,
    TextLongNumber,
    TextUppercaseRun,
}

/// Structured, derived description of a document used for scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureRecord {
    pub metadata: MetadataFeatures,
    pub content: ContentFeatures,
    /// 0.0 - 1.0, from size plausibility, MIME presence and timestamp presence
    pub integrity_score: f32,
}

impl FeatureRecord {
    pub fn file_name(&self) -> &str {
        &self.metadata.file_name
    }

    /// All boolean features applicable to this record, in a stable order.
    pub fn boolean_features(&self) -> Vec<(BooleanFeature, bool)> {
        let meta = &self.metadata;
        let mut out = vec![
            (BooleanFeature::ValidExtension, meta.has_valid_extension),
            (BooleanFeature::ValidMime, meta.has_valid_mime),
            (BooleanFeature::NameHasDate, meta.name.has_date),
            (BooleanFeature::NameHasVersion, meta.name.has_version),
            (BooleanFeature::NameHasKeyword, meta.name.has_keyword),
            (BooleanFeature::NameHasSpecialChars, meta.name.has_special_chars),
            (BooleanFeature::Recent, meta.is_recent),
        ];

        match &self.content {
            ContentFeatures::Image(img) => out.extend([
                (BooleanFeature::ImageHasText, img.has_text),
                (BooleanFeature::ImageScanned, img.is_scanned),
                (BooleanFeature::ImageWatermark, img.has_watermark),
            ]),
            ContentFeatures::Pdf(pdf) => out.extend([
                (BooleanFeature::PdfMetadata, pdf.has_metadata),
                (BooleanFeature::PdfSearchable, pdf.is_searchable),
                (BooleanFeature::PdfSignature, pdf.has_digital_signature),
                (BooleanFeature::PdfForms, pdf.contains_forms),
            ]),
            ContentFeatures::Text(text) => out.extend([
                (BooleanFeature::TextParagraphs, text.has_paragraph_breaks),
                (BooleanFeature::TextLongNumber, text.has_long_numeric_token),
                (BooleanFeature::TextUppercaseRun, text.has_uppercase_run),
            ]),
        }

        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_size_category_boundaries() {
        assert_eq!(SizeCategory::from_mb(0.0), SizeCategory::Tiny);
        assert_eq!(SizeCategory::from_mb(0.099), SizeCategory::Tiny);
        assert_eq!(SizeCategory::from_mb(0.1), SizeCategory::Small);
        assert_eq!(SizeCategory::from_mb(1.0), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_mb(4.99), SizeCategory::Medium);
        assert_eq!(SizeCategory::from_mb(5.0), SizeCategory::Large);
        assert_eq!(SizeCategory::from_mb(20.0), SizeCategory::Huge);
    }

    #[test]
    fn test_content_kind_for_mime() {
        assert_eq!(ContentKind::for_mime("image/png"), ContentKind::Image);
        assert_eq!(ContentKind::for_mime("IMAGE/JPEG"), ContentKind::Image);
        assert_eq!(ContentKind::for_mime("application/pdf"), ContentKind::Pdf);
        assert_eq!(ContentKind::for_mime("text/plain"), ContentKind::Text);
        assert_eq!(ContentKind::for_mime(""), ContentKind::Text);
    }

    #[test]
    fn test_content_features_tagged() {
        let content = ContentFeatures::empty(ContentKind::Pdf);
        let json = serde_json::to_value(&content).unwrap();
        assert_eq!(json["kind"], "pdf");
        assert_eq!(content.kind(), ContentKind::Pdf);
        assert!(content.pdf().is_some());
        assert!(content.image().is_none());
    }
}
