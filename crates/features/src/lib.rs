//! Feature extraction for document classification.
//!
//! Turns a `RawDocument` into a `FeatureRecord`:
//! - Metadata features (extension, MIME, size bucket, name structure, recency)
//! - Content features from a pluggable `ContentAnalyzer` per content kind
//! - Integrity score from size plausibility, MIME and timestamp presence

mod analyzer;
mod name;

use chrono::{DateTime, Duration, Utc};
use docval_model::{
    ContentFeatures, ContentKind, FeatureRecord, MetadataFeatures, RawDocument, SizeCategory,
};
use rayon::prelude::*;
use thiserror::Error;

pub use analyzer::{
    decode_sample, printable_runs, text_features, ContentAnalyzer, PdfMarkerAnalyzer,
    PlaceholderImageAnalyzer, TextStatsAnalyzer,
};
pub use name::{
    analyze_name, extension_like_segments, extension_matches_mime, is_valid_extension,
    is_valid_mime, mime_for_extension, VALID_EXTENSIONS, VALID_MIME_TYPES,
};

const BYTES_PER_MB: f64 = 1024.0 * 1024.0;

/// Documents modified within this many days count as recent.
const RECENT_DAYS: i64 = 365;

#[derive(Debug, Error)]
pub enum ExtractError {
    /// The content sample of a text-analyzable document is not valid UTF-8.
    /// Recoverable with `extract_metadata_only`.
    #[error("Unreadable content in {name}: {reason}")]
    UnreadableContent { name: String, reason: String },

    #[error("No documents supplied")]
    EmptyBatch,
}

/// Integrity of the captured metadata, 0.0 - 1.0.
pub fn integrity_score(size_bytes: u64, mime_type: &str, has_timestamp: bool) -> f32 {
    let size_plausibility: f32 = match size_bytes {
        0 => 0.0,
        1..=1023 => 0.2,
        _ => 0.4,
    };
    let mime: f32 = if mime_type.trim().is_empty() { 0.0 } else { 0.3 };
    let timestamp: f32 = if has_timestamp { 0.3 } else { 0.0 };

    (size_plausibility + mime + timestamp).clamp(0.0, 1.0)
}

/// Compute the metadata tier of a document as of `now`.
pub fn metadata_features(doc: &RawDocument, now: DateTime<Utc>) -> MetadataFeatures {
    let extension = doc.extension();
    let size_mb = doc.size_bytes() as f64 / BYTES_PER_MB;
    let is_recent = doc
        .last_modified()
        .is_some_and(|modified| now - modified <= Duration::days(RECENT_DAYS));

    MetadataFeatures {
        file_name: doc.name().to_string(),
        has_valid_extension: is_valid_extension(extension.as_deref()),
        extension,
        size_bytes: doc.size_bytes(),
        size_mb,
        mime_type: doc.mime_type().to_string(),
        has_valid_mime: is_valid_mime(doc.mime_type()),
        size_category: SizeCategory::from_mb(size_mb),
        name: analyze_name(doc.name()),
        is_recent,
    }
}

/// Extracts feature records, delegating content to one analyzer per kind.
pub struct FeatureExtractor {
    image: Box<dyn ContentAnalyzer>,
    pdf: Box<dyn ContentAnalyzer>,
    text: Box<dyn ContentAnalyzer>,
}

impl Default for FeatureExtractor {
    fn default() -> Self {
        Self {
            image: Box::new(PlaceholderImageAnalyzer::new()),
            pdf: Box::new(PdfMarkerAnalyzer),
            text: Box::new(TextStatsAnalyzer),
        }
    }
}

impl FeatureExtractor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the analyzer for the kind it reports.
    pub fn with_analyzer(mut self, analyzer: impl ContentAnalyzer + 'static) -> Self {
        let slot = match analyzer.kind() {
            ContentKind::Image => &mut self.image,
            ContentKind::Pdf => &mut self.pdf,
            ContentKind::Text => &mut self.text,
        };
        *slot = Box::new(analyzer);
        self
    }

    fn analyzer_for(&self, kind: ContentKind) -> &dyn ContentAnalyzer {
        match kind {
            ContentKind::Image => self.image.as_ref(),
            ContentKind::Pdf => self.pdf.as_ref(),
            ContentKind::Text => self.text.as_ref(),
        }
    }

    pub fn extract(&self, doc: &RawDocument) -> Result<FeatureRecord, ExtractError> {
        self.extract_at(doc, Utc::now())
    }

    /// Extract with an explicit reference instant for the recency check.
    pub fn extract_at(
        &self,
        doc: &RawDocument,
        now: DateTime<Utc>,
    ) -> Result<FeatureRecord, ExtractError> {
        let kind = ContentKind::for_mime(doc.mime_type());
        let content = self.analyzer_for(kind).analyze(doc)?;
        tracing::debug!(name = doc.name(), ?kind, "extracted content features");
        Ok(assemble(doc, content, now))
    }

    /// Extract without content analysis; the content tier is left empty.
    pub fn extract_metadata_only(&self, doc: &RawDocument) -> FeatureRecord {
        self.extract_metadata_only_at(doc, Utc::now())
    }

    pub fn extract_metadata_only_at(&self, doc: &RawDocument, now: DateTime<Utc>) -> FeatureRecord {
        let kind = ContentKind::for_mime(doc.mime_type());
        assemble(doc, ContentFeatures::empty(kind), now)
    }

    /// Extract a batch in parallel, returning records in input order.
    ///
    /// Documents with unreadable content fall back to metadata-only records.
    pub fn extract_batch(&self, docs: &[RawDocument]) -> Result<Vec<FeatureRecord>, ExtractError> {
        if docs.is_empty() {
            return Err(ExtractError::EmptyBatch);
        }

        let now = Utc::now();
        let records: Vec<FeatureRecord> = docs
            .par_iter()
            .map(|doc| match self.extract_at(doc, now) {
                Ok(record) => record,
                Err(e) => {
                    tracing::warn!(error = %e, "falling back to metadata-only features");
                    self.extract_metadata_only_at(doc, now)
                }
            })
            .collect();

        tracing::info!(count = records.len(), "extracted feature batch");
        Ok(records)
    }
}

fn assemble(doc: &RawDocument, content: ContentFeatures, now: DateTime<Utc>) -> FeatureRecord {
    FeatureRecord {
        metadata: metadata_features(doc, now),
        content,
        integrity_score: integrity_score(
            doc.size_bytes(),
            doc.mime_type(),
            doc.last_modified().is_some(),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docval_model::{ImageFeatures, ResolutionTier};

    fn now() -> DateTime<Utc> {
        "2025-06-01T12:00:00Z".parse().unwrap()
    }

    #[test]
    fn test_integrity_score() {
        assert!((integrity_score(2_000_000, "application/pdf", true) - 1.0).abs() < 1e-6);
        assert!((integrity_score(0, "application/pdf", true) - 0.6).abs() < 1e-6);
        assert!((integrity_score(500, "", false) - 0.2).abs() < 1e-6);
    }

    #[test]
    fn test_metadata_features() {
        let doc = RawDocument::new("Invoice_2025-05-01.PDF", 1_572_864, "application/pdf")
            .with_last_modified("2025-05-01T00:00:00Z".parse().unwrap());
        let meta = metadata_features(&doc, now());

        assert_eq!(meta.extension.as_deref(), Some("pdf"));
        assert!(meta.has_valid_extension);
        assert!(meta.has_valid_mime);
        assert!((meta.size_mb - 1.5).abs() < 1e-9);
        assert_eq!(meta.size_category, SizeCategory::Medium);
        assert!(meta.name.has_date);
        assert!(meta.name.has_keyword);
        assert!(meta.is_recent);
    }

    #[test]
    fn test_old_document_not_recent() {
        let doc = RawDocument::new("scan.png", 10, "image/png")
            .with_last_modified("2020-01-01T00:00:00Z".parse().unwrap());
        assert!(!metadata_features(&doc, now()).is_recent);

        let undated = RawDocument::new("scan.png", 10, "image/png");
        assert!(!metadata_features(&undated, now()).is_recent);
    }

    #[test]
    fn test_mime_mismatch_is_surfaced_not_rejected() {
        let doc = RawDocument::new("photo.pdf", 50_000, "image/png");
        let record = FeatureExtractor::new().extract_at(&doc, now()).unwrap();
        assert!(record.metadata.has_valid_extension);
        assert!(record.metadata.has_valid_mime);
        assert!(!extension_matches_mime(record.metadata.extension.as_deref(), "image/png"));
        assert_eq!(record.content.kind(), ContentKind::Image);
    }

    #[test]
    fn test_unreadable_text_content() {
        let doc = RawDocument::new("notes.txt", 3, "text/plain").with_content(&[0xff, 0xfe, 0x00]);
        let extractor = FeatureExtractor::new();
        assert!(matches!(
            extractor.extract_at(&doc, now()),
            Err(ExtractError::UnreadableContent { .. })
        ));

        let record = extractor.extract_metadata_only_at(&doc, now());
        assert_eq!(record.content, ContentFeatures::empty(ContentKind::Text));
    }

    #[test]
    fn test_word_documents_extract_without_error() {
        let docx_mime = "application/vnd.openxmlformats-officedocument.wordprocessingml.document";
        let docx = RawDocument::new("contrato_2025-01-01.docx", 40_000, docx_mime)
            .with_last_modified("2025-05-01T00:00:00Z".parse().unwrap())
            .with_content(b"PK\x03\x04\x14\x00\x06\x00\x08\x00\xdf\xa4\x91\x02[Content_Types].xml\xc3\x9b");
        let doc = RawDocument::new("informe.doc", 25_000, "application/msword")
            .with_content(&[0xd0, 0xcf, 0x11, 0xe0, 0xa1, 0xb1, 0x1a, 0xe1, 0x00, 0xfe]);

        let extractor = FeatureExtractor::new();
        for raw in [&docx, &doc] {
            let record = extractor.extract_at(raw, now()).unwrap();
            assert!(record.metadata.has_valid_extension);
            assert!(record.metadata.has_valid_mime);
            assert_eq!(record.content.kind(), ContentKind::Text);
        }

        let records = extractor.extract_batch(&[docx, doc]).unwrap();
        assert_eq!(records[0].content.text().map(|t| t.word_count), Some(1));
    }

    #[test]
    fn test_batch_preserves_order_and_falls_back() {
        let docs = vec![
            RawDocument::new("a.pdf", 100_000, "application/pdf").with_content(b"%PDF /Font"),
            RawDocument::new("b.txt", 3, "text/plain").with_content(&[0xff, 0xfe, 0x00]),
            RawDocument::new("c.txt", 11, "text/plain").with_content(b"hello world"),
        ];
        let records = FeatureExtractor::new().extract_batch(&docs).unwrap();

        let names: Vec<_> = records.iter().map(|r| r.file_name()).collect();
        assert_eq!(names, vec!["a.pdf", "b.txt", "c.txt"]);
        assert_eq!(records[1].content, ContentFeatures::empty(ContentKind::Text));
        assert_eq!(records[2].content.text().map(|t| t.word_count), Some(2));
    }

    #[test]
    fn test_empty_batch() {
        assert!(matches!(
            FeatureExtractor::new().extract_batch(&[]),
            Err(ExtractError::EmptyBatch)
        ));
    }

    struct FixedImage;

    impl ContentAnalyzer for FixedImage {
        fn kind(&self) -> ContentKind {
            ContentKind::Image
        }

        fn analyze(&self, _doc: &RawDocument) -> Result<ContentFeatures, ExtractError> {
            Ok(ContentFeatures::Image(ImageFeatures {
                quality: 0.9,
                has_text: true,
                is_scanned: false,
                resolution: ResolutionTier::High,
                has_watermark: true,
                color_depth: 24,
            }))
        }
    }

    #[test]
    fn test_analyzer_substitution() {
        let extractor = FeatureExtractor::new().with_analyzer(FixedImage);
        let doc = RawDocument::new("id.jpg", 300_000, "image/jpeg");
        let record = extractor.extract_at(&doc, now()).unwrap();
        assert_eq!(record.content.image().map(|i| i.quality), Some(0.9));
    }
}
