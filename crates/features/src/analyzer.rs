//! Content analyzers, one per content variant.
//!
//! The extractor only sees the `ContentAnalyzer` trait, so any analyzer can be
//! replaced (for example a real image pipeline in place of the placeholder).

use crate::ExtractError;
use docval_model::{
    ContentFeatures, ContentKind, ImageFeatures, PdfFeatures, RawDocument, ResolutionTier,
    TextFeatures,
};
use once_cell::sync::Lazy;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use regex::Regex;

/// Capability that turns a document's content sample into content features.
pub trait ContentAnalyzer: Send + Sync {
    /// The content variant this analyzer produces.
    fn kind(&self) -> ContentKind;

    /// Analyze the document. Must not fail for a missing sample.
    fn analyze(&self, doc: &RawDocument) -> Result<ContentFeatures, ExtractError>;
}

/// Stand-in for an image analysis subsystem.
///
/// Produces random features. With a seed, values are derived from the seed and
/// the document name, so the same document always gets the same features.
#[derive(Debug, Clone, Default)]
pub struct PlaceholderImageAnalyzer {
    seed: Option<u64>,
}

impl PlaceholderImageAnalyzer {
    pub fn new() -> Self {
        Self { seed: None }
    }

    pub fn seeded(seed: u64) -> Self {
        Self { seed: Some(seed) }
    }

    fn rng_for(&self, doc: &RawDocument) -> StdRng {
        match self.seed {
            Some(seed) => StdRng::seed_from_u64(seed ^ fnv1a(doc.name().as_bytes())),
            None => StdRng::from_entropy(),
        }
    }
}

fn fnv1a(bytes: &[u8]) -> u64 {
    bytes.iter().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(*b)).wrapping_mul(0x0100_0000_01b3)
    })
}

impl ContentAnalyzer for PlaceholderImageAnalyzer {
    fn kind(&self) -> ContentKind {
        ContentKind::Image
    }

    fn analyze(&self, doc: &RawDocument) -> Result<ContentFeatures, ExtractError> {
        let mut rng = self.rng_for(doc);
        let quality: f32 = rng.gen_range(0.3..1.0);
        let resolution = if quality > 0.8 {
            ResolutionTier::High
        } else if quality > 0.5 {
            ResolutionTier::Medium
        } else {
            ResolutionTier::Low
        };

        Ok(ContentFeatures::Image(ImageFeatures {
            quality,
            has_text: rng.gen_bool(0.7),
            is_scanned: rng.gen_bool(0.4),
            resolution,
            has_watermark: rng.gen_bool(0.3),
            color_depth: *[8u8, 16, 24, 32].choose(&mut rng).unwrap_or(&24),
        }))
    }
}

/// Deterministic PDF analyzer that scans the sample for dictionary markers.
#[derive(Debug, Clone, Copy, Default)]
pub struct PdfMarkerAnalyzer;

fn count_occurrences(haystack: &[u8], needle: &[u8]) -> usize {
    if needle.is_empty() || haystack.len() < needle.len() {
        return 0;
    }
    haystack.windows(needle.len()).filter(|w| *w == needle).count()
}

fn contains(haystack: &[u8], needle: &[u8]) -> bool {
    count_occurrences(haystack, needle) > 0
}

/// Count `/Type /Page` dictionaries, excluding the `/Type /Pages` tree node.
fn count_pages(sample: &[u8]) -> u32 {
    let mut pages = 0u32;
    for marker in [&b"/Type /Page"[..], &b"/Type/Page"[..]] {
        let total = count_occurrences(sample, marker);
        let mut tree = marker.to_vec();
        tree.push(b's');
        let trees = count_occurrences(sample, &tree);
        pages += total.saturating_sub(trees) as u32;
    }
    pages
}

/// Share of bytes that are neither printable ASCII nor whitespace.
fn binary_share(sample: &[u8]) -> f32 {
    if sample.is_empty() {
        return 0.0;
    }
    let binary = sample
        .iter()
        .filter(|b| !(b.is_ascii_graphic() || b.is_ascii_whitespace()))
        .count();
    (binary as f32 / sample.len() as f32).clamp(0.0, 1.0)
}

impl ContentAnalyzer for PdfMarkerAnalyzer {
    fn kind(&self) -> ContentKind {
        ContentKind::Pdf
    }

    fn analyze(&self, doc: &RawDocument) -> Result<ContentFeatures, ExtractError> {
        let Some(sample) = doc.content_sample() else {
            return Ok(ContentFeatures::empty(ContentKind::Pdf));
        };

        Ok(ContentFeatures::Pdf(PdfFeatures {
            has_metadata: contains(sample, b"/Info") || contains(sample, b"/Metadata"),
            is_searchable: contains(sample, b"/Font"),
            page_count: count_pages(sample),
            has_digital_signature: contains(sample, b"/Sig") || contains(sample, b"/ByteRange"),
            compression_ratio: binary_share(sample),
            contains_forms: contains(sample, b"/AcroForm"),
        }))
    }
}

/// Closed-class words (English and Spanish) used to judge language consistency.
const STOP_WORDS: [&str; 48] = [
    "the", "a", "an", "and", "or", "of", "to", "in", "on", "for", "with", "by", "is", "are",
    "was", "be", "this", "that", "it", "as", "at", "from", "not", "but", "el", "la", "los",
    "las", "de", "del", "y", "o", "en", "un", "una", "que", "por", "para", "con", "se", "su",
    "al", "es", "lo", "como", "sus", "le", "no",
];

static PARAGRAPH_BREAK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\r?\n[ \t]*\r?\n").unwrap());
static LONG_NUMBER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d{6,}").unwrap());
static UPPERCASE_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z]{4,}\b").unwrap());

/// Decode a sample as UTF-8.
///
/// A character cut by the end of the sample is dropped rather than treated as
/// unreadable content.
pub fn decode_sample<'a>(name: &str, sample: &'a [u8]) -> Result<&'a str, ExtractError> {
    match std::str::from_utf8(sample) {
        Ok(text) => Ok(text),
        Err(e) if e.error_len().is_none() => {
            Ok(std::str::from_utf8(&sample[..e.valid_up_to()]).unwrap_or_default())
        }
        Err(e) => Err(ExtractError::UnreadableContent {
            name: name.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect::<String>()
        .to_lowercase()
}

/// Compute text statistics over already-decoded content.
pub fn text_features(text: &str) -> TextFeatures {
    let tokens: Vec<&str> = text.split_whitespace().collect();
    let length = text.chars().count();

    let stop_hits = tokens
        .iter()
        .filter(|t| STOP_WORDS.contains(&normalize_token(t).as_str()))
        .count();

    let language_consistency = if tokens.is_empty() {
        0.0
    } else {
        stop_hits as f32 / tokens.len() as f32
    };

    let information_density = if length == 0 {
        0.0
    } else {
        tokens.len() as f32 / length as f32
    };

    TextFeatures {
        word_count: tokens.len(),
        has_paragraph_breaks: PARAGRAPH_BREAK.is_match(text),
        has_long_numeric_token: LONG_NUMBER.is_match(text),
        has_uppercase_run: UPPERCASE_RUN.is_match(text),
        language_consistency: language_consistency.clamp(0.0, 1.0),
        information_density: information_density.clamp(0.0, 1.0),
    }
}

/// Shortest printable run kept by `printable_runs`.
const MIN_RUN_CHARS: usize = 4;

/// Printable ASCII runs of a binary sample, joined by spaces.
///
/// NUL bytes are skipped, so UTF-16LE text inside legacy Word files reads as
/// contiguous runs.
pub fn printable_runs(sample: &[u8]) -> String {
    let mut out = String::new();
    let mut run = String::new();

    let mut flush = |run: &mut String| {
        let trimmed = run.trim();
        if trimmed.chars().count() >= MIN_RUN_CHARS {
            if !out.is_empty() {
                out.push(' ');
            }
            out.push_str(trimmed);
        }
        run.clear();
    };

    for &byte in sample {
        match byte {
            0 => {}
            b' ' | b'\t' | b'\r' | b'\n' | 0x21..=0x7e => run.push(byte as char),
            _ => flush(&mut run),
        }
    }
    flush(&mut run);

    out
}

/// Word statistics over the content sample.
///
/// `text/*` samples must decode as UTF-8. Other types routed here (Word
/// documents, undeclared binaries) are read through their printable runs.
#[derive(Debug, Clone, Copy, Default)]
pub struct TextStatsAnalyzer;

impl ContentAnalyzer for TextStatsAnalyzer {
    fn kind(&self) -> ContentKind {
        ContentKind::Text
    }

    fn analyze(&self, doc: &RawDocument) -> Result<ContentFeatures, ExtractError> {
        let Some(sample) = doc.content_sample() else {
            return Ok(ContentFeatures::empty(ContentKind::Text));
        };
        if doc.mime_type().trim().to_ascii_lowercase().starts_with("text/") {
            let text = decode_sample(doc.name(), sample)?;
            return Ok(ContentFeatures::Text(text_features(text)));
        }
        Ok(ContentFeatures::Text(text_features(&printable_runs(sample))))
    }
}
