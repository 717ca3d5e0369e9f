use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Default number of leading bytes kept as the content sample.
pub const DEFAULT_SAMPLE_BYTES: usize = 2048;

/// A document as supplied by the upload provider.
///
/// The engine never reads past the content sample, so the sample is truncated
/// when the document is captured.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDocument {
    name: String,
    size_bytes: u64,
    mime_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    last_modified: Option<DateTime<Utc>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    content_sample: Option<Vec<u8>>,
}

impl RawDocument {
    pub fn new(name: impl Into<String>, size_bytes: u64, mime_type: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            size_bytes,
            mime_type: mime_type.into(),
            last_modified: None,
            content_sample: None,
        }
    }

    pub fn with_last_modified(mut self, last_modified: DateTime<Utc>) -> Self {
        self.last_modified = Some(last_modified);
        self
    }

    /// Attach the leading bytes of the file, keeping at most `DEFAULT_SAMPLE_BYTES`.
    pub fn with_content(self, bytes: &[u8]) -> Self {
        self.with_content_limit(bytes, DEFAULT_SAMPLE_BYTES)
    }

    /// Attach the leading bytes of the file, keeping at most `limit`.
    pub fn with_content_limit(mut self, bytes: &[u8], limit: usize) -> Self {
        let end = bytes.len().min(limit);
        self.content_sample = Some(bytes[..end].to_vec());
        self
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn size_bytes(&self) -> u64 {
        self.size_bytes
    }

    pub fn mime_type(&self) -> &str {
        &self.mime_type
    }

    pub fn last_modified(&self) -> Option<DateTime<Utc>> {
        self.last_modified
    }

    pub fn content_sample(&self) -> Option<&[u8]> {
        self.content_sample.as_deref()
    }

    /// Lower-cased suffix after the last dot, if the name has one.
    pub fn extension(&self) -> Option<String> {
        let (stem, ext) = self.name.rsplit_once('.')?;
        if stem.is_empty() || ext.is_empty() {
            return None;
        }
        Some(ext.to_ascii_lowercase())
    }
}
