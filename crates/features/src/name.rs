//! File name, extension and MIME checks.

use docval_model::NameStructure;
use once_cell::sync::Lazy;
use regex::Regex;

/// Extensions accepted for upload.
pub const VALID_EXTENSIONS: [&str; 6] = ["pdf", "jpg", "jpeg", "png", "doc", "docx"];

/// Declared MIME types accepted for upload.
pub const VALID_MIME_TYPES: [&str; 5] = [
    "application/pdf",
    "image/jpeg",
    "image/png",
    "application/msword",
    "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
];

/// Document-type terms. Short terms must match a whole segment, longer ones
/// may prefix it ("certific" matches "certificate" and "certificado").
const KEYWORDS: [&str; 27] = [
    "certific", "diploma", "transcript", "invoice", "factura", "contract", "contrato",
    "passport", "pasaporte", "identif", "cedula", "licen", "report", "informe", "form",
    "letter", "carta", "acta", "constancia", "statement", "receipt", "recibo", "resume",
    "curriculum", "cv", "id", "dni",
];

static DATE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d{4}[-_]\d{2}[-_]\d{2}|\d{2}[-_]\d{2}[-_]\d{4}").unwrap());

static VERSION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(?:^|[^a-z])(?:(?:v|ver|version|rev)[-_ .]?\d+|final)(?:[^a-z]|$)").unwrap()
});

static SPECIAL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9._-]").unwrap());

pub fn is_valid_extension(extension: Option<&str>) -> bool {
    extension.is_some_and(|ext| VALID_EXTENSIONS.contains(&ext.to_ascii_lowercase().as_str()))
}

pub fn is_valid_mime(mime_type: &str) -> bool {
    VALID_MIME_TYPES.contains(&mime_type.trim().to_ascii_lowercase().as_str())
}

/// MIME type conventionally declared for an extension.
pub fn mime_for_extension(extension: &str) -> Option<&'static str> {
    let mime = match extension.to_ascii_lowercase().as_str() {
        "pdf" => "application/pdf",
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "doc" => "application/msword",
        "docx" => "application/vnd.openxmlformats-officedocument.wordprocessingml.document",
        "txt" => "text/plain",
        _ => return None,
    };
    Some(mime)
}

/// Whether a declared MIME type agrees with the file extension.
pub fn extension_matches_mime(extension: Option<&str>, mime_type: &str) -> bool {
    match extension.and_then(mime_for_extension) {
        Some(expected) => expected.eq_ignore_ascii_case(mime_type.trim()),
        None => false,
    }
}

/// Number of name segments that look like a known file extension.
///
/// More than one ("scan.pdf.exe", "id.jpg.pdf") suggests a disguised file.
pub fn extension_like_segments(file_name: &str) -> usize {
    file_name
        .split('.')
        .skip(1)
        .filter(|seg| mime_for_extension(seg).is_some() || is_executable_extension(seg))
        .count()
}

fn is_executable_extension(segment: &str) -> bool {
    matches!(
        segment.to_ascii_lowercase().as_str(),
        "exe" | "bat" | "cmd" | "js" | "vbs" | "scr" | "msi" | "sh"
    )
}

fn segments(file_name: &str) -> impl Iterator<Item = &str> {
    file_name
        .split(|c: char| matches!(c, '-' | '_' | '.' | ' '))
        .filter(|s| !s.is_empty())
}

fn has_keyword(file_name: &str) -> bool {
    segments(file_name).any(|seg| {
        let seg = seg.to_lowercase();
        KEYWORDS
            .iter()
            .any(|kw| seg == *kw || (kw.len() >= 4 && seg.starts_with(kw)))
    })
}

/// Analyze the structure of a file name.
pub fn analyze_name(file_name: &str) -> NameStructure {
    NameStructure {
        has_date: DATE.is_match(file_name),
        has_version: VERSION.is_match(file_name),
        has_keyword: has_keyword(file_name),
        has_special_chars: SPECIAL.is_match(file_name),
        segment_count: segments(file_name).count(),
        length: file_name.chars().count(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_valid_extension() {
        assert!(is_valid_extension(Some("pdf")));
        assert!(is_valid_extension(Some("JPEG")));
        assert!(is_valid_extension(Some("docx")));
        assert!(!is_valid_extension(Some("exe")));
        assert!(!is_valid_extension(None));
    }

    #[test]
    fn test_valid_mime() {
        assert!(is_valid_mime("application/pdf"));
        assert!(is_valid_mime("Image/PNG"));
        assert!(!is_valid_mime("text/plain"));
        assert!(!is_valid_mime(""));
    }

    #[test]
    fn test_extension_matches_mime() {
        assert!(extension_matches_mime(Some("pdf"), "application/pdf"));
        assert!(extension_matches_mime(Some("jpg"), "image/jpeg"));
        assert!(!extension_matches_mime(Some("pdf"), "image/png"));
        assert!(!extension_matches_mime(None, "application/pdf"));
        assert!(!extension_matches_mime(Some("zip"), "application/zip"));
    }

    #[test]
    fn test_analyze_name() {
        let name = analyze_name("certificado_2024-03-10_v2.pdf");
        assert_eq!(
            name,
            NameStructure {
                has_date: true,
                has_version: true,
                has_keyword: true,
                has_special_chars: false,
                segment_count: 6,
                length: 29,
            }
        );

        let name = analyze_name("foto (1)#.png");
        assert!(!name.has_date);
        assert!(!name.has_version);
        assert!(!name.has_keyword);
        assert!(name.has_special_chars);
    }

    #[test]
    fn test_date_formats() {
        assert!(analyze_name("scan_10-03-2024.jpg").has_date);
        assert!(analyze_name("scan_2024_03_10.jpg").has_date);
        assert!(!analyze_name("scan_2024.jpg").has_date);
    }

    #[test]
    fn test_version_tokens() {
        assert!(analyze_name("contract-rev3.docx").has_version);
        assert!(analyze_name("report_FINAL.pdf").has_version);
        assert!(!analyze_name("invoice.pdf").has_version);
        assert!(!analyze_name("conv3rt.pdf").has_version);
    }

    #[test]
    fn test_keyword_prefix_rules() {
        assert!(analyze_name("Certificate.pdf").has_keyword);
        assert!(analyze_name("my_id.png").has_keyword);
        assert!(!analyze_name("idea.png").has_keyword);
    }

    #[test]
    fn test_extension_like_segments() {
        assert_eq!(extension_like_segments("invoice.pdf"), 1);
        assert_eq!(extension_like_segments("invoice.pdf.exe"), 2);
        assert_eq!(extension_like_segments("README"), 0);
    }
}
