//! services/api/src/ingest/mod.rs
//!
//! Document ingestion: turns an uploaded file into plain-text segments.
//!
//! Dispatches on the file extension to the appropriate extraction routine
//! (PDF, Word document, CSV, Excel workbook), then chunks the extracted
//! text into bounded-size segments for the embedding model.

mod docx;
mod pdf;
mod sheet;

use docuchat_core::chunk::{chunk_text, MAX_SEGMENT_CHARS};
use docuchat_core::domain::Segment;
use docuchat_core::ports::{CoreError, CoreResult};

/// Extracts text from an uploaded file and chunks it into segments.
///
/// The segments preserve the original order of the text and each carries the
/// source filename for later display. A file that yields no text at all is
/// an extraction error rather than a silent no-op.
pub fn extract(filename: &str, bytes: &[u8]) -> CoreResult<Vec<Segment>> {
    let extension = filename
        .rsplit_once('.')
        .map(|(_, ext)| ext.to_ascii_lowercase())
        .unwrap_or_default();

    let text = match extension.as_str() {
        "pdf" => pdf::extract_text(bytes)?,
        "docx" => docx::extract_text(bytes)?,
        "csv" => sheet::extract_csv_text(bytes)?,
        "xlsx" => sheet::extract_xlsx_text(bytes)?,
        _ => return Err(CoreError::UnsupportedFormat(extension)),
    };

    let segments: Vec<Segment> = chunk_text(&text, MAX_SEGMENT_CHARS)
        .into_iter()
        .map(|chunk| Segment {
            text: chunk,
            source_filename: filename.to_string(),
        })
        .collect();

    if segments.is_empty() {
        return Err(CoreError::Extraction(format!(
            "'{}' contained no extractable text",
            filename
        )));
    }

    Ok(segments)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unknown_extension_is_unsupported() {
        let err = extract("slides.pptx", b"whatever").unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(ext) if ext == "pptx"));
    }

    #[test]
    fn missing_extension_is_unsupported() {
        let err = extract("README", b"plain text").unwrap_err();
        assert!(matches!(err, CoreError::UnsupportedFormat(_)));
    }

    #[test]
    fn extension_dispatch_is_case_insensitive() {
        let csv = b"name,role\nalice,admin\n";
        let segments = extract("People.CSV", csv).expect("csv should extract");
        assert!(!segments.is_empty());
        assert!(segments[0].text.contains("alice"));
    }

    #[test]
    fn csv_segments_carry_the_source_filename() {
        let csv = b"city,country\nparis,france\n";
        let segments = extract("cities.csv", csv).expect("csv should extract");
        for segment in &segments {
            assert_eq!(segment.source_filename, "cities.csv");
            assert!(!segment.text.trim().is_empty());
        }
    }

    #[test]
    fn empty_csv_is_an_extraction_error() {
        let err = extract("empty.csv", b"").unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
    }

    #[test]
    fn garbage_pdf_bytes_fail_with_extraction_error() {
        let err = extract("broken.pdf", b"not a pdf at all").unwrap_err();
        assert!(matches!(err, CoreError::Extraction(_)));
    }
}
