//! services/api/src/ingest/docx.rs
//!
//! Word-document text extraction. A `.docx` file is a zip archive whose
//! body text lives in `word/document.xml`; we pull the text runs (`<w:t>`)
//! out of that XML and insert a line break per paragraph (`<w:p>`).

use std::io::{Cursor, Read};

use docuchat_core::ports::{CoreError, CoreResult};
use quick_xml::events::Event;
use quick_xml::Reader;

/// Extracts the plain text of a `.docx` file held in memory.
pub fn extract_text(bytes: &[u8]) -> CoreResult<String> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes))
        .map_err(|e| CoreError::Extraction(format!("not a valid docx archive: {}", e)))?;

    let mut document_xml = String::new();
    archive
        .by_name("word/document.xml")
        .map_err(|e| CoreError::Extraction(format!("docx has no document body: {}", e)))?
        .read_to_string(&mut document_xml)
        .map_err(|e| CoreError::Extraction(e.to_string()))?;

    extract_plaintext_from_docx_xml(&document_xml)
}

/// Streams the document XML and collects the text runs.
fn extract_plaintext_from_docx_xml(xml: &str) -> CoreResult<String> {
    let mut reader = Reader::from_str(xml);
    let mut text = String::new();
    let mut in_text_run = false;

    loop {
        match reader.read_event() {
            Ok(Event::Start(ref e)) if e.name().as_ref() == b"w:t" => in_text_run = true,
            Ok(Event::End(ref e)) => match e.name().as_ref() {
                b"w:t" => in_text_run = false,
                // Paragraph boundary.
                b"w:p" => text.push('\n'),
                _ => {}
            },
            Ok(Event::Text(ref t)) if in_text_run => {
                let run = t
                    .unescape()
                    .map_err(|e| CoreError::Extraction(e.to_string()))?;
                text.push_str(&run);
            }
            Ok(Event::Eof) => break,
            Ok(_) => {}
            Err(e) => {
                return Err(CoreError::Extraction(format!(
                    "malformed docx XML: {}",
                    e
                )))
            }
        }
    }

    Ok(text)
}
