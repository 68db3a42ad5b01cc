//! services/api/src/ingest/pdf.rs
//!
//! PDF text extraction, delegated to the `pdf-extract` crate.

use docuchat_core::ports::{CoreError, CoreResult};

/// Extracts the text content of a PDF held in memory.
pub fn extract_text(bytes: &[u8]) -> CoreResult<String> {
    pdf_extract::extract_text_from_mem(bytes).map_err(|e| CoreError::Extraction(e.to_string()))
}
