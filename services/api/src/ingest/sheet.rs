//! services/api/src/ingest/sheet.rs
//!
//! Text extraction for tabular formats: CSV files via the `csv` crate and
//! Excel workbooks via `calamine`. Each row becomes one line of text so the
//! chunker can split on ordinary whitespace downstream.

use std::io::Cursor;

use calamine::{Reader, Xlsx};
use docuchat_core::ports::{CoreError, CoreResult};

/// Renders a CSV file as plain text, one line per record.
pub fn extract_csv_text(bytes: &[u8]) -> CoreResult<String> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .from_reader(bytes);

    let mut text = String::new();
    for record in reader.records() {
        let record = record.map_err(|e| CoreError::Extraction(e.to_string()))?;
        let line = record.iter().collect::<Vec<_>>().join(", ");
        if !line.trim().is_empty() {
            text.push_str(&line);
            text.push('\n');
        }
    }
    Ok(text)
}

/// Renders every sheet of an Excel workbook as plain text, row by row.
pub fn extract_xlsx_text(bytes: &[u8]) -> CoreResult<String> {
    let mut workbook: Xlsx<_> = Xlsx::new(Cursor::new(bytes))
        .map_err(|e| CoreError::Extraction(format!("not a valid xlsx workbook: {}", e)))?;

    let sheet_names = workbook.sheet_names().to_owned();
    let mut text = String::new();

    for name in sheet_names {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| CoreError::Extraction(e.to_string()))?;
        for row in range.rows() {
            let line = row
                .iter()
                .map(|cell| cell.to_string())
                .collect::<Vec<_>>()
                .join(" ");
            if !line.trim().is_empty() {
                text.push_str(&line);
                text.push('\n');
            }
        }
    }

    Ok(text)
}
