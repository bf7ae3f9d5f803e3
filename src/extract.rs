//! Document normalization for PDF and spreadsheet uploads.
//!
//! Callers supply bytes plus a [`MediaType`]; this module returns the
//! normalized text and, for spreadsheets, the [`TableCollection`] it was built
//! from. Unsupported types never reach here; [`crate::upload`] rejects them.
//!
//! PDF text is taken page by page. A page whose text cannot be extracted
//! contributes an empty string so page order is preserved. Only a document
//! that cannot be decoded at all is an error.

use calamine::{open_workbook_auto_from_rs, Data, Range, Reader};
use std::io::Cursor;
use thiserror::Error;
use tracing::{debug, warn};

use crate::models::MediaType;
use crate::table::{Cell, Sheet, TableCollection};

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("Error reading PDF: {0}")]
    Pdf(String),
    #[error("Error reading Excel file: {0}")]
    Spreadsheet(String),
}

/// Normalized content of one uploaded document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExtractedDocument {
    pub text: String,
    /// Empty for PDFs.
    pub tables: TableCollection,
}

impl ExtractedDocument {
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Extract text (and tables) from `bytes` of the given type.
pub fn extract_document(
    bytes: &[u8],
    media_type: MediaType,
    sample_rows: usize,
) -> Result<ExtractedDocument, ExtractError> {
    match media_type {
        MediaType::Pdf => extract_pdf(bytes).map(|text| ExtractedDocument {
            text,
            tables: TableCollection::new(),
        }),
        MediaType::Xlsx | MediaType::Xls => {
            let tables = read_workbook(bytes)?;
            let text = spreadsheet_text(&tables, sample_rows);
            Ok(ExtractedDocument { text, tables })
        }
    }
}

/// Like [`extract_document`], but a decode failure is logged and degrades to
/// an empty document. The error is returned alongside for the caller to
/// report.
pub fn extract_or_empty(
    bytes: &[u8],
    media_type: MediaType,
    sample_rows: usize,
) -> (ExtractedDocument, Option<ExtractError>) {
    match extract_document(bytes, media_type, sample_rows) {
        Ok(doc) => (doc, None),
        Err(e) => {
            warn!(%media_type, "{}", e);
            (ExtractedDocument::default(), Some(e))
        }
    }
}

/// Concatenate per-page text, each page followed by `\n`.
pub fn extract_pdf(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = lopdf::Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;
    let pages = doc.get_pages();
    debug!(pages = pages.len(), "decoded PDF");

    let mut text = String::new();
    for page_number in pages.keys() {
        match doc.extract_text(&[*page_number]) {
            Ok(page_text) => text.push_str(&page_text),
            Err(e) => warn!(page = page_number, "no text extracted from page: {}", e),
        }
        text.push('\n');
    }
    Ok(text)
}

/// Load every sheet of an XLSX/XLS workbook, in workbook order.
pub fn read_workbook(bytes: &[u8]) -> Result<TableCollection, ExtractError> {
    let mut workbook = open_workbook_auto_from_rs(Cursor::new(bytes))
        .map_err(|e| ExtractError::Spreadsheet(e.to_string()))?;

    let mut tables = TableCollection::new();
    for name in workbook.sheet_names() {
        let range = workbook
            .worksheet_range(&name)
            .map_err(|e| ExtractError::Spreadsheet(format!("sheet '{}': {}", name, e)))?;
        let sheet = Sheet::from_grid(name, range_to_grid(&range));
        debug!(
            sheet = %sheet.name,
            rows = sheet.row_count(),
            columns = sheet.column_count(),
            "loaded sheet"
        );
        tables.push(sheet);
    }
    Ok(tables)
}

/// Render the normalized text for a workbook: one summary block per sheet.
pub fn spreadsheet_text(tables: &TableCollection, sample_rows: usize) -> String {
    tables
        .iter()
        .map(|sheet| sheet.summary_block(sample_rows))
        .collect()
}

/// Grid anchored at column A: blank columns left of the used range come back
/// as empty cells. Leading blank rows stay dropped.
fn range_to_grid(range: &Range<Data>) -> Vec<Vec<Cell>> {
    let lead = range.start().map_or(0, |(_, col)| col as usize);
    range
        .rows()
        .map(|row| {
            std::iter::repeat(Cell::Empty)
                .take(lead)
                .chain(row.iter().map(to_cell))
                .collect()
        })
        .collect()
}

fn to_cell(data: &Data) -> Cell {
    match data {
        Data::Int(v) => Cell::Number(*v as f64),
        Data::Float(v) => Cell::Number(*v),
        Data::String(s) if s.is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => Cell::Text(
            dt.as_datetime()
                .map(|d| d.to_string())
                .unwrap_or_else(|| dt.as_f64().to_string()),
        ),
        Data::DateTimeIso(s) | Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Text(format!("#{:?}", e)),
        Data::Empty => Cell::Empty,
    }
}
