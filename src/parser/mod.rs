//! Workbook readers
//!
//! Opens the ZIP package, resolves the first sheet and turns it into
//! header-keyed records. Legacy `.xls` uploads go through [`parse_xls`].

mod relationships;
pub(crate) mod rows;
mod styles;
mod worksheet;
mod xls;

use std::io::Cursor;
use std::path::Path;
use tracing::debug;
use zip::ZipArchive;

use crate::csv::{parse_delimited, Delimiter};
use crate::error::{Result, XlmergeError};
use crate::types::RecordBatch;

use relationships::{get_sheet_info, parse_shared_strings, parse_workbook_relationships};
use rows::rows_to_batch;
use styles::parse_date_styles;
use worksheet::{parse_sheet_rows, CellContext};

pub use xls::parse_xls;

/// Upload formats recognised by [`parse_upload`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UploadFormat {
    Xlsx,
    Xls,
    Csv,
    Tsv,
}

impl UploadFormat {
    /// Pick a format from a file name's extension (case-insensitive).
    pub fn from_file_name(name: &str) -> Result<Self> {
        let ext = Path::new(name)
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "xlsx" | "xlsm" => Ok(Self::Xlsx),
            "xls" => Ok(Self::Xls),
            "csv" => Ok(Self::Csv),
            "tsv" => Ok(Self::Tsv),
            "" => Err(XlmergeError::UnsupportedFormat(format!(
                "{name}: file has no extension"
            ))),
            other => Err(XlmergeError::UnsupportedFormat(format!(
                "{name}: .{other} files are not supported"
            ))),
        }
    }
}

/// Parse the first sheet of an XLSX workbook into records.
pub fn parse_records(data: &[u8]) -> Result<RecordBatch> {
    let mut archive = ZipArchive::new(Cursor::new(data))?;

    let relationships = parse_workbook_relationships(&mut archive)?;
    let (sheets, date1904) = get_sheet_info(&mut archive, &relationships.worksheets)?;
    let first = sheets
        .into_iter()
        .next()
        .ok_or_else(|| XlmergeError::Parse("workbook contains no sheets".to_string()))?;

    let shared_strings = parse_shared_strings(&mut archive, relationships.shared_strings.as_deref())?;
    let date_styles = parse_date_styles(&mut archive, relationships.styles.as_deref())?;

    let ctx = CellContext {
        shared_strings: &shared_strings,
        date_styles: &date_styles,
        date1904,
    };
    let rows = parse_sheet_rows(&mut archive, &first.path, &ctx)?;
    let batch = rows_to_batch(rows);

    debug!(
        sheet = %first.name,
        shared_strings = shared_strings.len(),
        cell_styles = date_styles.len(),
        date1904,
        headers = batch.headers.len(),
        records = batch.len(),
        "parsed xlsx sheet"
    );

    Ok(batch)
}

/// Parse an uploaded file, choosing the reader by its extension.
pub fn parse_upload(name: &str, data: &[u8]) -> Result<RecordBatch> {
    match UploadFormat::from_file_name(name)? {
        UploadFormat::Xlsx => parse_records(data),
        UploadFormat::Xls => parse_xls(data),
        UploadFormat::Csv => parse_delimited(data, Delimiter::Comma),
        UploadFormat::Tsv => parse_delimited(data, Delimiter::Tab),
    }
}
