//! XLSX export pipeline.
//!
//! Builds a fresh single-sheet workbook from records. Headers are the union of
//! the records' keys in order of first appearance.

mod package;
pub(crate) mod sheet_writer;

use std::collections::HashSet;
use tracing::debug;

use crate::error::Result;
use crate::types::RowRecord;

use package::write_package;
use sheet_writer::write_sheet_xml;

/// Longest sheet name Excel accepts.
pub const MAX_SHEET_NAME_LEN: usize = 31;

const FORBIDDEN_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

/// Strip characters Excel rejects in sheet names and cap the length.
/// An empty result becomes `Sheet1`.
#[must_use]
pub fn sanitize_sheet_name(name: &str) -> String {
    let cleaned: String = name
        .chars()
        .filter(|c| !FORBIDDEN_SHEET_CHARS.contains(c))
        .take(MAX_SHEET_NAME_LEN)
        .collect();
    let trimmed = cleaned.trim_matches('\'');
    if trimmed.trim().is_empty() {
        "Sheet1".to_string()
    } else {
        trimmed.to_string()
    }
}

/// Column headers for a record list: every key, in order of first appearance.
#[must_use]
pub fn union_headers(records: &[RowRecord]) -> Vec<String> {
    let mut seen: HashSet<&str> = HashSet::new();
    let mut headers = Vec::new();
    for header in records.iter().flat_map(RowRecord::headers) {
        if seen.insert(header) {
            headers.push(header.to_string());
        }
    }
    headers
}

/// Serialize records to XLSX bytes with a single sheet named `sheet_name`.
pub fn write_records(records: &[RowRecord], sheet_name: &str) -> Result<Vec<u8>> {
    let sheet_name = sanitize_sheet_name(sheet_name);
    let headers = union_headers(records);
    let sheet_xml = write_sheet_xml(&headers, records);
    let bytes = write_package(&sheet_name, &sheet_xml)?;
    debug!(
        sheet = %sheet_name,
        columns = headers.len(),
        records = records.len(),
        bytes = bytes.len(),
        "wrote xlsx package"
    );
    Ok(bytes)
}
