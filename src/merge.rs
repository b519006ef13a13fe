//! Merge/export step: append the new records to the main set and serialize.

use serde::Serialize;
use tracing::info;

use crate::error::Result;
use crate::export::write_records;
use crate::types::{ExportOptions, RowRecord};

/// MIME type of the exported workbook.
pub const XLSX_MIME_TYPE: &str = "application/vnd.openxmlformats-officedocument.spreadsheetml.sheet";

/// A ready-to-download workbook.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportArtifact {
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub file_name: String,
    pub mime_type: &'static str,
}

/// `main` followed by `incoming`. No deduplication, no header reconciliation.
#[must_use]
pub fn merge(main: &[RowRecord], incoming: &[RowRecord]) -> Vec<RowRecord> {
    let mut merged = Vec::with_capacity(main.len() + incoming.len());
    merged.extend_from_slice(main);
    merged.extend_from_slice(incoming);
    merged
}

/// Append `incoming` to `main`, then serialize the merged set.
///
/// `main` holds the merged records even when serialization fails.
pub fn merge_and_export(
    main: &mut Vec<RowRecord>,
    incoming: &[RowRecord],
    options: &ExportOptions,
) -> Result<ExportArtifact> {
    let previous = main.len();
    main.extend_from_slice(incoming);
    info!(
        previous,
        added = incoming.len(),
        merged = main.len(),
        "merged record sets"
    );

    let bytes = write_records(main, &options.sheet_name)?;
    info!(file = %options.file_name, bytes = bytes.len(), "exported merged workbook");

    Ok(ExportArtifact {
        bytes,
        file_name: options.file_name.clone(),
        mime_type: XLSX_MIME_TYPE,
    })
}
