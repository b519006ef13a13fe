//! Legacy BIFF (`.xls`) reader.
//!
//! calamine decodes the compound file and cell records; this module maps its
//! first sheet onto the same grid rows the XLSX reader produces.

use std::collections::BTreeMap;
use std::io::Cursor;

use calamine::{Data, Reader, Xls};
use tracing::{debug, warn};

use crate::dates::{excel_serial_to_datetime, format_iso, parse_date_text};
use crate::error::{Result, XlmergeError};
use crate::types::{CellValue, RecordBatch};

use super::rows::{rows_to_batch, SheetRow};

/// Parse the first sheet of an `.xls` workbook into records.
pub fn parse_xls(data: &[u8]) -> Result<RecordBatch> {
    let mut workbook: Xls<_> = Xls::new(Cursor::new(data))?;

    let sheet_name = workbook
        .sheet_names()
        .into_iter()
        .next()
        .ok_or_else(|| XlmergeError::Parse("workbook contains no sheets".to_string()))?;
    let range = workbook.worksheet_range(&sheet_name)?;
    let (first_row, first_col) = range.start().unwrap_or((0, 0));

    let mut grid: BTreeMap<u32, SheetRow> = BTreeMap::new();
    for (row, col, value) in range.used_cells() {
        // used_cells() is relative to range.start()
        let (Some(row), Some(col)) = (
            u32::try_from(row).ok().and_then(|r| first_row.checked_add(r)),
            u32::try_from(col).ok().and_then(|c| first_col.checked_add(c)),
        ) else {
            warn!(sheet = %sheet_name, row, col, "skipping out-of-range xls cell");
            continue;
        };
        let Some(value) = convert_value(value) else {
            continue;
        };
        grid.entry(row)
            .or_insert_with(|| SheetRow::new(row))
            .cells
            .push((col, value));
    }

    let batch = rows_to_batch(grid.into_values().collect());
    debug!(
        sheet = %sheet_name,
        headers = batch.headers.len(),
        records = batch.len(),
        "parsed xls sheet"
    );
    Ok(batch)
}

#[allow(clippy::cast_precision_loss)]
fn convert_value(value: &Data) -> Option<CellValue> {
    match value {
        Data::Empty => None,
        Data::Bool(b) => Some(CellValue::Bool(*b)),
        Data::Int(n) => Some(CellValue::Number(*n as f64)),
        Data::Float(n) => Some(CellValue::Number(*n)),
        Data::String(s) => Some(CellValue::Text(s.clone())),
        Data::Error(e) => Some(CellValue::Text(e.to_string())),
        Data::DateTime(dt) if dt.is_datetime() => dt
            .as_datetime()
            .or_else(|| excel_serial_to_datetime(dt.as_f64(), false))
            .map(|d| CellValue::Date(format_iso(d)))
            .or_else(|| Some(CellValue::Number(dt.as_f64()))),
        // Durations stay as their day count
        Data::DateTime(dt) => Some(CellValue::Number(dt.as_f64())),
        Data::DateTimeIso(s) => Some(match parse_date_text(s) {
            Some(d) => CellValue::Date(format_iso(d)),
            None => CellValue::Text(s.clone()),
        }),
        Data::DurationIso(s) => Some(CellValue::Text(s.clone())),
    }
}
