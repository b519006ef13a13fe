//! Turns a sparse cell grid into header-keyed records.
//!
//! Shared by the XLSX and delimited-text readers.

use std::collections::HashMap;

use crate::types::{CellValue, RecordBatch, RowRecord};

/// Placeholder header for an empty cell in the header row.
pub(crate) const EMPTY_HEADER: &str = "__EMPTY";

/// One physical sheet row: 0-indexed row number plus its populated cells.
#[derive(Debug, Default, Clone)]
pub(crate) struct SheetRow {
    pub row: u32,
    /// (0-indexed column, value), in column order.
    pub cells: Vec<(u32, CellValue)>,
}

impl SheetRow {
    pub fn new(row: u32) -> Self {
        Self {
            row,
            cells: Vec::new(),
        }
    }
}

/// Build header names for columns `first..=last` from the header row.
///
/// Empty header cells become `__EMPTY`, `__EMPTY_1`, ...; repeated names get
/// `_1`, `_2`, ... suffixes, skipping any suffixed name already in use.
fn header_names(header_row: &SheetRow, first: u32, last: u32) -> Vec<(u32, String)> {
    // name -> next suffix to try
    let mut seen: HashMap<String, usize> = HashMap::new();
    let mut headers = Vec::new();

    for col in first..=last {
        let base = header_row
            .cells
            .iter()
            .find(|(c, _)| *c == col)
            .map(|(_, v)| v.to_text())
            .filter(|t| !t.is_empty())
            .unwrap_or_else(|| EMPTY_HEADER.to_string());

        let name = match seen.get(&base).copied() {
            Some(mut count) => {
                let mut candidate = format!("{base}_{count}");
                while seen.contains_key(&candidate) {
                    count += 1;
                    candidate = format!("{base}_{count}");
                }
                seen.insert(base, count + 1);
                seen.insert(candidate.clone(), 1);
                candidate
            }
            None => {
                seen.insert(base.clone(), 1);
                base
            }
        };
        headers.push((col, name));
    }

    headers
}

/// Convert grid rows to a [`RecordBatch`].
///
/// Rows are taken in row-number order. The first row with any value is the
/// header row. Blank rows are dropped; a record only carries keys for the
/// cells its row actually has.
pub(crate) fn rows_to_batch(mut rows: Vec<SheetRow>) -> RecordBatch {
    rows.sort_by_key(|r| r.row);
    let mut rows = rows.into_iter().filter(|r| !r.cells.is_empty());

    let Some(header_row) = rows.next() else {
        return RecordBatch::default();
    };
    let data_rows: Vec<SheetRow> = rows.collect();

    let cols = std::iter::once(&header_row)
        .chain(data_rows.iter())
        .flat_map(|r| r.cells.iter().map(|(c, _)| *c));
    let (first, last) = cols.fold((u32::MAX, 0), |(lo, hi), c| (lo.min(c), hi.max(c)));

    let headers = header_names(&header_row, first, last);
    let header_for: HashMap<u32, &str> = headers.iter().map(|(c, h)| (*c, h.as_str())).collect();

    let records = data_rows
        .into_iter()
        .map(|row| {
            let mut record = RowRecord::with_capacity(row.cells.len());
            for (col, value) in row.cells {
                if let Some(header) = header_for.get(&col) {
                    record.insert(*header, value);
                }
            }
            record
        })
        .collect();

    RecordBatch {
        headers: headers.into_iter().map(|(_, h)| h).collect(),
        records,
    }
}
