//! Common test utilities and assertion helpers.
//!
//! Record construction, date shorthands and panicking parse wrappers shared
//! by the integration tests.
#![allow(
    dead_code,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp,
    clippy::panic
)]

use chrono::NaiveDate;
use xlmerge::parser::{parse_records, parse_upload};
use xlmerge::{CellValue, RecordBatch, RowRecord};

// Re-export fixtures for convenience
pub use super::fixtures::*;

/// Parse XLSX bytes, panicking with the error on failure.
#[must_use]
pub fn parse(data: &[u8]) -> RecordBatch {
    parse_records(data).unwrap_or_else(|e| panic!("failed to parse workbook: {e}"))
}

/// Parse an upload by file name, panicking with the error on failure.
#[must_use]
pub fn parse_named(name: &str, data: &[u8]) -> RecordBatch {
    parse_upload(name, data).unwrap_or_else(|e| panic!("failed to parse {name}: {e}"))
}

/// Build a record from `(header, value)` pairs, keeping their order.
#[must_use]
pub fn record<V: Into<CellValue> + Clone>(pairs: &[(&str, V)]) -> RowRecord {
    pairs
        .iter()
        .map(|(h, v)| (*h, v.clone().into()))
        .collect()
}

#[must_use]
pub fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

/// The text of `header` for each record, in order.
#[must_use]
pub fn column<'a, I>(records: I, header: &str) -> Vec<String>
where
    I: IntoIterator<Item = &'a RowRecord>,
{
    records.into_iter().map(|r| r.text(header)).collect()
}

/// Assert that a record's value at `header` is the given number.
pub fn assert_number(record: &RowRecord, header: &str, expected: f64) {
    match record.get(header) {
        Some(CellValue::Number(n)) => assert_eq!(*n, expected, "value at {header}"),
        other => panic!("expected number {expected} at {header}, got {other:?}"),
    }
}

/// Assert that a record's value at `header` is a date cell with this ISO text.
pub fn assert_date(record: &RowRecord, header: &str, expected: &str) {
    match record.get(header) {
        Some(CellValue::Date(s)) => assert_eq!(s, expected, "value at {header}"),
        other => panic!("expected date {expected} at {header}, got {other:?}"),
    }
}

/// `name` / `date` / `amount` records with dates as plain ISO text.
#[must_use]
pub fn orders() -> Vec<RowRecord> {
    vec![
        [
            ("name", CellValue::from("Ali")),
            ("date", CellValue::from("2024-01-05")),
            ("amount", CellValue::from(10)),
        ]
        .into_iter()
        .collect(),
        [
            ("name", CellValue::from("Veli")),
            ("date", CellValue::from("2024-01-10")),
            ("amount", CellValue::from(20)),
        ]
        .into_iter()
        .collect(),
        [
            ("name", CellValue::from("Ayse")),
            ("date", CellValue::from("2024-01-15")),
            ("amount", CellValue::from(30)),
        ]
        .into_iter()
        .collect(),
    ]
}
