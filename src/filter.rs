//! Filter engine: per-column substring predicates plus a date-range predicate.
//!
//! Filtering is a stable linear scan that borrows the surviving records; it
//! never reorders or copies them.

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::dates::{excel_serial_to_datetime, parse_date_text, MAX_EXCEL_SERIAL};
use crate::types::{CellValue, DateRange, FilterOptions, FilterState, RowRecord};

/// Counts shown under the result table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultSummary {
    pub shown: usize,
    pub total: usize,
    /// True exactly when `shown == 0`.
    pub no_results: bool,
}

/// The records that passed the active filters, in input order.
#[derive(Debug, Clone, Default)]
pub struct FilteredView<'a> {
    records: Vec<&'a RowRecord>,
}

impl<'a> FilteredView<'a> {
    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    /// The "no results" signal.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    #[must_use]
    pub fn records(&self) -> &[&'a RowRecord] {
        &self.records
    }

    pub fn iter(&self) -> impl Iterator<Item = &'a RowRecord> + '_ {
        self.records.iter().copied()
    }

    /// Clone the surviving records out of the view.
    #[must_use]
    pub fn to_records(&self) -> Vec<RowRecord> {
        self.records.iter().map(|r| (*r).clone()).collect()
    }

    #[must_use]
    pub fn summary(&self, total: usize) -> ResultSummary {
        ResultSummary {
            shown: self.len(),
            total,
            no_results: self.is_empty(),
        }
    }
}

/// Lower-cased predicate data, computed once per filter run.
struct Predicates<'s> {
    needles: Vec<(&'s str, String)>,
    range: Option<DateRange>,
    keywords: Vec<String>,
    date1904: bool,
}

impl<'s> Predicates<'s> {
    fn new(state: &'s FilterState, options: &FilterOptions) -> Self {
        let needles = state
            .columns
            .iter()
            .filter(|(_, needle)| !needle.is_empty())
            .map(|(header, needle)| (header.as_str(), needle.to_lowercase()))
            .collect();
        let range = state.date_filter_engaged().then_some(state.date_range);
        let keywords = options
            .date_header_keywords
            .iter()
            .filter(|k| !k.is_empty())
            .map(|k| k.to_lowercase())
            .collect();
        Self {
            needles,
            range,
            keywords,
            date1904: options.date1904,
        }
    }

    fn matches_columns(&self, record: &RowRecord) -> bool {
        self.needles.iter().all(|(header, needle)| {
            record
                .get(header)
                .map(CellValue::to_text)
                .unwrap_or_default()
                .to_lowercase()
                .contains(needle.as_str())
        })
    }

    fn is_date_header(&self, header: &str) -> bool {
        let lower = header.to_lowercase();
        self.keywords.iter().any(|k| lower.contains(k.as_str()))
    }

    /// Every date-like cell must fall inside the range. Cells whose date
    /// cannot be read are skipped; `unreadable` counts them.
    fn matches_dates(&self, record: &RowRecord, range: &DateRange, unreadable: &mut usize) -> bool {
        record.iter().all(|(header, value)| {
            let date_header = self.is_date_header(header);
            match cell_date(value, date_header, self.date1904) {
                Some(date) => range.contains(date),
                None => {
                    if date_header && !matches!(value, CellValue::Text(s) if s.trim().is_empty()) {
                        *unreadable += 1;
                    }
                    true
                }
            }
        })
    }
}

/// The calendar date a cell holds, if it is date-like.
///
/// Text and date cells are sniffed as date text. Numbers count only in
/// date-named columns, as Excel serials.
#[must_use]
pub fn cell_date(value: &CellValue, date_header: bool, date1904: bool) -> Option<NaiveDate> {
    match value {
        CellValue::Text(s) | CellValue::Date(s) => parse_date_text(s).map(|dt| dt.date()),
        CellValue::Number(n) if date_header && (1.0..=MAX_EXCEL_SERIAL).contains(n) => {
            excel_serial_to_datetime(*n, date1904).map(|dt| dt.date())
        }
        CellValue::Number(_) | CellValue::Bool(_) => None,
    }
}

/// Apply `state` to `records`.
///
/// A record passes when every non-empty column needle is a case-insensitive
/// substring of its cell text and, if the date filter is engaged, every
/// date-like cell lies within the range.
#[must_use]
pub fn filter_records<'a>(
    records: &'a [RowRecord],
    state: &FilterState,
    options: &FilterOptions,
) -> FilteredView<'a> {
    if state.is_identity() {
        return FilteredView {
            records: records.iter().collect(),
        };
    }

    let predicates = Predicates::new(state, options);
    let mut unreadable = 0usize;
    let kept: Vec<&RowRecord> = records
        .iter()
        .filter(|record| {
            predicates.matches_columns(record)
                && predicates
                    .range
                    .as_ref()
                    .map_or(true, |range| predicates.matches_dates(record, range, &mut unreadable))
        })
        .collect();

    if unreadable > 0 {
        warn!(cells = unreadable, "date column values could not be read as dates; skipped");
    }
    debug!(
        total = records.len(),
        shown = kept.len(),
        columns = predicates.needles.len(),
        date_filter = predicates.range.is_some(),
        "filtered records"
    );

    FilteredView { records: kept }
}

/// [`filter_records`] with default options.
#[must_use]
pub fn filter<'a>(records: &'a [RowRecord], state: &FilterState) -> FilteredView<'a> {
    filter_records(records, state, &FilterOptions::default())
}
