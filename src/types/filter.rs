use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::error::{Result, XlmergeError};

/// Inclusive calendar-date bounds; either side may be open.
#[derive(Debug, Serialize, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DateRange {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<NaiveDate>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<NaiveDate>,
}

impl DateRange {
    #[must_use]
    pub const fn new(start: Option<NaiveDate>, end: Option<NaiveDate>) -> Self {
        Self { start, end }
    }

    /// True when neither bound is set.
    #[must_use]
    pub const fn is_unbounded(&self) -> bool {
        self.start.is_none() && self.end.is_none()
    }

    /// Inclusive on both ends; a missing bound is infinite.
    #[must_use]
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start.map_or(true, |s| date >= s) && self.end.map_or(true, |e| date <= e)
    }

    /// Parse the value of an HTML date input (`YYYY-MM-DD`).
    ///
    /// Blank text means "no bound".
    ///
    /// # Errors
    /// Returns a validation error for non-blank text that is not a date.
    pub fn parse_bound(text: &str) -> Result<Option<NaiveDate>> {
        let text = text.trim();
        if text.is_empty() {
            return Ok(None);
        }
        NaiveDate::parse_from_str(text, "%Y-%m-%d")
            .map(Some)
            .map_err(|e| XlmergeError::Validation(format!("invalid date '{text}': {e}")))
    }
}

/// The active per-column and date-range predicates for one session.
#[derive(Debug, Serialize, Deserialize, Clone, Default, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct FilterState {
    /// Header → substring needle. Empty needles impose no constraint.
    #[serde(default)]
    pub columns: BTreeMap<String, String>,
    #[serde(default)]
    pub date_range: DateRange,
    /// Set by [`FilterState::apply_date_filter`], cleared by
    /// [`FilterState::clear_date_filter`].
    #[serde(default)]
    pub date_active: bool,
}

impl FilterState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_column_filter(&mut self, header: impl Into<String>, needle: impl Into<String>) {
        self.columns.insert(header.into(), needle.into());
    }

    pub fn clear_column_filters(&mut self) {
        self.columns.clear();
    }

    pub fn set_date_start(&mut self, start: Option<NaiveDate>) {
        self.date_range.start = start;
    }

    pub fn set_date_end(&mut self, end: Option<NaiveDate>) {
        self.date_range.end = end;
    }

    pub fn set_date_range(&mut self, range: DateRange) {
        self.date_range = range;
    }

    /// Turn the date predicate on.
    ///
    /// # Errors
    /// Fails without touching state when neither bound is set.
    pub fn apply_date_filter(&mut self) -> Result<()> {
        if self.date_range.is_unbounded() {
            return Err(XlmergeError::Validation(
                "select at least one date before filtering by date".to_string(),
            ));
        }
        self.date_active = true;
        Ok(())
    }

    /// Drop both bounds and turn the date predicate off.
    pub fn clear_date_filter(&mut self) {
        self.date_range = DateRange::default();
        self.date_active = false;
    }

    /// True when the date predicate takes part in filtering.
    #[must_use]
    pub const fn date_filter_engaged(&self) -> bool {
        self.date_active && !self.date_range.is_unbounded()
    }

    /// True when filtering would return every record unchanged.
    #[must_use]
    pub fn is_identity(&self) -> bool {
        !self.date_filter_engaged() && self.columns.values().all(String::is_empty)
    }

    /// Back to the state of a fresh upload.
    pub fn reset(&mut self) {
        *self = Self::default();
    }
}
