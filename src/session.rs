//! One user's working state: the main and new record sets plus filters.

use tracing::info;

use crate::error::Result;
use crate::filter::{filter_records, FilteredView, ResultSummary};
use crate::merge::{merge_and_export, ExportArtifact};
use crate::parser::parse_upload;
use crate::snapshot;
use crate::types::{ExportOptions, FilterOptions, FilterState, RowRecord};

/// Owns everything the upload → filter → merge flow mutates.
#[derive(Debug, Clone, Default)]
pub struct Session {
    main: Vec<RowRecord>,
    new: Vec<RowRecord>,
    /// Active filters over the new set.
    pub filters: FilterState,
    pub filter_options: FilterOptions,
    pub export_options: ExportOptions,
}

impl Session {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_options(filter_options: FilterOptions, export_options: ExportOptions) -> Self {
        Self {
            filter_options,
            export_options,
            ..Self::default()
        }
    }

    /// The accumulated merge target.
    #[must_use]
    pub fn main(&self) -> &[RowRecord] {
        &self.main
    }

    /// The most recently loaded batch.
    #[must_use]
    pub fn new_records(&self) -> &[RowRecord] {
        &self.new
    }

    /// Parse an uploaded file and make it the new set.
    ///
    /// On error nothing changes. On success the filters are reset.
    pub fn load_upload(&mut self, name: &str, data: &[u8]) -> Result<usize> {
        let batch = parse_upload(name, data)?;
        info!(file = name, records = batch.len(), "loaded upload");
        self.load_records(batch.records);
        Ok(self.new.len())
    }

    /// Replace the new set and reset the filters.
    pub fn load_records(&mut self, records: Vec<RowRecord>) {
        self.new = records;
        self.filters.reset();
    }

    /// Replace the main set.
    pub fn set_main(&mut self, records: Vec<RowRecord>) {
        self.main = records;
    }

    #[must_use]
    pub fn filtered(&self) -> FilteredView<'_> {
        filter_records(&self.new, &self.filters, &self.filter_options)
    }

    #[must_use]
    pub fn summary(&self) -> ResultSummary {
        self.filtered().summary(self.new.len())
    }

    /// Column headers of the new set, taken from its first record.
    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.new
            .first()
            .map(|r| r.headers().map(ToString::to_string).collect())
            .unwrap_or_default()
    }

    /// Merging is offered only while a new set is loaded.
    #[must_use]
    pub fn can_merge(&self) -> bool {
        !self.new.is_empty()
    }

    /// Append the new set to the main set and export the result.
    ///
    /// Returns `Ok(None)` without touching state when there is nothing to
    /// merge.
    pub fn merge_and_export(&mut self) -> Result<Option<ExportArtifact>> {
        if !self.can_merge() {
            return Ok(None);
        }
        merge_and_export(&mut self.main, &self.new, &self.export_options).map(Some)
    }

    /// Snapshot of the new set, or `None` when it is empty.
    pub fn snapshot(&self) -> Result<Option<String>> {
        snapshot::encode(&self.new)
    }

    /// Load the new set from a snapshot. On error nothing changes.
    pub fn restore(&mut self, text: &str) -> Result<usize> {
        let records = snapshot::decode(text)?;
        self.load_records(records);
        Ok(self.new.len())
    }
}
