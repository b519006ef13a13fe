//! Text snapshot of the new record set, for browser key-value storage.
//!
//! The shape is a JSON array of header → value objects in column order. Dates
//! are stored as `{"date": "<iso>"}` so they restore as dates.

use tracing::debug;

use crate::error::Result;
use crate::types::RowRecord;

/// Storage key the embedder persists the snapshot under.
pub const STORAGE_KEY: &str = "excelData";

/// Serialize `records`. An empty set produces nothing to persist.
pub fn encode(records: &[RowRecord]) -> Result<Option<String>> {
    if records.is_empty() {
        return Ok(None);
    }
    let text = serde_json::to_string(records)?;
    debug!(records = records.len(), bytes = text.len(), "encoded snapshot");
    Ok(Some(text))
}

/// Restore records from a snapshot produced by [`encode`].
pub fn decode(text: &str) -> Result<Vec<RowRecord>> {
    let records: Vec<RowRecord> = serde_json::from_str(text)?;
    debug!(records = records.len(), "decoded snapshot");
    Ok(records)
}
