//! xlmerge - spreadsheet upload, filter and merge for the web
//!
//! Reads the first sheet of an uploaded workbook into header-keyed records,
//! filters them by column text and date range, and merges them into an
//! accumulated set that is written back out as XLSX:
//! - XLSX, legacy XLS, CSV and TSV uploads
//! - Case-insensitive column filters, inclusive date ranges
//! - Single-sheet XLSX export with real date cells
//!
//! # Usage (Rust)
//!
//! ```no_run
//! use xlmerge::Session;
//!
//! # fn main() -> xlmerge::Result<()> {
//! let mut session = Session::new();
//! session.load_upload("orders.xlsx", &std::fs::read("orders.xlsx")?)?;
//! session.filters.set_column_filter("customer", "ali");
//! println!("{} rows match", session.filtered().len());
//! if let Some(artifact) = session.merge_and_export()? {
//!     std::fs::write(&artifact.file_name, &artifact.bytes)?;
//! }
//! # Ok(())
//! # }
//! ```

// Codec
pub mod cell_ref;
pub mod csv;
pub mod dates;
pub mod error;
pub mod export;
pub mod parser;
pub mod types;
pub mod xml_helpers;

// Record pipeline
pub mod filter;
pub mod merge;
pub mod session;
pub mod snapshot;

// Browser surface
pub mod wasm;

use wasm_bindgen::prelude::*;

pub use error::{Result, XlmergeError};
pub use filter::{filter, filter_records, FilteredView, ResultSummary};
pub use merge::{merge, merge_and_export, ExportArtifact, XLSX_MIME_TYPE};
pub use session::Session;
pub use types::*;
pub use wasm::XlMerge;

/// Parse an XLSX file and return `{ headers, records }` as a `JsValue`.
///
/// # Errors
/// Returns an error if the XLSX file is invalid or cannot be parsed.
#[wasm_bindgen]
pub fn parse_records_to_js(data: &[u8]) -> std::result::Result<JsValue, JsValue> {
    let batch = parser::parse_records(data).map_err(JsValue::from)?;

    serde::Serialize::serialize(&batch, &serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Get the library version
#[must_use]
#[wasm_bindgen]
pub fn version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}
