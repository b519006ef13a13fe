//! Browser API over [`Session`].
//!
//! # Usage (JavaScript)
//!
//! ```javascript
//! import init, { XlMerge } from 'xlmerge';
//! await init();
//! const app = new XlMerge();
//! app.load(file.name, new Uint8Array(await file.arrayBuffer()));
//! app.set_column_filter('name', 'ali');
//! const rows = app.filtered_rows();
//! const bytes = app.merge_and_export(); // undefined when nothing is loaded
//! ```

use serde::Serialize;
use wasm_bindgen::prelude::*;

use crate::session::Session;
use crate::types::{DateRange, ExportOptions, FilterOptions};

/// Serialize with plain JS objects for maps, so rows come out as
/// `{header: value}` objects.
fn to_js_value<T: Serialize + ?Sized>(value: &T) -> Result<JsValue, JsValue> {
    value
        .serialize(&serde_wasm_bindgen::Serializer::json_compatible())
        .map_err(|e| JsValue::from_str(&format!("Serialization error: {e}")))
}

/// Upload, filter and merge state for one page.
#[wasm_bindgen]
pub struct XlMerge {
    session: Session,
}

#[wasm_bindgen]
impl XlMerge {
    #[wasm_bindgen(constructor)]
    #[must_use]
    pub fn new() -> XlMerge {
        console_error_panic_hook::set_once();
        XlMerge {
            session: Session::new(),
        }
    }

    /// Create with `FilterOptions` / `ExportOptions` objects; `undefined`
    /// keeps the defaults.
    #[wasm_bindgen(js_name = "withOptions")]
    pub fn with_options(filter_options: JsValue, export_options: JsValue) -> Result<XlMerge, JsValue> {
        console_error_panic_hook::set_once();
        let filter_options: FilterOptions = if filter_options.is_undefined() {
            FilterOptions::default()
        } else {
            serde_wasm_bindgen::from_value(filter_options)?
        };
        let export_options: ExportOptions = if export_options.is_undefined() {
            ExportOptions::default()
        } else {
            serde_wasm_bindgen::from_value(export_options)?
        };
        Ok(XlMerge {
            session: Session::with_options(filter_options, export_options),
        })
    }

    /// Load an uploaded file as the new record set. Returns the record count.
    pub fn load(&mut self, name: &str, data: &[u8]) -> Result<usize, JsValue> {
        self.session.load_upload(name, data).map_err(JsValue::from)
    }

    /// Load the new record set from a snapshot string.
    pub fn restore(&mut self, text: &str) -> Result<usize, JsValue> {
        self.session.restore(text).map_err(JsValue::from)
    }

    /// Snapshot of the new record set; `undefined` when it is empty.
    pub fn snapshot(&self) -> Result<Option<String>, JsValue> {
        self.session.snapshot().map_err(JsValue::from)
    }

    #[must_use]
    pub fn headers(&self) -> Vec<String> {
        self.session.headers()
    }

    pub fn set_column_filter(&mut self, header: &str, needle: &str) {
        self.session.filters.set_column_filter(header, needle);
    }

    pub fn clear_column_filters(&mut self) {
        self.session.filters.clear_column_filters();
    }

    /// Set the bounds from two date-input values (`YYYY-MM-DD` or empty).
    pub fn set_date_range(&mut self, start: &str, end: &str) -> Result<(), JsValue> {
        let start = DateRange::parse_bound(start).map_err(JsValue::from)?;
        let end = DateRange::parse_bound(end).map_err(JsValue::from)?;
        self.session.filters.set_date_range(DateRange::new(start, end));
        Ok(())
    }

    pub fn apply_date_filter(&mut self) -> Result<(), JsValue> {
        self.session.filters.apply_date_filter().map_err(JsValue::from)
    }

    pub fn clear_date_filter(&mut self) {
        self.session.filters.clear_date_filter();
    }

    #[must_use]
    pub fn is_date_filtered(&self) -> bool {
        self.session.filters.date_filter_engaged()
    }

    /// Rows passing the active filters, as an array of objects.
    pub fn filtered_rows(&self) -> Result<JsValue, JsValue> {
        to_js_value(self.session.filtered().records())
    }

    /// `{ shown, total, noResults }`
    pub fn summary(&self) -> Result<JsValue, JsValue> {
        to_js_value(&self.session.summary())
    }

    #[must_use]
    pub fn can_merge(&self) -> bool {
        self.session.can_merge()
    }

    /// Merge the new set into the main set and return the workbook bytes,
    /// or `undefined` when there is nothing to merge.
    pub fn merge_and_export(&mut self) -> Result<Option<Vec<u8>>, JsValue> {
        let artifact = self.session.merge_and_export().map_err(JsValue::from)?;
        Ok(artifact.map(|a| a.bytes))
    }

    #[must_use]
    pub fn export_file_name(&self) -> String {
        self.session.export_options.file_name.clone()
    }

    #[must_use]
    pub fn main_len(&self) -> usize {
        self.session.main().len()
    }

    #[must_use]
    pub fn new_len(&self) -> usize {
        self.session.new_records().len()
    }
}

impl Default for XlMerge {
    fn default() -> Self {
        Self::new()
    }
}
