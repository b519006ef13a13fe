//! Structured error types for xlmerge.

/// All errors that can occur while reading, filtering, or writing record sets.
#[derive(Debug, thiserror::Error)]
pub enum XlmergeError {
    /// XML parsing error from quick-xml.
    #[error("XML parsing: {0}")]
    Xml(#[from] quick_xml::Error),

    /// ZIP archive error.
    #[error("ZIP archive: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Legacy BIFF (`.xls`) workbook error from calamine.
    #[error("XLS workbook: {0}")]
    Xls(#[from] calamine::XlsError),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Snapshot (de)serialization error.
    #[error("JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The uploaded workbook is structurally invalid.
    #[error("Parse error: {0}")]
    Parse(String),

    /// The upload is not a spreadsheet format we can read.
    #[error("Unsupported file format: {0}")]
    UnsupportedFormat(String),

    /// A user action was rejected before any state changed.
    #[error("{0}")]
    Validation(String),
}

/// Convenience alias used throughout the crate.
pub type Result<T> = std::result::Result<T, XlmergeError>;

impl From<XlmergeError> for wasm_bindgen::JsValue {
    fn from(e: XlmergeError) -> Self {
        wasm_bindgen::JsValue::from_str(&e.to_string())
    }
}
