use serde::{Deserialize, Serialize};

/// Header keywords that mark a column as holding dates.
pub const DEFAULT_DATE_HEADER_KEYWORDS: [&str; 2] = ["date", "tarih"];

/// Default sheet name of a merge export.
pub const DEFAULT_SHEET_NAME: &str = "Merged Data";

/// Default download name of a merge export.
pub const DEFAULT_EXPORT_FILE_NAME: &str = "merged_excel.xlsx";

/// Tuning for the filter engine.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct FilterOptions {
    /// Case-insensitive substrings; a header containing any of them is a
    /// date column.
    pub date_header_keywords: Vec<String>,
    /// Read numeric cells in date columns as 1904-system serials.
    pub date1904: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            date_header_keywords: DEFAULT_DATE_HEADER_KEYWORDS
                .iter()
                .map(ToString::to_string)
                .collect(),
            date1904: false,
        }
    }
}

/// Naming for the merge export artifact.
#[derive(Debug, Serialize, Deserialize, Clone, PartialEq, Eq)]
#[serde(rename_all = "camelCase", default)]
pub struct ExportOptions {
    pub sheet_name: String,
    pub file_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
            file_name: DEFAULT_EXPORT_FILE_NAME.to_string(),
        }
    }
}
