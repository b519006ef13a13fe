use serde::de::{MapAccess, Visitor};
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::fmt;
use std::num::FpCategory;

/// A single cell value as read from an upload.
///
/// The codec only records what the file itself says. Whether a `Text` value
/// is date-like is decided at filter time.
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    Text(String),
    Number(f64),
    Bool(bool),
    /// ISO-8601 text (`YYYY-MM-DD` or `YYYY-MM-DDTHH:MM:SS`) from a
    /// date-formatted cell.
    Date(String),
}

impl CellValue {
    /// Text form used for substring filtering and display.
    #[must_use]
    pub fn to_text(&self) -> String {
        match self {
            Self::Text(s) | Self::Date(s) => s.clone(),
            Self::Number(n) => number_text(*n),
            Self::Bool(b) => b.to_string(),
        }
    }

    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) | Self::Date(s) => Some(s),
            Self::Number(_) | Self::Bool(_) => None,
        }
    }
}

/// Number text as a browser prints it: plain decimals, switching to
/// exponent form (`1e+21`, `1e-7`) outside `1e-6 <= |n| < 1e21`.
#[must_use]
pub(crate) fn number_text(n: f64) -> String {
    match n.classify() {
        FpCategory::Nan => return "NaN".to_string(),
        FpCategory::Infinite if n > 0.0 => return "Infinity".to_string(),
        FpCategory::Infinite => return "-Infinity".to_string(),
        FpCategory::Zero => return "0".to_string(),
        FpCategory::Subnormal | FpCategory::Normal => {}
    }
    let abs = n.abs();
    if (1e-6..1e21).contains(&abs) {
        return n.to_string();
    }
    let exp = format!("{n:e}");
    match exp.split_once('e') {
        Some((mantissa, power)) if !power.starts_with('-') => format!("{mantissa}e+{power}"),
        _ => exp,
    }
}

impl From<&str> for CellValue {
    fn from(s: &str) -> Self {
        Self::Text(s.to_string())
    }
}

impl From<String> for CellValue {
    fn from(s: String) -> Self {
        Self::Text(s)
    }
}

impl From<f64> for CellValue {
    fn from(n: f64) -> Self {
        Self::Number(n)
    }
}

impl From<i32> for CellValue {
    fn from(n: i32) -> Self {
        Self::Number(f64::from(n))
    }
}

impl From<bool> for CellValue {
    fn from(b: bool) -> Self {
        Self::Bool(b)
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Text(s) | Self::Date(s) => f.write_str(s),
            Self::Number(n) => f.write_str(&number_text(*n)),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

/// Dates carry a marker object so they survive a JSON round-trip as dates.
#[derive(Serialize)]
struct DateMarker<'a> {
    date: &'a str,
}

impl Serialize for CellValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Text(s) => serializer.serialize_str(s),
            Self::Number(n) => serializer.serialize_f64(*n),
            Self::Bool(b) => serializer.serialize_bool(*b),
            Self::Date(s) => DateMarker { date: s }.serialize(serializer),
        }
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum CellRepr {
    Bool(bool),
    Number(f64),
    Text(String),
    Date { date: String },
}

impl<'de> Deserialize<'de> for CellValue {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        Ok(match CellRepr::deserialize(deserializer)? {
            CellRepr::Bool(b) => Self::Bool(b),
            CellRepr::Number(n) => Self::Number(n),
            CellRepr::Text(s) => Self::Text(s),
            CellRepr::Date { date } => Self::Date(date),
        })
    }
}

/// One spreadsheet row as an ordered header → value mapping.
///
/// Key order is the column order of the source sheet. A header with no value
/// in this row is simply absent.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RowRecord {
    fields: Vec<(String, CellValue)>,
}

impl RowRecord {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            fields: Vec::with_capacity(capacity),
        }
    }

    /// Set `header` to `value`, keeping the original position if the header
    /// already exists. Returns the previous value.
    pub fn insert(&mut self, header: impl Into<String>, value: CellValue) -> Option<CellValue> {
        let header = header.into();
        if let Some(slot) = self.fields.iter_mut().find(|(h, _)| *h == header) {
            return Some(std::mem::replace(&mut slot.1, value));
        }
        self.fields.push((header, value));
        None
    }

    #[must_use]
    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.fields
            .iter()
            .find(|(h, _)| h == header)
            .map(|(_, v)| v)
    }

    /// Text form of the value at `header`; absent values coerce to `""`.
    #[must_use]
    pub fn text(&self, header: &str) -> String {
        self.get(header).map(CellValue::to_text).unwrap_or_default()
    }

    pub fn headers(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|(h, _)| h.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &CellValue)> {
        self.fields.iter().map(|(h, v)| (h.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl<K: Into<String>> FromIterator<(K, CellValue)> for RowRecord {
    fn from_iter<I: IntoIterator<Item = (K, CellValue)>>(iter: I) -> Self {
        let mut record = Self::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl Serialize for RowRecord {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.fields.len()))?;
        for (h, v) in &self.fields {
            map.serialize_entry(h, v)?;
        }
        map.end()
    }
}

struct RowRecordVisitor;

impl<'de> Visitor<'de> for RowRecordVisitor {
    type Value = RowRecord;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("an object mapping column headers to cell values")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<RowRecord, A::Error> {
        let mut record = RowRecord::with_capacity(access.size_hint().unwrap_or(0));
        while let Some((header, value)) = access.next_entry::<String, Option<CellValue>>()? {
            // null cells are treated as absent
            if let Some(value) = value {
                record.insert(header, value);
            }
        }
        Ok(record)
    }
}

impl<'de> Deserialize<'de> for RowRecord {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_map(RowRecordVisitor)
    }
}

/// Output of the codec's read side: the header row plus the data rows.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct RecordBatch {
    /// Column headers from the first row, in column order.
    pub headers: Vec<String>,
    pub records: Vec<RowRecord>,
}

impl RecordBatch {
    /// Build a batch from bare records, taking headers from the first record.
    #[must_use]
    pub fn from_records(records: Vec<RowRecord>) -> Self {
        let headers = records
            .first()
            .map(|r| r.headers().map(ToString::to_string).collect())
            .unwrap_or_default();
        Self { headers, records }
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.records.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}
