//! CSV/TSV reader that produces the same records as the XLSX reader.

use ::csv::{ByteRecord, ReaderBuilder};
use tracing::debug;

use crate::error::{Result, XlmergeError};
use crate::parser::rows::{rows_to_batch, SheetRow};
use crate::types::{CellValue, RecordBatch};

const UTF8_BOM: &[u8] = b"\xEF\xBB\xBF";

/// Delimiter for parsing.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Delimiter {
    Comma,
    Tab,
}

impl Delimiter {
    fn as_byte(self) -> u8 {
        match self {
            Self::Comma => b',',
            Self::Tab => b'\t',
        }
    }
}

/// Parse CSV/TSV bytes into records. The first non-empty line is the header.
///
/// Quoted fields may span lines. Input must be UTF-8; anything else is a
/// [`XlmergeError::Parse`].
pub fn parse_delimited(data: &[u8], delim: Delimiter) -> Result<RecordBatch> {
    let data = data.strip_prefix(UTF8_BOM).unwrap_or(data);

    let mut reader = ReaderBuilder::new()
        .delimiter(delim.as_byte())
        .has_headers(false)
        .flexible(true)
        .from_reader(data);

    let mut rows: Vec<SheetRow> = Vec::new();
    let mut record = ByteRecord::new();
    let mut row_idx: u32 = 0;

    while reader.read_byte_record(&mut record).map_err(map_csv_error)? {
        let mut row = SheetRow::new(row_idx);
        for (col_idx, field) in record.iter().enumerate() {
            let text = std::str::from_utf8(field).map_err(|_| {
                XlmergeError::Parse(format!(
                    "invalid UTF-8 at line {}, column {}",
                    record.position().map_or(0, ::csv::Position::line),
                    col_idx + 1
                ))
            })?;
            let value = text.trim();
            if value.is_empty() {
                continue;
            }
            let col = u32::try_from(col_idx).unwrap_or(u32::MAX);
            row.cells.push((col, sniff_value(value)));
        }
        rows.push(row);
        row_idx = row_idx.saturating_add(1);
    }

    let batch = rows_to_batch(rows);
    debug!(
        delimiter = ?delim,
        headers = batch.headers.len(),
        records = batch.len(),
        "parsed delimited text"
    );
    Ok(batch)
}

fn map_csv_error(err: ::csv::Error) -> XlmergeError {
    match err.position() {
        Some(pos) => XlmergeError::Parse(format!("line {}: {err}", pos.line())),
        None => XlmergeError::Parse(err.to_string()),
    }
}

/// Numbers become [`CellValue::Number`]; everything else stays text.
fn sniff_value(value: &str) -> CellValue {
    let numeric_shape = value
        .chars()
        .all(|c| c.is_ascii_digit() || matches!(c, '.' | '-' | '+' | 'e' | 'E'));
    match value.parse::<f64>() {
        Ok(n) if numeric_shape && n.is_finite() => CellValue::Number(n),
        _ => CellValue::Text(value.to_string()),
    }
}

#[cfg(test)]
#[allow(
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::indexing_slicing,
    clippy::float_cmp
)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_csv_basic() {
        let data = b"Name,Age,City\nAlice,30,NYC\nBob,25,LA";
        let batch = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(batch.headers, ["Name", "Age", "City"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].text("Name"), "Alice");
        // "30" is parsed as number
        assert_eq!(batch.records[0].get("Age"), Some(&CellValue::Number(30.0)));
    }

    #[test]
    fn test_parse_tsv() {
        let data = b"A\tB\n1\t2";
        let batch = parse_delimited(data, Delimiter::Tab).unwrap();
        assert_eq!(batch.headers, ["A", "B"]);
        assert_eq!(batch.records[0].get("B"), Some(&CellValue::Number(2.0)));
    }

    #[test]
    fn test_quoted_csv() {
        let data = b"text,n\n\"Hello, World\",42\n\"She said \"\"hi\"\"\",0";
        let batch = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(batch.records[0].text("text"), "Hello, World");
        assert_eq!(batch.records[1].text("text"), "She said \"hi\"");
    }

    #[test]
    fn test_quoted_field_spans_lines() {
        let data = b"name,note\nAli,\"line one\nline two\"\nVeli,x\n";
        let batch = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(batch.headers, ["name", "note"]);
        assert_eq!(batch.len(), 2);
        assert_eq!(batch.records[0].text("note"), "line one\nline two");
        assert_eq!(batch.records[1].text("name"), "Veli");
    }

    #[test]
    fn test_bom_and_blank_lines() {
        let data = "\u{feff}id,date\r\n\r\n1,2024-01-05\r\n".as_bytes();
        let batch = parse_delimited(data, Delimiter::Comma).unwrap();
        assert_eq!(batch.headers, ["id", "date"]);
        assert_eq!(batch.len(), 1);
        assert_eq!(batch.records[0].text("date"), "2024-01-05");
    }

    #[test]
    fn test_invalid_utf8_is_rejected() {
        let data = b"name\nAl\xff\n";
        let err = parse_delimited(data, Delimiter::Comma).unwrap_err();
        assert!(matches!(err, XlmergeError::Parse(ref msg) if msg.contains("UTF-8")));
    }

    #[test]
    fn test_words_are_not_numbers() {
        assert_eq!(sniff_value("inf"), CellValue::Text("inf".into()));
        assert_eq!(sniff_value("NaN"), CellValue::Text("NaN".into()));
        assert_eq!(sniff_value("-2.5"), CellValue::Number(-2.5));
    }

    #[test]
    fn test_empty_csv() {
        let batch = parse_delimited(b"", Delimiter::Comma).unwrap();
        assert!(batch.is_empty());
        assert!(batch.headers.is_empty());
    }
}
