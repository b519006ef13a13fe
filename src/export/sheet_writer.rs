//! Generates worksheet XML from header-keyed records.
//!
//! Text uses inline strings (`t="inlineStr"`), so the package needs no shared
//! string table.

use std::fmt::Write as _;

use crate::cell_ref::{cell_ref, col_to_letter};
use crate::dates::{datetime_to_excel_serial, has_time, parse_date_text};
use crate::types::{CellValue, RowRecord};

use super::package::{DATETIME_STYLE_IDX, DATE_STYLE_IDX};

/// Write a complete worksheet XML string: row 1 holds `headers`, each record
/// follows in order.
pub(crate) fn write_sheet_xml(headers: &[String], records: &[RowRecord]) -> String {
    let mut out = String::with_capacity(256 + records.len() * headers.len() * 32);
    out.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
    out.push('\n');
    out.push_str(
        r#"<worksheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main" "#,
    );
    out.push_str(
        r#"xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships">"#,
    );
    out.push('\n');

    // <dimension>
    if let Some(last_col) = headers.len().checked_sub(1) {
        let end_col = col_to_letter(u32::try_from(last_col).unwrap_or(u32::MAX));
        let _ = writeln!(out, "<dimension ref=\"A1:{}{}\"/>", end_col, records.len() + 1);
    }

    out.push_str("<sheetData>\n");
    if !headers.is_empty() {
        write_header_row(&mut out, headers);
        for (idx, record) in records.iter().enumerate() {
            let row = u32::try_from(idx + 1).unwrap_or(u32::MAX);
            write_record_row(&mut out, row, headers, record);
        }
    }
    out.push_str("</sheetData>\n");

    out.push_str("</worksheet>");
    out
}

fn write_header_row(out: &mut String, headers: &[String]) {
    out.push_str("<row r=\"1\">");
    for (col, header) in (0u32..).zip(headers) {
        write_inline_string(out, &cell_ref(col, 0), header);
    }
    out.push_str("</row>\n");
}

/// Write one record as row `row` (0-indexed). Absent keys leave gaps.
fn write_record_row(out: &mut String, row: u32, headers: &[String], record: &RowRecord) {
    let _ = write!(out, "<row r=\"{}\">", u64::from(row) + 1);
    for (col, header) in (0u32..).zip(headers) {
        if let Some(value) = record.get(header) {
            write_cell(out, &cell_ref(col, row), value);
        }
    }
    out.push_str("</row>\n");
}

/// Write a single `<c>` element.
fn write_cell(out: &mut String, reference: &str, value: &CellValue) {
    match value {
        CellValue::Text(s) => write_inline_string(out, reference, s),
        CellValue::Number(n) if n.is_finite() => {
            let _ = write!(out, "<c r=\"{reference}\"><v>{n}</v></c>");
        }
        CellValue::Number(_) => write_inline_string(out, reference, &value.to_text()),
        CellValue::Bool(b) => {
            let _ = write!(
                out,
                "<c r=\"{reference}\" t=\"b\"><v>{}</v></c>",
                u8::from(*b)
            );
        }
        CellValue::Date(s) => {
            let serial = parse_date_text(s)
                .and_then(|dt| datetime_to_excel_serial(dt).map(|serial| (serial, has_time(dt))));
            match serial {
                Some((serial, with_time)) => {
                    let style = if with_time {
                        DATETIME_STYLE_IDX
                    } else {
                        DATE_STYLE_IDX
                    };
                    let _ = write!(out, "<c r=\"{reference}\" s=\"{style}\"><v>{serial}</v></c>");
                }
                None => write_inline_string(out, reference, s),
            }
        }
    }
}

fn write_inline_string(out: &mut String, reference: &str, text: &str) {
    let _ = write!(out, "<c r=\"{reference}\" t=\"inlineStr\"><is><t");
    if text.starts_with(char::is_whitespace) || text.ends_with(char::is_whitespace) {
        out.push_str(" xml:space=\"preserve\"");
    }
    out.push('>');
    out.push_str(&xml_escape(text));
    out.push_str("</t></is></c>");
}

/// Minimal XML escaping for attribute/text content.
pub(crate) fn xml_escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&apos;"),
            // Control characters are not allowed in XML 1.0
            c if c.is_control() && !matches!(c, '\t' | '\n' | '\r') => {}
            _ => out.push(c),
        }
    }
    out
}
