//! Worksheet parsing - reads `<sheetData>` into typed grid rows.

use quick_xml::events::{BytesEnd, BytesStart, Event};
use quick_xml::Reader;
use std::io::{BufReader, Read, Seek};
use tracing::warn;
use zip::ZipArchive;

use crate::cell_ref::parse_cell_ref_bytes;
use crate::dates::{excel_serial_to_datetime, format_iso, parse_date_text};
use crate::error::{Result, XlmergeError};
use crate::types::CellValue;
use crate::xml_helpers::text_content;

use super::rows::SheetRow;
use super::styles::DateStyles;

/// Cell type tag from the `t` attribute of a `<c>` element.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub(super) enum CellTypeTag {
    Shared,
    Inline,
    Str,
    Bool,
    Error,
    Date,
    Number,
}

pub(super) fn parse_cell_type_tag(value: &[u8]) -> CellTypeTag {
    match value {
        b"s" => CellTypeTag::Shared,
        b"b" => CellTypeTag::Bool,
        b"e" => CellTypeTag::Error,
        b"str" => CellTypeTag::Str,
        b"inlineStr" => CellTypeTag::Inline,
        b"d" => CellTypeTag::Date,
        _ => CellTypeTag::Number,
    }
}

pub(super) fn parse_u32_bytes(value: &[u8]) -> Option<u32> {
    let mut num: u32 = 0;
    let mut seen = false;
    for &b in value {
        if !b.is_ascii_digit() {
            return None;
        }
        seen = true;
        num = num.saturating_mul(10).saturating_add(u32::from(b - b'0'));
    }
    if seen {
        Some(num)
    } else {
        None
    }
}

/// Context needed to turn raw `<v>` text into a typed value.
pub(super) struct CellContext<'a> {
    pub shared_strings: &'a [String],
    pub date_styles: &'a DateStyles,
    pub date1904: bool,
}

/// Resolve a cell's raw text into a [`CellValue`].
///
/// Returns `None` for values that cannot be represented: an out-of-range
/// shared string index or an empty numeric `<v/>`.
pub(super) fn resolve_cell_value(
    raw: String,
    tag: CellTypeTag,
    style_idx: Option<u32>,
    ctx: &CellContext<'_>,
) -> Option<CellValue> {
    match tag {
        CellTypeTag::Shared => {
            let value = raw
                .trim()
                .parse::<usize>()
                .ok()
                .and_then(|idx| ctx.shared_strings.get(idx));
            if value.is_none() {
                warn!(index = %raw, "shared string index out of range; cell skipped");
            }
            value.cloned().map(CellValue::Text)
        }
        CellTypeTag::Inline | CellTypeTag::Str | CellTypeTag::Error => Some(CellValue::Text(raw)),
        CellTypeTag::Bool => Some(CellValue::Bool(matches!(raw.trim(), "1" | "true"))),
        CellTypeTag::Date => Some(match parse_date_text(&raw) {
            Some(dt) => CellValue::Date(format_iso(dt)),
            None => CellValue::Text(raw),
        }),
        CellTypeTag::Number => {
            if raw.trim().is_empty() {
                return None;
            }
            let Ok(n) = raw.trim().parse::<f64>() else {
                return Some(CellValue::Text(raw));
            };
            if ctx.date_styles.is_date(style_idx) {
                if let Some(dt) = excel_serial_to_datetime(n, ctx.date1904) {
                    return Some(CellValue::Date(format_iso(dt)));
                }
            }
            Some(CellValue::Number(n))
        }
    }
}

/// State of the `<c>` element currently being read.
struct OpenCell {
    col: u32,
    tag: CellTypeTag,
    style_idx: Option<u32>,
    text: String,
    has_text: bool,
}

/// Running position and open elements while walking `<sheetData>`.
#[derive(Default)]
struct SheetCursor {
    rows: Vec<SheetRow>,
    current: Option<SheetRow>,
    next_row: u32,
    next_col: u32,
    cell: Option<OpenCell>,
    capture: bool,
    in_phonetic: bool,
}

impl SheetCursor {
    fn finish_row(&mut self) {
        if let Some(done) = self.current.take() {
            self.rows.push(done);
        }
    }

    /// Handle `<row>`, `<c>`, `<v>`, `<t>` and `<rPh>` openings.
    /// `is_start` is false for self-closing elements.
    fn open(&mut self, e: &BytesStart, is_start: bool) {
        match e.local_name().as_ref() {
            b"row" => {
                self.finish_row();
                let row = e
                    .attributes()
                    .flatten()
                    .find(|a| a.key.as_ref() == b"r")
                    .and_then(|a| parse_u32_bytes(&a.value))
                    .map_or(self.next_row, |r| r.saturating_sub(1));
                self.next_row = row.saturating_add(1);
                self.next_col = 0;
                if is_start {
                    self.current = Some(SheetRow::new(row));
                }
            }
            b"c" => {
                let mut col = self.next_col;
                let mut tag = CellTypeTag::Number;
                let mut style_idx = None;
                for attr in e.attributes().flatten() {
                    match attr.key.as_ref() {
                        b"r" => {
                            if let Some((c, _)) = parse_cell_ref_bytes(&attr.value) {
                                col = c;
                            }
                        }
                        b"t" => tag = parse_cell_type_tag(&attr.value),
                        b"s" => style_idx = parse_u32_bytes(&attr.value),
                        _ => {}
                    }
                }
                self.next_col = col.saturating_add(1);
                if is_start {
                    self.cell = Some(OpenCell {
                        col,
                        tag,
                        style_idx,
                        text: String::new(),
                        has_text: false,
                    });
                }
            }
            b"rPh" if is_start => self.in_phonetic = true,
            b"v" | b"t" if !self.in_phonetic => {
                if let Some(open) = self.cell.as_mut() {
                    open.has_text = true;
                    self.capture = is_start;
                }
            }
            _ => {}
        }
    }

    fn close(&mut self, e: &BytesEnd, ctx: &CellContext<'_>) {
        match e.local_name().as_ref() {
            b"v" | b"t" => self.capture = false,
            b"rPh" => self.in_phonetic = false,
            b"c" => {
                let Some(open) = self.cell.take() else {
                    return;
                };
                if !open.has_text {
                    return;
                }
                let value = resolve_cell_value(open.text, open.tag, open.style_idx, ctx);
                if let (Some(value), Some(row)) = (value, self.current.as_mut()) {
                    row.cells.push((open.col, value));
                }
            }
            b"row" => self.finish_row(),
            _ => {}
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(open) = self.cell.as_mut() {
            open.text.push_str(text);
        }
    }
}

/// Parse the worksheet at `path` into grid rows.
///
/// Cells without a value (style-only `<c r="A1" s="3"/>`) are not recorded.
pub(super) fn parse_sheet_rows<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: &str,
    ctx: &CellContext<'_>,
) -> Result<Vec<SheetRow>> {
    let file = archive
        .by_name(path)
        .map_err(|_| XlmergeError::Parse(format!("missing worksheet part {path}")))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut cursor = SheetCursor::default();
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => cursor.open(e, true),
            Event::Empty(ref e) => cursor.open(e, false),
            Event::Text(ref t) if cursor.capture => {
                let text = text_content(t)?;
                cursor.push_text(&text);
            }
            Event::CData(ref t) if cursor.capture => {
                cursor.push_text(&String::from_utf8_lossy(t.as_ref()));
            }
            Event::End(ref e) => cursor.close(e, ctx),
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    cursor.finish_row();
    let mut rows = cursor.rows;
    for row in &mut rows {
        row.cells.sort_by_key(|(c, _)| *c);
    }

    Ok(rows)
}
