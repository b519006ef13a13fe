//! Minimal BIFF8 `.xls` writer for reader tests.
//!
//! Writes just enough of the format for calamine: workbook globals with one
//! BOUNDSHEET, a shared string table, and a single worksheet substream of
//! NUMBER / LABELSST / BOOLERR cells, wrapped in a compound file.

use std::collections::BTreeMap;
use std::io::{Cursor, Write};

const RECORD_BOF: u16 = 0x0809;
const RECORD_EOF: u16 = 0x000A;
const RECORD_CODEPAGE: u16 = 0x0042;
const RECORD_DATEMODE: u16 = 0x0022;
const RECORD_WINDOW1: u16 = 0x003D;
const RECORD_FONT: u16 = 0x0031;
const RECORD_XF: u16 = 0x00E0;
const RECORD_BOUNDSHEET: u16 = 0x0085;
const RECORD_SST: u16 = 0x00FC;
const RECORD_DIMENSIONS: u16 = 0x0200;
const RECORD_WINDOW2: u16 = 0x023E;
const RECORD_NUMBER: u16 = 0x0203;
const RECORD_LABELSST: u16 = 0x00FD;
const RECORD_BOOLERR: u16 = 0x0205;

const BOF_VERSION_BIFF8: u16 = 0x0600;
const BOF_DT_WORKBOOK_GLOBALS: u16 = 0x0005;
const BOF_DT_WORKSHEET: u16 = 0x0010;

const XF_FLAG_LOCKED: u16 = 0x0001;
const XF_FLAG_STYLE: u16 = 0x0004;

/// Built-in number format `m/d/yyyy`.
const FMT_DATE: u16 = 14;

/// Cell XF indices, after the 16 style XFs.
const XF_GENERAL: u16 = 16;
const XF_DATE: u16 = 17;

#[derive(Debug, Clone)]
enum XlsCell {
    Text(String),
    Number(f64),
    Date(f64),
    Bool(bool),
}

/// Builds a single-sheet `.xls` workbook. Rows and columns are 0-indexed.
#[derive(Debug, Default)]
pub struct XlsBuilder {
    sheet_name: String,
    date1904: bool,
    cells: BTreeMap<(u16, u16), XlsCell>,
}

impl XlsBuilder {
    pub fn new(sheet_name: &str) -> Self {
        Self {
            sheet_name: sheet_name.to_string(),
            ..Self::default()
        }
    }

    pub fn text(mut self, row: u16, col: u16, value: &str) -> Self {
        self.cells
            .insert((row, col), XlsCell::Text(value.to_string()));
        self
    }

    pub fn number(mut self, row: u16, col: u16, value: f64) -> Self {
        self.cells.insert((row, col), XlsCell::Number(value));
        self
    }

    /// A serial number in a cell formatted `m/d/yyyy`.
    pub fn date(mut self, row: u16, col: u16, serial: f64) -> Self {
        self.cells.insert((row, col), XlsCell::Date(serial));
        self
    }

    pub fn boolean(mut self, row: u16, col: u16, value: bool) -> Self {
        self.cells.insert((row, col), XlsCell::Bool(value));
        self
    }

    /// Text cells in a row, starting at column A.
    pub fn text_row(mut self, row: u16, values: &[&str]) -> Self {
        for (col, value) in values.iter().enumerate() {
            self = self.text(row, col as u16, value);
        }
        self
    }

    pub fn date1904(mut self) -> Self {
        self.date1904 = true;
        self
    }

    /// Produce the compound file bytes.
    pub fn build(&self) -> Vec<u8> {
        let workbook_stream = self.workbook_stream();

        let cursor = Cursor::new(Vec::new());
        let mut ole = cfb::CompoundFile::create(cursor).expect("create cfb");
        {
            let mut stream = ole.create_stream("Workbook").expect("Workbook stream");
            stream
                .write_all(&workbook_stream)
                .expect("write Workbook stream");
        }
        ole.into_inner().into_inner()
    }

    fn shared_strings(&self) -> Vec<String> {
        let mut strings: Vec<String> = Vec::new();
        for cell in self.cells.values() {
            if let XlsCell::Text(s) = cell {
                if !strings.contains(s) {
                    strings.push(s.clone());
                }
            }
        }
        strings
    }

    fn workbook_stream(&self) -> Vec<u8> {
        let strings = self.shared_strings();
        let mut globals = Vec::<u8>::new();

        push_record(&mut globals, RECORD_BOF, &bof(BOF_DT_WORKBOOK_GLOBALS));
        push_record(&mut globals, RECORD_CODEPAGE, &1252u16.to_le_bytes());
        push_record(
            &mut globals,
            RECORD_DATEMODE,
            &u16::from(self.date1904).to_le_bytes(),
        );
        push_record(&mut globals, RECORD_WINDOW1, &window1());
        push_record(&mut globals, RECORD_FONT, &font("Arial"));

        // Readers expect 16 style XFs before the cell XFs.
        for _ in 0..16 {
            push_record(&mut globals, RECORD_XF, &xf_record(0, 0, true));
        }
        push_record(&mut globals, RECORD_XF, &xf_record(0, 0, false));
        push_record(&mut globals, RECORD_XF, &xf_record(0, FMT_DATE, false));

        let boundsheet_start = globals.len();
        let mut boundsheet = Vec::<u8>::new();
        boundsheet.extend_from_slice(&0u32.to_le_bytes()); // lbPlyPos, patched below
        boundsheet.extend_from_slice(&0u16.to_le_bytes()); // visible worksheet
        write_short_unicode_string(&mut boundsheet, &self.sheet_name);
        push_record(&mut globals, RECORD_BOUNDSHEET, &boundsheet);
        let boundsheet_offset_pos = boundsheet_start + 4;

        push_record(&mut globals, RECORD_SST, &sst(&strings));
        push_record(&mut globals, RECORD_EOF, &[]);

        let sheet_offset = globals.len();
        globals[boundsheet_offset_pos..boundsheet_offset_pos + 4]
            .copy_from_slice(&(sheet_offset as u32).to_le_bytes());

        globals.extend_from_slice(&self.sheet_stream(&strings));
        globals
    }

    fn sheet_stream(&self, strings: &[String]) -> Vec<u8> {
        let mut sheet = Vec::<u8>::new();
        push_record(&mut sheet, RECORD_BOF, &bof(BOF_DT_WORKSHEET));

        let last_row = self.cells.keys().map(|(r, _)| *r).max().map_or(0, |r| r + 1);
        let last_col = self.cells.keys().map(|(_, c)| *c).max().map_or(0, |c| c + 1);
        let mut dims = Vec::<u8>::new();
        dims.extend_from_slice(&0u32.to_le_bytes()); // first row
        dims.extend_from_slice(&u32::from(last_row).to_le_bytes()); // last row + 1
        dims.extend_from_slice(&0u16.to_le_bytes()); // first col
        dims.extend_from_slice(&last_col.to_le_bytes()); // last col + 1
        dims.extend_from_slice(&0u16.to_le_bytes()); // reserved
        push_record(&mut sheet, RECORD_DIMENSIONS, &dims);
        push_record(&mut sheet, RECORD_WINDOW2, &window2());

        for (&(row, col), cell) in &self.cells {
            match cell {
                XlsCell::Text(s) => {
                    let index = strings.iter().position(|x| x == s).expect("interned") as u32;
                    push_record(&mut sheet, RECORD_LABELSST, &labelsst_cell(row, col, index));
                }
                XlsCell::Number(n) => {
                    push_record(&mut sheet, RECORD_NUMBER, &number_cell(row, col, XF_GENERAL, *n));
                }
                XlsCell::Date(serial) => {
                    push_record(&mut sheet, RECORD_NUMBER, &number_cell(row, col, XF_DATE, *serial));
                }
                XlsCell::Bool(b) => {
                    push_record(&mut sheet, RECORD_BOOLERR, &bool_cell(row, col, *b));
                }
            }
        }

        push_record(&mut sheet, RECORD_EOF, &[]);
        sheet
    }
}

fn push_record(out: &mut Vec<u8>, id: u16, data: &[u8]) {
    out.extend_from_slice(&id.to_le_bytes());
    out.extend_from_slice(&(data.len() as u16).to_le_bytes());
    out.extend_from_slice(data);
}

fn bof(dt: u16) -> [u8; 16] {
    let mut out = [0u8; 16];
    out[0..2].copy_from_slice(&BOF_VERSION_BIFF8.to_le_bytes());
    out[2..4].copy_from_slice(&dt.to_le_bytes());
    out[4..6].copy_from_slice(&0x0DBBu16.to_le_bytes()); // build
    out[6..8].copy_from_slice(&0x07CCu16.to_le_bytes()); // year
    out
}

fn window1() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[14..16].copy_from_slice(&1u16.to_le_bytes()); // cTabSel
    out[16..18].copy_from_slice(&600u16.to_le_bytes()); // wTabRatio
    out
}

fn window2() -> [u8; 18] {
    let mut out = [0u8; 18];
    out[0..2].copy_from_slice(&0x02B6u16.to_le_bytes());
    out
}

fn font(name: &str) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    out.extend_from_slice(&200u16.to_le_bytes()); // height, 10pt
    out.extend_from_slice(&0u16.to_le_bytes()); // option flags
    out.extend_from_slice(&0x7FFFu16.to_le_bytes()); // automatic color
    out.extend_from_slice(&400u16.to_le_bytes()); // weight
    out.extend_from_slice(&0u16.to_le_bytes()); // escapement
    out.push(0); // underline
    out.push(0); // family
    out.push(0); // charset
    out.push(0); // reserved
    write_short_unicode_string(&mut out, name);
    out
}

fn xf_record(font_idx: u16, fmt_idx: u16, is_style_xf: bool) -> [u8; 20] {
    let mut out = [0u8; 20];
    out[0..2].copy_from_slice(&font_idx.to_le_bytes());
    out[2..4].copy_from_slice(&fmt_idx.to_le_bytes());
    let flags: u16 = XF_FLAG_LOCKED | if is_style_xf { XF_FLAG_STYLE } else { 0 };
    out[4..6].copy_from_slice(&flags.to_le_bytes());
    out[6] = 0x20; // General + Bottom
    out[9] = 0x3F; // apply all attribute groups
    out
}

/// SST payload: totals, then one plain 8-bit string per entry.
fn sst(strings: &[String]) -> Vec<u8> {
    let mut out = Vec::<u8>::new();
    let count = strings.len() as u32;
    out.extend_from_slice(&count.to_le_bytes()); // cstTotal
    out.extend_from_slice(&count.to_le_bytes()); // cstUnique
    for s in strings {
        write_unicode_string(&mut out, s);
    }
    out
}

fn number_cell(row: u16, col: u16, xf: u16, v: f64) -> [u8; 14] {
    let mut out = [0u8; 14];
    out[0..2].copy_from_slice(&row.to_le_bytes());
    out[2..4].copy_from_slice(&col.to_le_bytes());
    out[4..6].copy_from_slice(&xf.to_le_bytes());
    out[6..14].copy_from_slice(&v.to_le_bytes());
    out
}

fn labelsst_cell(row: u16, col: u16, index: u32) -> [u8; 10] {
    let mut out = [0u8; 10];
    out[0..2].copy_from_slice(&row.to_le_bytes());
    out[2..4].copy_from_slice(&col.to_le_bytes());
    out[4..6].copy_from_slice(&XF_GENERAL.to_le_bytes());
    out[6..10].copy_from_slice(&index.to_le_bytes());
    out
}

fn bool_cell(row: u16, col: u16, value: bool) -> [u8; 8] {
    let mut out = [0u8; 8];
    out[0..2].copy_from_slice(&row.to_le_bytes());
    out[2..4].copy_from_slice(&col.to_le_bytes());
    out[4..6].copy_from_slice(&XF_GENERAL.to_le_bytes());
    out[6] = u8::from(value);
    out[7] = 0; // boolean, not an error code
    out
}

fn write_short_unicode_string(out: &mut Vec<u8>, s: &str) {
    // ShortXLUnicodeString: [cch: u8][flags: u8][chars]
    let bytes = s.as_bytes();
    out.push(u8::try_from(bytes.len()).expect("string too long for u8 length"));
    out.push(0); // compressed (8-bit)
    out.extend_from_slice(bytes);
}

fn write_unicode_string(out: &mut Vec<u8>, s: &str) {
    // XLUnicodeString: [cch: u16][flags: u8][chars]
    let bytes = s.as_bytes();
    let len = u16::try_from(bytes.len()).expect("string too long for u16 length");
    out.extend_from_slice(&len.to_le_bytes());
    out.push(0); // compressed (8-bit)
    out.extend_from_slice(bytes);
}

/// `orders_xlsx` as a legacy workbook, plus a `paid` flag column.
pub fn orders_xls() -> Vec<u8> {
    XlsBuilder::new("Orders")
        .text_row(0, &["name", "date", "amount", "paid"])
        .text(1, 0, "Ali")
        .date(1, 1, 45296.0)
        .number(1, 2, 10.0)
        .boolean(1, 3, true)
        .text(2, 0, "Veli")
        .date(2, 1, 45301.0)
        .number(2, 2, 20.5)
        .boolean(2, 3, false)
        .text(3, 0, "Ayse")
        .date(3, 1, 45306.0)
        .number(3, 2, 30.0)
        .build()
}
