//! Number-format lookup from xl/styles.xml.
//!
//! Only one fact matters to the reader: whether a cell's `s` index points at
//! a date/time format.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::dates::{is_builtin_date_format, is_date_format};
use crate::error::Result;
use crate::xml_helpers::{attr_string, attr_u32};

/// Per-`cellXfs` index flag: does the style render numbers as dates?
#[derive(Debug, Default, Clone)]
pub(super) struct DateStyles {
    is_date: Vec<bool>,
}

impl DateStyles {
    pub fn is_date(&self, style_idx: Option<u32>) -> bool {
        style_idx
            .and_then(|idx| self.is_date.get(idx as usize))
            .copied()
            .unwrap_or(false)
    }

    pub fn len(&self) -> usize {
        self.is_date.len()
    }
}

/// Parse `<numFmts>` and `<cellXfs>` from the styles part.
pub(super) fn parse_date_styles<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<DateStyles> {
    let styles_path = path.unwrap_or("xl/styles.xml");
    let Ok(file) = archive.by_name(styles_path) else {
        return Ok(DateStyles::default()); // Styles are optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut custom_formats: HashMap<u32, String> = HashMap::new();
    let mut xf_formats: Vec<u32> = Vec::new();
    let mut in_cell_xfs = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) if e.local_name().as_ref() == b"cellXfs" => {
                in_cell_xfs = true;
            }
            Event::Start(ref e) | Event::Empty(ref e) => match e.local_name().as_ref() {
                b"numFmt" => {
                    if let (Some(id), Some(code)) =
                        (attr_u32(e, b"numFmtId"), attr_string(e, b"formatCode"))
                    {
                        custom_formats.insert(id, code);
                    }
                }
                b"xf" if in_cell_xfs => {
                    xf_formats.push(attr_u32(e, b"numFmtId").unwrap_or(0));
                }
                _ => {}
            },
            Event::End(ref e) => {
                if e.local_name().as_ref() == b"cellXfs" {
                    in_cell_xfs = false;
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    let is_date = xf_formats
        .into_iter()
        .map(|id| match custom_formats.get(&id) {
            Some(code) => is_date_format(code),
            None => is_builtin_date_format(id),
        })
        .collect();

    Ok(DateStyles { is_date })
}
