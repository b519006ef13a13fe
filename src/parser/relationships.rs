//! Package-level parts: workbook relationships, sheet list, shared strings.

use quick_xml::events::Event;
use quick_xml::Reader;
use std::collections::HashMap;
use std::io::{BufReader, Read, Seek};
use zip::ZipArchive;

use crate::error::{Result, XlmergeError};
use crate::xml_helpers::{attr_bool, attr_string, attr_string_local, text_content};

/// Workbook relationships parsed from xl/_rels/workbook.xml.rels
///
/// Paths are resolved relative to the xl/ directory and stored as full paths.
#[derive(Default, Debug)]
pub(super) struct WorkbookRelationships {
    /// Map of rId -> full path for worksheet relationships
    /// e.g., "rId1" -> "xl/worksheets/sheet1.xml"
    pub worksheets: HashMap<String, String>,
    /// Path to shared strings file (e.g., "xl/sharedStrings.xml")
    pub shared_strings: Option<String>,
    /// Path to styles file (e.g., "xl/styles.xml")
    pub styles: Option<String>,
}

/// Sheet metadata from workbook.xml
#[derive(Debug, Clone)]
pub(super) struct SheetInfo {
    pub name: String,
    pub path: String,
}

/// Parse workbook relationships from xl/_rels/workbook.xml.rels
pub(super) fn parse_workbook_relationships<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
) -> Result<WorkbookRelationships> {
    let mut rels = WorkbookRelationships::default();

    let Ok(file) = archive.by_name("xl/_rels/workbook.xml.rels") else {
        return Ok(rels); // Relationships file is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => {
                if e.local_name().as_ref() == b"Relationship" {
                    let id = attr_string(e, b"Id").unwrap_or_default();
                    let target = attr_string(e, b"Target").unwrap_or_default();
                    let rel_type = attr_string(e, b"Type").unwrap_or_default();

                    // Resolve target path relative to xl/
                    let full_path = if let Some(stripped) = target.strip_prefix('/') {
                        stripped.to_string()
                    } else {
                        format!("xl/{target}")
                    };

                    if rel_type.ends_with("/worksheet") && !id.is_empty() && !target.is_empty() {
                        rels.worksheets.insert(id, full_path);
                    } else if rel_type.ends_with("/sharedStrings") {
                        rels.shared_strings = Some(full_path);
                    } else if rel_type.ends_with("/styles") {
                        rels.styles = Some(full_path);
                    }
                }
            }
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(rels)
}

/// Get sheet names and paths from xl/workbook.xml, in tab order.
/// Also returns the date1904 flag.
pub(super) fn get_sheet_info<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    relationships: &HashMap<String, String>,
) -> Result<(Vec<SheetInfo>, bool)> {
    let file = archive
        .by_name("xl/workbook.xml")
        .map_err(|_| XlmergeError::Parse("missing xl/workbook.xml".to_string()))?;

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(true);

    let mut sheets = Vec::new();
    let mut date1904 = false;
    let mut buf = Vec::new();

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Empty(ref e) | Event::Start(ref e) => match e.local_name().as_ref() {
                b"workbookPr" => {
                    date1904 = attr_bool(e, b"date1904").unwrap_or(false);
                }
                b"sheet" => {
                    let name = attr_string(e, b"name").unwrap_or_default();
                    let r_id = attr_string_local(e, b"id").unwrap_or_default();
                    if !name.is_empty() {
                        // Try to get path from relationships, fallback to default
                        let path = relationships.get(&r_id).cloned().unwrap_or_else(|| {
                            let idx = sheets.len() + 1;
                            format!("xl/worksheets/sheet{idx}.xml")
                        });
                        sheets.push(SheetInfo { name, path });
                    }
                }
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok((sheets, date1904))
}

/// Parse shared strings from the shared strings part.
///
/// Rich-text runs are concatenated; phonetic runs (`<rPh>`) are skipped.
pub(super) fn parse_shared_strings<R: Read + Seek>(
    archive: &mut ZipArchive<R>,
    path: Option<&str>,
) -> Result<Vec<String>> {
    let sst_path = path.unwrap_or("xl/sharedStrings.xml");
    let Ok(file) = archive.by_name(sst_path) else {
        return Ok(Vec::new()); // SharedStrings is optional
    };

    let reader = BufReader::new(file);
    let mut xml = Reader::from_reader(reader);
    xml.trim_text(false);

    let mut strings = Vec::new();
    let mut buf = Vec::new();
    let mut current = String::new();
    let mut in_si = false;
    let mut in_t = false;
    let mut in_phonetic = false;

    loop {
        match xml.read_event_into(&mut buf)? {
            Event::Start(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    in_si = true;
                    current.clear();
                }
                b"rPh" => in_phonetic = true,
                b"t" if in_si && !in_phonetic => in_t = true,
                _ => {}
            },
            Event::Empty(ref e) => {
                // <si><t/></si> is an empty string
                if e.local_name().as_ref() == b"si" {
                    strings.push(String::new());
                }
            }
            Event::Text(ref e) if in_t => {
                current.push_str(&text_content(e)?);
            }
            Event::End(ref e) => match e.local_name().as_ref() {
                b"si" => {
                    strings.push(std::mem::take(&mut current));
                    in_si = false;
                }
                b"rPh" => in_phonetic = false,
                b"t" => in_t = false,
                _ => {}
            },
            Event::Eof => break,
            _ => {}
        }
        buf.clear();
    }

    Ok(strings)
}
