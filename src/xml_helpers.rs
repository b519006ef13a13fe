//! Shared XML helpers for the XLSX reader.
//!
//! Attribute lookups handle namespace-prefixed keys and UTF-8 conversion.

use quick_xml::events::{BytesStart, BytesText};

use crate::error::Result;

/// Extract a string attribute value by key.
///
/// Entities are unescaped. Returns `None` if the attribute is missing or not
/// valid UTF-8.
pub fn attr_string(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.as_ref() == key {
            return attr.unescape_value().ok().map(|s| s.into_owned());
        }
    }
    None
}

/// Extract a string attribute by local name (ignoring namespace prefix).
pub fn attr_string_local(e: &BytesStart, key: &[u8]) -> Option<String> {
    for attr in e.attributes().flatten() {
        if attr.key.local_name().as_ref() == key {
            return std::str::from_utf8(&attr.value).ok().map(|s| s.to_string());
        }
    }
    None
}

/// Extract a `u32` attribute value by key.
pub fn attr_u32(e: &BytesStart, key: &[u8]) -> Option<u32> {
    attr_string(e, key).and_then(|s| s.parse().ok())
}

/// Extract a boolean attribute value by key.
///
/// Returns `None` if missing. Recognizes `"1"`, `"true"` as true; anything else as false.
pub fn attr_bool(e: &BytesStart, key: &[u8]) -> Option<bool> {
    attr_string(e, key).map(|s| matches!(s.as_str(), "1" | "true"))
}

/// Unescape a text node, skipping the unescape pass when there is no entity.
pub fn text_content(text: &BytesText) -> Result<String> {
    let raw = text.as_ref();
    if raw.contains(&b'&') {
        Ok(text.unescape()?.into_owned())
    } else {
        Ok(String::from_utf8_lossy(raw).into_owned())
    }
}
