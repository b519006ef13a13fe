//! Utilities for Excel-style A1 cell references.

/// Parse a cell reference from raw bytes (ASCII) into (col, row) where col and row are 0-indexed.
///
/// Works directly on XML attribute values (e.g., `attr.value` from quick-xml).
pub fn parse_cell_ref_bytes(ref_bytes: &[u8]) -> Option<(u32, u32)> {
    let mut col: u32 = 0;
    let mut row: u32 = 0;
    let mut saw_col = false;
    let mut saw_row = false;

    for &b in ref_bytes {
        if b == b'$' {
            continue;
        }
        if b.is_ascii_alphabetic() {
            let upper = b.to_ascii_uppercase();
            col = col
                .saturating_mul(26)
                .saturating_add(u32::from(upper - b'A') + 1);
            saw_col = true;
        } else if b.is_ascii_digit() {
            row = row.saturating_mul(10).saturating_add(u32::from(b - b'0'));
            saw_row = true;
        }
    }

    if !saw_col || !saw_row {
        return None;
    }

    Some((col.saturating_sub(1), row.saturating_sub(1)))
}

/// Parse a cell reference like "A1" into (col, row) where col and row are 0-indexed.
pub fn parse_cell_ref(cell_ref: &str) -> Option<(u32, u32)> {
    parse_cell_ref_bytes(cell_ref.trim().as_bytes())
}

/// Convert a 0-indexed column to its letter form (0 → "A", 26 → "AA").
#[must_use]
pub fn col_to_letter(col: u32) -> String {
    let mut letters = Vec::new();
    let mut n = u64::from(col) + 1;
    while n > 0 {
        n -= 1;
        #[allow(clippy::cast_possible_truncation)]
        letters.push(char::from(b'A' + (n % 26) as u8));
        n /= 26;
    }
    letters.iter().rev().collect()
}

/// Build an A1 reference from 0-indexed (col, row).
#[must_use]
pub fn cell_ref(col: u32, row: u32) -> String {
    format!("{}{}", col_to_letter(col), u64::from(row) + 1)
}
