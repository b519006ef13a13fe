//! Date handling shared by the codec and the filter engine.
//!
//! - Excel serial numbers ↔ `chrono` date-times (1900 and 1904 systems)
//! - Detection of date/time number formats in `styles.xml`
//! - Best-effort sniffing of date text typed into cells

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Timelike};

/// Largest serial Excel accepts (9999-12-31).
pub const MAX_EXCEL_SERIAL: f64 = 2_958_465.0;

const DATETIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M",
];

const DATE_FORMATS: [&str; 9] = [
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%m/%d/%Y",
    "%d.%m.%Y",
    "%b %d, %Y",
    "%B %d, %Y",
    "%d %b %Y",
    "%d %B %Y",
    "%a, %d %b %Y",
];

fn midnight(date: NaiveDate) -> NaiveDateTime {
    date.and_time(NaiveTime::MIN)
}

/// Parse free text as a calendar date or date-time.
///
/// Plain numbers are never dates here, even though some runtimes accept
/// `"2024"` as a year. Text with a UTC offset keeps its wall-clock time.
#[must_use]
pub fn parse_date_text(text: &str) -> Option<NaiveDateTime> {
    let s = text.trim();
    if s.is_empty() || s.len() > 64 || s.parse::<f64>().is_ok() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.naive_local());
    }
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(dt);
        }
    }
    for fmt in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, fmt) {
            return Some(midnight(d));
        }
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(s) {
        return Some(dt.naive_local());
    }
    None
}

/// Convert an Excel serial date to a date-time.
///
/// In the 1900 system serial 1 is 1900-01-01 and serial 60 is Excel's
/// phantom 1900-02-29, which maps to 1900-03-01.
#[must_use]
#[allow(clippy::cast_possible_truncation)]
pub fn excel_serial_to_datetime(serial: f64, date1904: bool) -> Option<NaiveDateTime> {
    if !serial.is_finite() || !(0.0..=MAX_EXCEL_SERIAL + 1.0).contains(&serial) {
        return None;
    }
    let days = serial.floor();
    let epoch = if date1904 {
        NaiveDate::from_ymd_opt(1904, 1, 1)?
    } else if days < 61.0 {
        NaiveDate::from_ymd_opt(1899, 12, 31)?
    } else {
        NaiveDate::from_ymd_opt(1899, 12, 30)?
    };
    let seconds = ((serial - days) * 86_400.0).round() as i64;
    midnight(epoch)
        .checked_add_signed(Duration::days(days as i64))?
        .checked_add_signed(Duration::seconds(seconds))
}

/// Convert a date-time to a 1900-system Excel serial.
#[must_use]
#[allow(clippy::cast_precision_loss)]
pub fn datetime_to_excel_serial(dt: NaiveDateTime) -> Option<f64> {
    let epoch = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    let mut days = (dt.date() - epoch).num_days();
    if days < 1 {
        return None;
    }
    if days < 61 {
        days -= 1;
    }
    let secs = f64::from(dt.num_seconds_from_midnight());
    Some(days as f64 + secs / 86_400.0)
}

/// `YYYY-MM-DD` for midnight values, `YYYY-MM-DDTHH:MM:SS` otherwise.
#[must_use]
pub fn format_iso(dt: NaiveDateTime) -> String {
    if dt.time() == NaiveTime::MIN {
        dt.format("%Y-%m-%d").to_string()
    } else {
        dt.format("%Y-%m-%dT%H:%M:%S").to_string()
    }
}

/// True when the date-time has a non-midnight time part.
#[must_use]
pub fn has_time(dt: NaiveDateTime) -> bool {
    dt.time() != NaiveTime::MIN
}

/// Built-in number format IDs that render as dates or times.
/// See: ECMA-376 Part 1, Section 18.8.30
#[must_use]
pub const fn is_builtin_date_format(id: u32) -> bool {
    matches!(id, 14..=22 | 27..=36 | 45..=47 | 50..=58)
}

/// Check if a format code is a date/time format
#[must_use]
pub fn is_date_format(format_code: &str) -> bool {
    let lower = format_code.to_lowercase();

    // Skip text in quotes and brackets
    let mut in_quotes = false;
    let mut in_brackets = false;
    let mut cleaned = String::new();

    for c in lower.chars() {
        match c {
            '"' => in_quotes = !in_quotes,
            '[' => in_brackets = true,
            ']' => in_brackets = false,
            _ if !in_quotes && !in_brackets => cleaned.push(c),
            _ => {}
        }
    }

    if cleaned == "general" {
        return false;
    }

    cleaned.contains('y') ||
    cleaned.contains('m') && !cleaned.contains('#') && !cleaned.contains('0') ||
    cleaned.contains('d') ||
    cleaned.contains('h') ||
    cleaned.contains('s') && cleaned.contains(':')
}
