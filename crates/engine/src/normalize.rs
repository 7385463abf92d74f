//! Title and date canonicalization.
//!
//! Everything here is pure: a cell goes in, a canonical value comes out.

use chrono::{DateTime, Datelike, Duration, NaiveDate, NaiveDateTime};

use crate::table::Cell;

/// Canonical form of a title cell: trimmed and lowercased.
///
/// Non-text cells and blank text yield `""`. Punctuation and diacritics are
/// kept as-is.
pub fn normalize_title(cell: &Cell) -> String {
    match cell {
        Cell::Text(s) => normalize_text(s),
        _ => String::new(),
    }
}

pub fn normalize_text(text: &str) -> String {
    text.trim().to_lowercase()
}

/// Day 0 of spreadsheet date serials.
fn serial_epoch() -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(1899, 12, 30)
}

/// Calendar day of a spreadsheet date serial. The time-of-day fraction is dropped.
pub fn date_from_serial(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 0.0 {
        return None;
    }
    let days = serial.floor();
    if days > i64::MAX as f64 {
        return None;
    }
    serial_epoch()?.checked_add_signed(Duration::try_days(days as i64)?)
}

/// chrono's `%Y` takes any digit count, so `05/03/25` would read as year 25.
/// Text dates must land on a four-digit year.
fn four_digit_year(date: NaiveDate) -> Option<NaiveDate> {
    (1000..=9999).contains(&date.year()).then_some(date)
}

/// Parse a date cell under the primary (configured) format.
///
/// Spreadsheet date cells are already dates and are accepted regardless of
/// the format.
pub fn parse_primary_date(cell: &Cell, format: &str) -> Option<NaiveDate> {
    match cell {
        Cell::DateSerial(serial) => date_from_serial(*serial),
        Cell::Text(s) => {
            let s = s.trim();
            NaiveDate::parse_from_str(s, format)
                .ok()
                .or_else(|| NaiveDateTime::parse_from_str(s, format).ok().map(|dt| dt.date()))
                .and_then(four_digit_year)
        }
        _ => None,
    }
}

const GENERIC_DATE_FORMATS: &[&str] = &[
    "%Y-%m-%d",
    "%Y/%m/%d",
    "%d-%m-%Y",
    "%d.%m.%Y",
    "%m/%d/%Y",
];

const GENERIC_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M",
    "%d/%m/%Y %H:%M:%S",
    "%d/%m/%Y %H:%M",
];

/// Permissive fallback parser for columns the primary format matched nothing in.
///
/// Slash dates here are month-first, the usual convention of generic parsers.
pub fn parse_generic_date(cell: &Cell) -> Option<NaiveDate> {
    let s = match cell {
        Cell::DateSerial(serial) => return date_from_serial(*serial),
        Cell::Text(s) => s.trim(),
        _ => return None,
    };
    if s.is_empty() {
        return None;
    }

    GENERIC_DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(s, fmt).ok().and_then(four_digit_year))
        .or_else(|| {
            GENERIC_DATETIME_FORMATS.iter().find_map(|fmt| {
                NaiveDateTime::parse_from_str(s, fmt)
                    .ok()
                    .and_then(|dt| four_digit_year(dt.date()))
            })
        })
        .or_else(|| DateTime::parse_from_rfc3339(s).ok().map(|dt| dt.date_naive()))
        .or_else(|| DateTime::parse_from_rfc2822(s).ok().map(|dt| dt.date_naive()))
        .and_then(four_digit_year)
}
