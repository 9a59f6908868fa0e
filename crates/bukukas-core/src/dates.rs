//! Date parsing and rendering for the `Tanggal` column

use chrono::{Datelike, NaiveDate, NaiveDateTime};

use bukukas_sheet::{excel_serial_to_date, Cell};

const MONTHS_ID: [&str; 12] = [
    "Januari", "Februari", "Maret", "April", "Mei", "Juni",
    "Juli", "Agustus", "September", "Oktober", "November", "Desember",
];

const MONTHS_EN: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

const DATETIME_FORMATS: [&str; 4] = [
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
];

const DATE_FORMATS: [&str; 4] = ["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];

/// Normalize a `Tanggal` cell to `YYYY-MM-DD`, or `""` when it is not a date
pub fn normalize_date_cell(cell: &Cell) -> String {
    parse_date_cell(cell)
        .map(|d| d.format("%Y-%m-%d").to_string())
        .unwrap_or_default()
}

pub fn parse_date_cell(cell: &Cell) -> Option<NaiveDate> {
    match cell {
        Cell::Date(d) => Some(*d),
        Cell::Number(serial) => excel_serial_to_date(*serial),
        Cell::Text(s) => parse_date_text(s),
        Cell::Empty | Cell::Bool(_) | Cell::Error(_) => None,
    }
}

/// Parse the textual date forms found in ledgers
pub fn parse_date_text(input: &str) -> Option<NaiveDate> {
    let s = input.trim();
    if s.is_empty() {
        return None;
    }

    for format in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, format) {
            return Some(dt.date());
        }
    }
    for format in DATE_FORMATS {
        if let Ok(d) = NaiveDate::parse_from_str(s, format) {
            return Some(d);
        }
    }
    if let Ok(dt) = chrono::DateTime::parse_from_rfc3339(s) {
        return Some(dt.date_naive());
    }

    parse_long_date(s)
}

/// `24 September 2024` or `24 Agustus 2024`
fn parse_long_date(s: &str) -> Option<NaiveDate> {
    let mut parts = s.split_whitespace();
    let day: u32 = parts.next()?.parse().ok()?;
    let month = month_from_name(parts.next()?)?;
    let year: i32 = parts.next()?.parse().ok()?;
    if parts.next().is_some() {
        return None;
    }
    NaiveDate::from_ymd_opt(year, month, day)
}

fn month_from_name(name: &str) -> Option<u32> {
    let name = name.trim_end_matches(['.', ',']).to_lowercase();
    if name.len() < 3 {
        return None;
    }
    MONTHS_ID
        .iter()
        .position(|m| m.to_lowercase() == name)
        .or_else(|| MONTHS_EN.iter().position(|m| m.to_lowercase() == name))
        .or_else(|| {
            // three-letter abbreviations: Jan, Agu, Okt, Des, Aug, Dec, ...
            if name.chars().count() != 3 {
                return None;
            }
            MONTHS_ID
                .iter()
                .position(|m| m.to_lowercase().starts_with(&name))
                .or_else(|| MONTHS_EN.iter().position(|m| m.to_lowercase().starts_with(&name)))
        })
        .map(|idx| idx as u32 + 1)
}

/// Render a date in the long Indonesian form, e.g. `24 September 2024`
pub fn format_long(date: NaiveDate) -> String {
    format!("{} {} {}", date.day(), MONTHS_ID[date.month0() as usize], date.year())
}

/// Long form for an ISO date string; other strings are returned unchanged
pub fn render_long(stored: &str) -> String {
    match NaiveDate::parse_from_str(stored.trim(), "%Y-%m-%d") {
        Ok(date) => format_long(date),
        Err(_) => stored.to_string(),
    }
}
