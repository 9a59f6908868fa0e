//! Workbook readers
//!
//! Excel files go through calamine, CSV through the csv crate. Both
//! produce plain `Table`s; no ledger semantics live here.

use calamine::{Data, Reader, Xls, Xlsx};
use chrono::{Duration, NaiveDate, NaiveDateTime};
use std::io::Cursor;

use crate::error::SheetError;
use crate::types::{Cell, SpreadsheetFormat, Table};

/// Read every sheet of an Excel workbook
pub(crate) fn read_excel(format: SpreadsheetFormat, bytes: &[u8]) -> Result<Vec<Table>, SheetError> {
    match format {
        SpreadsheetFormat::Xlsx => read_calamine::<Xlsx<_>>(bytes),
        SpreadsheetFormat::Xls => read_calamine::<Xls<_>>(bytes),
        SpreadsheetFormat::Csv => Err(SheetError::UnsupportedFormat {
            extension: format.to_string(),
        }),
    }
}

fn read_calamine<W>(bytes: &[u8]) -> Result<Vec<Table>, SheetError>
where
    W: Reader<Cursor<Vec<u8>>>,
    W::Error: std::fmt::Display,
{
    let mut workbook = W::new(Cursor::new(bytes.to_vec())).map_err(|e| SheetError::InvalidWorkbook {
        message: e.to_string(),
    })?;

    let sheet_names = workbook.sheet_names().to_vec();
    let mut tables = Vec::with_capacity(sheet_names.len());

    for sheet_name in sheet_names {
        let range = match workbook.worksheet_range(&sheet_name) {
            Ok(r) => r,
            Err(e) => {
                log::warn!(target: "bukukas::sheet", "Skipping unreadable sheet '{}': {}", sheet_name, e);
                continue;
            }
        };

        let mut rows = range.rows();
        let headers = match rows.next() {
            Some(header_row) => header_row.iter().map(|c| convert_cell(c).display().trim().to_string()).collect(),
            None => Vec::new(),
        };

        // Ranges start at the first used cell, not at A1.
        let header_row = range.start().map(|(row, _)| row as usize).unwrap_or(0);
        let mut table = Table::new(sheet_name, headers).with_header_row(header_row);
        for row in rows {
            table.push_row(row.iter().map(convert_cell).collect());
        }
        tables.push(table);
    }

    Ok(tables)
}

fn convert_cell(data: &Data) -> Cell {
    match data {
        Data::Empty => Cell::Empty,
        Data::String(s) if s.trim().is_empty() => Cell::Empty,
        Data::String(s) => Cell::Text(s.clone()),
        Data::Float(f) => Cell::Number(*f),
        Data::Int(i) => Cell::Number(*i as f64),
        Data::Bool(b) => Cell::Bool(*b),
        Data::DateTime(dt) => {
            let serial = dt.as_f64();
            excel_serial_to_date(serial)
                .map(Cell::Date)
                .unwrap_or(Cell::Number(serial))
        }
        Data::DateTimeIso(s) => parse_iso_datetime(s)
            .map(Cell::Date)
            .unwrap_or_else(|| Cell::Text(s.clone())),
        Data::DurationIso(s) => Cell::Text(s.clone()),
        Data::Error(e) => Cell::Error(e.to_string()),
        #[allow(unreachable_patterns)]
        other => Cell::Text(other.to_string()),
    }
}

fn parse_iso_datetime(s: &str) -> Option<NaiveDate> {
    let s = s.trim();
    if let Ok(dt) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
        return Some(dt.date());
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d").ok()
}

/// Excel serial date conversion using the 1899-12-30 base
pub fn excel_serial_to_date(serial: f64) -> Option<NaiveDate> {
    if !serial.is_finite() || serial < 1.0 || serial > 2_958_465.0 {
        return None;
    }
    let base = NaiveDate::from_ymd_opt(1899, 12, 30)?;
    base.checked_add_signed(Duration::days(serial.floor() as i64))
}

/// Read a CSV file as a single table named `sheet_name`
pub(crate) fn read_csv(sheet_name: &str, bytes: &[u8]) -> Result<Vec<Table>, SheetError> {
    let bytes = bytes.strip_prefix(b"\xEF\xBB\xBF").unwrap_or(bytes);
    let mut rdr = csv::ReaderBuilder::new()
        .delimiter(sniff_delimiter(bytes))
        .flexible(true)
        .has_headers(true)
        .from_reader(bytes);

    let headers = rdr
        .byte_headers()?
        .iter()
        .map(|h| String::from_utf8_lossy(h).trim().to_string())
        .collect();

    let mut table = Table::new(sheet_name, headers);
    for record in rdr.byte_records() {
        let record = record?;
        let row = record
            .iter()
            .map(|field| {
                let text = String::from_utf8_lossy(field);
                if text.trim().is_empty() {
                    Cell::Empty
                } else {
                    Cell::Text(text.into_owned())
                }
            })
            .collect();
        table.push_row(row);
    }

    Ok(vec![table])
}

/// Pick `;` when the header line uses it more often than `,`
fn sniff_delimiter(bytes: &[u8]) -> u8 {
    let first_line = bytes.split(|b| *b == b'\n').next().unwrap_or_default();
    let commas = first_line.iter().filter(|b| **b == b',').count();
    let semicolons = first_line.iter().filter(|b| **b == b';').count();
    if semicolons > commas {
        b';'
    } else {
        b','
    }
}
