//! XLSX writer
//!
//! Turns `OutputSheet`s into workbook bytes. All styling decisions are
//! made from the column kinds; values are written as given.

use rust_decimal::prelude::ToPrimitive;
use rust_xlsxwriter::{Color, Format, FormatBorder, Workbook, Worksheet};

use crate::error::SheetError;
use crate::types::{Column, ColumnKind, OutputCell, OutputSheet};

const RECEIPT_FILL: u32 = 0xE6F7E6;
const EXPENSE_FILL: u32 = 0xFFE6E6;

/// Styling knobs for the xlsx writer
#[derive(Debug, Clone)]
pub struct XlsxStyle {
    /// Number format applied to amount cells
    pub number_format: String,
    /// Width of the date column
    pub date_column_width: f64,
}

impl Default for XlsxStyle {
    fn default() -> Self {
        Self {
            number_format: "#,##0_);(#,##0)".to_string(),
            date_column_width: 12.0,
        }
    }
}

/// A sheet the writer could not build; it is left out of the workbook
#[derive(Debug)]
pub struct SheetFailure {
    pub sheet: String,
    pub error: SheetError,
}

/// Workbook bytes plus the sheets that were left out
#[derive(Debug)]
pub struct WrittenWorkbook {
    pub bytes: Vec<u8>,
    /// Number of sheets present in `bytes`
    pub written: usize,
    pub failed: Vec<SheetFailure>,
}

pub(crate) fn write_workbook(sheets: &[OutputSheet], style: &XlsxStyle) -> Result<WrittenWorkbook, SheetError> {
    let mut workbook = Workbook::new();
    let mut written = 0;
    let mut failed = Vec::new();

    // Each sheet is built detached so a failing one never leaves a partial worksheet behind.
    for sheet in sheets {
        let mut worksheet = Worksheet::new();
        match build_worksheet(&mut worksheet, sheet, style) {
            Ok(()) => {
                workbook.push_worksheet(worksheet);
                written += 1;
            }
            Err(error) => {
                log::warn!(target: "bukukas::sheet", "Leaving out sheet '{}': {}", sheet.name(), error);
                failed.push(SheetFailure {
                    sheet: sheet.name().to_string(),
                    error,
                });
            }
        }
    }

    let bytes = workbook.save_to_buffer()?;
    Ok(WrittenWorkbook { bytes, written, failed })
}

fn build_worksheet(worksheet: &mut Worksheet, sheet: &OutputSheet, style: &XlsxStyle) -> Result<(), SheetError> {
    worksheet.set_name(sheet.name())?;
    match sheet {
        OutputSheet::Table { columns, rows, .. } => write_table(worksheet, columns, rows, style),
        OutputSheet::Message { message, .. } => write_message(worksheet, message),
    }
}

fn header_format(kind: ColumnKind) -> Format {
    let fill = match kind {
        ColumnKind::Receipt => Color::RGB(RECEIPT_FILL),
        ColumnKind::Expense => Color::RGB(EXPENSE_FILL),
        _ => Color::White,
    };
    Format::new()
        .set_bold()
        .set_border(FormatBorder::Thin)
        .set_background_color(fill)
}

fn column_width(column: &Column, style: &XlsxStyle) -> f64 {
    match column.kind {
        ColumnKind::Description => 40.0,
        ColumnKind::Date => style.date_column_width,
        ColumnKind::NumericTotal => 15.0,
        ColumnKind::Receipt | ColumnKind::Expense => 18.0,
    }
}

fn write_table(
    worksheet: &mut Worksheet,
    columns: &[Column],
    rows: &[Vec<OutputCell>],
    style: &XlsxStyle,
) -> Result<(), SheetError> {
    let text_format = Format::new().set_border(FormatBorder::Thin);
    let amount_format = Format::new()
        .set_border(FormatBorder::Thin)
        .set_num_format(&style.number_format);

    for (col, column) in columns.iter().enumerate() {
        let col = col as u16;
        worksheet.write_string_with_format(0, col, &column.header, &header_format(column.kind))?;
        worksheet.set_column_width(col, column_width(column, style))?;
    }

    for (idx, row) in rows.iter().enumerate() {
        let row_num = idx as u32 + 1;
        for (col, cell) in row.iter().enumerate() {
            let col = col as u16;
            match cell {
                OutputCell::Text(text) => {
                    worksheet.write_string_with_format(row_num, col, text, &text_format)?;
                }
                OutputCell::Amount(amount) => {
                    let value = amount.to_f64().unwrap_or_default();
                    worksheet.write_number_with_format(row_num, col, value, &amount_format)?;
                }
            }
        }
    }

    if !columns.is_empty() {
        let last_col = columns.len() as u16 - 1;
        worksheet.set_freeze_panes(1, 0)?;
        worksheet.autofilter(0, 0, rows.len() as u32, last_col)?;
    }

    Ok(())
}

fn write_message(worksheet: &mut Worksheet, message: &str) -> Result<(), SheetError> {
    let header = Format::new().set_bold();
    worksheet.write_string_with_format(0, 0, "Message", &header)?;
    worksheet.write_string(1, 0, message)?;
    worksheet.set_column_width(0, 40)?;
    Ok(())
}
