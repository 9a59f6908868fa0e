//! Spreadsheet reading and writing
//!
//! Reads `.xlsx`/`.xls`/`.csv` bytes into plain tables and writes styled
//! `.xlsx` workbooks from sheet layouts. Ledger semantics (category
//! columns, balances) belong to bukukas-core.

use std::sync::Arc;

pub mod error;
pub mod types;
pub mod reader;
pub mod writer;

pub use error::SheetError;
pub use reader::excel_serial_to_date;
pub use types::{Cell, Column, ColumnKind, OutputCell, OutputSheet, SpreadsheetFormat, Table};
pub use writer::{SheetFailure, WrittenWorkbook, XlsxStyle};

// ==================== Reader / Writer Traits ====================

/// Reader reference type
pub type ReaderRef = Arc<dyn WorkbookReader>;

/// Writer reference type
pub type WriterRef = Arc<dyn WorkbookWriter>;

/// Trait for turning uploaded bytes into tables
pub trait WorkbookReader: Send + Sync {
    /// Read all sheets; `source_name` names the single sheet of a CSV file
    fn read(&self, format: SpreadsheetFormat, source_name: &str, bytes: &[u8]) -> Result<Vec<Table>, SheetError>;
}

/// Trait for serializing sheet layouts into a workbook file.
///
/// A sheet that cannot be built is left out and reported in
/// `WrittenWorkbook::failed`; only saving the workbook as a whole is fatal.
pub trait WorkbookWriter: Send + Sync {
    fn write(&self, sheets: &[OutputSheet]) -> Result<WrittenWorkbook, SheetError>;
}

/// Default reader: calamine for Excel, csv for CSV
#[derive(Debug, Default)]
pub struct DefaultWorkbookReader;

impl WorkbookReader for DefaultWorkbookReader {
    fn read(&self, format: SpreadsheetFormat, source_name: &str, bytes: &[u8]) -> Result<Vec<Table>, SheetError> {
        match format {
            SpreadsheetFormat::Csv => reader::read_csv(source_name, bytes),
            SpreadsheetFormat::Xlsx | SpreadsheetFormat::Xls => reader::read_excel(format, bytes),
        }
    }
}

/// Default writer producing `.xlsx` via rust_xlsxwriter
#[derive(Debug, Default)]
pub struct XlsxWorkbookWriter {
    style: XlsxStyle,
}

impl XlsxWorkbookWriter {
    pub fn new(style: XlsxStyle) -> Self {
        Self { style }
    }
}

impl WorkbookWriter for XlsxWorkbookWriter {
    fn write(&self, sheets: &[OutputSheet]) -> Result<WrittenWorkbook, SheetError> {
        writer::write_workbook(sheets, &self.style)
    }
}

// ==================== Tests ====================
