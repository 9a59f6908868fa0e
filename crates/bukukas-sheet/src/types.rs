//! Table model shared by the readers and the writer

use chrono::NaiveDate;
use rust_decimal::Decimal;

/// Supported input formats
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpreadsheetFormat {
    Xlsx,
    Xls,
    Csv,
}

impl SpreadsheetFormat {
    /// Resolve a format from a lowercase file extension
    pub fn from_extension(extension: &str) -> Option<Self> {
        match extension.to_ascii_lowercase().as_str() {
            "xlsx" | "xlsm" => Some(SpreadsheetFormat::Xlsx),
            "xls" => Some(SpreadsheetFormat::Xls),
            "csv" => Some(SpreadsheetFormat::Csv),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &str {
        match self {
            SpreadsheetFormat::Xlsx => "xlsx",
            SpreadsheetFormat::Xls => "xls",
            SpreadsheetFormat::Csv => "csv",
        }
    }
}

impl std::fmt::Display for SpreadsheetFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A single cell as read from a workbook
#[derive(Debug, Clone, PartialEq)]
pub enum Cell {
    Empty,
    Text(String),
    Number(f64),
    Bool(bool),
    Date(NaiveDate),
    /// Spreadsheet error value such as `#N/A`
    Error(String),
}

impl Cell {
    /// Empty cell or whitespace-only text
    pub fn is_blank(&self) -> bool {
        match self {
            Cell::Empty => true,
            Cell::Text(s) => s.trim().is_empty(),
            _ => false,
        }
    }

    /// String form of the cell, empty for blank cells
    pub fn display(&self) -> String {
        match self {
            Cell::Empty => String::new(),
            Cell::Text(s) => s.clone(),
            Cell::Number(n) => n.to_string(),
            Cell::Bool(b) => b.to_string(),
            Cell::Date(d) => d.format("%Y-%m-%d").to_string(),
            Cell::Error(e) => e.clone(),
        }
    }
}

/// One sheet: a header row and the data rows below it
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    pub name: String,
    pub headers: Vec<String>,
    pub rows: Vec<Vec<Cell>>,
    /// 0-based spreadsheet row holding the headers
    pub header_row: usize,
}

static EMPTY_CELL: Cell = Cell::Empty;

impl Table {
    pub fn new(name: impl Into<String>, headers: Vec<String>) -> Self {
        Self {
            name: name.into(),
            headers,
            rows: Vec::new(),
            header_row: 0,
        }
    }

    pub fn with_header_row(mut self, header_row: usize) -> Self {
        self.header_row = header_row;
        self
    }

    /// 1-based spreadsheet row number of data row `row`
    pub fn row_number(&self, row: usize) -> usize {
        self.header_row + row + 2
    }

    pub fn push_row(&mut self, row: Vec<Cell>) {
        self.rows.push(row);
    }

    /// Cell at (row, column); short rows read as empty
    pub fn cell(&self, row: usize, column: usize) -> &Cell {
        self.rows
            .get(row)
            .and_then(|r| r.get(column))
            .unwrap_or(&EMPTY_CELL)
    }
}

/// Column role, used for styling on export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnKind {
    Date,
    Description,
    Receipt,
    Expense,
    NumericTotal,
}

impl ColumnKind {
    pub fn is_numeric(&self) -> bool {
        matches!(self, ColumnKind::Receipt | ColumnKind::Expense | ColumnKind::NumericTotal)
    }
}

/// Output column header and its role
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Column {
    pub header: String,
    pub kind: ColumnKind,
}

impl Column {
    pub fn new(header: impl Into<String>, kind: ColumnKind) -> Self {
        Self {
            header: header.into(),
            kind,
        }
    }
}

/// A cell value to be written
#[derive(Debug, Clone, PartialEq)]
pub enum OutputCell {
    Text(String),
    Amount(Decimal),
}

/// A sheet to be written
#[derive(Debug, Clone, PartialEq)]
pub enum OutputSheet {
    /// Header row plus one row per transaction
    Table {
        name: String,
        columns: Vec<Column>,
        rows: Vec<Vec<OutputCell>>,
    },
    /// Placeholder sheet with a single `Message` column
    Message { name: String, message: String },
}

impl OutputSheet {
    pub fn name(&self) -> &str {
        match self {
            OutputSheet::Table { name, .. } => name,
            OutputSheet::Message { name, .. } => name,
        }
    }
}
