//! Error types for bukukas-sheet

use thiserror::Error;

#[derive(Error, Debug)]
pub enum SheetError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Invalid workbook: {message}")]
    InvalidWorkbook { message: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Failed to write workbook: {0}")]
    Write(#[from] rust_xlsxwriter::XlsxError),
}
