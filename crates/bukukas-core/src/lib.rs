//! Core ledger conversion logic
//!
//! Spreadsheet ledgers use one sheet per account with the columns
//! `Tanggal`, `Uraian`, any number of `Penerimaan_<category>` and
//! `Pengeluaran_<category>` columns, and `Saldo`. This crate normalizes such
//! sheets into [`Account`]s and materializes accounts back into sheets.

pub mod dates;
pub mod error;
pub mod export;
pub mod ingest;
pub mod models;
pub mod template;
pub mod types;

use std::collections::HashSet;
use std::sync::Arc;

use chrono::NaiveDateTime;

use bukukas_config::{Config, DateStyle};
use bukukas_sheet::{
    DefaultWorkbookReader, OutputSheet, ReaderRef, SpreadsheetFormat, WriterRef, WrittenWorkbook, XlsxStyle,
    XlsxWorkbookWriter,
};
use bukukas_utils::{file_extension, file_stem, timestamped_filename};

pub use error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
pub use export::ExportOptions;
pub use ingest::{Diagnostic, FallbackCategories, IngestOptions, IngestReport};
pub use models::{Account, AccountsPayload, Transaction};
pub use types::{CategorySide, LedgerField};

const XLSX_EXTENSION: &str = "xlsx";

/// Converts uploaded workbooks to accounts and accounts to workbooks.
///
/// Holds no per-request state; share it behind an `Arc`.
pub struct Converter {
    config: Config,
    reader: ReaderRef,
    writer: WriterRef,
}

impl Converter {
    /// Create a converter with explicit reader and writer
    pub fn new(config: Config, reader: ReaderRef, writer: WriterRef) -> Self {
        Self { config, reader, writer }
    }

    /// Create a converter using calamine/csv for reading and rust_xlsxwriter for writing
    pub fn with_defaults(config: Config) -> Self {
        let style = xlsx_style(&config);
        Self::new(
            config,
            Arc::new(DefaultWorkbookReader),
            Arc::new(XlsxWorkbookWriter::new(style)),
        )
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Read an uploaded file into accounts.
    ///
    /// `sheet_filter` limits which sheets are scanned; `None` or an empty
    /// list scans them all.
    pub fn ingest(&self, file_name: &str, bytes: &[u8], sheet_filter: Option<&[String]>) -> CoreResult<IngestReport> {
        let extension = file_extension(file_name).unwrap_or_default();
        if !self.config.is_extension_allowed(&extension) {
            return Err(CoreError::UnsupportedFormat { extension });
        }
        let format = SpreadsheetFormat::from_extension(&extension)
            .ok_or_else(|| CoreError::UnsupportedFormat { extension: extension.clone() })?;

        let tables = self.reader.read(format, file_stem(file_name), bytes)?;
        log::debug!(target: "bukukas::ingest", "Read {} sheet(s) from '{}'", tables.len(), file_name);

        let fallback = (format == SpreadsheetFormat::Csv).then(|| FallbackCategories {
            receipt: self.config.ingest.csv_default_receipt_category.clone(),
            expense: self.config.ingest.csv_default_expense_category.clone(),
        });
        let sheet_filter = sheet_filter
            .filter(|names| !names.is_empty())
            .map(|names| names.iter().cloned().collect::<HashSet<_>>());

        let report = ingest::ingest_tables(&tables, &IngestOptions { fallback, sheet_filter })?;

        log::info!(
            target: "bukukas::ingest",
            "Ingested '{}': {} account(s), {} diagnostic(s), {} skipped sheet(s)",
            file_name,
            report.accounts.len(),
            report.diagnostics.len(),
            report.skipped_sheets.len()
        );

        Ok(report)
    }

    /// Build an `.xlsx` workbook for `accounts`.
    ///
    /// A sheet the writer rejects is left out and logged; if none survive,
    /// the workbook holds the "No valid data to export" placeholder instead.
    pub fn export(&self, accounts: &[Account]) -> CoreResult<Vec<u8>> {
        let options = ExportOptions::from(&self.config.export);
        let sheets = export::materialize(accounts, &options)?;

        let mut workbook = self.write_sheets(&sheets)?;
        for failure in &workbook.failed {
            let error = CoreError::ExportFailure {
                message: format!("sheet '{}' skipped: {}", failure.sheet, failure.error),
            };
            log::warn!(target: "bukukas::export", "{}", error);
        }
        if workbook.written == 0 {
            log::warn!(target: "bukukas::export", "No sheet could be written");
            workbook = self.write_sheets(&[OutputSheet::Message {
                name: export::PLACEHOLDER_SHEET.to_string(),
                message: export::NO_VALID_DATA_MESSAGE.to_string(),
            }])?;
        }

        log::info!(
            target: "bukukas::export",
            "Exported {} account(s) into {} sheet(s), {} bytes",
            accounts.len(),
            workbook.written,
            workbook.bytes.len()
        );

        Ok(workbook.bytes)
    }

    fn write_sheets(&self, sheets: &[OutputSheet]) -> CoreResult<WrittenWorkbook> {
        self.writer.write(sheets).map_err(|e| {
            let error = CoreError::from(e);
            log::error!(target: "bukukas::export", "{}", error.to_details());
            error
        })
    }

    /// Sample workbook showing the expected layout
    pub fn template(&self) -> CoreResult<Vec<u8>> {
        self.export(&template::sample_accounts())
    }

    /// Download name for an exported workbook
    pub fn export_filename(&self, at: NaiveDateTime) -> String {
        timestamped_filename(&self.config.export.filename_prefix, at, XLSX_EXTENSION)
    }

    /// Download name for the template workbook
    pub fn template_filename(&self, at: NaiveDateTime) -> String {
        timestamped_filename(&self.config.template.filename_prefix, at, XLSX_EXTENSION)
    }
}

fn xlsx_style(config: &Config) -> XlsxStyle {
    XlsxStyle {
        number_format: config.export.number_format.clone(),
        date_column_width: match config.export.date_style {
            DateStyle::Iso => 12.0,
            DateStyle::Long => 18.0,
        },
    }
}

// ==================== Tests ====================
