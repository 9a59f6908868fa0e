//! Ingest normalizer
//!
//! Turns read tables into accounts. Each sheet is handled in two passes:
//! the header row is resolved into a [`SheetSchema`] once, then every data
//! row is projected against that fixed schema.

use std::collections::HashSet;
use std::str::FromStr;

use rust_decimal::prelude::FromPrimitive;
use rust_decimal::Decimal;
use serde::Serialize;

use bukukas_sheet::{Cell, Table};

use crate::dates::normalize_date_cell;
use crate::error::{CoreError, CoreResult, ErrorCode, ErrorSeverity};
use crate::models::{Account, Transaction};
use crate::types::{CategorySide, COL_BALANCE, COL_DATE, COL_DESCRIPTION};

/// Categories used for bare `Penerimaan`/`Pengeluaran` columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FallbackCategories {
    pub receipt: String,
    pub expense: String,
}

/// Knobs for a single ingest run
#[derive(Debug, Clone, Default)]
pub struct IngestOptions {
    /// Set for CSV input only
    pub fallback: Option<FallbackCategories>,
    /// Only these sheets are scanned; all sheets when `None`
    pub sheet_filter: Option<HashSet<String>>,
}

/// A category column and where it sits in the header row
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryColumn {
    pub category: String,
    pub index: usize,
}

/// Column layout of one sheet, fixed before any row is read
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SheetSchema {
    pub date: usize,
    pub description: usize,
    pub balance: usize,
    pub receipts: Vec<CategoryColumn>,
    pub expenses: Vec<CategoryColumn>,
}

impl SheetSchema {
    /// Resolve the header row of `table`.
    ///
    /// Fails with `MissingRequiredSheetColumns` when Tanggal, Uraian or
    /// Saldo is absent.
    pub fn from_table(table: &Table, fallback: Option<&FallbackCategories>) -> CoreResult<Self> {
        let position = |name: &str| table.headers.iter().position(|h| h.trim() == name);

        let (date, description, balance) = match (position(COL_DATE), position(COL_DESCRIPTION), position(COL_BALANCE)) {
            (Some(d), Some(u), Some(s)) => (d, u, s),
            (d, u, s) => {
                let missing = [(d, COL_DATE), (u, COL_DESCRIPTION), (s, COL_BALANCE)]
                    .into_iter()
                    .filter(|(idx, _)| idx.is_none())
                    .map(|(_, name)| name.to_string())
                    .collect();
                return Err(CoreError::MissingRequiredSheetColumns {
                    sheet: table.name.clone(),
                    missing,
                });
            }
        };

        let mut receipts: Vec<CategoryColumn> = Vec::new();
        let mut expenses: Vec<CategoryColumn> = Vec::new();

        for (index, header) in table.headers.iter().enumerate() {
            let Some((side, category)) = CategorySide::parse_header(header.trim()) else {
                continue;
            };
            let columns = match side {
                CategorySide::Receipt => &mut receipts,
                CategorySide::Expense => &mut expenses,
            };
            if columns.iter().any(|c| c.category == category) {
                log::warn!(
                    target: "bukukas::ingest",
                    "Sheet '{}': duplicate column '{}', keeping the first one",
                    table.name, header
                );
                continue;
            }
            columns.push(CategoryColumn {
                category: category.to_string(),
                index,
            });
        }

        if let Some(fallback) = fallback {
            for (side, category) in [
                (CategorySide::Receipt, &fallback.receipt),
                (CategorySide::Expense, &fallback.expense),
            ] {
                let Some(index) = position(side.label()) else {
                    continue;
                };
                let columns = match side {
                    CategorySide::Receipt => &mut receipts,
                    CategorySide::Expense => &mut expenses,
                };
                if columns.iter().any(|c| &c.category == category) {
                    log::warn!(
                        target: "bukukas::ingest",
                        "Sheet '{}': bare '{}' column ignored, '{}' already present",
                        table.name, side.label(), side.header(category)
                    );
                    continue;
                }
                columns.push(CategoryColumn {
                    category: category.clone(),
                    index,
                });
            }
        }

        Ok(Self {
            date,
            description,
            balance,
            receipts,
            expenses,
        })
    }
}

/// Result of projecting one data row
#[derive(Debug, Clone, PartialEq)]
pub enum RowOutcome {
    Parsed(Transaction),
    /// `row` is the 1-based spreadsheet row number
    Skipped { row: usize, reason: String },
}

/// Something absorbed during ingest, reported next to the result
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Diagnostic {
    pub code: ErrorCode,
    pub severity: ErrorSeverity,
    pub sheet: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub row: Option<usize>,
    pub message: String,
}

impl Diagnostic {
    pub fn from_error(error: &CoreError) -> Self {
        let (sheet, row) = match error {
            CoreError::RowCoercionFailure { sheet, row, .. } => (sheet.clone(), Some(*row)),
            CoreError::MissingRequiredSheetColumns { sheet, .. } => (sheet.clone(), None),
            _ => (String::new(), None),
        };
        Self {
            code: error.code(),
            severity: error.severity(),
            sheet,
            row,
            message: error.to_string(),
        }
    }
}

/// Accounts plus everything that was skipped on the way
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct IngestReport {
    pub accounts: Vec<Account>,
    pub diagnostics: Vec<Diagnostic>,
    pub skipped_sheets: Vec<String>,
}

/// Numeric value of an amount cell.
///
/// `Ok(None)` means "not a number" (blank or a spreadsheet error value);
/// `Err` means the cell holds something that cannot be an amount.
pub fn coerce_amount(cell: &Cell) -> Result<Option<Decimal>, String> {
    match cell {
        Cell::Empty | Cell::Error(_) => Ok(None),
        Cell::Number(n) => {
            if !n.is_finite() {
                return Err(format!("non-finite number {}", n));
            }
            Decimal::from_f64(*n)
                .map(Some)
                .ok_or_else(|| format!("number {} is out of range", n))
        }
        Cell::Text(text) => parse_amount_text(text),
        Cell::Bool(b) => Err(format!("boolean {} is not an amount", b)),
        Cell::Date(d) => Err(format!("date {} is not an amount", d)),
    }
}

fn parse_amount_text(text: &str) -> Result<Option<Decimal>, String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Ok(None);
    }

    let without_prefix = match ["Rp", "rp", "RP"].iter().find_map(|p| trimmed.strip_prefix(*p)) {
        Some(rest) => rest.trim_start_matches('.').trim(),
        None => trimmed,
    };
    let cleaned: String = without_prefix.chars().filter(|c| *c != ',' && !c.is_whitespace()).collect();

    Decimal::from_str(&cleaned)
        .or_else(|_| Decimal::from_scientific(&cleaned))
        .map(Some)
        .map_err(|_| format!("'{}' is not a number", trimmed))
}

/// Project one data row against the schema. `row_idx` is 0-based below the header.
pub fn project_row(table: &Table, schema: &SheetSchema, row_idx: usize) -> RowOutcome {
    let row_number = table.row_number(row_idx);
    let mut tx = Transaction::new(
        normalize_date_cell(table.cell(row_idx, schema.date)),
        table.cell(row_idx, schema.description).display().trim().to_string(),
    );

    for (side, columns) in [
        (CategorySide::Receipt, &schema.receipts),
        (CategorySide::Expense, &schema.expenses),
    ] {
        for column in columns {
            let value = match coerce_amount(table.cell(row_idx, column.index)) {
                Ok(value) => value,
                Err(reason) => {
                    return RowOutcome::Skipped {
                        row: row_number,
                        reason: format!("{}: {}", side.header(&column.category), reason),
                    };
                }
            };
            if let Some(amount) = value.filter(|v| !v.is_zero()) {
                let target = match side {
                    CategorySide::Receipt => &mut tx.receipts,
                    CategorySide::Expense => &mut tx.expenses,
                };
                target.insert(column.category.clone(), amount);
            }
        }
    }

    tx.balance = coerce_amount(table.cell(row_idx, schema.balance))
        .ok()
        .flatten()
        .unwrap_or(Decimal::ZERO);

    RowOutcome::Parsed(tx)
}

/// Normalize one sheet into an account plus row diagnostics
pub fn normalize_table(table: &Table, fallback: Option<&FallbackCategories>) -> CoreResult<(Account, Vec<Diagnostic>)> {
    let schema = SheetSchema::from_table(table, fallback)?;

    let mut account = Account::new(table.name.clone());
    let mut diagnostics = Vec::new();

    for (row_idx, row) in table.rows.iter().enumerate() {
        if row.iter().all(Cell::is_blank) {
            continue;
        }
        match project_row(table, &schema, row_idx) {
            RowOutcome::Parsed(tx) => account.transactions.push(tx),
            RowOutcome::Skipped { row, reason } => {
                let error = CoreError::RowCoercionFailure {
                    sheet: table.name.clone(),
                    row,
                    reason,
                };
                log::warn!(target: "bukukas::ingest", "Skipping row: {}", error);
                diagnostics.push(Diagnostic::from_error(&error));
            }
        }
    }

    Ok((account, diagnostics))
}

/// Normalize every table, in order.
///
/// Sheets missing required columns are skipped; no account at all is
/// `NoValidAccounts`.
pub fn ingest_tables(tables: &[Table], options: &IngestOptions) -> CoreResult<IngestReport> {
    let mut report = IngestReport::default();

    for table in tables {
        if let Some(filter) = &options.sheet_filter {
            if !filter.contains(&table.name) {
                log::debug!(target: "bukukas::ingest", "Sheet '{}' not selected", table.name);
                continue;
            }
        }

        match normalize_table(table, options.fallback.as_ref()) {
            Ok((account, diagnostics)) => {
                log::debug!(
                    target: "bukukas::ingest",
                    "Sheet '{}': {} transactions, {} skipped rows",
                    table.name,
                    account.transactions.len(),
                    diagnostics.len()
                );
                report.accounts.push(account);
                report.diagnostics.extend(diagnostics);
            }
            Err(error @ CoreError::MissingRequiredSheetColumns { .. }) => {
                log::warn!(target: "bukukas::ingest", "Skipping sheet: {}", error);
                report.diagnostics.push(Diagnostic::from_error(&error));
                report.skipped_sheets.push(table.name.clone());
            }
            Err(error) => return Err(error),
        }
    }

    if report.accounts.is_empty() {
        return Err(CoreError::NoValidAccounts);
    }

    Ok(report)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn text(s: &str) -> Cell {
        Cell::Text(s.to_string())
    }

    fn table(name: &str, headers: &[&str], rows: Vec<Vec<Cell>>) -> Table {
        let mut table = Table::new(name, headers.iter().map(|h| h.to_string()).collect());
        for row in rows {
            table.push_row(row);
        }
        table
    }

    fn dec(n: i64) -> Decimal {
        Decimal::new(n, 0)
    }

    #[test]
    fn test_schema_discovers_categories_in_header_order() {
        let t = table(
            "Kas",
            &["Tanggal", "Uraian", "Pengeluaran_ATK", "Penerimaan_Jasa", "Penerimaan_Modal", "Saldo"],
            vec![],
        );
        let schema = SheetSchema::from_table(&t, None).unwrap();
        assert_eq!((schema.date, schema.description, schema.balance), (0, 1, 5));
        let receipts: Vec<_> = schema.receipts.iter().map(|c| c.category.as_str()).collect();
        assert_eq!(receipts, vec!["Jasa", "Modal"]);
        assert_eq!(schema.expenses, vec![CategoryColumn { category: "ATK".to_string(), index: 2 }]);
    }

    #[test]
    fn test_schema_trims_headers_and_ignores_empty_suffix() {
        let t = table("Kas", &[" Tanggal ", "Uraian", "Penerimaan_", "Saldo "], vec![]);
        let schema = SheetSchema::from_table(&t, None).unwrap();
        assert!(schema.receipts.is_empty());
        assert_eq!(schema.balance, 3);
    }

    #[test]
    fn test_schema_duplicate_category_keeps_first() {
        let t = table("Kas", &["Tanggal", "Uraian", "Penerimaan_A", "Penerimaan_A", "Saldo"], vec![]);
        let schema = SheetSchema::from_table(&t, None).unwrap();
        assert_eq!(schema.receipts, vec![CategoryColumn { category: "A".to_string(), index: 2 }]);
    }

    #[test]
    fn test_schema_missing_columns() {
        let t = table("Catatan", &["Tanggal", "Keterangan"], vec![]);
        let err = SheetSchema::from_table(&t, None).unwrap_err();
        match err {
            CoreError::MissingRequiredSheetColumns { sheet, missing } => {
                assert_eq!(sheet, "Catatan");
                assert_eq!(missing, vec!["Uraian".to_string(), "Saldo".to_string()]);
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_coerce_amount() {
        assert_eq!(coerce_amount(&Cell::Empty), Ok(None));
        assert_eq!(coerce_amount(&text("   ")), Ok(None));
        assert_eq!(coerce_amount(&Cell::Error("#N/A".to_string())), Ok(None));
        assert_eq!(coerce_amount(&Cell::Number(150000.0)), Ok(Some(dec(150000))));
        assert_eq!(coerce_amount(&text("1,250,000")), Ok(Some(dec(1250000))));
        assert_eq!(coerce_amount(&text("Rp 75,000")), Ok(Some(dec(75000))));
        assert_eq!(coerce_amount(&text("Rp. 5000")), Ok(Some(dec(5000))));
        assert_eq!(coerce_amount(&text("-12.5")), Ok(Some(Decimal::new(-125, 1))));
        assert!(coerce_amount(&text("abc")).is_err());
        assert!(coerce_amount(&Cell::Bool(true)).is_err());
        assert!(coerce_amount(&Cell::Number(f64::INFINITY)).is_err());
        assert!(coerce_amount(&Cell::Number(1e40)).is_err());
    }

    #[test]
    fn test_zero_blank_and_error_amounts_are_not_keys() {
        let t = table(
            "Kas",
            &["Tanggal", "Uraian", "Penerimaan_A", "Penerimaan_B", "Pengeluaran_C", "Pengeluaran_D", "Saldo"],
            vec![vec![
                text("2024-01-01"),
                text("Campur"),
                Cell::Number(0.0),
                Cell::Empty,
                Cell::Error("#VALUE!".to_string()),
                Cell::Number(40.0),
                Cell::Number(-40.0),
            ]],
        );
        let (account, diagnostics) = normalize_table(&t, None).unwrap();
        assert!(diagnostics.is_empty());
        let tx = &account.transactions[0];
        assert!(tx.receipts.is_empty());
        assert_eq!(tx.expenses.len(), 1);
        assert_eq!(tx.expenses.get("D"), Some(&dec(40)));
        assert_eq!(tx.balance, dec(-40));
    }

    #[test]
    fn test_non_numeric_category_skips_row() {
        let t = table(
            "Kas",
            &["Tanggal", "Uraian", "Penerimaan_A", "Saldo"],
            vec![
                vec![text("2024-01-01"), text("ok"), Cell::Number(10.0), Cell::Number(10.0)],
                vec![text("2024-01-02"), text("rusak"), text("sepuluh"), Cell::Number(10.0)],
                vec![text("2024-01-03"), text("ok lagi"), Cell::Number(5.0), Cell::Number(15.0)],
            ],
        );
        let (account, diagnostics) = normalize_table(&t, None).unwrap();
        assert_eq!(account.transactions.len(), 2);
        assert_eq!(account.transactions[1].description, "ok lagi");
        assert_eq!(diagnostics.len(), 1);
        assert_eq!(diagnostics[0].code, ErrorCode::RowCoercionFailure);
        assert_eq!(diagnostics[0].row, Some(3));
        assert!(diagnostics[0].message.contains("Penerimaan_A"));

        let (_, diagnostics) = normalize_table(&t.with_header_row(4), None).unwrap();
        assert_eq!(diagnostics[0].row, Some(7));
    }

    #[test]
    fn test_row_fields() {
        let t = table(
            "Bank",
            &["Tanggal", "Uraian", "Penerimaan_Bunga", "Saldo"],
            vec![
                vec![
                    Cell::Date(NaiveDate::from_ymd_opt(2024, 9, 24).unwrap()),
                    text("  Bunga  "),
                    text("1,500"),
                    text("bukan angka"),
                ],
                vec![text("tidak jelas"), Cell::Number(42.0), Cell::Empty, Cell::Empty],
            ],
        );
        let (account, _) = normalize_table(&t, None).unwrap();
        assert_eq!(account.name, "Bank");
        assert_eq!(account.id, None);

        let first = &account.transactions[0];
        assert_eq!(first.date, "2024-09-24");
        assert_eq!(first.description, "Bunga");
        assert_eq!(first.receipts.get("Bunga"), Some(&dec(1500)));
        assert_eq!(first.balance, Decimal::ZERO);

        let second = &account.transactions[1];
        assert_eq!(second.date, "");
        assert_eq!(second.description, "42");
    }

    #[test]
    fn test_blank_rows_are_dropped_silently() {
        let t = table(
            "Kas",
            &["Tanggal", "Uraian", "Saldo"],
            vec![
                vec![Cell::Empty, text(" "), Cell::Empty],
                vec![text("2024-01-01"), text("isi"), Cell::Number(1.0)],
                vec![],
            ],
        );
        let (account, diagnostics) = normalize_table(&t, None).unwrap();
        assert_eq!(account.transactions.len(), 1);
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_csv_fallback_categories() {
        let fallback = FallbackCategories {
            receipt: "Umum".to_string(),
            expense: "Umum".to_string(),
        };
        let t = table(
            "kas",
            &["Tanggal", "Uraian", "Penerimaan", "Pengeluaran", "Pengeluaran_Umum", "Saldo"],
            vec![vec![
                text("2024-01-01"),
                text("x"),
                text("100"),
                text("999"),
                text("20"),
                text("80"),
            ]],
        );
        let (account, _) = normalize_table(&t, Some(&fallback)).unwrap();
        let tx = &account.transactions[0];
        assert_eq!(tx.receipts.get("Umum"), Some(&dec(100)));
        // explicit Pengeluaran_Umum wins over the bare column
        assert_eq!(tx.expenses.get("Umum"), Some(&dec(20)));
        assert_eq!(tx.expenses.len(), 1);

        let (account, _) = normalize_table(&t, None).unwrap();
        assert!(account.transactions[0].receipts.is_empty());
    }

    #[test]
    fn test_ingest_tables_skips_invalid_sheets_and_keeps_order() {
        let tables = vec![
            table("Bank", &["Tanggal", "Uraian", "Saldo"], vec![]),
            table("Catatan", &["Apa saja"], vec![vec![text("x")]]),
            table("Kas", &["Tanggal", "Uraian", "Saldo"], vec![]),
        ];
        let report = ingest_tables(&tables, &IngestOptions::default()).unwrap();
        let names: Vec<_> = report.accounts.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Bank", "Kas"]);
        assert_eq!(report.skipped_sheets, vec!["Catatan".to_string()]);
        assert_eq!(report.diagnostics[0].code, ErrorCode::MissingRequiredSheetColumns);
    }

    #[test]
    fn test_ingest_tables_no_valid_accounts() {
        let tables = vec![table("Catatan", &["A", "B"], vec![])];
        let err = ingest_tables(&tables, &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::NoValidAccounts));

        let err = ingest_tables(&[], &IngestOptions::default()).unwrap_err();
        assert!(matches!(err, CoreError::NoValidAccounts));
    }

    #[test]
    fn test_sheet_filter() {
        let tables = vec![
            table("Bank", &["Tanggal", "Uraian", "Saldo"], vec![]),
            table("Kas", &["Tanggal", "Uraian", "Saldo"], vec![]),
        ];
        let options = IngestOptions {
            fallback: None,
            sheet_filter: Some(["Kas".to_string()].into_iter().collect()),
        };
        let report = ingest_tables(&tables, &options).unwrap();
        assert_eq!(report.accounts.len(), 1);
        assert_eq!(report.accounts[0].name, "Kas");
        assert!(report.skipped_sheets.is_empty());

        let options = IngestOptions {
            fallback: None,
            sheet_filter: Some(["Lainnya".to_string()].into_iter().collect()),
        };
        assert!(matches!(ingest_tables(&tables, &options), Err(CoreError::NoValidAccounts)));
    }
}
