//! Export materializer
//!
//! Builds the sheet layout for a list of accounts. Per account the category
//! columns are collected first (sorted union over all transactions), then
//! rows are emitted against that fixed column set with a recomputed running
//! balance.
//!
//! Category names are trimmed before they become headers, since ingest trims
//! headers too; amounts whose names collapse to the same category are summed.

use std::collections::{BTreeSet, HashMap};

use rust_decimal::Decimal;

use bukukas_config::{DateStyle, ExportConfig};
use bukukas_sheet::{Column, ColumnKind, OutputCell, OutputSheet};
use bukukas_utils::truncate_chars;

use crate::dates::render_long;
use crate::error::{CoreError, CoreResult};
use crate::models::{Account, CategoryAmounts, Transaction};
use crate::types::{
    CategorySide, COL_BALANCE, COL_DATE, COL_DESCRIPTION, COL_NET, MAX_CELL_CHARS,
    MAX_SHEET_NAME_CHARS,
};

/// Name of the sheet used when nothing else is written
pub const PLACEHOLDER_SHEET: &str = "Data";
pub const NO_DATA_MESSAGE: &str = "No data available";
pub const NO_VALID_DATA_MESSAGE: &str = "No valid data to export";

const INVALID_SHEET_CHARS: [char; 7] = ['[', ']', ':', '*', '?', '/', '\\'];

#[derive(Debug, Clone, Default)]
pub struct ExportOptions {
    pub date_style: DateStyle,
    /// Add `Jumlah` (per-row net) before `Saldo`
    pub include_net_column: bool,
}

impl From<&ExportConfig> for ExportOptions {
    fn from(config: &ExportConfig) -> Self {
        Self {
            date_style: config.date_style,
            include_net_column: config.include_net_column,
        }
    }
}

/// Sorted category names used by an account, per side
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryUnion {
    pub receipts: BTreeSet<String>,
    pub expenses: BTreeSet<String>,
}

impl CategoryUnion {
    pub fn collect(transactions: &[Transaction]) -> Self {
        let mut union = Self::default();
        for tx in transactions {
            union.receipts.extend(tx.receipts.keys().cloned());
            union.expenses.extend(tx.expenses.keys().cloned());
        }
        union
    }
}

/// Sheet name for an account: first 31 characters of its name
pub fn sheet_name(account_name: &str) -> String {
    truncate_chars(account_name, MAX_SHEET_NAME_CHARS)
}

/// Why a sheet name cannot be written, if it cannot
pub fn sheet_name_problem(name: &str) -> Option<String> {
    if name.trim().is_empty() {
        return Some("sheet name is empty".to_string());
    }
    if let Some(c) = name.chars().find(|c| INVALID_SHEET_CHARS.contains(c)) {
        return Some(format!("sheet name '{}' contains '{}'", name, c));
    }
    if name.starts_with('\'') || name.ends_with('\'') {
        return Some(format!("sheet name '{}' starts or ends with an apostrophe", name));
    }
    if name.eq_ignore_ascii_case("history") {
        return Some(format!("sheet name '{}' is reserved", name));
    }
    None
}

/// Build the output sheets for `accounts`.
///
/// Fails only on a sheet name collision. Accounts whose name cannot be a
/// sheet name, or whose transactions cannot be written, are skipped and
/// logged.
pub fn materialize(accounts: &[Account], options: &ExportOptions) -> CoreResult<Vec<OutputSheet>> {
    if accounts.is_empty() {
        return Ok(vec![message_sheet(PLACEHOLDER_SHEET, NO_DATA_MESSAGE)]);
    }

    let mut seen: HashMap<String, &str> = HashMap::new();
    let mut sheets = Vec::with_capacity(accounts.len());

    for account in accounts {
        let name = sheet_name(&account.name);

        if let Some(problem) = sheet_name_problem(&name) {
            let error = CoreError::ExportFailure {
                message: format!("account '{}' skipped: {}", account.name, problem),
            };
            log::warn!(target: "bukukas::export", "{}", error);
            continue;
        }

        if let Some(first) = seen.insert(name.to_lowercase(), &account.name) {
            return Err(CoreError::SheetNameCollision {
                first: first.to_string(),
                second: account.name.clone(),
                sheet: name,
            });
        }

        match materialize_account(account, name, options) {
            Ok(sheet) => sheets.push(sheet),
            Err(problem) => {
                let error = CoreError::ExportFailure {
                    message: format!("account '{}' skipped: {}", account.name, problem),
                };
                log::warn!(target: "bukukas::export", "{}", error);
            }
        }
    }

    if sheets.is_empty() {
        log::warn!(target: "bukukas::export", "No account produced a sheet");
        sheets.push(message_sheet(PLACEHOLDER_SHEET, NO_VALID_DATA_MESSAGE));
    }

    Ok(sheets)
}

fn message_sheet(name: &str, message: &str) -> OutputSheet {
    OutputSheet::Message {
        name: name.to_string(),
        message: message.to_string(),
    }
}

fn materialize_account(account: &Account, name: String, options: &ExportOptions) -> Result<OutputSheet, String> {
    if account.transactions.is_empty() {
        return Ok(OutputSheet::Message {
            name,
            message: format!("No transactions for {}", account.name),
        });
    }

    let transactions = account
        .transactions
        .iter()
        .enumerate()
        .map(|(idx, tx)| {
            normalize_transaction(tx, options).map_err(|reason| format!("transaction {}: {}", idx + 1, reason))
        })
        .collect::<Result<Vec<_>, _>>()?;

    let union = CategoryUnion::collect(&transactions);
    let columns = columns_for(&union, options);

    let mut running = Decimal::ZERO;
    let mut rows = Vec::with_capacity(transactions.len());
    for (idx, tx) in transactions.iter().enumerate() {
        let overflow = || format!("transaction {}: amounts overflow", idx + 1);
        let net = tx.net().ok_or_else(overflow)?;
        running = running.checked_add(net).ok_or_else(overflow)?;

        let mut row = Vec::with_capacity(columns.len());
        row.push(OutputCell::Text(tx.date.clone()));
        row.push(OutputCell::Text(tx.description.clone()));
        for category in &union.receipts {
            row.push(OutputCell::Amount(tx.receipts.get(category).copied().unwrap_or_default()));
        }
        for category in &union.expenses {
            row.push(OutputCell::Amount(tx.expenses.get(category).copied().unwrap_or_default()));
        }
        if options.include_net_column {
            row.push(OutputCell::Amount(net));
        }
        row.push(OutputCell::Amount(running));
        rows.push(row);
    }

    Ok(OutputSheet::Table { name, columns, rows })
}

/// Copy of `tx` as it will be written: date rendered, text checked against
/// the cell limit, category names trimmed.
fn normalize_transaction(tx: &Transaction, options: &ExportOptions) -> Result<Transaction, String> {
    let date = render_date(&tx.date, options.date_style);
    for (column, text) in [(COL_DATE, &date), (COL_DESCRIPTION, &tx.description)] {
        let chars = text.chars().count();
        if chars > MAX_CELL_CHARS {
            return Err(format!(
                "{} has {} characters, more than the {} a cell can hold",
                column, chars, MAX_CELL_CHARS
            ));
        }
    }

    Ok(Transaction {
        date,
        description: tx.description.clone(),
        receipts: normalize_categories(CategorySide::Receipt, &tx.receipts)?,
        expenses: normalize_categories(CategorySide::Expense, &tx.expenses)?,
        balance: tx.balance,
    })
}

fn normalize_categories(side: CategorySide, amounts: &CategoryAmounts) -> Result<CategoryAmounts, String> {
    let mut normalized = CategoryAmounts::new();
    for (category, amount) in amounts {
        let trimmed = category.trim();
        if trimmed.is_empty() {
            if amount.is_zero() {
                continue;
            }
            return Err(format!("{} amount {} has an empty category name", side, amount));
        }
        let total = normalized.entry(trimmed.to_string()).or_insert(Decimal::ZERO);
        *total = total
            .checked_add(*amount)
            .ok_or_else(|| format!("{} category '{}' overflows", side, trimmed))?;
    }
    Ok(normalized)
}

fn columns_for(union: &CategoryUnion, options: &ExportOptions) -> Vec<Column> {
    let mut columns = vec![
        Column::new(COL_DATE, ColumnKind::Date),
        Column::new(COL_DESCRIPTION, ColumnKind::Description),
    ];
    columns.extend(
        union
            .receipts
            .iter()
            .map(|c| Column::new(CategorySide::Receipt.header(c), ColumnKind::Receipt)),
    );
    columns.extend(
        union
            .expenses
            .iter()
            .map(|c| Column::new(CategorySide::Expense.header(c), ColumnKind::Expense)),
    );
    if options.include_net_column {
        columns.push(Column::new(COL_NET, ColumnKind::NumericTotal));
    }
    columns.push(Column::new(COL_BALANCE, ColumnKind::NumericTotal));
    columns
}

fn render_date(stored: &str, style: DateStyle) -> String {
    match style {
        DateStyle::Iso => stored.to_string(),
        DateStyle::Long => render_long(stored),
    }
}
