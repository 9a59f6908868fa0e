//! Core data models for the ledger

use std::collections::BTreeMap;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Category name to amount
pub type CategoryAmounts = BTreeMap<String, Decimal>;

/// One ledger row
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Transaction {
    /// `YYYY-MM-DD`, empty when the source date was missing or unreadable
    #[serde(rename = "tanggal", alias = "date", default)]
    pub date: String,
    /// Free text (Uraian)
    #[serde(rename = "uraian", alias = "description", default)]
    pub description: String,
    /// Receipts by category (Penerimaan_*)
    #[serde(rename = "penerimaan", alias = "receipts", default)]
    pub receipts: CategoryAmounts,
    /// Expenses by category (Pengeluaran_*)
    #[serde(rename = "pengeluaran", alias = "expenses", default)]
    pub expenses: CategoryAmounts,
    /// Saldo as read; recomputed on export
    #[serde(rename = "saldo", alias = "balance", alias = "jumlah", default)]
    pub balance: Decimal,
}

impl Transaction {
    pub fn new(date: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            date: date.into(),
            description: description.into(),
            ..Default::default()
        }
    }

    /// Builder helper for a receipt amount
    pub fn with_receipt(mut self, category: impl Into<String>, amount: Decimal) -> Self {
        self.receipts.insert(category.into(), amount);
        self
    }

    /// Builder helper for an expense amount
    pub fn with_expense(mut self, category: impl Into<String>, amount: Decimal) -> Self {
        self.expenses.insert(category.into(), amount);
        self
    }

    /// Sum of receipts, `None` on overflow
    pub fn total_receipts(&self) -> Option<Decimal> {
        checked_sum(self.receipts.values())
    }

    /// Sum of expenses, `None` on overflow
    pub fn total_expenses(&self) -> Option<Decimal> {
        checked_sum(self.expenses.values())
    }

    /// Receipts minus expenses, `None` on overflow
    pub fn net(&self) -> Option<Decimal> {
        self.total_receipts()?.checked_sub(self.total_expenses()?)
    }
}

/// Overflow-checked sum
pub fn checked_sum<'a>(values: impl IntoIterator<Item = &'a Decimal>) -> Option<Decimal> {
    values
        .into_iter()
        .try_fold(Decimal::ZERO, |acc, value| acc.checked_add(*value))
}

/// One named ledger, one sheet in the workbook
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    /// Opaque identifier owned by the client
    #[serde(default)]
    pub id: Option<String>,
    /// Source row order, never re-sorted
    #[serde(default)]
    pub transactions: Vec<Transaction>,
}

impl Account {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            transactions: Vec::new(),
        }
    }

    pub fn with_transactions(mut self, transactions: Vec<Transaction>) -> Self {
        self.transactions = transactions;
        self
    }
}

/// Body of `/api/upload` responses and `/api/save` requests
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct AccountsPayload {
    #[serde(default)]
    pub accounts: Vec<Account>,
}

impl From<Vec<Account>> for AccountsPayload {
    fn from(accounts: Vec<Account>) -> Self {
        Self { accounts }
    }
}
