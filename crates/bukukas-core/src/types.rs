//! Basic types for the ledger sheet layout

use serde::{Deserialize, Serialize};

/// Mandatory date column
pub const COL_DATE: &str = "Tanggal";
/// Mandatory description column
pub const COL_DESCRIPTION: &str = "Uraian";
/// Mandatory balance column (running balance on export)
pub const COL_BALANCE: &str = "Saldo";
/// Optional per-row net amount column
pub const COL_NET: &str = "Jumlah";

/// Excel limit on sheet name length
pub const MAX_SHEET_NAME_CHARS: usize = 31;

/// Excel limit on characters in a text cell
pub const MAX_CELL_CHARS: usize = 32_767;

/// Which side of the ledger a category column belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategorySide {
    /// Penerimaan (receipts)
    Receipt,
    /// Pengeluaran (expenses)
    Expense,
}

impl CategorySide {
    /// Bare column name, also the header prefix without underscore
    pub fn label(&self) -> &'static str {
        match self {
            CategorySide::Receipt => "Penerimaan",
            CategorySide::Expense => "Pengeluaran",
        }
    }

    /// Column header for a category, e.g. `Penerimaan_Jasa`
    pub fn header(&self, category: &str) -> String {
        format!("{}_{}", self.label(), category)
    }

    /// Split a header like `Pengeluaran_ATK` into side and category.
    ///
    /// Returns `None` for other headers and for an empty category suffix.
    pub fn parse_header(header: &str) -> Option<(CategorySide, &str)> {
        for side in [CategorySide::Receipt, CategorySide::Expense] {
            if let Some(rest) = header.strip_prefix(side.label()).and_then(|r| r.strip_prefix('_')) {
                let category = rest.trim();
                if category.is_empty() {
                    return None;
                }
                return Some((side, category));
            }
        }
        None
    }
}

impl std::str::FromStr for CategorySide {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "penerimaan" | "receipt" | "receipts" => Ok(CategorySide::Receipt),
            "pengeluaran" | "expense" | "expenses" => Ok(CategorySide::Expense),
            _ => Err(format!("Invalid category side: {}", s)),
        }
    }
}

impl std::fmt::Display for CategorySide {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

/// Transaction fields and their JSON names.
///
/// The wire uses the ledger's own column vocabulary (`tanggal`, `uraian`,
/// ...); Rust code uses English field names.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LedgerField {
    Date,
    Description,
    Receipts,
    Expenses,
    Balance,
}

impl LedgerField {
    pub const ALL: [LedgerField; 5] = [
        LedgerField::Date,
        LedgerField::Description,
        LedgerField::Receipts,
        LedgerField::Expenses,
        LedgerField::Balance,
    ];

    /// Name used in JSON bodies
    pub fn wire_name(&self) -> &'static str {
        match self {
            LedgerField::Date => "tanggal",
            LedgerField::Description => "uraian",
            LedgerField::Receipts => "penerimaan",
            LedgerField::Expenses => "pengeluaran",
            LedgerField::Balance => "saldo",
        }
    }

    /// Name of the Rust struct field
    pub fn field_name(&self) -> &'static str {
        match self {
            LedgerField::Date => "date",
            LedgerField::Description => "description",
            LedgerField::Receipts => "receipts",
            LedgerField::Expenses => "expenses",
            LedgerField::Balance => "balance",
        }
    }

    pub fn from_wire(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.wire_name() == name)
    }

    pub fn from_field_name(name: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|f| f.field_name() == name)
    }
}

impl std::fmt::Display for LedgerField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.wire_name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_header() {
        assert_eq!(
            CategorySide::parse_header("Penerimaan_Jasa"),
            Some((CategorySide::Receipt, "Jasa"))
        );
        assert_eq!(
            CategorySide::parse_header("Pengeluaran_Biaya Listrik"),
            Some((CategorySide::Expense, "Biaya Listrik"))
        );
        assert_eq!(CategorySide::parse_header("Penerimaan_"), None);
        assert_eq!(CategorySide::parse_header("Penerimaan"), None);
        assert_eq!(CategorySide::parse_header("Saldo"), None);
    }

    #[test]
    fn test_header_roundtrip() {
        let header = CategorySide::Expense.header("ATK");
        assert_eq!(header, "Pengeluaran_ATK");
        assert_eq!(CategorySide::parse_header(&header), Some((CategorySide::Expense, "ATK")));
    }

    #[test]
    fn test_category_side_from_str() {
        assert_eq!("PENERIMAAN".parse::<CategorySide>().unwrap(), CategorySide::Receipt);
        assert_eq!("expenses".parse::<CategorySide>().unwrap(), CategorySide::Expense);
        assert!("saldo".parse::<CategorySide>().is_err());
    }

    #[test]
    fn test_ledger_field_names_are_reversible() {
        for field in LedgerField::ALL {
            assert_eq!(LedgerField::from_wire(field.wire_name()), Some(field));
            assert_eq!(LedgerField::from_field_name(field.field_name()), Some(field));
        }
        assert_eq!(LedgerField::from_wire("date"), None);
    }
}
