//! Error types for bukukas-core
//!
//! Every failure the converter can report, with a stable code, a severity
//! and suggestions for the person holding the spreadsheet.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use bukukas_sheet::SheetError;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// File extension not accepted
    UnsupportedFormat,
    /// Bytes could not be read as a workbook
    MalformedWorkbook,
    /// Sheet lacks Tanggal, Uraian or Saldo
    MissingRequiredSheetColumns,
    /// No sheet produced an account
    NoValidAccounts,
    /// A row could not be coerced to numbers
    RowCoercionFailure,
    /// Two accounts map to the same sheet name
    SheetNameCollision,
    /// Workbook could not be produced
    ExportFailure,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::UnsupportedFormat => write!(f, "UNSUPPORTED_FORMAT"),
            ErrorCode::MalformedWorkbook => write!(f, "MALFORMED_WORKBOOK"),
            ErrorCode::MissingRequiredSheetColumns => write!(f, "MISSING_REQUIRED_SHEET_COLUMNS"),
            ErrorCode::NoValidAccounts => write!(f, "NO_VALID_ACCOUNTS"),
            ErrorCode::RowCoercionFailure => write!(f, "ROW_COERCION_FAILURE"),
            ErrorCode::SheetNameCollision => write!(f, "SHEET_NAME_COLLISION"),
            ErrorCode::ExportFailure => write!(f, "EXPORT_FAILURE"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Human-readable message
    pub message: String,
    /// Additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<serde_json::Value>,
    /// Suggestions for resolution
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub suggestions: Vec<String>,
}

impl ErrorDetails {
    pub fn new(code: ErrorCode, message: String) -> Self {
        Self {
            code,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    pub fn with_suggestion(mut self, suggestion: String) -> Self {
        self.suggestions.push(suggestion);
        self
    }
}

impl std::fmt::Display for ErrorDetails {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)?;
        if let Some(ref details) = self.details {
            write!(f, "\nDetails: {}", details)?;
        }
        if !self.suggestions.is_empty() {
            write!(f, "\nSuggestions:")?;
            for suggestion in &self.suggestions {
                write!(f, "\n  - {}", suggestion)?;
            }
        }
        Ok(())
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Absorbed, processing continues
    Warning,
    /// Request failed
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Main error type for bukukas-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Unsupported file format: {extension}")]
    UnsupportedFormat { extension: String },

    #[error("Malformed workbook: {message}")]
    MalformedWorkbook { message: String },

    #[error("Sheet '{sheet}' is missing required columns: {}", missing.join(", "))]
    MissingRequiredSheetColumns { sheet: String, missing: Vec<String> },

    #[error("No valid account sheets found")]
    NoValidAccounts,

    #[error("Sheet '{sheet}' row {row}: {reason}")]
    RowCoercionFailure { sheet: String, row: usize, reason: String },

    #[error("Accounts '{first}' and '{second}' both map to sheet name '{sheet}'")]
    SheetNameCollision { first: String, second: String, sheet: String },

    #[error("Export failed: {message}")]
    ExportFailure { message: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::UnsupportedFormat { .. } => ErrorCode::UnsupportedFormat,
            CoreError::MalformedWorkbook { .. } => ErrorCode::MalformedWorkbook,
            CoreError::MissingRequiredSheetColumns { .. } => ErrorCode::MissingRequiredSheetColumns,
            CoreError::NoValidAccounts => ErrorCode::NoValidAccounts,
            CoreError::RowCoercionFailure { .. } => ErrorCode::RowCoercionFailure,
            CoreError::SheetNameCollision { .. } => ErrorCode::SheetNameCollision,
            CoreError::ExportFailure { .. } => ErrorCode::ExportFailure,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MissingRequiredSheetColumns { .. } => ErrorSeverity::Warning,
            CoreError::RowCoercionFailure { .. } => ErrorSeverity::Warning,
            _ => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.to_string());

        match self {
            CoreError::UnsupportedFormat { .. } => {
                details = details.with_suggestion(
                    "Upload an .xlsx, .xls or .csv file.".to_string()
                );
            }
            CoreError::MalformedWorkbook { message } => {
                details = details.with_detail(serde_json::json!({ "reader_message": message }));
                details = details.with_suggestion(
                    "Open the file in a spreadsheet application and save it again.".to_string()
                );
            }
            CoreError::MissingRequiredSheetColumns { missing, .. } => {
                details = details.with_detail(serde_json::json!({ "missing": missing }));
                details = details.with_suggestion(
                    "The first row of the sheet must contain Tanggal, Uraian and Saldo.".to_string()
                );
            }
            CoreError::NoValidAccounts => {
                details = details.with_suggestion(
                    "Each account sheet needs the columns Tanggal, Uraian and Saldo in its first row.".to_string()
                );
                details = details.with_suggestion(
                    "Download /api/template to see the expected layout.".to_string()
                );
            }
            CoreError::RowCoercionFailure { row, .. } => {
                details = details.with_detail(serde_json::json!({ "row": row }));
                details = details.with_suggestion(
                    "Category columns must hold numbers.".to_string()
                );
            }
            CoreError::SheetNameCollision { .. } => {
                details = details.with_suggestion(
                    "Sheet names are limited to 31 characters and ignore case; rename one of the accounts.".to_string()
                );
            }
            CoreError::ExportFailure { .. } => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

impl From<SheetError> for CoreError {
    fn from(error: SheetError) -> Self {
        match error {
            SheetError::UnsupportedFormat { extension } => CoreError::UnsupportedFormat { extension },
            SheetError::InvalidWorkbook { message } => CoreError::MalformedWorkbook { message },
            SheetError::Csv(e) => CoreError::MalformedWorkbook { message: e.to_string() },
            SheetError::Write(e) => CoreError::ExportFailure { message: e.to_string() },
        }
    }
}

// ==================== Tests ====================
