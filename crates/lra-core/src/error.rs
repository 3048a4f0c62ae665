//! Error types for lra-core
//!
//! This module provides the error taxonomy of the report builder: fatal
//! errors (`CoreError`), recoverable data-quality warnings (`ReportWarning`),
//! error codes, severities, and detail records with suggestions.

use lra_parser::ParseError;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error codes for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    /// Chart code does not fit its declared level
    MalformedAccountCode,
    /// Independent subtotals disagree
    InconsistentSubtotal,
    /// Ledger code without a chart leaf
    UnmatchedLedgerEntry,
    /// Debit/credit cell is not a number
    NonNumericAmount,
    /// Account code not in the chart
    AccountNotFound,
    /// Invalid report request
    InvalidRequest,
    /// Input tables could not be loaded
    SourceError,
    /// A total does not fit the decimal range
    AmountOverflow,
}

impl std::fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorCode::MalformedAccountCode => write!(f, "MALFORMED_ACCOUNT_CODE"),
            ErrorCode::InconsistentSubtotal => write!(f, "INCONSISTENT_SUBTOTAL"),
            ErrorCode::UnmatchedLedgerEntry => write!(f, "UNMATCHED_LEDGER_ENTRY"),
            ErrorCode::NonNumericAmount => write!(f, "NON_NUMERIC_AMOUNT"),
            ErrorCode::AccountNotFound => write!(f, "ACCOUNT_NOT_FOUND"),
            ErrorCode::InvalidRequest => write!(f, "INVALID_REQUEST"),
            ErrorCode::SourceError => write!(f, "SOURCE_ERROR"),
            ErrorCode::AmountOverflow => write!(f, "AMOUNT_OVERFLOW"),
        }
    }
}

/// Error severity levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ErrorSeverity {
    /// Informational
    Info,
    /// Warning - report built, some input was left out
    Warning,
    /// Error - report figures cannot be trusted or were not built
    Error,
}

impl std::fmt::Display for ErrorSeverity {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorSeverity::Info => write!(f, "info"),
            ErrorSeverity::Warning => write!(f, "warning"),
            ErrorSeverity::Error => write!(f, "error"),
        }
    }
}

/// Detailed error information for API responses
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorDetails {
    /// Error code
    pub code: ErrorCode,
    /// Severity
    pub severity: ErrorSeverity,
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
    /// Create a new error detail
    pub fn new(code: ErrorCode, severity: ErrorSeverity, message: String) -> Self {
        Self {
            code,
            severity,
            message,
            details: None,
            suggestions: vec![],
        }
    }

    /// Add detail information
    pub fn with_detail(mut self, detail: serde_json::Value) -> Self {
        self.details = Some(detail);
        self
    }

    /// Add a suggestion
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

/// Main error type for lra-core
#[derive(Error, Debug)]
pub enum CoreError {
    #[error("Malformed account code {code:?} at level {level}: {reason}")]
    MalformedAccountCode {
        code: String,
        level: i64,
        reason: String,
    },

    #[error(
        "Inconsistent {category} subtotal: leaves {leaf_total}, tree {tree_total}, ledger {ledger_total}"
    )]
    InconsistentSubtotal {
        category: String,
        leaf_total: Decimal,
        tree_total: Decimal,
        ledger_total: Decimal,
    },

    #[error("Account not found: {code}")]
    AccountNotFound { code: String },

    #[error("Invalid request: {message}")]
    InvalidRequest { message: String },

    #[error("Failed to load input tables: {0}")]
    Source(#[from] ParseError),

    #[error("Amount overflow while totalling {account}")]
    AmountOverflow { account: String },
}

impl CoreError {
    /// Get the error code
    pub fn code(&self) -> ErrorCode {
        match self {
            CoreError::MalformedAccountCode { .. } => ErrorCode::MalformedAccountCode,
            CoreError::InconsistentSubtotal { .. } => ErrorCode::InconsistentSubtotal,
            CoreError::AccountNotFound { .. } => ErrorCode::AccountNotFound,
            CoreError::InvalidRequest { .. } => ErrorCode::InvalidRequest,
            CoreError::Source(_) => ErrorCode::SourceError,
            CoreError::AmountOverflow { .. } => ErrorCode::AmountOverflow,
        }
    }

    /// Get the severity level
    pub fn severity(&self) -> ErrorSeverity {
        match self {
            CoreError::MalformedAccountCode { .. } => ErrorSeverity::Warning,
            CoreError::InconsistentSubtotal { .. } => ErrorSeverity::Error,
            CoreError::AccountNotFound { .. } => ErrorSeverity::Info,
            CoreError::InvalidRequest { .. } => ErrorSeverity::Error,
            CoreError::Source(_) => ErrorSeverity::Error,
            CoreError::AmountOverflow { .. } => ErrorSeverity::Error,
        }
    }

    /// Convert to detailed error info
    pub fn to_details(&self) -> ErrorDetails {
        let mut details = ErrorDetails::new(self.code(), self.severity(), self.to_string());

        match self {
            CoreError::MalformedAccountCode { code, level, .. } => {
                details = details.with_detail(serde_json::json!({ "code": code, "level": level }));
                details = details.with_suggestion(format!(
                    "A level {} code needs exactly {} dot-separated segments.",
                    level, level
                ));
                details = details.with_suggestion(
                    "Every code below level 1 needs its parent code in the chart.".to_string()
                );
            }
            CoreError::InconsistentSubtotal { leaf_total, tree_total, ledger_total, .. } => {
                details = details.with_detail(serde_json::json!({
                    "leaf_total": leaf_total.to_string(),
                    "tree_total": tree_total.to_string(),
                    "ledger_total": ledger_total.to_string(),
                }));
                details = details.with_suggestion(
                    "Ledger postings exist for codes that are not chart leaves.".to_string()
                );
                details = details.with_suggestion(
                    "Check the unmatched ledger codes and the chart leaf level.".to_string()
                );
            }
            CoreError::AccountNotFound { code } => {
                details = details.with_suggestion(format!(
                    "Check if the account '{}' exists in the chart of accounts.", code
                ));
            }
            CoreError::Source(_) => {
                details = details.with_suggestion(
                    "Check the data paths in the configuration file.".to_string()
                );
                details = details.with_suggestion(
                    "Spreadsheet workbooks must be exported to CSV or JSON first.".to_string()
                );
            }
            CoreError::AmountOverflow { account } => {
                details = details.with_detail(serde_json::json!({ "account": account }));
                details = details.with_suggestion(
                    "Check the ledger for amounts with misplaced decimal separators.".to_string()
                );
            }
            _ => {}
        }

        details
    }
}

/// Result type with CoreError
pub type CoreResult<T> = Result<T, CoreError>;

/// Recoverable data-quality issue found while indexing the ledger
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ReportWarning {
    /// Ledger code with no chart leaf; excluded from every balance
    UnmatchedLedgerEntry { code: String, entries: usize },
    /// Unreadable debit/credit cell; read as zero
    NonNumericAmount { row: usize, column: String, value: String },
}

impl ReportWarning {
    pub fn code(&self) -> ErrorCode {
        match self {
            ReportWarning::UnmatchedLedgerEntry { .. } => ErrorCode::UnmatchedLedgerEntry,
            ReportWarning::NonNumericAmount { .. } => ErrorCode::NonNumericAmount,
        }
    }

    pub fn to_details(&self) -> ErrorDetails {
        match self {
            ReportWarning::UnmatchedLedgerEntry { code, entries } => ErrorDetails::new(
                self.code(),
                ErrorSeverity::Warning,
                format!("{} ledger entries use code {:?}, which is not a chart leaf", entries, code),
            )
            .with_suggestion("Add the code to the chart or switch ledger_match to prefix.".to_string()),
            ReportWarning::NonNumericAmount { row, column, value } => ErrorDetails::new(
                self.code(),
                ErrorSeverity::Warning,
                format!("Ledger row {} has a non-numeric {} value {:?}, read as zero", row, column, value),
            ),
        }
    }
}

/// Context of an operation being reported on
#[derive(Debug, Clone, Default)]
pub struct ErrorContext {
    /// Operation being performed
    pub operation: String,
    /// Additional context data
    pub data: serde_json::Value,
}

impl ErrorContext {
    /// Create a new error context
    pub fn new(operation: &str) -> Self {
        Self {
            operation: operation.to_string(),
            data: serde_json::json!({}),
        }
    }

    /// Add context data
    pub fn with_data(mut self, key: &str, value: serde_json::Value) -> Self {
        self.data[key] = value;
        self
    }
}

/// Error logger trait
pub trait ErrorLogger {
    /// Log an error
    fn log_error(&self, error: &CoreError, context: &ErrorContext);
    /// Log a data-quality warning
    fn log_warning(&self, warning: &ReportWarning, context: &ErrorContext);
}

/// Default error logger using log crate
#[derive(Default)]
pub struct DefaultErrorLogger;

impl ErrorLogger for DefaultErrorLogger {
    fn log_error(&self, error: &CoreError, context: &ErrorContext) {
        match error.severity() {
            ErrorSeverity::Error => log::error!(
                target: "lra::core",
                "[{}] {} - Operation: {} - {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
            _ => log::warn!(
                target: "lra::core",
                "[{}] {} - Operation: {} - {}",
                error.code(),
                error,
                context.operation,
                context.data
            ),
        }
    }

    fn log_warning(&self, warning: &ReportWarning, context: &ErrorContext) {
        log::warn!(
            target: "lra::core",
            "[{}] {} - Operation: {}",
            warning.code(),
            warning.to_details().message,
            context.operation
        );
    }
}

// ==================== Tests ====================
