//! Input records and table loading
//!
//! Turns chart of accounts and general ledger tables (CSV or JSON) into
//! `ChartRow` / `LedgerRow` records, and provides the cell normalization
//! shared by both tables.

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod error;
pub mod normalize;
pub mod records;
pub mod tables;

pub use error::ParseError;
pub use normalize::{code_segments, is_within, normalize_code, parent_code, parse_amount, AmountValue};
pub use records::{AmountCell, ChartRow, LedgerRow};

// ==================== Table Source Trait ====================

/// Table source reference type
pub type TableSourceRef = Arc<dyn TableSource>;

/// Trait for anything that can supply the two input tables
#[async_trait]
pub trait TableSource: Send + Sync {
    /// Load the chart of accounts
    async fn load_chart(&self) -> Result<Vec<ChartRow>, ParseError>;

    /// Load the general ledger
    async fn load_ledger(&self) -> Result<Vec<LedgerRow>, ParseError>;
}

/// Table format, chosen by file extension
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TableFormat {
    Csv,
    Json,
}

impl TableFormat {
    /// Detect the format of a table file
    pub fn from_path(path: &Path) -> Result<Self, ParseError> {
        let ext = path
            .extension()
            .map(|e| e.to_string_lossy().to_lowercase())
            .unwrap_or_default();
        match ext.as_str() {
            "csv" => Ok(TableFormat::Csv),
            "json" => Ok(TableFormat::Json),
            _ => Err(ParseError::UnsupportedFormat {
                path: path.to_string_lossy().to_string(),
            }),
        }
    }
}

/// Tables read from files on disk
#[derive(Debug, Clone)]
pub struct FileTableSource {
    pub chart_path: PathBuf,
    pub ledger_path: PathBuf,
}

impl FileTableSource {
    pub fn new(chart_path: PathBuf, ledger_path: PathBuf) -> Self {
        Self {
            chart_path,
            ledger_path,
        }
    }
}

#[async_trait]
impl TableSource for FileTableSource {
    async fn load_chart(&self) -> Result<Vec<ChartRow>, ParseError> {
        let format = TableFormat::from_path(&self.chart_path)?;
        let content = tokio::fs::read(&self.chart_path).await?;
        log::info!(target: "lra::parser", "Loading chart of accounts from {}", self.chart_path.display());
        match format {
            TableFormat::Csv => tables::read_chart_csv(content.as_slice()),
            TableFormat::Json => tables::read_chart_json(&content),
        }
    }

    async fn load_ledger(&self) -> Result<Vec<LedgerRow>, ParseError> {
        let format = TableFormat::from_path(&self.ledger_path)?;
        let content = tokio::fs::read(&self.ledger_path).await?;
        log::info!(target: "lra::parser", "Loading ledger from {}", self.ledger_path.display());
        match format {
            TableFormat::Csv => tables::read_ledger_csv(content.as_slice()),
            TableFormat::Json => tables::read_ledger_json(&content),
        }
    }
}
