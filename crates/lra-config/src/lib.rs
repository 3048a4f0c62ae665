//! Configuration management for the LRA report builder
//!
//! This module handles loading, validation, and management of
//! report configuration from YAML files.

pub mod error;

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;

pub use error::ConfigError;

// ==================== Configuration Types ====================

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Server host address
    #[serde(default = "default_host")]
    pub host: String,
    /// Server port
    #[serde(default = "default_port")]
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    8081
}

/// Input table locations
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DataConfig {
    /// Directory holding the input tables
    #[serde(default = "default_data_path")]
    pub path: PathBuf,
    /// Chart of accounts table (relative to `path`)
    #[serde(default = "default_chart_file")]
    pub chart_file: String,
    /// General ledger table (relative to `path`)
    #[serde(default = "default_ledger_file")]
    pub ledger_file: String,
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            path: default_data_path(),
            chart_file: default_chart_file(),
            ledger_file: default_ledger_file(),
        }
    }
}

fn default_data_path() -> PathBuf {
    PathBuf::from("./data")
}

fn default_chart_file() -> String {
    "coa.csv".to_string()
}

fn default_ledger_file() -> String {
    "bukubesar.csv".to_string()
}

/// How ledger account codes are matched against chart leaves
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LedgerMatch {
    /// Ledger code must equal a leaf code
    Exact,
    /// Ledger code rolls up into the leaf that is its longest segment prefix
    Prefix,
}

impl Default for LedgerMatch {
    fn default() -> Self {
        LedgerMatch::Exact
    }
}

impl std::str::FromStr for LedgerMatch {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "exact" => Ok(LedgerMatch::Exact),
            "prefix" => Ok(LedgerMatch::Prefix),
            _ => Err(format!("Invalid ledger match mode: {}", s)),
        }
    }
}

impl std::fmt::Display for LedgerMatch {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LedgerMatch::Exact => write!(f, "exact"),
            LedgerMatch::Prefix => write!(f, "prefix"),
        }
    }
}

/// What to do with a chart row whose code is malformed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MalformedPolicy {
    /// Skip the branch, record it in diagnostics and continue
    Skip,
    /// Fail the whole report build
    Abort,
}

impl Default for MalformedPolicy {
    fn default() -> Self {
        MalformedPolicy::Skip
    }
}

impl std::str::FromStr for MalformedPolicy {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "skip" => Ok(MalformedPolicy::Skip),
            "abort" => Ok(MalformedPolicy::Abort),
            _ => Err(format!("Invalid malformed policy: {}", s)),
        }
    }
}

impl std::fmt::Display for MalformedPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            MalformedPolicy::Skip => write!(f, "skip"),
            MalformedPolicy::Abort => write!(f, "abort"),
        }
    }
}

/// Report building rules
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReportConfig {
    /// Level at which chart nodes are bound to ledger postings
    #[serde(default = "default_leaf_level")]
    pub leaf_level: u32,
    /// Per-category leaf level, keyed by code prefix (e.g. "5" or "6.1")
    #[serde(default)]
    pub leaf_level_overrides: BTreeMap<String, u32>,
    /// Transaction type excluded from realization
    #[serde(default = "default_closing_entry_tag")]
    pub closing_entry_tag: String,
    /// Ledger code matching mode
    #[serde(default)]
    pub ledger_match: LedgerMatch,
    /// Handling of malformed chart codes
    #[serde(default)]
    pub malformed_policy: MalformedPolicy,
    /// Allowed difference between independently computed subtotals
    #[serde(default = "default_subtotal_tolerance")]
    pub subtotal_tolerance: Decimal,
    /// Maximum number of sample rows kept per warning kind
    #[serde(default = "default_max_warning_samples")]
    pub max_warning_samples: usize,
}

impl Default for ReportConfig {
    fn default() -> Self {
        Self {
            leaf_level: default_leaf_level(),
            leaf_level_overrides: BTreeMap::new(),
            closing_entry_tag: default_closing_entry_tag(),
            ledger_match: LedgerMatch::default(),
            malformed_policy: MalformedPolicy::default(),
            subtotal_tolerance: default_subtotal_tolerance(),
            max_warning_samples: default_max_warning_samples(),
        }
    }
}

fn default_leaf_level() -> u32 {
    3
}

fn default_closing_entry_tag() -> String {
    "Jurnal Penutup".to_string()
}

fn default_subtotal_tolerance() -> Decimal {
    Decimal::new(1, 2)
}

fn default_max_warning_samples() -> usize {
    20
}

impl ReportConfig {
    /// Leaf level for an account code.
    ///
    /// The override with the longest matching segment prefix wins; codes
    /// without an override use `leaf_level`.
    pub fn leaf_level_for(&self, code: &str) -> u32 {
        self.leaf_level_overrides
            .iter()
            .filter(|(prefix, _)| {
                code == prefix.as_str()
                    || code
                        .strip_prefix(prefix.as_str())
                        .map_or(false, |rest| rest.starts_with('.'))
            })
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(_, level)| *level)
            .unwrap_or(self.leaf_level)
    }
}

/// Currency and number formatting
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrencyConfig {
    /// Currency symbol
    #[serde(default = "default_symbol")]
    pub symbol: String,
    /// Number of decimal places
    #[serde(default = "default_decimal_places")]
    pub decimal_places: u32,
    /// Thousands separator
    #[serde(default = "default_thousands_sep")]
    pub thousands_separator: String,
    /// Decimal separator
    #[serde(default = "default_decimal_sep")]
    pub decimal_separator: String,
    /// Currency symbol position ("before" or "after")
    #[serde(default = "default_symbol_position")]
    pub symbol_position: SymbolPosition,
}

impl Default for CurrencyConfig {
    fn default() -> Self {
        Self {
            symbol: default_symbol(),
            decimal_places: default_decimal_places(),
            thousands_separator: default_thousands_sep(),
            decimal_separator: default_decimal_sep(),
            symbol_position: default_symbol_position(),
        }
    }
}

fn default_symbol() -> String {
    "Rp".to_string()
}

fn default_decimal_places() -> u32 {
    0
}

fn default_thousands_sep() -> String {
    ",".to_string()
}

fn default_decimal_sep() -> String {
    ".".to_string()
}

fn default_symbol_position() -> SymbolPosition {
    SymbolPosition::Before
}

/// Currency symbol position
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SymbolPosition {
    Before,
    After,
}

impl Default for SymbolPosition {
    fn default() -> Self {
        SymbolPosition::Before
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level: debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

/// Main configuration structure
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct Config {
    /// Server settings
    #[serde(default)]
    pub server: ServerConfig,
    /// Input table settings
    #[serde(default)]
    pub data: DataConfig,
    /// Report building rules
    #[serde(default)]
    pub report: ReportConfig,
    /// Currency settings
    #[serde(default)]
    pub currency: CurrencyConfig,
    /// Logging settings
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Load configuration from a YAML file
    pub fn load(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_string_lossy().to_string(),
            });
        }

        let content = std::fs::read_to_string(&path).map_err(|_| ConfigError::IoError)?;
        Self::from_yaml(&content)
    }

    /// Parse and validate configuration from YAML text
    pub fn from_yaml(content: &str) -> Result<Self, ConfigError> {
        let config: Config = serde_yaml::from_str(content).map_err(|e| ConfigError::InvalidYaml {
            message: e.to_string(),
        })?;

        config.validate()?;

        Ok(config)
    }

    /// Validate configuration values
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.server.port == 0 {
            return Err(ConfigError::InvalidValue {
                field: "server.port".to_string(),
                reason: "Port must be greater than 0".to_string(),
            });
        }

        if !(1..=12).contains(&self.report.leaf_level) {
            return Err(ConfigError::InvalidValue {
                field: "report.leaf_level".to_string(),
                reason: "Leaf level must be between 1 and 12".to_string(),
            });
        }

        for (prefix, level) in &self.report.leaf_level_overrides {
            let depth = prefix.split('.').count() as u32;
            if prefix.trim().is_empty() || *level < depth || *level > 12 {
                return Err(ConfigError::InvalidValue {
                    field: format!("report.leaf_level_overrides.{}", prefix),
                    reason: format!(
                        "Leaf level must be between the prefix depth ({}) and 12",
                        depth
                    ),
                });
            }
        }

        if self.report.closing_entry_tag.trim().is_empty() {
            return Err(ConfigError::MissingField {
                field: "report.closing_entry_tag".to_string(),
            });
        }

        if self.report.subtotal_tolerance.is_sign_negative() {
            return Err(ConfigError::InvalidValue {
                field: "report.subtotal_tolerance".to_string(),
                reason: "Tolerance must not be negative".to_string(),
            });
        }

        if self.currency.decimal_places > 10 {
            return Err(ConfigError::InvalidValue {
                field: "currency.decimal_places".to_string(),
                reason: "Decimal places must be between 0 and 10".to_string(),
            });
        }

        Ok(())
    }

    /// Generate a default configuration file
    pub fn generate_default() -> &'static str {
        include_str!("../templates/default_config.yaml")
    }

    /// Full path to the chart of accounts table
    pub fn chart_path(&self) -> PathBuf {
        self.data.path.join(&self.data.chart_file)
    }

    /// Full path to the general ledger table
    pub fn ledger_path(&self) -> PathBuf {
        self.data.path.join(&self.data.ledger_file)
    }
}
