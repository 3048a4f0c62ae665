//! Error types for lra-parser

use thiserror::Error;
use std::io;

#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Missing columns in {table} table: {}", columns.join(", "))]
    MissingColumns {
        table: String,
        columns: Vec<String>,
    },

    #[error("Invalid value in {table} table at line {line}, column {column}: {value:?}")]
    InvalidValue {
        table: String,
        line: u64,
        column: String,
        value: String,
    },

    #[error("Unsupported table format: {path} (expected .csv or .json)")]
    UnsupportedFormat { path: String },

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
}
