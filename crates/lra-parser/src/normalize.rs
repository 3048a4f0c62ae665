//! Cell normalization shared by the chart and ledger tables

use chrono::{NaiveDate, NaiveDateTime};
use once_cell::sync::Lazy;
use regex::Regex;
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use std::str::FromStr;

use crate::records::AmountCell;

static CODE_PATTERN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9A-Za-z]+(\.[0-9A-Za-z]+)*$").unwrap());

/// Normalize an account code: coerce to text and trim surrounding whitespace.
///
/// Used for both chart and ledger codes so lookups agree.
pub fn normalize_code(raw: &str) -> String {
    raw.trim().to_string()
}

/// Split a normalized code into its dot segments.
///
/// Returns `None` when the code is empty or has empty or non-alphanumeric
/// segments ("4..1", "4.1.", "4 1").
pub fn code_segments(code: &str) -> Option<Vec<&str>> {
    if CODE_PATTERN.is_match(code) {
        Some(code.split('.').collect())
    } else {
        None
    }
}

/// Parent code of a well-formed code ("4.1.2" -> "4.1"), `None` for roots
pub fn parent_code(code: &str) -> Option<&str> {
    code.rfind('.').map(|pos| &code[..pos])
}

/// Whether `code` equals `prefix` or lies below it in the hierarchy
pub fn is_within(code: &str, prefix: &str) -> bool {
    code == prefix
        || code
            .strip_prefix(prefix)
            .map_or(false, |rest| rest.starts_with('.'))
}

/// Parse a level cell ("3", " 3 ", "3.0")
pub fn parse_level(raw: &str) -> Option<i64> {
    let trimmed = raw.trim();
    if let Ok(level) = trimmed.parse::<i64>() {
        return Some(level);
    }
    let value = Decimal::from_str(trimmed).ok()?;
    if value.fract().is_zero() {
        value.trunc().to_i64()
    } else {
        None
    }
}

/// Result of coercing an amount cell
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AmountValue {
    /// A usable number
    Value(Decimal),
    /// Missing cell, counts as zero without a warning
    Blank,
    /// Unreadable cell, counts as zero and is reported
    Invalid,
}

impl AmountValue {
    /// Amount with blank and invalid cells read as zero
    pub fn or_zero(self) -> Decimal {
        match self {
            AmountValue::Value(v) => v,
            AmountValue::Blank | AmountValue::Invalid => Decimal::ZERO,
        }
    }
}

/// Coerce an amount cell to a number.
///
/// Text is trimmed and read as a plain or scientific decimal. Empty text and
/// spreadsheet "nan" placeholders are blank; anything else unreadable is invalid.
pub fn parse_amount(cell: &AmountCell) -> AmountValue {
    match cell {
        AmountCell::Number(value) => AmountValue::Value(*value),
        AmountCell::Empty => AmountValue::Blank,
        AmountCell::Other(_) => AmountValue::Invalid,
        AmountCell::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() || trimmed.eq_ignore_ascii_case("nan") {
                return AmountValue::Blank;
            }
            let unsigned = trimmed.strip_prefix('+').unwrap_or(trimmed);
            Decimal::from_str(unsigned)
                .or_else(|_| Decimal::from_scientific(unsigned))
                .map(AmountValue::Value)
                .unwrap_or(AmountValue::Invalid)
        }
    }
}

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%d/%m/%Y", "%d-%m-%Y", "%Y/%m/%d"];
const DATETIME_FORMATS: &[&str] = &["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%d/%m/%Y %H:%M:%S"];

/// Parse a transaction date in one of the layouts seen in ledger exports
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return None;
    }
    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(trimmed, fmt).ok())
        .or_else(|| {
            DATETIME_FORMATS
                .iter()
                .find_map(|fmt| NaiveDateTime::parse_from_str(trimmed, fmt).ok())
                .map(|dt| dt.date())
        })
}
