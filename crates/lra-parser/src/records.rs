//! Input records for the chart of accounts and the general ledger
//!
//! Records carry cell values as they arrive from the source table. Codes and
//! amounts are normalized later, by the same functions on both tables.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::de::{self, Deserializer, Visitor};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::normalize::parse_date;

/// One chart of accounts row
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChartRow {
    /// Dot-delimited account code (e.g. "4.1.2")
    #[serde(alias = "Kode Akun", deserialize_with = "text_cell")]
    pub code: String,
    /// Display name
    #[serde(alias = "Nama Akun", default)]
    pub name: String,
    /// Declared depth, 1 for root categories
    #[serde(alias = "Level", deserialize_with = "level_cell")]
    pub level: i64,
}

impl ChartRow {
    pub fn new(code: impl Into<String>, name: impl Into<String>, level: i64) -> Self {
        Self {
            code: code.into(),
            name: name.into(),
            level,
        }
    }
}

/// Raw debit/credit cell
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum AmountCell {
    /// Numeric cell
    Number(Decimal),
    /// Text cell, parsed leniently when indexed
    Text(String),
    /// Missing or null cell
    Empty,
    /// Any other value (flag, list, object, out-of-range number), read as invalid
    Other(serde_json::Value),
}

impl AmountCell {
    /// Cell content as it appeared in the source
    pub fn raw(&self) -> String {
        match self {
            AmountCell::Number(n) => n.to_string(),
            AmountCell::Text(text) => text.clone(),
            AmountCell::Empty => String::new(),
            AmountCell::Other(value) => value.to_string(),
        }
    }
}

impl Default for AmountCell {
    fn default() -> Self {
        AmountCell::Empty
    }
}

impl From<Decimal> for AmountCell {
    fn from(value: Decimal) -> Self {
        AmountCell::Number(value)
    }
}

impl From<&str> for AmountCell {
    fn from(value: &str) -> Self {
        if value.is_empty() {
            AmountCell::Empty
        } else {
            AmountCell::Text(value.to_string())
        }
    }
}

/// One general ledger posting
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerRow {
    /// Account code the posting applies to
    #[serde(alias = "kd_lv_6", alias = "kd_lv6", deserialize_with = "text_cell")]
    pub account_code: String,
    /// Debit amount
    #[serde(alias = "debet", default)]
    pub debit: AmountCell,
    /// Credit amount
    #[serde(alias = "kredit", default)]
    pub credit: AmountCell,
    /// Journal type (e.g. "Jurnal Umum", "Jurnal Penutup")
    #[serde(alias = "jns_transaksi", default)]
    pub transaction_type: String,
    /// Transaction date
    #[serde(alias = "tgl_transaksi", default, deserialize_with = "date_cell")]
    pub date: Option<NaiveDate>,
    /// Organizational unit
    #[serde(alias = "nm_unit", default)]
    pub unit: Option<String>,
    /// Organizational sub-unit
    #[serde(alias = "nm_sub_unit", default, skip_serializing_if = "Option::is_none")]
    pub sub_unit: Option<String>,
    /// Voucher number
    #[serde(alias = "no_bukti", default, skip_serializing_if = "Option::is_none")]
    pub voucher: Option<String>,
    /// Posting description
    #[serde(alias = "uraian", default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl LedgerRow {
    pub fn new(
        account_code: impl Into<String>,
        debit: impl Into<AmountCell>,
        credit: impl Into<AmountCell>,
        transaction_type: impl Into<String>,
    ) -> Self {
        Self {
            account_code: account_code.into(),
            debit: debit.into(),
            credit: credit.into(),
            transaction_type: transaction_type.into(),
            date: None,
            unit: None,
            sub_unit: None,
            voucher: None,
            description: None,
        }
    }

    pub fn with_date(mut self, date: NaiveDate) -> Self {
        self.date = Some(date);
        self
    }

    pub fn with_unit(mut self, unit: impl Into<String>) -> Self {
        self.unit = Some(unit.into());
        self
    }

    pub fn with_sub_unit(mut self, sub_unit: impl Into<String>) -> Self {
        self.sub_unit = Some(sub_unit.into());
        self
    }

    pub fn with_voucher(mut self, voucher: impl Into<String>, description: impl Into<String>) -> Self {
        self.voucher = Some(voucher.into());
        self.description = Some(description.into());
        self
    }
}

// ==================== Lenient cell deserializers ====================

/// Accept a code written as text or as a number
fn text_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<String, D::Error> {
    struct TextVisitor;

    impl<'de> Visitor<'de> for TextVisitor {
        type Value = String;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("a string or number")
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<String, E> {
            Ok(v)
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<String, E> {
            Ok(v.to_string())
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<String, E> {
            Ok(v.to_string())
        }
    }

    deserializer.deserialize_any(TextVisitor)
}

/// Accept a level written as an integer, a float with no fraction, or text
fn level_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<i64, D::Error> {
    struct LevelVisitor;

    impl<'de> Visitor<'de> for LevelVisitor {
        type Value = i64;

        fn expecting(&self, f: &mut fmt::Formatter) -> fmt::Result {
            f.write_str("an integer level")
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<i64, E> {
            Ok(v)
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<i64, E> {
            i64::try_from(v).map_err(|_| E::custom(format!("level out of range: {}", v)))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<i64, E> {
            if v.fract() == 0.0 {
                Ok(v as i64)
            } else {
                Err(E::custom(format!("level is not an integer: {}", v)))
            }
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<i64, E> {
            crate::normalize::parse_level(v)
                .ok_or_else(|| E::custom(format!("level is not an integer: {:?}", v)))
        }
    }

    deserializer.deserialize_any(LevelVisitor)
}

/// Accept a date in any supported text layout; unreadable dates become `None`
fn date_cell<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Option<NaiveDate>, D::Error> {
    let raw: Option<String> = Option::deserialize(deserializer)?;
    Ok(raw.as_deref().and_then(parse_date))
}
