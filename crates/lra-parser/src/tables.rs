//! CSV and JSON table readers
//!
//! Header names follow either the English field names or the column names of
//! the regional finance exports (`Kode Akun`, `kd_lv_6`, `debet`, ...).

use csv::{ReaderBuilder, StringRecord, Trim};
use serde::Deserialize;
use std::io::Read;

use crate::error::ParseError;
use crate::normalize::{parse_date, parse_level};
use crate::records::{AmountCell, ChartRow, LedgerRow};

const CHART_TABLE: &str = "chart of accounts";
const LEDGER_TABLE: &str = "ledger";

/// Required chart columns and their accepted header names
const CHART_COLUMNS: &[(&str, &[&str])] = &[
    ("code", &["code", "Kode Akun"]),
    ("name", &["name", "Nama Akun"]),
    ("level", &["level", "Level"]),
];

/// Required ledger columns and their accepted header names
const LEDGER_COLUMNS: &[(&str, &[&str])] = &[
    ("account_code", &["account_code", "kd_lv_6", "kd_lv6"]),
    ("debit", &["debit", "debet"]),
    ("credit", &["credit", "kredit"]),
    ("transaction_type", &["transaction_type", "jns_transaksi"]),
];

#[derive(Debug, Deserialize)]
struct CsvChartRecord {
    #[serde(alias = "Kode Akun")]
    code: String,
    #[serde(alias = "Nama Akun", default)]
    name: String,
    #[serde(alias = "Level")]
    level: String,
}

#[derive(Debug, Deserialize)]
struct CsvLedgerRecord {
    #[serde(alias = "kd_lv_6", alias = "kd_lv6")]
    account_code: String,
    #[serde(alias = "debet", default)]
    debit: String,
    #[serde(alias = "kredit", default)]
    credit: String,
    #[serde(alias = "jns_transaksi", default)]
    transaction_type: String,
    #[serde(alias = "tgl_transaksi", default)]
    date: String,
    #[serde(alias = "nm_unit", default)]
    unit: String,
    #[serde(alias = "nm_sub_unit", default)]
    sub_unit: String,
    #[serde(alias = "no_bukti", default)]
    voucher: String,
    #[serde(alias = "uraian", default)]
    description: String,
}

/// Trimmed text, `None` when blank
fn optional(cell: &str) -> Option<String> {
    let trimmed = cell.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}

fn require_columns(
    table: &str,
    headers: &StringRecord,
    required: &[(&str, &[&str])],
) -> Result<(), ParseError> {
    let missing: Vec<String> = required
        .iter()
        .filter(|(_, accepted)| !headers.iter().any(|h| accepted.contains(&h)))
        .map(|(name, accepted)| format!("{} ({})", name, accepted.join(" / ")))
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(ParseError::MissingColumns {
            table: table.to_string(),
            columns: missing,
        })
    }
}

fn line_of(record: &StringRecord) -> u64 {
    record.position().map(|p| p.line()).unwrap_or(0)
}

/// Read a chart of accounts from CSV
pub fn read_chart_csv<R: Read>(reader: R) -> Result<Vec<ChartRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    require_columns(CHART_TABLE, &headers, CHART_COLUMNS)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let raw: CsvChartRecord = record.deserialize(Some(&headers))?;
        let level = parse_level(&raw.level).ok_or_else(|| ParseError::InvalidValue {
            table: CHART_TABLE.to_string(),
            line: line_of(&record),
            column: "level".to_string(),
            value: raw.level.clone(),
        })?;
        rows.push(ChartRow {
            code: raw.code,
            name: raw.name,
            level,
        });
    }

    log::debug!(target: "lra::parser", "Read {} chart rows from CSV", rows.len());
    Ok(rows)
}

/// Read a general ledger from CSV
///
/// Amount cells stay raw text so unreadable values can be counted when the
/// ledger is indexed.
pub fn read_ledger_csv<R: Read>(reader: R) -> Result<Vec<LedgerRow>, ParseError> {
    let mut rdr = ReaderBuilder::new()
        .flexible(true)
        .trim(Trim::Headers)
        .from_reader(reader);
    let headers = rdr.headers()?.clone();
    require_columns(LEDGER_TABLE, &headers, LEDGER_COLUMNS)?;

    let mut rows = Vec::new();
    for result in rdr.records() {
        let record = result?;
        let raw: CsvLedgerRecord = record.deserialize(Some(&headers))?;
        rows.push(LedgerRow {
            account_code: raw.account_code,
            debit: AmountCell::from(raw.debit.as_str()),
            credit: AmountCell::from(raw.credit.as_str()),
            transaction_type: raw.transaction_type,
            date: parse_date(&raw.date),
            unit: optional(&raw.unit),
            sub_unit: optional(&raw.sub_unit),
            voucher: optional(&raw.voucher),
            description: optional(&raw.description),
        });
    }

    log::debug!(target: "lra::parser", "Read {} ledger rows from CSV", rows.len());
    Ok(rows)
}

/// Read a chart of accounts from a JSON array
pub fn read_chart_json(content: &[u8]) -> Result<Vec<ChartRow>, ParseError> {
    Ok(serde_json::from_slice(content)?)
}

/// Read a general ledger from a JSON array
pub fn read_ledger_json(content: &[u8]) -> Result<Vec<LedgerRow>, ParseError> {
    Ok(serde_json::from_slice(content)?)
}
