//! Filtered ledger listing with debit/credit totals and the closing saldo

use chrono::NaiveDate;
use lra_parser::{is_within, normalize_code, parse_amount, AmountValue, ChartRow, LedgerRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::error::{CoreError, CoreResult};
use crate::index::unit_matches;
use crate::period::ReportPeriod;
use crate::types::{add_amount, NormalBalance};

/// Label of the closing balance line
pub const SALDO_LABEL: &str = "Saldo";

/// Which unit column a listing filters and shows
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum UnitField {
    /// `nm_unit`
    #[default]
    Unit,
    /// `nm_sub_unit`
    SubUnit,
}

impl UnitField {
    fn value<'a>(&self, row: &'a LedgerRow) -> Option<&'a str> {
        match self {
            UnitField::Unit => row.unit.as_deref(),
            UnitField::SubUnit => row.sub_unit.as_deref(),
        }
    }
}

impl std::str::FromStr for UnitField {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "unit" | "nm_unit" => Ok(UnitField::Unit),
            "sub_unit" | "subunit" | "nm_sub_unit" => Ok(UnitField::SubUnit),
            _ => Err(format!("Invalid unit field: {}", s)),
        }
    }
}

impl std::fmt::Display for UnitField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            UnitField::Unit => write!(f, "unit"),
            UnitField::SubUnit => write!(f, "sub_unit"),
        }
    }
}

/// Selection for a ledger listing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct LedgerFilter {
    /// Account level shown in the listing; `None` shows the full posting code
    #[serde(default)]
    pub level: Option<u32>,
    /// Account codes to keep, each at `level` when one is given; empty keeps all
    #[serde(default)]
    pub accounts: Vec<String>,
    #[serde(default)]
    pub unit_field: UnitField,
    /// Units (or sub-units) to keep; empty keeps all
    #[serde(default)]
    pub units: Vec<String>,
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub offset: usize,
    /// Page size; totals always cover every matching posting
    #[serde(default)]
    pub limit: Option<usize>,
}

impl LedgerFilter {
    /// Check the period and that every selected account sits at the chosen level
    pub fn validate(&self) -> CoreResult<()> {
        self.period.validate()?;
        let Some(level) = self.level else {
            return Ok(());
        };
        if level == 0 {
            return Err(CoreError::InvalidRequest {
                message: "level must be at least 1".to_string(),
            });
        }
        if let Some(code) = self
            .accounts
            .iter()
            .map(|a| normalize_code(a))
            .find(|code| code.split('.').count() != level as usize)
        {
            return Err(CoreError::InvalidRequest {
                message: format!("account {:?} is not a level {} code", code, level),
            });
        }
        Ok(())
    }

    fn keeps(&self, code: &str, row: &LedgerRow) -> bool {
        let account_ok = self.accounts.is_empty()
            || self.accounts.iter().any(|a| is_within(code, &normalize_code(a)));
        account_ok && self.period.contains(row.date) && unit_matches(&self.units, self.unit_field.value(row))
    }
}

/// One posting in a listing
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerLine {
    /// 1-based position in the ledger table
    pub row: usize,
    pub voucher: Option<String>,
    pub date: Option<NaiveDate>,
    /// Value of the selected unit column
    pub unit: Option<String>,
    /// Posting code cut to the selected level
    pub account: Option<String>,
    pub account_name: Option<String>,
    pub debit: Decimal,
    pub credit: Decimal,
    pub description: Option<String>,
}

/// Closing balance of a listing, shown on the side it falls on
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BalanceRow {
    pub side: NormalBalance,
    pub debit: Decimal,
    pub credit: Decimal,
}

impl BalanceRow {
    /// Debit side when debits exceed credits, credit side otherwise
    pub fn from_totals(total_debit: Decimal, total_credit: Decimal) -> CoreResult<Self> {
        let net = NormalBalance::Debit
            .balance(total_debit, total_credit)
            .ok_or_else(|| CoreError::AmountOverflow {
                account: SALDO_LABEL.to_string(),
            })?;
        Ok(if net > Decimal::ZERO {
            BalanceRow {
                side: NormalBalance::Debit,
                debit: net,
                credit: Decimal::ZERO,
            }
        } else {
            BalanceRow {
                side: NormalBalance::Credit,
                debit: Decimal::ZERO,
                credit: net.abs(),
            }
        })
    }
}

/// Filtered ledger postings and their totals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LedgerView {
    pub filter: LedgerFilter,
    pub period_description: String,
    /// Requested page of matching postings
    pub lines: Vec<LedgerLine>,
    /// Matching postings before paging
    pub total_count: usize,
    pub total_debit: Decimal,
    pub total_credit: Decimal,
    pub balance: BalanceRow,
    /// Matching rows with an unreadable amount, read as zero
    pub non_numeric_rows: usize,
}

/// Code cut to its first `level` segments; `None` when the code is shallower
fn code_at_level(code: &str, level: u32) -> Option<String> {
    let segments: Vec<&str> = code.split('.').collect();
    if segments.len() < level as usize {
        None
    } else {
        Some(segments[..level as usize].join("."))
    }
}

/// List the ledger postings a filter selects
pub fn filter_ledger(chart: &[ChartRow], ledger: &[LedgerRow], filter: &LedgerFilter) -> CoreResult<LedgerView> {
    filter.validate()?;

    let names: HashMap<String, &str> = chart
        .iter()
        .map(|row| (normalize_code(&row.code), row.name.trim()))
        .collect();

    let mut lines = Vec::new();
    let mut total_count = 0usize;
    let mut total_debit = Decimal::ZERO;
    let mut total_credit = Decimal::ZERO;
    let mut non_numeric_rows = 0usize;
    let page_end = filter.limit.map(|limit| filter.offset.saturating_add(limit));

    for (row_number, row) in ledger.iter().enumerate() {
        let code = normalize_code(&row.account_code);
        if !filter.keeps(&code, row) {
            continue;
        }

        let debit = parse_amount(&row.debit);
        let credit = parse_amount(&row.credit);
        if debit == AmountValue::Invalid || credit == AmountValue::Invalid {
            non_numeric_rows += 1;
        }
        let (debit, credit) = (debit.or_zero(), credit.or_zero());
        total_debit = add_amount(total_debit, debit, SALDO_LABEL)?;
        total_credit = add_amount(total_credit, credit, SALDO_LABEL)?;

        let in_page = total_count >= filter.offset && page_end.map_or(true, |end| total_count < end);
        total_count += 1;
        if !in_page {
            continue;
        }

        let account = match filter.level {
            Some(level) => code_at_level(&code, level),
            None => Some(code),
        };
        lines.push(LedgerLine {
            row: row_number + 1,
            voucher: row.voucher.clone(),
            date: row.date,
            unit: filter.unit_field.value(row).map(|u| u.trim().to_string()),
            account_name: account.as_deref().and_then(|a| names.get(a)).map(|n| n.to_string()),
            account,
            debit,
            credit,
            description: row.description.clone(),
        });
    }

    let balance = BalanceRow::from_totals(total_debit, total_credit)?;
    log::info!(
        target: "lra::core",
        "Ledger listing for {}: {} matching postings, saldo {} {}",
        filter.period.description(),
        total_count,
        balance.side,
        balance.debit.max(balance.credit)
    );

    Ok(LedgerView {
        filter: filter.clone(),
        period_description: filter.period.description(),
        lines,
        total_count,
        total_debit,
        total_credit,
        balance,
        non_numeric_rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    fn chart() -> Vec<ChartRow> {
        vec![
            ChartRow::new("5", "Belanja", 1),
            ChartRow::new("5.1", "Belanja Operasi", 2),
            ChartRow::new("5.1.1", "Belanja Pegawai", 3),
            ChartRow::new("5.1.2", "Belanja Barang", 3),
            ChartRow::new("4", "Pendapatan", 1),
            ChartRow::new("4.1", "Pendapatan Asli", 2),
        ]
    }

    fn ledger() -> Vec<LedgerRow> {
        let date = |m| NaiveDate::from_ymd_opt(2024, m, 5).unwrap();
        vec![
            LedgerRow::new("5.1.1.01", dec!(300), dec!(0), "Jurnal Umum")
                .with_date(date(1))
                .with_unit("Dinas Kesehatan")
                .with_sub_unit("Puskesmas A")
                .with_voucher("BKU-001", "Gaji Januari"),
            LedgerRow::new("5.1.2.01", dec!(120), dec!(20), "Jurnal Umum")
                .with_date(date(2))
                .with_unit("Dinas Kesehatan")
                .with_sub_unit("Puskesmas B"),
            LedgerRow::new("4.1.1.01", dec!(0), dec!(900), "Jurnal Umum")
                .with_date(date(2))
                .with_unit("Dinas Pendidikan"),
            LedgerRow::new("5.1.1.01", dec!(50), dec!(0), "Jurnal Umum")
                .with_date(date(7))
                .with_unit("Dinas Pendidikan"),
        ]
    }

    #[test]
    fn test_debit_side_saldo() {
        let filter = LedgerFilter {
            level: Some(2),
            accounts: vec!["5.1".to_string()],
            ..LedgerFilter::default()
        };
        let view = filter_ledger(&chart(), &ledger(), &filter).unwrap();
        assert_eq!(view.total_count, 3);
        assert_eq!(view.total_debit, dec!(470));
        assert_eq!(view.total_credit, dec!(20));
        assert_eq!(
            view.balance,
            BalanceRow { side: NormalBalance::Debit, debit: dec!(450), credit: dec!(0) }
        );
        assert_eq!(view.lines[0].account.as_deref(), Some("5.1"));
        assert_eq!(view.lines[0].account_name.as_deref(), Some("Belanja Operasi"));
        assert_eq!(view.lines[0].voucher.as_deref(), Some("BKU-001"));
    }

    #[test]
    fn test_credit_side_saldo() {
        let filter = LedgerFilter {
            accounts: vec!["4".to_string()],
            ..LedgerFilter::default()
        };
        let view = filter_ledger(&chart(), &ledger(), &filter).unwrap();
        assert_eq!(view.balance.side, NormalBalance::Credit);
        assert_eq!(view.balance.credit, dec!(900));
        assert_eq!(view.balance.debit, dec!(0));
        assert_eq!(view.lines[0].account.as_deref(), Some("4.1.1.01"));
        assert_eq!(view.lines[0].account_name, None);
    }

    #[test]
    fn test_even_totals_fall_on_the_credit_side() {
        let balance = BalanceRow::from_totals(dec!(75), dec!(75)).unwrap();
        assert_eq!(balance.side, NormalBalance::Credit);
        assert_eq!(balance.credit, dec!(0));
    }

    #[test]
    fn test_sub_unit_and_month_filters() {
        let filter = LedgerFilter {
            unit_field: UnitField::SubUnit,
            units: vec!["puskesmas b".to_string()],
            period: ReportPeriod::Months { year: 2024, from: 1, to: 3 },
            ..LedgerFilter::default()
        };
        let view = filter_ledger(&chart(), &ledger(), &filter).unwrap();
        assert_eq!(view.total_count, 1);
        assert_eq!(view.lines[0].row, 2);
        assert_eq!(view.lines[0].unit.as_deref(), Some("Puskesmas B"));

        let filter = LedgerFilter {
            units: vec!["Dinas Pendidikan".to_string()],
            period: ReportPeriod::Months { year: 2024, from: 6, to: 12 },
            ..LedgerFilter::default()
        };
        let view = filter_ledger(&chart(), &ledger(), &filter).unwrap();
        assert_eq!(view.total_count, 1);
        assert_eq!(view.total_debit, dec!(50));
    }

    #[test]
    fn test_paging_keeps_full_totals() {
        let filter = LedgerFilter {
            offset: 1,
            limit: Some(2),
            ..LedgerFilter::default()
        };
        let view = filter_ledger(&chart(), &ledger(), &filter).unwrap();
        assert_eq!(view.total_count, 4);
        assert_eq!(view.lines.len(), 2);
        assert_eq!(view.lines[0].row, 2);
        assert_eq!(view.lines[1].row, 3);
        assert_eq!(view.total_debit, dec!(470));
        assert_eq!(view.total_credit, dec!(920));
        assert_eq!(view.balance.side, NormalBalance::Credit);
        assert_eq!(view.balance.credit, dec!(450));
    }

    #[test]
    fn test_account_must_match_level() {
        let filter = LedgerFilter {
            level: Some(3),
            accounts: vec!["5.1".to_string()],
            ..LedgerFilter::default()
        };
        let err = filter_ledger(&chart(), &ledger(), &filter).unwrap_err();
        assert!(matches!(err, CoreError::InvalidRequest { .. }));

        let filter = LedgerFilter { level: Some(0), ..LedgerFilter::default() };
        assert!(filter_ledger(&chart(), &ledger(), &filter).is_err());
    }

    #[test]
    fn test_non_numeric_rows_are_counted() {
        let ledger = vec![
            LedgerRow::new("5.1.1", "abc", "x", "Jurnal Umum"),
            LedgerRow::new("5.1.1", "10", "", "Jurnal Umum"),
        ];
        let view = filter_ledger(&chart(), &ledger, &LedgerFilter::default()).unwrap();
        assert_eq!(view.non_numeric_rows, 1);
        assert_eq!(view.total_debit, dec!(10));
    }

    #[test]
    fn test_filter_from_json() {
        let filter: LedgerFilter =
            serde_json::from_str(r#"{"level": 2, "accounts": ["5.1"], "unit_field": "sub_unit"}"#).unwrap();
        assert_eq!(filter.level, Some(2));
        assert_eq!(filter.unit_field, UnitField::SubUnit);
        assert_eq!(filter.period, ReportPeriod::All);
        assert_eq!("nm_sub_unit".parse::<UnitField>().unwrap(), UnitField::SubUnit);
    }
}
