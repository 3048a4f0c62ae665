//! Report structures returned by the builder and the API

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::diagnostics::Diagnostics;
use crate::period::ReportPeriod;
use crate::tree::AccountNode;
use crate::types::AccountClass;

/// Kind of a report row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RowKind {
    /// One chart account
    Detail,
    /// Category total with summed debit and credit
    Subtotal,
    /// Derived figure
    Summary,
}

/// Fixed lines of the report that are not chart accounts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SummaryLine {
    RevenueTotal,
    ExpenditureTotal,
    SurplusDeficit,
    FinancingInflowTotal,
    FinancingOutflowTotal,
    NetFinancing,
    Residual,
}

impl SummaryLine {
    pub fn label(&self) -> &'static str {
        match self {
            SummaryLine::RevenueTotal => "Jumlah Pendapatan",
            SummaryLine::ExpenditureTotal => "Jumlah Belanja",
            SummaryLine::SurplusDeficit => "Surplus/(Defisit)",
            SummaryLine::FinancingInflowTotal => "Jumlah Penerimaan Pembiayaan",
            SummaryLine::FinancingOutflowTotal => "Jumlah Pengeluaran Pembiayaan",
            SummaryLine::NetFinancing => "Pembiayaan Netto",
            SummaryLine::Residual => "Sisa Pembiayaan Anggaran",
        }
    }
}

/// Label of the final residual
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ResidualLabel {
    /// Sisa Lebih Pembiayaan Anggaran, residual >= 0
    Silpa,
    /// Sisa Kurang Pembiayaan Anggaran, residual < 0
    Sikpa,
}

impl ResidualLabel {
    pub fn for_amount(residual: Decimal) -> Self {
        if residual.is_sign_negative() && !residual.is_zero() {
            ResidualLabel::Sikpa
        } else {
            ResidualLabel::Silpa
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            ResidualLabel::Silpa => "Sisa Lebih Pembiayaan Anggaran",
            ResidualLabel::Sikpa => "Sisa Kurang Pembiayaan Anggaran",
        }
    }
}

impl std::fmt::Display for ResidualLabel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ResidualLabel::Silpa => write!(f, "SILPA"),
            ResidualLabel::Sikpa => write!(f, "SIKPA"),
        }
    }
}

/// One line of the report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReportRow {
    pub kind: RowKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub line: Option<SummaryLine>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    pub label: String,
    /// Chart level; 0 for subtotal and summary rows
    pub level: u32,
    pub is_leaf: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub debit_total: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub credit_total: Option<Decimal>,
    pub balance: Decimal,
}

impl ReportRow {
    pub fn detail(node: &AccountNode, debit: Decimal, credit: Decimal, balance: Decimal) -> Self {
        Self {
            kind: RowKind::Detail,
            line: None,
            code: Some(node.code.clone()),
            label: node.name.clone(),
            level: node.level,
            is_leaf: node.is_leaf,
            debit_total: Some(debit),
            credit_total: Some(credit),
            balance,
        }
    }

    pub fn subtotal(line: SummaryLine, debit: Decimal, credit: Decimal, balance: Decimal) -> Self {
        Self {
            kind: RowKind::Subtotal,
            line: Some(line),
            code: None,
            label: line.label().to_string(),
            level: 0,
            is_leaf: false,
            debit_total: Some(debit),
            credit_total: Some(credit),
            balance,
        }
    }

    pub fn summary(line: SummaryLine, label: String, balance: Decimal) -> Self {
        Self {
            kind: RowKind::Summary,
            line: Some(line),
            code: None,
            label,
            level: 0,
            is_leaf: false,
            debit_total: None,
            credit_total: None,
            balance,
        }
    }
}

/// Headline figures of the report
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ReportTotals {
    pub revenue: Decimal,
    pub expenditure: Decimal,
    pub surplus_deficit: Decimal,
    pub financing_inflow: Decimal,
    pub financing_outflow: Decimal,
    pub net_financing: Decimal,
    pub residual: Decimal,
    pub residual_label: ResidualLabel,
}

/// Finished budget realization report
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LraReport {
    pub period: ReportPeriod,
    pub period_description: String,
    #[serde(default)]
    pub units: Vec<String>,
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
    pub diagnostics: Diagnostics,
}

impl LraReport {
    /// Row of a chart account
    pub fn row(&self, code: &str) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.code.as_deref() == Some(code))
    }

    /// Row of a fixed line
    pub fn line(&self, line: SummaryLine) -> Option<&ReportRow> {
        self.rows.iter().find(|r| r.line == Some(line))
    }
}

/// Chart accounts listed by the account filter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AccountsResponse {
    /// Code the accounts were listed under; class roots joined by commas
    pub parent: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class: Option<AccountClass>,
    pub level: u32,
    pub accounts: Vec<AccountNode>,
    pub total_count: usize,
}
