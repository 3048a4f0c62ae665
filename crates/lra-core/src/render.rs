//! Presentation of a finished report

use lra_config::{CurrencyConfig, SymbolPosition};
use lra_utils::format_currency;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::ledger_view::{LedgerView, SALDO_LABEL};
use crate::reports::{LraReport, RowKind};

/// Report row with amounts formatted for display
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RenderedRow {
    pub kind: RowKind,
    pub code: String,
    /// Name indented by level
    pub label: String,
    pub debit: String,
    pub credit: String,
    pub balance: String,
}

fn money(value: Decimal, currency: &CurrencyConfig) -> String {
    format_currency(
        value,
        &currency.symbol,
        currency.symbol_position == SymbolPosition::Before,
        currency.decimal_places,
        &currency.thousands_separator,
        &currency.decimal_separator,
    )
}

/// Format every amount of a report
pub fn render(report: &LraReport, currency: &CurrencyConfig) -> Vec<RenderedRow> {
    report
        .rows
        .iter()
        .map(|row| {
            let indent = "  ".repeat(row.level.saturating_sub(1) as usize);
            RenderedRow {
                kind: row.kind,
                code: row.code.clone().unwrap_or_default(),
                label: format!("{}{}", indent, row.label),
                debit: row.debit_total.map(|v| money(v, currency)).unwrap_or_default(),
                credit: row.credit_total.map(|v| money(v, currency)).unwrap_or_default(),
                balance: money(row.balance, currency),
            }
        })
        .collect()
}

/// Plain-text table of rendered rows
pub fn render_table(rows: &[RenderedRow]) -> String {
    let headers = ["Kode", "Uraian", "Debet", "Kredit", "Realisasi"];
    let cells: Vec<[&str; 5]> = rows
        .iter()
        .map(|r| [r.code.as_str(), r.label.as_str(), r.debit.as_str(), r.credit.as_str(), r.balance.as_str()])
        .collect();
    let ruled: Vec<bool> = rows.iter().map(|r| r.kind != RowKind::Detail).collect();
    plain_table(&headers, &cells, 2, &ruled)
}

/// Plain-text table of a ledger listing, closed by the totals and saldo lines
pub fn render_ledger_table(view: &LedgerView, currency: &CurrencyConfig) -> String {
    let headers = ["Baris", "Bukti", "Tanggal", "Unit", "Akun", "Uraian", "Debet", "Kredit"];
    let mut owned: Vec<[String; 8]> = view
        .lines
        .iter()
        .map(|line| {
            [
                line.row.to_string(),
                line.voucher.clone().unwrap_or_default(),
                line.date.map(|d| d.to_string()).unwrap_or_default(),
                line.unit.clone().unwrap_or_default(),
                line.account.clone().unwrap_or_default(),
                line.description
                    .clone()
                    .or_else(|| line.account_name.clone())
                    .unwrap_or_default(),
                money(line.debit, currency),
                money(line.credit, currency),
            ]
        })
        .collect();
    let closing = |label: &str, debit: Decimal, credit: Decimal| -> [String; 8] {
        [
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            String::new(),
            label.to_string(),
            money(debit, currency),
            money(credit, currency),
        ]
    };
    owned.push(closing("Jumlah", view.total_debit, view.total_credit));
    owned.push(closing(SALDO_LABEL, view.balance.debit, view.balance.credit));

    let cells: Vec<[&str; 8]> = owned.iter().map(|row| row.each_ref().map(String::as_str)).collect();
    let mut ruled = vec![false; view.lines.len()];
    ruled.extend([true, false]);
    plain_table(&headers, &cells, 6, &ruled)
}

/// Columns from `right_from` on are right aligned; a rule precedes each row flagged in `ruled`
fn plain_table<const N: usize>(headers: &[&str; N], cells: &[[&str; N]], right_from: usize, ruled: &[bool]) -> String {
    let mut widths = (*headers).map(|h| h.chars().count());
    for row in cells {
        for (width, cell) in widths.iter_mut().zip(row.iter()) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let line = |row: &[&str; N]| -> String {
        let mut out = String::new();
        for (i, cell) in row.iter().enumerate() {
            let pad = widths[i] - cell.chars().count();
            if i >= right_from {
                out.push_str(&" ".repeat(pad));
                out.push_str(cell);
            } else {
                out.push_str(cell);
                out.push_str(&" ".repeat(pad));
            }
            if i < N - 1 {
                out.push_str(" | ");
            }
        }
        out.trim_end().to_string()
    };

    let mut table = String::new();
    table.push_str(&line(headers));
    table.push('\n');
    let total_width: usize = widths.iter().sum::<usize>() + 3 * (N - 1);
    table.push_str(&"-".repeat(total_width));
    table.push('\n');
    for (i, cell) in cells.iter().enumerate() {
        if ruled.get(i).copied().unwrap_or(false) {
            table.push_str(&"-".repeat(total_width));
            table.push('\n');
        }
        table.push_str(&line(cell));
        table.push('\n');
    }
    table
}
