//! Report assembly: ordered rows, subtotals and summary lines

use rust_decimal::Decimal;

use crate::balance::Balances;
use crate::diagnostics::SubtotalMismatch;
use crate::error::{CoreError, CoreResult, DefaultErrorLogger, ErrorContext, ErrorLogger};
use crate::index::LedgerIndex;
use crate::reports::{ReportRow, ReportTotals, ResidualLabel, SummaryLine};
use crate::tree::AccountTree;
use crate::types::{add_amount, Category};

const REVENUE: &str = "4";
const EXPENDITURE: &str = "5";
const FINANCING: &str = "6";
const FINANCING_INFLOW: &str = "6.1";
const FINANCING_OUTFLOW: &str = "6.2";

/// Rows, headline figures and the subtotal cross-check results
#[derive(Debug, Clone)]
pub struct Assembly {
    pub rows: Vec<ReportRow>,
    pub totals: ReportTotals,
    pub mismatches: Vec<SubtotalMismatch>,
}

struct Assembler<'a> {
    tree: &'a AccountTree,
    balances: &'a Balances,
    index: &'a LedgerIndex,
    tolerance: Decimal,
    logger: DefaultErrorLogger,
    rows: Vec<ReportRow>,
    mismatches: Vec<SubtotalMismatch>,
}

/// Walk the categories in report order and derive the summary lines
pub fn assemble(
    tree: &AccountTree,
    balances: &Balances,
    index: &LedgerIndex,
    tolerance: Decimal,
) -> CoreResult<Assembly> {
    let mut assembler = Assembler {
        tree,
        balances,
        index,
        tolerance,
        logger: DefaultErrorLogger,
        rows: Vec::new(),
        mismatches: Vec::new(),
    };

    assembler.section(REVENUE);
    let revenue = assembler.subtotal(REVENUE, SummaryLine::RevenueTotal)?;

    assembler.section(EXPENDITURE);
    let expenditure = assembler.subtotal(EXPENDITURE, SummaryLine::ExpenditureTotal)?;

    let surplus_deficit = difference(revenue, expenditure, SummaryLine::SurplusDeficit)?;
    assembler.summary(SummaryLine::SurplusDeficit, SummaryLine::SurplusDeficit.label().to_string(), surplus_deficit);

    assembler.section(FINANCING);
    let financing_inflow = assembler.subtotal(FINANCING_INFLOW, SummaryLine::FinancingInflowTotal)?;
    let financing_outflow = assembler.subtotal(FINANCING_OUTFLOW, SummaryLine::FinancingOutflowTotal)?;

    let net_financing = difference(financing_inflow, financing_outflow, SummaryLine::NetFinancing)?;
    assembler.summary(SummaryLine::NetFinancing, SummaryLine::NetFinancing.label().to_string(), net_financing);

    let residual = add_amount(surplus_deficit, net_financing, SummaryLine::Residual.label())?;
    let residual_label = ResidualLabel::for_amount(residual);
    assembler.summary(SummaryLine::Residual, residual_label.to_string(), residual);

    Ok(Assembly {
        rows: assembler.rows,
        totals: ReportTotals {
            revenue,
            expenditure,
            surplus_deficit,
            financing_inflow,
            financing_outflow,
            net_financing,
            residual,
            residual_label,
        },
        mismatches: assembler.mismatches,
    })
}

fn difference(left: Decimal, right: Decimal, line: SummaryLine) -> CoreResult<Decimal> {
    left.checked_sub(right).ok_or_else(|| CoreError::AmountOverflow {
        account: line.label().to_string(),
    })
}

impl Assembler<'_> {
    /// Detail rows of a category, depth-first down to the leaves
    fn section(&mut self, prefix: &str) {
        for top in self.tree.tops_within(prefix) {
            for id in self.tree.walk(top) {
                let value = self.balances.get(id);
                self.rows.push(ReportRow::detail(self.tree.node(id), value.debit, value.credit, value.balance));
            }
        }
    }

    /// Category subtotal from the leaves, cross-checked against the tree and the ledger
    fn subtotal(&mut self, prefix: &str, line: SummaryLine) -> CoreResult<Decimal> {
        let leaves = self.balances.sum(&self.tree.leaves_within(prefix), prefix)?;
        let tree_total = self.balances.sum(&self.tree.tops_within(prefix), prefix)?.balance;
        let category = Category::from_code(prefix);
        let posted = self.index.total_within(prefix)?;
        let ledger_total = category.checked_balance(posted.debit, posted.credit, prefix)?;

        let off_tree = difference(leaves.balance, tree_total, line)?.abs();
        let off_ledger = difference(leaves.balance, ledger_total, line)?.abs();
        if off_tree > self.tolerance || off_ledger > self.tolerance {
            let mismatch = SubtotalMismatch {
                category: category.to_string(),
                prefix: prefix.to_string(),
                leaf_total: leaves.balance,
                tree_total,
                ledger_total,
            };
            let context = ErrorContext::new("assemble_report")
                .with_data("prefix", serde_json::json!(prefix))
                .with_data("line", serde_json::json!(line.label()));
            self.logger.log_error(&mismatch.to_error(), &context);
            self.mismatches.push(mismatch);
        }

        self.rows.push(ReportRow::subtotal(line, leaves.debit, leaves.credit, leaves.balance));
        Ok(leaves.balance)
    }

    fn summary(&mut self, line: SummaryLine, label: String, amount: Decimal) {
        self.rows.push(ReportRow::summary(line, label, amount));
    }
}
