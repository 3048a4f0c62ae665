//! Ledger index: posting sums grouped by normalized account code

use lra_config::LedgerMatch;
use lra_parser::{is_within, normalize_code, parse_amount, AmountCell, AmountValue, LedgerRow};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};

use crate::error::{CoreResult, ReportWarning};
use crate::period::ReportPeriod;
use crate::tree::AccountTree;
use crate::types::add_amount;

/// Debit and credit sums of a group of postings
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PostingSums {
    pub debit: Decimal,
    pub credit: Decimal,
    pub entries: usize,
}

impl PostingSums {
    fn post(&mut self, debit: Decimal, credit: Decimal, entries: usize, account: &str) -> CoreResult<()> {
        self.debit = add_amount(self.debit, debit, account)?;
        self.credit = add_amount(self.credit, credit, account)?;
        self.entries += entries;
        Ok(())
    }

    fn add(&mut self, other: &PostingSums, account: &str) -> CoreResult<()> {
        self.post(other.debit, other.credit, other.entries, account)
    }
}

/// Which postings take part in a report
#[derive(Debug, Clone)]
pub struct IndexFilter<'a> {
    /// Transaction type of closing entries
    pub closing_tag: &'a str,
    pub period: &'a ReportPeriod,
    /// Units to keep; empty keeps every unit
    pub units: &'a [String],
}

impl IndexFilter<'_> {
    fn keeps_unit(&self, unit: Option<&str>) -> bool {
        unit_matches(self.units, unit)
    }
}

/// Whether a posting's unit is among `units`; an empty list keeps every posting
pub(crate) fn unit_matches(units: &[String], unit: Option<&str>) -> bool {
    if units.is_empty() {
        return true;
    }
    match unit {
        Some(unit) => {
            let unit = unit.trim();
            units.iter().any(|u| u.trim().eq_ignore_ascii_case(unit))
        }
        None => false,
    }
}

/// Counts collected while indexing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct IndexStats {
    pub total_rows: usize,
    pub indexed_rows: usize,
    pub closing_entries_excluded: usize,
    pub out_of_period_entries: usize,
    pub filtered_unit_entries: usize,
    /// Rows with at least one unreadable amount cell
    pub non_numeric_rows: usize,
    /// Unreadable amount cells
    pub non_numeric_amounts: usize,
    pub non_numeric_samples: Vec<ReportWarning>,
}

/// Posting sums keyed by normalized account code, built once per report
#[derive(Debug, Clone, Default)]
pub struct LedgerIndex {
    by_code: HashMap<String, PostingSums>,
}

/// Postings resolved onto tree leaves
#[derive(Debug, Clone, Default)]
pub struct LeafPostings {
    /// Sums per node id; only leaves are ever non-zero
    pub per_node: Vec<PostingSums>,
    pub unmatched_entries: usize,
    pub unmatched_codes: BTreeMap<String, usize>,
}

impl LedgerIndex {
    /// Index ledger rows in one pass
    pub fn build(
        rows: &[LedgerRow],
        filter: &IndexFilter<'_>,
        max_samples: usize,
    ) -> CoreResult<(Self, IndexStats)> {
        let mut index = LedgerIndex::default();
        let mut stats = IndexStats {
            total_rows: rows.len(),
            ..IndexStats::default()
        };
        let closing_tag = filter.closing_tag.trim();

        for (row_number, row) in rows.iter().enumerate() {
            if row.transaction_type.trim() == closing_tag {
                stats.closing_entries_excluded += 1;
                continue;
            }
            if !filter.period.contains(row.date) {
                stats.out_of_period_entries += 1;
                continue;
            }
            if !filter.keeps_unit(row.unit.as_deref()) {
                stats.filtered_unit_entries += 1;
                continue;
            }

            let debit = coerce(&row.debit, row_number, "debit", &mut stats, max_samples);
            let credit = coerce(&row.credit, row_number, "credit", &mut stats, max_samples);
            if debit.is_none() || credit.is_none() {
                stats.non_numeric_rows += 1;
            }

            let code = normalize_code(&row.account_code);
            let sums = index.by_code.entry(code.clone()).or_default();
            sums.post(debit.unwrap_or_default(), credit.unwrap_or_default(), 1, &code)?;
            stats.indexed_rows += 1;
        }

        log::debug!(
            target: "lra::core",
            "Indexed {} of {} ledger rows under {} codes",
            stats.indexed_rows,
            stats.total_rows,
            index.by_code.len()
        );
        Ok((index, stats))
    }

    pub fn len(&self) -> usize {
        self.by_code.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_code.is_empty()
    }

    /// Sums posted under an exact code
    pub fn get(&self, code: &str) -> Option<&PostingSums> {
        self.by_code.get(code)
    }

    /// Sums of every indexed code within a prefix, matched or not
    pub fn total_within(&self, prefix: &str) -> CoreResult<PostingSums> {
        let mut total = PostingSums::default();
        for (code, sums) in &self.by_code {
            if is_within(code, prefix) {
                total.add(sums, prefix)?;
            }
        }
        Ok(total)
    }

    /// Bind every indexed code to at most one tree leaf
    pub fn resolve(&self, tree: &AccountTree, mode: LedgerMatch) -> CoreResult<LeafPostings> {
        let mut resolved = LeafPostings {
            per_node: vec![PostingSums::default(); tree.len()],
            ..LeafPostings::default()
        };

        for (code, sums) in &self.by_code {
            let leaf = match mode {
                LedgerMatch::Exact => tree.leaf_exact(code),
                LedgerMatch::Prefix => tree.leaf_by_prefix(code),
            };
            match leaf {
                Some(id) => resolved.per_node[id].add(sums, &tree.node(id).code)?,
                None => {
                    resolved.unmatched_entries += sums.entries;
                    resolved.unmatched_codes.insert(code.clone(), sums.entries);
                }
            }
        }

        if resolved.unmatched_entries > 0 {
            log::warn!(
                target: "lra::core",
                "{} ledger entries under {} codes match no chart leaf ({} matching)",
                resolved.unmatched_entries,
                resolved.unmatched_codes.len(),
                mode
            );
        }
        Ok(resolved)
    }
}

/// Read an amount cell; `None` when the cell is unreadable
fn coerce(
    cell: &AmountCell,
    row_number: usize,
    column: &str,
    stats: &mut IndexStats,
    max_samples: usize,
) -> Option<Decimal> {
    let value = parse_amount(cell);
    if value != AmountValue::Invalid {
        return Some(value.or_zero());
    }
    stats.non_numeric_amounts += 1;
    if stats.non_numeric_samples.len() < max_samples {
        stats.non_numeric_samples.push(ReportWarning::NonNumericAmount {
            row: row_number + 1,
            column: column.to_string(),
            value: cell.raw(),
        });
    }
    None
}
