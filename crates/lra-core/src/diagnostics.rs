//! Data-quality record attached to every report

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{CoreError, ErrorDetails, ReportWarning};
use crate::index::{IndexStats, LeafPostings};
use crate::tree::MalformedAccount;

/// Disagreement between independently computed category subtotals
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubtotalMismatch {
    pub category: String,
    pub prefix: String,
    /// Sum of leaf balances
    pub leaf_total: Decimal,
    /// Sum of the balances of the category's top nodes
    pub tree_total: Decimal,
    /// Signed total straight from the ledger index
    pub ledger_total: Decimal,
}

impl SubtotalMismatch {
    pub fn to_error(&self) -> CoreError {
        CoreError::InconsistentSubtotal {
            category: self.category.clone(),
            leaf_total: self.leaf_total,
            tree_total: self.tree_total,
            ledger_total: self.ledger_total,
        }
    }
}

/// Every recoverable issue met while building a report
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Diagnostics {
    pub ledger_rows: usize,
    pub indexed_rows: usize,
    pub closing_entries_excluded: usize,
    pub out_of_period_entries: usize,
    pub filtered_unit_entries: usize,
    /// Ledger rows with at least one unreadable amount
    pub non_numeric_rows: usize,
    /// Unreadable amount cells; a row can hold two
    pub non_numeric_amounts: usize,
    pub unmatched_entries: usize,
    pub below_leaf_nodes: usize,
    /// `NonNumericAmount` samples followed by per-code `UnmatchedLedgerEntry`
    /// samples, each capped at the configured sample size
    pub warnings: Vec<ReportWarning>,
    pub malformed_accounts: Vec<MalformedAccount>,
    pub inconsistent_subtotals: Vec<SubtotalMismatch>,
}

impl Diagnostics {
    pub fn collect(
        stats: IndexStats,
        postings: &LeafPostings,
        malformed: Vec<MalformedAccount>,
        below_leaf: usize,
        max_samples: usize,
    ) -> Self {
        let mut warnings = stats.non_numeric_samples;
        warnings.extend(
            postings
                .unmatched_codes
                .iter()
                .take(max_samples)
                .map(|(code, entries)| ReportWarning::UnmatchedLedgerEntry {
                    code: code.clone(),
                    entries: *entries,
                }),
        );

        Self {
            ledger_rows: stats.total_rows,
            indexed_rows: stats.indexed_rows,
            closing_entries_excluded: stats.closing_entries_excluded,
            out_of_period_entries: stats.out_of_period_entries,
            filtered_unit_entries: stats.filtered_unit_entries,
            non_numeric_rows: stats.non_numeric_rows,
            non_numeric_amounts: stats.non_numeric_amounts,
            unmatched_entries: postings.unmatched_entries,
            below_leaf_nodes: below_leaf,
            warnings,
            malformed_accounts: malformed,
            inconsistent_subtotals: Vec::new(),
        }
    }

    pub fn has_inconsistencies(&self) -> bool {
        !self.inconsistent_subtotals.is_empty()
    }

    /// Whether anything was left out or disagrees
    pub fn is_clean(&self) -> bool {
        self.non_numeric_amounts == 0
            && self.unmatched_entries == 0
            && self.malformed_accounts.is_empty()
            && self.inconsistent_subtotals.is_empty()
    }

    /// Every issue as error details, most severe first
    pub fn issues(&self) -> Vec<ErrorDetails> {
        let mut issues: Vec<ErrorDetails> = self
            .inconsistent_subtotals
            .iter()
            .map(|m| m.to_error().to_details())
            .collect();
        issues.extend(self.malformed_accounts.iter().map(|m| m.to_error().to_details()));
        issues.extend(self.warnings.iter().map(ReportWarning::to_details));
        issues
    }

    /// One-line summary for logs and the CLI
    pub fn summary(&self) -> String {
        format!(
            "{} of {} ledger rows used; {} closing, {} out of period, {} other units, \
             {} unmatched, {} rows with non-numeric amounts, {} malformed accounts, {} inconsistent subtotals",
            self.indexed_rows.saturating_sub(self.unmatched_entries),
            self.ledger_rows,
            self.closing_entries_excluded,
            self.out_of_period_entries,
            self.filtered_unit_entries,
            self.unmatched_entries,
            self.non_numeric_rows,
            self.malformed_accounts.len(),
            self.inconsistent_subtotals.len()
        )
    }
}
