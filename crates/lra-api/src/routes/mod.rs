//! Route modules for the API server
//!
//! - reports: LRA report, plain and rendered
//! - accounts: chart of accounts filter
//! - ledger: filtered ledger listing

pub mod accounts;
pub mod ledger;
pub mod reports;

/// Comma-separated query value as a list, blanks dropped
pub(crate) fn split_list(value: Option<&str>) -> Vec<String> {
    value
        .map(|v| {
            v.split(',')
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(String::from)
                .collect()
        })
        .unwrap_or_default()
}
