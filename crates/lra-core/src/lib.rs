//! Budget realization report (LRA) builder
//!
//! Builds the account tree from the chart of accounts, indexes the general
//! ledger once, rolls balances up the tree in a single pass and assembles the
//! report rows with their subtotals and summary lines.

pub mod assembler;
pub mod balance;
pub mod diagnostics;
pub mod error;
pub mod index;
pub mod ledger_view;
pub mod period;
pub mod render;
pub mod reports;
pub mod tree;
pub mod types;

use lra_config::ReportConfig;
use lra_parser::{normalize_code, ChartRow, LedgerRow, TableSourceRef};
use serde::{Deserialize, Serialize};

pub use balance::{Balances, NodeBalance};
pub use diagnostics::{Diagnostics, SubtotalMismatch};
pub use error::{CoreError, CoreResult, ErrorCode, ErrorDetails, ErrorSeverity, ReportWarning};
pub use index::{IndexFilter, LedgerIndex};
pub use ledger_view::{filter_ledger, BalanceRow, LedgerFilter, LedgerLine, LedgerView, UnitField};
pub use period::ReportPeriod;
pub use render::{render, render_ledger_table, render_table, RenderedRow};
pub use reports::{AccountsResponse, LraReport, ReportRow, ReportTotals, ResidualLabel, RowKind, SummaryLine};
pub use tree::{AccountNode, AccountTree, MalformedAccount, MalformedReason, NodeId};
pub use types::{AccountClass, Category, NormalBalance};

use error::{DefaultErrorLogger, ErrorContext, ErrorLogger};

/// What a report is built for
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportRequest {
    #[serde(default)]
    pub period: ReportPeriod,
    /// Organizational units to include; empty includes all
    #[serde(default)]
    pub units: Vec<String>,
}

/// Both input tables of a report
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Tables {
    pub chart: Vec<ChartRow>,
    pub ledger: Vec<LedgerRow>,
}

/// Build a budget realization report.
///
/// Takes both tables by reference and keeps no state between calls, so the
/// same inputs always give the same report.
pub fn build_report(
    chart: &[ChartRow],
    ledger: &[LedgerRow],
    config: &ReportConfig,
    request: &ReportRequest,
) -> CoreResult<LraReport> {
    request.period.validate()?;

    let tree::TreeBuild {
        tree,
        malformed,
        below_leaf,
    } = AccountTree::build(chart, config)?;

    let filter = IndexFilter {
        closing_tag: &config.closing_entry_tag,
        period: &request.period,
        units: &request.units,
    };
    let (index, stats) = LedgerIndex::build(ledger, &filter, config.max_warning_samples)?;
    let postings = index.resolve(&tree, config.ledger_match)?;
    let balances = Balances::compute(&tree, &postings)?;
    let assembly = assembler::assemble(&tree, &balances, &index, config.subtotal_tolerance)?;

    let mut diagnostics = Diagnostics::collect(stats, &postings, malformed, below_leaf, config.max_warning_samples);
    diagnostics.inconsistent_subtotals = assembly.mismatches;

    let logger = DefaultErrorLogger;
    let context = ErrorContext::new("build_report")
        .with_data("period", serde_json::json!(request.period.description()));
    for warning in &diagnostics.warnings {
        logger.log_warning(warning, &context);
    }

    log::info!(
        target: "lra::core",
        "Built LRA for {}: {} rows, residual {} ({})",
        request.period.description(),
        assembly.rows.len(),
        assembly.totals.residual,
        assembly.totals.residual_label
    );
    log::info!(target: "lra::core", "{}", diagnostics.summary());

    Ok(LraReport {
        period: request.period,
        period_description: request.period.description(),
        units: request.units.clone(),
        rows: assembly.rows,
        totals: assembly.totals,
        diagnostics,
    })
}

/// Account filter: a report class, a code, or both, and the level to list
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AccountQuery {
    #[serde(default)]
    pub class: Option<AccountClass>,
    #[serde(default)]
    pub code: Option<String>,
    pub level: u32,
}

/// List chart accounts at a level below a code or within a report class
pub fn list_accounts(chart: &[ChartRow], query: &AccountQuery, config: &ReportConfig) -> CoreResult<AccountsResponse> {
    if query.level == 0 {
        return Err(CoreError::InvalidRequest {
            message: "level must be at least 1".to_string(),
        });
    }
    let tree = AccountTree::catalog(chart, config.malformed_policy)?.tree;

    let parents: Vec<String> = match (&query.code, query.class) {
        (Some(code), class) => {
            let code = normalize_code(code);
            if tree.get(&code).is_none() {
                return Err(CoreError::AccountNotFound { code });
            }
            if let Some(class) = class {
                if AccountClass::from_code(&code) != Some(class) {
                    return Err(CoreError::InvalidRequest {
                        message: format!("account {} is not in class {} ({})", code, class.prefix(), class.title()),
                    });
                }
            }
            vec![code]
        }
        (None, Some(class)) => {
            let roots: Vec<String> = tree.roots_of_class(class).into_iter().map(|n| n.code.clone()).collect();
            if roots.is_empty() {
                return Err(CoreError::AccountNotFound {
                    code: class.prefix().to_string(),
                });
            }
            roots
        }
        (None, None) => {
            return Err(CoreError::InvalidRequest {
                message: "an account code or a report class is required".to_string(),
            })
        }
    };

    let accounts: Vec<AccountNode> = parents
        .iter()
        .flat_map(|parent| tree.descendants_at_level(parent, query.level))
        .cloned()
        .collect();
    Ok(AccountsResponse {
        parent: parents.join(","),
        class: query.class.or_else(|| parents.first().and_then(|p| AccountClass::from_code(p))),
        level: query.level,
        total_count: accounts.len(),
        accounts,
    })
}

/// Report builder bound to a configuration and a table source
pub struct LraEngine {
    config: ReportConfig,
    source: TableSourceRef,
}

impl LraEngine {
    /// Create a new engine with config and table source
    pub fn new(config: ReportConfig, source: TableSourceRef) -> Self {
        Self { config, source }
    }

    pub fn config(&self) -> &ReportConfig {
        &self.config
    }

    /// Load both tables concurrently
    pub async fn load(&self) -> CoreResult<Tables> {
        let (chart, ledger) = tokio::try_join!(self.source.load_chart(), self.source.load_ledger())?;
        log::info!(
            target: "lra::core",
            "Loaded {} chart rows and {} ledger rows",
            chart.len(),
            ledger.len()
        );
        Ok(Tables { chart, ledger })
    }

    /// Load the tables and build a report
    pub async fn report(&self, request: &ReportRequest) -> CoreResult<LraReport> {
        let tables = self.load().await?;
        build_report(&tables.chart, &tables.ledger, &self.config, request)
    }

    /// Load the chart and run the account filter
    pub async fn accounts(&self, query: &AccountQuery) -> CoreResult<AccountsResponse> {
        let chart = self.source.load_chart().await?;
        list_accounts(&chart, query, &self.config)
    }

    /// Load both tables and list the ledger postings a filter selects
    pub async fn ledger(&self, filter: &LedgerFilter) -> CoreResult<LedgerView> {
        let tables = self.load().await?;
        filter_ledger(&tables.chart, &tables.ledger, filter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use lra_parser::{ParseError, TableSource};
    use rust_decimal_macros::dec;
    use std::sync::Arc;

    struct MemorySource {
        tables: Tables,
    }

    #[async_trait]
    impl TableSource for MemorySource {
        async fn load_chart(&self) -> Result<Vec<ChartRow>, ParseError> {
            Ok(self.tables.chart.clone())
        }

        async fn load_ledger(&self) -> Result<Vec<LedgerRow>, ParseError> {
            Ok(self.tables.ledger.clone())
        }
    }

    fn tables() -> Tables {
        Tables {
            chart: vec![
                ChartRow::new("4", "Pendapatan", 1),
                ChartRow::new("4.1", "Pendapatan Asli", 2),
                ChartRow::new("4.1.1", "Pajak", 3),
                ChartRow::new("4.1.2", "Retribusi", 3),
            ],
            ledger: vec![LedgerRow::new("4.1.1", dec!(0), dec!(75), "Jurnal Umum")],
        }
    }

    #[tokio::test]
    async fn test_engine_report() {
        let engine = LraEngine::new(ReportConfig::default(), Arc::new(MemorySource { tables: tables() }));
        let report = engine.report(&ReportRequest::default()).await.unwrap();
        assert_eq!(report.totals.revenue, dec!(75));
        assert_eq!(report.totals.residual_label, ResidualLabel::Silpa);
        assert_eq!(report.period_description, "Semua Periode");
    }

    fn query(class: Option<AccountClass>, code: Option<&str>, level: u32) -> AccountQuery {
        AccountQuery {
            class,
            code: code.map(String::from),
            level,
        }
    }

    #[tokio::test]
    async fn test_engine_accounts() {
        let engine = LraEngine::new(ReportConfig::default(), Arc::new(MemorySource { tables: tables() }));
        let response = engine.accounts(&query(None, Some("4"), 3)).await.unwrap();
        assert_eq!(response.total_count, 2);
        assert_eq!(response.accounts[1].code, "4.1.2");
        assert_eq!(response.class, Some(AccountClass::Revenue));

        let err = engine.accounts(&query(None, Some("7"), 2)).await.unwrap_err();
        assert_eq!(err.code(), ErrorCode::AccountNotFound);
    }

    #[test]
    fn test_accounts_by_class() {
        let mut chart = tables().chart;
        chart.push(ChartRow::new("5", "Belanja", 1));
        chart.push(ChartRow::new("5.1", "Belanja Operasi", 2));
        let config = ReportConfig::default();

        let response = list_accounts(&chart, &query(Some(AccountClass::Revenue), None, 2), &config).unwrap();
        assert_eq!(response.parent, "4");
        assert_eq!(response.total_count, 1);
        assert_eq!(response.accounts[0].code, "4.1");

        let response = list_accounts(&chart, &query(Some(AccountClass::Expenditure), None, 2), &config).unwrap();
        assert_eq!(response.accounts[0].name, "Belanja Operasi");

        let err = list_accounts(&chart, &query(Some(AccountClass::Assets), None, 2), &config).unwrap_err();
        assert!(matches!(err, CoreError::AccountNotFound { ref code } if code == "1"));

        let err = list_accounts(&chart, &query(Some(AccountClass::Expenditure), Some("4.1"), 3), &config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);

        let err = list_accounts(&chart, &query(None, None, 2), &config).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[tokio::test]
    async fn test_engine_ledger() {
        let engine = LraEngine::new(ReportConfig::default(), Arc::new(MemorySource { tables: tables() }));
        let filter = LedgerFilter {
            level: Some(2),
            accounts: vec!["4.1".to_string()],
            ..LedgerFilter::default()
        };
        let view = engine.ledger(&filter).await.unwrap();
        assert_eq!(view.total_count, 1);
        assert_eq!(view.balance.credit, dec!(75));
        assert_eq!(view.lines[0].account_name.as_deref(), Some("Pendapatan Asli"));
    }

    #[test]
    fn test_overflowing_ledger_is_an_error() {
        let t = tables();
        let big = "50000000000000000000000000000";
        let ledger = vec![
            LedgerRow::new("4.1.1", "0", big, "Jurnal Umum"),
            LedgerRow::new("4.1.1", "0", big, "Jurnal Umum"),
        ];
        let err = build_report(&t.chart, &ledger, &ReportConfig::default(), &ReportRequest::default()).unwrap_err();
        assert_eq!(err.code(), ErrorCode::AmountOverflow);
    }

    #[test]
    fn test_invalid_period_is_rejected() {
        let t = tables();
        let request = ReportRequest {
            period: ReportPeriod::Months { year: 2024, from: 4, to: 1 },
            units: Vec::new(),
        };
        let err = build_report(&t.chart, &t.ledger, &ReportConfig::default(), &request).unwrap_err();
        assert_eq!(err.code(), ErrorCode::InvalidRequest);
    }

    #[test]
    fn test_request_deserializes_with_defaults() {
        let request: ReportRequest = serde_json::from_str("{}").unwrap();
        assert_eq!(request, ReportRequest::default());
        let request: ReportRequest =
            serde_json::from_str(r#"{"period": {"kind": "year", "year": 2024}, "units": ["Dinas A"]}"#).unwrap();
        assert_eq!(request.period, ReportPeriod::Year { year: 2024 });
        assert_eq!(request.units, vec!["Dinas A".to_string()]);
    }
}
