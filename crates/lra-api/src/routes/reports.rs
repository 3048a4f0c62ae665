//! Report endpoints

use axum::extract::{Query, State};
use axum::Json;
use lra_core::{build_report, render, Diagnostics, LraReport, RenderedRow, ReportPeriod, ReportRequest, ReportTotals};
use lra_parser::{ChartRow, LedgerRow};
use serde::{Deserialize, Serialize};

use super::split_list;
use crate::{ApiError, AppState};

/// Query string of the report endpoints
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ReportQuery {
    pub year: Option<i32>,
    pub from_month: Option<u32>,
    pub to_month: Option<u32>,
    /// Comma-separated unit names
    pub unit: Option<String>,
}

impl ReportQuery {
    pub fn to_request(&self) -> Result<ReportRequest, ApiError> {
        let period = ReportPeriod::from_parts(self.year, self.from_month, self.to_month)?;
        let units = split_list(self.unit.as_deref());
        Ok(ReportRequest { period, units })
    }
}

/// Body of an ad-hoc report request carrying its own tables
#[derive(Debug, Clone, Deserialize)]
pub struct InlineReportRequest {
    pub chart: Vec<ChartRow>,
    pub ledger: Vec<LedgerRow>,
    #[serde(default)]
    pub period: ReportPeriod,
    #[serde(default)]
    pub units: Vec<String>,
}

/// Report with display-formatted amounts
#[derive(Debug, Clone, Serialize)]
pub struct RenderedReport {
    pub period: String,
    pub rows: Vec<RenderedRow>,
    pub totals: ReportTotals,
    /// Long form of the residual label
    pub residual_description: String,
    pub diagnostics: Diagnostics,
}

async fn build_blocking(
    state: &AppState,
    chart: Vec<ChartRow>,
    ledger: Vec<LedgerRow>,
    request: ReportRequest,
) -> Result<LraReport, ApiError> {
    let config = state.config.report.clone();
    let report = tokio::task::spawn_blocking(move || build_report(&chart, &ledger, &config, &request))
        .await
        .map_err(|e| {
            log::error!(target: "lra::api", "Report build task failed: {}", e);
            ApiError::InternalError
        })??;
    Ok(report)
}

async fn configured_report(state: &AppState, query: &ReportQuery) -> Result<LraReport, ApiError> {
    let request = query.to_request()?;
    let tables = state.engine.load().await?;
    build_blocking(state, tables.chart, tables.ledger, request).await
}

/// GET /api/reports/lra - report over the configured data files
pub async fn api_lra_report(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<LraReport>, ApiError> {
    Ok(Json(configured_report(&state, &query).await?))
}

/// POST /api/reports/lra - report over tables sent in the body
pub async fn api_lra_report_inline(
    State(state): State<AppState>,
    Json(body): Json<InlineReportRequest>,
) -> Result<Json<LraReport>, ApiError> {
    let request = ReportRequest {
        period: body.period,
        units: body.units,
    };
    Ok(Json(build_blocking(&state, body.chart, body.ledger, request).await?))
}

/// GET /api/reports/lra/rendered - report with formatted amounts
pub async fn api_lra_rendered(
    State(state): State<AppState>,
    Query(query): Query<ReportQuery>,
) -> Result<Json<RenderedReport>, ApiError> {
    let report = configured_report(&state, &query).await?;
    Ok(Json(RenderedReport {
        period: report.period_description.clone(),
        rows: render(&report, &state.config.currency),
        residual_description: report.totals.residual_label.description().to_string(),
        totals: report.totals,
        diagnostics: report.diagnostics,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_query_to_request() {
        let query = ReportQuery {
            year: Some(2024),
            from_month: Some(1),
            to_month: Some(6),
            unit: Some("Dinas A, Dinas B,".to_string()),
        };
        let request = query.to_request().unwrap();
        assert_eq!(request.period, ReportPeriod::Months { year: 2024, from: 1, to: 6 });
        assert_eq!(request.units, vec!["Dinas A".to_string(), "Dinas B".to_string()]);
    }

    #[test]
    fn test_query_without_year_rejects_months() {
        let query = ReportQuery {
            from_month: Some(2),
            ..ReportQuery::default()
        };
        assert!(matches!(query.to_request(), Err(ApiError::Core(_))));
    }
}
