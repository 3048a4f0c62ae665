//! Ledger listing endpoint

use axum::extract::{Query, State};
use axum::Json;
use lra_core::{filter_ledger, LedgerFilter, LedgerView, ReportPeriod, UnitField};
use serde::Deserialize;

use super::split_list;
use crate::{ApiError, AppState};

/// Query string of the ledger listing
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LedgerQuery {
    pub level: Option<u32>,
    /// Comma-separated account codes at `level`
    pub account: Option<String>,
    /// `unit` or `sub_unit`
    pub unit_field: Option<String>,
    /// Comma-separated unit names
    pub unit: Option<String>,
    pub year: Option<i32>,
    pub from_month: Option<u32>,
    pub to_month: Option<u32>,
    pub offset: Option<usize>,
    pub limit: Option<usize>,
}

impl LedgerQuery {
    pub fn to_filter(&self) -> Result<LedgerFilter, ApiError> {
        let unit_field = match self.unit_field.as_deref() {
            Some(field) => field
                .parse::<UnitField>()
                .map_err(|message| ApiError::BadRequest { message })?,
            None => UnitField::default(),
        };
        Ok(LedgerFilter {
            level: self.level,
            accounts: split_list(self.account.as_deref()),
            unit_field,
            units: split_list(self.unit.as_deref()),
            period: ReportPeriod::from_parts(self.year, self.from_month, self.to_month)?,
            offset: self.offset.unwrap_or(0),
            limit: self.limit,
        })
    }
}

/// GET /api/ledger - ledger postings by account, unit and period with the closing saldo
pub async fn api_ledger(
    State(state): State<AppState>,
    Query(query): Query<LedgerQuery>,
) -> Result<Json<LedgerView>, ApiError> {
    let filter = query.to_filter()?;
    let tables = state.engine.load().await?;
    let view = tokio::task::spawn_blocking(move || filter_ledger(&tables.chart, &tables.ledger, &filter))
        .await
        .map_err(|e| {
            log::error!(target: "lra::api", "Ledger listing task failed: {}", e);
            ApiError::InternalError
        })??;
    Ok(Json(view))
}
