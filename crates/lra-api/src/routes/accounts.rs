//! Chart of accounts filter endpoint

use axum::extract::{Query, State};
use axum::Json;
use lra_core::{AccountClass, AccountQuery, AccountsResponse};
use serde::Deserialize;

use crate::{ApiError, AppState};

#[derive(Debug, Clone, Deserialize)]
pub struct AccountsQuery {
    pub code: Option<String>,
    /// Report class, by root code ("4") or name ("revenue")
    pub class: Option<String>,
    pub level: u32,
}

impl AccountsQuery {
    pub fn to_query(&self) -> Result<AccountQuery, ApiError> {
        if self.level == 0 {
            return Err(ApiError::BadRequest {
                message: "level must be at least 1".to_string(),
            });
        }
        let class = self
            .class
            .as_deref()
            .filter(|c| !c.trim().is_empty())
            .map(str::parse::<AccountClass>)
            .transpose()
            .map_err(|message| ApiError::BadRequest { message })?;
        Ok(AccountQuery {
            class,
            code: self.code.clone().filter(|c| !c.trim().is_empty()),
            level: self.level,
        })
    }
}

/// GET /api/accounts?code=&class=&level= - accounts at a level below a code or class
pub async fn api_accounts(
    State(state): State<AppState>,
    Query(query): Query<AccountsQuery>,
) -> Result<Json<AccountsResponse>, ApiError> {
    let query = query.to_query()?;
    Ok(Json(state.engine.accounts(&query).await?))
}
