//! HTTP API serving budget realization reports
//!
//! Routes are organized into modules:
//! - routes::reports: LRA report over configured files or inline tables
//! - routes::accounts: chart of accounts filter
//! - routes::ledger: filtered ledger listing

pub mod error;
pub mod routes;

use axum::http::Uri;
use axum::{routing::get, Router};
use lra_config::Config;
use lra_core::LraEngine;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};

pub use error::ApiError;

/// Application state
#[derive(Clone)]
pub struct AppState {
    pub engine: Arc<LraEngine>,
    pub config: Arc<Config>,
}

/// Create the application router
pub fn create_router(state: AppState) -> Router {
    use routes::accounts::api_accounts;
    use routes::ledger::api_ledger;
    use routes::reports::{api_lra_rendered, api_lra_report, api_lra_report_inline};

    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/api/health", get(health_check))
        .route("/api/reports/lra", get(api_lra_report).post(api_lra_report_inline))
        .route("/api/reports/lra/rendered", get(api_lra_rendered))
        .route("/api/accounts", get(api_accounts))
        .route("/api/ledger", get(api_ledger))
        .fallback(not_found)
        .layer(cors)
        .with_state(state)
}

/// Health check endpoint
async fn health_check() -> &'static str {
    "OK"
}

async fn not_found(uri: Uri) -> ApiError {
    ApiError::NotFound {
        resource: uri.path().to_string(),
    }
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        log::error!(target: "lra::api", "Failed to listen for shutdown signal: {}", e);
    }
}

/// Start the HTTP server
pub async fn start_server(config: Config, engine: Arc<LraEngine>) -> std::io::Result<()> {
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let state = AppState {
        engine,
        config: Arc::new(config),
    };

    let router = create_router(state);

    let listener = TcpListener::bind(&addr).await?;
    log::info!(target: "lra::api", "Starting LRA server on http://{}", addr);
    log::info!(target: "lra::api", "Available routes:");
    log::info!(target: "lra::api", "  - GET  /api/health");
    log::info!(target: "lra::api", "  - GET  /api/reports/lra?year=&from_month=&to_month=&unit=");
    log::info!(target: "lra::api", "  - POST /api/reports/lra");
    log::info!(target: "lra::api", "  - GET  /api/reports/lra/rendered");
    log::info!(target: "lra::api", "  - GET  /api/accounts?code=&class=&level=");
    log::info!(target: "lra::api", "  - GET  /api/ledger?level=&account=&unit_field=&unit=&year=&from_month=&to_month=&offset=&limit=");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown_signal())
        .await?;
    log::info!(target: "lra::api", "Server stopped gracefully");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use http_body_util::BodyExt;
    use lra_parser::{ChartRow, LedgerRow, ParseError, TableSource};
    use rust_decimal_macros::dec;
    use tower::ServiceExt;

    struct MemorySource;

    #[async_trait]
    impl TableSource for MemorySource {
        async fn load_chart(&self) -> Result<Vec<ChartRow>, ParseError> {
            Ok(vec![
                ChartRow::new("4", "Pendapatan", 1),
                ChartRow::new("4.1", "Pendapatan Asli", 2),
                ChartRow::new("4.1.1", "Pajak", 3),
                ChartRow::new("5", "Belanja", 1),
                ChartRow::new("5.1", "Belanja Pegawai", 2),
                ChartRow::new("5.1.1", "Gaji", 3),
            ])
        }

        async fn load_ledger(&self) -> Result<Vec<LedgerRow>, ParseError> {
            Ok(vec![
                LedgerRow::new("4.1.1", dec!(0), dec!(1000), "Jurnal Umum").with_sub_unit("Bidang A"),
                LedgerRow::new("5.1.1", dec!(600), dec!(0), "Jurnal Umum").with_sub_unit("Bidang B"),
                LedgerRow::new("5.1.1", dec!(150), dec!(0), "Jurnal Umum").with_sub_unit("Bidang A"),
            ])
        }
    }

    fn app() -> Router {
        let config = Config::default();
        let engine = LraEngine::new(config.report.clone(), Arc::new(MemorySource));
        create_router(AppState {
            engine: Arc::new(engine),
            config: Arc::new(config),
        })
    }

    async fn get_json(uri: &str) -> (StatusCode, serde_json::Value) {
        let response = app()
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let body = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&body).unwrap())
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/api/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = response.into_body().collect().await.unwrap().to_bytes();
        assert_eq!(&body[..], b"OK");
    }

    #[tokio::test]
    async fn test_report_endpoint() {
        let (status, json) = get_json("/api/reports/lra").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["totals"]["residual"], "250");
        assert_eq!(json["totals"]["residual_label"], "SILPA");
        assert_eq!(json["diagnostics"]["unmatched_entries"], 0);
    }

    #[tokio::test]
    async fn test_report_rejects_month_without_year() {
        let (status, json) = get_json("/api/reports/lra?from_month=3").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_rendered_endpoint() {
        let (status, json) = get_json("/api/reports/lra/rendered").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["rows"][0]["balance"], "Rp 1,000");
        assert_eq!(json["period"], "Semua Periode");
        assert_eq!(json["residual_description"], "Sisa Lebih Pembiayaan Anggaran");
    }

    #[tokio::test]
    async fn test_inline_report() {
        let body = serde_json::json!({
            "chart": [
                {"code": "5", "name": "Belanja", "level": 1},
                {"code": "5.1", "name": "Belanja Pegawai", "level": 2},
                {"code": "5.1.1", "name": "Gaji", "level": 3}
            ],
            "ledger": [
                {"account_code": "5.1.1", "debit": 10, "credit": 0, "transaction_type": "Jurnal Umum"}
            ]
        });
        let response = app()
            .oneshot(
                Request::builder()
                    .method("POST")
                    .uri("/api/reports/lra")
                    .header("Content-Type", "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(json["totals"]["residual_label"], "SIKPA");
    }

    #[tokio::test]
    async fn test_accounts_endpoint() {
        let (status, json) = get_json("/api/accounts?code=4&level=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 1);
        assert_eq!(json["accounts"][0]["code"], "4.1.1");

        let (status, json) = get_json("/api/accounts?code=9&level=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "ACCOUNT_NOT_FOUND");
    }

    #[tokio::test]
    async fn test_accounts_by_class() {
        let (status, json) = get_json("/api/accounts?class=5&level=2").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["class"], "expenditure");
        assert_eq!(json["accounts"][0]["code"], "5.1");

        let (status, json) = get_json("/api/accounts?class=revenue&level=3").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["accounts"][0]["code"], "4.1.1");

        let (status, json) = get_json("/api/accounts?class=6&level=2").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "ACCOUNT_NOT_FOUND");

        let (status, json) = get_json("/api/accounts?class=5&code=4&level=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "INVALID_REQUEST");

        let (status, _) = get_json("/api/accounts?level=2").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_ledger_endpoint() {
        let (status, json) = get_json("/api/ledger?level=2&account=5.1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["lines"][0]["account"], "5.1");
        assert_eq!(json["lines"][0]["account_name"], "Belanja Pegawai");
        assert_eq!(json["balance"]["side"], "debit");
        assert_eq!(json["balance"]["debit"], "750");

        let (status, json) = get_json("/api/ledger?unit_field=sub_unit&unit=Bidang%20A&limit=1").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["total_count"], 2);
        assert_eq!(json["lines"].as_array().map(Vec::len), Some(1));
        assert_eq!(json["balance"]["side"], "credit");
        assert_eq!(json["balance"]["credit"], "850");

        let (status, json) = get_json("/api/ledger?level=2&account=5.1.1").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(json["error"], "INVALID_REQUEST");
    }

    #[tokio::test]
    async fn test_unknown_route() {
        let (status, json) = get_json("/api/reports/neraca").await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(json["error"], "NOT_FOUND");
        assert_eq!(json["message"], "Not found: /api/reports/neraca");
    }
}
