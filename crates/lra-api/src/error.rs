//! Error types for lra-api

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use lra_core::{CoreError, ErrorCode};
use lra_parser::ParseError;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("Not found: {resource}")]
    NotFound { resource: String },

    #[error("Bad request: {message}")]
    BadRequest { message: String },

    #[error(transparent)]
    Core(#[from] CoreError),

    #[error("Internal server error")]
    InternalError,
}

impl ApiError {
    /// HTTP status for the error
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound { .. } => StatusCode::NOT_FOUND,
            ApiError::BadRequest { .. } => StatusCode::BAD_REQUEST,
            ApiError::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Core(error) => match error.code() {
                ErrorCode::AccountNotFound => StatusCode::NOT_FOUND,
                ErrorCode::InvalidRequest => StatusCode::BAD_REQUEST,
                ErrorCode::MalformedAccountCode | ErrorCode::InconsistentSubtotal | ErrorCode::AmountOverflow => {
                    StatusCode::UNPROCESSABLE_ENTITY
                }
                ErrorCode::SourceError => match error {
                    CoreError::Source(ParseError::IoError(_)) => StatusCode::INTERNAL_SERVER_ERROR,
                    _ => StatusCode::UNPROCESSABLE_ENTITY,
                },
                ErrorCode::UnmatchedLedgerEntry | ErrorCode::NonNumericAmount => StatusCode::OK,
            },
        }
    }

    /// JSON body for the error
    pub fn body(&self) -> serde_json::Value {
        match self {
            ApiError::Core(error) => {
                let details = error.to_details();
                serde_json::json!({
                    "error": details.code.to_string(),
                    "severity": details.severity,
                    "message": details.message,
                    "details": details.details,
                    "suggestions": details.suggestions,
                })
            }
            ApiError::NotFound { .. } => serde_json::json!({ "error": "NOT_FOUND", "message": self.to_string() }),
            ApiError::BadRequest { .. } => serde_json::json!({ "error": "BAD_REQUEST", "message": self.to_string() }),
            ApiError::InternalError => serde_json::json!({ "error": "INTERNAL_ERROR", "message": self.to_string() }),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            log::error!(target: "lra::api", "{}", self);
        } else {
            log::warn!(target: "lra::api", "{}", self);
        }
        (status, Json(self.body())).into_response()
    }
}
