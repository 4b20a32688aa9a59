//! HTTP mapping for domain errors

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use bookslot_domain::BookslotError;
use serde_json::json;

/// Response wrapper carrying a domain error across a handler boundary.
#[derive(Debug)]
pub struct ApiError(pub BookslotError);

impl From<BookslotError> for ApiError {
    fn from(err: BookslotError) -> Self {
        Self(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self.0 {
            BookslotError::Validation(_) => StatusCode::BAD_REQUEST,
            BookslotError::Conflict(_) => StatusCode::CONFLICT,
            BookslotError::Authorization(_) => StatusCode::FORBIDDEN,
            BookslotError::NotFound(_) => StatusCode::NOT_FOUND,
            BookslotError::Provider(_) => StatusCode::BAD_GATEWAY,
            BookslotError::Database(_) | BookslotError::Config(_) | BookslotError::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };

        if status.is_server_error() {
            tracing::error!(error = %self.0, "request failed");
        }

        // Internal detail stays out of 5xx responses.
        let message = if status.is_server_error() {
            "an internal error occurred".to_string()
        } else {
            self.0.to_string()
        };

        (status, Json(json!({ "error": { "message": message } }))).into_response()
    }
}

pub type ApiResult<T> = Result<T, ApiError>;
