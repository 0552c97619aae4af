//! Error types for gml-ps

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    /// Invalid request (400)
    #[error("Invalid request: {0}")]
    BadRequest(String),

    /// Well-formed request the model cannot score (422)
    #[error("Unprocessable request: {0}")]
    Unprocessable(String),

    /// gml-common error
    #[error(transparent)]
    Common(#[from] gml_common::Error),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        use gml_common::Error as CommonError;

        let (status, error_code, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            ApiError::Unprocessable(msg) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "UNPROCESSABLE", msg)
            }
            ApiError::Common(ref err) => {
                let status = match err {
                    CommonError::MissingData(_) | CommonError::InvalidInput(_) => {
                        StatusCode::BAD_REQUEST
                    }
                    CommonError::UnknownCategory { .. } => StatusCode::UNPROCESSABLE_ENTITY,
                    CommonError::VersionMismatch { .. }
                    | CommonError::Io(_)
                    | CommonError::Json(_)
                    | CommonError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
                };
                if status.is_server_error() {
                    error!(error = %err, "Request failed");
                }
                (status, err.code(), err.to_string())
            }
        };

        let body = Json(json!({
            "error": {
                "code": error_code,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}

/// Result type for API handlers
pub type ApiResult<T> = Result<T, ApiError>;
