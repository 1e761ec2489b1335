use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;

use crate::store::StoreError;

/// Structured error response returned by all endpoints on failure.
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorBody {
    /// Short error category. One of: `Missing file`, `Missing id`,
    /// `Invalid input`, `File too large`, `Not found`, `Receipt id collision`,
    /// `Server error`.
    #[schema(example = "Not found")]
    pub error: &'static str,
    /// Underlying diagnostic text, when there is any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<String>,
}

/// Application-level error type.
#[derive(Debug)]
pub enum AppError {
    MissingFile,
    MissingId,
    /// The request body could not be read or parsed.
    InvalidInput(String),
    PayloadTooLarge { limit: u64 },
    NotFound,
    IdCollision(String),
    StoreUnavailable(String),
}

impl AppError {
    fn status_and_body(self) -> (StatusCode, ErrorBody) {
        match self {
            AppError::MissingFile => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Missing file",
                    details: None,
                },
            ),
            AppError::MissingId => (
                StatusCode::BAD_REQUEST,
                ErrorBody {
                    error: "Missing id",
                    details: None,
                },
            ),
            AppError::InvalidInput(detail) => {
                tracing::debug!("Rejected request: {}", detail);
                (
                    StatusCode::BAD_REQUEST,
                    ErrorBody {
                        error: "Invalid input",
                        details: Some(detail),
                    },
                )
            }
            AppError::PayloadTooLarge { limit } => (
                StatusCode::PAYLOAD_TOO_LARGE,
                ErrorBody {
                    error: "File too large",
                    details: Some(format!("File exceeds maximum size of {limit} bytes")),
                },
            ),
            AppError::NotFound => (
                StatusCode::NOT_FOUND,
                ErrorBody {
                    error: "Not found",
                    details: None,
                },
            ),
            AppError::IdCollision(detail) => (
                StatusCode::CONFLICT,
                ErrorBody {
                    error: "Receipt id collision",
                    details: Some(detail),
                },
            ),
            AppError::StoreUnavailable(detail) => {
                tracing::error!("Store error: {}", detail);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    ErrorBody {
                        error: "Server error",
                        details: Some(detail),
                    },
                )
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, body) = self.status_and_body();
        (status, Json(body)).into_response()
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::IdCollision { .. } => AppError::IdCollision(err.to_string()),
            StoreError::SizeOutOfRange(_) => AppError::InvalidInput(err.to_string()),
            StoreError::Unavailable(_) | StoreError::Vanished(_) => {
                AppError::StoreUnavailable(err.to_string())
            }
        }
    }
}
