use axum::extract::rejection::JsonRejection;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use models::errors::ModelError;
use service::account::errors::AccountError;
use thiserror::Error;
use tracing::{error, warn};

/// Errors surfaced by the account API, rendered as `{"error": "<message>"}`.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("{0}")]
    MalformedInput(String),
    #[error(transparent)]
    Account(#[from] AccountError),
    #[error("request timed out")]
    Timeout,
    #[error("internal error: {0}")]
    Internal(String),
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::MalformedInput(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Timeout => StatusCode::REQUEST_TIMEOUT,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            ApiError::Account(e) => match e {
                AccountError::InvalidId(_) | AccountError::Mismatch { .. } => StatusCode::BAD_REQUEST,
                AccountError::NotFound(_) => StatusCode::NOT_FOUND,
                AccountError::UpdateFailed(_) => StatusCode::CONFLICT,
                AccountError::Store(_) => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        ApiError::MalformedInput(rejection.body_text())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let msg = self.to_string();
        if status.is_server_error() {
            error!(%status, error = %msg, "account request failed");
        } else {
            warn!(%status, error = %msg, "account request rejected");
        }
        (status, Json(serde_json::json!({"error": msg}))).into_response()
    }
}

#[derive(Debug, Error)]
pub enum StartupError {
    #[error("invalid configuration: {0}")]
    InvalidConfig(String),
    #[error(transparent)]
    Store(#[from] ModelError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}
