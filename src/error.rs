use axum::{
    response::{IntoResponse, Response},
    Json,
};
use http::StatusCode;
use serde_json::json;
use thiserror::Error;

/// Failures raised by a storage backend.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("record already exists")]
    Duplicate,

    #[error("store call timed out after {0:?}")]
    Timeout(std::time::Duration),

    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),
}

#[derive(Debug, Error)]
pub enum AppError {
    #[error("invalid body: {0}")]
    InvalidBody(String),

    #[error("invalid identifier: {0}")]
    InvalidId(String),

    #[error("{0}")]
    NotFound(String),

    #[error("poll expired at {0}")]
    Expired(String),

    #[error("{0}")]
    Conflict(String),

    #[error(transparent)]
    Store(#[from] StoreError),
}

pub type AppResult<T> = Result<T, AppError>;

impl AppError {
    fn status(&self) -> StatusCode {
        match self {
            AppError::InvalidBody(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::InvalidId(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Expired(_) => StatusCode::FORBIDDEN,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Store(_) => StatusCode::BAD_REQUEST,
        }
    }

    fn code(&self) -> &'static str {
        match self {
            AppError::InvalidBody(_) | AppError::InvalidId(_) => "VALIDATION_ERROR",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Expired(_) => "EXPIRED",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Store(_) => "STORE_ERROR",
        }
    }

    /// Replaces the status used for store failures on a given endpoint.
    pub fn on_store_failure(self, status: StatusCode) -> ApiError {
        let status = if matches!(self, AppError::Store(_)) {
            status
        } else {
            self.status()
        };
        ApiError { error: self, status }
    }
}

/// An `AppError` bound to the status it answers with.
#[derive(Debug)]
pub struct ApiError {
    error: AppError,
    status: StatusCode,
}

impl From<AppError> for ApiError {
    fn from(error: AppError) -> Self {
        let status = error.status();
        ApiError { error, status }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = match &self.error {
            AppError::Store(e) => {
                tracing::error!(error = %e, "store failure");
                "Store operation failed".to_string()
            }
            other => other.to_string(),
        };

        let body = json!({
            "error": self.error.code(),
            "message": message,
        });

        (self.status, Json(body)).into_response()
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        ApiError::from(self).into_response()
    }
}
