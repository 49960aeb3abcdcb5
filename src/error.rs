use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use serde::Serialize;
use serde_json::json;
use thiserror::Error;

/// A single validation failure, tied to the payload field that caused it.
#[derive(Debug, Clone, Serialize)]
pub struct FieldError {
    pub field: &'static str,
    pub message: String,
}

#[derive(Debug, Error)]
pub enum ApiError {
    #[error("validation failed")]
    Validation(Vec<FieldError>),
    #[error("task not found")]
    NotFound,
    #[error("store busy")]
    Busy,
    #[error("database error: {0}")]
    Database(rusqlite::Error),
    #[error("connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("blocking task was cancelled")]
    Canceled,
}

impl From<rusqlite::Error> for ApiError {
    fn from(err: rusqlite::Error) -> Self {
        // SQLITE_BUSY / SQLITE_LOCKED surface here only after the connection's
        // busy_timeout has elapsed; the caller gets a fail-fast 503.
        if let rusqlite::Error::SqliteFailure(code, _) = &err {
            if matches!(
                code.code,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked
            ) {
                return ApiError::Busy;
            }
        }
        ApiError::Database(err)
    }
}

impl From<actix_web::error::BlockingError> for ApiError {
    fn from(_: actix_web::error::BlockingError) -> Self {
        ApiError::Canceled
    }
}

impl ResponseError for ApiError {
    fn status_code(&self) -> StatusCode {
        match self {
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::NotFound => StatusCode::NOT_FOUND,
            ApiError::Busy => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Database(_) | ApiError::Pool(_) | ApiError::Canceled => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        match self {
            ApiError::Validation(errors) => {
                HttpResponse::UnprocessableEntity().json(json!({ "detail": errors }))
            }
            ApiError::NotFound => {
                HttpResponse::NotFound().json(json!({ "detail": "Task not found" }))
            }
            ApiError::Busy => HttpResponse::ServiceUnavailable()
                .json(json!({ "detail": "Store busy, try again" })),
            other => {
                log::error!("request failed: {}", other);
                HttpResponse::InternalServerError()
                    .json(json!({ "detail": "Internal server error" }))
            }
        }
    }
}
