use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde_json::json;
use sitelink_companycam::CompanyCamError;
use sitelink_core::error::CoreError;
use sitelink_db::StoreError;
use sitelink_messaging::ServiceError;

/// Application-level error type for HTTP handlers.
///
/// Wraps [`CoreError`] for domain errors and adds HTTP-specific variants.
/// Implements [`IntoResponse`] to produce consistent JSON error responses.
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    /// A domain-level error from `sitelink_core`.
    #[error(transparent)]
    Core(#[from] CoreError),

    /// A store failure (database or snapshot).
    #[error(transparent)]
    Store(StoreError),

    /// A CompanyCam API failure.
    #[error(transparent)]
    CompanyCam(#[from] CompanyCamError),

    /// A bad request with a human-readable message.
    #[error("Bad request: {0}")]
    BadRequest(String),

    /// An internal error with a human-readable message.
    #[error("Internal error: {0}")]
    InternalError(String),
}

/// Convenience type alias for handler return values.
pub type AppResult<T> = Result<T, AppError>;

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Core(core) => AppError::Core(core),
            other => AppError::Store(other),
        }
    }
}

impl From<ServiceError> for AppError {
    fn from(err: ServiceError) -> Self {
        match err {
            ServiceError::Core(core) => AppError::Core(core),
            ServiceError::Store(store) => store.into(),
        }
    }
}

fn internal() -> (StatusCode, &'static str, String) {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        "INTERNAL_ERROR",
        "An internal error occurred".to_string(),
    )
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, code, message) = match &self {
            // --- CoreError variants ---
            AppError::Core(core) => match core {
                CoreError::NotFound { entity, id } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} with id {id} not found"),
                ),
                CoreError::NotFoundByKey { entity, key } => (
                    StatusCode::NOT_FOUND,
                    "NOT_FOUND",
                    format!("{entity} '{key}' not found"),
                ),
                CoreError::Validation(msg) => {
                    (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone())
                }
                CoreError::Conflict(msg) => (StatusCode::CONFLICT, "CONFLICT", msg.clone()),
                CoreError::Unauthorized(msg) => {
                    (StatusCode::UNAUTHORIZED, "UNAUTHORIZED", msg.clone())
                }
                CoreError::Forbidden(msg) => (StatusCode::FORBIDDEN, "FORBIDDEN", msg.clone()),
                CoreError::Internal(msg) => {
                    tracing::error!(error = %msg, "Internal core error");
                    internal()
                }
            },

            // --- Store errors ---
            AppError::Store(StoreError::Database(err)) => classify_sqlx_error(err),
            AppError::Store(err) => {
                tracing::error!(error = %err, "Store error");
                internal()
            }

            // --- CompanyCam ---
            AppError::CompanyCam(err) => match err {
                CompanyCamError::MissingToken => (
                    StatusCode::BAD_REQUEST,
                    "COMPANYCAM_NOT_CONFIGURED",
                    err.to_string(),
                ),
                CompanyCamError::RateLimited => (
                    StatusCode::TOO_MANY_REQUESTS,
                    "COMPANYCAM_RATE_LIMITED",
                    err.to_string(),
                ),
                CompanyCamError::Api { status, message } => {
                    tracing::warn!(status, %message, "CompanyCam API error");
                    (
                        StatusCode::BAD_GATEWAY,
                        "COMPANYCAM_ERROR",
                        format!("CompanyCam returned {status}: {message}"),
                    )
                }
                CompanyCamError::Request(e) => {
                    tracing::error!(error = %e, "CompanyCam request failed");
                    (
                        StatusCode::BAD_GATEWAY,
                        "COMPANYCAM_UNAVAILABLE",
                        "CompanyCam could not be reached".to_string(),
                    )
                }
            },

            // --- HTTP-specific errors ---
            AppError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg.clone()),
            AppError::InternalError(msg) => {
                tracing::error!(error = %msg, "Internal error");
                internal()
            }
        };

        let body = json!({
            "error": message,
            "code": code,
        });

        (status, axum::Json(body)).into_response()
    }
}

/// Classify a sqlx error into an HTTP status, error code, and message.
///
/// - `RowNotFound` maps to 404.
/// - Everything else maps to 500 with a sanitized message. Unique violations
///   on `uq_` constraints never get here; the store reports them as
///   [`CoreError::Conflict`].
fn classify_sqlx_error(err: &sqlx::Error) -> (StatusCode, &'static str, String) {
    match err {
        sqlx::Error::RowNotFound => (
            StatusCode::NOT_FOUND,
            "NOT_FOUND",
            "Resource not found".to_string(),
        ),
        other => {
            tracing::error!(error = %other, "Database error");
            internal()
        }
    }
}
