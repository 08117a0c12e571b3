use axum::{
    http::{header::WWW_AUTHENTICATE, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

/// Application error type that can be returned from handlers
#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Authentication errors
    #[error("Incorrect username or password")]
    InvalidCredentials,

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Inactive user")]
    InactiveAccount,

    // Resource errors
    #[error("{0} not found")]
    NotFound(String),

    #[error("{0}")]
    Forbidden(String),

    #[error("{0}")]
    Conflict(String),

    // Business rule errors
    #[error("{0}")]
    DuplicateEntry(String),

    #[error("{0}")]
    DuplicateMember(String),

    #[error("Pokemon with id {0} is not in your Pokedex")]
    NotInCollection(i32),

    #[error("{0}")]
    InvalidSize(String),

    // Validation errors
    #[error("Validation error: {0}")]
    Validation(String),

    // Upstream catalog errors
    #[error("Upstream error: {0}")]
    UpstreamError(String),

    #[error("Upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    // Database errors
    #[error("Database error: {0}")]
    Database(String),

    // Internal errors
    #[error("Internal server error")]
    Internal(String),
}

/// JSON error response body
#[derive(Serialize)]
struct ErrorResponse {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    details: Option<String>,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let (status, error_message, details) = match &self {
            // 401 Unauthorized
            AppError::InvalidCredentials => (
                StatusCode::UNAUTHORIZED,
                "Invalid credentials",
                Some(self.to_string()),
            ),
            AppError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "Unauthorized",
                Some("Could not validate credentials".to_string()),
            ),

            // 400 Bad Request
            AppError::InactiveAccount => (StatusCode::BAD_REQUEST, "Inactive user", None),
            AppError::Conflict(msg) => (StatusCode::BAD_REQUEST, "Conflict", Some(msg.clone())),
            AppError::DuplicateEntry(msg) => (
                StatusCode::BAD_REQUEST,
                "Duplicate entry",
                Some(msg.clone()),
            ),
            AppError::DuplicateMember(msg) => (
                StatusCode::BAD_REQUEST,
                "Duplicate member",
                Some(msg.clone()),
            ),
            AppError::NotInCollection(_) => (
                StatusCode::BAD_REQUEST,
                "Not in collection",
                Some(self.to_string()),
            ),
            AppError::InvalidSize(msg) => (
                StatusCode::BAD_REQUEST,
                "Invalid team size",
                Some(msg.clone()),
            ),
            AppError::Validation(msg) => (
                StatusCode::BAD_REQUEST,
                "Validation error",
                Some(msg.clone()),
            ),

            // 403 Forbidden
            AppError::Forbidden(msg) => (StatusCode::FORBIDDEN, "Forbidden", Some(msg.clone())),

            // 404 Not Found
            AppError::NotFound(resource) => (
                StatusCode::NOT_FOUND,
                "Not found",
                Some(format!("{} not found", resource)),
            ),

            // 502 / 503 upstream catalog
            AppError::UpstreamError(msg) => {
                tracing::error!("Upstream error: {}", msg);
                (
                    StatusCode::BAD_GATEWAY,
                    "Error calling PokeAPI",
                    Some(msg.clone()),
                )
            }
            AppError::UpstreamUnavailable(msg) => {
                tracing::error!("Upstream unavailable: {}", msg);
                (
                    StatusCode::SERVICE_UNAVAILABLE,
                    "Error connecting to PokeAPI",
                    None,
                )
            }

            // 500 Internal Server Error
            AppError::Database(msg) => {
                tracing::error!("Database error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, "Database error", None)
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Internal server error",
                    None,
                )
            }
        };

        let body = Json(ErrorResponse {
            error: error_message.to_string(),
            details,
        });

        let mut response = (status, body).into_response();
        if status == StatusCode::UNAUTHORIZED {
            response
                .headers_mut()
                .insert(WWW_AUTHENTICATE, HeaderValue::from_static("Bearer"));
        }
        response
    }
}

// Convenient conversions from common error types

impl From<sea_orm::DbErr> for AppError {
    fn from(err: sea_orm::DbErr) -> Self {
        match err {
            sea_orm::DbErr::RecordNotFound(_) => AppError::NotFound("Resource".to_string()),
            sea_orm::DbErr::RecordNotInserted => {
                AppError::Conflict("Record already exists".to_string())
            }
            sea_orm::DbErr::RecordNotUpdated => AppError::NotFound("Resource".to_string()),
            _ => AppError::Database(err.to_string()),
        }
    }
}

// Expired, malformed and badly signed tokens all surface as 401
impl From<jsonwebtoken::errors::Error> for AppError {
    fn from(err: jsonwebtoken::errors::Error) -> Self {
        tracing::debug!(reason = ?err.kind(), "Rejected bearer token");
        AppError::Unauthorized
    }
}

/// True when a database error is a unique-constraint violation
pub fn is_unique_violation(err: &sea_orm::DbErr) -> bool {
    matches!(
        err.sql_err(),
        Some(sea_orm::SqlErr::UniqueConstraintViolation(_))
    ) || {
        let msg = err.to_string();
        msg.contains("duplicate key") || msg.contains("UNIQUE constraint")
    }
}

/// Result type alias for handlers
pub type AppResult<T> = Result<T, AppError>;
