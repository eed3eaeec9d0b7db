use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    ValidationError(#[from] validator::ValidationErrors),

    #[error("Bad request: {0}")]
    BadRequest(anyhow::Error),

    #[error("Not found: {0}")]
    NotFound(anyhow::Error),

    #[error("Conflict: {0}")]
    Conflict(anyhow::Error),

    #[error("Internal server error: {0}")]
    InternalError(#[from] anyhow::Error),

    #[error("Service Unavailable")]
    ServiceUnavailable,

    #[error("Database error: {0}")]
    DatabaseError(anyhow::Error),

    #[error("Configuration error: {0}")]
    ConfigError(anyhow::Error),
}

impl AppError {
    /// Short label used for error metrics.
    pub fn kind(&self) -> &'static str {
        match self {
            AppError::ValidationError(_) => "validation",
            AppError::BadRequest(_) => "bad_request",
            AppError::NotFound(_) => "not_found",
            AppError::Conflict(_) => "conflict",
            AppError::InternalError(_) => "internal",
            AppError::ServiceUnavailable => "unavailable",
            AppError::DatabaseError(_) => "database",
            AppError::ConfigError(_) => "config",
        }
    }

    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,
            AppError::InternalError(_) | AppError::DatabaseError(_) | AppError::ConfigError(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl From<config::ConfigError> for AppError {
    fn from(err: config::ConfigError) -> Self {
        AppError::ConfigError(anyhow::Error::new(err))
    }
}

impl From<std::io::Error> for AppError {
    fn from(err: std::io::Error) -> Self {
        AppError::InternalError(anyhow::Error::new(err))
    }
}

impl From<sqlx::Error> for AppError {
    fn from(err: sqlx::Error) -> Self {
        AppError::DatabaseError(anyhow::Error::new(err))
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        #[derive(Serialize)]
        struct ErrorResponse {
            error: String,
            #[serde(skip_serializing_if = "Option::is_none")]
            details: Option<String>,
        }

        let status = self.status();
        let (error_message, details) = match self {
            AppError::ValidationError(err) => {
                ("Validation error".to_string(), Some(err.to_string()))
            }
            AppError::BadRequest(err) => (err.to_string(), None),
            AppError::NotFound(err) => (err.to_string(), None),
            AppError::Conflict(err) => (err.to_string(), None),
            AppError::InternalError(err) => (
                "Internal server error".to_string(),
                Some(format!("{:#}", err)),
            ),
            AppError::ServiceUnavailable => ("Service unavailable".to_string(), None),
            AppError::DatabaseError(err) => ("Database error".to_string(), Some(err.to_string())),
            AppError::ConfigError(err) => {
                ("Configuration error".to_string(), Some(err.to_string()))
            }
        };

        if status.is_server_error() {
            tracing::error!(status = %status, error = %error_message, details = ?details, "Request failed");
        }

        (
            status,
            Json(ErrorResponse {
                error: error_message,
                details,
            }),
        )
            .into_response()
    }
}
