use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;
use tracing::{debug, error, warn, Level};

use crate::db::StoreError;
use crate::utils::response::error as error_response;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authenticated")]
    NotAuthenticated,

    #[error("Access denied: {0}")]
    AccessDenied(String),

    #[error("Resource not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Persistence error")]
    Persistence(#[from] StoreError),

    #[error("External service error: {0}")]
    ExternalService(String),

    #[error("Internal server error")]
    Internal(String),
}

impl AppError {
    pub fn status_code(&self) -> StatusCode {
        match self {
            AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::NotAuthenticated => StatusCode::UNAUTHORIZED,
            AppError::AccessDenied(_) => StatusCode::FORBIDDEN,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::Persistence(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::ExternalService(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub fn code(&self) -> &'static str {
        match self {
            AppError::Validation(_) => "VALIDATION_ERROR",
            AppError::NotAuthenticated => "NOT_AUTHENTICATED",
            AppError::AccessDenied(_) => "ACCESS_DENIED",
            AppError::NotFound(_) => "NOT_FOUND",
            AppError::Conflict(_) => "CONFLICT",
            AppError::Persistence(_) => "PERSISTENCE_ERROR",
            AppError::ExternalService(_) => "EXTERNAL_SERVICE_ERROR",
            AppError::Internal(_) => "INTERNAL_SERVER_ERROR",
        }
    }

    /// Message safe to show to the caller. Storage and internal failures
    /// never expose their details.
    pub fn public_message(&self) -> String {
        match self {
            AppError::Validation(msg)
            | AppError::AccessDenied(msg)
            | AppError::NotFound(msg)
            | AppError::Conflict(msg)
            | AppError::ExternalService(msg)
            | AppError::Internal(msg) => msg.clone(),
            AppError::NotAuthenticated => "Not authenticated".to_string(),
            AppError::Persistence(_) => "A database error occurred".to_string(),
        }
    }

    /// Level at which the error is logged when turned into a response.
    /// Denials are logged by the identity gate, so they stay at debug here.
    pub fn log_level(&self) -> Level {
        match self {
            AppError::Persistence(_) | AppError::ExternalService(_) | AppError::Internal(_) => {
                Level::ERROR
            }
            AppError::NotAuthenticated => Level::WARN,
            AppError::AccessDenied(_)
            | AppError::Validation(_)
            | AppError::NotFound(_)
            | AppError::Conflict(_) => Level::DEBUG,
        }
    }

    fn log(&self) {
        match (self, self.log_level()) {
            (AppError::Persistence(e), _) => error!(error = ?e, "Persistence failure"),
            (_, Level::ERROR) => error!(error = ?self, "Application error"),
            (_, Level::WARN) => warn!(error = %self, "Request rejected"),
            _ => debug!(error = %self, "Request failed"),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let code = self.code();

        // Log internal details
        self.log();

        error_response(code, self.public_message(), status)
    }
}
