//! Error handling

use axum::{
    extract::rejection::JsonRejection,
    response::{IntoResponse, Response},
    http::StatusCode,
    Json,
};
use serde_json::json;

use crate::classifier::ClassifierError;

pub type AppResult<T> = Result<T, AppError>;

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    // Request errors
    #[error("{0}")]
    ValidationError(String),

    // Resource errors
    #[error("{0}")]
    NotFound(String),

    // Server setup errors
    #[error("{0}")]
    ConfigurationError(String),

    // Classifier unreachable before any line was sent
    #[error("An error occurred during analysis: {0}")]
    TransportError(String),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::ValidationError(_) => StatusCode::BAD_REQUEST,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::ConfigurationError(_)
            | AppError::TransportError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let error_message = match &self {
            AppError::ConfigurationError(msg) => {
                tracing::error!("Configuration error: {}", msg);
                self.to_string()
            }
            AppError::TransportError(msg) => {
                tracing::error!("Classifier transport error: {}", msg);
                self.to_string()
            }
            _ => self.to_string(),
        };

        let body = Json(json!({
            "error": error_message,
            "status": status.as_u16()
        }));

        (status, body).into_response()
    }
}

impl From<ClassifierError> for AppError {
    fn from(err: ClassifierError) -> Self {
        match err {
            ClassifierError::MissingCredential => AppError::ConfigurationError(
                "API key is not configured on the server. Please check your .env file.".to_string(),
            ),
            other => AppError::TransportError(other.to_string()),
        }
    }
}

/// Log the axum rejection and replace it with the endpoint's own 400 message
pub fn reject_body(rejection: JsonRejection, message: &str) -> AppError {
    tracing::debug!("Rejected request body: {}", rejection.body_text());
    AppError::ValidationError(message.to_string())
}
