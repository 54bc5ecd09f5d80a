use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;

use crate::db::StorageError;

/// Application-level errors
#[derive(thiserror::Error, Debug)]
pub enum AppError {
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl AppError {
    pub fn user_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("User with id {} not found", id))
    }

    pub fn film_not_found(id: impl std::fmt::Display) -> Self {
        AppError::NotFound(format!("Film with id {} not found", id))
    }

    fn status(&self) -> StatusCode {
        match self {
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::Conflict(_) => StatusCode::CONFLICT,
            AppError::InvalidInput(_) | AppError::Validation(_) => StatusCode::BAD_REQUEST,
            AppError::Storage(_) | AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        let (message, errors) = match &self {
            AppError::NotFound(msg) | AppError::Conflict(msg) | AppError::InvalidInput(msg) => {
                (msg.clone(), vec![msg.clone()])
            }
            AppError::Validation(errors) => ("Validation failed".to_string(), errors.clone()),
            AppError::Storage(_) | AppError::Internal(_) => {
                tracing::error!(error = %self, "Request failed with internal error");
                let msg = self.to_string();
                (msg.clone(), vec![msg])
            }
        };

        let body = Json(json!({
            "error": status.canonical_reason().unwrap_or("Error"),
            "message": message,
            "errors": errors,
        }));

        (status, body).into_response()
    }
}

pub type AppResult<T> = Result<T, AppError>;
