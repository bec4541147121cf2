//! Error types for the catalog server

use axum::{
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use crate::repository::StoreError;

/// Main application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// One message per broken rule
    #[error("Validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// Carries the entity name, e.g. "author"
    #[error("The {0} could not be found.")]
    NotFound(&'static str),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error("{0}")]
    Internal(String),
}

/// Body of a 400 response
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ValidationErrorResponse {
    pub errors: Vec<String>,
}

/// Body of 404 and 500 responses
#[derive(Debug, Serialize, utoipa::ToSchema)]
pub struct ErrorResponse {
    pub error: String,
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::Validation(vec![rejection.body_text()])
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation(errors) => {
                (StatusCode::BAD_REQUEST, Json(ValidationErrorResponse { errors })).into_response()
            }
            AppError::NotFound(_) => {
                let body = ErrorResponse {
                    error: self.to_string(),
                };
                (StatusCode::NOT_FOUND, Json(body)).into_response()
            }
            AppError::Store(e) => {
                tracing::error!("Store error: {:?}", e);
                let body = ErrorResponse {
                    error: e.to_string(),
                };
                (StatusCode::INTERNAL_SERVER_ERROR, Json(body)).into_response()
            }
            AppError::Internal(msg) => {
                tracing::error!("Internal error: {}", msg);
                (StatusCode::INTERNAL_SERVER_ERROR, Json(ErrorResponse { error: msg })).into_response()
            }
        }
    }
}

/// Result type alias for application operations
pub type AppResult<T> = Result<T, AppError>;
