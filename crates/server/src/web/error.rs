use axum::{
    extract::rejection::{JsonRejection, PathRejection, QueryRejection},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use smsgate_common::api::{NotFoundBody, ValidationErrorBody};
use thiserror::Error;
use tracing::debug;

use crate::store::StoreError;

#[derive(Error, Debug)]
pub enum AppError {
    #[error("Invalid {field}: {message}")]
    Validation { field: String, message: String },
    #[error("Invalid input: {0}")]
    InvalidInput(String),
    #[error("Not Found: {0}")]
    NotFound(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        match self {
            AppError::Validation { field, message } => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorBody {
                    message,
                    field: Some(field),
                }),
            )
                .into_response(),
            AppError::InvalidInput(message) => (
                StatusCode::BAD_REQUEST,
                Json(ValidationErrorBody {
                    message,
                    field: None,
                }),
            )
                .into_response(),
            AppError::NotFound(message) => {
                (StatusCode::NOT_FOUND, Json(NotFoundBody { message })).into_response()
            }
        }
    }
}

impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation { field, message } => AppError::Validation {
                field: field.to_string(),
                message,
            },
            not_found @ StoreError::NotFound { .. } => AppError::NotFound(not_found.to_string()),
        }
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<PathRejection> for AppError {
    fn from(rejection: PathRejection) -> Self {
        debug!(error = %rejection, "Rejected path parameters.");
        AppError::InvalidInput(rejection.body_text())
    }
}

impl From<QueryRejection> for AppError {
    fn from(rejection: QueryRejection) -> Self {
        debug!(error = %rejection, "Rejected query string.");
        AppError::InvalidInput(rejection.body_text())
    }
}
