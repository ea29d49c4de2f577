//! Application error types.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::columns::WidthError;
use crate::hierarchy::HierarchyError;
use crate::layout::TemplateError;
use crate::ordering::OrderError;

/// Application errors.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("internal server error")]
    Internal(#[from] anyhow::Error),

    #[error("not found")]
    NotFound,

    #[error("permission denied")]
    PermissionDenied,

    #[error("validation failed: {0}")]
    Validation(String),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = match &self {
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
            AppError::NotFound => StatusCode::NOT_FOUND,
            AppError::PermissionDenied => StatusCode::FORBIDDEN,
            AppError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        };

        // Internal details go to the log, not the response body.
        let body = match &self {
            AppError::Internal(e) => {
                tracing::error!(error = %e, "internal server error");
                "internal server error".to_string()
            }
            _ => self.to_string(),
        };

        (status, body).into_response()
    }
}

impl From<OrderError> for AppError {
    fn from(e: OrderError) -> Self {
        match e {
            OrderError::ParentNotFound(_) => AppError::NotFound,
            OrderError::UnknownChild(_)
            | OrderError::DuplicateChild(_)
            | OrderError::IncompleteSet { .. } => AppError::Validation(e.to_string()),
            OrderError::Store(inner) => AppError::Internal(inner),
        }
    }
}

impl From<HierarchyError> for AppError {
    fn from(e: HierarchyError) -> Self {
        match e {
            HierarchyError::ParentNotFound(_) | HierarchyError::NotFound(_) => AppError::NotFound,
            HierarchyError::WrongKind { .. } => AppError::Validation(e.to_string()),
            HierarchyError::PermissionDenied => AppError::PermissionDenied,
            HierarchyError::Store(inner) => AppError::Internal(inner),
        }
    }
}

impl From<TemplateError> for AppError {
    fn from(e: TemplateError) -> Self {
        match e {
            TemplateError::UnknownTemplate(_) | TemplateError::SectionNotFound(_) => {
                AppError::NotFound
            }
            TemplateError::Store(inner) => AppError::Internal(inner),
        }
    }
}

impl From<WidthError> for AppError {
    fn from(e: WidthError) -> Self {
        match e {
            WidthError::SectionNotFound(_) => AppError::NotFound,
            WidthError::UnknownBlock(_)
            | WidthError::MissingBlock(_)
            | WidthError::BadWeight { .. }
            | WidthError::BadSum { .. } => AppError::Validation(e.to_string()),
            WidthError::Store(inner) => AppError::Internal(inner),
        }
    }
}

/// Result type alias using AppError.
pub type AppResult<T> = Result<T, AppError>;
