//! Application error mapping.

use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use thiserror::Error;

use crate::render::RenderError;
use crate::storage::StorageError;

/// Errors raised by request handlers.
#[derive(Debug, Error)]
pub enum AppError {
    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error(transparent)]
    Render(#[from] RenderError),

    /// Rendering task panicked or was cancelled.
    #[error("render task failed: {0}")]
    Task(#[from] tokio::task::JoinError),
}

impl AppError {
    pub fn status(&self) -> StatusCode {
        match self {
            AppError::Storage(StorageError::NotFound(_)) => StatusCode::NOT_FOUND,
            AppError::Storage(StorageError::InvalidKey { .. }) => StatusCode::BAD_REQUEST,
            AppError::Render(RenderError::InvalidLabel(_)) => StatusCode::BAD_REQUEST,
            AppError::Render(RenderError::Unsupported(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            AppError::Storage(StorageError::Backend { .. }) | AppError::Task(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!(error = %self, "Request failed");
        } else {
            tracing::warn!(error = %self, "Request rejected");
        }
        let reason = status.canonical_reason().unwrap_or("Error");
        (status, reason).into_response()
    }
}
