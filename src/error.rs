//! Error types for the order tracker
//!
//! Provides unified error handling using thiserror.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;
use tracing::error;

use crate::repository::StoreError;

// == Tracker Error Enum ==
/// Errors surfaced by the service layer and rendered by the HTTP layer.
///
/// Cache conditions never appear here: a miss or a rejected admission is
/// handled inside the cache layer.
#[derive(Error, Debug)]
pub enum TrackerError {
    /// Requested resource does not exist
    #[error("{0}")]
    NotFound(String),

    /// Invalid request data
    #[error("Invalid request: {0}")]
    InvalidRequest(String),

    /// Failure reported by the durable store
    #[error(transparent)]
    Store(#[from] StoreError),
}

impl TrackerError {
    pub fn not_found(kind: &str, id: impl std::fmt::Display) -> Self {
        TrackerError::NotFound(format!("{kind} not found with id: {id}"))
    }

    pub fn status(&self) -> StatusCode {
        match self {
            TrackerError::NotFound(_) => StatusCode::NOT_FOUND,
            TrackerError::InvalidRequest(_) => StatusCode::BAD_REQUEST,
            TrackerError::Store(StoreError::NotFound { .. }) => StatusCode::NOT_FOUND,
            TrackerError::Store(StoreError::Backend(_)) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for TrackerError {
    fn into_response(self) -> Response {
        let status = self.status();
        let message = self.to_string();
        if status.is_server_error() {
            error!("Request failed ({}): {}", status.as_u16(), message);
        }

        let body = Json(json!({
            "error": message
        }));

        (status, body).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the order tracker.
pub type Result<T> = std::result::Result<T, TrackerError>;
