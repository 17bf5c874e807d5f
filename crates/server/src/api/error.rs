//! JSON error bodies shared by all handlers.

use axum::{http::StatusCode, Json};
use serde::Serialize;

/// Error body: a short title plus a human-readable message.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub task_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub parameters: Option<serde_json::Value>,
}

/// Handler error type: status plus JSON body.
pub type ApiError = (StatusCode, Json<ErrorResponse>);

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
            task_id: None,
            parameters: None,
        }
    }

    pub fn with_task_id(mut self, task_id: impl Into<String>) -> Self {
        self.task_id = Some(task_id.into());
        self
    }

    pub fn with_parameters(mut self, parameters: serde_json::Value) -> Self {
        self.parameters = Some(parameters);
        self
    }

    /// Pairs this body with `status`.
    pub fn into_api_error(self, status: StatusCode) -> ApiError {
        (status, Json(self))
    }
}

/// 500 with the generic title.
pub fn internal_error(message: impl Into<String>) -> ApiError {
    ErrorResponse::new("Internal server error", message)
        .into_api_error(StatusCode::INTERNAL_SERVER_ERROR)
}
